//! Parallel context: which rank this process is and how many there are.
//!
//! Restriction needs no messages, only the rank and the process count, so
//! those two numbers travel explicitly through every call instead of being
//! looked up from a global communicator.

use serde::{Deserialize, Serialize};

use crate::mesh_error::MeshError;

/// `(rank, size)` of one process in an SPMD run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ParallelContext {
    rank: usize,
    size: usize,
}

impl ParallelContext {
    pub fn new(rank: usize, size: usize) -> Result<Self, MeshError> {
        if size == 0 {
            return Err(MeshError::ZeroProcesses);
        }
        if rank >= size {
            return Err(MeshError::RankOutOfRange { rank, size });
        }
        Ok(Self { rank, size })
    }

    /// A single-process run.
    pub fn serial() -> Self {
        Self { rank: 0, size: 1 }
    }

    pub fn rank(&self) -> usize {
        self.rank
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn is_root(&self) -> bool {
        self.rank == 0
    }

    /// Contexts of every rank of the same run.
    pub fn ranks(&self) -> impl Iterator<Item = ParallelContext> {
        let size = self.size;
        (0..size).map(move |rank| ParallelContext { rank, size })
    }

    /// Read rank and size from an MPI communicator.
    #[cfg(feature = "mpi-support")]
    pub fn from_communicator<C: mpi::traits::Communicator>(comm: &C) -> Result<Self, MeshError> {
        let rank = usize::try_from(comm.rank())
            .map_err(|_| MeshError::Configuration(format!("negative MPI rank {}", comm.rank())))?;
        let size = usize::try_from(comm.size())
            .map_err(|_| MeshError::Configuration(format!("negative MPI size {}", comm.size())))?;
        Self::new(rank, size)
    }
}

impl Default for ParallelContext {
    fn default() -> Self {
        Self::serial()
    }
}
