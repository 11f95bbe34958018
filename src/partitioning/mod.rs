//! Element → rank assignment.
//!
//! A [`Partitioner`] turns a global mesh and a process count into an
//! [`ElementPartition`]: one rank in `[0, n_parts)` for every element.
//! Every process must call it with identical inputs so that all of them
//! agree on the assignment without communicating.
//!
//! Two strategies exist, selected by [`PartitionStrategy`]:
//! - [`TrivialPartitioner`]: contiguous blocks of `⌊N/P⌋` elements, the
//!   remainder folded into the last rank;
//! - [`ExternalGraphPartitioner`]: hands the dual graph to a
//!   [`GraphPartitioner`] backend such as [`PrecomputedPartition`] or, with
//!   the `metis-support` feature, `MetisPartitioner`.

pub mod metrics;
#[cfg(feature = "metis-support")]
pub mod metis;

#[cfg(test)]
mod tests;

use serde::{Deserialize, Serialize};

use crate::algs::dual_graph::{DualGraph, build_dual};
use crate::config::PartitionStrategy;
use crate::mesh_error::MeshError;
use crate::topology::mesh::Mesh2d;

pub use self::metrics::{edge_cut, imbalance, part_sizes};

pub type PartitionId = usize;

/// A validated element → rank map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementPartition {
    ranks: Vec<PartitionId>,
    n_parts: usize,
}

impl ElementPartition {
    /// Wrap `ranks`, checking that every entry lies in `[0, n_parts)`.
    pub fn new(ranks: Vec<PartitionId>, n_parts: usize) -> Result<Self, MeshError> {
        if n_parts == 0 {
            return Err(MeshError::ZeroProcesses);
        }
        if let Some((elem, &rank)) = ranks.iter().enumerate().find(|&(_, &r)| r >= n_parts) {
            return Err(MeshError::RankOutsidePartition {
                elem,
                rank,
                n_parts,
            });
        }
        Ok(Self { ranks, n_parts })
    }

    pub fn rank_of(&self, elem: usize) -> PartitionId {
        self.ranks[elem]
    }

    pub fn ranks(&self) -> &[PartitionId] {
        &self.ranks
    }

    pub fn n_parts(&self) -> usize {
        self.n_parts
    }

    pub fn len(&self) -> usize {
        self.ranks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranks.is_empty()
    }

    /// Elements assigned to `rank`, ascending.
    pub fn elements_of(&self, rank: PartitionId) -> impl Iterator<Item = usize> + '_ {
        self.ranks
            .iter()
            .enumerate()
            .filter(move |&(_, &r)| r == rank)
            .map(|(e, _)| e)
    }

    /// Number of elements per rank.
    pub fn counts(&self) -> Vec<usize> {
        let mut counts = vec![0; self.n_parts];
        for &r in &self.ranks {
            counts[r] += 1;
        }
        counts
    }

    /// Check that the partition has one entry per element of an
    /// `n_elems`-element mesh.
    pub fn check_covers(&self, n_elems: usize) -> Result<(), MeshError> {
        if self.ranks.len() != n_elems {
            return Err(MeshError::PartitionLengthMismatch {
                expected: n_elems,
                got: self.ranks.len(),
            });
        }
        Ok(())
    }
}

/// Assigns every element of a global mesh to one of `n_parts` ranks.
pub trait Partitioner: Send + Sync {
    fn assign(&self, mesh: &Mesh2d, n_parts: usize) -> Result<ElementPartition, MeshError>;
}

fn check_part_count(n_elems: usize, n_parts: usize) -> Result<(), MeshError> {
    if n_parts == 0 {
        return Err(MeshError::ZeroProcesses);
    }
    if n_elems < n_parts {
        return Err(MeshError::TooFewElements { n_elems, n_parts });
    }
    Ok(())
}

/// Contiguous blocking of `n_elems` elements over `n_parts` ranks.
///
/// Rank `r` owns `[r⌊N/P⌋, (r+1)⌊N/P⌋)`; the last rank also takes the
/// remaining `N mod P` elements.
pub fn trivial_partition(n_elems: usize, n_parts: usize) -> Result<ElementPartition, MeshError> {
    check_part_count(n_elems, n_parts)?;
    let block = n_elems / n_parts;
    let ranks = (0..n_elems).map(|e| (e / block).min(n_parts - 1)).collect();
    ElementPartition::new(ranks, n_parts)
}

/// Contiguous-block strategy.
#[derive(Debug, Clone, Copy, Default)]
pub struct TrivialPartitioner;

impl Partitioner for TrivialPartitioner {
    fn assign(&self, mesh: &Mesh2d, n_parts: usize) -> Result<ElementPartition, MeshError> {
        let partition = trivial_partition(mesh.n_elems(), n_parts)?;
        log::debug!("trivial partition: block sizes {:?}", partition.counts());
        Ok(partition)
    }
}

/// A graph partitioning backend working on the element dual graph.
///
/// Returns one part index per graph vertex.
pub trait GraphPartitioner: Send + Sync {
    fn partition_graph(&self, graph: &DualGraph, n_parts: usize) -> Result<Vec<usize>, MeshError>;
}

impl<G: GraphPartitioner + ?Sized> GraphPartitioner for Box<G> {
    fn partition_graph(&self, graph: &DualGraph, n_parts: usize) -> Result<Vec<usize>, MeshError> {
        (**self).partition_graph(graph, n_parts)
    }
}

/// An assignment computed elsewhere (a separate tool, a file, a previous
/// run), replayed as a graph partitioner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrecomputedPartition {
    ranks: Vec<usize>,
}

impl PrecomputedPartition {
    pub fn new(ranks: Vec<usize>) -> Self {
        Self { ranks }
    }
}

impl GraphPartitioner for PrecomputedPartition {
    fn partition_graph(&self, graph: &DualGraph, _n_parts: usize) -> Result<Vec<usize>, MeshError> {
        if self.ranks.len() != graph.n_vertices() {
            return Err(MeshError::PartitionLengthMismatch {
                expected: graph.n_vertices(),
                got: self.ranks.len(),
            });
        }
        Ok(self.ranks.clone())
    }
}

/// Dual-graph strategy delegating to a backend.
///
/// The backend's answer is checked against the partition contract before
/// it is returned.
#[derive(Debug, Clone)]
pub struct ExternalGraphPartitioner<G> {
    backend: G,
}

impl<G: GraphPartitioner> ExternalGraphPartitioner<G> {
    pub fn new(backend: G) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &G {
        &self.backend
    }
}

impl<G: GraphPartitioner> Partitioner for ExternalGraphPartitioner<G> {
    fn assign(&self, mesh: &Mesh2d, n_parts: usize) -> Result<ElementPartition, MeshError> {
        check_part_count(mesh.n_elems(), n_parts)?;
        let graph = build_dual(mesh)?;
        let ranks = self.backend.partition_graph(&graph, n_parts)?;
        let partition = ElementPartition::new(ranks, n_parts)?;
        partition.check_covers(mesh.n_elems())?;
        let counts = partition.counts();
        if counts.contains(&0) {
            log::warn!("graph partitioner left some ranks without elements: {counts:?}");
        }
        log::debug!(
            "graph partition: sizes {counts:?}, edge cut {}",
            edge_cut(mesh.topology()?, &partition)
        );
        Ok(partition)
    }
}

/// Pick the partitioner named by `strategy`.
///
/// `backend` is used by [`PartitionStrategy::ExternalGraph`]; without one,
/// METIS is used when compiled in, otherwise the strategy cannot run.
pub fn partitioner_for(
    strategy: PartitionStrategy,
    backend: Option<Box<dyn GraphPartitioner>>,
) -> Result<Box<dyn Partitioner>, MeshError> {
    match (strategy, backend) {
        (PartitionStrategy::Trivial, _) => Ok(Box::new(TrivialPartitioner)),
        (PartitionStrategy::ExternalGraph, Some(backend)) => {
            Ok(Box::new(ExternalGraphPartitioner::new(backend)))
        }
        #[cfg(feature = "metis-support")]
        (PartitionStrategy::ExternalGraph, None) => Ok(Box::new(ExternalGraphPartitioner::new(
            self::metis::MetisPartitioner,
        ))),
        #[cfg(not(feature = "metis-support"))]
        (PartitionStrategy::ExternalGraph, None) => Err(MeshError::MissingGraphPartitioner),
    }
}
