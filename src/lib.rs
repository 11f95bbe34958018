#![cfg_attr(docsrs, feature(doc_cfg))]
//! # fvmesh
//!
//! fvmesh is the mesh layer of a finite-volume solver on unstructured 2D
//! hybrid (triangle + quadrilateral) meshes. It derives topology from raw
//! element-node lists and restricts a replicated global mesh into per-rank
//! local meshes with consistent inter-partition connectivity.
//!
//! ## Features
//! - Element/point adjacency, a unified face list and boundary-face maps
//! - Face normals, cell areas and centres for linear cells
//! - Periodic face pairing by translation along a coordinate axis
//! - Trivial (contiguous-block) and pluggable dual-graph partitioning
//!   (METIS behind `metis-support`)
//! - Communication-free restriction to local meshes, with connectivity
//!   faces, index maps and consistency checks
//! - Rayon parallelism for element-wise steps (`rayon`, on by default) and
//!   MPI rank discovery (`mpi-support`)
//!
//! ## Usage
//!
//! ```
//! use fvmesh::prelude::*;
//! use fvmesh::algs::meshgen::{StructuredCell, rectangle_mesh};
//!
//! let mut global = rectangle_mesh(10, 1, [0.0, 0.0], [10.0, 1.0], StructuredCell::Quadrilateral)?;
//! let config = DecompositionConfig::default();
//! prepare_global(&mut global, &config)?;
//! let ctx = ParallelContext::new(1, 2)?;
//! let local = decompose(&global, &config, None, ctx)?;
//! assert_eq!(local.elem_l2g(), &[5, 6, 7, 8, 9]);
//! assert_eq!(local.conn_faces().len(), 1);
//! # Ok::<(), fvmesh::mesh_error::MeshError>(())
//! ```
//!
//! ## Determinism
//!
//! Every step is a pure function of its inputs: all ranks given the same
//! global mesh and configuration agree on the partition and on every global
//! face identifier without exchanging messages.

// Re-export our major subsystems:
pub mod algs;
pub mod config;
pub mod debug_invariants;
pub mod geometry;
pub mod mesh_error;
pub mod partitioning;
pub mod topology;

pub use debug_invariants::DebugInvariants;

/// A convenient prelude to import the most-used traits & types:
pub mod prelude {
    pub use crate::algs::communicator::ParallelContext;
    pub use crate::algs::consistency::{
        check_conn_faces, check_cross_rank, check_node_round_trip, check_partition_cover,
    };
    pub use crate::algs::distribute::{
        ConnectivityFace, FaceKind, LocalMesh, decompose, decompose_all, prepare_global, restrict,
    };
    pub use crate::config::{Axis, DecompositionConfig, PartitionStrategy, PeriodicConfig};
    pub use crate::debug_invariants::DebugInvariants;
    pub use crate::mesh_error::{ErrorKind, MeshError};
    pub use crate::partitioning::{
        ElementPartition, ExternalGraphPartitioner, GraphPartitioner, Partitioner,
        PrecomputedPartition, TrivialPartitioner, partitioner_for,
    };
    pub use crate::topology::cell_type::CellType;
    pub use crate::topology::connectivity::{Face, Neighbor, Topology};
    pub use crate::topology::mesh::{BoundaryFace, Element, Mesh2d};
}

#[cfg(test)]
mod tests {
    use static_assertions::assert_impl_all;

    use crate::algs::distribute::LocalMesh;
    use crate::partitioning::ElementPartition;
    use crate::topology::mesh::Mesh2d;

    assert_impl_all!(Mesh2d: Send, Sync, Clone);
    assert_impl_all!(LocalMesh: Send, Sync, Clone);
    assert_impl_all!(ElementPartition: Send, Sync);
}
