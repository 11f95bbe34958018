//! Re-export public algorithms.

pub mod communicator;
pub mod consistency;
pub mod distribute;
pub mod dual_graph;
pub mod meshgen;
pub mod rcm;
pub mod transform;

pub use communicator::ParallelContext;
pub use distribute::{decompose, decompose_all, prepare_global, restrict};
