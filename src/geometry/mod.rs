//! Geometry of linear 2D meshes.
//!
//! Face normals, face lengths, cell areas and cell centres, computed from
//! point coordinates once the topology is known.

pub mod metrics;

pub use metrics::{FaceMetric, Geometry};
