//! Mesh storage and topology construction.
//!
//! - [`mesh`]: the [`Mesh2d`] store with its raw arrays and derived data
//! - [`connectivity`]: element/point adjacency and the unified face list
//! - [`boundary`]: boundary-face correspondence and boundary points
//! - [`periodic`]: periodic face pairing
//! - [`validation`]: invariant checks over finished topology
//!
//! Most users build a [`Mesh2d`] from reader output and call
//! [`Mesh2d::preprocess`].

pub mod boundary;
pub mod cell_type;
pub mod connectivity;
pub mod mesh;
pub mod periodic;
pub mod validation;

pub use boundary::{BoundaryMaps, BoundaryPoint};
pub use cell_type::CellType;
pub use connectivity::{Csr, Face, Neighbor, Topology};
pub use mesh::{BoundaryFace, Element, Mesh2d, MeshStats};
pub use periodic::PeriodicMap;
