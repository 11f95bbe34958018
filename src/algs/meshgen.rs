//! Structured rectangle meshes with tagged boundaries.
//!
//! Used by tests, benches and demos in place of a mesh reader.

use serde::{Deserialize, Serialize};

use crate::mesh_error::MeshError;
use crate::topology::mesh::{BoundaryFace, Element, Mesh2d};

/// Marker of the boundary at `y = min[1]`.
pub const BOUNDARY_Y_MIN: i32 = 1;
/// Marker of the boundary at `x = max[0]`.
pub const BOUNDARY_X_MAX: i32 = 2;
/// Marker of the boundary at `y = max[1]`.
pub const BOUNDARY_Y_MAX: i32 = 3;
/// Marker of the boundary at `x = min[0]`.
pub const BOUNDARY_X_MIN: i32 = 4;

/// Cell-type choices for structured meshes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum StructuredCell {
    /// Each cell split along its `v0`–`v2` diagonal.
    Triangle,
    Quadrilateral,
}

fn invalid_geometry(message: impl Into<String>) -> MeshError {
    MeshError::InvalidGeometry(message.into())
}

/// Generate an `nx`×`ny` mesh over `[min, max]`.
///
/// Elements are numbered row by row from `min`, so a single row (`ny == 1`)
/// gives a chain of elements whose indices follow their adjacency. Boundary
/// faces are listed counter-clockwise starting at `min`.
pub fn rectangle_mesh(
    nx: usize,
    ny: usize,
    min: [f64; 2],
    max: [f64; 2],
    cell: StructuredCell,
) -> Result<Mesh2d, MeshError> {
    if nx == 0 || ny == 0 {
        return Err(invalid_geometry("nx and ny must be positive"));
    }
    if !(max[0] > min[0] && max[1] > min[1]) {
        return Err(invalid_geometry(format!(
            "empty rectangle {min:?} .. {max:?}"
        )));
    }

    let dx = (max[0] - min[0]) / nx as f64;
    let dy = (max[1] - min[1]) / ny as f64;
    let mut points = Vec::with_capacity((nx + 1) * (ny + 1));
    for j in 0..=ny {
        let y = min[1] + dy * j as f64;
        for i in 0..=nx {
            points.push([min[0] + dx * i as f64, y]);
        }
    }

    let row_stride = nx + 1;
    let mut elements = Vec::new();
    for j in 0..ny {
        for i in 0..nx {
            let v0 = j * row_stride + i;
            let v1 = v0 + 1;
            let v3 = v0 + row_stride;
            let v2 = v3 + 1;
            match cell {
                StructuredCell::Triangle => {
                    elements.push(Element::triangle([v0, v1, v2]));
                    elements.push(Element::triangle([v0, v2, v3]));
                }
                StructuredCell::Quadrilateral => {
                    elements.push(Element::quadrilateral([v0, v1, v2, v3]));
                }
            }
        }
    }

    let top = ny * row_stride;
    let mut bfaces = Vec::with_capacity(2 * (nx + ny));
    for i in 0..nx {
        bfaces.push(BoundaryFace::new([i, i + 1], BOUNDARY_Y_MIN));
    }
    for j in 0..ny {
        let p = j * row_stride + nx;
        bfaces.push(BoundaryFace::new([p, p + row_stride], BOUNDARY_X_MAX));
    }
    for i in (0..nx).rev() {
        bfaces.push(BoundaryFace::new([top + i + 1, top + i], BOUNDARY_Y_MAX));
    }
    for j in (0..ny).rev() {
        let p = j * row_stride;
        bfaces.push(BoundaryFace::new([p + row_stride, p], BOUNDARY_X_MIN));
    }

    Mesh2d::new(points, elements, bfaces)
}
