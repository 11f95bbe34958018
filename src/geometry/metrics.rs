//! Face normals and lengths, cell areas and cell centres.
//!
//! Only straight-edged (linear) cells are handled. Face normals are unit
//! vectors `(dy, -dx) / len` taken along the face's stored point order, which
//! is the left element's counter-clockwise order: they point from the left
//! element toward the right element, or out of the domain on exterior faces.

use itertools::Itertools;
#[cfg(feature = "rayon")]
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::mesh_error::MeshError;
use crate::topology::connectivity::Topology;
use crate::topology::mesh::Mesh2d;

const EPS: f64 = 1e-12;

/// Unit normal and length of one face.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FaceMetric {
    pub normal: [f64; 2],
    pub length: f64,
}

/// Geometric data derived from a mesh and its topology.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    face_metrics: Vec<FaceMetric>,
    areas: Vec<f64>,
    centres: Vec<[f64; 2]>,
}

impl Geometry {
    pub fn face_metric(&self, f: usize) -> FaceMetric {
        self.face_metrics[f]
    }

    pub fn normal(&self, f: usize) -> [f64; 2] {
        self.face_metrics[f].normal
    }

    pub fn length(&self, f: usize) -> f64 {
        self.face_metrics[f].length
    }

    /// Area of element `e` (always positive).
    pub fn area(&self, e: usize) -> f64 {
        self.areas[e]
    }

    pub fn centre(&self, e: usize) -> [f64; 2] {
        self.centres[e]
    }

    pub fn face_metrics(&self) -> &[FaceMetric] {
        &self.face_metrics
    }

    pub fn areas(&self) -> &[f64] {
        &self.areas
    }

    pub fn centres(&self) -> &[[f64; 2]] {
        &self.centres
    }
}

/// Normal and length of the straight face running from `a` to `b`.
pub fn face_metric(a: [f64; 2], b: [f64; 2]) -> Result<FaceMetric, MeshError> {
    let d = sub(b, a);
    let length = norm(d);
    if length < EPS {
        return Err(MeshError::InvalidGeometry(format!(
            "zero-length face between {a:?} and {b:?}"
        )));
    }
    Ok(FaceMetric {
        normal: [d[1] / length, -d[0] / length],
        length,
    })
}

/// Signed area of a simple polygon; positive for counter-clockwise vertices.
pub fn polygon_area(vertices: &[[f64; 2]]) -> f64 {
    0.5 * vertices
        .iter()
        .circular_tuple_windows()
        .map(|(p, q)| p[0] * q[1] - q[0] * p[1])
        .sum::<f64>()
}

/// Average of the vertices.
pub fn centroid(vertices: &[[f64; 2]]) -> [f64; 2] {
    let n = vertices.len().max(1) as f64;
    let [sx, sy] = vertices
        .iter()
        .fold([0.0, 0.0], |acc, v| [acc[0] + v[0], acc[1] + v[1]]);
    [sx / n, sy / n]
}

pub fn midpoint(a: [f64; 2], b: [f64; 2]) -> [f64; 2] {
    [0.5 * (a[0] + b[0]), 0.5 * (a[1] + b[1])]
}

fn face_metric_of(mesh: &Mesh2d, topology: &Topology, f: usize) -> Result<FaceMetric, MeshError> {
    let [a, b] = topology.face(f).points;
    face_metric(mesh.point(a), mesh.point(b))
        .map_err(|_| MeshError::InvalidGeometry(format!("face {f} ({a}, {b}) has zero length")))
}

/// Compute every face metric, cell area and cell centre.
///
/// Clockwise cells are reported with a warning and stored with their
/// absolute area; zero-area cells are an error.
pub fn compute_geometry(mesh: &Mesh2d, topology: &Topology) -> Result<Geometry, MeshError> {
    #[cfg(feature = "rayon")]
    let face_metrics = (0..topology.n_faces())
        .into_par_iter()
        .map(|f| face_metric_of(mesh, topology, f))
        .collect::<Result<Vec<_>, _>>()?;
    #[cfg(not(feature = "rayon"))]
    let face_metrics = (0..topology.n_faces())
        .map(|f| face_metric_of(mesh, topology, f))
        .collect::<Result<Vec<_>, _>>()?;

    let mut areas = Vec::with_capacity(mesh.n_elems());
    let mut centres = Vec::with_capacity(mesh.n_elems());
    let mut clockwise = 0usize;
    for e in 0..mesh.n_elems() {
        let vertices: Vec<[f64; 2]> = mesh.elem_coords(e).collect();
        let signed = polygon_area(&vertices);
        if signed.abs() < EPS {
            return Err(MeshError::InvalidGeometry(format!(
                "element {e} has zero area"
            )));
        }
        if signed < 0.0 {
            clockwise += 1;
        }
        areas.push(signed.abs());
        centres.push(centroid(&vertices));
    }
    if clockwise > 0 {
        log::warn!("{clockwise} elements have clockwise node ordering; face normals of their faces point inward");
    }

    Ok(Geometry {
        face_metrics,
        areas,
        centres,
    })
}

fn sub(a: [f64; 2], b: [f64; 2]) -> [f64; 2] {
    [a[0] - b[0], a[1] - b[1]]
}

fn norm(a: [f64; 2]) -> f64 {
    (a[0] * a[0] + a[1] * a[1]).sqrt()
}
