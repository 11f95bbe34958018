//! Correspondence between the reader's boundary-face list and the unified
//! face list, and physical boundary point classification.

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::mesh_error::MeshError;
use crate::topology::connectivity::{Topology, face_key};
use crate::topology::mesh::Mesh2d;

/// Two-way map between boundary faces and unified faces.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundaryMaps {
    face_of_bface: Vec<usize>,
    bface_of_face: Vec<Option<usize>>,
    boundary_point: Vec<bool>,
    n_exterior: usize,
}

impl BoundaryMaps {
    /// Unified face index of boundary face `bface`.
    pub fn face_of(&self, bface: usize) -> usize {
        self.face_of_bface[bface]
    }

    /// Boundary face behind unified face `face`, if it is one.
    pub fn bface_of(&self, face: usize) -> Option<usize> {
        self.bface_of_face.get(face).copied().flatten()
    }

    /// Whether point `p` lies on at least one physical boundary face.
    pub fn is_boundary_point(&self, p: usize) -> bool {
        self.boundary_point[p]
    }

    pub fn boundary_point_flags(&self) -> &[bool] {
        &self.boundary_point
    }

    /// Exterior faces that no boundary face maps to.
    ///
    /// Empty on a complete global mesh; on a local mesh these are the
    /// candidates for connectivity faces.
    pub fn unmatched_exterior_faces(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.n_exterior).filter(|&f| self.bface_of_face[f].is_none())
    }

    pub fn n_unmatched_exterior(&self) -> usize {
        self.unmatched_exterior_faces().count()
    }
}

/// Match every boundary face to exactly one exterior face by point set.
pub fn match_boundary_faces(mesh: &Mesh2d, topology: &Topology) -> Result<BoundaryMaps, MeshError> {
    let mut by_key: HashMap<[usize; 2], usize> =
        HashMap::with_capacity(topology.n_exterior_faces());
    for f in topology.exterior_faces() {
        if let Some(first) = by_key.insert(topology.face(f).key(), f) {
            return Err(MeshError::DuplicateExteriorFace { first, second: f });
        }
    }

    let mut face_of_bface = Vec::with_capacity(mesh.n_bfaces());
    let mut bface_of_face = vec![None; topology.n_faces()];
    let mut boundary_point = vec![false; mesh.n_points()];
    for (b, bface) in mesh.bfaces().iter().enumerate() {
        let f = *by_key
            .get(&face_key(bface.nodes))
            .ok_or(MeshError::UnmatchedBoundaryFace {
                bface: b,
                nodes: bface.nodes,
            })?;
        if let Some(previous) = bface_of_face[f].replace(b) {
            return Err(MeshError::DuplicateBoundaryFace {
                bface: b,
                previous,
                face: f,
            });
        }
        face_of_bface.push(f);
        for &p in &bface.nodes {
            boundary_point[p] = true;
        }
    }

    Ok(BoundaryMaps {
        face_of_bface,
        bface_of_face,
        boundary_point,
        n_exterior: topology.n_exterior_faces(),
    })
}

/// A physical boundary point and the two boundary faces meeting at it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundaryPoint {
    pub point: usize,
    pub bfaces: [usize; 2],
}

/// Every point on a boundary face, ascending, with its two boundary faces.
///
/// Fails when a point belongs to one boundary face only (an open boundary)
/// or to more than two.
pub fn boundary_points(mesh: &Mesh2d) -> Result<Vec<BoundaryPoint>, MeshError> {
    let mut incident: Vec<Vec<usize>> = vec![Vec::new(); mesh.n_points()];
    for (b, bface) in mesh.bfaces().iter().enumerate() {
        for &p in &bface.nodes {
            incident[p].push(b);
        }
    }
    incident
        .iter()
        .enumerate()
        .filter(|(_, bfaces)| !bfaces.is_empty())
        .map(|(point, bfaces)| match bfaces.as_slice() {
            &[b0, b1] => Ok(BoundaryPoint {
                point,
                bfaces: [b0, b1],
            }),
            _ => Err(MeshError::BoundaryPointValence {
                point,
                count: bfaces.len(),
            }),
        })
        .collect()
}
