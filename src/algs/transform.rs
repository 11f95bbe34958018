//! Whole-mesh transforms and structural comparison.

use serde::{Deserialize, Serialize};

use crate::mesh_error::MeshError;
use crate::topology::mesh::{Element, Mesh2d};

/// Split every quadrilateral along its `v0`–`v2` diagonal.
///
/// Triangles are kept as they are. Each quad is replaced in place by two
/// triangles, so element order follows the input. Points, boundary faces and
/// region tags carry over unchanged; derived data is not computed.
pub fn convert_quad_to_tri(mesh: &Mesh2d) -> Result<Mesh2d, MeshError> {
    let mut elements = Vec::with_capacity(2 * mesh.n_elems());
    for elem in mesh.elements() {
        match *elem.nodes() {
            [v0, v1, v2, v3] => {
                elements.push(Element::triangle([v0, v1, v2]).with_regions(elem.regions().to_vec()));
                elements.push(Element::triangle([v0, v2, v3]).with_regions(elem.regions().to_vec()));
            }
            _ => elements.push(elem.clone()),
        }
    }
    log::debug!(
        "quad to tri: {} elements -> {}",
        mesh.n_elems(),
        elements.len()
    );
    Mesh2d::new(mesh.points().to_vec(), elements, mesh.bfaces().to_vec())
}

/// Result of [`compare_meshes`], one flag per property.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeshComparison {
    pub n_elems: bool,
    pub n_points: bool,
    pub n_bfaces: bool,
    pub nodes_per_elem: bool,
    pub faces_per_elem: bool,
    pub connectivity: bool,
    /// Boundary faces including their tags.
    pub bfaces: bool,
    pub coordinates: bool,
}

impl MeshComparison {
    pub fn all_match(&self) -> bool {
        self.as_array().iter().all(|&b| b)
    }

    pub fn as_array(&self) -> [bool; 8] {
        [
            self.n_elems,
            self.n_points,
            self.n_bfaces,
            self.nodes_per_elem,
            self.faces_per_elem,
            self.connectivity,
            self.bfaces,
            self.coordinates,
        ]
    }
}

/// Compare the raw arrays of two meshes. Coordinates must match exactly.
pub fn compare_meshes(a: &Mesh2d, b: &Mesh2d) -> MeshComparison {
    let same_elems = a.n_elems() == b.n_elems();
    let pairs = || a.elements().iter().zip(b.elements());
    MeshComparison {
        n_elems: same_elems,
        n_points: a.n_points() == b.n_points(),
        n_bfaces: a.n_bfaces() == b.n_bfaces(),
        nodes_per_elem: same_elems && pairs().all(|(x, y)| x.n_nodes() == y.n_nodes()),
        faces_per_elem: same_elems && pairs().all(|(x, y)| x.n_faces() == y.n_faces()),
        connectivity: same_elems && pairs().all(|(x, y)| x.nodes() == y.nodes()),
        bfaces: a.bfaces() == b.bfaces(),
        coordinates: a.points() == b.points(),
    }
}
