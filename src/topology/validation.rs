//! Topology validation.
//!
//! [`validate_topology`] re-derives the invariants the builder promises from
//! the finished structures: face/element agreement, adjacency symmetry,
//! boundary map round trips and periodic symmetry. It is what
//! [`DebugInvariants`] runs for a [`Mesh2d`].

use crate::debug_invariants::DebugInvariants;
use crate::mesh_error::MeshError;
use crate::topology::connectivity::{Neighbor, Topology};
use crate::topology::mesh::Mesh2d;

fn other_side(topology: &Topology, f: usize, e: usize) -> usize {
    let face = topology.face(f);
    match face.right {
        Neighbor::Element(r) if face.left == e => r,
        _ => face.left,
    }
}

/// Every local face slot agrees with the unified face it maps to, and
/// element adjacency is symmetric.
pub fn check_adjacency(topology: &Topology) -> Result<(), MeshError> {
    let n_elems = topology.n_elems();
    for e in 0..n_elems {
        for (j, &n) in topology.neighbors(e).iter().enumerate() {
            let f = topology.elem_face(e, j);
            let face = topology.face(f);
            let consistent = match n {
                Neighbor::Element(o) => {
                    o != e
                        && ((face.left == e && face.right == Neighbor::Element(o))
                            || (face.left == o && face.right == Neighbor::Element(e)))
                        && topology
                            .neighbors(o)
                            .iter()
                            .filter(|&&m| m == Neighbor::Element(e))
                            .count()
                            == 1
                }
                Neighbor::Boundary(g) => {
                    g == f && face.left == e && f < topology.n_exterior_faces()
                }
                Neighbor::None => false,
            };
            if !consistent {
                return Err(MeshError::AsymmetricAdjacency {
                    elem: e,
                    neighbor: other_side(topology, f, e),
                });
            }
        }
    }
    for f in topology.interior_faces() {
        let face = topology.face(f);
        match face.right {
            Neighbor::Element(r) if r > face.left => {}
            _ => {
                return Err(MeshError::AsymmetricAdjacency {
                    elem: face.left,
                    neighbor: other_side(topology, f, face.left),
                });
            }
        }
    }
    Ok(())
}

/// Full topology check of a mesh whose topology has been computed.
pub fn validate_topology(mesh: &Mesh2d) -> Result<(), MeshError> {
    let topology = mesh.topology()?;
    check_adjacency(topology)?;

    let maps = mesh.boundary_maps()?;
    for b in 0..mesh.n_bfaces() {
        let f = maps.face_of(b);
        if maps.bface_of(f) != Some(b) || !topology.face(f).is_exterior() {
            return Err(MeshError::UnmatchedBoundaryFace {
                bface: b,
                nodes: mesh.bface(b).nodes,
            });
        }
    }

    if let Some(periodic) = mesh.periodic_map() {
        periodic.check_symmetric()?;
    }
    Ok(())
}

impl DebugInvariants for Mesh2d {
    fn debug_assert_invariants(&self) {
        crate::debug_invariants!(self.validate_invariants(), "Mesh2d");
    }

    /// Meshes without topology have nothing to check.
    fn validate_invariants(&self) -> Result<(), MeshError> {
        if !self.has_topology() {
            return Ok(());
        }
        validate_topology(self)
    }
}
