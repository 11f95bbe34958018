//! Post-restriction sanity checks.
//!
//! These compare local meshes against the replicated global mesh (and each
//! other) and report through `log::warn!` plus a boolean. A `false` means the
//! restriction itself is broken, so callers usually just assert on it.

use hashbrown::HashMap;

use crate::algs::distribute::LocalMesh;
use crate::topology::connectivity::Neighbor;
use crate::topology::mesh::Mesh2d;

/// Every connectivity face of `local` agrees with the global face it names:
/// the global face's left element is the lower of the owner's and the
/// neighbour's global indices and its right element is the higher one.
pub fn check_conn_faces(local: &LocalMesh, global: &Mesh2d) -> bool {
    let Ok(gtopo) = global.topology() else {
        log::warn!("connectivity check needs the global topology");
        return false;
    };
    let mut ok = true;
    for (i, cf) in local.conn_faces().iter().enumerate() {
        if cf.global_face >= gtopo.n_faces() {
            log::warn!(
                "rank {}: connectivity face {i} names global face {} of {}",
                local.rank(),
                cf.global_face,
                gtopo.n_faces()
            );
            ok = false;
            continue;
        }
        let owner = local.elem_global(cf.elem);
        let left = owner.min(cf.neighbor_elem);
        let right = owner.max(cf.neighbor_elem);
        let gface = gtopo.face(cf.global_face);
        if gface.left != left || gface.right != Neighbor::Element(right) {
            log::warn!(
                "rank {}: connectivity face {i} joins global elements {owner} and {}, but global face {} joins {} and {:?}",
                local.rank(),
                cf.neighbor_elem,
                cf.global_face,
                gface.left,
                gface.right
            );
            ok = false;
        }
    }
    ok
}

/// For every connectivity face on rank `r` pointing at rank `s`, rank `s`
/// holds the mirror record: same global face, owner and neighbour swapped.
///
/// `locals` may be in any order but must contain every rank once.
pub fn check_cross_rank(locals: &[LocalMesh]) -> bool {
    let by_rank: HashMap<usize, &LocalMesh> = locals.iter().map(|l| (l.rank(), l)).collect();
    if by_rank.len() != locals.len() {
        log::warn!("cross-rank check given the same rank more than once");
        return false;
    }
    let mut ok = true;
    for local in locals {
        for cf in local.conn_faces() {
            let owner = local.elem_global(cf.elem);
            let Some(other) = by_rank.get(&cf.neighbor_rank) else {
                log::warn!(
                    "rank {} references rank {}, which is missing",
                    local.rank(),
                    cf.neighbor_rank
                );
                ok = false;
                continue;
            };
            let mirrored = other.conn_faces().iter().any(|m| {
                m.global_face == cf.global_face
                    && m.neighbor_rank == local.rank()
                    && m.neighbor_elem == owner
                    && other.elem_global(m.elem) == cf.neighbor_elem
            });
            if !mirrored {
                log::warn!(
                    "rank {}: global face {} (elements {owner}, {}) has no mirror on rank {}",
                    local.rank(),
                    cf.global_face,
                    cf.neighbor_elem,
                    cf.neighbor_rank
                );
                ok = false;
            }
        }
    }
    ok
}

/// The local element sets cover the global mesh, each element exactly once.
pub fn check_partition_cover(locals: &[LocalMesh], global: &Mesh2d) -> bool {
    let n = global.n_elems();
    let total: usize = locals.iter().map(LocalMesh::n_elems).sum();
    if total != n {
        log::warn!("local meshes hold {total} elements, global mesh has {n}");
        return false;
    }
    let mut seen = vec![false; n];
    for local in locals {
        for &ge in local.elem_l2g() {
            if ge >= n || std::mem::replace(&mut seen[ge], true) {
                log::warn!("global element {ge} is out of range or owned twice");
                return false;
            }
        }
    }
    true
}

/// Local node lists and coordinates, mapped back through the local → global
/// maps, reproduce the global mesh exactly.
pub fn check_node_round_trip(local: &LocalMesh, global: &Mesh2d) -> bool {
    let mesh = local.mesh();
    for e in 0..mesh.n_elems() {
        let ge = local.elem_global(e);
        let mapped = mesh.elem_nodes(e).iter().map(|&p| local.point_global(p));
        if !mapped.eq(global.elem_nodes(ge).iter().copied()) {
            log::warn!("rank {}: element {e} does not map back to global element {ge}", local.rank());
            return false;
        }
        if mesh.element(e).regions() != global.element(ge).regions() {
            log::warn!("rank {}: element {e} lost its region tags", local.rank());
            return false;
        }
    }
    for p in 0..mesh.n_points() {
        if mesh.point(p) != global.point(local.point_global(p)) {
            log::warn!("rank {}: point {p} moved during restriction", local.rank());
            return false;
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algs::distribute::decompose_all;
    use crate::algs::meshgen::{StructuredCell, rectangle_mesh};
    use crate::partitioning::{ElementPartition, trivial_partition};

    #[test]
    fn checks_pass_on_a_triangulated_block() {
        let mut global =
            rectangle_mesh(4, 4, [0.0, 0.0], [1.0, 1.0], StructuredCell::Triangle).unwrap();
        global.preprocess().unwrap();
        let locals = decompose_all(&global, &trivial_partition(32, 3).unwrap()).unwrap();
        assert!(locals.iter().all(|l| check_conn_faces(l, &global)));
        assert!(locals.iter().all(|l| check_node_round_trip(l, &global)));
        assert!(check_cross_rank(&locals));
        assert!(check_partition_cover(&locals, &global));
    }

    #[test]
    fn missing_rank_breaks_cover_and_mirror() {
        let mut global =
            rectangle_mesh(6, 1, [0.0, 0.0], [6.0, 1.0], StructuredCell::Quadrilateral).unwrap();
        global.preprocess().unwrap();
        let partition = ElementPartition::new(vec![0, 0, 1, 1, 2, 2], 3).unwrap();
        let mut locals = decompose_all(&global, &partition).unwrap();
        locals.pop();
        assert!(!check_partition_cover(&locals, &global));
        assert!(!check_cross_rank(&locals));
    }
}
