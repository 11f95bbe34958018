mod util;
use util::*;

use fvmesh::algs::meshgen::{
    BOUNDARY_X_MAX, BOUNDARY_X_MIN, BOUNDARY_Y_MAX, StructuredCell, rectangle_mesh,
};
use fvmesh::geometry::metrics::midpoint;
use fvmesh::prelude::*;

fn face_centre(mesh: &Mesh2d, f: usize) -> [f64; 2] {
    let [a, b] = mesh.topology().unwrap().face(f).points;
    midpoint(mesh.point(a), mesh.point(b))
}

/// Unit-spaced square whose boundary faces are re-tagged by `retag`.
fn square_with(retag: impl Fn(usize, i32) -> i32, cell: StructuredCell) -> Mesh2d {
    let base = rectangle_mesh(4, 4, [0.0, 0.0], [4.0, 4.0], cell).unwrap();
    let bfaces = base
        .bfaces()
        .iter()
        .enumerate()
        .map(|(b, bf)| BoundaryFace::new(bf.nodes, retag(b, bf.marker().unwrap())))
        .collect();
    let mut mesh = Mesh2d::new(base.points().to_vec(), base.elements().to_vec(), bfaces).unwrap();
    mesh.preprocess().unwrap();
    mesh
}

#[test]
fn left_right_faces_pair_by_height() {
    let mut mesh = grid(4, 4, StructuredCell::Quadrilateral);
    let config = PeriodicConfig::new(BOUNDARY_X_MIN, Axis::X).with_partner(BOUNDARY_X_MAX);
    mesh.compute_periodic_map(&config).unwrap();
    let map = mesh.periodic_map().unwrap();
    let topo = mesh.topology().unwrap();

    assert_eq!(map.n_pairs(), 4);
    for f in 0..topo.n_faces() {
        match mesh.face_marker(f) {
            Some(BOUNDARY_X_MIN) | Some(BOUNDARY_X_MAX) => {
                let g = map.partner(f).unwrap();
                assert_eq!(map.partner(g), Some(f));
                assert_ne!(mesh.face_marker(g), mesh.face_marker(f));
                let (cf, cg) = (face_centre(&mesh, f), face_centre(&mesh, g));
                assert!((cf[1] - cg[1]).abs() < 1e-12);
                assert!((cf[0] - cg[0]).abs() > 3.9);
            }
            _ => assert_eq!(map.partner(f), None),
        }
    }
    map.check_symmetric().unwrap();
}

#[test]
fn single_marker_on_both_sides() {
    let mut mesh = square_with(
        |_, m| if m == BOUNDARY_X_MAX { BOUNDARY_X_MIN } else { m },
        StructuredCell::Triangle,
    );
    mesh.compute_periodic_map(&PeriodicConfig::new(BOUNDARY_X_MIN, Axis::X))
        .unwrap();
    let map = mesh.periodic_map().unwrap();
    assert_eq!(map.n_pairs(), 4);
    for (f, g) in map.pairs() {
        assert!((face_centre(&mesh, f)[1] - face_centre(&mesh, g)[1]).abs() < 1e-12);
    }
}

#[test]
fn top_bottom_pairing_along_y() {
    let mut mesh = grid(3, 5, StructuredCell::Triangle);
    let config = PeriodicConfig::new(BOUNDARY_Y_MAX, Axis::Y).with_partner(1);
    mesh.compute_periodic_map(&config).unwrap();
    let map = mesh.periodic_map().unwrap();
    assert_eq!(map.n_pairs(), 3);
    for (f, g) in map.pairs() {
        assert!((face_centre(&mesh, f)[0] - face_centre(&mesh, g)[0]).abs() < 1e-12);
    }
}

#[test]
fn missing_partner_is_fatal() {
    // bottom-most right face moved to the top marker group
    let right_bottom = 4;
    let mut mesh = square_with(
        |b, m| if b == right_bottom { BOUNDARY_Y_MAX } else { m },
        StructuredCell::Quadrilateral,
    );
    let config = PeriodicConfig::new(BOUNDARY_X_MIN, Axis::X).with_partner(BOUNDARY_X_MAX);
    let err = mesh.compute_periodic_map(&config).unwrap_err();
    assert!(matches!(err, MeshError::PeriodicMatch { matches: 0, .. }));
    assert_eq!(err.kind(), ErrorKind::Topology);
    assert!(mesh.periodic_map().is_none());
}

#[test]
fn needs_face_data() {
    let mut mesh = rectangle_mesh(2, 2, [0.0, 0.0], [1.0, 1.0], StructuredCell::Quadrilateral)
        .unwrap();
    mesh.compute_topological().unwrap();
    let err = mesh
        .compute_periodic_map(&PeriodicConfig::new(BOUNDARY_X_MIN, Axis::X))
        .unwrap_err();
    assert_eq!(err, MeshError::NotComputed("face data"));
}

#[test]
fn periodic_map_survives_reordering() {
    let mut mesh = grid(4, 2, StructuredCell::Quadrilateral);
    let config = PeriodicConfig::new(BOUNDARY_X_MIN, Axis::X).with_partner(BOUNDARY_X_MAX);
    mesh.compute_periodic_map(&config).unwrap();
    let perm: Vec<usize> = (0..mesh.n_elems()).rev().collect();
    mesh.reorder_cells(&perm).unwrap();
    let map = mesh.periodic_map().unwrap();
    assert_eq!(map.n_pairs(), 2);
    assert_eq!(map.config(), &config);
}

#[test]
fn tall_strip_pairs_every_row() {
    let mut mesh = grid(2, 40, StructuredCell::Triangle);
    let config = PeriodicConfig::new(BOUNDARY_X_MIN, Axis::X).with_partner(BOUNDARY_X_MAX);
    mesh.compute_periodic_map(&config).unwrap();
    let map = mesh.periodic_map().unwrap();
    assert_eq!(map.n_pairs(), 40);
    for (f, g) in map.pairs() {
        let (cf, cg) = (face_centre(&mesh, f), face_centre(&mesh, g));
        assert!((cf[1] - cg[1]).abs() < 1e-12);
        assert!((cf[0] - cg[0]).abs() > 1.9);
    }
}
