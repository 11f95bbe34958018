#![allow(dead_code)]
use fvmesh::{
    algs::meshgen::{StructuredCell, rectangle_mesh},
    topology::connectivity::Neighbor,
    topology::mesh::{BoundaryFace, Element, Mesh2d},
};

/// Preprocessed `nx`×`ny` rectangle over `[0, nx] × [0, ny]`.
pub fn grid(nx: usize, ny: usize, cell: StructuredCell) -> Mesh2d {
    let mut mesh = rectangle_mesh(nx, ny, [0.0, 0.0], [nx as f64, ny as f64], cell).unwrap();
    mesh.preprocess().unwrap();
    mesh
}

/// A single row of `n` unit quads, elements numbered left to right.
pub fn row(n: usize) -> Mesh2d {
    grid(n, 1, StructuredCell::Quadrilateral)
}

/// Hybrid mesh: a quad on the left, two triangles on the right.
///
/// ```text
/// 3---4---5
/// |   | / |
/// 0---1---2
/// ```
pub fn hybrid() -> Mesh2d {
    let points = vec![
        [0.0, 0.0],
        [1.0, 0.0],
        [2.0, 0.0],
        [0.0, 1.0],
        [1.0, 1.0],
        [2.0, 1.0],
    ];
    let elements = vec![
        Element::quadrilateral([0, 1, 4, 3]).with_regions(vec![7]),
        Element::triangle([1, 2, 5]).with_regions(vec![8]),
        Element::triangle([1, 5, 4]).with_regions(vec![8]),
    ];
    let bfaces = vec![
        BoundaryFace::new([0, 1], 1),
        BoundaryFace::new([1, 2], 1),
        BoundaryFace::new([2, 5], 2),
        BoundaryFace::new([5, 4], 3),
        BoundaryFace::new([4, 3], 3),
        BoundaryFace::new([3, 0], 4),
    ];
    Mesh2d::new(points, elements, bfaces).unwrap()
}

/// Assert vec is a permutation of another vec (order-agnostic).
pub fn assert_permutation<T: Ord + Copy + std::fmt::Debug>(got: &[T], want: &[T]) {
    let mut a = got.to_vec();
    a.sort_unstable();
    let mut b = want.to_vec();
    b.sort_unstable();
    assert_eq!(a, b, "not a permutation\n got={:?}\nwant={:?}", got, want);
}

/// Every interior face has two distinct elements, every exterior face one,
/// and element adjacency is symmetric.
pub fn assert_topology_invariants(mesh: &Mesh2d) {
    let topo = mesh.topology().unwrap();
    for (f, face) in topo.faces().iter().enumerate() {
        match face.right {
            Neighbor::Element(r) => {
                assert!(f >= topo.n_exterior_faces());
                assert!(face.left < r, "face {f}: {face:?}");
            }
            Neighbor::Boundary(g) => {
                assert_eq!(g, f);
                assert!(f < topo.n_exterior_faces());
            }
            Neighbor::None => panic!("face {f} unresolved"),
        }
    }
    for e in 0..mesh.n_elems() {
        for n in topo.neighbors(e) {
            if let Neighbor::Element(o) = *n {
                let back = topo
                    .neighbors(o)
                    .iter()
                    .filter(|&&m| m == Neighbor::Element(e))
                    .count();
                assert_eq!(back, 1, "elements {e} and {o}");
            }
        }
    }
}
