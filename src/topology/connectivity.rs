//! Element/point adjacency and the unified face list.
//
// Everything here is a pure function of the raw element-node lists:
//
// * `esup`  elements surrounding each point, CSR
// * `psup`  points surrounding each point (sharing an element), CSR
// * `esuel` neighbour across every local face of every element
// * `faces` each face once, exterior faces first, owned by the lower index
//
// Exterior faces are numbered `0..n_exterior` in (element, local face)
// order; interior faces follow in the same traversal order.

use std::ops::Range;

use itertools::Itertools;
#[cfg(feature = "rayon")]
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::mesh_error::MeshError;
use crate::topology::cell_type::MAX_NODES;
use crate::topology::mesh::Mesh2d;

/// Compressed sparse rows: row `i` is `indices[ptr[i]..ptr[i + 1]]`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Csr {
    pub ptr: Vec<usize>,
    pub indices: Vec<usize>,
}

impl Csr {
    pub fn n_rows(&self) -> usize {
        self.ptr.len().saturating_sub(1)
    }

    pub fn row(&self, i: usize) -> &[usize] {
        &self.indices[self.ptr[i]..self.ptr[i + 1]]
    }

    fn from_rows(rows: Vec<Vec<usize>>) -> Self {
        let mut ptr = Vec::with_capacity(rows.len() + 1);
        ptr.push(0);
        let mut indices = Vec::with_capacity(rows.iter().map(Vec::len).sum());
        for row in rows {
            indices.extend(row);
            ptr.push(indices.len());
        }
        Self { ptr, indices }
    }
}

/// What lies across one local face of an element.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Neighbor {
    /// Another element of the same mesh.
    Element(usize),
    /// The exterior; the payload is the unified index of the exterior face.
    Boundary(usize),
    /// Not resolved yet. Never present in a finished [`Topology`].
    #[default]
    None,
}

impl Neighbor {
    pub fn element(self) -> Option<usize> {
        match self {
            Neighbor::Element(e) => Some(e),
            _ => None,
        }
    }

    pub fn is_element(self) -> bool {
        matches!(self, Neighbor::Element(_))
    }

    /// Solver-facing index: the element itself, or `n_elems + face` for the
    /// ghost cell behind an exterior face.
    pub fn ghost_index(self, n_elems: usize) -> Option<usize> {
        match self {
            Neighbor::Element(e) => Some(e),
            Neighbor::Boundary(f) => Some(n_elems + f),
            Neighbor::None => None,
        }
    }
}

/// One entry of the unified face list.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Face {
    pub left: usize,
    pub right: Neighbor,
    /// Points in the left element's local orientation.
    pub points: [usize; 2],
}

impl Face {
    pub fn is_exterior(&self) -> bool {
        !self.right.is_element()
    }

    /// Point indices sorted ascending, for set comparisons.
    pub fn key(&self) -> [usize; 2] {
        face_key(self.points)
    }
}

pub(crate) fn face_key([a, b]: [usize; 2]) -> [usize; 2] {
    if a <= b { [a, b] } else { [b, a] }
}

/// Derived adjacency of a [`Mesh2d`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topology {
    esup: Csr,
    psup: Csr,
    esuel: Vec<[Neighbor; MAX_NODES]>,
    faces: Vec<Face>,
    elem_faces: Vec<[usize; MAX_NODES]>,
    nfael: Vec<u8>,
    n_exterior: usize,
}

impl Topology {
    pub fn n_elems(&self) -> usize {
        self.esuel.len()
    }

    pub fn n_faces(&self) -> usize {
        self.faces.len()
    }

    pub fn n_exterior_faces(&self) -> usize {
        self.n_exterior
    }

    pub fn n_interior_faces(&self) -> usize {
        self.faces.len() - self.n_exterior
    }

    pub fn exterior_faces(&self) -> Range<usize> {
        0..self.n_exterior
    }

    pub fn interior_faces(&self) -> Range<usize> {
        self.n_exterior..self.faces.len()
    }

    pub fn faces(&self) -> &[Face] {
        &self.faces
    }

    pub fn face(&self, f: usize) -> &Face {
        &self.faces[f]
    }

    /// Neighbours across the local faces of element `e`.
    pub fn neighbors(&self, e: usize) -> &[Neighbor] {
        &self.esuel[e][..usize::from(self.nfael[e])]
    }

    pub fn neighbor(&self, e: usize, local_face: usize) -> Neighbor {
        self.neighbors(e)[local_face]
    }

    /// Unified face indices of the local faces of element `e`.
    pub fn elem_faces(&self, e: usize) -> &[usize] {
        &self.elem_faces[e][..usize::from(self.nfael[e])]
    }

    pub fn elem_face(&self, e: usize, local_face: usize) -> usize {
        self.elem_faces(e)[local_face]
    }

    /// Local face of element `e` that is unified face `f`, if any.
    pub fn local_face_of(&self, e: usize, f: usize) -> Option<usize> {
        self.elem_faces(e).iter().position(|&g| g == f)
    }

    /// Elements containing point `p`.
    pub fn esup(&self, p: usize) -> &[usize] {
        self.esup.row(p)
    }

    /// Points sharing an element with point `p`.
    pub fn psup(&self, p: usize) -> &[usize] {
        self.psup.row(p)
    }

    pub fn esup_csr(&self) -> &Csr {
        &self.esup
    }

    pub fn psup_csr(&self) -> &Csr {
        &self.psup
    }
}

/// Invert element node lists: elements surrounding each point.
///
/// Rows are ascending since elements are visited in order.
pub fn elements_surrounding_points(mesh: &Mesh2d) -> Csr {
    let n_points = mesh.n_points();
    let mut ptr = vec![0usize; n_points + 1];
    for e in mesh.elements() {
        for &p in e.nodes() {
            ptr[p + 1] += 1;
        }
    }
    for p in 0..n_points {
        ptr[p + 1] += ptr[p];
    }
    let mut fill = ptr.clone();
    let mut indices = vec![0usize; ptr[n_points]];
    for (ie, e) in mesh.elements().iter().enumerate() {
        for &p in e.nodes() {
            indices[fill[p]] = ie;
            fill[p] += 1;
        }
    }
    Csr { ptr, indices }
}

/// Points sharing at least one element with each point, excluding itself.
pub fn points_surrounding_points(mesh: &Mesh2d, esup: &Csr) -> Csr {
    let rows = (0..mesh.n_points())
        .map(|p| {
            esup.row(p)
                .iter()
                .flat_map(|&e| mesh.elem_nodes(e).iter().copied())
                .filter(|&q| q != p)
                .sorted_unstable()
                .dedup()
                .collect()
        })
        .collect();
    Csr::from_rows(rows)
}

fn neighbors_of(
    mesh: &Mesh2d,
    esup: &Csr,
    e: usize,
) -> Result<[Neighbor; MAX_NODES], MeshError> {
    let elem = mesh.element(e);
    let mut row = [Neighbor::None; MAX_NODES];
    for (j, slot) in row.iter_mut().enumerate().take(elem.n_faces()) {
        let [a, b] = elem.face_points(j);
        let mut candidates = esup
            .row(a)
            .iter()
            .copied()
            .filter(|&o| o != e && mesh.element(o).local_face_with(a, b).is_some());
        if let Some(o) = candidates.next() {
            let extra = candidates.count();
            if extra > 0 {
                return Err(MeshError::NonManifoldFace {
                    elem: e,
                    face: j,
                    candidates: extra + 1,
                });
            }
            *slot = Neighbor::Element(o);
        }
    }
    Ok(row)
}

/// Neighbour across every local face; `Neighbor::None` where there is none.
///
/// Fails if a face is shared by more than two elements.
pub fn elements_surrounding_elements(
    mesh: &Mesh2d,
    esup: &Csr,
) -> Result<Vec<[Neighbor; MAX_NODES]>, MeshError> {
    #[cfg(feature = "rayon")]
    {
        (0..mesh.n_elems())
            .into_par_iter()
            .map(|e| neighbors_of(mesh, esup, e))
            .collect()
    }
    #[cfg(not(feature = "rayon"))]
    {
        (0..mesh.n_elems())
            .map(|e| neighbors_of(mesh, esup, e))
            .collect()
    }
}

fn back_face(
    esuel: &[[Neighbor; MAX_NODES]],
    nfael: &[u8],
    from: usize,
    to: usize,
) -> Result<usize, MeshError> {
    let row = &esuel[to][..usize::from(nfael[to])];
    let mut hits = row
        .iter()
        .positions(|&n| n == Neighbor::Element(from));
    match (hits.next(), hits.next()) {
        (Some(k), None) => Ok(k),
        _ => Err(MeshError::AsymmetricAdjacency {
            elem: from,
            neighbor: to,
        }),
    }
}

struct FaceList {
    faces: Vec<Face>,
    elem_faces: Vec<[usize; MAX_NODES]>,
    n_exterior: usize,
}

/// Emit every face once and resolve the exterior slots of `esuel`.
fn build_faces(
    mesh: &Mesh2d,
    esuel: &mut [[Neighbor; MAX_NODES]],
    nfael: &[u8],
) -> Result<FaceList, MeshError> {
    let n_elems = mesh.n_elems();
    let mut faces = Vec::new();
    let mut elem_faces = vec![[usize::MAX; MAX_NODES]; n_elems];

    for e in 0..n_elems {
        for j in 0..usize::from(nfael[e]) {
            if esuel[e][j] == Neighbor::None {
                let f = faces.len();
                faces.push(Face {
                    left: e,
                    right: Neighbor::Boundary(f),
                    points: mesh.element(e).face_points(j),
                });
                esuel[e][j] = Neighbor::Boundary(f);
                elem_faces[e][j] = f;
            }
        }
    }
    let n_exterior = faces.len();

    for e in 0..n_elems {
        for j in 0..usize::from(nfael[e]) {
            let Neighbor::Element(o) = esuel[e][j] else {
                continue;
            };
            let k = back_face(esuel, nfael, e, o)?;
            if o > e {
                let f = faces.len();
                faces.push(Face {
                    left: e,
                    right: Neighbor::Element(o),
                    points: mesh.element(e).face_points(j),
                });
                elem_faces[e][j] = f;
                elem_faces[o][k] = f;
            }
        }
    }

    Ok(FaceList {
        faces,
        elem_faces,
        n_exterior,
    })
}

/// Run every adjacency step on `mesh`.
pub fn build_topology(mesh: &Mesh2d) -> Result<Topology, MeshError> {
    let esup = elements_surrounding_points(mesh);
    let psup = points_surrounding_points(mesh, &esup);
    let mut esuel = elements_surrounding_elements(mesh, &esup)?;
    let nfael: Vec<u8> = mesh
        .elements()
        .iter()
        .map(|e| e.n_faces() as u8)
        .collect();
    let FaceList {
        faces,
        elem_faces,
        n_exterior,
    } = build_faces(mesh, &mut esuel, &nfael)?;

    log::debug!(
        "topology: {} elements, {} faces ({} exterior, {} interior)",
        mesh.n_elems(),
        faces.len(),
        n_exterior,
        faces.len() - n_exterior
    );

    Ok(Topology {
        esup,
        psup,
        esuel,
        faces,
        elem_faces,
        nfael,
        n_exterior,
    })
}
