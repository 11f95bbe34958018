//! The mesh store: raw point/element/boundary-face arrays plus every derived
//! structure computed from them.
//!
//! A [`Mesh2d`] is either the *global* mesh (built once from a reader and
//! replicated on every process) or the mesh part of a
//! [`LocalMesh`](crate::algs::distribute::LocalMesh). Derived data is held in
//! `Option`s and filled by the `compute_*` methods; accessors return
//! [`MeshError::NotComputed`] when asked for something that was never built.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::PeriodicConfig;
use crate::geometry::metrics::{Geometry, compute_geometry};
use crate::mesh_error::MeshError;
use crate::topology::boundary::{BoundaryMaps, BoundaryPoint, boundary_points, match_boundary_faces};
use crate::topology::cell_type::{CellType, MAX_NODES, NODES_PER_FACE};
use crate::topology::connectivity::{Topology, build_topology};
use crate::topology::periodic::{PeriodicMap, match_periodic_faces};

/// A linear triangle or quadrilateral.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Element {
    cell_type: CellType,
    nodes: [usize; MAX_NODES],
    regions: Vec<i32>,
}

impl Element {
    /// Build an element from its (counter-clockwise) node list.
    ///
    /// Returns `None` unless the list has 3 or 4 entries.
    pub fn from_nodes(nodes: &[usize]) -> Option<Self> {
        let cell_type = CellType::from_node_count(nodes.len())?;
        let mut buf = [0; MAX_NODES];
        buf[..nodes.len()].copy_from_slice(nodes);
        Some(Self {
            cell_type,
            nodes: buf,
            regions: Vec::new(),
        })
    }

    pub fn triangle(nodes: [usize; 3]) -> Self {
        Self {
            cell_type: CellType::Triangle,
            nodes: [nodes[0], nodes[1], nodes[2], 0],
            regions: Vec::new(),
        }
    }

    pub fn quadrilateral(nodes: [usize; 4]) -> Self {
        Self {
            cell_type: CellType::Quadrilateral,
            nodes,
            regions: Vec::new(),
        }
    }

    /// Attach volume-region tags.
    pub fn with_regions(mut self, regions: Vec<i32>) -> Self {
        self.regions = regions;
        self
    }

    pub fn cell_type(&self) -> CellType {
        self.cell_type
    }

    pub fn nodes(&self) -> &[usize] {
        &self.nodes[..self.cell_type.n_nodes()]
    }

    pub(crate) fn nodes_mut(&mut self) -> &mut [usize] {
        let n = self.cell_type.n_nodes();
        &mut self.nodes[..n]
    }

    pub fn regions(&self) -> &[i32] {
        &self.regions
    }

    pub fn n_nodes(&self) -> usize {
        self.cell_type.n_nodes()
    }

    pub fn n_faces(&self) -> usize {
        self.cell_type.n_faces()
    }

    /// Point indices of local face `face`, in the element's orientation.
    pub fn face_points(&self, face: usize) -> [usize; NODES_PER_FACE] {
        let [a, b] = self.cell_type.face_nodes(face);
        [self.nodes[a], self.nodes[b]]
    }

    /// Local index of the face whose point set is `{a, b}`, if any.
    pub fn local_face_with(&self, a: usize, b: usize) -> Option<usize> {
        (0..self.n_faces()).find(|&j| {
            let [p, q] = self.face_points(j);
            (p == a && q == b) || (p == b && q == a)
        })
    }
}

/// A boundary face as delivered by a mesh reader: two points and its tags.
///
/// The first tag is the boundary marker used for boundary conditions and
/// periodic matching.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundaryFace {
    pub nodes: [usize; NODES_PER_FACE],
    pub tags: Vec<i32>,
}

impl BoundaryFace {
    pub fn new(nodes: [usize; NODES_PER_FACE], marker: i32) -> Self {
        Self {
            nodes,
            tags: vec![marker],
        }
    }

    pub fn with_tags(nodes: [usize; NODES_PER_FACE], tags: Vec<i32>) -> Self {
        Self { nodes, tags }
    }

    pub fn marker(&self) -> Option<i32> {
        self.tags.first().copied()
    }
}

/// Hybrid unstructured 2D mesh of triangles and quadrilaterals.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Mesh2d {
    points: Vec<[f64; 2]>,
    elements: Vec<Element>,
    bfaces: Vec<BoundaryFace>,
    n_region_tags: usize,
    n_boundary_tags: usize,
    topology: Option<Topology>,
    boundary: Option<BoundaryMaps>,
    geometry: Option<Geometry>,
    periodic: Option<PeriodicMap>,
}

impl Mesh2d {
    /// Build a mesh from raw arrays, checking every index and tag count.
    pub fn new(
        points: Vec<[f64; 2]>,
        elements: Vec<Element>,
        bfaces: Vec<BoundaryFace>,
    ) -> Result<Self, MeshError> {
        let n_points = points.len();
        let n_region_tags = elements.first().map_or(0, |e| e.regions.len());
        for (elem, e) in elements.iter().enumerate() {
            if let Some(&point) = e.nodes().iter().find(|&&p| p >= n_points) {
                return Err(MeshError::PointIndexOutOfRange {
                    elem,
                    point,
                    n_points,
                });
            }
            if e.regions.len() != n_region_tags {
                return Err(MeshError::TagCountMismatch {
                    entity: "element",
                    index: elem,
                    expected: n_region_tags,
                    found: e.regions.len(),
                });
            }
        }
        let n_boundary_tags = bfaces.first().map_or(0, |b| b.tags.len());
        for (bface, b) in bfaces.iter().enumerate() {
            if let Some(&point) = b.nodes.iter().find(|&&p| p >= n_points) {
                return Err(MeshError::BoundaryPointOutOfRange {
                    bface,
                    point,
                    n_points,
                });
            }
            if b.tags.len() != n_boundary_tags {
                return Err(MeshError::TagCountMismatch {
                    entity: "boundary face",
                    index: bface,
                    expected: n_boundary_tags,
                    found: b.tags.len(),
                });
            }
        }
        Ok(Self {
            points,
            elements,
            bfaces,
            n_region_tags,
            n_boundary_tags,
            ..Self::default()
        })
    }

    /// Build a mesh from plain connectivity lists, as readers produce them.
    pub fn from_connectivity(
        points: Vec<[f64; 2]>,
        connectivity: &[Vec<usize>],
        bfaces: Vec<BoundaryFace>,
    ) -> Result<Self, MeshError> {
        let elements = connectivity
            .iter()
            .enumerate()
            .map(|(elem, nodes)| {
                Element::from_nodes(nodes).ok_or(MeshError::UnsupportedElement {
                    elem,
                    n_nodes: nodes.len(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(points, elements, bfaces)
    }

    // ---------------------------------------------------------------------
    // raw data
    // ---------------------------------------------------------------------

    pub fn n_points(&self) -> usize {
        self.points.len()
    }

    pub fn n_elems(&self) -> usize {
        self.elements.len()
    }

    /// Number of physical boundary faces.
    pub fn n_bfaces(&self) -> usize {
        self.bfaces.len()
    }

    pub fn n_region_tags(&self) -> usize {
        self.n_region_tags
    }

    pub fn n_boundary_tags(&self) -> usize {
        self.n_boundary_tags
    }

    pub fn point(&self, p: usize) -> [f64; 2] {
        self.points[p]
    }

    pub fn points(&self) -> &[[f64; 2]] {
        &self.points
    }

    pub fn element(&self, e: usize) -> &Element {
        &self.elements[e]
    }

    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    pub fn elem_nodes(&self, e: usize) -> &[usize] {
        self.elements[e].nodes()
    }

    pub fn bface(&self, b: usize) -> &BoundaryFace {
        &self.bfaces[b]
    }

    pub fn bfaces(&self) -> &[BoundaryFace] {
        &self.bfaces
    }

    /// Largest node count over all elements.
    pub fn max_nodes(&self) -> usize {
        self.elements.iter().map(Element::n_nodes).max().unwrap_or(0)
    }

    /// Coordinates of the nodes of element `e`.
    pub fn elem_coords(&self, e: usize) -> impl Iterator<Item = [f64; 2]> + '_ {
        self.elements[e].nodes().iter().map(|&p| self.points[p])
    }

    // ---------------------------------------------------------------------
    // derived data
    // ---------------------------------------------------------------------

    pub fn topology(&self) -> Result<&Topology, MeshError> {
        self.topology
            .as_ref()
            .ok_or(MeshError::NotComputed("mesh topology"))
    }

    pub fn boundary_maps(&self) -> Result<&BoundaryMaps, MeshError> {
        self.boundary
            .as_ref()
            .ok_or(MeshError::NotComputed("boundary face maps"))
    }

    pub fn geometry(&self) -> Result<&Geometry, MeshError> {
        self.geometry
            .as_ref()
            .ok_or(MeshError::NotComputed("face data"))
    }

    pub fn periodic_map(&self) -> Option<&PeriodicMap> {
        self.periodic.as_ref()
    }

    pub fn has_topology(&self) -> bool {
        self.topology.is_some()
    }

    /// Tags of the physical boundary face behind unified face `face`, if any.
    pub fn face_tags(&self, face: usize) -> Option<&[i32]> {
        let bface = self.boundary.as_ref()?.bface_of(face)?;
        Some(&self.bfaces[bface].tags)
    }

    /// Boundary marker of unified face `face`, if it is a physical boundary face.
    pub fn face_marker(&self, face: usize) -> Option<i32> {
        self.face_tags(face).and_then(|t| t.first().copied())
    }

    /// Build element/point adjacency, the unified face list and the
    /// boundary-face correspondence maps.
    ///
    /// Any previously computed face data or periodic map is discarded.
    pub fn compute_topological(&mut self) -> Result<(), MeshError> {
        let topology = build_topology(self)?;
        let boundary = match_boundary_faces(self, &topology)?;
        self.topology = Some(topology);
        self.boundary = Some(boundary);
        self.geometry = None;
        self.periodic = None;
        Ok(())
    }

    /// Compute face normals and lengths, cell areas and cell centres.
    pub fn compute_face_data(&mut self) -> Result<(), MeshError> {
        let geometry = compute_geometry(self, self.topology()?)?;
        self.geometry = Some(geometry);
        Ok(())
    }

    /// Pair the faces of two periodic boundaries.
    pub fn compute_periodic_map(&mut self, config: &PeriodicConfig) -> Result<(), MeshError> {
        let map = match_periodic_faces(self, config)?;
        self.periodic = Some(map);
        Ok(())
    }

    pub(crate) fn set_periodic_map(&mut self, map: PeriodicMap) {
        self.periodic = Some(map);
    }

    /// Boundary points with the two boundary faces containing each.
    pub fn boundary_points(&self) -> Result<Vec<BoundaryPoint>, MeshError> {
        boundary_points(self)
    }

    /// Everything a freshly read mesh needs before use: topology, boundary
    /// maps and face data. Periodic maps are computed separately.
    pub fn preprocess(&mut self) -> Result<(), MeshError> {
        self.compute_topological()?;
        self.compute_face_data()?;
        let unmatched = self.boundary_maps()?.n_unmatched_exterior();
        if unmatched > 0 {
            log::warn!("{unmatched} exterior faces have no boundary face; is the boundary-face list complete?");
        }
        log::info!("{}", self.stats());
        Ok(())
    }

    /// Renumber cells so that new cell `i` is old cell `perm[i]`.
    ///
    /// Whatever derived data existed is rebuilt for the new numbering.
    pub fn reorder_cells(&mut self, perm: &[usize]) -> Result<(), MeshError> {
        let n = self.n_elems();
        if perm.len() != n {
            return Err(MeshError::InvalidPermutation(format!(
                "length {} for {n} cells",
                perm.len()
            )));
        }
        let mut seen = vec![false; n];
        for &old in perm {
            if old >= n || std::mem::replace(&mut seen[old], true) {
                return Err(MeshError::InvalidPermutation(format!(
                    "cell {old} is out of range or repeated"
                )));
            }
        }

        self.elements = perm.iter().map(|&old| self.elements[old].clone()).collect();

        let had_topology = self.topology.is_some();
        let had_geometry = self.geometry.is_some();
        let periodic = self.periodic.as_ref().map(|p| p.config().clone());
        self.topology = None;
        self.boundary = None;
        self.geometry = None;
        self.periodic = None;
        if had_topology {
            self.compute_topological()?;
        }
        if had_geometry {
            self.compute_face_data()?;
        }
        if let Some(config) = periodic {
            self.compute_periodic_map(&config)?;
        }
        Ok(())
    }

    /// Summary counts for logging.
    pub fn stats(&self) -> MeshStats {
        let n_triangles = self
            .elements
            .iter()
            .filter(|e| e.cell_type() == CellType::Triangle)
            .count();
        MeshStats {
            n_points: self.n_points(),
            n_elems: self.n_elems(),
            n_triangles,
            n_quadrilaterals: self.n_elems() - n_triangles,
            n_bfaces: self.n_bfaces(),
            n_faces: self.topology.as_ref().map(Topology::n_faces),
            n_periodic_pairs: self.periodic.as_ref().map(PeriodicMap::n_pairs),
        }
    }

    pub(crate) fn from_parts(
        points: Vec<[f64; 2]>,
        elements: Vec<Element>,
        bfaces: Vec<BoundaryFace>,
        n_region_tags: usize,
        n_boundary_tags: usize,
    ) -> Self {
        Self {
            points,
            elements,
            bfaces,
            n_region_tags,
            n_boundary_tags,
            ..Self::default()
        }
    }
}

/// Mesh summary produced by [`Mesh2d::stats`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeshStats {
    pub n_points: usize,
    pub n_elems: usize,
    pub n_triangles: usize,
    pub n_quadrilaterals: usize,
    pub n_bfaces: usize,
    pub n_faces: Option<usize>,
    pub n_periodic_pairs: Option<usize>,
}

impl fmt::Display for MeshStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "mesh: {} points, {} elements ({} tri, {} quad), {} boundary faces",
            self.n_points, self.n_elems, self.n_triangles, self.n_quadrilaterals, self.n_bfaces
        )?;
        if let Some(n) = self.n_faces {
            write!(f, ", {n} faces")?;
        }
        if let Some(n) = self.n_periodic_pairs {
            write!(f, ", {n} periodic pairs")?;
        }
        Ok(())
    }
}
