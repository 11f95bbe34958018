//! Restriction of a replicated global mesh to one rank's local mesh.
//!
//! Every process holds the full global mesh and the same partition, so each
//! one derives its own [`LocalMesh`] without communication:
//!
//! 1. select the rank's elements in global order (local → global element map)
//! 2. collect their points, sorted and deduplicated (local → global point map)
//! 3. translate node lists and retained boundary faces to local indices
//! 4. rebuild topology and face data on the local mesh
//! 5. classify local exterior faces as physical boundary or connectivity
//! 6. resolve connectivity faces against the global mesh
//! 7. translate the global periodic map
//!
//! A boundary face is retained on the rank owning its (left) element. A local
//! exterior face without a retained boundary face is therefore either a cut
//! face, which the global topology resolves to a neighbour on another rank,
//! or a physical boundary face the global boundary-face list never recorded.

use std::collections::BTreeMap;

#[cfg(feature = "rayon")]
use rayon::prelude::*;
use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::algs::communicator::ParallelContext;
use crate::config::DecompositionConfig;
use crate::debug_invariants::DebugInvariants;
use crate::mesh_error::MeshError;
use crate::partitioning::{ElementPartition, GraphPartitioner, partitioner_for};
use crate::topology::connectivity::Neighbor;
use crate::topology::mesh::{BoundaryFace, Mesh2d};
use crate::topology::periodic::PeriodicMap;
use crate::topology::validation::validate_topology;

/// A face of the local mesh whose neighbour lives on another rank.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConnectivityFace {
    /// Owning local element.
    pub elem: usize,
    /// Local face index within `elem`.
    pub local_face: usize,
    pub neighbor_rank: usize,
    /// Global index of the element across the face.
    pub neighbor_elem: usize,
    /// Index of the face in the global unified face list.
    pub global_face: usize,
}

/// A local periodic face whose partner is owned by another rank.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RemotePeriodicFace {
    /// Local unified face index.
    pub face: usize,
    pub global_face: usize,
    pub partner_global_face: usize,
    pub partner_rank: usize,
    /// Global element owning the partner face.
    pub partner_elem: usize,
}

/// How a local face relates to the rest of the decomposition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FaceKind {
    Interior,
    /// Physical boundary; payload is the local boundary face index.
    Boundary(usize),
    /// Cut face; payload is the index into [`LocalMesh::conn_faces`].
    Connectivity(usize),
    /// Exterior on the global mesh too, but without a boundary face record.
    UnrecordedBoundary,
}

/// One rank's part of a decomposed mesh.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LocalMesh {
    mesh: Mesh2d,
    ctx: ParallelContext,
    elem_l2g: Vec<usize>,
    point_l2g: Vec<usize>,
    bface_l2g: Vec<usize>,
    n_elems_global: usize,
    n_points_global: usize,
    conn_faces: Vec<ConnectivityFace>,
    conn_of_face: Vec<Option<usize>>,
    unrecorded_boundary: Vec<usize>,
    remote_periodic: Vec<RemotePeriodicFace>,
}

impl LocalMesh {
    pub fn mesh(&self) -> &Mesh2d {
        &self.mesh
    }

    pub fn into_mesh(self) -> Mesh2d {
        self.mesh
    }

    pub fn context(&self) -> ParallelContext {
        self.ctx
    }

    pub fn rank(&self) -> usize {
        self.ctx.rank()
    }

    pub fn n_ranks(&self) -> usize {
        self.ctx.size()
    }

    pub fn n_elems(&self) -> usize {
        self.mesh.n_elems()
    }

    pub fn n_points(&self) -> usize {
        self.mesh.n_points()
    }

    pub fn n_bfaces(&self) -> usize {
        self.mesh.n_bfaces()
    }

    pub fn n_elems_global(&self) -> usize {
        self.n_elems_global
    }

    pub fn n_points_global(&self) -> usize {
        self.n_points_global
    }

    /// Local → global element map, ascending.
    pub fn elem_l2g(&self) -> &[usize] {
        &self.elem_l2g
    }

    /// Local → global point map, ascending.
    pub fn point_l2g(&self) -> &[usize] {
        &self.point_l2g
    }

    /// Local → global boundary face map, ascending.
    pub fn bface_l2g(&self) -> &[usize] {
        &self.bface_l2g
    }

    pub fn elem_global(&self, local: usize) -> usize {
        self.elem_l2g[local]
    }

    pub fn point_global(&self, local: usize) -> usize {
        self.point_l2g[local]
    }

    pub fn elem_local(&self, global: usize) -> Option<usize> {
        self.elem_l2g.binary_search(&global).ok()
    }

    pub fn point_local(&self, global: usize) -> Option<usize> {
        self.point_l2g.binary_search(&global).ok()
    }

    /// Connectivity faces ordered by (local element, local face).
    pub fn conn_faces(&self) -> &[ConnectivityFace] {
        &self.conn_faces
    }

    pub fn n_conn_faces(&self) -> usize {
        self.conn_faces.len()
    }

    /// Local exterior faces that are globally exterior but carry no boundary
    /// face, ascending.
    pub fn unrecorded_boundary_faces(&self) -> &[usize] {
        &self.unrecorded_boundary
    }

    pub fn remote_periodic_faces(&self) -> &[RemotePeriodicFace] {
        &self.remote_periodic
    }

    /// Classify local unified face `face`.
    pub fn face_kind(&self, face: usize) -> Result<FaceKind, MeshError> {
        let topology = self.mesh.topology()?;
        if !topology.face(face).is_exterior() {
            return Ok(FaceKind::Interior);
        }
        if let Some(b) = self.mesh.boundary_maps()?.bface_of(face) {
            return Ok(FaceKind::Boundary(b));
        }
        if self.unrecorded_boundary.binary_search(&face).is_ok() {
            return Ok(FaceKind::UnrecordedBoundary);
        }
        self.conn_of_face
            .get(face)
            .copied()
            .flatten()
            .map(FaceKind::Connectivity)
            .ok_or(MeshError::UnresolvedConnectivityFace {
                rank: self.rank(),
                elem: self.elem_global(topology.face(face).left),
                local_face: topology
                    .local_face_of(topology.face(face).left, face)
                    .unwrap_or(usize::MAX),
            })
    }

    /// Connectivity faces grouped by neighbour rank, each group ordered by
    /// global face index so both sides of a cut enumerate shared faces in
    /// the same order. Values index [`LocalMesh::conn_faces`].
    pub fn exchange_plan(&self) -> BTreeMap<usize, Vec<usize>> {
        let mut plan: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
        for (i, cf) in self.conn_faces.iter().enumerate() {
            plan.entry(cf.neighbor_rank).or_default().push(i);
        }
        for faces in plan.values_mut() {
            faces.sort_unstable_by_key(|&i| self.conn_faces[i].global_face);
        }
        plan
    }

    /// Ranks this rank shares at least one connectivity face with.
    pub fn neighbor_ranks(&self) -> Vec<usize> {
        self.conn_faces
            .iter()
            .map(|cf| cf.neighbor_rank)
            .sorted_unstable()
            .dedup()
            .collect()
    }
}

impl DebugInvariants for LocalMesh {
    fn debug_assert_invariants(&self) {
        crate::debug_invariants!(self.validate_invariants(), "LocalMesh");
    }

    fn validate_invariants(&self) -> Result<(), MeshError> {
        validate_topology(&self.mesh)?;
        let ascending =
            |map: &[usize], n: usize| map.len() == n && map.windows(2).all(|w| w[0] < w[1]);
        if !ascending(&self.elem_l2g, self.mesh.n_elems()) {
            return Err(MeshError::UnsortedLocalMap {
                entity: "element",
                rank: self.rank(),
            });
        }
        if !ascending(&self.point_l2g, self.mesh.n_points()) {
            return Err(MeshError::UnsortedLocalMap {
                entity: "point",
                rank: self.rank(),
            });
        }
        let mut used = vec![false; self.mesh.n_points()];
        for e in self.mesh.elements() {
            for &p in e.nodes() {
                used[p] = true;
            }
        }
        if let Some(point) = used.iter().position(|&u| !u) {
            return Err(MeshError::UnusedLocalPoint {
                point: self.point_l2g[point],
                rank: self.rank(),
            });
        }
        for f in self.mesh.topology()?.exterior_faces() {
            // every exterior face is exactly one kind
            self.face_kind(f)?;
        }
        Ok(())
    }
}

fn translate(point_l2g: &[usize], global: usize, rank: usize) -> Result<usize, MeshError> {
    point_l2g
        .binary_search(&global)
        .map_err(|_| MeshError::PointNotLocal {
            point: global,
            rank,
        })
}

/// Derive the local mesh of `ctx.rank()`.
///
/// The global mesh needs topology and boundary maps; with a periodic map
/// present it is carried over as well. Deterministic and communication free.
pub fn restrict(
    global: &Mesh2d,
    partition: &ElementPartition,
    ctx: ParallelContext,
) -> Result<LocalMesh, MeshError> {
    let rank = ctx.rank();
    if partition.n_parts() != ctx.size() {
        return Err(MeshError::PartCountMismatch {
            partition: partition.n_parts(),
            processes: ctx.size(),
        });
    }
    partition.check_covers(global.n_elems())?;
    let gtopo = global.topology()?;
    let gmaps = global.boundary_maps()?;

    // elements and points
    let elem_l2g: Vec<usize> = partition.elements_of(rank).collect();
    let point_l2g: Vec<usize> = elem_l2g
        .iter()
        .flat_map(|&ge| global.elem_nodes(ge).iter().copied())
        .sorted_unstable()
        .dedup()
        .collect();

    let elements = elem_l2g
        .iter()
        .map(|&ge| {
            let mut elem = global.element(ge).clone();
            for node in elem.nodes_mut() {
                *node = translate(&point_l2g, *node, rank)?;
            }
            Ok::<_, MeshError>(elem)
        })
        .collect::<Result<Vec<_>, _>>()?;
    let points = point_l2g.iter().map(|&gp| global.point(gp)).collect();

    // boundary faces owned by a local element
    let mut bfaces = Vec::new();
    let mut bface_l2g = Vec::new();
    for (gb, bface) in global.bfaces().iter().enumerate() {
        let owner = gtopo.face(gmaps.face_of(gb)).left;
        if partition.rank_of(owner) != rank {
            continue;
        }
        let nodes = [
            translate(&point_l2g, bface.nodes[0], rank)?,
            translate(&point_l2g, bface.nodes[1], rank)?,
        ];
        bfaces.push(BoundaryFace::with_tags(nodes, bface.tags.clone()));
        bface_l2g.push(gb);
    }

    let mut mesh = Mesh2d::from_parts(
        points,
        elements,
        bfaces,
        global.n_region_tags(),
        global.n_boundary_tags(),
    );
    mesh.compute_topological()?;
    mesh.compute_face_data()?;

    // connectivity faces
    let topology = mesh.topology()?;
    let maps = mesh.boundary_maps()?;
    let mut conn_faces = Vec::new();
    let mut conn_of_face = vec![None; topology.n_faces()];
    let mut unrecorded_boundary = Vec::new();
    let mut boundary_spanning = 0usize;
    for f in maps.unmatched_exterior_faces() {
        let face = topology.face(f);
        let elem = face.left;
        let ge = elem_l2g[elem];
        let local_face = topology.local_face_of(elem, f).unwrap_or(usize::MAX);
        let unresolved = MeshError::UnresolvedConnectivityFace {
            rank,
            elem: ge,
            local_face,
        };
        let [ga, gb] = face.points.map(|p| point_l2g[p]);
        let gj = global
            .element(ge)
            .local_face_with(ga, gb)
            .ok_or(unresolved.clone())?;
        let neighbor_elem = match gtopo.neighbor(ge, gj) {
            Neighbor::Element(o) => o,
            Neighbor::Boundary(_) => {
                unrecorded_boundary.push(f);
                continue;
            }
            Neighbor::None => return Err(unresolved),
        };
        if face.points.iter().all(|&p| maps.is_boundary_point(p)) {
            boundary_spanning += 1;
        }
        let neighbor_rank = partition.rank_of(neighbor_elem);
        if neighbor_rank == rank {
            return Err(unresolved);
        }
        conn_of_face[f] = Some(conn_faces.len());
        conn_faces.push(ConnectivityFace {
            elem,
            local_face,
            neighbor_rank,
            neighbor_elem,
            global_face: gtopo.elem_face(ge, gj),
        });
    }
    if !unrecorded_boundary.is_empty() {
        log::warn!(
            "rank {rank}: {} exterior faces have no boundary face; treated as physical boundary",
            unrecorded_boundary.len()
        );
    }
    if boundary_spanning > 0 {
        log::debug!(
            "rank {rank}: {boundary_spanning} connectivity faces join two physical boundary points"
        );
    }

    // periodic partners
    let mut remote_periodic = Vec::new();
    let periodic = match global.periodic_map() {
        Some(gperiodic) => {
            let mut partner = vec![None; topology.n_faces()];
            for (lb, &gb) in bface_l2g.iter().enumerate() {
                let gf = gmaps.face_of(gb);
                let Some(gp) = gperiodic.partner(gf) else {
                    continue;
                };
                let lf = maps.face_of(lb);
                let partner_elem = gtopo.face(gp).left;
                let partner_rank = partition.rank_of(partner_elem);
                if partner_rank == rank {
                    let partner_bface = gmaps
                        .bface_of(gp)
                        .and_then(|pb| bface_l2g.binary_search(&pb).ok())
                        .ok_or(MeshError::PeriodicAsymmetry {
                            face: gf,
                            partner: gp,
                        })?;
                    partner[lf] = Some(maps.face_of(partner_bface));
                } else {
                    remote_periodic.push(RemotePeriodicFace {
                        face: lf,
                        global_face: gf,
                        partner_global_face: gp,
                        partner_rank,
                        partner_elem,
                    });
                }
            }
            if !remote_periodic.is_empty() {
                log::warn!(
                    "rank {rank}: {} periodic faces have their partner on another rank",
                    remote_periodic.len()
                );
            }
            Some(PeriodicMap::from_parts(gperiodic.config().clone(), partner))
        }
        None => None,
    };
    if let Some(map) = periodic {
        mesh.set_periodic_map(map);
    }

    log::info!(
        "rank {rank}/{}: {} elements, {} points, {} boundary faces, {} connectivity faces",
        ctx.size(),
        mesh.n_elems(),
        mesh.n_points(),
        mesh.n_bfaces(),
        conn_faces.len()
    );

    Ok(LocalMesh {
        mesh,
        ctx,
        elem_l2g,
        point_l2g,
        bface_l2g,
        n_elems_global: global.n_elems(),
        n_points_global: global.n_points(),
        conn_faces,
        conn_of_face,
        unrecorded_boundary,
        remote_periodic,
    })
}

/// Bring a freshly read global mesh to the state [`decompose`] needs:
/// topology, face data and, if configured, the periodic map.
pub fn prepare_global(global: &mut Mesh2d, config: &DecompositionConfig) -> Result<(), MeshError> {
    config.validate()?;
    if !global.has_topology() {
        global.preprocess()?;
    } else if global.geometry().is_err() {
        global.compute_face_data()?;
    }
    if let Some(periodic) = &config.periodic {
        global.compute_periodic_map(periodic)?;
    }
    Ok(())
}

/// Assign, restrict and check the local mesh of one rank.
///
/// `backend` serves the external-graph strategy.
pub fn decompose(
    global: &Mesh2d,
    config: &DecompositionConfig,
    backend: Option<Box<dyn GraphPartitioner>>,
    ctx: ParallelContext,
) -> Result<LocalMesh, MeshError> {
    config.validate()?;
    if config.periodic.is_some() && global.periodic_map().is_none() {
        return Err(MeshError::NotComputed("periodic map"));
    }
    let partition = partitioner_for(config.partitioner, backend)?.assign(global, ctx.size())?;
    let local = restrict(global, &partition, ctx)?;
    local.debug_assert_invariants();
    Ok(local)
}

/// Every rank's local mesh, computed in this process.
///
/// For tests and serial tools; an SPMD run calls [`restrict`] once per rank.
pub fn decompose_all(
    global: &Mesh2d,
    partition: &ElementPartition,
) -> Result<Vec<LocalMesh>, MeshError> {
    let ctx = ParallelContext::new(0, partition.n_parts())?;
    let ranks: Vec<ParallelContext> = ctx.ranks().collect();
    #[cfg(feature = "rayon")]
    {
        ranks
            .into_par_iter()
            .map(|ctx| restrict(global, partition, ctx))
            .collect()
    }
    #[cfg(not(feature = "rayon"))]
    {
        ranks
            .into_iter()
            .map(|ctx| restrict(global, partition, ctx))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algs::meshgen::{StructuredCell, rectangle_mesh};
    use crate::partitioning::trivial_partition;

    fn global_strip(n: usize) -> Mesh2d {
        let mut mesh =
            rectangle_mesh(n, 1, [0.0, 0.0], [n as f64, 1.0], StructuredCell::Quadrilateral)
                .unwrap();
        mesh.preprocess().unwrap();
        mesh
    }

    #[test]
    fn single_rank_is_the_global_mesh() {
        let global = global_strip(5);
        let local = restrict(&global, &trivial_partition(5, 1).unwrap(), ParallelContext::serial())
            .unwrap();
        assert_eq!(local.n_elems(), 5);
        assert_eq!(local.n_points(), 12);
        assert_eq!(local.n_bfaces(), 12);
        assert!(local.conn_faces().is_empty());
        assert!(local.validate_invariants().is_ok());
    }

    #[test]
    fn context_must_match_partition() {
        let global = global_strip(4);
        let partition = trivial_partition(4, 2).unwrap();
        let err = restrict(&global, &partition, ParallelContext::new(0, 3).unwrap()).unwrap_err();
        assert_eq!(err, MeshError::PartCountMismatch { partition: 2, processes: 3 });
    }

    #[test]
    fn global_mesh_needs_topology() {
        let raw = rectangle_mesh(4, 1, [0.0, 0.0], [4.0, 1.0], StructuredCell::Triangle).unwrap();
        let partition = trivial_partition(8, 2).unwrap();
        let err = restrict(&raw, &partition, ParallelContext::new(1, 2).unwrap()).unwrap_err();
        assert_eq!(err, MeshError::NotComputed("mesh topology"));
    }

    #[test]
    fn face_kinds_cover_every_exterior_face() {
        let global = global_strip(6);
        let partition = trivial_partition(6, 3).unwrap();
        let local = restrict(&global, &partition, ParallelContext::new(1, 3).unwrap()).unwrap();
        let topology = local.mesh().topology().unwrap();
        let mut n_conn = 0;
        let mut n_bound = 0;
        for f in topology.exterior_faces() {
            match local.face_kind(f).unwrap() {
                FaceKind::Connectivity(_) => n_conn += 1,
                FaceKind::Boundary(_) => n_bound += 1,
                FaceKind::Interior | FaceKind::UnrecordedBoundary => unreachable!(),
            }
        }
        assert_eq!(n_conn, 2);
        assert_eq!(n_bound, 4);
        assert_eq!(local.neighbor_ranks(), vec![0, 2]);
    }

    #[test]
    fn unsorted_element_map_is_reported_as_such() {
        let global = global_strip(4);
        let partition = trivial_partition(4, 2).unwrap();
        let mut local = restrict(&global, &partition, ParallelContext::new(0, 2).unwrap()).unwrap();
        local.elem_l2g.swap(0, 1);
        assert_eq!(
            local.validate_invariants().unwrap_err(),
            MeshError::UnsortedLocalMap {
                entity: "element",
                rank: 0
            }
        );
    }

    #[test]
    fn unreferenced_local_point_is_reported_as_unused() {
        let global = global_strip(4);
        let partition = trivial_partition(4, 2).unwrap();
        let local = restrict(&global, &partition, ParallelContext::new(0, 2).unwrap()).unwrap();
        assert_eq!(local.point_l2g(), &[0, 1, 2, 5, 6, 7]);

        let mut points = local.mesh.points().to_vec();
        points.push([4.0, 1.0]);
        let mut mesh = Mesh2d::from_parts(
            points,
            local.mesh.elements().to_vec(),
            local.mesh.bfaces().to_vec(),
            local.mesh.n_region_tags(),
            local.mesh.n_boundary_tags(),
        );
        mesh.compute_topological().unwrap();
        mesh.compute_face_data().unwrap();
        let mut point_l2g = local.point_l2g.clone();
        point_l2g.push(9);
        let broken = LocalMesh {
            mesh,
            point_l2g,
            ..local
        };
        let err = broken.validate_invariants().unwrap_err();
        assert_eq!(err, MeshError::UnusedLocalPoint { point: 9, rank: 0 });
        assert_eq!(err.kind(), crate::mesh_error::ErrorKind::Index);
    }
}
