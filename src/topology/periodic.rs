//! Periodic face pairing.
//!
//! Faces on two boundary groups are identified when their midpoints agree in
//! the coordinate transverse to the periodic axis. With a single marker both
//! groups are the faces carrying that marker, and a face is paired with the
//! one on the opposite side of the domain.

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::config::PeriodicConfig;
use crate::geometry::metrics::midpoint;
use crate::mesh_error::MeshError;
use crate::topology::mesh::Mesh2d;

/// Face → paired face, over the unified face list.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PeriodicMap {
    config: PeriodicConfig,
    partner: Vec<Option<usize>>,
}

impl PeriodicMap {
    pub(crate) fn from_parts(config: PeriodicConfig, partner: Vec<Option<usize>>) -> Self {
        Self { config, partner }
    }

    pub fn config(&self) -> &PeriodicConfig {
        &self.config
    }

    /// Face paired with `face`, or `None` if it is not periodic.
    pub fn partner(&self, face: usize) -> Option<usize> {
        self.partner.get(face).copied().flatten()
    }

    pub fn as_slice(&self) -> &[Option<usize>] {
        &self.partner
    }

    pub fn len(&self) -> usize {
        self.partner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.partner.is_empty()
    }

    /// Each pair once, as `(lower, higher)`.
    pub fn pairs(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.partner
            .iter()
            .enumerate()
            .filter_map(|(f, p)| p.filter(|&g| f < g).map(|g| (f, g)))
    }

    pub fn n_pairs(&self) -> usize {
        self.pairs().count()
    }

    /// Check `pair(pair(f)) == f` for every paired face.
    pub fn check_symmetric(&self) -> Result<(), MeshError> {
        for (face, p) in self.partner.iter().enumerate() {
            if let Some(partner) = *p {
                if self.partner(partner) != Some(face) {
                    return Err(MeshError::PeriodicAsymmetry { face, partner });
                }
            }
        }
        Ok(())
    }
}

/// Entries of `sorted` (ascending by key) whose key lies within `tol` of `key`.
fn transverse_window(sorted: &[(f64, usize)], key: f64, tol: f64) -> &[(f64, usize)] {
    let lo = sorted.partition_point(|&(k, _)| k < key - tol);
    let hi = sorted.partition_point(|&(k, _)| k <= key + tol);
    &sorted[lo..hi]
}

/// Pair the periodic faces of `mesh` as described by `config`.
///
/// Needs topology, boundary maps and face data. Every face of either group
/// must have exactly one partner.
pub fn match_periodic_faces(mesh: &Mesh2d, config: &PeriodicConfig) -> Result<PeriodicMap, MeshError> {
    config.validate()?;
    let topology = mesh.topology()?;
    let geometry = mesh.geometry()?;

    let group = |marker: i32| -> Vec<usize> {
        topology
            .exterior_faces()
            .filter(|&f| mesh.face_marker(f) == Some(marker))
            .collect()
    };
    let side_a = group(config.marker);
    let side_b = match config.partner_marker {
        Some(m) => group(m),
        None => side_a.clone(),
    };
    if side_a.is_empty() {
        log::warn!("no faces carry periodic marker {}", config.marker);
    }

    let centre = |f: usize| {
        let [a, b] = topology.face(f).points;
        midpoint(mesh.point(a), mesh.point(b))
    };
    let along = config.axis.index();
    let across = config.axis.transverse();

    let by_transverse = |side: &[usize]| -> Vec<(f64, usize)> {
        side.iter()
            .map(|&f| (centre(f)[across], f))
            .sorted_unstable_by(|a, b| a.0.total_cmp(&b.0))
            .collect()
    };
    let sorted_a = by_transverse(&side_a);
    let sorted_b = match config.partner_marker {
        Some(_) => by_transverse(&side_b),
        None => sorted_a.clone(),
    };

    let mut partner = vec![None; topology.n_faces()];
    let mut sides = vec![(&side_a, &sorted_b)];
    if config.partner_marker.is_some() {
        sides.push((&side_b, &sorted_a));
    }
    for (from, to) in sides {
        for &f in from {
            let cf = centre(f);
            let tol = config.tolerance * geometry.length(f);
            let mut matches = transverse_window(to, cf[across], tol)
                .iter()
                .map(|&(_, g)| g)
                .filter(|&g| g != f && (cf[along] - centre(g)[along]).abs() > tol);
            match (matches.next(), matches.count()) {
                (Some(g), 0) => partner[f] = Some(g),
                (first, rest) => {
                    return Err(MeshError::PeriodicMatch {
                        face: f,
                        matches: usize::from(first.is_some()) + rest,
                    });
                }
            }
        }
    }

    let map = PeriodicMap {
        config: config.clone(),
        partner,
    };
    map.check_symmetric()?;
    log::info!(
        "periodic map: {} face pairs along {:?} on marker {}",
        map.n_pairs(),
        config.axis,
        config.marker
    );
    Ok(map)
}
