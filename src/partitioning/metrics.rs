//! Partition quality metrics.
//!
//! Intended for logging, tests and comparing backends; nothing in the
//! decomposition path depends on them.

use super::ElementPartition;
use crate::topology::connectivity::Topology;

/// Number of interior faces whose two elements lie on different ranks.
///
/// Each such face shows up as one connectivity face on each side.
pub fn edge_cut(topology: &Topology, partition: &ElementPartition) -> usize {
    topology
        .interior_faces()
        .filter(|&f| {
            let face = topology.face(f);
            face.right
                .element()
                .is_some_and(|r| partition.rank_of(face.left) != partition.rank_of(r))
        })
        .count()
}

/// Elements per rank.
pub fn part_sizes(partition: &ElementPartition) -> Vec<usize> {
    partition.counts()
}

/// Largest part size over the mean part size; `1.0` is perfect balance.
pub fn imbalance(partition: &ElementPartition) -> f64 {
    if partition.is_empty() {
        return 1.0;
    }
    let sizes = partition.counts();
    let max = sizes.iter().copied().max().unwrap_or(0) as f64;
    let mean = partition.len() as f64 / partition.n_parts() as f64;
    max / mean
}
