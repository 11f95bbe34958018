//! MeshError: unified error type for fvmesh public APIs
//!
//! Every failure in this crate is a structural or invariant violation of the
//! mesh, the partition, or the configuration. None of them is transient, so
//! callers are expected to abort mesh setup on the first error.

use thiserror::Error;

/// Broad classification of a [`MeshError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Bad user or runtime configuration (process count, strategy name, ...).
    Configuration,
    /// A face, boundary face or periodic partner could not be resolved.
    Topology,
    /// An index fell outside the range it must lie in.
    Index,
}

/// Unified error type for fvmesh operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MeshError {
    /// A partition into zero parts was requested.
    #[error("Configuration error: process count must be positive")]
    ZeroProcesses,
    /// More processes than elements.
    #[error(
        "Configuration error: not enough cells ({n_elems}) in this mesh for {n_parts} processes"
    )]
    TooFewElements { n_elems: usize, n_parts: usize },
    /// Unknown partitioner strategy name.
    #[error("Configuration error: unknown partitioner strategy `{0}`")]
    UnknownPartitioner(String),
    /// Rank does not belong to the communicator.
    #[error("Configuration error: rank {rank} outside a communicator of size {size}")]
    RankOutOfRange { rank: usize, size: usize },
    /// Partition and parallel context disagree on the number of processes.
    #[error("Configuration error: partition has {partition} parts but {processes} processes run")]
    PartCountMismatch { partition: usize, processes: usize },
    /// The external-graph strategy was selected without a backend.
    #[error("Configuration error: the external-graph strategy needs a graph partitioner backend")]
    MissingGraphPartitioner,
    /// Any other configuration problem.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A local face matched more than one neighbouring element.
    #[error("Topology error: face {face} of element {elem} is shared by {candidates} other elements")]
    NonManifoldFace {
        elem: usize,
        face: usize,
        candidates: usize,
    },
    /// Element adjacency is not symmetric.
    #[error("Topology error: element {elem} neighbours {neighbor}, which does not neighbour it back exactly once")]
    AsymmetricAdjacency { elem: usize, neighbor: usize },
    /// A boundary face has no counterpart in the unified face list.
    #[error("Topology error: boundary face {bface} with points {nodes:?} matches no exterior face")]
    UnmatchedBoundaryFace { bface: usize, nodes: [usize; 2] },
    /// Two boundary faces resolve to the same exterior face.
    #[error("Topology error: boundary faces {previous} and {bface} both match face {face}")]
    DuplicateBoundaryFace {
        bface: usize,
        previous: usize,
        face: usize,
    },
    /// Two exterior faces share the same point set.
    #[error("Topology error: exterior faces {first} and {second} share the same points")]
    DuplicateExteriorFace { first: usize, second: usize },
    /// A periodic face has zero or several geometric partners.
    #[error("Topology error: periodic face {face} has {matches} geometric matches, expected exactly one")]
    PeriodicMatch { face: usize, matches: usize },
    /// The periodic pairing is not an involution.
    #[error("Topology error: periodic face {face} pairs with {partner}, which does not pair back")]
    PeriodicAsymmetry { face: usize, partner: usize },
    /// A connectivity face could not be found on the global mesh.
    #[error("Topology error: rank {rank} could not resolve connectivity face {local_face} of global element {elem}")]
    UnresolvedConnectivityFace {
        rank: usize,
        elem: usize,
        local_face: usize,
    },
    /// A boundary point does not belong to exactly two boundary faces.
    #[error("Topology error: boundary point {point} belongs to {count} boundary faces, expected 2")]
    BoundaryPointValence { point: usize, count: usize },
    /// A derived structure was requested before it was computed.
    #[error("Topology error: {0} has not been computed")]
    NotComputed(&'static str),
    /// Degenerate geometry, e.g. a zero-length face.
    #[error("Topology error: invalid geometry: {0}")]
    InvalidGeometry(String),

    /// An element references a point that does not exist.
    #[error("Index error: element {elem} references point {point}, but the mesh has {n_points} points")]
    PointIndexOutOfRange {
        elem: usize,
        point: usize,
        n_points: usize,
    },
    /// A boundary face references a point that does not exist.
    #[error("Index error: boundary face {bface} references point {point}, but the mesh has {n_points} points")]
    BoundaryPointOutOfRange {
        bface: usize,
        point: usize,
        n_points: usize,
    },
    /// A global point needed on this rank is not part of the local point set.
    #[error("Index error: global point {point} is not present on rank {rank}")]
    PointNotLocal { point: usize, rank: usize },
    /// A local point that no local element references.
    #[error("Index error: global point {point} is stored on rank {rank} but no local element references it")]
    UnusedLocalPoint { point: usize, rank: usize },
    /// A local → global map is not strictly ascending or does not match the
    /// local entity count.
    #[error("Index error: rank {rank}: local-to-global {entity} map is not strictly ascending with one entry per local {entity}")]
    UnsortedLocalMap { entity: &'static str, rank: usize },
    /// The partition does not cover the mesh.
    #[error("Index error: partition has {got} entries for {expected} elements")]
    PartitionLengthMismatch { expected: usize, got: usize },
    /// An element is assigned to a rank outside the partition.
    #[error("Index error: element {elem} assigned to rank {rank}, outside [0, {n_parts})")]
    RankOutsidePartition {
        elem: usize,
        rank: usize,
        n_parts: usize,
    },
    /// A cell permutation is not a bijection.
    #[error("Index error: invalid permutation: {0}")]
    InvalidPermutation(String),
    /// An element with a node count other than 3 or 4.
    #[error("Index error: element {elem} has {n_nodes} nodes; only triangles and quadrilaterals are supported")]
    UnsupportedElement { elem: usize, n_nodes: usize },
    /// Inconsistent number of tags across elements or boundary faces.
    #[error("Index error: {entity} {index} carries {found} tags, expected {expected}")]
    TagCountMismatch {
        entity: &'static str,
        index: usize,
        expected: usize,
        found: usize,
    },
}

impl MeshError {
    /// Which of the three error families this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        use MeshError::*;
        match self {
            ZeroProcesses
            | TooFewElements { .. }
            | UnknownPartitioner(_)
            | RankOutOfRange { .. }
            | PartCountMismatch { .. }
            | MissingGraphPartitioner
            | Configuration(_) => ErrorKind::Configuration,
            NonManifoldFace { .. }
            | AsymmetricAdjacency { .. }
            | UnmatchedBoundaryFace { .. }
            | DuplicateBoundaryFace { .. }
            | DuplicateExteriorFace { .. }
            | PeriodicMatch { .. }
            | PeriodicAsymmetry { .. }
            | UnresolvedConnectivityFace { .. }
            | BoundaryPointValence { .. }
            | NotComputed(_)
            | InvalidGeometry(_) => ErrorKind::Topology,
            PointIndexOutOfRange { .. }
            | BoundaryPointOutOfRange { .. }
            | PointNotLocal { .. }
            | UnusedLocalPoint { .. }
            | UnsortedLocalMap { .. }
            | PartitionLengthMismatch { .. }
            | RankOutsidePartition { .. }
            | InvalidPermutation(_)
            | UnsupportedElement { .. }
            | TagCountMismatch { .. } => ErrorKind::Index,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_follow_error_families() {
        assert_eq!(MeshError::ZeroProcesses.kind(), ErrorKind::Configuration);
        assert_eq!(
            MeshError::PeriodicMatch { face: 3, matches: 0 }.kind(),
            ErrorKind::Topology
        );
        assert_eq!(
            MeshError::PointNotLocal { point: 7, rank: 1 }.kind(),
            ErrorKind::Index
        );
    }

    #[test]
    fn messages_name_the_offending_index() {
        let err = MeshError::TooFewElements {
            n_elems: 3,
            n_parts: 5,
        };
        let msg = err.to_string();
        assert!(msg.contains('3') && msg.contains('5'), "{msg}");
    }
}
