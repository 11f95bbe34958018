//! Decomposition configuration.
//!
//! Parsing command lines or control files is left to the caller; this module
//! only defines the values the mesh layer consumes. Every type deserialises
//! with serde, and strategy names also parse with [`FromStr`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::mesh_error::MeshError;

/// Which partitioner assigns elements to ranks.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PartitionStrategy {
    /// Contiguous blocks of elements.
    #[default]
    Trivial,
    /// Dual-graph partitioning by an external backend.
    ExternalGraph,
}

impl FromStr for PartitionStrategy {
    type Err = MeshError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "trivial" => Ok(PartitionStrategy::Trivial),
            "external-graph" | "external_graph" => Ok(PartitionStrategy::ExternalGraph),
            _ => Err(MeshError::UnknownPartitioner(s.to_string())),
        }
    }
}

impl fmt::Display for PartitionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PartitionStrategy::Trivial => "trivial",
            PartitionStrategy::ExternalGraph => "external-graph",
        })
    }
}

/// Coordinate axis.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    #[default]
    X,
    Y,
}

impl Axis {
    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
        }
    }

    /// The coordinate that must agree between periodic partners.
    pub fn transverse(self) -> usize {
        1 - self.index()
    }
}

impl FromStr for Axis {
    type Err = MeshError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "x" | "X" | "0" => Ok(Axis::X),
            "y" | "Y" | "1" => Ok(Axis::Y),
            _ => Err(MeshError::Configuration(format!("unknown axis `{s}`"))),
        }
    }
}

fn default_tolerance() -> f64 {
    1e-6
}

/// Periodic boundary description.
///
/// Faces tagged `marker` are paired with faces tagged `partner_marker`
/// (or with other faces tagged `marker` when no partner is given) that
/// coincide after translation along `axis`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PeriodicConfig {
    pub marker: i32,
    #[serde(default)]
    pub partner_marker: Option<i32>,
    pub axis: Axis,
    /// Matching tolerance relative to the face length.
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,
}

impl PeriodicConfig {
    pub fn new(marker: i32, axis: Axis) -> Self {
        Self {
            marker,
            partner_marker: None,
            axis,
            tolerance: default_tolerance(),
        }
    }

    pub fn with_partner(mut self, partner_marker: i32) -> Self {
        self.partner_marker = Some(partner_marker);
        self
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn validate(&self) -> Result<(), MeshError> {
        if !(self.tolerance > 0.0 && self.tolerance.is_finite()) {
            return Err(MeshError::Configuration(format!(
                "periodic tolerance must be positive and finite, got {}",
                self.tolerance
            )));
        }
        Ok(())
    }
}

/// Everything the decomposition step needs besides the mesh and the
/// parallel context.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecompositionConfig {
    pub partitioner: PartitionStrategy,
    pub periodic: Option<PeriodicConfig>,
}

impl DecompositionConfig {
    pub fn validate(&self) -> Result<(), MeshError> {
        match &self.periodic {
            Some(p) => p.validate(),
            None => Ok(()),
        }
    }
}
