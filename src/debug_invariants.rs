//! Opt-in invariant checking for meshes and decompositions.

use crate::mesh_error::MeshError;

/// Structures whose derived data can be checked against their raw data.
pub trait DebugInvariants {
    /// Panic on a broken invariant when invariant checking is compiled in;
    /// a no-op otherwise.
    fn debug_assert_invariants(&self);
    /// Check every invariant and return the first violation.
    fn validate_invariants(&self) -> Result<(), MeshError>;
}

/// Run a fallible check and panic with context on error, in debug builds or
/// with the `check-invariants` feature.
#[macro_export]
macro_rules! debug_invariants {
    ($expr:expr, $($ctx:tt)*) => {
        #[cfg(any(debug_assertions, feature = "check-invariants"))]
        if let Err(e) = $expr {
            panic!(concat!("[invariants] ", $($ctx)*, ": {}"), e);
        }
    };
}
