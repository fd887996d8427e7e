// ============================================================================
// spark-observables - Constants
// Property names and defaults shared by every observable container
// ============================================================================

// =============================================================================
// DERIVED PROPERTY NAMES
// =============================================================================

/// Raised on `properties_changed` when a collection's length changes.
pub const LENGTH: &str = "length";

/// Raised on `properties_changed` when a set's or map's size changes.
pub const SIZE: &str = "size";

// =============================================================================
// JOIN
// =============================================================================

/// Separator used by `join` when none is given.
pub const DEFAULT_SEPARATOR: &str = ",";

// =============================================================================
// TRACING
// =============================================================================

/// Target for every trace event emitted by this crate.
#[cfg(feature = "tracing")]
pub(crate) const TRACE_TARGET: &str = "spark_observables";
