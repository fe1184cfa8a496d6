//! Planner-wide tuning constants.

/// Total wall-clock budget for one optimization request, in seconds.
pub const DEFAULT_TIME_LIMIT_SECS: f64 = 20.0;

/// Relative MIP gap accepted by default. The bundled microlp backend solves
/// to optimality, so this only takes effect on gap-aware backends.
pub const DEFAULT_REL_GAP: f64 = 0.02;

/// Upper bound tying a machine-count variable to its binary activity toggle.
pub const BIG_M_MACHINE: f64 = 10_000.0;

/// Upper bound tying base-resource usage to its binary activity toggle.
pub const BIG_M_BASE: f64 = 100_000.0;

/// Flows below this are treated as zero when materializing the graph.
pub const FLOW_EPSILON: f64 = 1e-6;

/// Relative half-width of the band that pins solved objective components
/// between lexicographic passes, and of the target over-production bound.
pub const BAND_TOLERANCE: f64 = 1e-7;

/// Decimal digits kept on display values.
pub const PRECISION_DIGITS: i32 = 4;

/// Hard cap on dependency-closure worklist iterations, guarding against
/// pathological or cyclic catalogs.
pub const CLOSURE_ITERATION_CAP: usize = 10_000;
