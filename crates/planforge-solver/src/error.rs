use thiserror::Error;

/// Failures surfaced by the planner. Transport-level mapping (HTTP status
/// codes and the like) is the caller's business.
#[derive(Debug, Error)]
pub enum PlanError {
    /// A target item is not present in the catalog.
    #[error("unknown target item: {0}")]
    UnknownItem(String),
    /// After closure and fallback, these items are neither base resources
    /// nor produced by any active recipe.
    #[error("no active recipe produces: {}", .0.join(", "))]
    NoProducer(Vec<String>),
    #[error("request must contain at least one target")]
    EmptyTargets,
    #[error("invalid target: {0}")]
    InvalidTarget(String),
    /// The first optimization pass has no solution; no plan exists for the
    /// requested targets under the active recipe set.
    #[error("no feasible production plan exists for the given targets")]
    Infeasible,
    /// The solver backend itself failed, as opposed to the model having no
    /// solution. Reported distinctly so operators can tell the two apart.
    #[error("solver backend failed: {0}")]
    SolverUnavailable(String),
}
