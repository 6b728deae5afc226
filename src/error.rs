use thiserror::Error;

/// Failures a dispatch call can surface to its caller.
///
/// A solver reporting an infeasible or unbounded model is NOT an error at
/// this level: it comes back as a [`crate::domain::DispatchPlan`] carrying
/// the failure status, so a sensitivity sweep can skip that scenario and
/// keep going.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The forecast series or battery parameters are malformed. Raised
    /// before any model construction; no optimization is attempted.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The external LP solver could not be invoked or failed internally.
    /// Fatal for the call; never silently substituted with the greedy
    /// heuristic. Retry policy belongs to the caller.
    #[error("solver unavailable: {0}")]
    SolverUnavailable(String),
}
