//! Error taxonomy for the planner: a closed set of codes a caller can match
//! on directly. A user-visible misconfiguration (`Invalid`), a broken
//! invariant (`Internal`), a rule engine that failed to reach a fixpoint
//! (`Convergence`), and a cooperative cancellation (`Cancelled`).

use thiserror::Error;

/// The planner's result type.
pub type PlanResult<T> = Result<T, PlanError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlanError {
    /// A user-visible misconfiguration of the input plan: an unknown
    /// procedure kind, a malformed yield, a duplicate result name.
    #[error("invalid plan: {0}")]
    Invalid(String),

    /// An invariant of the plan or graph was violated: a spec cast failed,
    /// edge symmetry broke, a rule introduced a cycle. These indicate a bug
    /// in the planner or a rule, never bad user input.
    #[error("internal planner error: {0}")]
    Internal(String),

    /// The rule engine exceeded its pass bound without reaching a fixpoint.
    #[error("rules failed to converge after {passes} passes")]
    Convergence { passes: usize },

    /// Cancellation was observed between rule-engine passes or planning
    /// phases.
    #[error("plan cancelled")]
    Cancelled,
}

impl PlanError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        PlanError::Invalid(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        PlanError::Internal(msg.into())
    }
}
