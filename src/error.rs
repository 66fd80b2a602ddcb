//! Fatal solve errors.
//!
//! Per-stop infeasibility and exhausted budgets are not errors: they are
//! reported on the [`Solution`](crate::models::Solution).

use thiserror::Error;

use crate::models::StopId;

/// Errors that abort a solve.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SolveError {
    /// Stop input is malformed: duplicate identifiers, unknown stops or
    /// non-finite values.
    #[error("invalid stop set: {reason}")]
    InvalidStopSet {
        /// Human-readable description of the violation.
        reason: String,
    },
    /// The travel-cost index has no entry for a required ordered pair.
    #[error("no travel cost from `{from}` to `{to}`")]
    UnreachableEdge {
        /// Origin of the missing leg.
        from: StopId,
        /// Destination of the missing leg.
        to: StopId,
    },
    /// Solver configuration is out of range.
    #[error("invalid solver configuration: {reason}")]
    InvalidConfig {
        /// Human-readable description of the violation.
        reason: String,
    },
}

impl SolveError {
    pub(crate) fn invalid_stop_set(reason: impl Into<String>) -> Self {
        Self::InvalidStopSet {
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            reason: reason.into(),
        }
    }

    pub(crate) fn unreachable(from: &StopId, to: &StopId) -> Self {
        Self::UnreachableEdge {
            from: from.clone(),
            to: to.clone(),
        }
    }
}

/// Result alias for fallible solver operations.
pub type Result<T> = std::result::Result<T, SolveError>;
