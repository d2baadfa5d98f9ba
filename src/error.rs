//! Error kinds shared by the instance model, the optimization collaborator
//! and the column-generation engine.

use thiserror::Error;

/// Errors raised while building instances or solving branch nodes.
///
/// [`BnpError::MasterInfeasible`] prunes a node. [`BnpError::Solver`] means
/// the optimizer could not answer; the caller decides whether to retry or
/// abort.
#[derive(Debug, Error)]
pub enum BnpError {
    /// The restricted master LP has no feasible solution.
    #[error("restricted master problem is infeasible")]
    MasterInfeasible,

    /// The optimization collaborator failed for reasons unrelated to model
    /// feasibility (licensing, numerical trouble, unsupported query...).
    #[error("optimization backend failed: {message}")]
    Solver {
        /// Backend-supplied description.
        message: String,
    },

    /// The instance data violates a structural requirement.
    #[error("malformed instance: {reason}")]
    MalformedInstance {
        /// What was wrong with the data.
        reason: String,
    },

    /// A path uses an arc that has no cost in the instance.
    #[error("arc ({tail}, {head}) is not part of the instance")]
    UndefinedArc {
        /// Tail node of the missing arc.
        tail: usize,
        /// Head node of the missing arc.
        head: usize,
    },

    /// The instance file could not be parsed.
    #[cfg(feature = "json")]
    #[error("failed to parse instance: {0}")]
    Json(#[from] serde_json::Error),
}

impl BnpError {
    /// Shorthand for [`BnpError::MalformedInstance`].
    pub fn malformed(reason: impl Into<String>) -> Self {
        BnpError::MalformedInstance {
            reason: reason.into(),
        }
    }

    /// Shorthand for [`BnpError::Solver`].
    pub fn solver(message: impl Into<String>) -> Self {
        BnpError::Solver {
            message: message.into(),
        }
    }
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, BnpError>;
