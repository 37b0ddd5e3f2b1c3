//! Errors raised by the task model and the scheduler contract.

use crate::Pid;

/// Result alias for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;

/// Errors that can occur when validating tasks or resolving a policy.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoreError {
    /// A task violates a caller precondition.
    #[error("Invalid task {pid}: {reason}")]
    InvalidTask {
        /// Offending task
        pid: Pid,
        /// What is wrong with it
        reason: String,
    },

    /// The policy identifier is not one of the supported algorithms.
    #[error("Unknown algorithm: {0}")]
    UnknownAlgorithm(String),
}
