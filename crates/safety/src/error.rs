//! Errors from the resource safety engine.

use schedsim_core::Pid;

/// Result alias for safety operations.
pub type Result<T> = std::result::Result<T, SafetyError>;

/// Errors that can occur when mutating a [`SafetyState`](crate::SafetyState).
///
/// The three request rejections (`ExceedsMaxNeed`, `InsufficientAvailable`,
/// `UnsafeState`) are kept apart so callers can tell them apart.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SafetyError {
    /// No process with this pid is tracked
    #[error("PID not found: {0}")]
    PidNotFound(Pid),

    /// The resource type is not tracked in `available`
    #[error("Resource not found: {0}")]
    ResourceNotFound(String),

    /// The request is larger than the process's remaining need
    #[error("{pid} exceeds maximum need for {resource}: requested {requested}, need {need}")]
    ExceedsMaxNeed {
        /// Requesting process
        pid: Pid,
        /// Resource type
        resource: String,
        /// Units requested
        requested: u64,
        /// Units still needed
        need: u64,
    },

    /// Not enough free units right now
    #[error("{pid} insufficient available {resource}: requested {requested}, available {available}")]
    InsufficientAvailable {
        /// Requesting process
        pid: Pid,
        /// Resource type
        resource: String,
        /// Units requested
        requested: u64,
        /// Units free
        available: u64,
    },

    /// Granting the request would leave no safe completion order
    #[error("Request from {0} denied (unsafe state)")]
    UnsafeState(Pid),

    /// A process with this pid is already tracked
    #[error("Duplicate pid: {0}")]
    DuplicatePid(Pid),

    /// A claim allocates more than its declared maximum
    #[error("{pid} allocates {allocation} {resource} but declares a maximum of {max_need}")]
    InvalidClaim {
        /// Offending process
        pid: Pid,
        /// Resource type
        resource: String,
        /// Units allocated
        allocation: u64,
        /// Declared maximum
        max_need: u64,
    },

    /// A release returns more than the process holds
    #[error("{pid} releases {released} {resource} but holds {allocated}")]
    ExceedsAllocation {
        /// Releasing process
        pid: Pid,
        /// Resource type
        resource: String,
        /// Units released
        released: u64,
        /// Units held
        allocated: u64,
    },
}

impl SafetyError {
    /// Short reason string used in flat `(granted, reason)` outcomes.
    pub fn reason(&self) -> String {
        match self {
            Self::PidNotFound(_) => "PID not found".to_string(),
            Self::ResourceNotFound(_) => "resource not found".to_string(),
            Self::ExceedsMaxNeed { .. } => "exceeds maximum need".to_string(),
            Self::InsufficientAvailable { .. } => "insufficient available".to_string(),
            Self::UnsafeState(_) => "Request denied (unsafe state)".to_string(),
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reasons_stay_distinct() {
        let pid = Pid::new(1);
        let reasons = [
            SafetyError::PidNotFound(pid).reason(),
            SafetyError::ExceedsMaxNeed { pid, resource: "A".into(), requested: 4, need: 3 }.reason(),
            SafetyError::InsufficientAvailable { pid, resource: "A".into(), requested: 4, available: 3 }
                .reason(),
            SafetyError::UnsafeState(pid).reason(),
        ];
        assert_eq!(reasons[0], "PID not found");
        assert_eq!(reasons[1], "exceeds maximum need");
        assert_eq!(reasons[2], "insufficient available");
        assert_eq!(reasons[3], "Request denied (unsafe state)");
    }

    #[test]
    fn test_display_carries_detail() {
        let err = SafetyError::ExceedsMaxNeed { pid: Pid::new(1), resource: "A".into(), requested: 4, need: 3 };
        assert_eq!(err.to_string(), "P1 exceeds maximum need for A: requested 4, need 3");
    }
}
