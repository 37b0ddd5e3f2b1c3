//! Resource safety - deadlock detection over a wait-for graph and
//! admission control with the Banker's algorithm.
//!
//! Both halves work on caller-owned snapshots. The detector builds its graph
//! fresh on every call; the Banker's engine only commits a request once the
//! tentative state has been proven safe.

#![warn(missing_docs)]

pub mod wait_for;
pub mod deadlock;
pub mod banker;
pub mod error;

pub use wait_for::{WaitForGraph, WaitEdge};
pub use deadlock::{DeadlockDetector, DeadlockReport, detect};
pub use banker::{
    SafetyState, ProcessClaim, ResourceVector, RequestOutcome, is_safe, safe_sequence,
};
pub use error::{SafetyError, Result};
