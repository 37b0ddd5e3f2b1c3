//! SchedSim core data models.
//!
//! This crate defines the records shared by the scheduler, the metrics
//! calculator and the deadlock detector: tasks, pids, timelines and policy
//! identifiers.

#![warn(missing_docs)]

// Identity
mod id;

// Task model
mod task;
mod timeline;
mod policy;
mod registry;

mod error;

// Re-exports
pub use id::Pid;
pub use task::{Task, TaskStatus, Tick, ResourceId, normalize_resource};
pub use timeline::{Segment, Timeline};
pub use policy::{Policy, DEFAULT_QUANTUM};
pub use registry::{TaskRegistry, ensure_unique_pids};
pub use error::{CoreError, Result};
