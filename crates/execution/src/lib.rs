//! Execution layer - task selection, timeline computation, and simulation runs.

#![warn(missing_docs)]

pub mod selector;
pub mod scheduler;
pub mod config;
pub mod engine;

pub use selector::{TaskSelector, SelectorStrategy, Candidate};
pub use scheduler::{Scheduler, schedule, schedule_named};
pub use config::SimConfig;
pub use engine::{SimulationEngine, SimulationRun, Comparison, ComparisonEntry, ExecutionError};
