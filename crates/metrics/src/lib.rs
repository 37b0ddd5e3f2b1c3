//! Metrics layer - per-task timing fields and aggregate statistics derived
//! from an execution timeline.

#![warn(missing_docs, unused_crate_dependencies)]

mod calculator;
mod power;

pub use calculator::{Metrics, apply_timeline, annotated, compute_metrics};
pub use power::{PowerModel, PowerReport, MetricsError, DEFAULT_IDLE_FACTOR};
