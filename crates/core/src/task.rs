//! Task model - the simulated process every component works on.

use serde::{Deserialize, Serialize};
use crate::id::Pid;

/// Logical simulation time. Advanced by the scheduling loop, never wall-clock.
pub type Tick = i64;

/// Name of a simulated resource (e.g. `"R1"`).
pub type ResourceId = String;

/// A simulated process.
///
/// The first block of fields is caller input and may be edited between runs.
/// The derived block (`start` through `status`) is written only by the
/// metrics calculator and is reset at the beginning of every run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Unique identifier
    pub pid: Pid,

    /// Display name
    pub name: String,

    /// Time at which the process becomes eligible
    pub arrival: Tick,

    /// Total CPU time required
    pub burst: Tick,

    /// Scheduling priority, lower value runs first
    #[serde(default)]
    pub priority: i64,

    /// Resource currently held
    #[serde(default)]
    pub holding: Option<ResourceId>,

    /// Resource currently waited on
    #[serde(default)]
    pub waiting: Option<ResourceId>,

    /// First time on the CPU
    #[serde(default)]
    pub start: Option<Tick>,

    /// Time the last slice ended
    #[serde(default)]
    pub completion: Option<Tick>,

    /// `completion - arrival - burst`
    #[serde(default)]
    pub waiting_time: Option<Tick>,

    /// `completion - arrival`
    #[serde(default)]
    pub turnaround: Option<Tick>,

    /// Run status
    #[serde(default)]
    pub status: TaskStatus,
}

/// Whether a task received CPU time in the latest run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskStatus {
    /// Not (yet) scheduled
    #[default]
    Waiting,
    /// Appears in the latest timeline
    Completed,
}

impl TaskStatus {
    /// Get string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Waiting => "Waiting",
            TaskStatus::Completed => "Completed",
        }
    }
}

impl Task {
    /// Create a task with zero priority and no resource claims.
    ///
    /// `arrival` is clamped to `>= 0` and `burst` to `>= 1`.
    pub fn new(pid: Pid, name: impl Into<String>, arrival: Tick, burst: Tick) -> Self {
        Self {
            pid,
            name: name.into(),
            arrival: arrival.max(0),
            burst: burst.max(1),
            priority: 0,
            holding: None,
            waiting: None,
            start: None,
            completion: None,
            waiting_time: None,
            turnaround: None,
            status: TaskStatus::Waiting,
        }
    }

    /// Set priority.
    pub fn with_priority(mut self, priority: i64) -> Self {
        self.priority = priority;
        self
    }

    /// Set the held resource. Blank names clear it.
    pub fn with_holding(mut self, resource: impl AsRef<str>) -> Self {
        self.holding = normalize_resource(resource.as_ref());
        self
    }

    /// Set the awaited resource. Blank names clear it.
    pub fn with_waiting(mut self, resource: impl AsRef<str>) -> Self {
        self.waiting = normalize_resource(resource.as_ref());
        self
    }

    /// Burst used by the scheduler, never below one tick.
    pub fn effective_burst(&self) -> Tick {
        self.burst.max(1)
    }

    /// Clear every derived field.
    pub fn reset_derived(&mut self) {
        self.start = None;
        self.completion = None;
        self.waiting_time = None;
        self.turnaround = None;
        self.status = TaskStatus::Waiting;
    }

    /// Copy derived fields from an annotated copy of the same task.
    pub fn copy_derived_from(&mut self, other: &Task) {
        self.start = other.start;
        self.completion = other.completion;
        self.waiting_time = other.waiting_time;
        self.turnaround = other.turnaround;
        self.status = other.status;
    }
}

/// Trim a resource name; empty means "none".
pub fn normalize_resource(name: &str) -> Option<ResourceId> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
