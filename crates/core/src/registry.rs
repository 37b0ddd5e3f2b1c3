//! Caller-side task registry.
//!
//! The scheduling components never hand out pids themselves; they only
//! require that the pids they are given are unique. The registry is where
//! that uniqueness comes from.

use std::collections::HashSet;
use crate::error::{CoreError, Result};
use crate::{Pid, Task, Tick};

/// Owns the editable task list and the monotonic pid counter.
#[derive(Debug, Clone)]
pub struct TaskRegistry {
    tasks: Vec<Task>,
    next_pid: u32,
}

impl TaskRegistry {
    /// Create an empty registry. The first pid handed out is 1.
    pub fn new() -> Self {
        Self {
            tasks: Vec::new(),
            next_pid: 1,
        }
    }

    /// Register a new task and return its pid.
    ///
    /// A blank name defaults to `P<pid>`. Blank resource names mean
    /// "none"; arrival and burst are clamped like [`Task::new`].
    pub fn add(
        &mut self,
        name: &str,
        arrival: Tick,
        burst: Tick,
        priority: i64,
        holding: &str,
        waiting: &str,
    ) -> Pid {
        let pid = Pid::new(self.next_pid);
        self.next_pid += 1;

        let name = match name.trim() {
            "" => pid.to_string(),
            n => n.to_string(),
        };
        let task = Task::new(pid, name, arrival, burst)
            .with_priority(priority)
            .with_holding(holding)
            .with_waiting(waiting);
        self.tasks.push(task);
        pid
    }

    /// Insert a fully formed task, keeping the counter ahead of its pid.
    pub fn insert(&mut self, task: Task) -> Result<()> {
        if self.get(task.pid).is_some() {
            return Err(CoreError::InvalidTask {
                pid: task.pid,
                reason: "duplicate pid".to_string(),
            });
        }
        self.next_pid = self.next_pid.max(task.pid.get() + 1);
        self.tasks.push(task);
        Ok(())
    }

    /// Remove a task. Its pid is not handed out again.
    pub fn remove(&mut self, pid: Pid) -> Option<Task> {
        let idx = self.tasks.iter().position(|t| t.pid == pid)?;
        Some(self.tasks.remove(idx))
    }

    /// Drop every task and restart numbering at 1.
    pub fn clear(&mut self) {
        self.tasks.clear();
        self.next_pid = 1;
    }

    /// Get a task by pid.
    pub fn get(&self, pid: Pid) -> Option<&Task> {
        self.tasks.iter().find(|t| t.pid == pid)
    }

    /// Get a task for editing between runs.
    pub fn get_mut(&mut self, pid: Pid) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|t| t.pid == pid)
    }

    /// Tasks in insertion order.
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Number of registered tasks.
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Whether no task is registered.
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Owned copy handed to a simulation run.
    pub fn snapshot(&self) -> Vec<Task> {
        self.tasks.clone()
    }

    /// Copy derived fields from an annotated snapshot back into the registry.
    ///
    /// Tasks that were removed in the meantime are skipped.
    pub fn absorb_results(&mut self, annotated: &[Task]) {
        for result in annotated {
            if let Some(task) = self.get_mut(result.pid) {
                task.copy_derived_from(result);
            }
        }
    }
}

impl Default for TaskRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Check that every pid in `tasks` is unique.
pub fn ensure_unique_pids(tasks: &[Task]) -> Result<()> {
    let mut seen = HashSet::with_capacity(tasks.len());
    for task in tasks {
        if !seen.insert(task.pid) {
            return Err(CoreError::InvalidTask {
                pid: task.pid,
                reason: "duplicate pid".to_string(),
            });
        }
    }
    Ok(())
}
