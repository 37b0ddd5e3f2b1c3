//! Deadlock detection over task resource claims.

use schedsim_core::{Pid, Task};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use crate::wait_for::WaitForGraph;

/// Result of a deadlock check.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeadlockReport {
    /// Whether a wait-for cycle exists
    pub found: bool,
    /// Pids on the first cycle found, in traversal order; empty when none
    pub cycle: Vec<Pid>,
}

impl DeadlockReport {
    /// Report for a deadlock-free snapshot.
    pub fn none() -> Self {
        Self::default()
    }

    /// Whether `pid` is on the reported cycle.
    pub fn involves(&self, pid: Pid) -> bool {
        self.cycle.contains(&pid)
    }
}

/// Detects circular waits between tasks.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeadlockDetector;

impl DeadlockDetector {
    /// Create a new detector.
    pub fn new() -> Self {
        Self
    }

    /// Check `tasks` for a circular wait.
    pub fn detect(&self, tasks: &[Task]) -> DeadlockReport {
        self.analyze(tasks).1
    }

    /// Check `tasks` and also return the wait-for graph that was searched.
    pub fn analyze(&self, tasks: &[Task]) -> (WaitForGraph, DeadlockReport) {
        let graph = WaitForGraph::build(tasks);
        debug!(
            "Wait-for graph: {} tasks, {} edges",
            tasks.len(),
            graph.edges().len()
        );

        let report = match graph.find_cycle() {
            Some(cycle) => {
                warn!("Circular wait detected: {:?}", cycle);
                DeadlockReport { found: true, cycle }
            }
            None => DeadlockReport::none(),
        };
        (graph, report)
    }
}

/// Check `tasks` for a circular wait.
pub fn detect(tasks: &[Task]) -> DeadlockReport {
    DeadlockDetector::new().detect(tasks)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(pid: u32, holding: &str, waiting: &str) -> Task {
        Task::new(Pid::new(pid), format!("P{pid}"), 0, 1)
            .with_holding(holding)
            .with_waiting(waiting)
    }

    #[test]
    fn test_classic_two_process_deadlock() {
        let tasks = vec![task(1, "R1", "R2"), task(2, "R2", "R1"), task(3, "", "")];
        let report = detect(&tasks);
        assert!(report.found);
        assert_eq!(report.cycle, vec![Pid::new(1), Pid::new(2)]);
        assert!(report.involves(Pid::new(2)));
        assert!(!report.involves(Pid::new(3)));
    }

    #[test]
    fn test_chain_without_cycle() {
        let tasks = vec![task(1, "R1", "R2"), task(2, "R2", "R3"), task(3, "R3", "")];
        assert_eq!(detect(&tasks), DeadlockReport::none());
    }

    #[test]
    fn test_waiting_on_unheld_resource() {
        let tasks = vec![task(1, "", "R9"), task(2, "R1", "")];
        assert!(!detect(&tasks).found);
    }

    #[test]
    fn test_empty_snapshot() {
        let report = detect(&[]);
        assert!(!report.found);
        assert!(report.cycle.is_empty());
    }

    #[test]
    fn test_analyze_returns_graph() {
        let tasks = vec![task(1, "R1", "R2"), task(2, "R2", "R1")];
        let (graph, report) = DeadlockDetector::new().analyze(&tasks);
        assert!(report.found);
        assert_eq!(graph.edges().len(), 2);
    }

    #[test]
    fn test_report_serializes() {
        let report = DeadlockReport { found: true, cycle: vec![Pid::new(2), Pid::new(5)] };
        let json = serde_json::to_string(&report).unwrap();
        assert_eq!(json, r#"{"found":true,"cycle":[2,5]}"#);
    }
}
