//! Task selection strategies.

use schedsim_core::{Task, Tick};

/// A task eligible for the CPU at the current decision point.
#[derive(Debug, Clone, Copy)]
pub struct Candidate<'a> {
    /// The task
    pub task: &'a Task,
    /// CPU time still owed to it
    pub remaining: Tick,
}

/// Strategy for picking the next task among the ready ones.
pub trait TaskSelector {
    /// Index into `candidates` of the task to run, `None` if empty.
    ///
    /// `candidates` is in ready-list order; when keys tie, implementations
    /// pick the earliest entry.
    fn select(&self, candidates: &[Candidate<'_>]) -> Option<usize>;
}

/// Built-in selection strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectorStrategy {
    /// Minimum `(burst, arrival, pid)`
    ShortestJob,
    /// Minimum `(priority, arrival, pid)`
    HighestPriority,
    /// Maximum `(burst, arrival, pid)`
    LongestJob,
    /// Minimum remaining burst, ties by ready order
    ShortestRemaining,
    /// Minimum static priority, ties by ready order
    PreemptivePriority,
}

impl TaskSelector for SelectorStrategy {
    fn select(&self, candidates: &[Candidate<'_>]) -> Option<usize> {
        let indexed = candidates.iter().enumerate();
        let picked = match self {
            Self::ShortestJob => {
                indexed.min_by_key(|(_, c)| (c.task.effective_burst(), c.task.arrival, c.task.pid))
            }
            Self::HighestPriority => {
                indexed.min_by_key(|(_, c)| (c.task.priority, c.task.arrival, c.task.pid))
            }
            Self::LongestJob => {
                indexed.max_by_key(|(_, c)| (c.task.effective_burst(), c.task.arrival, c.task.pid))
            }
            // min_by_key keeps the first of equal minima, which is the tie rule.
            Self::ShortestRemaining => indexed.min_by_key(|(_, c)| c.remaining),
            Self::PreemptivePriority => indexed.min_by_key(|(_, c)| c.task.priority),
        };
        picked.map(|(i, _)| i)
    }
}
