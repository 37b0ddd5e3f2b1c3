//! Timeline computation for every supported policy.
//!
//! All loops share the same conventions:
//! - tasks are admitted in `(arrival, pid)` order, so tasks that become
//!   eligible at the same tick always join the ready list by ascending pid;
//! - the clock starts at 0 and jumps straight to the next arrival whenever
//!   nothing is ready;
//! - bursts below one tick are treated as one tick.

use std::collections::VecDeque;
use std::ops::Range;
use schedsim_core::{
    ensure_unique_pids, CoreError, Policy, Result, Task, Tick, Timeline, DEFAULT_QUANTUM,
};
use tracing::debug;
use crate::selector::{Candidate, SelectorStrategy, TaskSelector};

/// Computes execution timelines.
#[derive(Debug, Clone, Copy)]
pub struct Scheduler {
    quantum: Tick,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self { quantum: DEFAULT_QUANTUM }
    }
}

impl Scheduler {
    /// Create a scheduler with the default Round Robin quantum.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the Round Robin quantum. Values below one are clamped to one.
    pub fn with_quantum(mut self, quantum: Tick) -> Self {
        self.quantum = quantum.max(1);
        self
    }

    /// Round Robin quantum in effect.
    pub fn quantum(&self) -> Tick {
        self.quantum
    }

    /// Compute the merged timeline of `tasks` under `policy`.
    ///
    /// Fails with `InvalidTask` when two tasks share a pid or when the set
    /// could run past the last representable tick. An empty task set yields
    /// an empty timeline.
    pub fn schedule(&self, tasks: &[Task], policy: Policy) -> Result<Timeline> {
        ensure_unique_pids(tasks)?;
        ensure_clock_fits(tasks)?;

        let order = admission_order(tasks);
        let timeline = match policy {
            Policy::Fcfs => run_fcfs(&order),
            Policy::SjfNonPreemptive => run_non_preemptive(&order, &SelectorStrategy::ShortestJob),
            Policy::SjfPreemptive => run_preemptive(&order, &SelectorStrategy::ShortestRemaining),
            Policy::PriorityNonPreemptive => {
                run_non_preemptive(&order, &SelectorStrategy::HighestPriority)
            }
            Policy::PriorityPreemptive => {
                run_preemptive(&order, &SelectorStrategy::PreemptivePriority)
            }
            Policy::Ljf => run_non_preemptive(&order, &SelectorStrategy::LongestJob),
            Policy::RoundRobin => run_round_robin(&order, self.quantum),
        };

        debug!(
            "{} scheduled {} tasks into {} segments",
            policy,
            tasks.len(),
            timeline.len()
        );
        Ok(timeline)
    }

    /// Like [`Scheduler::schedule`], with a caller-supplied selection
    /// strategy driving either the run-to-completion or the unit-step loop.
    pub fn schedule_with(
        &self,
        tasks: &[Task],
        selector: &dyn TaskSelector,
        preemptive: bool,
    ) -> Result<Timeline> {
        ensure_unique_pids(tasks)?;
        ensure_clock_fits(tasks)?;
        let order = admission_order(tasks);
        Ok(if preemptive {
            run_preemptive(&order, selector)
        } else {
            run_non_preemptive(&order, selector)
        })
    }
}

/// Compute the timeline of `tasks` under `policy`.
///
/// `quantum` only matters for Round Robin; `None` means the default of 2.
pub fn schedule(tasks: &[Task], policy: Policy, quantum: Option<Tick>) -> Result<Timeline> {
    Scheduler::new()
        .with_quantum(quantum.unwrap_or(DEFAULT_QUANTUM))
        .schedule(tasks, policy)
}

/// Resolve `name` to a policy and compute the timeline.
///
/// An unrecognised name fails with `UnknownAlgorithm`; no fallback policy
/// is substituted.
pub fn schedule_named(tasks: &[Task], name: &str, quantum: Option<Tick>) -> Result<Timeline> {
    let policy: Policy = name.parse()?;
    schedule(tasks, policy, quantum)
}

fn admission_order(tasks: &[Task]) -> Vec<&Task> {
    let mut order: Vec<&Task> = tasks.iter().collect();
    order.sort_by_key(|t| (t.arrival, t.pid));
    order
}

/// The clock never passes the latest arrival plus the total burst; that
/// bound, and its distance back to every arrival, must fit in a `Tick`.
fn ensure_clock_fits(tasks: &[Task]) -> Result<()> {
    let overflow = |task: &Task| CoreError::InvalidTask {
        pid: task.pid,
        reason: "timeline would overflow the clock".to_string(),
    };

    let mut total: Tick = 0;
    let mut latest: Option<&Task> = None;
    for task in tasks {
        total = total.checked_add(task.effective_burst()).ok_or_else(|| overflow(task))?;
        if latest.map_or(true, |l| task.arrival > l.arrival) {
            latest = Some(task);
        }
    }

    let Some(latest) = latest else {
        return Ok(());
    };
    let horizon = latest
        .arrival
        .max(0)
        .checked_add(total)
        .ok_or_else(|| overflow(latest))?;

    for task in tasks {
        if horizon.checked_sub(task.arrival).is_none() {
            return Err(overflow(task));
        }
    }
    Ok(())
}

/// Cursor over tasks in admission order.
struct Arrivals<'a> {
    order: &'a [&'a Task],
    next: usize,
}

impl<'a> Arrivals<'a> {
    fn new(order: &'a [&'a Task]) -> Self {
        Self { order, next: 0 }
    }

    /// Indices of tasks that arrived by `clock` and were not admitted yet.
    fn admit_until(&mut self, clock: Tick) -> Range<usize> {
        let first = self.next;
        while self.next < self.order.len() && self.order[self.next].arrival <= clock {
            self.next += 1;
        }
        first..self.next
    }

    fn next_arrival(&self) -> Option<Tick> {
        self.order.get(self.next).map(|t| t.arrival)
    }
}

fn run_fcfs(order: &[&Task]) -> Timeline {
    let mut timeline = Timeline::new();
    let mut clock: Tick = 0;
    for task in order {
        let start = clock.max(task.arrival);
        let end = start + task.effective_burst();
        timeline.push(task.pid, start, end);
        clock = end;
    }
    timeline
}

fn run_non_preemptive(order: &[&Task], selector: &dyn TaskSelector) -> Timeline {
    let mut timeline = Timeline::new();
    let mut done = vec![false; order.len()];
    let mut completed = 0;
    let mut clock: Tick = 0;

    while completed < order.len() {
        let ready: Vec<usize> = (0..order.len())
            .filter(|&i| !done[i] && order[i].arrival <= clock)
            .collect();

        if ready.is_empty() {
            // order is sorted by arrival, so the first pending task is the next one in
            match (0..order.len()).find(|&i| !done[i]) {
                Some(i) => {
                    clock = order[i].arrival;
                    continue;
                }
                None => break,
            }
        }

        let candidates: Vec<Candidate<'_>> = ready
            .iter()
            .map(|&i| Candidate { task: order[i], remaining: order[i].effective_burst() })
            .collect();
        let Some(pick) = selector.select(&candidates) else {
            break;
        };

        let idx = ready[pick];
        let task = order[idx];
        let start = clock.max(task.arrival);
        let end = start + task.effective_burst();
        timeline.push(task.pid, start, end);
        clock = end;
        done[idx] = true;
        completed += 1;
    }

    timeline
}

fn run_preemptive(order: &[&Task], selector: &dyn TaskSelector) -> Timeline {
    let mut timeline = Timeline::new();
    let mut remaining: Vec<Tick> = order.iter().map(|t| t.effective_burst()).collect();
    let mut arrivals = Arrivals::new(order);
    let mut ready: Vec<usize> = Vec::new();
    let mut clock: Tick = 0;

    loop {
        ready.extend(arrivals.admit_until(clock));

        if ready.is_empty() {
            match arrivals.next_arrival() {
                Some(next) => {
                    clock = next;
                    continue;
                }
                None => break,
            }
        }

        let candidates: Vec<Candidate<'_>> = ready
            .iter()
            .map(|&i| Candidate { task: order[i], remaining: remaining[i] })
            .collect();
        let Some(pick) = selector.select(&candidates) else {
            break;
        };

        let idx = ready[pick];
        timeline.push(order[idx].pid, clock, clock + 1);
        remaining[idx] -= 1;
        clock += 1;

        if remaining[idx] == 0 {
            ready.remove(pick);
        }
    }

    timeline.merged()
}

fn run_round_robin(order: &[&Task], quantum: Tick) -> Timeline {
    let quantum = quantum.max(1);
    let mut timeline = Timeline::new();
    let mut remaining: Vec<Tick> = order.iter().map(|t| t.effective_burst()).collect();
    let mut arrivals = Arrivals::new(order);
    let mut queue: VecDeque<usize> = VecDeque::new();
    let mut clock: Tick = 0;

    loop {
        queue.extend(arrivals.admit_until(clock));

        let Some(idx) = queue.pop_front() else {
            match arrivals.next_arrival() {
                Some(next) => {
                    clock = next;
                    continue;
                }
                None => break,
            }
        };

        let slice = quantum.min(remaining[idx]);
        timeline.push(order[idx].pid, clock, clock + slice);
        remaining[idx] -= slice;
        clock += slice;

        // Arrivals during the slice go ahead of the task that just ran.
        queue.extend(arrivals.admit_until(clock));
        if remaining[idx] > 0 {
            queue.push_back(idx);
        }
    }

    timeline.merged()
}
