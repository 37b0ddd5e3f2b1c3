//! Timeline application and aggregate metrics.

use std::collections::HashMap;
use schedsim_core::{Pid, Task, TaskStatus, Tick, Timeline};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Aggregate statistics for one scheduling run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    /// Mean waiting time over scheduled tasks
    pub avg_wait: f64,
    /// Mean turnaround time over scheduled tasks
    pub avg_tat: f64,
    /// Busy share of the timeline span, in percent
    pub cpu_util: f64,
    /// Scheduled tasks per tick of span
    pub throughput: f64,
    /// Sum of all segment durations
    pub total_exec: Tick,
}

/// Write the derived fields of `tasks` from `timeline`, in place.
///
/// This is the only writer of `start`, `completion`, `waiting_time`,
/// `turnaround` and `status`. Every task is reset first, so a task missing
/// from the timeline ends up `Waiting` with no timings. Segments for pids
/// that are not in `tasks` are skipped.
pub fn apply_timeline(tasks: &mut [Task], timeline: &Timeline) {
    for task in tasks.iter_mut() {
        task.reset_derived();
    }

    let index: HashMap<Pid, usize> = tasks
        .iter()
        .enumerate()
        .map(|(i, t)| (t.pid, i))
        .collect();

    for seg in timeline {
        let Some(&i) = index.get(&seg.pid) else {
            continue;
        };
        let task = &mut tasks[i];
        if task.start.is_none() {
            task.start = Some(seg.start);
        }
        task.completion = Some(task.completion.map_or(seg.end, |c| c.max(seg.end)));
        task.status = TaskStatus::Completed;
    }

    for task in tasks.iter_mut() {
        if task.start.is_none() {
            continue;
        }
        if let Some(completion) = task.completion {
            task.waiting_time = Some(completion - task.arrival - task.effective_burst());
            task.turnaround = Some(completion - task.arrival);
        }
    }
}

/// Copy-on-call variant of [`apply_timeline`].
pub fn annotated(tasks: &[Task], timeline: &Timeline) -> Vec<Task> {
    let mut copy = tasks.to_vec();
    apply_timeline(&mut copy, timeline);
    copy
}

/// Apply `timeline` to `tasks` and compute the aggregate statistics.
///
/// The span used for utilisation and throughput is never below one tick,
/// so an empty timeline yields all zeros instead of dividing by zero.
pub fn compute_metrics(tasks: &mut [Task], timeline: &Timeline) -> Metrics {
    apply_timeline(tasks, timeline);

    let scheduled: Vec<&Task> = tasks.iter().filter(|t| t.start.is_some()).collect();
    let n = scheduled.len();

    let total_wait: Tick = scheduled.iter().filter_map(|t| t.waiting_time).sum();
    let total_tat: Tick = scheduled.iter().filter_map(|t| t.turnaround).sum();

    let total_exec = timeline.total_exec();
    let total_time = timeline.span().max(1);

    let (avg_wait, avg_tat) = if n > 0 {
        (total_wait as f64 / n as f64, total_tat as f64 / n as f64)
    } else {
        (0.0, 0.0)
    };

    let metrics = Metrics {
        avg_wait,
        avg_tat,
        cpu_util: total_exec as f64 / total_time as f64 * 100.0,
        throughput: n as f64 / total_time as f64,
        total_exec,
    };

    debug!(
        "Metrics over {} scheduled tasks: avg_wait={:.2} avg_tat={:.2} util={:.1}%",
        n, metrics.avg_wait, metrics.avg_tat, metrics.cpu_util
    );

    metrics
}

#[cfg(test)]
mod tests {
    use super::*;
    use schedsim_core::Segment;

    fn tasks() -> Vec<Task> {
        vec![
            Task::new(Pid::new(1), "P1", 0, 5),
            Task::new(Pid::new(2), "P2", 1, 3),
        ]
    }

    fn tl(raw: &[(u32, Tick, Tick)]) -> Timeline {
        raw.iter().copied().map(Segment::from).collect()
    }

    #[test]
    fn test_fcfs_scenario_metrics() {
        let mut tasks = tasks();
        let metrics = compute_metrics(&mut tasks, &tl(&[(1, 0, 5), (2, 5, 8)]));

        assert_eq!(tasks[0].waiting_time, Some(0));
        assert_eq!(tasks[1].waiting_time, Some(4));
        assert_eq!(tasks[1].turnaround, Some(7));
        assert_eq!(metrics.avg_wait, 2.0);
        assert_eq!(metrics.avg_tat, 6.0);
        assert_eq!(metrics.total_exec, 8);
        assert_eq!(metrics.cpu_util, 100.0);
        assert_eq!(metrics.throughput, 2.0 / 8.0);
    }

    #[test]
    fn test_preempted_task_keeps_first_start() {
        let mut tasks = tasks();
        apply_timeline(&mut tasks, &tl(&[(1, 0, 1), (2, 1, 4), (1, 4, 8)]));

        assert_eq!(tasks[0].start, Some(0));
        assert_eq!(tasks[0].completion, Some(8));
        assert_eq!(tasks[0].waiting_time, Some(3));
        assert_eq!(tasks[1].waiting_time, Some(0));
        assert_eq!(tasks[0].status, TaskStatus::Completed);
    }

    #[test]
    fn test_stale_fields_are_reset() {
        let mut tasks = tasks();
        apply_timeline(&mut tasks, &tl(&[(1, 0, 5), (2, 5, 8)]));
        apply_timeline(&mut tasks, &tl(&[(1, 0, 5)]));

        assert_eq!(tasks[1].status, TaskStatus::Waiting);
        assert!(tasks[1].start.is_none());
        assert!(tasks[1].waiting_time.is_none());
    }

    #[test]
    fn test_empty_timeline_yields_zeros() {
        let mut tasks = tasks();
        let metrics = compute_metrics(&mut tasks, &Timeline::new());
        assert_eq!(metrics, Metrics::default());
    }

    #[test]
    fn test_idle_gap_lowers_utilisation() {
        let mut tasks = vec![
            Task::new(Pid::new(1), "P1", 0, 2),
            Task::new(Pid::new(2), "P2", 4, 2),
        ];
        let metrics = compute_metrics(&mut tasks, &tl(&[(1, 0, 2), (2, 4, 6)]));
        assert_eq!(metrics.total_exec, 4);
        assert!((metrics.cpu_util - 200.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_unknown_pid_segment_is_ignored() {
        let tasks = tasks();
        let annotated = annotated(&tasks, &tl(&[(9, 0, 2), (1, 2, 7)]));
        assert_eq!(annotated[0].start, Some(2));
        assert_eq!(annotated[1].status, TaskStatus::Waiting);
        // the input snapshot is untouched
        assert!(tasks[0].start.is_none());
    }

    #[test]
    fn test_zero_burst_waits_like_one_tick_burst() {
        let mut zero = Task::new(Pid::new(1), "P1", 2, 1);
        zero.burst = 0;
        let mut tasks = vec![zero];
        let metrics = compute_metrics(&mut tasks, &tl(&[(1, 2, 3)]));

        assert_eq!(tasks[0].waiting_time, Some(0));
        assert_eq!(tasks[0].turnaround, Some(1));
        assert_eq!(metrics.avg_wait, 0.0);
    }

    #[test]
    fn test_metrics_serialize() {
        let json = serde_json::to_value(Metrics::default()).unwrap();
        assert_eq!(json["total_exec"], 0);
        assert!(json.get("cpu_util").is_some());
    }
}
