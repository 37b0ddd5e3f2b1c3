//! Cross-policy invariants over a batch of generated task sets.

use std::collections::{HashMap, HashSet};
use schedsim_core::{Pid, Policy, Task, Tick, Timeline};
use schedsim_execution::{schedule, SimulationEngine};

/// Small deterministic generator so every run sees the same task sets.
struct Lcg(u64);

impl Lcg {
    fn next(&mut self, bound: u64) -> i64 {
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        ((self.0 >> 33) % bound) as i64
    }
}

fn task_sets() -> Vec<Vec<Task>> {
    let mut rng = Lcg(0x5eed);
    (0..40)
        .map(|set| {
            let n = 1 + (set % 7) as u32;
            (1..=n)
                .map(|pid| {
                    Task::new(Pid::new(pid), format!("P{pid}"), rng.next(12), 1 + rng.next(8))
                        .with_priority(rng.next(5))
                })
                .collect()
        })
        .collect()
}

fn assert_single_cpu(timeline: &Timeline) {
    for pair in timeline.segments().windows(2) {
        assert!(pair[0].start < pair[0].end);
        assert!(pair[0].end <= pair[1].start, "overlap in {timeline:?}");
    }
}

fn assert_merged(timeline: &Timeline) {
    for pair in timeline.segments().windows(2) {
        assert!(
            !(pair[0].pid == pair[1].pid && pair[0].end == pair[1].start),
            "unmerged neighbours in {timeline:?}"
        );
    }
}

#[test]
fn test_total_execution_equals_total_burst() {
    for tasks in task_sets() {
        for policy in Policy::ALL {
            let timeline = schedule(&tasks, policy, Some(3)).unwrap();
            let scheduled: HashSet<Pid> = timeline.iter().map(|s| s.pid).collect();
            let burst: Tick = tasks
                .iter()
                .filter(|t| scheduled.contains(&t.pid))
                .map(|t| t.burst)
                .sum();
            assert_eq!(timeline.total_exec(), burst, "{policy}");
            assert_eq!(scheduled.len(), tasks.len(), "{policy}");
        }
    }
}

#[test]
fn test_timelines_are_single_cpu_and_merged() {
    for tasks in task_sets() {
        for policy in Policy::ALL {
            let timeline = schedule(&tasks, policy, Some(2)).unwrap();
            assert_single_cpu(&timeline);
            assert_merged(&timeline);
        }
    }
}

#[test]
fn test_no_task_runs_before_arrival() {
    for tasks in task_sets() {
        let arrival: HashMap<Pid, Tick> = tasks.iter().map(|t| (t.pid, t.arrival)).collect();
        for policy in Policy::ALL {
            let timeline = schedule(&tasks, policy, None).unwrap();
            for seg in &timeline {
                assert!(seg.start >= arrival[&seg.pid], "{policy}: {seg:?}");
            }
        }
    }
}

#[test]
fn test_derived_fields_are_consistent() {
    let engine = SimulationEngine::default();
    for tasks in task_sets() {
        for policy in Policy::ALL {
            let run = engine.run(&tasks, policy).unwrap();
            for task in &run.tasks {
                let completion = task.completion.unwrap();
                let turnaround = task.turnaround.unwrap();
                let waiting = task.waiting_time.unwrap();
                assert_eq!(turnaround, completion - task.arrival);
                assert!(turnaround >= task.burst);
                assert_eq!(waiting, turnaround - task.burst);
                assert!(waiting >= 0);
            }
        }
    }
}

#[test]
fn test_fcfs_follows_arrival_then_pid() {
    for tasks in task_sets() {
        let timeline = schedule(&tasks, Policy::Fcfs, None).unwrap();
        let by_pid: HashMap<Pid, &Task> = tasks.iter().map(|t| (t.pid, t)).collect();
        let keys: Vec<(Tick, Pid)> = timeline
            .iter()
            .map(|s| (by_pid[&s.pid].arrival, s.pid))
            .collect();
        assert!(keys.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(timeline.len(), tasks.len());
    }
}

#[test]
fn test_non_preemptive_policies_run_each_task_once() {
    for tasks in task_sets() {
        for policy in [Policy::SjfNonPreemptive, Policy::PriorityNonPreemptive, Policy::Ljf] {
            let timeline = schedule(&tasks, policy, None).unwrap();
            assert_eq!(timeline.len(), tasks.len(), "{policy}");
        }
    }
}

#[test]
fn test_round_robin_slices_respect_quantum() {
    let quantum = 2;
    for tasks in task_sets() {
        let timeline = schedule(&tasks, Policy::RoundRobin, Some(quantum)).unwrap();
        let mut completion: HashMap<Pid, Tick> = HashMap::new();
        for seg in &timeline {
            completion.insert(seg.pid, seg.end);
        }
        for seg in &timeline {
            // A run longer than one quantum means nobody else was queued at
            // any of the slice boundaries inside it.
            let mut boundary = seg.start + quantum;
            while boundary < seg.end {
                for other in tasks.iter().filter(|t| t.pid != seg.pid && t.arrival <= boundary) {
                    assert!(completion[&other.pid] <= seg.start, "{timeline:?}");
                }
                boundary += quantum;
            }
        }
    }
}
