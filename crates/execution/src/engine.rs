//! The simulation engine - schedules a snapshot and annotates it in one call.

use schedsim_core::{CoreError, Policy, Task, Timeline};
use schedsim_metrics::{compute_metrics, Metrics, MetricsError, PowerReport};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use crate::{Scheduler, SimConfig};

/// Errors from a simulation run.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ExecutionError {
    /// Invalid task set or policy
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Invalid metric parameters
    #[error(transparent)]
    Metrics(#[from] MetricsError),
}

/// Outcome of scheduling one snapshot under one policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationRun {
    /// Policy used
    pub policy: Policy,
    /// Merged timeline
    pub timeline: Timeline,
    /// The snapshot with derived fields filled in
    pub tasks: Vec<Task>,
    /// Aggregate statistics
    pub metrics: Metrics,
}

/// One row of a policy comparison.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonEntry {
    /// Policy
    pub policy: Policy,
    /// Its aggregate statistics
    pub metrics: Metrics,
}

/// Aggregate statistics of every policy over the same snapshot.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Comparison {
    /// One entry per policy, in [`Policy::ALL`] order
    pub entries: Vec<ComparisonEntry>,
}

impl Comparison {
    /// Policy with the lowest average waiting time (first one on ties).
    pub fn best_by_wait(&self) -> Option<&ComparisonEntry> {
        self.best_by(|m| m.avg_wait)
    }

    /// Policy with the lowest average turnaround (first one on ties).
    pub fn best_by_turnaround(&self) -> Option<&ComparisonEntry> {
        self.best_by(|m| m.avg_tat)
    }

    fn best_by(&self, key: impl Fn(&Metrics) -> f64) -> Option<&ComparisonEntry> {
        let mut best: Option<&ComparisonEntry> = None;
        for entry in &self.entries {
            match best {
                Some(b) if key(&b.metrics) <= key(&entry.metrics) => {}
                _ => best = Some(entry),
            }
        }
        best
    }
}

/// Runs the scheduler and the metrics calculator over caller snapshots.
///
/// ```text
/// Snapshot → Schedule → Apply timeline → Metrics
/// ```
/// The engine never mutates the caller's tasks; each run works on a copy.
#[derive(Debug, Clone, Default)]
pub struct SimulationEngine {
    scheduler: Scheduler,
    config: SimConfig,
}

impl SimulationEngine {
    /// Create an engine from a configuration.
    pub fn new(config: SimConfig) -> Self {
        Self {
            scheduler: Scheduler::new().with_quantum(config.effective_quantum()),
            config,
        }
    }

    /// Configuration in effect.
    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Schedule `tasks` under `policy` and compute its metrics.
    pub fn run(&self, tasks: &[Task], policy: Policy) -> Result<SimulationRun, ExecutionError> {
        let timeline = self.scheduler.schedule(tasks, policy)?;
        let mut annotated = tasks.to_vec();
        let metrics = compute_metrics(&mut annotated, &timeline);

        info!(
            "{} run: {} tasks, avg wait {:.2}, avg turnaround {:.2}",
            policy,
            tasks.len(),
            metrics.avg_wait,
            metrics.avg_tat
        );

        Ok(SimulationRun {
            policy,
            timeline,
            tasks: annotated,
            metrics,
        })
    }

    /// Run with the configured default policy.
    pub fn run_default(&self, tasks: &[Task]) -> Result<SimulationRun, ExecutionError> {
        self.run(tasks, self.config.default_policy)
    }

    /// Run every policy over the same snapshot.
    pub fn compare(&self, tasks: &[Task]) -> Result<Comparison, ExecutionError> {
        let mut entries = Vec::with_capacity(Policy::ALL.len());
        for policy in Policy::ALL {
            let run = self.run(tasks, policy)?;
            entries.push(ComparisonEntry { policy, metrics: run.metrics });
        }

        let comparison = Comparison { entries };
        if let Some(best) = comparison.best_by_wait() {
            debug!("Lowest average wait: {} ({:.2})", best.policy, best.metrics.avg_wait);
        }
        Ok(comparison)
    }

    /// Energy breakdown of a run under the configured power model.
    pub fn power(&self, run: &SimulationRun) -> Result<PowerReport, ExecutionError> {
        let model = self.config.power_model()?;
        Ok(model.analyze(&run.timeline))
    }
}
