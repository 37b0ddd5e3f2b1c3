//! Simulation configuration.

use schedsim_core::{Policy, Tick, DEFAULT_QUANTUM};
use schedsim_metrics::{MetricsError, PowerModel, DEFAULT_IDLE_FACTOR};
use serde::{Deserialize, Serialize};

/// Configuration for the simulation engine.
///
/// Missing fields take their defaults, so a config file only needs to name
/// what it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Round Robin time slice
    pub quantum: Tick,
    /// Policy used when none is requested explicitly
    pub default_policy: Policy,
    /// Energy per busy tick
    pub power_rate: f64,
    /// Share of `power_rate` drawn per idle tick
    pub idle_factor: f64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            quantum: DEFAULT_QUANTUM,
            default_policy: Policy::Fcfs,
            power_rate: 1.0,
            idle_factor: DEFAULT_IDLE_FACTOR,
        }
    }
}

impl SimConfig {
    /// Create the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the Round Robin quantum.
    pub fn with_quantum(mut self, quantum: Tick) -> Self {
        self.quantum = quantum;
        self
    }

    /// Set the default policy.
    pub fn with_default_policy(mut self, policy: Policy) -> Self {
        self.default_policy = policy;
        self
    }

    /// Set the busy-tick energy rate.
    pub fn with_power_rate(mut self, rate: f64) -> Self {
        self.power_rate = rate;
        self
    }

    /// Quantum after clamping to at least one tick.
    pub fn effective_quantum(&self) -> Tick {
        self.quantum.max(1)
    }

    /// Power model described by this configuration.
    pub fn power_model(&self) -> Result<PowerModel, MetricsError> {
        PowerModel::new(self.power_rate)?.with_idle_factor(self.idle_factor)
    }
}
