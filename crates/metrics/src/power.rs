//! Energy estimate for a computed timeline.
//!
//! The CPU draws `active_rate` per busy tick and `active_rate * idle_factor`
//! per idle tick inside the span of the timeline.

use schedsim_core::{Tick, Timeline};
use serde::{Deserialize, Serialize};

/// Share of the active rate drawn while idle.
pub const DEFAULT_IDLE_FACTOR: f64 = 0.2;

/// Errors from metric configuration.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MetricsError {
    /// Power rate is negative or not a number
    #[error("Invalid power rate: {0}")]
    InvalidRate(f64),

    /// Idle factor is negative or not a number
    #[error("Invalid idle factor: {0}")]
    InvalidIdleFactor(f64),
}

/// Power draw parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PowerModel {
    /// Energy per busy tick
    pub active_rate: f64,
    /// Fraction of `active_rate` drawn per idle tick
    pub idle_factor: f64,
}

impl Default for PowerModel {
    fn default() -> Self {
        Self {
            active_rate: 1.0,
            idle_factor: DEFAULT_IDLE_FACTOR,
        }
    }
}

/// Energy breakdown of a timeline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PowerReport {
    /// Last end minus first start
    pub span: Tick,
    /// Ticks with a process on the CPU
    pub busy: Tick,
    /// Ticks inside the span with no process on the CPU
    pub idle: Tick,
    /// Energy spent while busy
    pub active_energy: f64,
    /// Energy spent while idle
    pub idle_energy: f64,
    /// Sum of both
    pub total_energy: f64,
    /// Active share of the total, in percent
    pub efficiency: f64,
}

impl PowerModel {
    /// Create a model with the default idle factor.
    pub fn new(active_rate: f64) -> Result<Self, MetricsError> {
        Self::default().with_active_rate(active_rate)
    }

    /// Set the busy-tick rate.
    pub fn with_active_rate(mut self, rate: f64) -> Result<Self, MetricsError> {
        if !rate.is_finite() || rate < 0.0 {
            return Err(MetricsError::InvalidRate(rate));
        }
        self.active_rate = rate;
        Ok(self)
    }

    /// Set the idle share.
    pub fn with_idle_factor(mut self, factor: f64) -> Result<Self, MetricsError> {
        if !factor.is_finite() || factor < 0.0 {
            return Err(MetricsError::InvalidIdleFactor(factor));
        }
        self.idle_factor = factor;
        Ok(self)
    }

    /// Compute the energy breakdown of `timeline`.
    pub fn analyze(&self, timeline: &Timeline) -> PowerReport {
        let span = timeline.span();
        let busy = timeline.total_exec();
        let idle = (span - busy).max(0);

        let active_energy = busy as f64 * self.active_rate;
        let idle_energy = idle as f64 * self.active_rate * self.idle_factor;
        let total_energy = active_energy + idle_energy;
        let efficiency = if total_energy > 0.0 {
            active_energy / total_energy * 100.0
        } else {
            0.0
        };

        PowerReport {
            span,
            busy,
            idle,
            active_energy,
            idle_energy,
            total_energy,
            efficiency,
        }
    }
}
