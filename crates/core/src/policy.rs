//! Scheduling policy identifiers.

use serde::{Deserialize, Serialize};
use crate::error::CoreError;

/// Default Round Robin time slice.
pub const DEFAULT_QUANTUM: i64 = 2;

/// The supported scheduling disciplines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Policy {
    /// First come, first served
    #[serde(rename = "FCFS")]
    Fcfs,
    /// Shortest job first, non-preemptive
    #[serde(rename = "SJF_NP")]
    SjfNonPreemptive,
    /// Shortest remaining time first
    #[serde(rename = "SJF_P")]
    SjfPreemptive,
    /// Static priority, non-preemptive
    #[serde(rename = "PRIORITY_NP")]
    PriorityNonPreemptive,
    /// Static priority, preemptive
    #[serde(rename = "PRIORITY_P")]
    PriorityPreemptive,
    /// Longest job first, non-preemptive
    #[serde(rename = "LJF")]
    Ljf,
    /// Round Robin with a fixed quantum
    #[serde(rename = "RR")]
    RoundRobin,
}

impl Policy {
    /// Every policy, in the order they are usually presented.
    pub const ALL: [Policy; 7] = [
        Policy::Fcfs,
        Policy::SjfNonPreemptive,
        Policy::SjfPreemptive,
        Policy::PriorityNonPreemptive,
        Policy::PriorityPreemptive,
        Policy::Ljf,
        Policy::RoundRobin,
    ];

    /// Stable identifier.
    pub fn as_str(&self) -> &'static str {
        match self {
            Policy::Fcfs => "FCFS",
            Policy::SjfNonPreemptive => "SJF_NP",
            Policy::SjfPreemptive => "SJF_P",
            Policy::PriorityNonPreemptive => "PRIORITY_NP",
            Policy::PriorityPreemptive => "PRIORITY_P",
            Policy::Ljf => "LJF",
            Policy::RoundRobin => "RR",
        }
    }

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Policy::Fcfs => "FCFS",
            Policy::SjfNonPreemptive => "SJF (Non-preemptive)",
            Policy::SjfPreemptive => "SJF (Preemptive)",
            Policy::PriorityNonPreemptive => "Priority (Non-preemptive)",
            Policy::PriorityPreemptive => "Priority (Preemptive)",
            Policy::Ljf => "LJF",
            Policy::RoundRobin => "Round Robin",
        }
    }

    /// Whether a running task can be interrupted before it finishes.
    pub fn is_preemptive(&self) -> bool {
        matches!(
            self,
            Policy::SjfPreemptive | Policy::PriorityPreemptive | Policy::RoundRobin
        )
    }

    /// Whether the policy consumes a time quantum.
    pub fn uses_quantum(&self) -> bool {
        matches!(self, Policy::RoundRobin)
    }
}

impl std::fmt::Display for Policy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Policy {
    type Err = CoreError;

    /// Accepts identifiers (`SJF_P`, case-insensitive) and labels
    /// (`"SJF (Preemptive)"`). Anything else is rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Some(policy) = Policy::ALL.into_iter().find(|p| p.label() == trimmed) {
            return Ok(policy);
        }
        match trimmed.to_ascii_uppercase().replace('-', "_").as_str() {
            "FCFS" => Ok(Policy::Fcfs),
            "SJF_NP" | "SJF" => Ok(Policy::SjfNonPreemptive),
            "SJF_P" | "SRTF" => Ok(Policy::SjfPreemptive),
            "PRIORITY_NP" | "PRIORITY" => Ok(Policy::PriorityNonPreemptive),
            "PRIORITY_P" => Ok(Policy::PriorityPreemptive),
            "LJF" => Ok(Policy::Ljf),
            "RR" | "ROUND_ROBIN" => Ok(Policy::RoundRobin),
            _ => Err(CoreError::UnknownAlgorithm(trimmed.to_string())),
        }
    }
}
