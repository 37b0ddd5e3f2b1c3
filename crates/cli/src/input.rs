//! Loading task sets, bank states and configuration from JSON files.

use std::path::Path;
use anyhow::{bail, Context, Result};
use schedsim_core::{Pid, TaskRegistry, Tick};
use schedsim_execution::SimConfig;
use schedsim_safety::{ResourceVector, SafetyState};
use serde::Deserialize;

/// One task as written in a task file. Pids are assigned on load.
#[derive(Debug, Deserialize)]
struct TaskInput {
    #[serde(default)]
    name: String,
    arrival: Tick,
    burst: Tick,
    #[serde(default)]
    priority: i64,
    #[serde(default)]
    holding: String,
    #[serde(default)]
    waiting: String,
}

#[derive(Debug, Deserialize)]
struct BankInput {
    available: ResourceVector,
    #[serde(default)]
    processes: Vec<ProcessInput>,
}

#[derive(Debug, Deserialize)]
struct ProcessInput {
    pid: Pid,
    #[serde(default)]
    allocation: ResourceVector,
    #[serde(default)]
    max_need: ResourceVector,
}

/// Parse a task file body into a registry, numbering tasks in file order.
pub fn parse_tasks(json: &str) -> Result<TaskRegistry> {
    let inputs: Vec<TaskInput> = serde_json::from_str(json).context("Invalid task file")?;

    let mut registry = TaskRegistry::new();
    for input in inputs {
        registry.add(
            &input.name,
            input.arrival,
            input.burst,
            input.priority,
            &input.holding,
            &input.waiting,
        );
    }
    Ok(registry)
}

/// Read and parse a task file.
pub async fn load_tasks(path: &Path) -> Result<TaskRegistry> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    parse_tasks(&content).with_context(|| format!("Failed to load {}", path.display()))
}

/// Parse a bank state file body.
pub fn parse_bank_state(json: &str) -> Result<SafetyState> {
    let input: BankInput = serde_json::from_str(json).context("Invalid bank state file")?;

    let mut state = SafetyState::new(input.available);
    for process in input.processes {
        let pid = process.pid;
        state
            .add_process(pid, process.allocation, process.max_need)
            .with_context(|| format!("Invalid claim for {pid}"))?;
    }
    Ok(state)
}

/// Read and parse a bank state file.
pub async fn load_bank_state(path: &Path) -> Result<SafetyState> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    parse_bank_state(&content).with_context(|| format!("Failed to load {}", path.display()))
}

/// Load the configuration file, or the defaults when none is given.
pub async fn load_config(path: Option<&Path>) -> Result<SimConfig> {
    let Some(path) = path else {
        return Ok(SimConfig::default());
    };
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("Invalid config {}", path.display()))
}

/// Parse `A=2,B=1` into a resource vector.
pub fn parse_request(raw: &str) -> Result<ResourceVector> {
    let mut request = ResourceVector::new();
    for part in raw.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let Some((resource, units)) = part.split_once('=') else {
            bail!("Expected RESOURCE=UNITS, got '{part}'");
        };
        let resource = resource.trim();
        if resource.is_empty() {
            bail!("Missing resource name in '{part}'");
        }
        let units: u64 = units
            .trim()
            .parse()
            .with_context(|| format!("Invalid unit count in '{part}'"))?;
        *request.entry(resource.to_string()).or_insert(0) += units;
    }
    if request.is_empty() {
        bail!("Empty request");
    }
    Ok(request)
}
