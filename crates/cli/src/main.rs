//! SchedSim CLI - CPU scheduling, deadlock and Banker's algorithm simulator.

mod input;
mod output;

use std::path::PathBuf;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::json;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;
use schedsim_core::{Pid, Policy, Tick};
use schedsim_execution::SimulationEngine;
use schedsim_safety::{DeadlockDetector, RequestOutcome};

#[derive(Parser)]
#[command(name = "schedsim")]
#[command(about = "CPU scheduling and resource safety simulator", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// JSON configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Schedule a task set under one algorithm
    Run {
        /// Task file (JSON array)
        #[arg(long)]
        tasks: PathBuf,
        /// Algorithm id or label (FCFS, SJF_NP, SJF_P, PRIORITY_NP, PRIORITY_P, LJF, RR)
        #[arg(short, long)]
        algorithm: Option<Policy>,
        /// Round Robin quantum
        #[arg(short, long)]
        quantum: Option<Tick>,
        /// Print JSON instead of tables
        #[arg(long)]
        json: bool,
    },
    /// Compare every algorithm on the same task set
    Compare {
        /// Task file (JSON array)
        #[arg(long)]
        tasks: PathBuf,
        /// Round Robin quantum
        #[arg(short, long)]
        quantum: Option<Tick>,
        /// Print JSON instead of tables
        #[arg(long)]
        json: bool,
    },
    /// Check a task set for circular waits
    Deadlock {
        /// Task file (JSON array)
        #[arg(long)]
        tasks: PathBuf,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Estimate energy use of a schedule
    Power {
        /// Task file (JSON array)
        #[arg(long)]
        tasks: PathBuf,
        /// Algorithm id or label
        #[arg(short, long)]
        algorithm: Option<Policy>,
        /// Energy per busy tick
        #[arg(long)]
        rate: Option<f64>,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Submit a resource request to the Banker's algorithm
    Bank {
        /// Bank state file (JSON)
        #[arg(long)]
        state: PathBuf,
        /// Requesting process
        #[arg(long)]
        pid: Pid,
        /// Units per resource, e.g. A=1,B=0,C=2
        #[arg(long)]
        request: String,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    // stdout carries results; logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = input::load_config(cli.config.as_deref()).await?;
    debug!("Config: {:?}", config);

    match cli.command {
        Commands::Run { tasks, algorithm, quantum, json } => {
            if let Some(q) = quantum {
                config = config.with_quantum(q);
            }
            let registry = input::load_tasks(&tasks).await?;
            let engine = SimulationEngine::new(config);
            let policy = algorithm.unwrap_or(engine.config().default_policy);

            let run = engine.run(&registry.snapshot(), policy)?;
            if json {
                print_json(&run)?;
            } else {
                output::print_run(&run);
            }
        }
        Commands::Compare { tasks, quantum, json } => {
            if let Some(q) = quantum {
                config = config.with_quantum(q);
            }
            let registry = input::load_tasks(&tasks).await?;
            let comparison = SimulationEngine::new(config).compare(&registry.snapshot())?;
            if json {
                print_json(&comparison)?;
            } else {
                output::print_comparison(&comparison);
            }
        }
        Commands::Deadlock { tasks, json } => {
            let registry = input::load_tasks(&tasks).await?;
            let (graph, report) = DeadlockDetector::new().analyze(registry.tasks());
            if json {
                print_json(&json!({
                    "found": report.found,
                    "cycle": report.cycle,
                    "edges": graph.edges(),
                    "resources": output::cycle_resources(&graph, &report),
                }))?;
            } else {
                output::print_deadlock(&graph, &report);
            }
        }
        Commands::Power { tasks, algorithm, rate, json } => {
            if let Some(rate) = rate {
                config = config.with_power_rate(rate);
            }
            let registry = input::load_tasks(&tasks).await?;
            let engine = SimulationEngine::new(config);
            let policy = algorithm.unwrap_or(engine.config().default_policy);

            let run = engine.run(&registry.snapshot(), policy)?;
            let report = engine.power(&run).context("Invalid power settings")?;
            if json {
                print_json(&json!({ "policy": run.policy, "power": report }))?;
            } else {
                output::print_power(&run, &report);
            }
        }
        Commands::Bank { state, pid, request, json } => {
            let mut bank = input::load_bank_state(&state).await?;
            let request = input::parse_request(&request)?;

            let result = bank.request_resources(pid, &request);
            let outcome = RequestOutcome::from(&result);
            info!("Request from {}: {}", pid, outcome.reason);

            if json {
                print_json(&json!({
                    "granted": outcome.granted,
                    "reason": outcome.reason,
                    "safe_sequence": bank.safe_sequence(),
                    "state": bank,
                }))?;
            } else {
                output::print_bank(pid, &request, &outcome, &bank);
            }
        }
    }

    Ok(())
}
