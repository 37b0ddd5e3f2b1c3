//! Plain-text rendering of simulation results.

use std::collections::BTreeSet;
use schedsim_core::{Pid, Task, Timeline};
use schedsim_execution::{Comparison, SimulationRun};
use schedsim_metrics::{Metrics, PowerReport};
use schedsim_safety::{DeadlockReport, RequestOutcome, ResourceVector, SafetyState, WaitForGraph};

/// Print a single run: timeline, per-task table, then aggregates.
pub fn print_run(run: &SimulationRun) {
    println!("Algorithm: {}", run.policy.label());
    println!();
    print_timeline(&run.timeline);
    println!();
    print_tasks(&run.tasks);
    println!();
    print_metrics(&run.metrics);
}

fn print_timeline(timeline: &Timeline) {
    println!("Timeline ({} segments)", timeline.len());
    for seg in timeline {
        println!("  {:>4} | {:>4} -> {:<4}", seg.pid.to_string(), seg.start, seg.end);
    }
}

fn print_tasks(tasks: &[Task]) {
    println!(
        "  {:<5} {:<12} {:>7} {:>5} {:>8} {:>5} {:>10} {:>7} {:>10}",
        "PID", "Name", "Arrival", "Burst", "Priority", "Start", "Completion", "Waiting", "Turnaround"
    );
    for task in tasks {
        println!(
            "  {:<5} {:<12} {:>7} {:>5} {:>8} {:>5} {:>10} {:>7} {:>10}",
            task.pid.to_string(),
            task.name,
            task.arrival,
            task.burst,
            task.priority,
            cell(task.start),
            cell(task.completion),
            cell(task.waiting_time),
            cell(task.turnaround),
        );
    }
}

fn cell(value: Option<i64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| v.to_string())
}

fn print_metrics(metrics: &Metrics) {
    println!("Average waiting time:    {:.2}", metrics.avg_wait);
    println!("Average turnaround time: {:.2}", metrics.avg_tat);
    println!("CPU utilization:         {:.2}%", metrics.cpu_util);
    println!("Throughput:              {:.3} tasks/tick", metrics.throughput);
}

/// Print one row per policy and the winners.
pub fn print_comparison(comparison: &Comparison) {
    println!(
        "  {:<26} {:>9} {:>9} {:>8} {:>10}",
        "Algorithm", "Avg Wait", "Avg TAT", "CPU %", "Throughput"
    );
    for entry in &comparison.entries {
        println!(
            "  {:<26} {:>9.2} {:>9.2} {:>8.2} {:>10.3}",
            entry.policy.label(),
            entry.metrics.avg_wait,
            entry.metrics.avg_tat,
            entry.metrics.cpu_util,
            entry.metrics.throughput,
        );
    }

    if let Some(best) = comparison.best_by_wait() {
        println!();
        println!("Lowest average waiting time:    {}", best.policy.label());
    }
    if let Some(best) = comparison.best_by_turnaround() {
        println!("Lowest average turnaround time: {}", best.policy.label());
    }
}

/// Resources held along the reported cycle.
pub fn cycle_resources(graph: &WaitForGraph, report: &DeadlockReport) -> BTreeSet<String> {
    graph
        .edges()
        .iter()
        .filter(|e| report.involves(e.from) && report.involves(e.to))
        .map(|e| e.resource.clone())
        .collect()
}

/// Print a deadlock check.
pub fn print_deadlock(graph: &WaitForGraph, report: &DeadlockReport) {
    println!("Wait-for graph ({} edges)", graph.edges().len());
    for edge in graph.edges() {
        println!("  {} waits for {} (held by {})", edge.from, edge.resource, edge.to);
    }
    println!();

    if !report.found {
        println!("No deadlock detected");
        return;
    }

    let mut path: Vec<String> = report.cycle.iter().map(Pid::to_string).collect();
    if let Some(first) = report.cycle.first() {
        path.push(first.to_string());
    }
    println!("Deadlock detected: {}", path.join(" -> "));

    let resources: Vec<String> = cycle_resources(graph, report).into_iter().collect();
    println!("Resources involved: {}", resources.join(", "));
}

/// Print an energy breakdown.
pub fn print_power(run: &SimulationRun, report: &PowerReport) {
    println!("Algorithm: {}", run.policy.label());
    println!("Span:          {} ticks ({} busy, {} idle)", report.span, report.busy, report.idle);
    println!("Active energy: {:.2}", report.active_energy);
    println!("Idle energy:   {:.2}", report.idle_energy);
    println!("Total energy:  {:.2}", report.total_energy);
    println!("Efficiency:    {:.2}%", report.efficiency);
}

fn format_vector(vector: &ResourceVector) -> String {
    let parts: Vec<String> = vector.iter().map(|(r, n)| format!("{r}={n}")).collect();
    format!("{{{}}}", parts.join(", "))
}

/// Print a request outcome and the resulting state.
pub fn print_bank(pid: Pid, request: &ResourceVector, outcome: &RequestOutcome, state: &SafetyState) {
    println!("Request {} from {}", format_vector(request), pid);
    println!("  Granted: {}", outcome.granted);
    println!("  Reason:  {}", outcome.reason);
    println!();
    println!("Available: {}", format_vector(state.available()));
    for (pid, claim) in state.processes() {
        println!(
            "  {:<5} allocation {} max {} need {}",
            pid.to_string(),
            format_vector(&claim.allocation),
            format_vector(&claim.max_need),
            format_vector(&claim.need_vector()),
        );
    }

    match state.safe_sequence() {
        Some(sequence) => {
            let order: Vec<String> = sequence.iter().map(Pid::to_string).collect();
            println!("Safe sequence: {}", order.join(" -> "));
        }
        None => println!("State is unsafe"),
    }
}
