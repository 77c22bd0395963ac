//! Custom tasks example — anything producing a `CheckOutcome` can join a run.
//!
//! Demonstrates:
//! - Shell checks via `Task::from_check`
//! - The built-in TDD gate as a schedulable task
//! - A hand-rolled task from a closure (here: a fake coverage probe)
//! - Parallel execution with completion-order reporting
//!
//! # Usage
//!
//! ```bash
//! cargo run --example custom_tasks
//! ```

use verigate::{Check, CheckOutcome, HistoryLog, Task, TruncateLimits, run_parallel, tdd_gate_task};

/// A task that computes its result in-process instead of shelling out.
fn coverage_probe() -> Task {
    Task::new("Coverage Probe", || {
        Box::pin(async {
            // A real probe would parse an lcov/tarpaulin report here.
            let covered = 87;
            CheckOutcome {
                label: "Coverage Probe".into(),
                exit_code: if covered >= 80 { 0 } else { 1 },
                output: format!("line coverage: {covered}%"),
                duration_secs: 0.0,
                command: String::new(),
            }
        })
    })
}

#[tokio::main]
async fn main() {
    let tasks = vec![
        tdd_gate_task("."),
        Task::from_check(Check {
            label: "Lint".into(),
            command: "echo 'no warnings'".into(),
        }),
        coverage_probe(),
    ];

    let history = HistoryLog::new(".").with_file_name("demo_history.md");
    let summary = run_parallel(tasks, &history, &TruncateLimits::default()).await;

    println!(
        "\n--- exit {} | {} tokens saved | history at {} ---",
        summary.exit_code,
        summary.tokens_saved,
        history.path().display()
    );
    std::process::exit(summary.exit_code);
}
