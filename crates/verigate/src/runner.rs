//! Task execution: spawning child processes and driving the run.
//!
//! A [`Check`] is one operator-declared verification command; a [`Task`] is
//! the schedulable unit, a label plus a closure producing a
//! [`CheckOutcome`]. Shell checks become tasks via [`Task::from_check`];
//! built-in gates (see [`gate`](crate::gate)) construct their own. Nothing
//! here panics or propagates errors, since a crashed tool is itself a
//! verification result (FAIL, exit code 1).
//!
//! Two drivers sit on top:
//!
//! - [`run_serial`]: declaration order, stop at the first failure.
//! - [`run_parallel`]: every task at once on the tokio worker pool,
//!   reported in completion order.
//!
//! Tasks run to completion once launched; there is no timeout and no
//! cancellation.

use std::future::Future;
use std::pin::Pin;
use std::time::Instant;

use futures::stream::{FuturesUnordered, StreamExt};
use serde::Deserialize;
use tokio::process::Command;
use tracing::info;

use crate::history::HistoryLog;
use crate::report::report;
use crate::truncate::TruncateLimits;

// ── Declarations ───────────────────────────────────────────────────

/// One verification command, as declared in the checks manifest.
#[derive(Deserialize, Clone, Debug)]
pub struct Check {
    /// Human-readable name (e.g. "Test Suite").
    pub label: String,
    /// Shell command to execute (e.g. "cargo test").
    pub command: String,
}

/// The captured result of one executed task.
#[derive(Clone, Debug)]
pub struct CheckOutcome {
    pub label: String,
    /// Child exit code; forced to 1 when the child could not be spawned or
    /// was killed by a signal.
    pub exit_code: i32,
    /// Merged stdout + stderr, lossily decoded.
    pub output: String,
    pub duration_secs: f64,
    /// The command that ran, echoed into the history entry. Empty for
    /// internal gates.
    pub command: String,
}

/// Aggregate result of a whole run.
#[derive(Clone, Copy, Debug, Default)]
pub struct RunSummary {
    /// Process exit code: 0 on success, the failing task's code in serial
    /// mode, 1 on any parallel failure.
    pub exit_code: i32,
    /// Total tokens saved by truncation across all reported tasks.
    pub tokens_saved: u64,
}

// ── Tasks ──────────────────────────────────────────────────────────

/// Boxed future produced by a task closure.
///
/// Type alias to keep the closure signatures readable.
pub type TaskFuture = Pin<Box<dyn Future<Output = CheckOutcome> + Send + 'static>>;

/// One schedulable verification task.
///
/// The closure runs at most once, on whichever driver schedules it.
pub struct Task {
    pub label: String,
    run: Box<dyn FnOnce() -> TaskFuture + Send + 'static>,
}

impl Task {
    pub fn new(
        label: impl Into<String>,
        run: impl FnOnce() -> TaskFuture + Send + 'static,
    ) -> Self {
        Self {
            label: label.into(),
            run: Box::new(run),
        }
    }

    /// Wrap a manifest check as a task executing its shell command.
    pub fn from_check(check: Check) -> Self {
        Self::new(check.label.clone(), move || {
            Box::pin(async move { run_check(&check).await })
        })
    }

    /// Execute the task, consuming it.
    pub async fn run(self) -> CheckOutcome {
        (self.run)().await
    }
}

impl std::fmt::Debug for Task {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Task").field("label", &self.label).finish()
    }
}

// ── Execution ──────────────────────────────────────────────────────

/// Run one check via `sh -c`, capturing merged output and duration.
///
/// Waits indefinitely for the child to exit. A spawn failure (no shell,
/// resource exhaustion) becomes a normal outcome with exit code 1 and the
/// error description as output.
pub async fn run_check(check: &Check) -> CheckOutcome {
    info!("[check] {}: {}", check.label, check.command);
    let start = Instant::now();
    let result = Command::new("sh").arg("-c").arg(&check.command).output().await;
    let duration_secs = start.elapsed().as_secs_f64();

    match result {
        Ok(output) => {
            let mut text = String::from_utf8_lossy(&output.stdout).to_string();
            let stderr = String::from_utf8_lossy(&output.stderr);
            if !stderr.is_empty() {
                if !text.is_empty() && !text.ends_with('\n') {
                    text.push('\n');
                }
                text.push_str(&stderr);
            }
            CheckOutcome {
                label: check.label.clone(),
                // A signal-terminated child has no exit code.
                exit_code: output.status.code().unwrap_or(1),
                output: text,
                duration_secs,
                command: check.command.clone(),
            }
        }
        Err(e) => CheckOutcome {
            label: check.label.clone(),
            exit_code: 1,
            output: format!("Error running command: {e}"),
            duration_secs,
            command: check.command.clone(),
        },
    }
}

/// Run tasks one at a time in declaration order, stopping at the first
/// failure and returning its exit code.
pub async fn run_serial(
    tasks: Vec<Task>,
    history: &HistoryLog,
    limits: &TruncateLimits,
) -> RunSummary {
    println!("🐢 Running {} checks SEQUENTIALLY...", tasks.len());
    let mut summary = RunSummary::default();

    for task in tasks {
        println!("👉 Starting {}...", task.label);
        let outcome = task.run().await;
        let reported = report(&outcome, history, limits);
        summary.tokens_saved += reported.tokens_saved;
        if reported.exit_code != 0 {
            println!("🛑 Fail fast triggered.");
            summary.exit_code = reported.exit_code;
            return summary;
        }
    }
    summary
}

/// Run every task concurrently, reporting each as it completes.
///
/// No ordering guarantee on completion or console interleaving; history
/// writes stay atomic because the store serializes them. Returns exit
/// code 1 if any task failed.
pub async fn run_parallel(
    tasks: Vec<Task>,
    history: &HistoryLog,
    limits: &TruncateLimits,
) -> RunSummary {
    println!("🚀 Running {} checks in PARALLEL...", tasks.len());

    let mut pending: FuturesUnordered<_> = tasks
        .into_iter()
        .map(|task| tokio::spawn(task.run()))
        .collect();

    let mut summary = RunSummary::default();
    while let Some(joined) = pending.next().await {
        match joined {
            Ok(outcome) => {
                let reported = report(&outcome, history, limits);
                summary.tokens_saved += reported.tokens_saved;
                if reported.exit_code != 0 {
                    summary.exit_code = 1;
                }
            }
            Err(e) => {
                eprintln!("❌ Check task crashed: {e}");
                summary.exit_code = 1;
            }
        }
    }
    summary
}

// ── Tests ──────────────────────────────────────────────────────────
