//! Verification gate for automated coding agents.
//!
//! `verigate` runs a project's verification checks (lint, tests, security
//! scans) as child processes and records every result in a Markdown history
//! file that agents can read back cheaply. Two ideas carry the crate:
//!
//! 1. **Smart truncation.** A failing test suite can emit tens of thousands
//!    of characters. The [`truncate`](truncate::truncate) pass keeps the head
//!    (error type) and the tail (summary, final stack frames) and elides the
//!    middle, so the error signature survives at a fraction of the size.
//!
//! 2. **Token economy tracking.** Every entry records how many tokens the raw
//!    output would have cost and how many the truncation saved. The history
//!    file carries a sticky footer with cumulative totals that survive log
//!    rotation indefinitely.
//!
//! # Getting started
//!
//! ```ignore
//! use verigate::{Check, HistoryLog, Task, TruncateLimits, run_serial};
//!
//! #[tokio::main]
//! async fn main() {
//!     let tasks = vec![
//!         Check { label: "Lint".into(), command: "cargo check".into() },
//!         Check { label: "Test Suite".into(), command: "cargo test".into() },
//!     ]
//!     .into_iter()
//!     .map(Task::from_check)
//!     .collect();
//!     let history = HistoryLog::new(verigate::default_log_dir());
//!     let summary = run_serial(tasks, &history, &TruncateLimits::default()).await;
//!     std::process::exit(summary.exit_code);
//! }
//! ```
//!
//! # Where to find things
//!
//! If you're looking for how to...
//!
//! - **Run checks:** see [`run_serial`](runner::run_serial) (declaration
//!   order, fail fast) and [`run_parallel`](runner::run_parallel)
//!   (completion order, everything runs). Both feed each
//!   [`CheckOutcome`](runner::CheckOutcome) through the reporter.
//! - **Add a task that isn't a shell command:** construct a
//!   [`Task`](runner::Task) from any closure returning a
//!   [`CheckOutcome`](runner::CheckOutcome); the built-in
//!   [TDD gate](gate::tdd_gate) works this way.
//! - **Write history entries directly:** construct a [`LogEntry`] and call
//!   [`HistoryLog::append`](history::HistoryLog::append). Appends never fail
//!   from the caller's point of view; a broken log must not block a run.
//! - **Control output compression:** see
//!   [`TruncateLimits`](truncate::TruncateLimits) and the
//!   [`estimate`](tokens::estimate) heuristic.
//! - **Inspect or repair a history file:** the footer grammar lives in
//!   [`ledger`], rotation in [`history`].
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`tokens`] | Character-count token estimation |
//! | [`truncate`] | Head+tail output truncation with savings accounting |
//! | [`ledger`] | Sticky-footer parsing and formatting |
//! | [`history`] | The on-disk history log store with rotation |
//! | [`runner`] | Task execution, serial and parallel |
//! | [`report`] | Console feedback and history entry construction |
//! | [`gate`] | Built-in policy gates (TDD) |

pub mod gate;
pub mod history;
pub mod ledger;
pub mod report;
pub mod runner;
pub mod tokens;
pub mod truncate;

use chrono::{DateTime, Local};

// Re-export the working set at the crate root.
pub use gate::{tdd_gate, tdd_gate_task};
pub use history::{DEFAULT_LOG_FILENAME, DEFAULT_MAX_LOG_LINES, HistoryLog, default_log_dir};
pub use ledger::{LedgerTotals, format_footer, parse_footer};
pub use report::{ReportSummary, report};
pub use runner::{
    Check, CheckOutcome, RunSummary, Task, TaskFuture, run_check, run_parallel, run_serial,
};
pub use tokens::estimate;
pub use truncate::{TruncateLimits, Truncation, truncate};

// ── Check status ───────────────────────────────────────────────────

/// Result status of one verification check.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CheckStatus {
    Pass,
    Fail,
}

impl CheckStatus {
    /// Icon used in console output and history entries.
    pub fn icon(&self) -> &'static str {
        match self {
            CheckStatus::Pass => "✅",
            CheckStatus::Fail => "❌",
        }
    }
}

impl std::fmt::Display for CheckStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CheckStatus::Pass => write!(f, "PASS"),
            CheckStatus::Fail => write!(f, "FAIL"),
        }
    }
}

// ── Log entry ──────────────────────────────────────────────────────

/// One verification result, immutable once constructed.
///
/// Serialized by [`HistoryLog::append`](history::HistoryLog::append) as a
/// single summary line, plus a collapsible error block when
/// `error_snippet` is present.
#[derive(Clone, Debug)]
pub struct LogEntry {
    /// Human-readable name of the check (e.g. "Test Suite").
    pub label: String,
    pub status: CheckStatus,
    /// Local time the entry was constructed.
    pub timestamp: DateTime<Local>,
    /// Wall-clock duration of the check in seconds. Zero suppresses the
    /// duration field in the summary line.
    pub duration_secs: f64,
    /// The command that produced this result. Empty means the entry came
    /// from the orchestrator itself and renders as `[Internal]`.
    pub command_context: String,
    /// Estimated token size of the raw output.
    pub tokens_used: u64,
    /// Estimated tokens elided by truncation.
    pub tokens_saved: u64,
    /// Truncated error output, carried only by FAIL entries.
    pub error_snippet: Option<String>,
}

impl LogEntry {
    /// A PASS entry with zeroed metrics; fill in with the builder methods.
    pub fn pass(label: impl Into<String>) -> Self {
        Self::new(label, CheckStatus::Pass, None)
    }

    /// A FAIL entry carrying the (already truncated) error output.
    pub fn fail(label: impl Into<String>, error_snippet: impl Into<String>) -> Self {
        Self::new(label, CheckStatus::Fail, Some(error_snippet.into()))
    }

    fn new(label: impl Into<String>, status: CheckStatus, error_snippet: Option<String>) -> Self {
        Self {
            label: label.into(),
            status,
            timestamp: Local::now(),
            duration_secs: 0.0,
            command_context: String::new(),
            tokens_used: 0,
            tokens_saved: 0,
            error_snippet,
        }
    }

    /// Set the command context shown in the summary line.
    pub fn with_command(mut self, command: impl Into<String>) -> Self {
        self.command_context = command.into();
        self
    }

    /// Set the wall-clock duration in seconds.
    pub fn with_duration(mut self, secs: f64) -> Self {
        self.duration_secs = secs;
        self
    }

    /// Set the token metrics (raw size, tokens saved by truncation).
    pub fn with_tokens(mut self, used: u64, saved: u64) -> Self {
        self.tokens_used = used;
        self.tokens_saved = saved;
        self
    }
}
