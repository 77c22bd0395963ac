//! Run a project's verification checks and log token-economy history.
//!
//! Checks come from a JSON manifest (one `{ "label", "command" }` object
//! per check); results go to the console and to `verification_history.md`
//! next to the installed binary.
//!
//! # Examples
//!
//! ```sh
//! # Sequential run (default): stops at the first failure
//! verigate --checks checks.json
//!
//! # Parallel run: everything at once, reported as it completes
//! verigate --checks checks.json --parallel
//!
//! # Keep the history somewhere specific, with a bigger rotation window
//! verigate --log-dir /srv/ci/logs --max-log-lines 500
//! ```

use std::path::PathBuf;
use std::process;
use std::time::Instant;

use clap::Parser;
use tracing_subscriber::Layer;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use verigate::{
    HistoryLog, Task, TruncateLimits, default_log_dir, run_parallel, run_serial, tdd_gate_task,
};
use verigate_cli::load_checks;

/// Verification gate for automated agents: runs declared checks, truncates
/// noisy output, and keeps a token-economy history log.
#[derive(Parser)]
#[command(name = "verigate")]
struct Cli {
    // ── Execution mode ─────────────────────────────────────────
    /// Run independent checks in parallel to save time.
    #[arg(long)]
    parallel: bool,

    /// Run checks sequentially, stopping at the first failure (default).
    #[arg(long)]
    serial: bool,

    // ── Check manifest ─────────────────────────────────────────
    /// Path to the JSON checks manifest.
    #[arg(long, default_value = "checks.json")]
    checks: PathBuf,

    /// Prepend the built-in TDD gate (new source files need matching tests).
    #[arg(long)]
    tdd_gate: bool,

    // ── History log ────────────────────────────────────────────
    /// Directory for verification_history.md (default: next to this executable).
    #[arg(long)]
    log_dir: Option<PathBuf>,

    /// History size knob; the file may grow to twice this many lines before pruning.
    #[arg(long, default_value_t = verigate::DEFAULT_MAX_LOG_LINES)]
    max_log_lines: usize,

    // ── Output truncation ──────────────────────────────────────
    /// Character limit before check output is head+tail truncated.
    #[arg(long, default_value_t = verigate::truncate::DEFAULT_TRUNCATE_LIMIT)]
    truncate_limit: usize,

    /// Characters of output head preserved when truncating.
    #[arg(long, default_value_t = verigate::truncate::DEFAULT_HEAD_CHARS)]
    truncate_head: usize,

    /// Characters of output tail preserved when truncating.
    #[arg(long, default_value_t = verigate::truncate::DEFAULT_TAIL_CHARS)]
    truncate_tail: usize,

    // ── Diagnostics ────────────────────────────────────────────
    /// Increase log verbosity (-v: info, -vv: debug).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// Stderr tracing at WARN by default so the best-effort log subsystem
/// stays silent unless asked for.
fn init_tracing(verbosity: u8) {
    let level = match verbosity {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        _ => LevelFilter::DEBUG,
    };
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_filter(level);
    tracing_subscriber::registry().with(fmt_layer).init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if cli.parallel && cli.serial {
        eprintln!("Note: --parallel overrides --serial");
    }

    let checks = match load_checks(&cli.checks) {
        Ok(checks) => checks,
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(2);
        }
    };

    let log_dir = cli.log_dir.clone().unwrap_or_else(default_log_dir);
    let history = HistoryLog::new(log_dir).with_max_log_lines(cli.max_log_lines);
    let limits = TruncateLimits::default()
        .limit(cli.truncate_limit)
        .head(cli.truncate_head)
        .tail(cli.truncate_tail);

    let mut tasks: Vec<Task> = Vec::new();
    if cli.tdd_gate {
        tasks.push(tdd_gate_task("."));
    }
    tasks.extend(checks.into_iter().map(Task::from_check));

    let start = Instant::now();
    let summary = if cli.parallel {
        run_parallel(tasks, &history, &limits).await
    } else {
        run_serial(tasks, &history, &limits).await
    };

    if summary.exit_code == 0 {
        println!(
            "\n✨ All systems go! (Completed in {:.2}s) 💰 Total Token Savings: {}",
            start.elapsed().as_secs_f64(),
            summary.tokens_saved,
        );
    }
    process::exit(summary.exit_code);
}
