//! Integration tests for the full verification pipeline.
//!
//! These tests run real shell commands through the serial and parallel
//! drivers and inspect the history file they leave behind, exercising the
//! whole chain: runner → truncation → reporter → history log → footer.

use std::fs;
use std::path::Path;

use verigate::{
    Check, HistoryLog, LedgerTotals, LogEntry, Task, TruncateLimits, estimate, parse_footer,
    run_parallel, run_serial,
};

fn check(label: &str, command: &str) -> Check {
    Check {
        label: label.into(),
        command: command.into(),
    }
}

fn tasks(checks: Vec<Check>) -> Vec<Task> {
    checks.into_iter().map(Task::from_check).collect()
}

/// Parse the written history file into body lines and footer totals.
fn read_history(path: &Path) -> (Vec<String>, LedgerTotals) {
    let lines = fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(str::to_string)
        .collect();
    parse_footer(lines)
}

// ── Serial pipeline ─────────────────────────────────────────────────

#[tokio::test]
async fn serial_run_logs_every_check_and_the_footer() {
    let dir = tempfile::tempdir().unwrap();
    let history = HistoryLog::new(dir.path());

    let summary = run_serial(
        tasks(vec![
            check("Toolchain", "echo rustc 1.93.0"),
            check("Listing", "printf 'a\\nb\\nc\\n'"),
        ]),
        &history,
        &TruncateLimits::default(),
    )
    .await;
    assert_eq!(summary.exit_code, 0);

    let (body, totals) = read_history(history.path());
    assert!(body.iter().any(|l| l.contains("✅ **Toolchain**: PASS")));
    assert!(body.iter().any(|l| l.contains("✅ **Listing**: PASS")));
    // Totals equal the estimates of what the commands actually printed.
    assert_eq!(totals.size, estimate("rustc 1.93.0\n") + estimate("a\nb\nc\n"));
    assert_eq!(totals.savings, 0);
}

#[tokio::test]
async fn serial_failure_stops_the_run_and_keeps_the_snippet() {
    let dir = tempfile::tempdir().unwrap();
    let history = HistoryLog::new(dir.path());

    let summary = run_serial(
        tasks(vec![
            check("Broken", "echo 'assertion failed' >&2; exit 4"),
            check("Unreached", "echo never"),
        ]),
        &history,
        &TruncateLimits::default(),
    )
    .await;
    assert_eq!(summary.exit_code, 4);

    let (body, _) = read_history(history.path());
    assert!(body.iter().any(|l| l.contains("❌ **Broken**: FAIL")));
    assert!(body.iter().any(|l| l.contains("assertion failed")));
    assert!(!body.iter().any(|l| l.contains("Unreached")));
}

// ── Parallel pipeline ───────────────────────────────────────────────

#[tokio::test]
async fn parallel_run_reports_everything_and_truncates_noise() {
    let dir = tempfile::tempdir().unwrap();
    let history = HistoryLog::new(dir.path());

    let summary = run_parallel(
        tasks(vec![
            check("Quiet", "true"),
            check("Chatty", "seq 1 3000"),
            check("Broken", "exit 7"),
        ]),
        &history,
        &TruncateLimits::default(),
    )
    .await;
    // Any parallel failure collapses to exit code 1.
    assert_eq!(summary.exit_code, 1);
    assert!(summary.tokens_saved > 0);

    let (body, totals) = read_history(history.path());
    assert!(body.iter().any(|l| l.contains("**Quiet**: PASS")));
    assert!(body.iter().any(|l| l.contains("**Chatty**: PASS")));
    assert!(body.iter().any(|l| l.contains("**Broken**: FAIL")));
    assert_eq!(totals.savings, summary.tokens_saved);
}

// ── History across runs ─────────────────────────────────────────────

#[tokio::test]
async fn footer_totals_accumulate_across_separate_runs() {
    let dir = tempfile::tempdir().unwrap();

    // Each run constructs its own store, as separate invocations would.
    let mut expected_size = 0;
    for _ in 0..3 {
        let history = HistoryLog::new(dir.path());
        let summary = run_serial(
            tasks(vec![check("Echo", "echo twelve chars")]),
            &history,
            &TruncateLimits::default(),
        )
        .await;
        assert_eq!(summary.exit_code, 0);
        expected_size += estimate("twelve chars\n");
    }

    let (_, totals) = read_history(&dir.path().join("verification_history.md"));
    assert_eq!(totals.size, expected_size);
}

#[tokio::test]
async fn rotation_keeps_the_file_bounded_over_many_runs() {
    let dir = tempfile::tempdir().unwrap();
    let noisy: String = (0..40).map(|i| format!("line {i}\n")).collect();

    for i in 0..30 {
        let history = HistoryLog::new(dir.path()).with_max_log_lines(10);
        history.append(&LogEntry::fail(format!("run-{i}"), noisy.clone()).with_tokens(10, 4));
    }

    let history = HistoryLog::new(dir.path()).with_max_log_lines(10);
    let (body, totals) = read_history(history.path());
    assert!(body.len() <= history.safe_log_lines());
    assert!(body[0].starts_with("... ("));
    // Rotation dropped most entry blocks but never the counters.
    assert_eq!(totals, LedgerTotals { size: 300, savings: 120 });
}
