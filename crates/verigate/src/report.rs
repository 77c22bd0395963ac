//! Turning a check outcome into console feedback and a history entry.
//!
//! One [`report`] call handles both sides of the "transparent proxy"
//! contract: the console shows the human (or agent) the pass/fail line and
//! the truncated error output, while the history log receives a durable
//! entry with the token metrics. Console styling is deliberately plain.

use crate::history::HistoryLog;
use crate::runner::CheckOutcome;
use crate::tokens::estimate;
use crate::truncate::{TruncateLimits, truncate};
use crate::{CheckStatus, LogEntry};

/// Per-check result handed back to the run driver.
#[derive(Clone, Copy, Debug)]
pub struct ReportSummary {
    pub exit_code: i32,
    /// Tokens the truncation pass saved for this check.
    pub tokens_saved: u64,
}

const RULE: &str = "----------------------------------------";

/// Print the outcome, append it to the history, and return the summary.
pub fn report(
    outcome: &CheckOutcome,
    history: &HistoryLog,
    limits: &TruncateLimits,
) -> ReportSummary {
    let tokens_used = estimate(&outcome.output);
    let cut = truncate(&outcome.output, limits);
    let metrics = format!(
        "(total token size: {tokens_used}) (tokens truncated: {})",
        cut.tokens_elided,
    );

    println!("{RULE}");
    let entry = if outcome.exit_code == 0 {
        println!(
            "{} {} Passed! ({:.2}s) {metrics}",
            CheckStatus::Pass.icon(),
            outcome.label,
            outcome.duration_secs,
        );
        println!("{RULE}");
        LogEntry::pass(&outcome.label)
    } else {
        println!(
            "{} {} Failed ({:.2}s). Showing relevant error output:",
            CheckStatus::Fail.icon(),
            outcome.label,
            outcome.duration_secs,
        );
        println!("{RULE}");
        println!("{}", cut.display);
        LogEntry::fail(&outcome.label, cut.display.clone())
    }
    .with_command(&outcome.command)
    .with_duration(outcome.duration_secs)
    .with_tokens(tokens_used, cut.tokens_elided);

    history.append(&entry);

    ReportSummary {
        exit_code: outcome.exit_code,
        tokens_saved: cut.tokens_elided,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::{LedgerTotals, parse_footer};
    use std::fs;

    fn outcome(exit_code: i32, output: &str) -> CheckOutcome {
        CheckOutcome {
            label: "Test Suite".into(),
            exit_code,
            output: output.into(),
            duration_secs: 0.5,
            command: "cargo test".into(),
        }
    }

    fn read_parsed(history: &HistoryLog) -> (Vec<String>, LedgerTotals) {
        let lines = fs::read_to_string(history.path())
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect();
        parse_footer(lines)
    }

    #[test]
    fn pass_logs_metrics_without_snippet() {
        let dir = tempfile::tempdir().unwrap();
        let history = HistoryLog::new(dir.path());

        let summary = report(&outcome(0, "all 12 tests passed\n"), &history, &TruncateLimits::default());
        assert_eq!(summary.exit_code, 0);
        assert_eq!(summary.tokens_saved, 0);

        let (body, totals) = read_parsed(&history);
        assert_eq!(totals.size, estimate("all 12 tests passed\n"));
        assert_eq!(totals.savings, 0);
        assert!(body.iter().any(|l| l.contains("[cargo test] ✅ **Test Suite**: PASS")));
        assert!(!body.iter().any(|l| l.contains("<details>")));
    }

    #[test]
    fn fail_logs_truncated_snippet_and_savings() {
        let dir = tempfile::tempdir().unwrap();
        let history = HistoryLog::new(dir.path());
        let noisy = "E".repeat(9000);

        let summary = report(&outcome(1, &noisy), &history, &TruncateLimits::default());
        assert_eq!(summary.exit_code, 1);
        assert!(summary.tokens_saved > 0);

        let (body, totals) = read_parsed(&history);
        assert_eq!(totals.size, estimate(&noisy));
        assert_eq!(totals.savings, summary.tokens_saved);
        assert!(body.iter().any(|l| l.contains("❌ **Test Suite**: FAIL")));
        assert!(body.iter().any(|l| l.contains("<details>")));
        assert!(body.iter().any(|l| l.contains("[Truncated 7000 chars]")));
    }

    #[test]
    fn short_failure_logs_full_output() {
        let dir = tempfile::tempdir().unwrap();
        let history = HistoryLog::new(dir.path());

        report(&outcome(2, "assertion failed: left == right"), &history, &TruncateLimits::default());

        let (body, _) = read_parsed(&history);
        assert!(body.iter().any(|l| l.contains("assertion failed: left == right")));
    }
}
