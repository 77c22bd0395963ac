//! Built-in policy gates.
//!
//! Gates are internal tasks that verify project discipline rather than run
//! the project's own tooling. The one gate shipped today enforces
//! test-driven development: newly added source files must come with a
//! matching test file.

use std::path::{Path, PathBuf};
use std::time::Instant;

use tokio::process::Command;
use tracing::debug;

use crate::runner::{CheckOutcome, Task};

/// Label the TDD gate reports under.
pub const TDD_GATE_LABEL: &str = "TDD Gate";

/// File extensions the gate treats as source code.
const SOURCE_EXTENSIONS: &[&str] = &["js", "ts", "py", "go", "rs"];

/// Build the TDD gate as a schedulable [`Task`].
pub fn tdd_gate_task(workdir: impl Into<PathBuf>) -> Task {
    let workdir = workdir.into();
    Task::new(TDD_GATE_LABEL, move || {
        Box::pin(async move { tdd_gate(&workdir).await })
    })
}

/// Check that every newly added source file has a companion test.
///
/// Reads `git status --porcelain` for untracked (`??`) and added (`A `)
/// files, then looks for a test or spec file sharing the source file's
/// base name among the new files and the working directory listing. The
/// name match is loose; the gate exists to catch obvious no-test commits,
/// not to police suite structure.
///
/// Outside a git repository (or without git installed) the gate passes:
/// it has nothing to say about projects it cannot inspect.
pub async fn tdd_gate(workdir: &Path) -> CheckOutcome {
    let start = Instant::now();
    let status = Command::new("git")
        .args(["status", "--porcelain"])
        .current_dir(workdir)
        .output()
        .await;

    let outcome = |exit_code: i32, output: String, duration_secs: f64| CheckOutcome {
        label: TDD_GATE_LABEL.to_string(),
        exit_code,
        output,
        duration_secs,
        command: "git status".to_string(),
    };

    let porcelain = match status {
        Ok(out) if out.status.success() => String::from_utf8_lossy(&out.stdout).to_string(),
        Ok(out) => {
            debug!("tdd gate: git status exited {:?}", out.status.code());
            return outcome(0, "Git check skipped.".to_string(), start.elapsed().as_secs_f64());
        }
        Err(e) => {
            debug!("tdd gate: could not run git: {e}");
            return outcome(0, "Git check skipped.".to_string(), start.elapsed().as_secs_f64());
        }
    };

    let new_files: Vec<String> = porcelain
        .lines()
        .filter(|line| line.starts_with("??") || line.starts_with("A "))
        .map(|line| line.chars().skip(3).collect())
        .collect();

    // Candidate pool for the companion-test search: the new files plus
    // whatever already sits in the working directory.
    let mut candidates = new_files.clone();
    if let Ok(entries) = std::fs::read_dir(workdir) {
        for entry in entries.flatten() {
            candidates.push(entry.file_name().to_string_lossy().to_string());
        }
    }

    let violations: Vec<&String> = new_files
        .iter()
        .filter(|file| is_untested_source(file, &candidates))
        .collect();

    let duration_secs = start.elapsed().as_secs_f64();
    if violations.is_empty() {
        outcome(0, "All new files have tests.".to_string(), duration_secs)
    } else {
        let listing: Vec<&str> = violations.iter().map(|v| v.as_str()).collect();
        outcome(
            1,
            format!("STRICT TDD VIOLATION: Missing tests for:\n{}", listing.join("\n")),
            duration_secs,
        )
    }
}

/// True when `file` is a source file with no test sibling among `candidates`.
fn is_untested_source(file: &str, candidates: &[String]) -> bool {
    let is_source = Path::new(file)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| SOURCE_EXTENSIONS.contains(&ext));
    if !is_source || looks_like_test(file) {
        return false;
    }

    let base = Path::new(file)
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_default();
    let base = base.split('.').next().unwrap_or_default().to_string();
    if base.is_empty() {
        return false;
    }

    !candidates
        .iter()
        .any(|other| other.contains(&base) && looks_like_test(other))
}

fn looks_like_test(name: &str) -> bool {
    name.contains("test") || name.contains("spec")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn git(dir: &Path, args: &[&str]) {
        let status = std::process::Command::new("git")
            .args(args)
            .current_dir(dir)
            .output()
            .expect("git runs in tests");
        assert!(status.status.success(), "git {args:?} failed");
    }

    fn git_available() -> bool {
        std::process::Command::new("git")
            .arg("--version")
            .output()
            .is_ok_and(|out| out.status.success())
    }

    #[test]
    fn untested_source_detection() {
        let candidates = vec!["widget.rs".to_string(), "widget_test.rs".to_string()];
        assert!(!is_untested_source("widget.rs", &candidates));

        let candidates = vec!["widget.rs".to_string()];
        assert!(is_untested_source("widget.rs", &candidates));

        // Non-source and test files are never violations themselves.
        assert!(!is_untested_source("notes.md", &candidates));
        assert!(!is_untested_source("widget_spec.ts", &candidates));
    }

    #[tokio::test]
    async fn gate_passes_outside_a_repository() {
        let dir = tempfile::tempdir().unwrap();
        let outcome = tdd_gate(dir.path()).await;
        assert_eq!(outcome.exit_code, 0);
        assert_eq!(outcome.output, "Git check skipped.");
        assert_eq!(outcome.command, "git status");
    }

    #[tokio::test]
    async fn gate_flags_new_source_without_tests() {
        if !git_available() {
            return;
        }
        let dir = tempfile::tempdir().unwrap();
        git(dir.path(), &["init", "--quiet"]);
        std::fs::write(dir.path().join("widget.rs"), "fn main() {}").unwrap();

        let outcome = tdd_gate(dir.path()).await;
        assert_eq!(outcome.exit_code, 1);
        assert!(outcome.output.contains("STRICT TDD VIOLATION"));
        assert!(outcome.output.contains("widget.rs"));
    }

    #[tokio::test]
    async fn gate_accepts_source_with_companion_test() {
        if !git_available() {
            return;
        }
        let dir = tempfile::tempdir().unwrap();
        git(dir.path(), &["init", "--quiet"]);
        std::fs::write(dir.path().join("widget.rs"), "fn main() {}").unwrap();
        std::fs::write(dir.path().join("widget_test.rs"), "#[test] fn ok() {}").unwrap();

        let outcome = tdd_gate(dir.path()).await;
        assert_eq!(outcome.exit_code, 0, "output was: {}", outcome.output);
        assert_eq!(outcome.output, "All new files have tests.");
    }

    #[tokio::test]
    async fn gate_task_carries_the_label() {
        let task = tdd_gate_task(".");
        assert_eq!(task.label, TDD_GATE_LABEL);
    }
}
