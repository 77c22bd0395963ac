//! Minimal verification run — three checks from zero to logged history.
//!
//! Declares the checks an operator would normally keep in `checks.json`,
//! runs them sequentially, and prints the history file the run produced,
//! sticky footer included. Run it twice to watch the footer totals climb.
//!
//! # Usage
//!
//! ```bash
//! cargo run --example basic_run
//! ```

use verigate::{Check, HistoryLog, Task, TruncateLimits, run_serial};

#[tokio::main]
async fn main() {
    // 1. Declare the checks.
    let checks = vec![
        Check {
            label: "Toolchain".into(),
            command: "rustc --version".into(),
        },
        Check {
            label: "Workspace Listing".into(),
            command: "ls -la".into(),
        },
        Check {
            label: "Noisy Output".into(),
            command: "seq 1 2000".into(),
        },
    ];

    // 2. A history log in the working directory (the CLI defaults to the
    //    directory next to the installed binary instead).
    let history = HistoryLog::new(".").with_file_name("demo_history.md");

    // 3. Run sequentially: declaration order, stop at the first failure.
    let tasks: Vec<Task> = checks.into_iter().map(Task::from_check).collect();
    let summary = run_serial(tasks, &history, &TruncateLimits::default()).await;

    // 4. Show what the run wrote.
    if let Ok(text) = std::fs::read_to_string(history.path()) {
        println!("\n--- {} ---\n{text}", history.path().display());
    }
    std::process::exit(summary.exit_code);
}
