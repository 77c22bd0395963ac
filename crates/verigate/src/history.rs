//! The on-disk verification history log.
//!
//! [`HistoryLog`] owns a Markdown file (`verification_history.md` by
//! default) holding one entry block per verification result and a sticky
//! footer with cumulative token totals. Every [`append`](HistoryLog::append)
//! is a full read → parse → rotate → write transaction under the store's
//! own mutex, so concurrent checks in the same process can never interleave
//! partial writes. Cross-process writers are out of contract.
//!
//! The log is a best-effort side channel: appends swallow every I/O error
//! after attempting the write. A missing directory, a read-only file, or a
//! full disk must never fail a verification run, so failures surface only
//! as DEBUG-level tracing events.
//!
//! File shape after a few runs:
//!
//! ```text
//! - **[2026-08-05 14:01:12]** [cargo check] ✅ **Lint**: PASS (1.42s) (total token size: 12) (tokens truncated: 0)
//!
//! - **[2026-08-05 14:03:40]** [cargo test] ❌ **Test Suite**: FAIL (8.90s) (total token size: 950) (tokens truncated: 450)
//!   <details>
//!   <summary>🔍 View Truncated Error</summary>
//!   ...
//!   </details>
//!
//! > 📊 **Total Token Size:** 962 | 💰 **Total Token Savings:** 450
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::debug;

use crate::LogEntry;
use crate::ledger;

/// Default history file name.
pub const DEFAULT_LOG_FILENAME: &str = "verification_history.md";

/// Default rotation knob. The body may grow to twice this many lines
/// before pruning kicks in; the slack absorbs multi-line error blocks
/// without rotating on every write.
pub const DEFAULT_MAX_LOG_LINES: usize = 200;

/// Prefix identifying a rotation marker line.
const ROTATION_MARKER_PREFIX: &str = "... (";

/// Directory adjacent to the running executable, falling back to the
/// working directory.
///
/// Agents invoke the gate from arbitrary working directories; anchoring
/// the log next to the tool itself keeps one history per installation
/// instead of scattering fragments across every directory a run starts in.
pub fn default_log_dir() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."))
}

// ── HistoryLog ─────────────────────────────────────────────────────

/// Append-only store for verification history.
///
/// Each instance guards its own file with its own lock; share one instance
/// (by reference or `Arc`) among everything that writes to the same file.
///
/// # Example
///
/// ```ignore
/// let history = HistoryLog::new(default_log_dir()).with_max_log_lines(500);
/// history.append(&LogEntry::pass("Lint").with_tokens(40, 0));
/// ```
#[derive(Debug)]
pub struct HistoryLog {
    path: PathBuf,
    max_log_lines: usize,
    lock: Mutex<()>,
}

impl HistoryLog {
    /// Create a store writing `verification_history.md` inside `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            path: dir.into().join(DEFAULT_LOG_FILENAME),
            max_log_lines: DEFAULT_MAX_LOG_LINES,
            lock: Mutex::new(()),
        }
    }

    /// Override the history file name.
    pub fn with_file_name(mut self, name: impl Into<String>) -> Self {
        self.path.set_file_name(name.into());
        self
    }

    /// Override the rotation knob ([`DEFAULT_MAX_LOG_LINES`]).
    pub fn with_max_log_lines(mut self, max: usize) -> Self {
        self.max_log_lines = max;
        self
    }

    /// Full path of the history file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The pruning threshold: twice the configured line maximum.
    pub fn safe_log_lines(&self) -> usize {
        self.max_log_lines * 2
    }

    /// Append one entry, carrying the footer totals forward.
    ///
    /// Never fails: all I/O errors are attempted, then swallowed. A lock
    /// poisoned by a panicking writer is re-entered rather than propagated,
    /// since the file is rewritten wholesale on every transaction anyway.
    pub fn append(&self, entry: &LogEntry) {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        if let Err(e) = self.write_transaction(entry) {
            debug!("history append skipped: {e}");
        }
    }

    /// One read → parse → rotate → write cycle. Caller holds the lock.
    fn write_transaction(&self, entry: &LogEntry) -> Result<(), String> {
        // Unreadable or absent files start a fresh log with zero totals.
        let raw = fs::read_to_string(&self.path).unwrap_or_default();
        let lines: Vec<String> = raw.lines().map(str::to_string).collect();

        let (mut body, mut totals) = ledger::parse_footer(lines);
        totals.size = totals.size.saturating_add(entry.tokens_used);
        totals.savings = totals.savings.saturating_add(entry.tokens_saved);

        body.extend(entry_lines(entry));
        body.push(String::new());
        self.rotate(&mut body);
        body.push(ledger::format_footer(&totals));

        let mut text = body.join("\n");
        text.push('\n');

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| format!("failed to create {}: {e}", parent.display()))?;
        }
        fs::write(&self.path, text)
            .map_err(|e| format!("failed to write {}: {e}", self.path.display()))
    }

    /// Prune the body to at most `safe_log_lines` lines, marker included.
    ///
    /// Runs after the new entry joins the body so the written file always
    /// honors the bound, whatever size the entry block was.
    fn rotate(&self, body: &mut Vec<String>) {
        let safe = self.safe_log_lines();
        if body.len() <= safe {
            return;
        }
        let keep = safe.saturating_sub(1);
        let dropped = body.len() - keep;
        body.drain(..dropped);
        if !body
            .first()
            .is_some_and(|line| line.starts_with(ROTATION_MARKER_PREFIX))
        {
            body.insert(0, format!("... (Log rotated: {dropped} older lines dropped) ..."));
        }
    }
}

// ── Entry serialization ────────────────────────────────────────────

/// Render an entry as its summary line plus the optional error block.
fn entry_lines(entry: &LogEntry) -> Vec<String> {
    let timestamp = entry.timestamp.format("%Y-%m-%d %H:%M:%S");
    let context = if entry.command_context.is_empty() {
        "[Internal]".to_string()
    } else {
        format!("[{}]", entry.command_context)
    };
    let duration = if entry.duration_secs > 0.0 {
        format!("({:.2}s) ", entry.duration_secs)
    } else {
        String::new()
    };
    let metrics = format!(
        "(total token size: {}) (tokens truncated: {})",
        entry.tokens_used, entry.tokens_saved,
    );

    let mut lines = vec![format!(
        "- **[{timestamp}]** {context} {} **{}**: {} {duration}{metrics}",
        entry.status.icon(),
        entry.label,
        entry.status,
    )];

    // Collapsed by default so the log stays scannable; agents and humans
    // expand it only when they need the full snippet.
    if let Some(snippet) = entry.error_snippet.as_deref().filter(|s| !s.is_empty()) {
        lines.push("  <details>".into());
        lines.push("  <summary>🔍 View Truncated Error</summary>".into());
        lines.push(String::new());
        lines.push("  ```text".into());
        for line in snippet.lines() {
            lines.push(format!("  {line}"));
        }
        lines.push("  ```".into());
        lines.push("  </details>".into());
    }

    lines
}

// ── Tests ──────────────────────────────────────────────────────────
