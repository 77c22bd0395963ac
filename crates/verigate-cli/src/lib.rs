//! Manifest loading for the `verigate` binary.
//!
//! The orchestrator never guesses which commands verify a project; the
//! operator declares them in a JSON manifest, one object per check:
//!
//! ```json
//! [
//!   { "label": "Lint", "command": "cargo check" },
//!   { "label": "Test Suite", "command": "cargo test" },
//!   { "label": "Security Scan", "command": "cargo audit" }
//! ]
//! ```

use std::path::Path;

use verigate::Check;

/// Load the checks manifest from a JSON file.
///
/// Returns a formatted error for a missing file, invalid JSON, or an empty
/// check list; the caller surfaces it as a usage error before anything runs.
pub fn load_checks(path: &Path) -> Result<Vec<Check>, String> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("failed to read checks manifest '{}': {e}", path.display()))?;
    let checks: Vec<Check> = serde_json::from_str(&content)
        .map_err(|e| format!("failed to parse checks manifest '{}': {e}", path.display()))?;
    if checks.is_empty() {
        return Err(format!(
            "checks manifest '{}' declares no checks",
            path.display()
        ));
    }
    Ok(checks)
}
