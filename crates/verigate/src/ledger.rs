//! The sticky footer: cumulative token counters at the end of the history
//! file.
//!
//! Rotation deletes old entry blocks, so the running totals cannot be
//! recomputed from the file body. Instead they live in a single trailing
//! line that every write parses, carries forward, and rewrites:
//!
//! ```text
//! > 📊 **Total Token Size:** 1234 | 💰 **Total Token Savings:** 567
//! ```
//!
//! Parsing is deliberately forgiving: a footer that fails to parse resets
//! the counters to zero and is dropped from the body. Losing stats is
//! acceptable; aborting a verification run over a mangled log line is not.

/// Marker text identifying the footer line.
pub const FOOTER_MARKER: &str = "Total Token Size:";

// ── Totals ─────────────────────────────────────────────────────────

/// Cumulative token counters carried by the footer.
///
/// Both values are monotonically non-decreasing for the lifetime of the
/// history file; they only reset when the file is deleted or the footer is
/// corrupted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LedgerTotals {
    /// Sum of `tokens_used` over every entry ever appended.
    pub size: u64,
    /// Sum of `tokens_saved` over every entry ever appended.
    pub savings: u64,
}

// ── Parse / format ─────────────────────────────────────────────────

/// Split `lines` into the entry body and the footer totals.
///
/// Every line containing [`FOOTER_MARKER`] is consumed; all other lines
/// pass through unchanged, in order. A well-formed marker line sets the
/// totals; a malformed one resets them to zero. With no marker line the
/// totals are zero and the body is the input unchanged.
///
/// Idempotent: the returned body contains no marker lines, so a second
/// pass returns the same body and zero totals.
pub fn parse_footer(lines: Vec<String>) -> (Vec<String>, LedgerTotals) {
    let mut totals = LedgerTotals::default();
    let mut body = Vec::with_capacity(lines.len());

    for line in lines {
        if !line.contains(FOOTER_MARKER) {
            body.push(line);
            continue;
        }
        let content = line.trim();
        let content = content.strip_prefix("> ").unwrap_or(content);
        let mut segments = content.splitn(2, '|');

        match segments.next().and_then(parse_counter) {
            Some(size) => {
                totals.size = size;
                totals.savings = segments.next().and_then(parse_counter).unwrap_or(0);
            }
            None => totals = LedgerTotals::default(),
        }
    }

    (body, totals)
}

/// Render the canonical footer line for the given totals.
///
/// Round-trips through [`parse_footer`]:
/// `parse_footer(vec![format_footer(t)])` yields an empty body and `t`.
pub fn format_footer(totals: &LedgerTotals) -> String {
    format!(
        "> 📊 **{FOOTER_MARKER}** {} | 💰 **Total Token Savings:** {}",
        totals.size, totals.savings,
    )
}

/// Extract the integer from one footer segment: take the substring after
/// the last `:`, strip markdown emphasis, and parse.
fn parse_counter(segment: &str) -> Option<u64> {
    let value = segment.rsplit(':').next()?;
    let cleaned: String = value.chars().filter(|c| *c != '*').collect();
    cleaned.trim().parse().ok()
}
