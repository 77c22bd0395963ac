//! Smart truncation of check output.
//!
//! A 12,000-character error dump is mostly noise: the useful signal sits in
//! the head (error type, first failing assertion) and the tail (summary
//! counts, final stack frames). [`truncate`] keeps both ends, replaces the
//! middle with an elision marker, and reports how many tokens the cut saved
//! so the history footer can account for it.

use crate::tokens::estimate;

/// Default character limit before output is truncated.
pub const DEFAULT_TRUNCATE_LIMIT: usize = 2000;

/// Default characters of output head preserved.
pub const DEFAULT_HEAD_CHARS: usize = 1000;

/// Default characters of output tail preserved.
pub const DEFAULT_TAIL_CHARS: usize = 1000;

// ── Limits ─────────────────────────────────────────────────────────

/// Tunable truncation thresholds, all counted in characters.
#[derive(Clone, Copy, Debug)]
pub struct TruncateLimits {
    /// Output at or under this length passes through untouched.
    pub limit: usize,
    /// Characters kept from the start of over-limit output.
    pub head: usize,
    /// Characters kept from the end of over-limit output.
    pub tail: usize,
}

impl Default for TruncateLimits {
    fn default() -> Self {
        Self {
            limit: DEFAULT_TRUNCATE_LIMIT,
            head: DEFAULT_HEAD_CHARS,
            tail: DEFAULT_TAIL_CHARS,
        }
    }
}

impl TruncateLimits {
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn head(mut self, head: usize) -> Self {
        self.head = head;
        self
    }

    pub fn tail(mut self, tail: usize) -> Self {
        self.tail = tail;
        self
    }
}

// ── Truncation ─────────────────────────────────────────────────────

/// Result of a truncation pass.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Truncation {
    /// The (possibly truncated) text to display and log.
    pub display: String,
    /// Estimated tokens removed by the cut; 0 when nothing was cut.
    pub tokens_elided: u64,
}

/// Truncate `output` to a head+tail excerpt when it exceeds the limit.
///
/// Deterministic and side-effect free. The elision marker states the number
/// of characters over the limit. `tokens_elided` is the estimate of the raw
/// output minus the estimate of the excerpt, clamped at zero: when head and
/// tail overlap (input barely over the limit with generous head/tail
/// settings) the excerpt can come out longer than the input, and negative
/// savings must never be reported.
#[allow(clippy::string_slice)] // indices come from char_indices, always on a boundary
pub fn truncate(output: &str, limits: &TruncateLimits) -> Truncation {
    let total_chars = output.chars().count();
    if total_chars <= limits.limit {
        return Truncation {
            display: output.to_string(),
            tokens_elided: 0,
        };
    }

    let head_end = byte_offset(output, limits.head);
    let tail_start = byte_offset(output, total_chars.saturating_sub(limits.tail));
    let display = format!(
        "{}\n... [Truncated {} chars] ...\n{}",
        &output[..head_end],
        total_chars - limits.limit,
        &output[tail_start..],
    );

    let tokens_elided = estimate(output).saturating_sub(estimate(&display));
    Truncation {
        display,
        tokens_elided,
    }
}

/// Byte index of the `n`th character of `s`, or `s.len()` past the end.
fn byte_offset(s: &str, n: usize) -> usize {
    s.char_indices().nth(n).map_or(s.len(), |(i, _)| i)
}
