//! Token estimation for check output.
//!
//! Uses the standard rough heuristic of one token per four characters of
//! English text. The exact divisor matters more than its accuracy: history
//! footers accumulate these estimates across runs, so changing the formula
//! would silently skew totals that already live on disk.

/// Characters per estimated token.
pub const CHARS_PER_TOKEN: usize = 4;

/// Estimate the token count of `text`: character count divided by four,
/// rounded down. Empty text yields 0.
///
/// Counts characters rather than bytes so multi-byte output (compiler
/// carets, box drawing, emoji in test names) doesn't inflate totals.
pub fn estimate(text: &str) -> u64 {
    (text.chars().count() / CHARS_PER_TOKEN) as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_is_zero() {
        assert_eq!(estimate(""), 0);
    }

    #[test]
    fn floors_partial_tokens() {
        assert_eq!(estimate("abc"), 0);
        assert_eq!(estimate("abcd"), 1);
        assert_eq!(estimate("abcdefg"), 1);
        assert_eq!(estimate("abcdefgh"), 2);
    }

    #[test]
    fn counts_characters_not_bytes() {
        // Four 2-byte characters: one token, not two.
        assert_eq!(estimate("éééé"), 1);
        assert_eq!(estimate(&"🚀".repeat(8)), 2);
    }

    #[test]
    fn large_input() {
        assert_eq!(estimate(&"x".repeat(10_000)), 2500);
    }
}
