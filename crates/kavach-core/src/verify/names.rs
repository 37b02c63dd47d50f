//! Name normalization for identity comparison.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Any run of whitespace characters
    static ref WHITESPACE_RUN: Regex = Regex::new(r"\s+").unwrap();

    /// Anything that is not a letter, digit, or whitespace
    static ref NON_ALPHANUMERIC: Regex = Regex::new(r"[^\p{L}\p{N}\s]").unwrap();
}

/// Normalize a name for comparison.
///
/// Lowercases, collapses whitespace runs to a single space, strips every
/// character that is not a letter, digit, or whitespace, then trims. The
/// steps run in that order, so `"A . B"` becomes `"a  b"` with two spaces.
pub fn normalize_name(raw: &str) -> String {
    let lower = raw.to_lowercase();
    let collapsed = WHITESPACE_RUN.replace_all(&lower, " ");
    let stripped = NON_ALPHANUMERIC.replace_all(&collapsed, "");
    stripped.trim().to_string()
}
