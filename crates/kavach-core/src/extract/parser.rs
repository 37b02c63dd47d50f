//! Best-effort JSON recovery from free-form model output.

use lazy_static::lazy_static;
use regex::Regex;
use serde_json::Value as JsonValue;

use super::ExtractionError;

lazy_static! {
    /// Opening fence, optional `json` tag, newline, then the lazily matched
    /// interior up to the next fence.
    static ref FENCED_BLOCK: Regex = Regex::new(r"(?is)```(?:json)?\n(.*?)```").unwrap();
}

/// Extract a single JSON value from model output.
///
/// # Strategy
/// 1. If the text contains a fenced block, only the first block's interior is
///    considered; otherwise the whole text is.
/// 2. Parse the candidate directly.
/// 3. Failing that, parse the slice between the first `{` and the last `}`.
///
/// The slice in step 3 is not brace-aware: a `}` inside a quoted string after
/// the real object ends the slice in the wrong place and the parse fails.
pub fn extract_json(text: &str) -> Result<JsonValue, ExtractionError> {
    let candidate = fenced_interior(text).unwrap_or(text);

    if let Ok(value) = serde_json::from_str(candidate) {
        return Ok(value);
    }

    if let Some(slice) = brace_slice(candidate) {
        if let Ok(value) = serde_json::from_str(slice) {
            tracing::debug!("Recovered JSON by brace slicing");
            return Ok(value);
        }
    }

    Err(ExtractionError::NoJsonFound)
}

/// Interior of the first fenced block, if any.
fn fenced_interior(text: &str) -> Option<&str> {
    FENCED_BLOCK
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Substring from the first `{` through the last `}`, inclusive.
fn brace_slice(candidate: &str) -> Option<&str> {
    let start = candidate.find('{')?;
    let end = candidate.rfind('}')?;
    if end > start {
        Some(&candidate[start..=end])
    } else {
        None
    }
}
