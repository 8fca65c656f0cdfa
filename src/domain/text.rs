//! Whitespace normalization and length clipping shared by rendering and logging

pub const LOG_VALUE_MAX_CHARS: usize = 120;
const ELLIPSIS: char = '…';

/// Collapses every run of whitespace (newlines included) to one space and trims both ends.
pub fn collapse_whitespace(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub fn clip_chars(value: &str, max_chars: usize) -> String {
    value.chars().take(max_chars).collect()
}

/// Normalizes a caller-provided value for diagnostic output, capping it at
/// [`LOG_VALUE_MAX_CHARS`] characters including the trailing ellipsis.
pub fn clip_for_log(value: &str) -> String {
    let normalized = collapse_whitespace(value);
    if normalized.chars().count() <= LOG_VALUE_MAX_CHARS {
        return normalized;
    }

    let mut clipped = clip_chars(&normalized, LOG_VALUE_MAX_CHARS - 1);
    clipped.push(ELLIPSIS);
    clipped
}
