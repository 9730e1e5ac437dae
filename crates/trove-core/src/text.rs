//! Small text utilities shared across the pipeline.

/// Truncate a string to at most `max` characters, on a char boundary.
///
/// Returns a borrowed slice; no allocation. Counting is by `char`, not bytes,
/// so multi-byte input never gets split mid-codepoint.
pub fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

/// Truncate to `max` characters and append an ellipsis when anything was cut.
///
/// Used for display strings in suggestions, where the reader should see that
/// a title continues.
pub fn excerpt(s: &str, max: usize) -> String {
    let cut = truncate_chars(s, max);
    if cut.len() < s.len() {
        format!("{}...", cut)
    } else {
        cut.to_string()
    }
}
