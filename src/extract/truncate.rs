/// Keeps at most `max` characters (Unicode scalar values)
pub fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((byte_idx, _)) => text[..byte_idx].to_string(),
        None => text.to_string(),
    }
}

/// Shortens text to a character budget, preferring a sentence boundary
///
/// Text within budget is returned unchanged. Otherwise the first `budget`
/// characters are cut after their last `.`, `!` or `?`; when they contain
/// none, `...` is appended to them instead.
///
/// # Examples
///
/// ```
/// use linkshelf::extract::truncate_sentence;
///
/// assert_eq!(truncate_sentence("Short title", 50), "Short title");
/// assert_eq!(truncate_sentence("One. Two three four", 10), "One.");
/// assert_eq!(truncate_sentence("abcdefghijkl", 5), "abcde...");
/// ```
pub fn truncate_sentence(text: &str, budget: usize) -> String {
    let head = truncate_chars(text, budget);
    if head.len() == text.len() {
        return head;
    }

    match head.rfind(['.', '!', '?']) {
        Some(idx) => head[..=idx].to_string(),
        None => format!("{}...", head),
    }
}
