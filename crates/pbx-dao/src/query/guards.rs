//! Shared guardrails for search payload bounds.

/// Longest free-text term handed to the database, in characters.
pub const MAX_SEARCH_TERM_LENGTH: usize = 128;

/// Escape character used in every generated `LIKE ... ESCAPE` clause.
pub const LIKE_ESCAPE: char = '\\';

/// Trim `term` and cut it to at most `max_chars` characters, never splitting
/// a character.
pub fn truncate_term(term: &str, max_chars: usize) -> String {
    let stripped = term.trim();
    match stripped.char_indices().nth(max_chars) {
        Some((idx, _)) => stripped[..idx].to_string(),
        None => stripped.to_string(),
    }
}

/// Escape `LIKE` wildcards so `%` and `_` match themselves.
pub fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for ch in term.chars() {
        if ch == LIKE_ESCAPE || ch == '%' || ch == '_' {
            escaped.push(LIKE_ESCAPE);
        }
        escaped.push(ch);
    }
    escaped
}

/// `%term%` pattern for a substring match.
pub fn contains_pattern(term: &str) -> String {
    format!("%{}%", escape_like(term))
}
