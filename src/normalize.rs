//! Sanitation of raw title, description and keyword input.
//!
//! Every function here is total: empty input yields an empty string (or an
//! empty list) and nothing can fail. HTML escaping is not done here; maud
//! escapes text and attribute values once when the tags are emitted.

/// Maximum characters kept in a `description` meta tag.
pub const DESCRIPTION_MAX_LEN: usize = 200;

/// Maximum characters kept in a `keywords` meta tag.
pub const KEYWORDS_MAX_LEN: usize = 500;

/// Strip HTML tags from a string (simple angle-bracket stripping).
pub fn strip_tags(html: &str) -> String {
    let mut result = String::with_capacity(html.len());
    let mut in_tag = false;
    for c in html.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => result.push(c),
            _ => {}
        }
    }
    result
}

/// Collapse every whitespace run to a single space and trim both ends.
pub fn squish(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Keep at most `max` characters. Cuts on a char boundary, never mid code point.
pub fn truncate(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((byte_idx, _)) => text[..byte_idx].trim_end().to_string(),
        None => text.to_string(),
    }
}

/// Title parts with markup removed. Empty parts are dropped.
pub fn normalize_title(parts: &[String]) -> Vec<String> {
    parts
        .iter()
        .map(|part| strip_tags(part).trim().to_string())
        .filter(|part| !part.is_empty())
        .collect()
}

/// Description text: parts joined with `separator`, tags stripped,
/// whitespace collapsed, cut to [`DESCRIPTION_MAX_LEN`].
pub fn normalize_description(parts: &[String], separator: &str) -> String {
    let joined = parts.join(separator);
    truncate(&squish(&strip_tags(&joined)), DESCRIPTION_MAX_LEN)
}

/// Keyword list: parts joined with `", "`, tags stripped, whitespace
/// collapsed, lowercased, cut to [`KEYWORDS_MAX_LEN`].
pub fn normalize_keywords(parts: &[String]) -> String {
    let joined = parts.join(", ");
    truncate(
        &squish(&strip_tags(&joined)).to_lowercase(),
        KEYWORDS_MAX_LEN,
    )
}
