use std::sync::LazyLock;

use regex::Regex;

static QUOTED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""([^"\n]*)"|“([^”\n]*)”"#).expect("valid quote pattern"));

static HASHTAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"#\S+").expect("valid hashtag pattern"));

/// Returns the inner text of the first quoted segment, or `""` when there is none.
///
/// Straight (`"..."`) and typographic (`“...”`) pairs are recognized; whichever
/// starts first wins. A segment never spans a line break.
pub fn extract_quote(text: &str) -> String {
    QUOTED
        .captures(text)
        .and_then(|caps| caps.get(1).or_else(|| caps.get(2)))
        .map(|m| m.as_str().trim().to_string())
        .unwrap_or_default()
}

/// Removes `#tags` and collapses the whitespace they leave behind, per line.
pub fn strip_hashtags(text: &str) -> String {
    let stripped = HASHTAG.replace_all(text, "");
    stripped
        .lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Cuts `text` to at most `max_chars` characters without splitting a code point.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
