//! URL detection in free text.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use tracing::trace;

/// Regex pattern for finding URLs in text.
/// Matches http:// and https:// up to whitespace or a closing parenthesis.
#[allow(clippy::expect_used)]
static URL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)https?://[^\s)]+").expect("URL regex is valid") // Static pattern, safe to panic
});

/// Finds URLs in text, cleaned of trailing punctuation, deduplicated in first-seen order.
///
/// # Examples
///
/// ```
/// use collect_papers_core::parser::find_urls;
///
/// let urls = find_urls("See https://example.com/paper.pdf, then (https://example.org/x).");
/// assert_eq!(urls, vec!["https://example.com/paper.pdf", "https://example.org/x"]);
/// ```
#[must_use]
pub fn find_urls(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut urls = Vec::new();

    for url_match in URL_PATTERN.find_iter(text) {
        let cleaned = clean_url_trailing(url_match.as_str());
        if cleaned.is_empty() || !seen.insert(cleaned.to_string()) {
            continue;
        }
        trace!(url = %cleaned, "found URL");
        urls.push(cleaned.to_string());
    }

    urls
}

/// Strips trailing sentence punctuation, closing brackets and quotes captured with a URL.
pub(crate) fn clean_url_trailing(url: &str) -> &str {
    url.trim().trim_end_matches(|c: char| {
        matches!(c, ')' | '.' | ',' | ';' | ']' | '}' | '>' | '"' | '\'')
    })
}
