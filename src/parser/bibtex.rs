//! Regex field extraction for BibTeX-like text.
//!
//! This is not a BibTeX parser: each field is located independently with a
//! pattern, so several entries in one file contribute their first match only
//! (URLs excepted, which are all collected).

use std::sync::LazyLock;

use regex::Regex;

use super::doi::find_doi;
use super::metadata::{BibMetadata, non_empty};

#[allow(clippy::expect_used)]
static DOI_FIELD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\bdoi\s*=\s*["{]([^"}]+)["}]"#).expect("bibtex doi regex is valid")
});
#[allow(clippy::expect_used)]
static TITLE_FIELD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\btitle\s*=\s*["{]([^\n\r}]+)["}]"#).expect("bibtex title regex is valid")
});
#[allow(clippy::expect_used)]
static AUTHOR_FIELD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\bauthor\s*=\s*["{]([^\n\r}]+)["}]"#).expect("bibtex author regex is valid")
});
#[allow(clippy::expect_used)]
static YEAR_FIELD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\byear\s*=\s*["{]?([0-9]{4})"#).expect("bibtex year regex is valid")
});
#[allow(clippy::expect_used)]
static URL_FIELD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\burl\s*=\s*["{]([^"}]+)["}]"#).expect("bibtex url regex is valid")
});
#[allow(clippy::expect_used)]
static VENUE_FIELD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\b(?:journal|booktitle)\s*=\s*["{]([^\n\r}]+)["}]"#)
        .expect("bibtex venue regex is valid")
});

/// Extracts doi, title, author, year, venue and url fields from BibTeX-like text.
///
/// A missing `doi` field falls back to the first bare DOI anywhere in the text.
///
/// # Examples
///
/// ```
/// use collect_papers_core::parser::parse_bibtex_metadata;
///
/// let meta = parse_bibtex_metadata("@article{k, title = {Foo}, year = {2020}}");
/// assert_eq!(meta.title.as_deref(), Some("Foo"));
/// assert_eq!(meta.year.as_deref(), Some("2020"));
/// ```
#[tracing::instrument(level = "trace", skip(text), fields(text_len = text.len()))]
#[must_use]
pub fn parse_bibtex_metadata(text: &str) -> BibMetadata {
    let doi = first_capture(&DOI_FIELD, text).or_else(|| find_doi(text));
    let urls = URL_FIELD
        .captures_iter(text)
        .filter_map(|caps| non_empty(&caps[1]))
        .collect();

    BibMetadata {
        doi,
        title: first_capture(&TITLE_FIELD, text),
        authors: first_capture(&AUTHOR_FIELD, text),
        year: YEAR_FIELD.captures(text).map(|caps| caps[1].to_string()),
        venue: first_capture(&VENUE_FIELD, text),
        urls,
    }
}

fn first_capture(pattern: &Regex, text: &str) -> Option<String> {
    pattern
        .captures(text)
        .and_then(|caps| non_empty(&caps[1]))
}
