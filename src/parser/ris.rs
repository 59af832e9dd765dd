//! Line-oriented RIS / NBIB (MEDLINE) tag extraction.

use std::sync::LazyLock;

use regex::Regex;

use super::metadata::{BibMetadata, fill};

#[allow(clippy::expect_used)]
static YEAR_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:19|20)\d{2}").expect("RIS year regex is valid"));

const DOI_TAGS: [&str; 2] = ["DO", "DOI"];
const TITLE_TAGS: [&str; 2] = ["TI", "T1"];
const AUTHOR_TAGS: [&str; 3] = ["AU", "A1", "A2"];
const YEAR_TAGS: [&str; 3] = ["PY", "Y1", "DA"];
const VENUE_TAGS: [&str; 5] = ["JO", "JF", "T2", "BT", "J2"];
const URL_TAGS: [&str; 4] = ["UR", "L1", "L2", "LK"];

/// Extracts metadata from `TAG - value` records.
///
/// Single-valued fields keep the first tag seen; authors and URLs accumulate
/// in encounter order. Authors are joined with `"; "`.
///
/// # Examples
///
/// ```
/// use collect_papers_core::parser::parse_ris_metadata;
///
/// let meta = parse_ris_metadata("TI  - Bar\nAU  - Smith, J\nAU  - Doe, A\nPY  - 2019///");
/// assert_eq!(meta.title.as_deref(), Some("Bar"));
/// assert_eq!(meta.authors.as_deref(), Some("Smith, J; Doe, A"));
/// assert_eq!(meta.year.as_deref(), Some("2019"));
/// ```
#[tracing::instrument(level = "trace", skip(text), fields(text_len = text.len()))]
#[must_use]
pub fn parse_ris_metadata(text: &str) -> BibMetadata {
    let mut meta = BibMetadata::default();
    let mut authors: Vec<String> = Vec::new();

    for line in text.lines() {
        let Some((raw_tag, raw_value)) = line.split_once(" - ") else {
            continue;
        };
        let tag = raw_tag.trim().to_ascii_uppercase();
        let value = raw_value.trim();
        if value.is_empty() {
            continue;
        }
        let tag = tag.as_str();

        if DOI_TAGS.contains(&tag) {
            fill(&mut meta.doi, Some(value));
        } else if TITLE_TAGS.contains(&tag) {
            fill(&mut meta.title, Some(value));
        } else if AUTHOR_TAGS.contains(&tag) {
            authors.push(value.to_string());
        } else if YEAR_TAGS.contains(&tag) {
            if meta.year.is_none() {
                meta.year = YEAR_PATTERN.find(value).map(|m| m.as_str().to_string());
            }
        } else if VENUE_TAGS.contains(&tag) {
            fill(&mut meta.venue, Some(value));
        } else if URL_TAGS.contains(&tag) {
            meta.urls.push(value.to_string());
        }
    }

    if !authors.is_empty() {
        meta.authors = Some(authors.join("; "));
    }
    meta
}
