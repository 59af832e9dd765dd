//! DOI detection in text, filenames and resolver URLs.

use std::sync::LazyLock;

use regex::Regex;
use tracing::trace;

/// Regex pattern for bare DOIs: `10.XXXX/suffix`, case-insensitive.
#[allow(clippy::expect_used)]
static DOI_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)10\.\d{4,9}/[-._;()/:A-Z0-9]+").expect("DOI regex is valid")
});

/// Path segment after `doi.org/`, up to a query or fragment delimiter.
#[allow(clippy::expect_used)]
static DOI_URL_SEGMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)doi\.org/([^\s?#]+)").expect("DOI URL regex is valid")
});

/// A complete DOI string; resolver segments must satisfy this to count as DOIs.
#[allow(clippy::expect_used)]
static DOI_SHAPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^10\.\d{4,9}/\S+$").expect("DOI shape regex is valid")
});

#[allow(clippy::expect_used)]
static DOI_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^doi:\s*").expect("DOI prefix regex is valid")
});

/// Returns the first bare DOI in `text`, exactly as written.
///
/// # Examples
///
/// ```
/// use collect_papers_core::parser::find_doi;
///
/// assert_eq!(find_doi("see 10.1038/nature12373 here").as_deref(), Some("10.1038/nature12373"));
/// assert_eq!(find_doi("no identifier"), None);
/// ```
#[must_use]
pub fn find_doi(text: &str) -> Option<String> {
    DOI_PATTERN.find(text).map(|m| m.as_str().to_string())
}

/// Returns every bare DOI occurrence in `text`, in order (duplicates included).
#[must_use]
pub fn find_dois(text: &str) -> Vec<String> {
    DOI_PATTERN
        .find_iter(text)
        .map(|m| {
            trace!(doi = %m.as_str(), "found bare DOI");
            m.as_str().to_string()
        })
        .collect()
}

/// Extracts the DOI carried by a `doi.org/` resolver URL.
///
/// The segment after `doi.org/` is returned verbatim when it has DOI shape;
/// anything else (e.g. `https://doi.org/help`) yields `None`.
#[must_use]
pub fn doi_from_url(url: &str) -> Option<String> {
    let caps = DOI_URL_SEGMENT.captures(url)?;
    let segment = caps.get(1)?.as_str();
    DOI_SHAPE
        .is_match(segment)
        .then(|| segment.to_string())
}

/// Builds the `https://doi.org/` resolver URL for a DOI, dropping any `doi:` prefix.
#[must_use]
pub fn doi_to_url(doi: &str) -> String {
    let clean = DOI_PREFIX.replace(doi.trim(), "");
    format!("https://doi.org/{}", clean.trim())
}
