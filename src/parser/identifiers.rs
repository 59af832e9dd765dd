//! Cross-format identifier scan: URLs, DOIs, PubMed IDs and PMC IDs.

use std::collections::HashSet;
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use super::doi::{doi_from_url, find_dois};
use super::url::find_urls;

#[allow(clippy::expect_used)]
static PMID_LABEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bPMID\s*:?\s*(\d{4,9})\b").expect("PMID regex is valid") // Static pattern, safe to panic
});

#[allow(clippy::expect_used)]
static PMCID_LABEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bPMCID?\s*:?\s*(PMC\d+)\b").expect("PMCID regex is valid") // Static pattern, safe to panic
});

#[allow(clippy::expect_used)]
static PUBMED_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)pubmed\.ncbi\.nlm\.nih\.gov/(\d{4,9})").expect("PubMed URL regex is valid") // Static pattern, safe to panic
});

#[allow(clippy::expect_used)]
static PMC_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)ncbi\.nlm\.nih\.gov/pmc/articles/(PMC\d+)").expect("PMC URL regex is valid") // Static pattern, safe to panic
});

/// The four identifier kinds tracked across a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum IdentifierKind {
    Url,
    Doi,
    PubmedId,
    PmcId,
}

impl IdentifierKind {
    /// All kinds, in output order.
    pub const ALL: [Self; 4] = [Self::Url, Self::Doi, Self::PubmedId, Self::PmcId];
}

impl fmt::Display for IdentifierKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Url => write!(f, "URL"),
            Self::Doi => write!(f, "DOI"),
            Self::PubmedId => write!(f, "PubMed ID"),
            Self::PmcId => write!(f, "PMC ID"),
        }
    }
}

/// Identifiers found in one block of text, each list deduplicated in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Identifiers {
    pub urls: Vec<String>,
    pub dois: Vec<String>,
    pub pmids: Vec<String>,
    pub pmcids: Vec<String>,
}

impl Identifiers {
    /// Returns the list for one identifier kind.
    #[must_use]
    pub fn of_kind(&self, kind: IdentifierKind) -> &[String] {
        match kind {
            IdentifierKind::Url => &self.urls,
            IdentifierKind::Doi => &self.dois,
            IdentifierKind::PubmedId => &self.pmids,
            IdentifierKind::PmcId => &self.pmcids,
        }
    }

    /// Returns true when nothing was found.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        IdentifierKind::ALL
            .iter()
            .all(|kind| self.of_kind(*kind).is_empty())
    }
}

#[derive(Default)]
struct UniqueList {
    seen: HashSet<String>,
    items: Vec<String>,
}

impl UniqueList {
    fn push(&mut self, value: &str) {
        if !value.is_empty() && self.seen.insert(value.to_string()) {
            self.items.push(value.to_string());
        }
    }
}

/// Scans text for every identifier kind.
///
/// URLs are scanned first; each URL may also yield a PubMed ID, a PMC ID or a
/// DOI from its path. Bare DOIs, `PMID:` labels and `PMCID:` labels follow.
/// The scan is deterministic: identical text gives identical sequences.
///
/// # Examples
///
/// ```
/// use collect_papers_core::parser::extract_identifiers;
///
/// let ids = extract_identifiers("PMID: 12345678 https://doi.org/10.1234/abc");
/// assert_eq!(ids.pmids, vec!["12345678"]);
/// assert_eq!(ids.dois, vec!["10.1234/abc"]);
/// ```
#[tracing::instrument(level = "trace", skip(text), fields(text_len = text.len()))]
#[must_use]
pub fn extract_identifiers(text: &str) -> Identifiers {
    let mut urls = UniqueList::default();
    let mut dois = UniqueList::default();
    let mut pmids = UniqueList::default();
    let mut pmcids = UniqueList::default();

    for url in find_urls(text) {
        if let Some(caps) = PUBMED_URL.captures(&url) {
            pmids.push(&caps[1]);
        }
        if let Some(caps) = PMC_URL.captures(&url) {
            pmcids.push(&caps[1]);
        }
        if let Some(doi) = doi_from_url(&url) {
            dois.push(&doi);
        }
        urls.push(&url);
    }

    for doi in find_dois(text) {
        dois.push(&doi);
    }
    for caps in PMID_LABEL.captures_iter(text) {
        pmids.push(&caps[1]);
    }
    for caps in PMCID_LABEL.captures_iter(text) {
        pmcids.push(&caps[1]);
    }

    Identifiers {
        urls: urls.items,
        dois: dois.items,
        pmids: pmids.items,
        pmcids: pmcids.items,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_identifiers_quoted_resolver_url() {
        let ids = extract_identifiers(r#"{"url": "https://doi.org/10.1234/abc", "x": 1}"#);
        assert_eq!(ids.urls, vec!["https://doi.org/10.1234/abc"]);
        assert_eq!(ids.dois, vec!["10.1234/abc"]);
    }

    #[test]
    fn test_extract_identifiers_empty_text() {
        assert!(extract_identifiers("").is_empty());
    }

    #[test]
    fn test_extract_identifiers_pubmed_url_and_label() {
        let ids = extract_identifiers(
            "https://pubmed.ncbi.nlm.nih.gov/31452104/ and PMID: 27654321 and pmid 31452104",
        );
        assert_eq!(ids.pmids, vec!["31452104", "27654321"]);
        assert_eq!(ids.urls, vec!["https://pubmed.ncbi.nlm.nih.gov/31452104/"]);
    }

    #[test]
    fn test_extract_identifiers_pmc_url_and_label() {
        let ids = extract_identifiers(
            "https://www.ncbi.nlm.nih.gov/pmc/articles/PMC6712345/ PMCID: PMC1111111",
        );
        assert_eq!(ids.pmcids, vec!["PMC6712345", "PMC1111111"]);
    }

    #[test]
    fn test_extract_identifiers_pmid_requires_four_digits() {
        let ids = extract_identifiers("PMID: 123");
        assert!(ids.pmids.is_empty());
    }

    #[test]
    fn test_extract_identifiers_doi_url_deduplicates_with_bare_scan() {
        let ids = extract_identifiers("https://doi.org/10.1234/abc");
        assert_eq!(ids.dois, vec!["10.1234/abc"]);
    }

    #[test]
    fn test_extract_identifiers_url_doi_comes_before_bare_doi() {
        let ids = extract_identifiers("10.5555/bare then https://doi.org/10.1234/linked");
        assert_eq!(ids.dois, vec!["10.1234/linked", "10.5555/bare"]);
    }

    #[test]
    fn test_extract_identifiers_is_deterministic() {
        let text = "x https://a.org/1 10.1234/a PMID: 12345 PMCID: PMC99 https://b.org/2 10.1234/a";
        let first = extract_identifiers(text);
        let second = extract_identifiers(text);
        assert_eq!(first, second);
        assert_eq!(first.urls, vec!["https://a.org/1", "https://b.org/2"]);
        assert_eq!(first.dois, vec!["10.1234/a"]);
    }

    #[test]
    fn test_identifiers_of_kind_maps_lists() {
        let ids = extract_identifiers("https://a.org PMID: 12345");
        assert_eq!(ids.of_kind(IdentifierKind::Url), ["https://a.org"]);
        assert_eq!(ids.of_kind(IdentifierKind::PubmedId), ["12345"]);
        assert!(ids.of_kind(IdentifierKind::Doi).is_empty());
    }

    #[test]
    fn test_identifier_kind_display() {
        assert_eq!(IdentifierKind::PmcId.to_string(), "PMC ID");
    }
}
