//! Cross-reference aggregation: identifier -> files, and DOI -> best-known record.
//!
//! Both structures only grow during a run. Path sets use set semantics, so
//! folding the same identifier from the same file twice is a no-op.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::parser::{BibMetadata, IdentifierKind, Identifiers, fill};

/// Identifier value -> absolute paths of the files that mentioned it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IdentifierIndex {
    entries: BTreeMap<String, BTreeSet<String>>,
}

impl IdentifierIndex {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `path_key` to the set for `identifier`. Empty identifiers are ignored.
    pub fn add(&mut self, identifier: &str, path_key: &str) {
        if identifier.is_empty() {
            return;
        }
        self.entries
            .entry(identifier.to_string())
            .or_default()
            .insert(path_key.to_string());
    }

    /// Unions a list of paths into the set for `identifier`.
    pub fn union_paths<I, S>(&mut self, identifier: &str, paths: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if identifier.is_empty() {
            return;
        }
        self.entries
            .entry(identifier.to_string())
            .or_default()
            .extend(paths.into_iter().map(Into::into));
    }

    #[must_use]
    pub fn get(&self, identifier: &str) -> Option<&BTreeSet<String>> {
        self.entries.get(identifier)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &BTreeSet<String>)> {
        self.entries.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// The four per-kind identifier indexes of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdentifierIndexes {
    pub urls: IdentifierIndex,
    pub dois: IdentifierIndex,
    pub pmids: IdentifierIndex,
    pub pmcids: IdentifierIndex,
}

impl IdentifierIndexes {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds every identifier of a scan into the matching index.
    pub fn record(&mut self, ids: &Identifiers, path_key: &str) {
        for kind in IdentifierKind::ALL {
            let index = self.get_mut(kind);
            for identifier in ids.of_kind(kind) {
                index.add(identifier, path_key);
            }
        }
        trace!(
            path = path_key,
            urls = ids.urls.len(),
            dois = ids.dois.len(),
            pmids = ids.pmids.len(),
            pmcids = ids.pmcids.len(),
            "Folded identifiers"
        );
    }

    #[must_use]
    pub fn get(&self, kind: IdentifierKind) -> &IdentifierIndex {
        match kind {
            IdentifierKind::Url => &self.urls,
            IdentifierKind::Doi => &self.dois,
            IdentifierKind::PubmedId => &self.pmids,
            IdentifierKind::PmcId => &self.pmcids,
        }
    }

    pub fn get_mut(&mut self, kind: IdentifierKind) -> &mut IdentifierIndex {
        match kind {
            IdentifierKind::Url => &mut self.urls,
            IdentifierKind::Doi => &mut self.dois,
            IdentifierKind::PubmedId => &mut self.pmids,
            IdentifierKind::PmcId => &mut self.pmcids,
        }
    }
}

/// Best-known bibliographic fields for one DOI, plus every file it came from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DoiRecord {
    pub title: Option<String>,
    pub authors: Option<String>,
    pub year: Option<String>,
    pub venue: Option<String>,
    pub sources: BTreeSet<String>,
}

impl DoiRecord {
    /// Fills every empty field from `other` and unions the source sets.
    ///
    /// Fields already set are never replaced. The same merge serves documents
    /// within a run and persisted records from earlier runs.
    pub fn fill_missing(&mut self, other: &Self) {
        fill(&mut self.title, other.title.as_deref());
        fill(&mut self.authors, other.authors.as_deref());
        fill(&mut self.year, other.year.as_deref());
        fill(&mut self.venue, other.venue.as_deref());
        self.sources.extend(other.sources.iter().cloned());
    }

    fn from_metadata(meta: Option<&BibMetadata>, path_key: &str) -> Self {
        Self {
            title: meta.and_then(|m| m.title.clone()),
            authors: meta.and_then(|m| m.authors.clone()),
            year: meta.and_then(|m| m.year.clone()),
            venue: meta.and_then(|m| m.venue.clone()),
            sources: BTreeSet::from([path_key.to_string()]),
        }
    }
}

/// DOI -> [`DoiRecord`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DoiRecords {
    records: BTreeMap<String, DoiRecord>,
}

impl DoiRecords {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `path_key` as a source of `doi`, filling empty fields from `meta`.
    ///
    /// Passing `None` registers a bare record (an "also seen" DOI). Blank DOIs
    /// are ignored.
    pub fn record(&mut self, doi: &str, path_key: &str, meta: Option<&BibMetadata>) {
        let key = doi.trim();
        if key.is_empty() {
            return;
        }
        let incoming = DoiRecord::from_metadata(meta, path_key);
        self.records
            .entry(key.to_string())
            .or_default()
            .fill_missing(&incoming);
    }

    /// Merges a record from elsewhere (a persisted file) under `doi`.
    pub fn merge_record(&mut self, doi: &str, other: &DoiRecord) {
        self.records.entry(doi.to_string()).or_default().fill_missing(other);
    }

    #[must_use]
    pub fn get(&self, doi: &str) -> Option<&DoiRecord> {
        self.records.get(doi)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &DoiRecord)> {
        self.records.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::parser::extract_identifiers;

    #[test]
    fn test_identifier_index_set_semantics() {
        let mut index = IdentifierIndex::new();
        index.add("10.1/a", "/p1");
        index.add("10.1/a", "/p1");
        index.add("", "/p1");
        assert_eq!(index.len(), 1);
        assert_eq!(index.get("10.1/a").unwrap().len(), 1);
    }

    #[test]
    fn test_identifier_indexes_folding_twice_is_idempotent() {
        let ids = extract_identifiers("https://doi.org/10.1234/x PMID: 12345 PMCID: PMC77");
        let mut indexes = IdentifierIndexes::new();
        indexes.record(&ids, "/papers/a/notes.txt");
        indexes.record(&ids, "/papers/a/notes.txt");
        assert_eq!(indexes.dois.get("10.1234/x").unwrap().len(), 1);
        assert_eq!(indexes.pmids.get("12345").unwrap().len(), 1);
        assert_eq!(indexes.get(IdentifierKind::PmcId).get("PMC77").unwrap().len(), 1);
        assert_eq!(indexes.urls.len(), 1);
    }

    #[test]
    fn test_identifier_index_serializes_sorted_lists() {
        let mut index = IdentifierIndex::new();
        index.add("10.1/a", "/p2");
        index.add("10.1/a", "/p1");
        let json = serde_json::to_value(&index).unwrap();
        assert_eq!(json, serde_json::json!({"10.1/a": ["/p1", "/p2"]}));
    }

    #[test]
    fn test_doi_records_first_found_wins() {
        let first = BibMetadata {
            title: Some("First".into()),
            ..BibMetadata::default()
        };
        let second = BibMetadata {
            title: Some("Second".into()),
            year: Some("2020".into()),
            ..BibMetadata::default()
        };
        let mut records = DoiRecords::new();
        records.record("10.1/a", "/p1", Some(&first));
        records.record("10.1/a", "/p2", Some(&second));
        let rec = records.get("10.1/a").unwrap();
        assert_eq!(rec.title.as_deref(), Some("First"));
        assert_eq!(rec.year.as_deref(), Some("2020"));
        assert_eq!(rec.sources.len(), 2);
    }

    #[test]
    fn test_doi_records_bare_registration_and_blank_doi() {
        let mut records = DoiRecords::new();
        records.record("  10.1/b ", "/p1", None);
        records.record("   ", "/p1", None);
        assert_eq!(records.len(), 1);
        let rec = records.get("10.1/b").unwrap();
        assert_eq!(rec.title, None);
        assert!(rec.sources.contains("/p1"));
    }

    #[test]
    fn test_doi_record_persisted_merge_prefers_existing_non_empty() {
        let mut current = DoiRecord {
            title: None,
            year: Some("2021".into()),
            sources: BTreeSet::from(["/p2".to_string()]),
            ..DoiRecord::default()
        };
        let persisted = DoiRecord {
            title: Some("Old title".into()),
            year: Some("1999".into()),
            sources: BTreeSet::from(["/p1".to_string()]),
            ..DoiRecord::default()
        };
        current.fill_missing(&persisted);
        assert_eq!(current.title.as_deref(), Some("Old title"));
        assert_eq!(current.year.as_deref(), Some("2021"));
        assert_eq!(current.sources.iter().collect::<Vec<_>>(), vec!["/p1", "/p2"]);
    }

    #[test]
    fn test_doi_record_serializes_nulls_and_sorted_sources() {
        let mut records = DoiRecords::new();
        records.record("10.1/a", "/z", None);
        records.record("10.1/a", "/a", None);
        let json = serde_json::to_value(&records).unwrap();
        assert_eq!(json["10.1/a"]["title"], serde_json::Value::Null);
        assert_eq!(json["10.1/a"]["sources"], serde_json::json!(["/a", "/z"]));
    }
}
