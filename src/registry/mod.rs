//! Per-document parse gate and the registry of what was seen, parsed or skipped.
//!
//! The registry is keyed by absolute file path. An entry is overwritten every
//! time its document is processed, so `parsed`/`error`/`info` always describe
//! the latest attempt. A document skipped as already parsed keeps its
//! `parsed=true` entry and only gains the skip reason.

mod gate;
mod status;

pub use gate::{GateDecision, ParseBudget, SkipReason};
pub use status::{DocumentInfo, DocumentKind, DocumentStatus};

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::fs;
use std::path::Path;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

/// Absolute, symlink-resolved path string used as a registry and index key.
///
/// Falls back to the path as given when it cannot be resolved.
#[must_use]
pub fn path_key(path: &Path) -> String {
    fs::canonicalize(path)
        .unwrap_or_else(|_| path.to_path_buf())
        .display()
        .to_string()
}

/// Path -> status for every document seen in the run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct DocumentRegistry {
    entries: BTreeMap<String, DocumentStatus>,
}

impl DocumentRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a registry from a persisted registry document.
    ///
    /// Entries that do not match the current status shape are dropped with a
    /// debug log; the persisted file itself is untouched.
    ///
    /// # Errors
    ///
    /// Returns the `serde_json` error when the text is not JSON at all.
    pub fn from_json_str(text: &str) -> Result<Self, serde_json::Error> {
        let value: Value = serde_json::from_str(text)?;
        let Value::Object(map) = value else {
            warn!("Persisted document registry is not a JSON object, ignoring it");
            return Ok(Self::default());
        };

        let mut entries = BTreeMap::new();
        for (key, entry) in map {
            match serde_json::from_value::<DocumentStatus>(entry) {
                Ok(status) => {
                    entries.insert(key, status);
                }
                Err(e) => debug!(path = %key, error = %e, "Ignoring unreadable registry entry"),
            }
        }
        Ok(Self { entries })
    }

    #[must_use]
    pub fn get(&self, path_key: &str) -> Option<&DocumentStatus> {
        self.entries.get(path_key)
    }

    /// True when the latest recorded attempt for the path succeeded.
    #[must_use]
    pub fn is_parsed(&self, path_key: &str) -> bool {
        self.entries.get(path_key).is_some_and(|status| status.parsed)
    }

    /// Stores the status, replacing any previous entry for the path.
    pub fn record(&mut self, path_key: String, status: DocumentStatus) {
        self.entries.insert(path_key, status);
    }

    /// Notes a skip reason on an existing entry, keeping its parse state and info.
    ///
    /// Returns false when the path has no entry.
    pub fn note_skip(&mut self, path_key: &str, reason: SkipReason) -> bool {
        match self.entries.get_mut(path_key) {
            Some(status) => {
                status.error = reason.as_str().to_string();
                true
            }
            None => false,
        }
    }

    /// Stores the status only when the path has no entry yet.
    ///
    /// Returns true when the entry was added.
    pub fn record_if_absent(&mut self, path_key: String, status: DocumentStatus) -> bool {
        match self.entries.entry(path_key) {
            Entry::Vacant(slot) => {
                slot.insert(status);
                true
            }
            Entry::Occupied(_) => false,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &DocumentStatus)> {
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

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn status(kind: DocumentKind) -> DocumentStatus {
        DocumentStatus::observe(Path::new("/p/doc"), Path::new("/p"), kind)
    }

    #[test]
    fn test_note_skip_keeps_parsed_state() {
        let mut registry = DocumentRegistry::new();
        let info = DocumentInfo {
            found_doi: Some(true),
            ..DocumentInfo::default()
        };
        registry.record("/p/doc".to_string(), status(DocumentKind::Bib).parsed(info));

        assert!(registry.note_skip("/p/doc", SkipReason::AlreadyParsed));
        let entry = registry.get("/p/doc").unwrap();
        assert!(entry.parsed);
        assert_eq!(entry.error, "skipped_already_parsed");
        assert_eq!(entry.info.found_doi, Some(true));

        assert!(!registry.note_skip("/p/other", SkipReason::AlreadyParsed));
        assert!(registry.get("/p/other").is_none());
    }

    #[test]
    fn test_record_replaces_previous_attempt() {
        let mut registry = DocumentRegistry::new();
        registry.record("/p/a.bib".into(), status(DocumentKind::Bib).skipped(SkipReason::Limit));
        registry.record("/p/a.bib".into(), status(DocumentKind::Bib).parsed(DocumentInfo::default()));
        assert_eq!(registry.len(), 1);
        assert!(registry.is_parsed("/p/a.bib"));
        assert_eq!(registry.get("/p/a.bib").unwrap().error, "");
    }

    #[test]
    fn test_record_if_absent_keeps_existing() {
        let mut registry = DocumentRegistry::new();
        registry.record("/p/a.pdf".into(), status(DocumentKind::Pdf).parsed(DocumentInfo::pdf_seen()));
        let added = registry.record_if_absent(
            "/p/a.pdf".into(),
            status(DocumentKind::Pdf).with_info(DocumentInfo::pdf_seen()),
        );
        assert!(!added);
        assert!(registry.is_parsed("/p/a.pdf"));
    }

    #[test]
    fn test_from_json_str_skips_bad_entries() {
        let text = r#"{
            "/p/a.bib": {"folder_path": "/p", "kind": "bib", "parsed": true, "error": "", "size_bytes": 10, "mtime_iso": "", "info": {}},
            "/p/b.bib": {"kind": "unknown-kind"}
        }"#;
        let registry = DocumentRegistry::from_json_str(text).unwrap();
        assert_eq!(registry.len(), 1);
        assert!(registry.is_parsed("/p/a.bib"));
    }

    #[test]
    fn test_from_json_str_non_object_is_empty() {
        let registry = DocumentRegistry::from_json_str("[1, 2]").unwrap();
        assert!(registry.is_empty());
    }

    #[test]
    fn test_from_json_str_rejects_garbage() {
        assert!(DocumentRegistry::from_json_str("{oops").is_err());
    }

    #[test]
    fn test_registry_serializes_as_plain_object() {
        let mut registry = DocumentRegistry::new();
        registry.record("/p/a.pdf".into(), status(DocumentKind::Pdf).with_info(DocumentInfo::pdf_seen()));
        let json = serde_json::to_value(&registry).unwrap();
        assert_eq!(json["/p/a.pdf"]["kind"], "pdf");
        assert_eq!(json["/p/a.pdf"]["info"]["is_pdf"], true);
    }

    #[test]
    fn test_path_key_canonicalizes_existing_paths() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("sub");
        std::fs::create_dir(&nested).unwrap();
        let dotted = nested.join("..").join("sub");
        assert_eq!(path_key(&dotted), path_key(&nested));
    }

    #[test]
    fn test_path_key_missing_path_is_verbatim() {
        assert_eq!(path_key(Path::new("/no/such/file.bib")), "/no/such/file.bib");
    }
}
