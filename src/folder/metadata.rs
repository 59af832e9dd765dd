//! Folder-level best metadata, merged first-found-wins across documents.

use std::collections::HashSet;
use std::path::Path;

use tracing::debug;

use super::document::{DocumentContent, process_document};
use super::walk::walk_entries;
use crate::context::ScanContext;
use crate::parser::{BibMetadata, find_doi};
use crate::registry::DocumentKind;

/// Best-known metadata for a folder and the URLs its documents declared.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FolderMetadata {
    /// Folder-level doi/title/authors/year/venue (`urls` is unused here).
    pub best: BibMetadata,
    /// Declared URLs from bibliographic fields and note files, deduplicated in order.
    pub urls: Vec<String>,
}

/// Walks every file under `folder`, gating and reading the known document kinds.
///
/// File names are checked for a DOI while the folder has none. Bibliographic
/// documents fill any empty field; note files only fill the DOI; binary
/// documents only feed the run-wide indexes. The walk stops right after the
/// document that completes doi, title, authors and year, so a later and
/// richer document in the same folder is never consulted.
pub fn extract_folder_metadata(ctx: &mut ScanContext, folder: &Path) -> FolderMetadata {
    let mut best = BibMetadata::default();
    let mut urls: Vec<String> = Vec::new();
    let mut seen_urls: HashSet<String> = HashSet::new();
    let mut collect = |found: &[String]| {
        for url in found {
            if !url.is_empty() && seen_urls.insert(url.clone()) {
                urls.push(url.clone());
            }
        }
    };

    for entry in walk_entries(folder).filter(|entry| !entry.is_dir) {
        let name = entry.file_name();
        if best.doi.is_none() {
            best.doi = find_doi(&name);
        }

        if let Some(kind) = DocumentKind::from_file_name(&name) {
            match process_document(ctx, &entry.path, folder, kind) {
                Some(DocumentContent::Bibliographic { meta, .. }) => {
                    best.fill_missing(&meta);
                    collect(&meta.urls);
                }
                Some(DocumentContent::Notes { doi, urls: found, .. }) => {
                    if best.doi.is_none() {
                        best.doi = doi;
                    }
                    collect(&found);
                }
                Some(DocumentContent::Binary { .. }) | None => {}
            }
        }

        if best.is_complete() {
            debug!(folder = %folder.display(), "Folder metadata complete, stopping walk");
            break;
        }
    }

    FolderMetadata { best, urls }
}
