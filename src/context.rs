//! Run-scoped state threaded through every folder and document call.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::folder::FolderSummary;
use crate::index::{DoiRecords, IdentifierIndexes};
use crate::parser::doi_to_url;
use crate::registry::{DocumentRegistry, ParseBudget};

/// Links discovered for one folder and whether it already holds a PDF.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FolderLinks {
    pub folder: String,
    pub root: String,
    /// Declared URLs, then the DOI resolver URL when a DOI is known.
    pub urls: Vec<String>,
    pub has_pdf: bool,
    pub example_pdf: String,
}

impl FolderLinks {
    /// Builds the entry for a finished folder summary.
    #[must_use]
    pub fn from_summary(summary: &FolderSummary, urls: Vec<String>) -> Self {
        let mut urls = urls;
        if !summary.doi.is_empty() {
            urls.push(doi_to_url(&summary.doi));
        }
        Self {
            folder: summary.folder_name.clone(),
            root: summary.root_input_dir.clone(),
            urls,
            has_pdf: summary.num_pdfs > 0,
            example_pdf: summary.example_pdf.clone(),
        }
    }
}

/// Everything a scan mutates: registry, indexes, DOI records, budget and folder links.
///
/// Created empty (or seeded with a persisted registry) at the start of a run
/// and flushed to the output writers at the end.
#[derive(Debug, Clone)]
pub struct ScanContext {
    pub budget: ParseBudget,
    pub registry: DocumentRegistry,
    pub indexes: IdentifierIndexes,
    pub doi_records: DoiRecords,
    /// Folder path -> links, for every summary kept by the run.
    pub folder_links: BTreeMap<String, FolderLinks>,
}

impl ScanContext {
    #[must_use]
    pub fn new(budget: ParseBudget) -> Self {
        Self::with_registry(budget, DocumentRegistry::new())
    }

    /// Starts a run on top of a registry loaded from an earlier run.
    #[must_use]
    pub fn with_registry(budget: ParseBudget, registry: DocumentRegistry) -> Self {
        Self {
            budget,
            registry,
            indexes: IdentifierIndexes::new(),
            doi_records: DoiRecords::new(),
            folder_links: BTreeMap::new(),
        }
    }

    /// Records the links entry for a kept folder summary.
    pub fn record_folder_links(&mut self, summary: &FolderSummary, urls: Vec<String>) {
        self.folder_links.insert(
            summary.folder_path.clone(),
            FolderLinks::from_summary(summary, urls),
        );
    }
}
