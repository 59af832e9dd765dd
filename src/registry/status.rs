//! Per-document status records kept in the [`DocumentRegistry`](super::DocumentRegistry).

use std::fmt;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::gate::SkipReason;
use super::path_key;
use crate::parser::{BibMetadata, Identifiers, ParseError};
use crate::timestamp::format_iso_or_empty;

/// Document kinds the metadata walk knows how to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    /// BibTeX-like `.bib`.
    Bib,
    /// RIS export. Older registries wrote the shared `ris_nbib` tag.
    #[serde(alias = "ris_nbib")]
    Ris,
    /// MEDLINE `.nbib` export.
    Nbib,
    /// JSON metadata.
    Json,
    /// Plain text or markdown notes.
    TxtMd,
    /// Word-processor archive.
    Docx,
    /// PDF.
    Pdf,
}

impl DocumentKind {
    /// Returns the registry tag.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bib => "bib",
            Self::Ris => "ris",
            Self::Nbib => "nbib",
            Self::Json => "json",
            Self::TxtMd => "txt_md",
            Self::Docx => "docx",
            Self::Pdf => "pdf",
        }
    }

    /// Classifies a file by its name suffix, case-insensitively.
    #[must_use]
    pub fn from_file_name(name: &str) -> Option<Self> {
        let lower = name.to_lowercase();
        let kind = if lower.ends_with(".bib") {
            Self::Bib
        } else if lower.ends_with(".ris") {
            Self::Ris
        } else if lower.ends_with(".nbib") {
            Self::Nbib
        } else if lower.ends_with(".json") {
            Self::Json
        } else if lower.ends_with(".txt") || lower.ends_with(".md") {
            Self::TxtMd
        } else if lower.ends_with(".docx") {
            Self::Docx
        } else if lower.ends_with(".pdf") {
            Self::Pdf
        } else {
            return None;
        };
        Some(kind)
    }

    /// Bibliographic kinds carry structured fields folded into DOI records.
    #[must_use]
    pub fn is_bibliographic(&self) -> bool {
        matches!(self, Self::Bib | Self::Ris | Self::Nbib | Self::Json)
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// What a parse found. Keys that do not apply to a kind are left out.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_pdf: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub found_doi: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub found_title: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub found_authors: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub found_year: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub found_venue: Option<bool>,
    /// URLs declared by the document's own fields.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub urls_found: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub urls_in_text: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dois_in_text: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pmids_in_text: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pmcids_in_text: Option<usize>,
}

impl DocumentInfo {
    /// Info for a PDF that was only counted, never read.
    #[must_use]
    pub fn pdf_seen() -> Self {
        Self {
            is_pdf: Some(true),
            ..Self::default()
        }
    }

    /// Counts of every identifier kind in a full-text scan.
    #[must_use]
    pub fn from_scan(ids: &Identifiers) -> Self {
        Self {
            urls_in_text: Some(ids.urls.len()),
            dois_in_text: Some(ids.dois.len()),
            pmids_in_text: Some(ids.pmids.len()),
            pmcids_in_text: Some(ids.pmcids.len()),
            ..Self::default()
        }
    }

    /// Adds the `found_*` flags and declared URL count of structured metadata.
    #[must_use]
    pub fn with_metadata(mut self, meta: &BibMetadata, include_venue: bool) -> Self {
        self.found_doi = Some(meta.doi.is_some());
        self.found_title = Some(meta.title.is_some());
        self.found_authors = Some(meta.authors.is_some());
        self.found_year = Some(meta.year.is_some());
        if include_venue {
            self.found_venue = Some(meta.venue.is_some());
        }
        self.urls_found = Some(meta.urls.len());
        self
    }
}

/// Registry entry for one document path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentStatus {
    /// Folder being summarized when the document was seen.
    pub folder_path: String,
    pub kind: DocumentKind,
    pub parsed: bool,
    /// Error text or skip reason; empty when none.
    #[serde(default)]
    pub error: String,
    #[serde(default)]
    pub size_bytes: Option<u64>,
    #[serde(default)]
    pub mtime_iso: String,
    #[serde(default)]
    pub info: DocumentInfo,
}

impl DocumentStatus {
    /// Starts an unparsed entry, capturing size and mtime when the file can be stat-ed.
    #[must_use]
    pub fn observe(path: &Path, folder: &Path, kind: DocumentKind) -> Self {
        let metadata = fs::metadata(path).ok();
        Self {
            folder_path: path_key(folder),
            kind,
            parsed: false,
            error: String::new(),
            size_bytes: metadata.as_ref().map(fs::Metadata::len),
            mtime_iso: format_iso_or_empty(metadata.and_then(|m| m.modified().ok())),
            info: DocumentInfo::default(),
        }
    }

    /// Marks the entry as denied by the parse gate.
    #[must_use]
    pub fn skipped(mut self, reason: SkipReason) -> Self {
        self.parsed = false;
        self.error = reason.as_str().to_string();
        self
    }

    /// Marks the entry as successfully parsed.
    #[must_use]
    pub fn parsed(mut self, info: DocumentInfo) -> Self {
        self.parsed = true;
        self.error.clear();
        self.info = info;
        self
    }

    /// Marks the entry as failed with the extraction error.
    #[must_use]
    pub fn failed(mut self, error: &ParseError) -> Self {
        self.parsed = false;
        self.error = error.to_string();
        self
    }

    /// Replaces the info summary.
    #[must_use]
    pub fn with_info(mut self, info: DocumentInfo) -> Self {
        self.info = info;
        self
    }
}
