//! Collect Papers Core Library
//!
//! Scans directories of paper folders (one folder per paper, holding PDFs,
//! bibliography exports and notes) and produces a per-folder summary table
//! plus run-wide cross-reference indexes of the identifiers found inside
//! the documents.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`parser`] - Identifier extraction and bibliographic field parsing
//! - [`registry`] - Per-document parse gate and document status registry
//! - [`index`] - Identifier -> files indexes and DOI records
//! - [`context`] - Run-scoped state shared by every folder
//! - [`folder`] - Folder enumeration and summarization
//! - [`scan`] - Run driver over validated roots
//! - [`output`] - CSV/JSON writers with append-mode merging

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod context;
pub mod folder;
pub mod index;
pub mod output;
pub mod parser;
pub mod registry;
pub mod scan;
pub mod timestamp;

// Re-export commonly used types
pub use context::{FolderLinks, ScanContext};
pub use folder::{FolderError, FolderSummary, SubdirOptions, summarize_folder};
pub use index::{DoiRecord, DoiRecords, IdentifierIndex, IdentifierIndexes};
pub use output::{OutputError, OutputPaths, StdoutFormat, WriteMode, write_outputs};
pub use parser::{BibMetadata, IdentifierKind, Identifiers, ParseError, extract_identifiers};
pub use registry::{DocumentKind, DocumentRegistry, DocumentStatus, ParseBudget};
pub use scan::{NoProgress, ScanError, ScanObserver, ScanOptions, ScanReport, run_scan, validate_roots};
