//! Folder summarization: file inventory plus best-known paper metadata.
//!
//! Each candidate folder is walked twice. The counting walk tallies every
//! file regardless of the parse budget; the metadata walk reads documents
//! through the parse gate and stops early once the folder's core fields are
//! known.

mod document;
mod metadata;
mod walk;

pub use metadata::{FolderMetadata, extract_folder_metadata};
pub use walk::{SubdirOptions, iter_subdirs};

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::context::ScanContext;
use crate::registry::{DocumentInfo, DocumentKind, DocumentStatus, path_key};
use crate::timestamp::format_iso_or_empty;

/// Errors that drop a folder from the run's summaries.
#[derive(Debug, Error)]
pub enum FolderError {
    /// The folder could not be stat-ed (removed mid-run, permissions).
    #[error("cannot access folder '{path}': {source}")]
    Inaccessible {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// One row of the summary table. Unknown values are empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolderSummary {
    pub root_input_dir: String,
    pub folder_name: String,
    pub folder_path: String,
    pub is_symlink: bool,
    pub num_files_total: usize,
    pub num_dirs_total: usize,
    pub num_pdfs: usize,
    pub num_bibtex: usize,
    pub num_ris: usize,
    pub num_nbib: usize,
    pub num_json: usize,
    pub num_txt_md: usize,
    pub total_size_bytes: u64,
    pub folder_ctime_iso: String,
    pub folder_mtime_iso: String,
    pub earliest_file_mtime_iso: String,
    pub latest_file_mtime_iso: String,
    pub example_pdf: String,
    pub doi: String,
    pub title: String,
    pub authors: String,
    pub year: String,
    pub venue: String,
}

impl FolderSummary {
    /// Column names, in the order rows are written.
    pub const COLUMNS: [&'static str; 23] = [
        "root_input_dir",
        "folder_name",
        "folder_path",
        "is_symlink",
        "num_files_total",
        "num_dirs_total",
        "num_pdfs",
        "num_bibtex",
        "num_ris",
        "num_nbib",
        "num_json",
        "num_txt_md",
        "total_size_bytes",
        "folder_ctime_iso",
        "folder_mtime_iso",
        "earliest_file_mtime_iso",
        "latest_file_mtime_iso",
        "example_pdf",
        "doi",
        "title",
        "authors",
        "year",
        "venue",
    ];

    /// Sum of the per-kind counters; never exceeds `num_files_total`.
    #[must_use]
    pub fn recognized_files(&self) -> usize {
        self.num_pdfs + self.num_bibtex + self.num_ris + self.num_nbib + self.num_json + self.num_txt_md
    }
}

/// Summarizes one folder and returns it with the URLs its documents declared.
///
/// PDFs found by the counting walk are registered as seen (`parsed=false`,
/// `is_pdf`) unless the registry already has an entry for them.
///
/// # Errors
///
/// Returns [`FolderError::Inaccessible`] when the folder itself cannot be stat-ed.
#[tracing::instrument(level = "debug", skip_all, fields(folder = %folder.display()))]
pub fn summarize_folder(
    ctx: &mut ScanContext,
    root: &Path,
    folder: &Path,
) -> Result<(FolderSummary, Vec<String>), FolderError> {
    let folder_meta = fs::metadata(folder).map_err(|source| FolderError::Inaccessible {
        path: folder.display().to_string(),
        source,
    })?;
    let is_symlink = fs::symlink_metadata(folder).is_ok_and(|m| m.file_type().is_symlink());

    let tally = walk::tally_folder(folder);
    for pdf in &tally.pdfs {
        let seen = DocumentStatus::observe(pdf, folder, DocumentKind::Pdf)
            .with_info(DocumentInfo::pdf_seen());
        ctx.registry.record_if_absent(path_key(pdf), seen);
    }

    let FolderMetadata { best, urls } = extract_folder_metadata(ctx, folder);

    let summary = FolderSummary {
        root_input_dir: root.display().to_string(),
        folder_name: folder
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default(),
        folder_path: path_key(folder),
        is_symlink,
        num_files_total: tally.num_files_total,
        num_dirs_total: tally.num_dirs_total,
        num_pdfs: tally.num_pdfs,
        num_bibtex: tally.num_bibtex,
        num_ris: tally.num_ris,
        num_nbib: tally.num_nbib,
        num_json: tally.num_json,
        num_txt_md: tally.num_txt_md,
        total_size_bytes: tally.total_size_bytes,
        folder_ctime_iso: format_iso_or_empty(folder_meta.created().ok()),
        folder_mtime_iso: format_iso_or_empty(folder_meta.modified().ok()),
        earliest_file_mtime_iso: format_iso_or_empty(tally.earliest_mtime),
        latest_file_mtime_iso: format_iso_or_empty(tally.latest_mtime),
        example_pdf: tally
            .example_pdf
            .map(|p| p.display().to_string())
            .unwrap_or_default(),
        doi: best.doi.unwrap_or_default(),
        title: best.title.unwrap_or_default(),
        authors: best.authors.unwrap_or_default(),
        year: best.year.unwrap_or_default(),
        venue: best.venue.unwrap_or_default(),
    };

    info!(
        folder = %summary.folder_name,
        files = summary.num_files_total,
        pdfs = summary.num_pdfs,
        doi = %summary.doi,
        "Summarized folder"
    );
    Ok((summary, urls))
}
