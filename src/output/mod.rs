//! Persisted artifacts: summary table, document registry, identifier indexes
//! and DOI records.
//!
//! Every JSON artifact is pretty-printed. In [`WriteMode::Append`] an existing
//! file is merged with the run's data; an unreadable or malformed file falls
//! back to overwrite with a warning. The CSV table is always overwritten.

mod merge;

use std::fmt;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::context::ScanContext;
use crate::folder::FolderSummary;
use crate::index::{DoiRecords, IdentifierIndex};
use crate::parser::IdentifierKind;
use crate::registry::DocumentRegistry;

pub const DEFAULT_SUMMARY_CSV: &str = "papers_summary.csv";
pub const DEFAULT_SUMMARY_JSON: &str = "papers_summary.json";
pub const DEFAULT_DOC_REGISTRY: &str = "doc_registry.json";
pub const DEFAULT_URL_INDEX: &str = "url_dict.json";
pub const DEFAULT_DOI_INDEX: &str = "doi_dict.json";
pub const DEFAULT_PMID_INDEX: &str = "pubmed_id_dict.json";
pub const DEFAULT_PMCID_INDEX: &str = "pmc_id_dict.json";

/// Errors raised while writing one artifact.
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("failed to write '{path}': {source}")]
    Write {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to encode CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("failed to encode JSON: {0}")]
    Encode(#[source] serde_json::Error),
}

impl OutputError {
    fn write(path: &Path, source: io::Error) -> Self {
        Self::Write {
            path: path.display().to_string(),
            source,
        }
    }
}

/// How an artifact treats a file left by an earlier run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WriteMode {
    #[default]
    Append,
    Overwrite,
}

impl WriteMode {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Append => "append",
            Self::Overwrite => "overwrite",
        }
    }
}

impl fmt::Display for WriteMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WriteMode {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "append" => Ok(Self::Append),
            "overwrite" => Ok(Self::Overwrite),
            other => Err(format!(
                "invalid write mode '{other}', expected \"append\" or \"overwrite\""
            )),
        }
    }
}

/// Summary table format echoed on stdout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StdoutFormat {
    Csv,
    Json,
    #[default]
    None,
}

/// Destination of every artifact; `None` disables it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutputPaths {
    pub summary_csv: Option<PathBuf>,
    pub summary_json: Option<PathBuf>,
    pub doc_registry: Option<PathBuf>,
    pub url_index: Option<PathBuf>,
    pub doi_index: Option<PathBuf>,
    pub pmid_index: Option<PathBuf>,
    pub pmcid_index: Option<PathBuf>,
}

impl OutputPaths {
    /// Every artifact under its default file name in `dir`.
    #[must_use]
    pub fn defaults_in(dir: &Path) -> Self {
        Self {
            summary_csv: Some(dir.join(DEFAULT_SUMMARY_CSV)),
            summary_json: Some(dir.join(DEFAULT_SUMMARY_JSON)),
            doc_registry: Some(dir.join(DEFAULT_DOC_REGISTRY)),
            url_index: Some(dir.join(DEFAULT_URL_INDEX)),
            doi_index: Some(dir.join(DEFAULT_DOI_INDEX)),
            pmid_index: Some(dir.join(DEFAULT_PMID_INDEX)),
            pmcid_index: Some(dir.join(DEFAULT_PMCID_INDEX)),
        }
    }

    /// Keeps explicitly set paths and fills the rest with defaults in `dir`.
    #[must_use]
    pub fn or_defaults_in(self, dir: &Path) -> Self {
        let defaults = Self::defaults_in(dir);
        Self {
            summary_csv: self.summary_csv.or(defaults.summary_csv),
            summary_json: self.summary_json.or(defaults.summary_json),
            doc_registry: self.doc_registry.or(defaults.doc_registry),
            url_index: self.url_index.or(defaults.url_index),
            doi_index: self.doi_index.or(defaults.doi_index),
            pmid_index: self.pmid_index.or(defaults.pmid_index),
            pmcid_index: self.pmcid_index.or(defaults.pmcid_index),
        }
    }

    /// Where the index for `kind` goes, if enabled.
    #[must_use]
    pub fn index(&self, kind: IdentifierKind) -> Option<&Path> {
        match kind {
            IdentifierKind::Url => self.url_index.as_deref(),
            IdentifierKind::Doi => self.doi_index.as_deref(),
            IdentifierKind::PubmedId => self.pmid_index.as_deref(),
            IdentifierKind::PmcId => self.pmcid_index.as_deref(),
        }
    }
}

/// `<stem>.records.json` beside the DOI index.
#[must_use]
pub fn doi_records_path(doi_index: &Path) -> PathBuf {
    let stem = doi_index
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    doi_index.with_file_name(format!("{stem}.records.json"))
}

/// Sorts rows by root, then case-insensitive folder name.
pub fn sort_summaries(summaries: &mut [FolderSummary]) {
    summaries.sort_by_cached_key(|s| (s.root_input_dir.clone(), s.folder_name.to_lowercase()));
}

/// Writes the header row and one row per summary.
///
/// # Errors
///
/// Returns [`OutputError::Csv`] when a row cannot be written.
pub fn write_summaries_csv<W: Write>(summaries: &[FolderSummary], writer: W) -> Result<(), OutputError> {
    let mut csv_writer = csv::WriterBuilder::new().has_headers(false).from_writer(writer);
    csv_writer.write_record(FolderSummary::COLUMNS)?;
    for summary in summaries {
        csv_writer.serialize(summary)?;
    }
    csv_writer.flush().map_err(csv::Error::from)?;
    Ok(())
}

/// Renders the summary table for stdout, or `None` when echo is disabled.
///
/// # Errors
///
/// Returns an [`OutputError`] when the rows cannot be encoded.
pub fn render_stdout(summaries: &[FolderSummary], format: StdoutFormat) -> Result<Option<String>, OutputError> {
    match format {
        StdoutFormat::None => Ok(None),
        StdoutFormat::Csv => {
            let mut buf = Vec::new();
            write_summaries_csv(summaries, &mut buf)?;
            Ok(Some(String::from_utf8_lossy(&buf).into_owned()))
        }
        StdoutFormat::Json => serde_json::to_string_pretty(summaries)
            .map(Some)
            .map_err(OutputError::Encode),
    }
}

/// Writes the summary table as CSV, always replacing the file.
///
/// # Errors
///
/// Returns an [`OutputError`] when the file cannot be created or written.
pub fn write_summary_csv(path: &Path, summaries: &[FolderSummary]) -> Result<(), OutputError> {
    let file = fs::File::create(path).map_err(|e| OutputError::write(path, e))?;
    write_summaries_csv(summaries, io::BufWriter::new(file))
}

/// Writes the summary table as a JSON array; append extends an existing array.
///
/// # Errors
///
/// Returns an [`OutputError`] when the rows cannot be encoded or written.
pub fn write_summary_json(path: &Path, summaries: &[FolderSummary], mode: WriteMode) -> Result<(), OutputError> {
    let rows = summaries
        .iter()
        .map(serde_json::to_value)
        .collect::<Result<Vec<_>, _>>()
        .map_err(OutputError::Encode)?;

    let merged = read_existing(path, mode).and_then(|old| {
        let merged = merge::merge_summary_rows(old, &rows);
        if merged.is_none() {
            warn_overwrite(path, "not a JSON array");
        }
        merged
    });
    write_json(path, &merged.unwrap_or(Value::Array(rows)))
}

/// Writes the document registry; append overlays new entries on old ones.
///
/// # Errors
///
/// Returns an [`OutputError`] when the registry cannot be encoded or written.
pub fn write_document_registry(path: &Path, registry: &DocumentRegistry, mode: WriteMode) -> Result<(), OutputError> {
    if let Some(old) = read_existing(path, mode) {
        match merge::merge_registry(old, registry)? {
            Some(merged) => return write_json(path, &merged),
            None => warn_overwrite(path, "not a JSON object"),
        }
    }
    write_json(path, registry)
}

/// Writes one identifier index; append unions path lists per identifier.
///
/// # Errors
///
/// Returns an [`OutputError`] when the index cannot be encoded or written.
pub fn write_identifier_index(path: &Path, index: &IdentifierIndex, mode: WriteMode) -> Result<(), OutputError> {
    if let Some(old) = read_existing(path, mode) {
        match merge::merge_identifier_index(old, index) {
            Some(merged) => return write_json(path, &merged),
            None => warn_overwrite(path, "not a JSON object"),
        }
    }
    write_json(path, index)
}

/// Writes the DOI records; append merges each DOI with `fill_missing`.
///
/// # Errors
///
/// Returns an [`OutputError`] when the records cannot be encoded or written.
pub fn write_doi_records(path: &Path, records: &DoiRecords, mode: WriteMode) -> Result<(), OutputError> {
    if let Some(old) = read_existing(path, mode) {
        match merge::merge_doi_records(old, records)? {
            Some(merged) => return write_json(path, &merged),
            None => warn_overwrite(path, "not a JSON object"),
        }
    }
    write_json(path, records)
}

/// Loads a registry written by an earlier run, if there is a usable one.
#[must_use]
pub fn load_document_registry(path: &Path) -> Option<DocumentRegistry> {
    let text = fs::read_to_string(path).ok()?;
    match DocumentRegistry::from_json_str(&text) {
        Ok(registry) => {
            info!(path = %path.display(), entries = registry.len(), "Loaded document registry");
            Some(registry)
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Ignoring unreadable document registry");
            None
        }
    }
}

/// Writes every enabled artifact, logging each outcome.
///
/// A failing artifact never stops the others. Returns how many failed.
pub fn write_outputs(
    paths: &OutputPaths,
    ctx: &ScanContext,
    summaries: &[FolderSummary],
    mode: WriteMode,
) -> usize {
    let mut failures = 0;
    let mut report = |artifact: &str, path: &Path, result: Result<(), OutputError>| match result {
        Ok(()) => info!(artifact, path = %path.display(), "Wrote output"),
        Err(e) => {
            error!(artifact, path = %path.display(), error = %e, "Failed to write output");
            failures += 1;
        }
    };

    if let Some(path) = &paths.summary_csv {
        report("summary CSV", path, write_summary_csv(path, summaries));
    }
    if let Some(path) = &paths.summary_json {
        report("summary JSON", path, write_summary_json(path, summaries, mode));
    }
    if let Some(path) = &paths.doc_registry {
        report("document registry", path, write_document_registry(path, &ctx.registry, mode));
    }
    for kind in IdentifierKind::ALL {
        if let Some(path) = paths.index(kind) {
            let artifact = format!("{kind} index");
            report(&artifact, path, write_identifier_index(path, ctx.indexes.get(kind), mode));
        }
    }
    if let Some(doi_index) = &paths.doi_index {
        let path = doi_records_path(doi_index);
        report("DOI records", &path, write_doi_records(&path, &ctx.doi_records, mode));
    }

    failures
}

fn read_existing(path: &Path, mode: WriteMode) -> Option<Value> {
    if mode == WriteMode::Overwrite || !path.exists() {
        return None;
    }
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) => {
            warn_overwrite(path, &e.to_string());
            return None;
        }
    };
    match serde_json::from_str(&text) {
        Ok(value) => Some(value),
        Err(e) => {
            warn_overwrite(path, &e.to_string());
            None
        }
    }
}

fn warn_overwrite(path: &Path, reason: &str) {
    warn!(path = %path.display(), reason, "Existing output unusable, overwriting");
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), OutputError> {
    let text = serde_json::to_string_pretty(value).map_err(OutputError::Encode)?;
    fs::write(path, text).map_err(|e| OutputError::write(path, e))
}
