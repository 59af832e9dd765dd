//! One document through the gate: read, fold into the context, record status.

use std::path::Path;

use tracing::{debug, warn};

use crate::context::ScanContext;
use crate::parser::{
    BibMetadata, Identifiers, ParseError, extract_docx_text, extract_identifiers,
    extract_pdf_text, find_doi, find_urls, parse_bibtex_metadata, parse_json_metadata,
    parse_ris_metadata, read_document_text,
};
use crate::registry::{
    DocumentInfo, DocumentKind, DocumentStatus, GateDecision, SkipReason, path_key,
};

/// What a successfully read document contributes to its folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum DocumentContent {
    /// `.bib`, `.ris`, `.nbib`, `.json`: structured fields plus the full-text scan.
    Bibliographic { meta: BibMetadata, ids: Identifiers },
    /// `.txt`, `.md`: first DOI and URLs, plus the full-text scan.
    Notes {
        doi: Option<String>,
        urls: Vec<String>,
        ids: Identifiers,
    },
    /// `.docx`, `.pdf`: only the full-text scan.
    Binary { ids: Identifiers },
}

impl DocumentContent {
    fn ids(&self) -> &Identifiers {
        match self {
            Self::Bibliographic { ids, .. } | Self::Notes { ids, .. } | Self::Binary { ids } => ids,
        }
    }

    fn info(&self, kind: DocumentKind) -> DocumentInfo {
        let scan = DocumentInfo::from_scan(self.ids());
        match self {
            Self::Bibliographic { meta, .. } => scan.with_metadata(meta, kind != DocumentKind::Bib),
            Self::Notes { doi, urls, .. } => DocumentInfo {
                found_doi: Some(doi.is_some()),
                urls_found: Some(urls.len()),
                ..scan
            },
            Self::Binary { .. } => DocumentInfo {
                is_pdf: (kind == DocumentKind::Pdf).then_some(true),
                ..scan
            },
        }
    }
}

/// Reads and scans one document according to its kind.
pub(crate) fn read_document(path: &Path, kind: DocumentKind) -> Result<DocumentContent, ParseError> {
    let content = match kind {
        DocumentKind::Bib | DocumentKind::Ris | DocumentKind::Nbib | DocumentKind::Json => {
            let text = read_document_text(path)?;
            let meta = match kind {
                DocumentKind::Bib => parse_bibtex_metadata(&text),
                DocumentKind::Json => parse_json_metadata(&text)?,
                _ => parse_ris_metadata(&text),
            };
            DocumentContent::Bibliographic {
                meta,
                ids: extract_identifiers(&text),
            }
        }
        DocumentKind::TxtMd => {
            let text = read_document_text(path)?;
            DocumentContent::Notes {
                doi: find_doi(&text),
                urls: find_urls(&text),
                ids: extract_identifiers(&text),
            }
        }
        DocumentKind::Docx => DocumentContent::Binary {
            ids: extract_identifiers(&extract_docx_text(path)?),
        },
        DocumentKind::Pdf => {
            let bytes = std::fs::read(path).map_err(|e| ParseError::read(path, &e))?;
            DocumentContent::Binary {
                ids: extract_identifiers(&extract_pdf_text(&bytes)),
            }
        }
    };
    Ok(content)
}

/// Runs one document through the parse gate.
///
/// Denials and failures are recorded in the registry and yield `None`; an
/// already-parsed document keeps its `parsed=true` entry. A successful read folds its identifiers and DOI records into the context,
/// records `parsed=true` and spends one unit of budget.
pub(crate) fn process_document(
    ctx: &mut ScanContext,
    path: &Path,
    folder: &Path,
    kind: DocumentKind,
) -> Option<DocumentContent> {
    let key = path_key(path);
    let status = DocumentStatus::observe(path, folder, kind);
    let pdf_info = || {
        if kind == DocumentKind::Pdf {
            DocumentInfo::pdf_seen()
        } else {
            DocumentInfo::default()
        }
    };

    if let GateDecision::Deny(reason) = ctx.budget.check(&key, &ctx.registry) {
        debug!(path = %key, kind = %kind, reason = %reason, "Document skipped");
        if reason != SkipReason::AlreadyParsed || !ctx.registry.note_skip(&key, reason) {
            ctx.registry.record(key, status.skipped(reason).with_info(pdf_info()));
        }
        return None;
    }

    match read_document(path, kind) {
        Ok(content) => {
            fold_content(ctx, &key, &content);
            let info = content.info(kind);
            ctx.registry.record(key.clone(), status.parsed(info));
            ctx.budget.consume();
            debug!(path = %key, kind = %kind, remaining = ctx.budget.remaining(), "Document parsed");
            Some(content)
        }
        Err(e) => {
            warn!(path = %key, kind = %kind, error = %e, "Document could not be parsed");
            ctx.registry.record(key, status.failed(&e).with_info(pdf_info()));
            None
        }
    }
}

fn fold_content(ctx: &mut ScanContext, key: &str, content: &DocumentContent) {
    ctx.indexes.record(content.ids(), key);

    match content {
        DocumentContent::Bibliographic { meta, ids } => {
            for url in &meta.urls {
                ctx.indexes.urls.add(url, key);
            }
            if let Some(doi) = &meta.doi {
                ctx.doi_records.record(doi, key, Some(meta));
            }
            for doi in ids.dois.iter().filter(|d| Some(*d) != meta.doi.as_ref()) {
                ctx.doi_records.record(doi, key, None);
            }
        }
        DocumentContent::Notes { ids, .. } | DocumentContent::Binary { ids } => {
            for doi in &ids.dois {
                ctx.doi_records.record(doi, key, None);
            }
        }
    }
}
