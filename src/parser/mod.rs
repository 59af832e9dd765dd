//! Text parsing module for extracting identifiers and bibliographic metadata.
//!
//! Everything here is pattern matching over raw text: no network access and
//! no structural validation of the formats involved.
//!
//! # Current Support
//!
//! - HTTP/HTTPS URLs
//! - DOIs (bare `10.xxxx/...` and `doi.org/` links)
//! - PubMed IDs and PMC IDs (labels and NCBI links)
//! - BibTeX-like, RIS/NBIB-like and JSON-like metadata fields
//! - Raw text recovery from `.docx` archives and PDF bytes
//!
//! # Example
//!
//! ```
//! use collect_papers_core::parser::extract_identifiers;
//!
//! let ids = extract_identifiers("Read https://doi.org/10.1234/abc (PMID: 12345678)");
//! assert_eq!(ids.dois, vec!["10.1234/abc"]);
//! assert_eq!(ids.pmids, vec!["12345678"]);
//! ```

mod bibtex;
mod document;
mod doi;
mod error;
mod identifiers;
mod json;
mod metadata;
mod ris;
mod url;

pub use bibtex::parse_bibtex_metadata;
pub use document::{extract_docx_text, extract_pdf_text, read_document_text};
pub use doi::{doi_from_url, doi_to_url, find_doi, find_dois};
pub use error::ParseError;
pub use identifiers::{IdentifierKind, Identifiers, extract_identifiers};
pub use json::parse_json_metadata;
pub use metadata::BibMetadata;
pub(crate) use metadata::fill;
pub use ris::parse_ris_metadata;
pub use url::find_urls;
