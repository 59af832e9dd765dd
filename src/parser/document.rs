//! Raw text recovery from binary documents (word-processor archives and PDFs).
//!
//! Nothing here interprets bibliographic structure; the recovered text is fed
//! to [`extract_identifiers`](super::extract_identifiers) like any other text.

use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::sync::LazyLock;

use quick_xml::Reader;
use quick_xml::events::Event;
use regex::Regex;
use regex::bytes::Regex as BytesRegex;
use tracing::{debug, trace};

use super::error::ParseError;

/// Archive parts that carry body text, in reading order.
const DOCX_TEXT_PARTS: [&str; 5] = [
    "word/document.xml",
    "word/footnotes.xml",
    "word/endnotes.xml",
    "word/header1.xml",
    "word/footer1.xml",
];

#[allow(clippy::expect_used)]
static XML_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]+>").expect("XML tag regex is valid"));

/// Explicit link annotations, `/URI (https://...)`.
#[allow(clippy::expect_used)]
static PDF_URI: LazyLock<BytesRegex> = LazyLock::new(|| {
    BytesRegex::new(r"(?-u)/URI\s*\(([^)]+)\)").expect("PDF URI regex is valid")
});

/// Reads a text document, dropping bytes that are not valid UTF-8.
///
/// # Errors
///
/// Returns [`ParseError::Read`] when the file cannot be read.
pub fn read_document_text(path: &Path) -> Result<String, ParseError> {
    let bytes = std::fs::read(path).map_err(|e| ParseError::read(path, &e))?;
    Ok(decode_lossy(&bytes))
}

/// Concatenates the text nodes of the known `.docx` parts, one part per line.
///
/// Missing parts are skipped. A part that is not well-formed XML falls back to
/// tag stripping so its text still reaches the identifier scan.
///
/// # Errors
///
/// Returns [`ParseError::Read`] when the file cannot be opened and
/// [`ParseError::Archive`] when it is not a readable zip archive.
#[tracing::instrument(level = "debug", skip_all, fields(path = %path.display()))]
pub fn extract_docx_text(path: &Path) -> Result<String, ParseError> {
    let file = File::open(path).map_err(|e| ParseError::read(path, &e))?;
    let mut archive = zip::ZipArchive::new(file).map_err(ParseError::archive)?;

    let mut parts = Vec::new();
    for name in DOCX_TEXT_PARTS {
        let mut entry = match archive.by_name(name) {
            Ok(entry) => entry,
            Err(zip::result::ZipError::FileNotFound) => continue,
            Err(e) => return Err(ParseError::archive(e)),
        };
        let mut data = Vec::new();
        entry.read_to_end(&mut data).map_err(ParseError::archive)?;

        match xml_text(&data) {
            Ok(text) => parts.push(text),
            Err(e) => {
                debug!(part = name, error = %e, "Malformed XML part, stripping tags");
                parts.push(strip_tags(&data));
            }
        }
    }

    trace!(parts = parts.len(), "Recovered docx text");
    Ok(parts.join("\n"))
}

/// Decodes PDF bytes as text, dropping invalid UTF-8, and appends every
/// `/URI (...)` annotation target on its own line.
#[must_use]
pub fn extract_pdf_text(bytes: &[u8]) -> String {
    let mut text = decode_lossy(bytes);
    for caps in PDF_URI.captures_iter(bytes) {
        text.push('\n');
        text.push_str(&decode_lossy(&caps[1]));
    }
    text
}

fn decode_lossy(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).replace(char::REPLACEMENT_CHARACTER, "")
}

fn xml_text(data: &[u8]) -> Result<String, quick_xml::Error> {
    let mut reader = Reader::from_reader(data);
    let mut buf = Vec::new();
    let mut text = String::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Text(e) => text.push_str(&e.unescape()?),
            Event::CData(e) => text.push_str(&String::from_utf8_lossy(&e.into_inner())),
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    Ok(text)
}

fn strip_tags(data: &[u8]) -> String {
    let raw = String::from_utf8_lossy(data);
    XML_TAG.replace_all(&raw, " ").into_owned()
}
