//! Metadata lookup in JSON exports (Crossref, Semantic Scholar, hand-written notes).

use serde_json::{Map, Value};

use super::doi::find_doi;
use super::error::ParseError;
use super::metadata::{BibMetadata, non_empty};

const DOI_KEYS: [&str; 1] = ["doi"];
const TITLE_KEYS: [&str; 2] = ["title", "paper_title"];
const YEAR_KEYS: [&str; 2] = ["year", "publicationYear"];
const VENUE_KEYS: [&str; 3] = ["journal", "venue", "journalName"];
const URL_KEYS: [&str; 3] = ["url", "pdf_url", "link"];

/// Looks up bibliographic fields in a JSON object.
///
/// Keys are matched case-insensitively against a list of aliases. A missing
/// DOI falls back to the first bare DOI in the raw text.
///
/// # Errors
///
/// Returns [`ParseError::InvalidJson`] when the text does not parse and
/// [`ParseError::JsonNotObject`] when the top-level value is not an object.
///
/// # Examples
///
/// ```
/// use collect_papers_core::parser::parse_json_metadata;
///
/// let meta = parse_json_metadata(r#"{"Title": "Foo", "authors": ["A", "B"]}"#).unwrap();
/// assert_eq!(meta.title.as_deref(), Some("Foo"));
/// assert_eq!(meta.authors.as_deref(), Some("A; B"));
/// ```
#[tracing::instrument(level = "trace", skip(text), fields(text_len = text.len()))]
pub fn parse_json_metadata(text: &str) -> Result<BibMetadata, ParseError> {
    let value: Value = serde_json::from_str(text).map_err(|e| ParseError::invalid_json(&e))?;
    let Value::Object(data) = value else {
        return Err(ParseError::JsonNotObject {
            found: value_kind(&value),
        });
    };

    Ok(BibMetadata {
        doi: lookup(&data, &DOI_KEYS).or_else(|| find_doi(text)),
        title: lookup(&data, &TITLE_KEYS),
        authors: data
            .get("authors")
            .filter(|v| is_truthy(v))
            .or_else(|| data.get("author"))
            .and_then(authors_value),
        year: lookup(&data, &YEAR_KEYS),
        venue: lookup(&data, &VENUE_KEYS),
        urls: collect_urls(&data),
    })
}

/// First alias (in alias order) whose key matches case-insensitively and holds
/// a non-empty string, a number or a list.
fn lookup(data: &Map<String, Value>, aliases: &[&str]) -> Option<String> {
    aliases.iter().find_map(|alias| {
        data.iter()
            .filter(|(key, _)| key.eq_ignore_ascii_case(alias))
            .find_map(|(_, value)| scalar_or_list(value))
    })
}

fn scalar_or_list(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => non_empty(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Array(items) => Some(items.iter().map(display_value).collect::<Vec<_>>().join("; ")),
        _ => None,
    }
}

fn authors_value(value: &Value) -> Option<String> {
    match value {
        Value::Array(items) => Some(
            items
                .iter()
                .map(|item| match item.get("name") {
                    Some(Value::String(name)) => name.clone(),
                    _ => display_value(item),
                })
                .collect::<Vec<_>>()
                .join("; "),
        ),
        Value::String(s) => non_empty(s),
        _ => None,
    }
}

fn collect_urls(data: &Map<String, Value>) -> Vec<String> {
    let mut urls = Vec::new();
    for key in URL_KEYS {
        match data.get(key) {
            Some(Value::String(s)) => urls.push(s.clone()),
            Some(Value::Array(items)) => urls.extend(items.iter().map(display_value)),
            _ => {}
        }
    }
    if let Some(Value::Array(links)) = data.get("links") {
        for link in links {
            let url = link
                .get("url")
                .filter(|v| is_truthy(v))
                .or_else(|| link.get("href"));
            if let Some(Value::String(s)) = url {
                urls.push(s.clone());
            }
        }
    }
    urls
}

/// Strings render bare; everything else renders as compact JSON.
fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
