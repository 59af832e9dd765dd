//! Append-mode merges between a persisted JSON artifact and this run's data.
//!
//! Each function takes the previously written document (already parsed) and
//! returns the value to write back. Shapes that do not match what the run
//! produces are dropped or kept verbatim as documented per artifact.

use serde_json::{Map, Value};

use crate::index::{DoiRecord, DoiRecords, IdentifierIndex};
use crate::registry::DocumentRegistry;

use super::OutputError;

/// Old summary array followed by the new rows.
///
/// Returns `None` when the old document is not an array, meaning the caller
/// should overwrite.
pub(crate) fn merge_summary_rows(existing: Value, rows: &[Value]) -> Option<Value> {
    let Value::Array(mut items) = existing else {
        return None;
    };
    items.extend(rows.iter().cloned());
    Some(Value::Array(items))
}

/// Old registry entries overlaid key by key with this run's entries.
///
/// Old entries are kept verbatim, whatever their shape.
pub(crate) fn merge_registry(
    existing: Value,
    registry: &DocumentRegistry,
) -> Result<Option<Value>, OutputError> {
    let Value::Object(mut map) = existing else {
        return Ok(None);
    };
    for (key, status) in registry.iter() {
        map.insert(key.clone(), serde_json::to_value(status).map_err(OutputError::Encode)?);
    }
    Ok(Some(Value::Object(map)))
}

/// Per-identifier union of old and new path lists, sorted.
///
/// Old values that are not lists of strings are ignored for that key.
pub(crate) fn merge_identifier_index(existing: Value, index: &IdentifierIndex) -> Option<IdentifierIndex> {
    let Value::Object(old) = existing else {
        return None;
    };
    let mut merged = index.clone();
    for (identifier, paths) in old {
        if let Value::Array(paths) = paths {
            merged.union_paths(&identifier, paths.iter().filter_map(Value::as_str));
        }
    }
    Some(merged)
}

/// Old DOI records merged into this run's with `fill_missing`.
///
/// New field values win; old values fill the gaps and sources are unioned.
/// Old records this run never touched are kept verbatim, even when they do
/// not read back as a [`DoiRecord`].
pub(crate) fn merge_doi_records(
    existing: Value,
    records: &DoiRecords,
) -> Result<Option<Value>, OutputError> {
    let Value::Object(old) = existing else {
        return Ok(None);
    };

    let mut merged = records.clone();
    let mut untouched = Map::new();
    for (doi, value) in old {
        let known = records.get(&doi).is_some();
        match serde_json::from_value::<DoiRecord>(value.clone()) {
            Ok(record) => merged.merge_record(&doi, &record),
            Err(_) if !known => {
                untouched.insert(doi, value);
            }
            Err(_) => {}
        }
    }

    let Value::Object(mut out) = serde_json::to_value(&merged).map_err(OutputError::Encode)? else {
        return Ok(None);
    };
    out.extend(untouched);
    Ok(Some(Value::Object(out)))
}
