//! Local-time ISO-8601 formatting for file and folder timestamps.

use std::time::SystemTime;

use chrono::{DateTime, Local};

/// Formats a timestamp as local time with second precision, `2024-03-01T09:30:00`.
#[must_use]
pub fn format_iso_local(time: SystemTime) -> String {
    DateTime::<Local>::from(time)
        .format("%Y-%m-%dT%H:%M:%S")
        .to_string()
}

/// Same as [`format_iso_local`], but an unknown timestamp becomes an empty string.
#[must_use]
pub fn format_iso_or_empty(time: Option<SystemTime>) -> String {
    time.map(format_iso_local).unwrap_or_default()
}
