//! Error types for document extraction.

use thiserror::Error;

/// Errors that stop a single document from being parsed.
///
/// These never abort a run: callers record the message in the document
/// registry and move on to the next file.
#[derive(Debug, Clone, Error)]
pub enum ParseError {
    /// The file could not be read from disk.
    #[error("failed to read '{path}': {reason}")]
    Read {
        /// Path that failed
        path: String,
        /// Underlying IO message
        reason: String,
    },

    /// The document is not valid JSON.
    #[error("invalid JSON: {reason}")]
    InvalidJson {
        /// Parser message including line/column
        reason: String,
    },

    /// The JSON parsed but its top level is not an object.
    #[error("JSON document is not an object (found {found})")]
    JsonNotObject {
        /// Kind of the top-level value
        found: &'static str,
    },

    /// A word-processor archive could not be opened or read.
    #[error("unreadable document archive: {reason}")]
    Archive {
        /// Archive library message
        reason: String,
    },
}

impl ParseError {
    /// Creates a `Read` error from an IO failure.
    #[must_use]
    pub fn read(path: &std::path::Path, error: &std::io::Error) -> Self {
        Self::Read {
            path: path.display().to_string(),
            reason: error.to_string(),
        }
    }

    /// Creates an `InvalidJson` error from a `serde_json` failure.
    #[must_use]
    pub fn invalid_json(error: &serde_json::Error) -> Self {
        Self::InvalidJson {
            reason: error.to_string(),
        }
    }

    /// Creates an `Archive` error from any displayable archive failure.
    #[must_use]
    pub fn archive(error: impl std::fmt::Display) -> Self {
        Self::Archive {
            reason: error.to_string(),
        }
    }
}
