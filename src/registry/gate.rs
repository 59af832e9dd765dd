//! Run-wide parse budget and the per-document gate decision.

use std::fmt;

use tracing::trace;

use super::DocumentRegistry;

/// Why the gate refused to read a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Already marked parsed and the run skips parsed documents.
    AlreadyParsed,
    /// The run's parse budget is spent.
    Limit,
}

impl SkipReason {
    /// Returns the reason recorded in the registry.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AlreadyParsed => "skipped_already_parsed",
            Self::Limit => "skipped_by_limit",
        }
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Outcome of [`ParseBudget::check`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    Allow,
    Deny(SkipReason),
}

/// How many more documents this run may read, and whether parsed ones are skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseBudget {
    remaining: u64,
    skip_already_parsed: bool,
}

impl ParseBudget {
    /// Creates a budget of `remaining` documents.
    #[must_use]
    pub fn new(remaining: u64, skip_already_parsed: bool) -> Self {
        Self {
            remaining,
            skip_already_parsed,
        }
    }

    /// Decides whether the document at `path_key` may be read.
    ///
    /// The already-parsed check comes first, so a parsed document is reported
    /// as `skipped_already_parsed` even when the budget is also spent.
    #[must_use]
    pub fn check(&self, path_key: &str, registry: &DocumentRegistry) -> GateDecision {
        if self.skip_already_parsed && registry.is_parsed(path_key) {
            trace!(path = path_key, "Gate: already parsed");
            return GateDecision::Deny(SkipReason::AlreadyParsed);
        }
        if self.remaining == 0 {
            trace!(path = path_key, "Gate: budget exhausted");
            return GateDecision::Deny(SkipReason::Limit);
        }
        GateDecision::Allow
    }

    /// Spends one unit after a successful parse.
    pub fn consume(&mut self) {
        self.remaining = self.remaining.saturating_sub(1);
    }

    #[must_use]
    pub fn remaining(&self) -> u64 {
        self.remaining
    }

    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.remaining == 0
    }

    #[must_use]
    pub fn skip_already_parsed(&self) -> bool {
        self.skip_already_parsed
    }
}
