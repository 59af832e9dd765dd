//! Bibliographic metadata shared by the format-specific extractors.

/// Best-effort bibliographic fields pulled from one document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BibMetadata {
    pub doi: Option<String>,
    pub title: Option<String>,
    pub authors: Option<String>,
    pub year: Option<String>,
    pub venue: Option<String>,
    /// URLs declared by the document's own fields (not a full-text scan).
    pub urls: Vec<String>,
}

impl BibMetadata {
    /// Fills every empty field from `other`, keeping values already present.
    ///
    /// This is the first-found-wins policy: once a field is set it is never
    /// replaced. URLs are not merged.
    pub fn fill_missing(&mut self, other: &Self) {
        fill(&mut self.doi, other.doi.as_deref());
        fill(&mut self.title, other.title.as_deref());
        fill(&mut self.authors, other.authors.as_deref());
        fill(&mut self.year, other.year.as_deref());
        fill(&mut self.venue, other.venue.as_deref());
    }

    /// True once doi, title, authors and year are all known (venue is optional).
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.doi.is_some() && self.title.is_some() && self.authors.is_some() && self.year.is_some()
    }
}

/// Sets `slot` to `value` when the slot is empty and the value is non-empty.
pub(crate) fn fill(slot: &mut Option<String>, value: Option<&str>) {
    let slot_empty = slot.as_deref().is_none_or(str::is_empty);
    if slot_empty
        && let Some(value) = value.filter(|v| !v.is_empty())
    {
        *slot = Some(value.to_string());
    }
}

/// Trims a captured field and drops it when nothing is left.
pub(crate) fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
