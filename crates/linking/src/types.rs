use serde::Serialize;
use std::collections::BTreeMap;
use worldlink_model::{ElementId, FieldValue};

/// Field updates a session has not committed yet
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinkChangeSet {
    pub element_id: ElementId,
    pub text_field: String,
    /// Changed fields only, including the text field when rewritten
    pub fields: BTreeMap<String, FieldValue>,
}

impl LinkChangeSet {
    /// Rewritten text, if the text changed
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        self.fields.get(&self.text_field).and_then(FieldValue::as_text)
    }

    /// Changed fields other than the text field
    pub fn reference_fields(&self) -> impl Iterator<Item = (&String, &FieldValue)> {
        self.fields.iter().filter(|(name, _)| **name != self.text_field)
    }
}

/// Outcome of [`crate::LinkSession::commit`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CommitStatus {
    Committed,
    /// Persistence refused; fields and text restored to the last commit
    RolledBack,
    NothingToCommit,
}

/// What one `accept` changed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Accepted {
    /// Id appended to the conventional reference field
    pub appended: bool,
    /// Span rewritten into markup
    pub rewritten: bool,
}

/// Summary of one `link_all`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LinkAllReport {
    /// Ids newly appended, in id order
    pub appended: Vec<ElementId>,
    /// Ids that were already referenced
    pub already_linked: Vec<ElementId>,
    /// Ids not appended because their conventional field holds a plain value
    pub blocked: Vec<ElementId>,
    pub rewritten: usize,
    /// Spans left untouched (stale or overlapping a rewritten one)
    pub skipped: usize,
}

/// Rejected mention, remembered until the span text changes
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Suppression {
    pub start: usize,
    pub element_id: ElementId,
    pub span_text: String,
}
