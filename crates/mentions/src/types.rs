use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::ops::Range;
use worldlink_model::{Category, ElementId};

/// A text span judged likely to name a known element.
///
/// `start`/`end` are UTF-8 byte offsets on char boundaries;
/// `char_start`/`char_end` count Unicode scalar values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mention {
    /// Span text exactly as it appears in the scanned text
    pub text: String,
    pub start: usize,
    pub end: usize,
    pub char_start: usize,
    pub char_end: usize,

    /// Similarity in [0, 1], including any already-linked bonus
    pub confidence: f32,

    pub element_id: ElementId,
    pub element_name: String,
    pub category: Category,

    /// Candidate already referenced by the element or present as markup
    pub already_linked: bool,
}

impl Mention {
    #[must_use]
    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    #[must_use]
    pub fn overlaps(&self, other: &Mention) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// True when `text` still holds this mention's span unchanged
    #[must_use]
    pub fn matches_text(&self, text: &str) -> bool {
        text.get(self.start..self.end) == Some(self.text.as_str())
    }
}

/// Ids already linked from the element whose text is scanned
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LinkedIdSet(BTreeSet<ElementId>);

impl LinkedIdSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: impl Into<ElementId>) -> bool {
        self.0.insert(id.into())
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.0.contains(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ElementId> {
        self.0.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<ElementId>> FromIterator<S> for LinkedIdSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl<S: Into<ElementId>> Extend<S> for LinkedIdSet {
    fn extend<I: IntoIterator<Item = S>>(&mut self, iter: I) {
        self.0.extend(iter.into_iter().map(Into::into));
    }
}
