use strsim::normalized_levenshtein;
use worldlink_model::{Category, Element, ElementId};

/// Case-folded, whitespace-collapsed form used for comparison
pub(crate) fn match_key(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

#[derive(Debug, Clone)]
pub(crate) struct IndexEntry {
    pub key: String,
    pub key_chars: usize,
    pub element_id: ElementId,
    pub element_name: String,
}

/// Approximate name index over the elements of one category
#[derive(Debug, Clone)]
pub(crate) struct CategoryIndex {
    pub category: Category,
    pub threshold: f32,
    entries: Vec<IndexEntry>,
}

impl CategoryIndex {
    pub fn new<'a>(
        category: Category,
        threshold: f32,
        elements: impl IntoIterator<Item = &'a Element>,
    ) -> Self {
        let mut entries: Vec<IndexEntry> = elements
            .into_iter()
            .filter_map(|element| {
                let key = match_key(&element.name);
                (!key.is_empty()).then(|| IndexEntry {
                    key_chars: key.chars().count(),
                    key,
                    element_id: element.id.clone(),
                    element_name: element.name.clone(),
                })
            })
            .collect();
        entries.sort_by(|a, b| {
            a.key_chars
                .cmp(&b.key_chars)
                .then_with(|| a.element_id.cmp(&b.element_id))
        });

        Self {
            category,
            threshold,
            entries,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries whose similarity to `key` reaches `floor`.
    ///
    /// Similarity is `1 - normalized Levenshtein distance`; names whose
    /// length alone rules out `floor` are skipped without computing it.
    pub fn query(&self, key: &str, floor: f32) -> Vec<(&IndexEntry, f32)> {
        let span_chars = key.chars().count();
        if span_chars == 0 {
            return Vec::new();
        }

        self.entries
            .iter()
            .filter(|entry| {
                let (short, long) = if entry.key_chars < span_chars {
                    (entry.key_chars, span_chars)
                } else {
                    (span_chars, entry.key_chars)
                };
                short as f32 / long as f32 >= floor
            })
            .filter_map(|entry| {
                let similarity = if entry.key == key {
                    1.0
                } else {
                    normalized_levenshtein(&entry.key, key) as f32
                };
                (similarity >= floor).then_some((entry, similarity))
            })
            .collect()
    }
}
