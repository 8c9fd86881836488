use crate::config::DetectorConfig;
use crate::error::{MentionError, Result};
use crate::index::{match_key, CategoryIndex};
use crate::markup;
use crate::spans::{candidate_spans, NamePatterns, SpanRules};
use crate::types::{LinkedIdSet, Mention};
use std::cmp::Ordering;
use std::collections::BTreeSet;
use worldlink_model::{Category, Element, ElementSnapshot};

/// Scans free text for probable mentions of known elements.
///
/// Holds one approximate-match index per non-empty category plus the
/// exact-name patterns. Rebuild it whenever category membership changes
/// (see [`crate::Linker`]).
#[derive(Debug)]
pub struct MentionDetector {
    config: DetectorConfig,
    indices: Vec<CategoryIndex>,
    names: NamePatterns,
    rules: SpanRules,
}

impl MentionDetector {
    /// Build indices from a category to elements grouping
    pub fn new<'a, I>(groups: I, config: DetectorConfig) -> Result<Self>
    where
        I: IntoIterator<Item = (Category, Vec<&'a Element>)>,
    {
        config.validate().map_err(MentionError::invalid_config)?;

        let mut indices = Vec::new();
        let mut all_names = Vec::new();
        for (category, elements) in groups {
            let threshold = config.threshold_for(&category);
            let index = CategoryIndex::new(category, threshold, elements.iter().copied());
            if index.is_empty() {
                continue;
            }
            all_names.extend(elements.iter().map(|&e| e.name.as_str()));
            indices.push(index);
        }
        indices.sort_by(|a, b| a.category.cmp(&b.category));

        let names = NamePatterns::new(all_names, config.min_span_chars);
        let rules = SpanRules {
            min_span_chars: config.min_span_chars,
            max_run_words: config.max_run_words,
            ignored_words: config.ignored_words.iter().map(|w| w.to_lowercase()).collect(),
        };

        log::info!(
            "Built mention indices: {} categories, {} names, {} exact patterns",
            indices.len(),
            indices.iter().map(CategoryIndex::len).sum::<usize>(),
            names.len()
        );

        Ok(Self {
            config,
            indices,
            names,
            rules,
        })
    }

    /// Build indices over every element of a snapshot
    pub fn from_snapshot(snapshot: &ElementSnapshot, config: DetectorConfig) -> Result<Self> {
        Self::new(snapshot.group_by_category(), config)
    }

    #[must_use]
    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    /// Categories with at least one indexed name
    pub fn categories(&self) -> impl Iterator<Item = &Category> {
        self.indices.iter().map(|index| &index.category)
    }

    /// Mentions of known elements in `text`, ordered by start offset and
    /// never overlapping.
    #[must_use]
    pub fn detect(&self, text: &str, linked: &LinkedIdSet) -> Vec<Mention> {
        self.detect_filtered(text, linked, |_| true)
    }

    /// Like [`Self::detect`], dropping candidates that name `self_id`
    /// (the element whose text is being scanned).
    #[must_use]
    pub fn detect_excluding(
        &self,
        text: &str,
        linked: &LinkedIdSet,
        self_id: &str,
    ) -> Vec<Mention> {
        self.detect_filtered(text, linked, |id| id != self_id)
    }

    fn detect_filtered(
        &self,
        text: &str,
        linked: &LinkedIdSet,
        keep: impl Fn(&str) -> bool,
    ) -> Vec<Mention> {
        let markup_spans = markup::parse(text);
        let markup_ids: BTreeSet<&str> =
            markup_spans.iter().map(|m| m.element_id.as_str()).collect();
        let boost = self.config.linked_confidence_boost;

        let mut candidates = Vec::new();
        for span in candidate_spans(text, &markup_spans, &self.names, &self.rules) {
            let key = match_key(&text[span.clone()]);

            for index in &self.indices {
                let floor = (index.threshold - boost).max(0.0);
                for (entry, similarity) in index.query(&key, floor) {
                    if !keep(&entry.element_id) {
                        continue;
                    }
                    let already_linked = linked.contains(&entry.element_id)
                        || markup_ids.contains(entry.element_id.as_str());
                    let confidence = if already_linked {
                        (similarity + boost).min(1.0)
                    } else {
                        similarity
                    };
                    if confidence < index.threshold {
                        continue;
                    }

                    candidates.push(Mention {
                        text: text[span.clone()].to_string(),
                        start: span.start,
                        end: span.end,
                        char_start: 0,
                        char_end: 0,
                        confidence,
                        element_id: entry.element_id.clone(),
                        element_name: entry.element_name.clone(),
                        category: index.category.clone(),
                        already_linked,
                    });
                }
            }
        }

        let candidate_count = candidates.len();
        let mut mentions = resolve_overlaps(candidates);
        fill_char_offsets(text, &mut mentions);

        log::debug!(
            "Detected {} mentions from {} candidates in {} bytes",
            mentions.len(),
            candidate_count,
            text.len()
        );
        mentions
    }
}

fn by_preference(a: &Mention, b: &Mention) -> Ordering {
    b.confidence
        .total_cmp(&a.confidence)
        .then_with(|| b.len().cmp(&a.len()))
        .then_with(|| a.start.cmp(&b.start))
        .then_with(|| a.element_id.cmp(&b.element_id))
}

/// Greedily keep the best candidates whose ranges do not overlap an
/// already kept one, then order by position.
pub(crate) fn resolve_overlaps(mut candidates: Vec<Mention>) -> Vec<Mention> {
    candidates.sort_by(by_preference);

    let mut kept: Vec<Mention> = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        if kept.iter().all(|k| !k.overlaps(&candidate)) {
            kept.push(candidate);
        }
    }

    kept.sort_by(|a, b| a.start.cmp(&b.start));
    kept
}

/// Sets char offsets; `mentions` must be ordered by start.
fn fill_char_offsets(text: &str, mentions: &mut [Mention]) {
    let mut byte_pos = 0;
    let mut char_pos = 0;
    for mention in mentions {
        char_pos += text[byte_pos..mention.start].chars().count();
        mention.char_start = char_pos;
        mention.char_end = char_pos + mention.text.chars().count();
        byte_pos = mention.start;
    }
}
