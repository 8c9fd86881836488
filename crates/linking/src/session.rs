use crate::error::{LinkError, Result};
use crate::persistence::Persistence;
use crate::types::{Accepted, CommitStatus, LinkAllReport, LinkChangeSet, Suppression};
use std::collections::{BTreeMap, BTreeSet};
use worldlink_inference::{Classification, FieldInference};
use worldlink_mentions::{markup, LinkedIdSet, Mention, MentionDetector};
use worldlink_model::{Category, Element, ElementId, ElementSnapshot, FieldValue};

/// Ids already linked from `element`: its reference fields plus any markup
/// in its `text_field`.
///
/// Only the id shape counts as reference evidence here; use
/// [`linked_ids_in`] when short or hand-made ids are in play.
#[must_use]
pub fn linked_ids_for(
    engine: &FieldInference,
    element: &Element,
    text_field: &str,
) -> LinkedIdSet {
    with_markup(engine.referenced_ids(element), element, text_field)
}

/// Like [`linked_ids_for`], also treating any id present in `snapshot` as
/// a reference value
#[must_use]
pub fn linked_ids_in(
    engine: &FieldInference,
    snapshot: &ElementSnapshot,
    element: &Element,
    text_field: &str,
) -> LinkedIdSet {
    with_markup(engine.referenced_ids_in(snapshot, element), element, text_field)
}

fn with_markup(
    referenced: BTreeSet<ElementId>,
    element: &Element,
    text_field: &str,
) -> LinkedIdSet {
    let mut linked: LinkedIdSet = referenced.into_iter().collect();
    if let Some(text) = element.text_of(text_field) {
        linked.extend(markup::linked_ids(text));
    }
    linked
}

/// Result of appending one id to a reference field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Append {
    Added,
    AlreadyLinked,
    /// The conventional field holds a plain value
    Blocked,
}

fn check_text_field(element: &Element, field: &str) -> Result<()> {
    match element.field(field) {
        None => Err(LinkError::UnknownTextField {
            element_id: element.id.clone(),
            field: field.to_string(),
        }),
        Some(FieldValue::Text(_) | FieldValue::Null) => Ok(()),
        Some(_) => Err(LinkError::NotText {
            element_id: element.id.clone(),
            field: field.to_string(),
        }),
    }
}

/// Link editing over one element and one of its text fields.
///
/// Accepted mentions update a working copy; nothing reaches the store
/// until [`LinkSession::commit`], which saves reference fields and text
/// together or restores both.
pub struct LinkSession<'a> {
    engine: &'a FieldInference,
    snapshot: Option<&'a ElementSnapshot>,
    committed: Element,
    working: Element,
    text_field: String,
    suppressions: BTreeSet<Suppression>,
}

impl<'a> LinkSession<'a> {
    pub fn new(
        engine: &'a FieldInference,
        element: Element,
        text_field: impl Into<String>,
    ) -> Result<Self> {
        let text_field = text_field.into();
        check_text_field(&element, &text_field)?;

        Ok(Self {
            engine,
            snapshot: None,
            committed: element.clone(),
            working: element,
            text_field,
            suppressions: BTreeSet::new(),
        })
    }

    /// Also accept ids present in `snapshot` as reference values
    #[must_use]
    pub fn with_snapshot(mut self, snapshot: &'a ElementSnapshot) -> Self {
        self.snapshot = Some(snapshot);
        self
    }

    /// Working copy, uncommitted changes included
    #[must_use]
    pub fn element(&self) -> &Element {
        &self.working
    }

    #[must_use]
    pub fn text_field(&self) -> &str {
        &self.text_field
    }

    #[must_use]
    pub fn text(&self) -> &str {
        self.working.text_of(&self.text_field).unwrap_or_default()
    }

    /// Ids held by any reference field of the working copy
    #[must_use]
    pub fn referenced_ids(&self) -> BTreeSet<ElementId> {
        match self.snapshot {
            Some(snapshot) => self.engine.referenced_ids_in(snapshot, &self.working),
            None => self.engine.referenced_ids(&self.working),
        }
    }

    #[must_use]
    pub fn linked_ids(&self) -> LinkedIdSet {
        with_markup(self.referenced_ids(), &self.working, &self.text_field)
    }

    /// Mentions in the working text, without the element itself and
    /// without rejected ones
    #[must_use]
    pub fn detect(&self, detector: &MentionDetector) -> Vec<Mention> {
        let mentions = detector.detect_excluding(self.text(), &self.linked_ids(), &self.working.id);
        self.filter(mentions)
    }

    /// Link one mention: append its id to the conventional reference field
    /// unless already referenced, and optionally rewrite its span as markup.
    pub fn accept(&mut self, mention: &Mention, rewrite: bool) -> Accepted {
        if mention.element_id == self.working.id {
            log::debug!("Ignoring self mention of {}", mention.element_id);
            return Accepted::default();
        }

        let appended =
            self.append_reference(&mention.category, &mention.element_id) == Append::Added;
        let rewritten = rewrite && self.rewrite_span(mention);
        if rewritten {
            self.prune_suppressions();
        }
        Accepted {
            appended,
            rewritten,
        }
    }

    /// Suppress `mention` until the text at its position changes
    pub fn reject(&mut self, mention: &Mention) {
        self.suppressions.insert(Suppression {
            start: mention.start,
            element_id: mention.element_id.clone(),
            span_text: mention.text.clone(),
        });
    }

    #[must_use]
    pub fn is_suppressed(&self, mention: &Mention) -> bool {
        self.suppressions.iter().any(|s| {
            s.start == mention.start
                && s.element_id == mention.element_id
                && s.span_text == mention.text
        })
    }

    /// Drop rejected mentions
    #[must_use]
    pub fn filter(&self, mentions: Vec<Mention>) -> Vec<Mention> {
        mentions.into_iter().filter(|m| !self.is_suppressed(m)).collect()
    }

    pub fn suppressions(&self) -> impl Iterator<Item = &Suppression> {
        self.suppressions.iter()
    }

    /// Link every mention: each distinct id is appended at most once, then
    /// spans are rewritten from the end of the text backwards so earlier
    /// offsets stay valid.
    pub fn link_all(&mut self, mentions: &[Mention], rewrite: bool) -> LinkAllReport {
        let mut report = LinkAllReport::default();

        let mut by_id: BTreeMap<&str, &Mention> = BTreeMap::new();
        for mention in mentions {
            if mention.element_id == self.working.id {
                report.skipped += 1;
                continue;
            }
            by_id.entry(mention.element_id.as_str()).or_insert(mention);
        }

        for (&id, mention) in &by_id {
            match self.append_reference(&mention.category, id) {
                Append::Added => report.appended.push(id.to_string()),
                Append::AlreadyLinked => report.already_linked.push(id.to_string()),
                Append::Blocked => report.blocked.push(id.to_string()),
            }
        }

        if rewrite {
            let mut ordered: Vec<&Mention> = mentions
                .iter()
                .filter(|m| by_id.contains_key(m.element_id.as_str()))
                .collect();
            ordered.sort_by(|a, b| b.start.cmp(&a.start).then_with(|| b.end.cmp(&a.end)));

            let mut rewritten_from = usize::MAX;
            for mention in ordered {
                if mention.end > rewritten_from {
                    report.skipped += 1;
                    continue;
                }
                if self.rewrite_span(mention) {
                    report.rewritten += 1;
                    rewritten_from = mention.start;
                } else {
                    report.skipped += 1;
                }
            }
            self.prune_suppressions();
        }

        log::debug!(
            "Linked {} new ids ({} existing, {} blocked) on {}, {} spans rewritten",
            report.appended.len(),
            report.already_linked.len(),
            report.blocked.len(),
            self.working.id,
            report.rewritten
        );
        report
    }

    /// Changed fields since the last commit, if any
    #[must_use]
    pub fn pending(&self) -> Option<LinkChangeSet> {
        let fields: BTreeMap<String, FieldValue> = self
            .working
            .fields
            .iter()
            .filter(|(name, value)| self.committed.fields.get(*name) != Some(*value))
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect();

        (!fields.is_empty()).then(|| LinkChangeSet {
            element_id: self.working.id.clone(),
            text_field: self.text_field.clone(),
            fields,
        })
    }

    /// Save pending changes in one call; on refusal restore both the
    /// reference fields and the text.
    pub fn commit(&mut self, persistence: &mut dyn Persistence) -> CommitStatus {
        let Some(changes) = self.pending() else {
            return CommitStatus::NothingToCommit;
        };

        if persistence.save(&changes.element_id, &changes.fields) {
            log::info!(
                "Committed {} field(s) of {}",
                changes.fields.len(),
                changes.element_id
            );
            self.committed = self.working.clone();
            CommitStatus::Committed
        } else {
            log::warn!(
                "Persistence refused changes to {}, rolling back {} field(s)",
                changes.element_id,
                changes.fields.len()
            );
            self.working = self.committed.clone();
            CommitStatus::RolledBack
        }
    }

    /// Drop uncommitted changes
    pub fn discard(&mut self) {
        self.working = self.committed.clone();
    }

    /// Replace the session's element with a fresh copy from the store.
    /// Uncommitted changes are dropped; suppressions whose span changed
    /// are forgotten.
    pub fn rebase(&mut self, element: Element) -> Result<()> {
        if element.id != self.working.id {
            return Err(LinkError::ElementMismatch {
                expected: self.working.id.clone(),
                found: element.id,
            });
        }
        check_text_field(&element, &self.text_field)?;

        self.committed = element.clone();
        self.working = element;
        self.prune_suppressions();
        Ok(())
    }

    fn classify_field(&self, field: &str, value: &FieldValue) -> Classification {
        let category = Some(&self.working.category);
        match self.snapshot {
            Some(snapshot) => self.engine.classify_in(snapshot, field, value, category),
            None => self.engine.classify(field, value, category),
        }
    }

    /// Append `id` to the conventional field for `category`. A field that
    /// holds a plain value (number, free text, object) is left untouched so
    /// it never turns into a mixed list nothing recognises as references.
    fn append_reference(&mut self, category: &Category, id: &str) -> Append {
        if self.referenced_ids().contains(id) {
            return Append::AlreadyLinked;
        }

        let field = self.engine.reference_field_for(category);
        let current = self.working.fields.get(&field).cloned().unwrap_or_default();
        if current.holds_id(id) {
            return Append::AlreadyLinked;
        }

        let updated = if current.is_empty() {
            FieldValue::texts([id])
        } else {
            match (self.classify_field(&field, &current), current) {
                (Classification::Multi(_), FieldValue::List(mut items)) => {
                    items.push(FieldValue::text(id));
                    FieldValue::List(items)
                }
                (Classification::Single(_), existing) => {
                    FieldValue::List(vec![existing, FieldValue::text(id)])
                }
                (_, existing) => {
                    log::warn!(
                        "Not appending {id} to {field} of {}: holds plain value {existing:?}",
                        self.working.id
                    );
                    return Append::Blocked;
                }
            }
        };

        self.working.fields.insert(field.clone(), updated);
        log::debug!("Appended {id} to {field} of {}", self.working.id);
        Append::Added
    }

    fn rewrite_span(&mut self, mention: &Mention) -> bool {
        let text = self.text();
        if !mention.matches_text(text) {
            log::warn!(
                "Skipping stale mention {:?} at {}..{} in {}",
                mention.text,
                mention.start,
                mention.end,
                self.working.id
            );
            return false;
        }
        if markup::parse(text)
            .iter()
            .any(|m| m.overlaps(mention.start, mention.end))
        {
            log::debug!("Span {}..{} already inside markup", mention.start, mention.end);
            return false;
        }

        let rendered = markup::render(&mention.text, &mention.category, &mention.element_id);
        let mut updated = String::with_capacity(text.len() + rendered.len());
        updated.push_str(&text[..mention.start]);
        updated.push_str(&rendered);
        updated.push_str(&text[mention.end..]);

        self.working
            .fields
            .insert(self.text_field.clone(), FieldValue::Text(updated));
        true
    }

    fn prune_suppressions(&mut self) {
        let text = self.working.text_of(&self.text_field).unwrap_or_default();
        self.suppressions.retain(|s| {
            text.get(s.start..s.start + s.span_text.len()) == Some(s.span_text.as_str())
        });
    }
}
