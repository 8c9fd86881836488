use crate::config::DetectorConfig;
use crate::detector::MentionDetector;
use crate::error::Result;
use crate::types::{LinkedIdSet, Mention};
use sha2::{Digest, Sha256};
use std::fmt::Write;
use worldlink_model::ElementSnapshot;

/// Detector bound to one snapshot membership.
///
/// Indices only depend on which elements exist in which category under
/// which name, so [`Linker::refresh`] keeps them while that membership is
/// unchanged, however often field values change.
#[derive(Debug)]
pub struct Linker {
    detector: MentionDetector,
    fingerprint: String,
}

impl Linker {
    pub fn new(snapshot: &ElementSnapshot, config: DetectorConfig) -> Result<Self> {
        Ok(Self {
            detector: MentionDetector::from_snapshot(snapshot, config)?,
            fingerprint: membership_fingerprint(snapshot),
        })
    }

    #[must_use]
    pub fn detector(&self) -> &MentionDetector {
        &self.detector
    }

    #[must_use]
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    /// Rebuild indices if membership changed. Returns true when rebuilt.
    pub fn refresh(&mut self, snapshot: &ElementSnapshot) -> Result<bool> {
        let fingerprint = membership_fingerprint(snapshot);
        if fingerprint == self.fingerprint {
            log::debug!("Membership unchanged ({}), keeping indices", &fingerprint[..12]);
            return Ok(false);
        }

        self.detector = MentionDetector::from_snapshot(snapshot, self.detector.config().clone())?;
        self.fingerprint = fingerprint;
        Ok(true)
    }

    #[must_use]
    pub fn detect(&self, text: &str, linked: &LinkedIdSet) -> Vec<Mention> {
        self.detector.detect(text, linked)
    }

    #[must_use]
    pub fn detect_excluding(
        &self,
        text: &str,
        linked: &LinkedIdSet,
        self_id: &str,
    ) -> Vec<Mention> {
        self.detector.detect_excluding(text, linked, self_id)
    }
}

/// SHA-256 over the sorted (category, id, name) triples of a snapshot
#[must_use]
pub fn membership_fingerprint(snapshot: &ElementSnapshot) -> String {
    let mut members: Vec<(&str, &str, &str)> = snapshot
        .iter()
        .map(|e| (e.category.as_str(), e.id.as_str(), e.name.as_str()))
        .collect();
    members.sort_unstable();

    let mut hasher = Sha256::new();
    for (category, id, name) in members {
        for part in [category, id, name] {
            hasher.update(part.as_bytes());
            hasher.update([0u8]);
        }
        hasher.update(b"\n");
    }
    hex_encode_lower(&hasher.finalize())
}

fn hex_encode_lower(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len().saturating_mul(2));
    for b in bytes {
        let _ = write!(out, "{b:02x}");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use worldlink_model::{Element, FieldValue};

    fn snapshot(extra: Option<Element>) -> ElementSnapshot {
        let mut elements = vec![
            Element::new("l1", "Town Square", "location"),
            Element::new("c1", "Alice", "character"),
        ];
        elements.extend(extra);
        ElementSnapshot::new(elements).unwrap()
    }

    #[test]
    fn test_fingerprint_ignores_order_and_fields() {
        let a = snapshot(None);
        let b = ElementSnapshot::new(vec![
            Element::new("c1", "Alice", "character").with_field("age", FieldValue::text("31")),
            Element::new("l1", "Town Square", "location"),
        ])
        .unwrap();

        assert_eq!(membership_fingerprint(&a), membership_fingerprint(&b));
        assert_eq!(membership_fingerprint(&a).len(), 64);
    }

    #[test]
    fn test_refresh_rebuilds_only_on_membership_change() {
        let mut linker = Linker::new(&snapshot(None), DetectorConfig::default()).unwrap();
        assert!(!linker.refresh(&snapshot(None)).unwrap());

        let grown = snapshot(Some(Element::new("c2", "Bob", "character")));
        assert!(linker.refresh(&grown).unwrap());
        assert_eq!(linker.fingerprint(), membership_fingerprint(&grown));

        let found = linker.detect("Bob waved.", &LinkedIdSet::new());
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].element_id, "c2");
    }

    #[test]
    fn test_rename_changes_fingerprint() {
        let renamed = ElementSnapshot::new(vec![
            Element::new("l1", "Old Square", "location"),
            Element::new("c1", "Alice", "character"),
        ])
        .unwrap();
        assert_ne!(membership_fingerprint(&snapshot(None)), membership_fingerprint(&renamed));
    }
}
