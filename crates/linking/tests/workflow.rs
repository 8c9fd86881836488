use pretty_assertions::assert_eq;
use std::collections::BTreeMap;
use worldlink_inference::FieldInference;
use serde_json::json;
use worldlink_graph::reverse_links_for;
use worldlink_linking::{linked_ids_for, linked_ids_in, CommitStatus, LinkSession, Persistence};
use worldlink_mentions::{markup, DetectorConfig, MentionDetector};
use worldlink_model::{Element, ElementSnapshot, FieldValue};

const TEXT: &str = "Bob waved at the harbor. Later Bob left.";

fn world(description: &str) -> ElementSnapshot {
    ElementSnapshot::new(vec![
        Element::new("c1", "Alice", "character")
            .with_field("description", FieldValue::text(description)),
        Element::new("c2", "Bob", "character"),
        Element::new("l1", "Town Square", "location"),
    ])
    .unwrap()
}

struct RefusingStore {
    calls: usize,
}

impl Persistence for RefusingStore {
    fn save(&mut self, _element_id: &str, _partial_fields: &BTreeMap<String, FieldValue>) -> bool {
        self.calls += 1;
        false
    }
}

#[test]
fn link_all_appends_once_and_rewrites_every_occurrence() {
    let mut snapshot = world(TEXT);
    let engine = FieldInference::default();
    let detector = MentionDetector::from_snapshot(&snapshot, DetectorConfig::default()).unwrap();

    let element = snapshot.get("c1").unwrap().clone();
    let mut session = LinkSession::new(&engine, element, "description").unwrap();

    let mentions = session.detect(&detector);
    assert_eq!(mentions.len(), 2);

    let report = session.link_all(&mentions, true);
    assert_eq!(report.appended, vec!["c2".to_string()]);
    assert_eq!(report.rewritten, 2);
    assert_eq!(report.skipped, 0);

    let changes = session.pending().expect("pending changes");
    assert_eq!(
        changes.text(),
        Some("@[Bob](character:c2) waved at the harbor. Later @[Bob](character:c2) left.")
    );
    assert_eq!(changes.fields["characterIds"], FieldValue::texts(["c2"]));

    assert_eq!(session.commit(&mut snapshot), CommitStatus::Committed);
    assert!(session.pending().is_none());

    let saved = snapshot.get("c1").unwrap();
    assert_eq!(saved.field("characterIds"), Some(&FieldValue::texts(["c2"])));
    assert!(session.detect(&detector).is_empty());
    let linked: Vec<_> = linked_ids_for(&engine, saved, "description").iter().cloned().collect();
    assert_eq!(linked, vec!["c2"]);
}

#[test]
fn link_all_is_idempotent() {
    let snapshot = world(TEXT);
    let engine = FieldInference::default();
    let detector = MentionDetector::from_snapshot(&snapshot, DetectorConfig::default()).unwrap();
    let mut session =
        LinkSession::new(&engine, snapshot.get("c1").unwrap().clone(), "description").unwrap();

    let mentions = session.detect(&detector);
    session.link_all(&mentions, false);
    let again = session.link_all(&mentions, false);

    assert!(again.appended.is_empty());
    assert_eq!(session.element().field("characterIds"), Some(&FieldValue::texts(["c2"])));
}

#[test]
fn failed_commit_restores_fields_and_text() {
    let snapshot = world(TEXT);
    let engine = FieldInference::default();
    let detector = MentionDetector::from_snapshot(&snapshot, DetectorConfig::default()).unwrap();
    let original = snapshot.get("c1").unwrap().clone();
    let mut session = LinkSession::new(&engine, original.clone(), "description").unwrap();

    let mentions = session.detect(&detector);
    session.link_all(&mentions, true);
    assert_ne!(session.text(), TEXT);

    let mut store = RefusingStore { calls: 0 };
    assert_eq!(session.commit(&mut store), CommitStatus::RolledBack);
    assert_eq!(store.calls, 1);

    assert_eq!(session.element(), &original);
    assert_eq!(session.text(), TEXT);
    assert!(session.pending().is_none());
    assert_eq!(session.commit(&mut store), CommitStatus::NothingToCommit);
    assert_eq!(store.calls, 1);
}

#[test]
fn rejected_mentions_stay_hidden_until_text_changes() {
    let snapshot = world(TEXT);
    let engine = FieldInference::default();
    let detector = MentionDetector::from_snapshot(&snapshot, DetectorConfig::default()).unwrap();
    let mut session =
        LinkSession::new(&engine, snapshot.get("c1").unwrap().clone(), "description").unwrap();

    let mentions = session.detect(&detector);
    session.reject(&mentions[0]);
    let remaining = session.detect(&detector);
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].start, TEXT.rfind("Bob").unwrap());

    let edited = snapshot
        .get("c1")
        .unwrap()
        .clone()
        .with_field("description", FieldValue::text("Old Bob waved."));
    session.rebase(edited).unwrap();
    assert_eq!(session.detect(&detector).len(), 1);
    assert_eq!(session.suppressions().count(), 0);
}

#[test]
fn existing_reference_in_any_field_counts_as_linked() {
    let snapshot = ElementSnapshot::new(vec![
        Element::new("c1", "Alice", "character")
            .with_field("description", FieldValue::text("Bob waved."))
            .with_field("allyIds", FieldValue::texts(["c2"])),
        Element::new("c2", "Bob", "character"),
    ])
    .unwrap();
    let engine = FieldInference::default();
    let detector = MentionDetector::from_snapshot(&snapshot, DetectorConfig::default()).unwrap();
    let mut session = LinkSession::new(&engine, snapshot.get("c1").unwrap().clone(), "description")
        .unwrap()
        .with_snapshot(&snapshot);

    let mentions = session.detect(&detector);
    assert_eq!(mentions.len(), 1);
    assert!(mentions[0].already_linked);

    let report = session.link_all(&mentions, false);
    assert_eq!(report.already_linked, vec!["c2".to_string()]);
    assert!(session.element().field("characterIds").is_none());
}

#[test]
fn rewritten_markup_is_recognised_on_the_next_pass() {
    let cases = [("Lieu Célèbre", "p1"), ("location", "p 1"), ("location", "p(1)")];
    for (category, id) in cases {
        let snapshot = ElementSnapshot::new(vec![
            Element::new("c1", "Alice", "character")
                .with_field("description", FieldValue::text("Paris glows.")),
            Element::new(id, "Paris", category),
        ])
        .unwrap();
        let engine = FieldInference::default();
        let detector =
            MentionDetector::from_snapshot(&snapshot, DetectorConfig::default()).unwrap();
        let mut session =
            LinkSession::new(&engine, snapshot.get("c1").unwrap().clone(), "description")
                .unwrap()
                .with_snapshot(&snapshot);

        let first = session.detect(&detector);
        assert_eq!(first.len(), 1, "{category}/{id}");
        assert_eq!(session.link_all(&first, true).rewritten, 1);
        let once = session.text().to_string();

        assert!(session.detect(&detector).is_empty(), "{once}");
        let second = session.detect(&detector);
        let report = session.link_all(&second, true);
        assert_eq!(report.rewritten, 0);
        assert_eq!(session.text(), once);
        assert_eq!(markup::plain_text(&once), "Paris glows.");
        assert!(markup::linked_ids(&once).contains(id), "{once}");
    }
}

#[test]
fn appended_reference_is_visible_to_reverse_links() {
    let mut snapshot = ElementSnapshot::new(vec![
        Element::new("c1", "Alice", "character")
            .with_field("description", FieldValue::text("Bob waved."))
            .with_field("characterIds", FieldValue::text("c9")),
        Element::new("c2", "Bob", "character"),
        Element::new("c9", "Nine", "character"),
    ])
    .unwrap();
    let known = snapshot.clone();
    let engine = FieldInference::default();
    let detector = MentionDetector::from_snapshot(&known, DetectorConfig::default()).unwrap();
    let mut session = LinkSession::new(&engine, known.get("c1").unwrap().clone(), "description")
        .unwrap()
        .with_snapshot(&known);

    let mentions = session.detect(&detector);
    let report = session.link_all(&mentions, false);
    assert_eq!(report.appended, vec!["c2".to_string()]);
    assert_eq!(session.commit(&mut snapshot), CommitStatus::Committed);

    assert_eq!(
        snapshot.get("c1").unwrap().field("characterIds"),
        Some(&FieldValue::texts(["c9", "c2"]))
    );
    let reverse = reverse_links_for("c2", &snapshot, &engine);
    assert_eq!(reverse.source_ids(), vec!["c1"]);
}

#[test]
fn plain_value_field_blocks_append_but_markup_still_links() {
    let mut snapshot = ElementSnapshot::new(vec![
        Element::new("c1", "Alice", "character")
            .with_field("description", FieldValue::text("Bob waved."))
            .with_field("characterIds", FieldValue::Number(7.into())),
        Element::new("c2", "Bob", "character"),
    ])
    .unwrap();
    let known = snapshot.clone();
    let engine = FieldInference::default();
    let detector = MentionDetector::from_snapshot(&known, DetectorConfig::default()).unwrap();
    let mut session = LinkSession::new(&engine, known.get("c1").unwrap().clone(), "description")
        .unwrap()
        .with_snapshot(&known);

    let mentions = session.detect(&detector);
    let report = session.link_all(&mentions, true);
    assert!(report.appended.is_empty());
    assert_eq!(report.blocked, vec!["c2".to_string()]);
    assert_eq!(report.rewritten, 1);
    assert_eq!(session.commit(&mut snapshot), CommitStatus::Committed);

    let saved = snapshot.get("c1").unwrap();
    assert_eq!(saved.field("characterIds"), Some(&FieldValue::Number(7.into())));
    assert!(reverse_links_for("c2", &snapshot, &engine).is_empty());
    assert!(linked_ids_in(&engine, &snapshot, saved, "description").contains("c2"));
}

#[test]
fn link_report_and_changes_serialize_as_plain_json() {
    let snapshot = world(TEXT);
    let engine = FieldInference::default();
    let detector = MentionDetector::from_snapshot(&snapshot, DetectorConfig::default()).unwrap();
    let mut session =
        LinkSession::new(&engine, snapshot.get("c1").unwrap().clone(), "description").unwrap();

    let mentions = session.detect(&detector);
    let report = session.link_all(&mentions, false);
    assert_eq!(
        serde_json::to_value(&report).unwrap(),
        json!({
            "appended": ["c2"],
            "already_linked": [],
            "blocked": [],
            "rewritten": 0,
            "skipped": 0
        })
    );

    let changes = session.pending().unwrap();
    assert_eq!(
        serde_json::to_value(&changes).unwrap(),
        json!({
            "element_id": "c1",
            "text_field": "description",
            "fields": {"characterIds": ["c2"]}
        })
    );
}
