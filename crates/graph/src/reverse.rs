use crate::types::{group_edges, RawEdge, ReverseLinkIndex};
use worldlink_inference::{Classification, FieldInference};
use worldlink_model::{ElementSnapshot, FieldValue};

/// Every element in `snapshot` that references `target_id`, grouped by
/// normalized field label.
///
/// Scans all fields of all other elements (O(elements x fields)); the target's
/// own fields are never considered, so self-references cannot appear.
#[must_use]
pub fn reverse_links_for(
    target_id: &str,
    snapshot: &ElementSnapshot,
    engine: &FieldInference,
) -> ReverseLinkIndex {
    let mut edges = Vec::new();

    for source in snapshot.iter() {
        if source.id == target_id {
            continue;
        }
        for (field_name, value) in &source.fields {
            if !mentions_id(value, target_id) {
                continue;
            }
            let classification =
                engine.classify_in(snapshot, field_name, value, Some(&source.category));
            let hit = match classification {
                Classification::Scalar => false,
                Classification::Single(_) => value.as_text().is_some_and(|v| v.trim() == target_id),
                Classification::Multi(_) => value.list_texts().any(|v| v.trim() == target_id),
            };
            if hit {
                edges.push(RawEdge {
                    field_name: field_name.as_str(),
                    source,
                });
            }
        }
    }

    log::debug!(
        "Reverse links for {target_id}: {} raw edges from {} elements",
        edges.len(),
        snapshot.len()
    );
    group_edges(target_id, &edges)
}

/// Cheap pre-check before classification
fn mentions_id(value: &FieldValue, id: &str) -> bool {
    match value {
        FieldValue::Text(text) => text.trim() == id,
        FieldValue::List(_) => value.list_texts().any(|v| v.trim() == id),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use worldlink_model::Element;

    #[test]
    fn test_mixed_list_is_not_a_link() {
        let engine = FieldInference::default();
        let snapshot = ElementSnapshot::new(vec![
            Element::new("c1", "Alice", "character"),
            Element::new("c2", "Bob", "character")
                .with_field("allies", FieldValue::texts(["c1", "the baker"]))
                .with_field("notes", FieldValue::text("met c1 at the market")),
        ])
        .unwrap();

        // a list holding free text is scalar, even if one member is an id
        let index = reverse_links_for("c1", &snapshot, &engine);
        assert!(index.is_empty());
    }

    #[test]
    fn test_unknown_target_is_empty() {
        let engine = FieldInference::default();
        let snapshot =
            ElementSnapshot::new(vec![Element::new("c1", "Alice", "character")]).unwrap();
        let index = reverse_links_for("missing", &snapshot, &engine);
        assert_eq!(index, ReverseLinkIndex::empty("missing"));
    }
}
