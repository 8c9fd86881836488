use crate::classification::{Classification, FieldClassification};
use crate::id_shape::{IdEvidence, IdShape, SnapshotIds};
use crate::names::{singular_candidates, split_words, strip_reference_suffix, ReferenceSuffix};
use crate::registry::{BuiltinRegistry, CategoryRegistry, NameHint};
use std::collections::BTreeSet;
use std::sync::Arc;
use worldlink_model::{Category, Element, ElementId, ElementSnapshot, FieldValue};

/// Nested qualifier/last-word lookups stop here
const MAX_NAME_DEPTH: usize = 4;

/// Classifies element fields as scalar, single reference or multi reference.
///
/// Value shape is consulted first; the field name is only used to guess the
/// target category, or to classify fields whose value is empty.
#[derive(Clone)]
pub struct FieldInference {
    registry: Arc<dyn CategoryRegistry>,
    id_shape: IdShape,
}

impl Default for FieldInference {
    fn default() -> Self {
        Self::new(Arc::new(BuiltinRegistry), IdShape::default())
    }
}

impl std::fmt::Debug for FieldInference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldInference")
            .field("id_shape", &self.id_shape)
            .finish_non_exhaustive()
    }
}

impl FieldInference {
    pub fn new(registry: Arc<dyn CategoryRegistry>, id_shape: IdShape) -> Self {
        Self { registry, id_shape }
    }

    #[must_use]
    pub fn with_id_shape(mut self, id_shape: IdShape) -> Self {
        self.id_shape = id_shape;
        self
    }

    #[must_use]
    pub fn registry(&self) -> &dyn CategoryRegistry {
        self.registry.as_ref()
    }

    #[must_use]
    pub const fn id_shape(&self) -> &IdShape {
        &self.id_shape
    }

    /// Conventional field that holds links to elements of `category`
    #[must_use]
    pub fn reference_field_for(&self, category: &Category) -> String {
        self.registry.reference_field_for(category)
    }

    /// Classify a field using the id shape alone as value evidence
    #[must_use]
    pub fn classify(
        &self,
        field_name: &str,
        value: &FieldValue,
        owning_category: Option<&Category>,
    ) -> Classification {
        self.classify_with(&self.id_shape, field_name, value, owning_category)
    }

    /// Classify a field, also accepting any id present in `snapshot` as an id
    #[must_use]
    pub fn classify_in(
        &self,
        snapshot: &ElementSnapshot,
        field_name: &str,
        value: &FieldValue,
        owning_category: Option<&Category>,
    ) -> Classification {
        let evidence = SnapshotIds {
            shape: &self.id_shape,
            snapshot,
        };
        self.classify_with(&evidence, field_name, value, owning_category)
    }

    /// Classify a field with caller-supplied id evidence
    pub fn classify_with(
        &self,
        evidence: &dyn IdEvidence,
        field_name: &str,
        value: &FieldValue,
        owning_category: Option<&Category>,
    ) -> Classification {
        if value.is_empty() {
            let by_name = self.classify_name(field_name, owning_category);
            // an empty list still has list shape
            return match (value, by_name) {
                (FieldValue::List(_), Classification::Single(category)) => {
                    Classification::Multi(category)
                }
                (_, other) => other,
            };
        }

        match value {
            FieldValue::Text(text) => {
                if evidence.is_id(text.trim()) {
                    Classification::Single(self.name_category(field_name, owning_category))
                } else {
                    Classification::Scalar
                }
            }
            FieldValue::List(items) => {
                let all_ids = items
                    .iter()
                    .all(|item| item.as_text().is_some_and(|s| evidence.is_id(s.trim())));
                if all_ids {
                    Classification::Multi(self.name_category(field_name, owning_category))
                } else {
                    Classification::Scalar
                }
            }
            _ => Classification::Scalar,
        }
    }

    /// Name-only classification, used when the value carries no evidence
    #[must_use]
    pub fn classify_name(
        &self,
        field_name: &str,
        owning_category: Option<&Category>,
    ) -> Classification {
        let (stem, suffix) = strip_reference_suffix(field_name);
        let normalized = split_words(stem).join("_");
        if normalized.is_empty() {
            return Classification::Scalar;
        }

        let Some(hint) = self.lookup(&normalized, owning_category, 0) else {
            return Classification::Scalar;
        };

        let multi = match suffix {
            Some(ReferenceSuffix::Multi) => true,
            Some(ReferenceSuffix::Single) => false,
            None => hint.plural,
        };
        if multi {
            Classification::Multi(Some(hint.category))
        } else {
            Classification::Single(Some(hint.category))
        }
    }

    fn name_category(
        &self,
        field_name: &str,
        owning_category: Option<&Category>,
    ) -> Option<Category> {
        match self.classify_name(field_name, owning_category) {
            Classification::Scalar => None,
            Classification::Single(category) | Classification::Multi(category) => category,
        }
    }

    fn lookup(
        &self,
        normalized: &str,
        owning_category: Option<&Category>,
        depth: usize,
    ) -> Option<NameHint> {
        if depth > MAX_NAME_DEPTH || normalized.is_empty() {
            return None;
        }

        if let Some(hint) = self.registry.hint_for_name(normalized) {
            return Some(hint);
        }
        if self.registry.is_known_category(normalized) {
            return Some(NameHint::single(normalized));
        }
        let relative = self.registry.relative_hint(normalized);
        if let (Some(plural), Some(owner)) = (relative, owning_category) {
            return Some(NameHint {
                category: owner.clone(),
                plural,
            });
        }

        if !self.registry.is_plural_false_positive(normalized) {
            for singular in singular_candidates(normalized) {
                if let Some(hint) = self.registry.hint_for_name(&singular) {
                    return Some(NameHint::plural(hint.category));
                }
                if self.registry.is_known_category(&singular) {
                    return Some(NameHint::plural(singular.as_str()));
                }
            }
        }

        for prefix in self.registry.qualifier_prefixes() {
            if let Some(rest) = normalized.strip_prefix(prefix) {
                if let Some(hint) = self.lookup(rest, owning_category, depth + 1) {
                    return Some(hint);
                }
            }
        }

        // home_planet -> planet
        if let Some((_, last)) = normalized.rsplit_once('_') {
            return self.lookup(last, owning_category, depth + 1);
        }

        None
    }

    /// Classify every field of an element (ordered by field name)
    #[must_use]
    pub fn classify_element(&self, element: &Element) -> Vec<FieldClassification> {
        self.classify_fields(&self.id_shape, element)
    }

    /// Classify every field of an element against a snapshot
    #[must_use]
    pub fn classify_element_in(
        &self,
        snapshot: &ElementSnapshot,
        element: &Element,
    ) -> Vec<FieldClassification> {
        let evidence = SnapshotIds {
            shape: &self.id_shape,
            snapshot,
        };
        self.classify_fields(&evidence, element)
    }

    fn classify_fields(
        &self,
        evidence: &dyn IdEvidence,
        element: &Element,
    ) -> Vec<FieldClassification> {
        let classified: Vec<FieldClassification> = element
            .fields
            .iter()
            .map(|(name, value)| FieldClassification {
                field_name: name.clone(),
                classification: self.classify_with(evidence, name, value, Some(&element.category)),
            })
            .collect();

        log::trace!(
            "Classified {} fields of {} ({} references)",
            classified.len(),
            element.id,
            classified
                .iter()
                .filter(|c| c.classification.is_reference())
                .count()
        );
        classified
    }

    /// Every id held by the element's reference fields
    #[must_use]
    pub fn referenced_ids(&self, element: &Element) -> BTreeSet<ElementId> {
        self.collect_ids(&self.id_shape, element)
    }

    /// Every id held by the element's reference fields, judged against a snapshot
    #[must_use]
    pub fn referenced_ids_in(
        &self,
        snapshot: &ElementSnapshot,
        element: &Element,
    ) -> BTreeSet<ElementId> {
        let evidence = SnapshotIds {
            shape: &self.id_shape,
            snapshot,
        };
        self.collect_ids(&evidence, element)
    }

    fn collect_ids(&self, evidence: &dyn IdEvidence, element: &Element) -> BTreeSet<ElementId> {
        let mut ids = BTreeSet::new();
        for (name, value) in &element.fields {
            match self.classify_with(evidence, name, value, Some(&element.category)) {
                Classification::Scalar => {}
                Classification::Single(_) => {
                    if let Some(id) = value.as_text() {
                        ids.insert(id.trim().to_string());
                    }
                }
                Classification::Multi(_) => {
                    ids.extend(value.list_texts().map(|id| id.trim().to_string()));
                }
            }
        }
        ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const LOC_ID: &str = "loc7Qm2xK9pLa3Zt";
    const CHR_ID: &str = "chr4Hd8sN2vQe6Yb";

    fn cat(name: &str) -> Option<Category> {
        Some(Category::new(name))
    }

    #[test]
    fn test_empty_list_resolves_by_name() {
        let engine = FieldInference::default();
        assert_eq!(
            engine.classify("speciesIds", &FieldValue::List(vec![]), None),
            Classification::Multi(cat("species"))
        );
    }

    #[test]
    fn test_value_shape_overrides_name() {
        let engine = FieldInference::default();
        assert_eq!(
            engine.classify("birthplace", &FieldValue::text("Some City"), None),
            Classification::Scalar
        );
        assert_eq!(
            engine.classify("birthplace", &FieldValue::text(LOC_ID), None),
            Classification::Single(cat("location"))
        );
    }

    #[test]
    fn test_id_value_under_unknown_name() {
        let engine = FieldInference::default();
        assert_eq!(
            engine.classify("zorblax", &FieldValue::text(LOC_ID), None),
            Classification::Single(None)
        );
        assert_eq!(
            engine.classify("zorblax", &FieldValue::texts([LOC_ID, CHR_ID]), None),
            Classification::Multi(None)
        );
    }

    #[test]
    fn test_list_with_free_text_is_scalar() {
        let engine = FieldInference::default();
        assert_eq!(
            engine.classify("allies", &FieldValue::texts([CHR_ID, "the baker"]), None),
            Classification::Scalar
        );
        assert_eq!(
            engine.classify("tags", &FieldValue::texts(["brave", "tall"]), None),
            Classification::Scalar
        );
    }

    #[test]
    fn test_non_text_values_are_scalar() {
        let engine = FieldInference::default();
        let number = FieldValue::Number(serde_json::Number::from(7));
        assert_eq!(engine.classify("locationId", &number, None), Classification::Scalar);
        assert_eq!(
            engine.classify("locationId", &FieldValue::Bool(true), None),
            Classification::Scalar
        );
    }

    #[test]
    fn test_null_values_use_name_cardinality() {
        let engine = FieldInference::default();
        assert_eq!(
            engine.classify("locationId", &FieldValue::Null, None),
            Classification::Single(cat("location"))
        );
        assert_eq!(
            engine.classify("allies", &FieldValue::Null, None),
            Classification::Multi(cat("character"))
        );
        assert_eq!(
            engine.classify("description", &FieldValue::Null, None),
            Classification::Scalar
        );
        assert_eq!(
            engine.classify("locationId", &FieldValue::List(vec![]), None),
            Classification::Multi(cat("location"))
        );
    }

    #[test]
    fn test_name_heuristics() {
        let engine = FieldInference::default();
        let cases = [
            ("parent_location", Classification::Single(cat("location"))),
            ("parentLocationId", Classification::Single(cat("location"))),
            ("primaryFaction", Classification::Single(cat("faction"))),
            ("factions", Classification::Multi(cat("faction"))),
            ("territories", Classification::Multi(cat("location"))),
            ("homePlanet", Classification::Single(cat("location"))),
            ("knownLanguages", Classification::Multi(cat("language"))),
            ("magicSystemId", Classification::Single(cat("magic_system"))),
            ("ownerId", Classification::Single(cat("character"))),
            ("allyIds", Classification::Multi(cat("character"))),
            ("species", Classification::Single(cat("species"))),
            ("status", Classification::Scalar),
            ("orders", Classification::Scalar),
            ("notes", Classification::Scalar),
            ("fooId", Classification::Scalar),
        ];
        for (name, expected) in cases {
            assert_eq!(engine.classify_name(name, None), expected, "field name: {name}");
        }
    }

    #[test]
    fn test_relative_names_use_owning_category() {
        let engine = FieldInference::default();
        let location = Category::new("location");
        assert_eq!(
            engine.classify_name("parentId", Some(&location)),
            Classification::Single(cat("location"))
        );
        assert_eq!(
            engine.classify_name("children", Some(&location)),
            Classification::Multi(cat("location"))
        );
        assert_eq!(engine.classify_name("parent", None), Classification::Scalar);
    }

    #[test]
    fn test_classify_in_accepts_snapshot_ids() {
        let engine = FieldInference::default();
        let snapshot =
            ElementSnapshot::new(vec![Element::new("locA", "Town Square", "location")]).unwrap();

        assert_eq!(
            engine.classify("locationId", &FieldValue::text("locA"), None),
            Classification::Scalar
        );
        assert_eq!(
            engine.classify_in(&snapshot, "locationId", &FieldValue::text("locA"), None),
            Classification::Single(cat("location"))
        );
    }

    #[test]
    fn test_referenced_ids() {
        let engine = FieldInference::default();
        let element = Element::new(CHR_ID, "Alice", "character")
            .with_field("locationId", FieldValue::text(LOC_ID))
            .with_field("allyIds", FieldValue::texts(["ally0000000000001", "ally0000000000002"]))
            .with_field("biography", FieldValue::text("Born in Some City"));

        let ids: Vec<_> = engine.referenced_ids(&element).into_iter().collect();
        assert_eq!(ids, vec!["ally0000000000001", "ally0000000000002", LOC_ID]);
    }

    #[test]
    fn test_classify_element_is_ordered() {
        let engine = FieldInference::default();
        let element = Element::new(CHR_ID, "Alice", "character")
            .with_field("locationId", FieldValue::text(LOC_ID))
            .with_field("age", FieldValue::text("31"));

        let classified = engine.classify_element(&element);
        let names: Vec<_> = classified.iter().map(|c| c.field_name.as_str()).collect();
        assert_eq!(names, vec!["age", "locationId"]);
        assert_eq!(classified[0].classification, Classification::Scalar);
    }
}
