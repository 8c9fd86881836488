use std::sync::Arc;
use worldlink_inference::{
    BuiltinRegistry, CategoryRegistry, Classification, FieldInference, IdShape, NameHint,
};
use worldlink_model::{Category, FieldValue};

/// A fetched schema that knows one extra field and delegates the rest
struct FetchedSchema;

impl CategoryRegistry for FetchedSchema {
    fn hint_for_name(&self, normalized: &str) -> Option<NameHint> {
        match normalized {
            "starship" => Some(NameHint::single("vehicle")),
            other => BuiltinRegistry.hint_for_name(other),
        }
    }

    fn is_known_category(&self, name: &str) -> bool {
        name == "vehicle" || BuiltinRegistry.is_known_category(name)
    }

    fn is_plural_false_positive(&self, normalized: &str) -> bool {
        BuiltinRegistry.is_plural_false_positive(normalized)
    }

    fn relative_hint(&self, normalized: &str) -> Option<bool> {
        BuiltinRegistry.relative_hint(normalized)
    }

    fn qualifier_prefixes(&self) -> &[&str] {
        BuiltinRegistry.qualifier_prefixes()
    }

    fn reference_field_for(&self, category: &Category) -> String {
        format!("linked_{}", category.as_str())
    }
}

#[test]
fn replacing_the_registry_changes_names_not_shape_rules() {
    let engine = FieldInference::new(Arc::new(FetchedSchema), IdShape::default());

    assert_eq!(
        engine.classify_name("starshipId", None),
        Classification::Single(Some(Category::new("vehicle")))
    );
    assert_eq!(
        engine.classify_name("vehicles", None),
        Classification::Multi(Some(Category::new("vehicle")))
    );
    assert_eq!(
        engine.classify("starship", &FieldValue::text("The Argo"), None),
        Classification::Scalar
    );
    assert_eq!(
        engine.reference_field_for(&Category::new("vehicle")),
        "linked_vehicle"
    );
}

#[test]
fn shorter_id_shapes_are_configurable() {
    let engine = FieldInference::default().with_id_shape(IdShape {
        min_len: 6,
        ..IdShape::default()
    });

    assert_eq!(
        engine.classify("mentorId", &FieldValue::text("chr042"), None),
        Classification::Single(Some(Category::new("character")))
    );
    assert_eq!(
        FieldInference::default().classify("mentorId", &FieldValue::text("chr042"), None),
        Classification::Scalar
    );
}
