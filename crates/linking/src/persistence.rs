use std::collections::BTreeMap;
use worldlink_model::{ElementSnapshot, FieldValue};

/// Destination for committed link changes.
///
/// `save` receives only the fields that changed (the text field included)
/// and reports success; `false` makes the session roll back.
pub trait Persistence {
    fn save(&mut self, element_id: &str, partial_fields: &BTreeMap<String, FieldValue>) -> bool;
}

/// Applies changes to a resident snapshot; fails for unknown elements
impl Persistence for ElementSnapshot {
    fn save(&mut self, element_id: &str, partial_fields: &BTreeMap<String, FieldValue>) -> bool {
        let Some(mut element) = self.get(element_id).cloned() else {
            log::warn!("Cannot save unknown element {element_id}");
            return false;
        };
        element
            .fields
            .extend(partial_fields.iter().map(|(k, v)| (k.clone(), v.clone())));
        self.upsert(element);
        true
    }
}
