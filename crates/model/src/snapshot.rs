use crate::element::{Category, Element};
use crate::error::{ModelError, Result};
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};

/// Read-only view of every element in a world at one point in time.
///
/// The host takes a fresh snapshot on every call instead of the engine
/// subscribing to change events.
#[derive(Debug, Clone, Default)]
pub struct ElementSnapshot {
    elements: Vec<Element>,
    by_id: HashMap<String, usize>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawSnapshot {
    List(Vec<Element>),
    Wrapped { elements: Vec<Element> },
}

impl ElementSnapshot {
    /// Build a snapshot, rejecting empty or duplicate ids
    pub fn new(elements: Vec<Element>) -> Result<Self> {
        let mut by_id = HashMap::with_capacity(elements.len());
        for (idx, element) in elements.iter().enumerate() {
            if element.id.trim().is_empty() {
                return Err(ModelError::EmptyId(idx));
            }
            if by_id.insert(element.id.clone(), idx).is_some() {
                return Err(ModelError::DuplicateId(element.id.clone()));
            }
        }

        log::debug!("Loaded snapshot with {} elements", elements.len());
        Ok(Self { elements, by_id })
    }

    /// Parse either a bare JSON array of elements or `{"elements": [...]}`
    pub fn from_json(bytes: &[u8]) -> Result<Self> {
        let raw: RawSnapshot = serde_json::from_slice(bytes)?;
        let elements = match raw {
            RawSnapshot::List(elements) | RawSnapshot::Wrapped { elements } => elements,
        };
        Self::new(elements)
    }

    /// Pretty JSON array of every element, in snapshot order
    pub fn to_json(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec_pretty(&self.elements)?)
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Element> {
        self.by_id.get(id).map(|&idx| &self.elements[idx])
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.by_id.contains_key(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Element> {
        self.elements.iter()
    }

    #[must_use]
    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Group elements by category (categories and members in snapshot order
    /// within each group; groups ordered by category)
    #[must_use]
    pub fn group_by_category(&self) -> BTreeMap<Category, Vec<&Element>> {
        let mut groups: BTreeMap<Category, Vec<&Element>> = BTreeMap::new();
        for element in &self.elements {
            groups
                .entry(element.category.clone())
                .or_default()
                .push(element);
        }
        groups
    }

    /// Replace (or insert) one element, keeping the id index current
    pub fn upsert(&mut self, element: Element) {
        match self.by_id.get(&element.id) {
            Some(&idx) => self.elements[idx] = element,
            None => {
                self.by_id.insert(element.id.clone(), self.elements.len());
                self.elements.push(element);
            }
        }
    }
}
