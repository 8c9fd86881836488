use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use worldlink_inference::names::normalize_field_name;
use worldlink_inference::Cardinality;
use worldlink_model::{Category, Element, ElementId};

/// Elements referencing one target through the same relationship
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReverseLinkGroup {
    /// Display label: the most frequent raw field name in the group
    pub label: String,

    /// Normalized relationship key (`locationId` -> `location`)
    pub key: String,

    /// Raw field names that contributed, sorted
    pub field_names: Vec<String>,

    /// Source elements, sorted by name then id, each listed once
    pub elements: Vec<Element>,
}

impl ReverseLinkGroup {
    /// Whether `name` is this group's label, key or one of its raw field names
    #[must_use]
    pub fn answers_to(&self, name: &str) -> bool {
        self.label == name
            || self.key == name
            || self.field_names.iter().any(|f| f == name)
            || normalize_field_name(name) == self.key
    }
}

/// Every element referencing a target, grouped by relationship.
///
/// Fully derived from one snapshot; recompute it when the collection changes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReverseLinkIndex {
    pub target_id: ElementId,

    /// Groups ordered by label
    pub groups: Vec<ReverseLinkGroup>,
}

impl ReverseLinkIndex {
    pub fn empty(target_id: impl Into<ElementId>) -> Self {
        Self {
            target_id: target_id.into(),
            groups: Vec::new(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Group by label, normalized key or any contributing raw field name
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ReverseLinkGroup> {
        self.groups.iter().find(|g| g.answers_to(name))
    }

    /// Label -> source elements
    #[must_use]
    pub fn to_map(&self) -> BTreeMap<&str, Vec<&Element>> {
        self.groups
            .iter()
            .map(|g| (g.label.as_str(), g.elements.iter().collect()))
            .collect()
    }

    /// Distinct source ids across all groups
    #[must_use]
    pub fn source_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self
            .groups
            .iter()
            .flat_map(|g| g.elements.iter().map(|e| e.id.as_str()))
            .collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    }
}

/// Raw reverse edge before label normalization
#[derive(Debug, Clone, Copy)]
pub(crate) struct RawEdge<'a> {
    pub field_name: &'a str,
    pub source: &'a Element,
}

/// Merge raw edges into label groups.
///
/// Fields normalizing to the same key share a group; a source appearing under
/// several merged names is listed once.
pub(crate) fn group_edges(target_id: &str, edges: &[RawEdge<'_>]) -> ReverseLinkIndex {
    #[derive(Default)]
    struct Pending<'a> {
        raw_counts: BTreeMap<&'a str, usize>,
        seen: HashSet<&'a str>,
        sources: Vec<&'a Element>,
    }

    let mut pending: BTreeMap<String, Pending<'_>> = BTreeMap::new();
    for edge in edges {
        let key = normalize_field_name(edge.field_name);
        let key = if key.is_empty() {
            edge.field_name.to_string()
        } else {
            key
        };
        let group = pending.entry(key).or_default();
        *group.raw_counts.entry(edge.field_name).or_insert(0) += 1;
        if group.seen.insert(edge.source.id.as_str()) {
            group.sources.push(edge.source);
        }
    }

    let mut groups: Vec<ReverseLinkGroup> = pending
        .into_iter()
        .map(|(key, group)| {
            // highest count wins; BTreeMap order breaks ties lexicographically
            let label = group
                .raw_counts
                .iter()
                .fold(None::<(&str, usize)>, |best, (&name, &count)| match best {
                    Some((_, best_count)) if best_count >= count => best,
                    _ => Some((name, count)),
                })
                .map(|(name, _)| name.to_string())
                .unwrap_or_else(|| key.clone());

            let mut elements: Vec<Element> = group.sources.into_iter().cloned().collect();
            elements.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));

            ReverseLinkGroup {
                label,
                key,
                field_names: group.raw_counts.keys().map(|s| (*s).to_string()).collect(),
                elements,
            }
        })
        .collect();
    groups.sort_by(|a, b| a.label.cmp(&b.label));

    ReverseLinkIndex {
        target_id: target_id.to_string(),
        groups,
    }
}

/// Node weight of the relationship graph
#[derive(Debug, Clone)]
pub struct ElementNode {
    pub element: Element,
}

/// Edge weight: `source.field_name` holds the target's id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceEdge {
    pub field_name: String,
    pub cardinality: Cardinality,
}

/// Outgoing reference of one element
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForwardLink {
    pub field_name: String,
    pub cardinality: Cardinality,
    pub target_id: ElementId,

    /// `None` when the id is not in the snapshot
    pub target_name: Option<String>,
    pub target_category: Option<Category>,
}

impl ForwardLink {
    #[must_use]
    pub const fn is_dangling(&self) -> bool {
        self.target_name.is_none()
    }
}

/// Graph data for a visualization layer (no layout)
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GraphExport {
    pub nodes: Vec<ExportNode>,
    pub edges: Vec<ExportEdge>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportNode {
    pub id: ElementId,
    pub name: String,
    pub category: Category,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportEdge {
    pub source: ElementId,
    pub target: ElementId,
    pub field_name: String,

    /// Normalized relationship key
    pub label: String,
}
