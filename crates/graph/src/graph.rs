use crate::error::{GraphError, Result};
use crate::types::{
    group_edges, ElementNode, ExportEdge, ExportNode, ForwardLink, GraphExport, RawEdge,
    ReferenceEdge, ReverseLinkIndex,
};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use serde::Serialize;
use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};
use worldlink_inference::names::normalize_field_name;
use worldlink_model::Element;

/// Reference whose target id is not in the snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DanglingReference {
    pub source_id: String,
    pub field_name: String,
    pub target_id: String,
}

/// Precomputed reference graph of one snapshot.
///
/// Every field is classified once at build time, so repeated reverse-link
/// queries against an unchanged snapshot skip the full scan.
pub struct RelationshipGraph {
    pub(crate) graph: DiGraph<ElementNode, ReferenceEdge>,
    pub(crate) id_index: HashMap<String, NodeIndex>,
    pub(crate) dangling: Vec<DanglingReference>,
}

impl RelationshipGraph {
    /// Find node by element id
    pub fn find_node(&self, id: &str) -> Result<NodeIndex> {
        self.id_index
            .get(id)
            .copied()
            .ok_or_else(|| GraphError::NodeNotFound(id.to_string()))
    }

    /// Element by id
    pub fn element(&self, id: &str) -> Result<&Element> {
        let idx = self.find_node(id)?;
        Ok(&self.graph[idx].element)
    }

    #[must_use]
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    #[must_use]
    pub fn dangling(&self) -> &[DanglingReference] {
        &self.dangling
    }

    /// Elements referencing `target_id`, grouped like [`crate::reverse_links_for`].
    ///
    /// Unknown ids yield an empty index.
    #[must_use]
    pub fn reverse_links(&self, target_id: &str) -> ReverseLinkIndex {
        let Ok(target) = self.find_node(target_id) else {
            return ReverseLinkIndex::empty(target_id);
        };

        let edges: Vec<RawEdge<'_>> = self
            .graph
            .edges_directed(target, Direction::Incoming)
            .map(|edge| RawEdge {
                field_name: edge.weight().field_name.as_str(),
                source: &self.graph[edge.source()].element,
            })
            .collect();

        group_edges(target_id, &edges)
    }

    /// Outgoing references of `source_id`, including dangling ones, ordered
    /// by field name then target name.
    pub fn forward_links(&self, source_id: &str) -> Result<Vec<ForwardLink>> {
        let source = self.find_node(source_id)?;

        let mut links: Vec<ForwardLink> = self
            .graph
            .edges_directed(source, Direction::Outgoing)
            .map(|edge| {
                let target = &self.graph[edge.target()].element;
                ForwardLink {
                    field_name: edge.weight().field_name.clone(),
                    cardinality: edge.weight().cardinality,
                    target_id: target.id.clone(),
                    target_name: Some(target.name.clone()),
                    target_category: Some(target.category.clone()),
                }
            })
            .collect();

        links.extend(
            self.dangling
                .iter()
                .filter(|d| d.source_id == source_id)
                .map(|d| ForwardLink {
                    field_name: d.field_name.clone(),
                    cardinality: self.cardinality_of(source, &d.field_name),
                    target_id: d.target_id.clone(),
                    target_name: None,
                    target_category: None,
                }),
        );

        links.sort_by(|a, b| {
            a.field_name
                .cmp(&b.field_name)
                .then_with(|| a.is_dangling().cmp(&b.is_dangling()))
                .then_with(|| a.target_name.cmp(&b.target_name))
                .then_with(|| a.target_id.cmp(&b.target_id))
        });
        Ok(links)
    }

    fn cardinality_of(
        &self,
        source: NodeIndex,
        field_name: &str,
    ) -> worldlink_inference::Cardinality {
        let is_list = self.graph[source]
            .element
            .field(field_name)
            .is_some_and(|v| v.as_list().is_some());
        if is_list {
            worldlink_inference::Cardinality::Multi
        } else {
            worldlink_inference::Cardinality::Single
        }
    }

    /// Elements within `max_depth` hops of `id`, following references in
    /// either direction. Returns (id, distance) ordered by distance then id;
    /// the start element is not included.
    pub fn related(&self, id: &str, max_depth: usize) -> Result<Vec<(String, usize)>> {
        let start = self.find_node(id)?;
        let mut visited = HashSet::from([start]);
        let mut queue = VecDeque::from([(start, 0usize)]);
        let mut result = Vec::new();

        while let Some((current, depth)) = queue.pop_front() {
            if depth >= max_depth {
                continue;
            }
            for neighbor in self.graph.neighbors_undirected(current) {
                if visited.insert(neighbor) {
                    result.push((self.graph[neighbor].element.id.clone(), depth + 1));
                    queue.push_back((neighbor, depth + 1));
                }
            }
        }

        result.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(&b.0)));
        Ok(result)
    }

    /// Whole graph as plain data, nodes ordered by id
    #[must_use]
    pub fn export(&self) -> GraphExport {
        let all: BTreeSet<NodeIndex> = self.graph.node_indices().collect();
        self.export_nodes(&all)
    }

    /// Neighbourhood of `id` within `max_depth` hops as plain data
    pub fn export_neighborhood(&self, id: &str, max_depth: usize) -> Result<GraphExport> {
        let mut nodes = BTreeSet::from([self.find_node(id)?]);
        for (related, _) in self.related(id, max_depth)? {
            nodes.insert(self.find_node(&related)?);
        }
        Ok(self.export_nodes(&nodes))
    }

    fn export_nodes(&self, nodes: &BTreeSet<NodeIndex>) -> GraphExport {
        let mut export = GraphExport::default();

        for &idx in nodes {
            let element = &self.graph[idx].element;
            export.nodes.push(ExportNode {
                id: element.id.clone(),
                name: element.name.clone(),
                category: element.category.clone(),
            });
        }

        for edge in self.graph.edge_references() {
            if !nodes.contains(&edge.source()) || !nodes.contains(&edge.target()) {
                continue;
            }
            export.edges.push(ExportEdge {
                source: self.graph[edge.source()].element.id.clone(),
                target: self.graph[edge.target()].element.id.clone(),
                field_name: edge.weight().field_name.clone(),
                label: normalize_field_name(&edge.weight().field_name),
            });
        }

        export.nodes.sort_by(|a, b| a.id.cmp(&b.id));
        export.edges.sort_by(|a, b| {
            (&a.source, &a.field_name, &a.target).cmp(&(&b.source, &b.field_name, &b.target))
        });
        export
    }
}
