use crate::graph::{DanglingReference, RelationshipGraph};
use crate::types::{ElementNode, ReferenceEdge};
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::{HashMap, HashSet};
use worldlink_inference::{Classification, FieldInference};
use worldlink_model::ElementSnapshot;

impl RelationshipGraph {
    /// Classify every field once and record each reference as an edge.
    ///
    /// Self-references are dropped; ids missing from the snapshot are kept as
    /// dangling references instead of edges.
    pub fn build(snapshot: &ElementSnapshot, engine: &FieldInference) -> Self {
        let mut graph = DiGraph::with_capacity(snapshot.len(), snapshot.len());
        let mut id_index: HashMap<String, NodeIndex> = HashMap::with_capacity(snapshot.len());

        // Phase 1: one node per element
        for element in snapshot.iter() {
            let idx = graph.add_node(ElementNode {
                element: element.clone(),
            });
            id_index.insert(element.id.clone(), idx);
        }

        // Phase 2: classify fields and add reference edges
        let mut dangling = Vec::new();
        for element in snapshot.iter() {
            let from = id_index[&element.id];
            for classified in engine.classify_element_in(snapshot, element) {
                let Some(value) = element.field(&classified.field_name) else {
                    continue;
                };
                let ids: Vec<&str> = match classified.classification {
                    Classification::Scalar => continue,
                    Classification::Single(_) => {
                        value.as_text().map(str::trim).into_iter().collect()
                    }
                    Classification::Multi(_) => value.list_texts().map(str::trim).collect(),
                };

                let mut seen = HashSet::new();
                for target_id in ids {
                    if target_id.is_empty() || target_id == element.id || !seen.insert(target_id) {
                        continue;
                    }
                    match id_index.get(target_id) {
                        Some(&to) => {
                            graph.add_edge(
                                from,
                                to,
                                ReferenceEdge {
                                    field_name: classified.field_name.clone(),
                                    cardinality: classified.classification.cardinality(),
                                },
                            );
                        }
                        None => dangling.push(DanglingReference {
                            source_id: element.id.clone(),
                            field_name: classified.field_name.clone(),
                            target_id: target_id.to_string(),
                        }),
                    }
                }
            }
        }

        log::info!(
            "Built relationship graph: {} nodes, {} edges, {} dangling references",
            graph.node_count(),
            graph.edge_count(),
            dangling.len()
        );

        Self {
            graph,
            id_index,
            dangling,
        }
    }
}
