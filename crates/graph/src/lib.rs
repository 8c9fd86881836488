//! # Worldlink Graph
//!
//! Reverse links and relationship graphs over schema-less elements.
//!
//! ## Features
//!
//! - **Reverse links** - every element referencing a target, grouped by relationship
//! - **Label normalization** - `locationId`, `location_id` and `LocationIds` share one group
//! - **Relationship graph** - precomputed reference edges for repeated queries
//! - **Plain-data export** - nodes and edges for a visualization layer
//!
//! ## Architecture
//!
//! ```text
//! ElementSnapshot
//!     │
//!     ├──> reverse_links_for (one-shot scan)
//!     │      ├─ classify fields via FieldInference
//!     │      ├─ collect (field, source) edges, skipping the target itself
//!     │      └─ group by normalized label, dedupe, sort by name
//!     │
//!     └──> RelationshipGraph (petgraph)
//!            ├─ Nodes: elements
//!            ├─ Edges: reference fields (single / multi)
//!            └─ reverse_links, forward_links, related, export
//! ```

mod builder;
mod error;
mod graph;
mod reverse;
mod types;

pub use error::{GraphError, Result};
pub use graph::{DanglingReference, RelationshipGraph};
pub use reverse::reverse_links_for;
pub use types::{
    ElementNode, ExportEdge, ExportNode, ForwardLink, GraphExport, ReferenceEdge,
    ReverseLinkGroup, ReverseLinkIndex,
};
