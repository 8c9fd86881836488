//! # Worldlink Inference
//!
//! Schema-less classification of element fields.
//!
//! ## Philosophy
//!
//! Worlds grow their own field vocabulary over time, so there is no schema to
//! consult. Every field is classified from evidence instead:
//! - **Value shape first**: an id-shaped string is a single reference, a list of
//!   id-shaped strings is a multi reference, anything else non-empty is scalar
//! - **Name patterns second**: suffixes (`Id`, `_ids`), an exact name table,
//!   qualifier prefixes (`parent_`, `primary_`) and plural forms guess the target
//!   category, and decide empty fields on their own
//!
//! Classification never fails; without evidence a field is scalar.
//!
//! ## Architecture
//!
//! ```text
//! (field name, value, owning category)
//!     │
//!     ├──> IdEvidence (IdShape, optionally the snapshot's ids)
//!     │      └─ value shape: scalar | single | multi
//!     │
//!     └──> CategoryRegistry (name -> category seam)
//!            ├─ strip reference suffix, normalize
//!            ├─ exact table / known category
//!            ├─ plural forms, qualifier prefixes, last word
//!            └─ target category guess
//! ```

mod classification;
mod engine;
mod id_shape;
pub mod names;
mod registry;

pub use classification::{Cardinality, Classification, FieldClassification};
pub use engine::FieldInference;
pub use id_shape::{IdEvidence, IdShape, SnapshotIds};
pub use registry::{BuiltinRegistry, CategoryRegistry, NameHint, KNOWN_CATEGORIES};
