//! # Worldlink Model
//!
//! Plain data shared by every Worldlink crate: schema-less [`Element`] records,
//! their open-ended [`FieldValue`]s, and the read-only [`ElementSnapshot`] a host
//! application hands to the engine on every call.
//!
//! The engine never owns element lifetime. Snapshots are built by the host
//! (usually from JSON fetched elsewhere) and only read here.
//!
//! ```rust
//! use worldlink_model::{Element, ElementSnapshot, FieldValue};
//!
//! let town = Element::new("loc7Qm2xK9pLa3Zt", "Town Square", "location");
//! let alice = Element::new("chr4Hd8sN2vQe6Yb", "Alice", "character")
//!     .with_field("locationId", FieldValue::text("loc7Qm2xK9pLa3Zt"));
//!
//! let snapshot = ElementSnapshot::new(vec![town, alice]).unwrap();
//! assert_eq!(snapshot.get("chr4Hd8sN2vQe6Yb").unwrap().name, "Alice");
//! ```

mod element;
mod error;
mod snapshot;

pub use element::{Category, Element, ElementId, FieldValue};
pub use error::{ModelError, Result};
pub use snapshot::ElementSnapshot;
