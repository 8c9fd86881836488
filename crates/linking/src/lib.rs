//! # Worldlink Linking
//!
//! Turns detected mentions into durable references.
//!
//! ## Features
//!
//! - **Accept** - append the id to the category's conventional reference field, once
//! - **Reject** - suppress a mention until the text at its position changes
//! - **Link all** - one append per distinct id, every span rewritten as markup
//! - **Atomic commit** - reference fields and text saved together or rolled back together
//!
//! ## Architecture
//!
//! ```text
//! LinkSession (working copy of one element + text field)
//!     │
//!     ├─ detect ──> MentionDetector::detect_excluding ──> filter rejected
//!     ├─ accept / reject / link_all ──> working copy
//!     │
//!     └─ commit(&mut dyn Persistence)
//!            ├─ save(element_id, changed fields) == true  ──> Committed
//!            └─ false ──> restore fields and text ──> RolledBack
//! ```

mod error;
mod persistence;
mod session;
mod types;

pub use error::{LinkError, Result};
pub use persistence::Persistence;
pub use session::{linked_ids_for, linked_ids_in, LinkSession};
pub use types::{Accepted, CommitStatus, LinkAllReport, LinkChangeSet, Suppression};
