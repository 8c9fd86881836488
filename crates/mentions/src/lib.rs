//! # Worldlink Mentions
//!
//! Approximate detection of known element names in free text.
//!
//! ## Features
//!
//! - **Two-pass candidates** - capitalized-word runs plus whole-word exact names
//! - **Per-category indices** - normalized Levenshtein similarity with per-category thresholds
//! - **Linked bonus** - candidates already referenced or marked up score higher
//! - **Overlap resolution** - highest-confidence non-overlapping matches win
//! - **Inline markup** - `@[display](category:id)` parsing and rendering
//! - **Name search** - interactive fuzzy lookup for link pickers
//!
//! ## Architecture
//!
//! ```text
//! text ──> markup::parse ──> excluded ranges + linked ids
//!   │
//!   └──> candidate spans
//!          ├─ capitalized runs and their sub-runs
//!          └─ exact names (case-insensitive, whole word)
//!                 │
//!                 ▼
//!        CategoryIndex::query (one per category)
//!                 │
//!                 ▼
//!        confidence + linked bonus >= threshold
//!                 │
//!                 ▼
//!        resolve overlaps ──> Vec<Mention> (by start)
//! ```
//!
//! ## Example
//!
//! ```
//! use worldlink_mentions::{DetectorConfig, LinkedIdSet, MentionDetector};
//! use worldlink_model::{Element, ElementSnapshot};
//!
//! let snapshot = ElementSnapshot::new(vec![
//!     Element::new("l1", "Town Square", "location"),
//!     Element::new("c1", "Alice", "character"),
//! ]).unwrap();
//!
//! let detector = MentionDetector::from_snapshot(&snapshot, DetectorConfig::default()).unwrap();
//! let mentions = detector.detect("Alice crossed the Town Squre.", &LinkedIdSet::new());
//!
//! let ids: Vec<_> = mentions.iter().map(|m| m.element_id.as_str()).collect();
//! assert_eq!(ids, vec!["c1", "l1"]);
//! ```

mod config;
mod detector;
mod error;
mod index;
mod linker;
pub mod markup;
mod search;
mod spans;
mod types;

pub use config::{
    DetectorConfig, DEFAULT_SIMILARITY_THRESHOLD, LINKED_CONFIDENCE_BOOST, MAX_RUN_WORDS,
    MIN_SPAN_CHARS, STRICT_SIMILARITY_THRESHOLD,
};
pub use detector::MentionDetector;
pub use error::{MentionError, Result};
pub use linker::{membership_fingerprint, Linker};
pub use markup::MarkupSpan;
pub use search::ElementSearch;
pub use types::{LinkedIdSet, Mention};
