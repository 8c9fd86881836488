use serde::{Deserialize, Serialize};
use worldlink_model::ElementSnapshot;

/// Shape of opaque element ids (nanoid, Firestore push ids, UUIDs).
///
/// A value matches when it is a single token of `[A-Za-z0-9_-]` within the
/// length bounds that mixes letters and digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdShape {
    pub min_len: usize,
    pub max_len: usize,
    /// Require at least one ASCII digit and one ASCII letter
    pub require_mixed: bool,
}

impl Default for IdShape {
    fn default() -> Self {
        Self {
            min_len: 16,
            max_len: 64,
            require_mixed: true,
        }
    }
}

impl IdShape {
    #[must_use]
    pub fn matches(&self, value: &str) -> bool {
        let len = value.len();
        if len < self.min_len || len > self.max_len {
            return false;
        }
        if !value
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-')
        {
            return false;
        }
        if self.require_mixed {
            let has_digit = value.bytes().any(|b| b.is_ascii_digit());
            let has_alpha = value.bytes().any(|b| b.is_ascii_alphabetic());
            return has_digit && has_alpha;
        }
        true
    }
}

/// Decides whether a text value is an element id
pub trait IdEvidence {
    fn is_id(&self, value: &str) -> bool;
}

impl IdEvidence for IdShape {
    fn is_id(&self, value: &str) -> bool {
        self.matches(value)
    }
}

/// Id shape, or any id present in the current snapshot
pub struct SnapshotIds<'a> {
    pub shape: &'a IdShape,
    pub snapshot: &'a ElementSnapshot,
}

impl IdEvidence for SnapshotIds<'_> {
    fn is_id(&self, value: &str) -> bool {
        self.shape.matches(value) || self.snapshot.contains(value)
    }
}
