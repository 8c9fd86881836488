use thiserror::Error;

/// Result type for snapshot loading
pub type Result<T> = std::result::Result<T, ModelError>;

/// Errors raised while assembling an element snapshot
#[derive(Error, Debug)]
pub enum ModelError {
    /// Snapshot document is not valid JSON or has the wrong shape
    #[error("Snapshot parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Two elements share the same id
    #[error("Duplicate element id: {0}")]
    DuplicateId(String),

    /// Element without an id
    #[error("Element at position {0} has an empty id")]
    EmptyId(usize),
}
