use thiserror::Error;

/// Result type for link sessions
pub type Result<T> = std::result::Result<T, LinkError>;

/// Link session misuse
#[derive(Error, Debug, PartialEq, Eq)]
pub enum LinkError {
    /// The text field is absent from the element
    #[error("Element '{element_id}' has no text field '{field}'")]
    UnknownTextField { element_id: String, field: String },

    /// The text field holds something other than text
    #[error("Field '{field}' of element '{element_id}' is not text")]
    NotText { element_id: String, field: String },

    /// A refreshed element does not belong to this session
    #[error("Session edits element '{expected}', got '{found}'")]
    ElementMismatch { expected: String, found: String },
}
