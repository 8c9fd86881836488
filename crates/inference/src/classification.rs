use serde::{Deserialize, Serialize};
use worldlink_model::Category;

/// How many elements a field refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cardinality {
    Scalar,
    Single,
    Multi,
}

/// Result of classifying one field.
///
/// Derived on demand and never stored; two records of the same category can
/// disagree on ambiguous fields.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "cardinality", content = "target_category", rename_all = "snake_case")]
pub enum Classification {
    /// Plain value (text, number, flag, list of scalars)
    Scalar,

    /// One element id, with a best-guess target category
    Single(Option<Category>),

    /// A list of element ids, with a best-guess target category
    Multi(Option<Category>),
}

impl Classification {
    #[must_use]
    pub const fn cardinality(&self) -> Cardinality {
        match self {
            Self::Scalar => Cardinality::Scalar,
            Self::Single(_) => Cardinality::Single,
            Self::Multi(_) => Cardinality::Multi,
        }
    }

    #[must_use]
    pub const fn is_reference(&self) -> bool {
        !matches!(self, Self::Scalar)
    }

    #[must_use]
    pub const fn target_category(&self) -> Option<&Category> {
        match self {
            Self::Scalar => None,
            Self::Single(category) | Self::Multi(category) => category.as_ref(),
        }
    }
}

/// Classification of a named field on a concrete element
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldClassification {
    pub field_name: String,

    #[serde(flatten)]
    pub classification: Classification,
}
