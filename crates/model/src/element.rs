use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Opaque, stable element identifier (unique across a world)
pub type ElementId = String;

/// Element category tag.
///
/// The set is open: about twenty categories are common (`character`,
/// `location`, `faction`, ...) but unknown tags are carried as-is. Tags are
/// normalized to `snake_case` so `"Magic System"`, `"magicSystem"` and
/// `"magic-system"` compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Category(String);

impl Category {
    pub fn new(raw: impl AsRef<str>) -> Self {
        Self(normalize_category(raw.as_ref()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn normalize_category(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len() + 4);
    let mut prev_lower = false;
    for ch in raw.trim().chars() {
        if ch == ' ' || ch == '-' || ch == '_' {
            if !out.is_empty() && !out.ends_with('_') {
                out.push('_');
            }
            prev_lower = false;
            continue;
        }
        if ch.is_uppercase() && prev_lower && !out.ends_with('_') {
            out.push('_');
        }
        prev_lower = ch.is_lowercase() || ch.is_ascii_digit();
        out.extend(ch.to_lowercase());
    }
    while out.ends_with('_') {
        out.pop();
    }
    out
}

impl From<String> for Category {
    fn from(raw: String) -> Self {
        Self::new(raw)
    }
}

impl From<&str> for Category {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<Category> for String {
    fn from(category: Category) -> Self {
        category.0
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Category {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Value held by an element field.
///
/// Deserialized untagged so plain JSON documents load directly. Whether a
/// `Text` is an id or free text is not decided here; that is the job of field
/// inference.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    #[default]
    Null,
    Bool(bool),
    Number(serde_json::Number),
    Text(String),
    List(Vec<FieldValue>),
    Object(serde_json::Map<String, serde_json::Value>),
}

impl FieldValue {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    /// List of text values (typically ids)
    pub fn texts<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::List(values.into_iter().map(|v| Self::Text(v.into())).collect())
    }

    /// No shape evidence: null, blank text or an empty list
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Null => true,
            Self::Text(s) => s.trim().is_empty(),
            Self::List(items) => items.is_empty(),
            _ => false,
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_list(&self) -> Option<&[FieldValue]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// Text members of a list value (non-text members are skipped)
    pub fn list_texts(&self) -> impl Iterator<Item = &str> {
        self.as_list()
            .unwrap_or_default()
            .iter()
            .filter_map(FieldValue::as_text)
    }

    /// True when this value is `id` or a list containing `id`
    #[must_use]
    pub fn holds_id(&self, id: &str) -> bool {
        match self {
            Self::Text(s) => s == id,
            Self::List(_) => self.list_texts().any(|s| s == id),
            _ => false,
        }
    }
}

/// A categorized world-building record with an open field vocabulary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    pub id: ElementId,

    /// Display name (not unique)
    pub name: String,

    pub category: Category,

    /// Arbitrary named fields, ordered by name
    #[serde(default)]
    pub fields: BTreeMap<String, FieldValue>,
}

impl Element {
    pub fn new(
        id: impl Into<ElementId>,
        name: impl Into<String>,
        category: impl Into<Category>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            category: category.into(),
            fields: BTreeMap::new(),
        }
    }

    /// Builder: set a field
    #[must_use]
    pub fn with_field(mut self, name: impl Into<String>, value: FieldValue) -> Self {
        self.fields.insert(name.into(), value);
        self
    }

    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    /// Text content of a field, if it holds text
    #[must_use]
    pub fn text_of(&self, field: &str) -> Option<&str> {
        self.field(field).and_then(FieldValue::as_text)
    }
}
