//! Field-name normalization shared by inference and relationship grouping.

/// Reference suffix found on a field name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceSuffix {
    /// `Id`, `ID`, `_id`
    Single,
    /// `Ids`, `IDs`, `_ids`
    Multi,
}

/// Strip a trailing reference suffix, returning the stem and which suffix
/// was removed. Names that are nothing but a suffix (`id`, `Ids`) are left
/// untouched.
#[must_use]
pub fn strip_reference_suffix(name: &str) -> (&str, Option<ReferenceSuffix>) {
    let trimmed = name.trim();
    let lower = trimmed.to_ascii_lowercase();

    for (suffix, kind) in [("_ids", ReferenceSuffix::Multi), ("_id", ReferenceSuffix::Single)] {
        if lower.ends_with(suffix) && lower.len() > suffix.len() {
            return (&trimmed[..trimmed.len() - suffix.len()], Some(kind));
        }
    }

    // camelCase: the suffix must follow a lowercase letter or digit (ownerId, not ANDROID)
    for (suffix, kind) in [
        ("Ids", ReferenceSuffix::Multi),
        ("IDs", ReferenceSuffix::Multi),
        ("IDS", ReferenceSuffix::Multi),
        ("Id", ReferenceSuffix::Single),
        ("ID", ReferenceSuffix::Single),
    ] {
        if let Some(stem) = trimmed.strip_suffix(suffix) {
            if stem
                .chars()
                .last()
                .is_some_and(|c| c.is_lowercase() || c.is_ascii_digit())
            {
                return (stem, Some(kind));
            }
        }
    }

    (trimmed, None)
}

/// Split a field name into lowercase words on `_`, `-`, spaces and
/// camelCase boundaries (`parentLocation` -> `parent`, `location`).
#[must_use]
pub fn split_words(name: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let chars: Vec<char> = name.chars().collect();

    for (i, &ch) in chars.iter().enumerate() {
        if ch == '_' || ch == '-' || ch == '.' || ch.is_whitespace() {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            continue;
        }

        if ch.is_uppercase() && !current.is_empty() {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).is_some_and(|c| c.is_lowercase());
            // fooBar, or the last capital of an acronym run: HTTPServer -> http, server
            let boundary = prev.is_lowercase()
                || prev.is_ascii_digit()
                || (prev.is_uppercase() && next_is_lower);
            if boundary {
                words.push(std::mem::take(&mut current));
            }
        }
        current.extend(ch.to_lowercase());
    }

    if !current.is_empty() {
        words.push(current);
    }
    words
}

/// Canonical relationship label: suffix stripped, lowercased `snake_case`.
///
/// `locationId`, `location_id`, `LocationIds` and `location` all normalize to
/// `location`.
#[must_use]
pub fn normalize_field_name(name: &str) -> String {
    let (stem, _) = strip_reference_suffix(name);
    split_words(stem).join("_")
}

/// `magic_system` -> `magicSystem`
#[must_use]
pub fn to_camel_case(snake: &str) -> String {
    let mut out = String::with_capacity(snake.len());
    for (i, word) in snake.split('_').filter(|w| !w.is_empty()).enumerate() {
        if i == 0 {
            out.push_str(word);
        } else {
            let mut chars = word.chars();
            if let Some(first) = chars.next() {
                out.extend(first.to_uppercase());
                out.push_str(chars.as_str());
            }
        }
    }
    out
}

/// Candidate singular forms of a plural-looking word, most likely first
#[must_use]
pub fn singular_candidates(word: &str) -> Vec<String> {
    if let Some(stem) = word.strip_suffix("ies") {
        return if stem.is_empty() {
            Vec::new()
        } else {
            vec![format!("{stem}y")]
        };
    }
    if word.ends_with("ss") {
        return Vec::new();
    }
    let mut out = Vec::new();
    if let Some(stem) = word.strip_suffix('s') {
        if !stem.is_empty() {
            out.push(stem.to_string());
        }
    }
    if let Some(stem) = word.strip_suffix("es") {
        if !stem.is_empty() {
            out.push(stem.to_string());
        }
    }
    out
}
