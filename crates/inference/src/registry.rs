//! Field-name to category lookup.
//!
//! The built-in tables stand in for a real schema registry. Everything that
//! needs to map names to categories goes through [`CategoryRegistry`], so a
//! fetched schema can replace [`BuiltinRegistry`] without touching
//! classification or detection code.

use crate::names::to_camel_case;
use worldlink_model::Category;

/// What a field name alone says about its target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameHint {
    pub category: Category,
    /// Name denotes a collection (`members`, `allies`)
    pub plural: bool,
}

impl NameHint {
    pub fn single(category: impl Into<Category>) -> Self {
        Self {
            category: category.into(),
            plural: false,
        }
    }

    pub fn plural(category: impl Into<Category>) -> Self {
        Self {
            category: category.into(),
            plural: true,
        }
    }
}

/// Name-to-category lookup seam.
///
/// All inputs are normalized `snake_case` names without reference suffixes.
pub trait CategoryRegistry: Send + Sync {
    /// Exact lookup of a normalized field name
    fn hint_for_name(&self, normalized: &str) -> Option<NameHint>;

    /// Whether `name` is itself a category tag
    fn is_known_category(&self, name: &str) -> bool;

    /// Plural-looking names that are nevertheless scalar (`status`, `notes`)
    fn is_plural_false_positive(&self, normalized: &str) -> bool;

    /// Names relative to the owning element's own category (`parent`, `children`)
    fn relative_hint(&self, normalized: &str) -> Option<bool>;

    /// Qualifier prefixes that do not change the target (`parent_`, `primary_`)
    fn qualifier_prefixes(&self) -> &[&str];

    /// Conventional multi-reference field holding links to `category`
    fn reference_field_for(&self, category: &Category) -> String {
        format!("{}Ids", to_camel_case(category.as_str()))
    }
}

pub const KNOWN_CATEGORIES: &[&str] = &[
    "character",
    "location",
    "object",
    "item",
    "faction",
    "organization",
    "species",
    "creature",
    "event",
    "culture",
    "religion",
    "deity",
    "language",
    "magic_system",
    "technology",
    "nation",
    "settlement",
    "lore",
    "plot",
    "timeline",
    "chapter",
    "scene",
];

/// (normalized name, category, plural)
const NAME_TABLE: &[(&str, &str, bool)] = &[
    // location
    ("birthplace", "location", false),
    ("birth_place", "location", false),
    ("deathplace", "location", false),
    ("death_place", "location", false),
    ("homeland", "location", false),
    ("hometown", "location", false),
    ("home", "location", false),
    ("origin", "location", false),
    ("residence", "location", false),
    ("capital", "location", false),
    ("headquarters", "location", false),
    ("hq", "location", false),
    ("region", "location", false),
    ("territory", "location", false),
    ("realm", "location", false),
    ("lair", "location", false),
    ("place", "location", false),
    ("planet", "location", false),
    ("city", "location", false),
    ("destination", "location", false),
    ("whereabouts", "location", false),
    // character
    ("owner", "character", false),
    ("leader", "character", false),
    ("ruler", "character", false),
    ("founder", "character", false),
    ("creator", "character", false),
    ("mother", "character", false),
    ("father", "character", false),
    ("spouse", "character", false),
    ("partner", "character", false),
    ("mentor", "character", false),
    ("rival", "character", false),
    ("nemesis", "character", false),
    ("killer", "character", false),
    ("wielder", "character", false),
    ("bearer", "character", false),
    ("master", "character", false),
    ("captain", "character", false),
    ("commander", "character", false),
    ("heir", "character", false),
    ("protagonist", "character", false),
    ("antagonist", "character", false),
    ("narrator", "character", false),
    ("member", "character", false),
    ("ally", "character", false),
    ("enemy", "character", false),
    ("friend", "character", false),
    ("sibling", "character", false),
    ("resident", "character", false),
    ("citizen", "character", false),
    ("follower", "character", false),
    ("members", "character", true),
    ("allies", "character", true),
    ("enemies", "character", true),
    ("friends", "character", true),
    ("family", "character", true),
    ("siblings", "character", true),
    ("residents", "character", true),
    ("inhabitants", "character", true),
    ("citizens", "character", true),
    ("followers", "character", true),
    ("participants", "character", true),
    ("cast", "character", true),
    // faction
    ("guild", "faction", false),
    ("clan", "faction", false),
    ("tribe", "faction", false),
    ("affiliation", "faction", false),
    ("allegiance", "faction", false),
    ("employer", "faction", false),
    ("order", "faction", false),
    ("house", "faction", false),
    // species
    ("species", "species", false),
    ("race", "species", false),
    ("ancestry", "species", false),
    // items
    ("artifact", "item", false),
    ("weapon", "item", false),
    ("relic", "item", false),
    ("equipment", "item", true),
    ("inventory", "item", true),
    ("possessions", "item", true),
    ("belongings", "item", true),
    // creature
    ("mount", "creature", false),
    ("pet", "creature", false),
    ("familiar", "creature", false),
    // event
    ("battle", "event", false),
    ("war", "event", false),
    // religion / deity
    ("faith", "religion", false),
    ("church", "religion", false),
    ("god", "deity", false),
    ("patron", "deity", false),
    ("pantheon", "deity", true),
    // language
    ("tongue", "language", false),
    // nation
    ("country", "nation", false),
    ("kingdom", "nation", false),
    ("empire", "nation", false),
    ("nationality", "nation", false),
    // misc
    ("magic", "magic_system", false),
    ("tech", "technology", false),
    ("arc", "plot", false),
    ("storyline", "plot", false),
];

const PLURAL_FALSE_POSITIVES: &[&str] = &[
    "status",
    "species",
    "series",
    "notes",
    "stats",
    "statistics",
    "settings",
    "orders",
    "bases",
    "seats",
    "news",
    "arms",
    "goods",
    "aliases",
    "address",
    "physics",
    "chaos",
    "bonus",
    "lens",
    "tags",
    "details",
    "words",
];

const QUALIFIER_PREFIXES: &[&str] = &[
    "parent_", "primary_", "home_", "current_", "main_", "native_", "former_", "original_",
    "birth_", "ruling_", "known_", "related_", "linked_",
];

/// Hand-maintained tables for common world-building vocabulary
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinRegistry;

impl CategoryRegistry for BuiltinRegistry {
    fn hint_for_name(&self, normalized: &str) -> Option<NameHint> {
        NAME_TABLE
            .iter()
            .find(|(name, _, _)| *name == normalized)
            .map(|&(_, category, plural)| NameHint {
                category: Category::new(category),
                plural,
            })
    }

    fn is_known_category(&self, name: &str) -> bool {
        KNOWN_CATEGORIES.contains(&name)
    }

    fn is_plural_false_positive(&self, normalized: &str) -> bool {
        PLURAL_FALSE_POSITIVES.contains(&normalized)
    }

    fn relative_hint(&self, normalized: &str) -> Option<bool> {
        match normalized {
            "parent" => Some(false),
            "children" | "subs" => Some(true),
            _ => None,
        }
    }

    fn qualifier_prefixes(&self) -> &[&str] {
        QUALIFIER_PREFIXES
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_names_are_normalized() {
        for (name, category, _) in NAME_TABLE {
            assert_eq!(crate::names::normalize_field_name(name), *name);
            assert!(
                KNOWN_CATEGORIES.contains(category),
                "{name} maps to unknown category {category}"
            );
        }
    }

    #[test]
    fn test_reference_field_for() {
        let registry = BuiltinRegistry;
        assert_eq!(registry.reference_field_for(&Category::new("character")), "characterIds");
        assert_eq!(registry.reference_field_for(&Category::new("magic_system")), "magicSystemIds");
    }

    #[test]
    fn test_lookup() {
        let registry = BuiltinRegistry;
        assert_eq!(registry.hint_for_name("birthplace"), Some(NameHint::single("location")));
        assert_eq!(registry.hint_for_name("allies"), Some(NameHint::plural("character")));
        assert_eq!(registry.hint_for_name("description"), None);
        assert!(registry.is_known_category("magic_system"));
        assert!(registry.is_plural_false_positive("status"));
    }
}
