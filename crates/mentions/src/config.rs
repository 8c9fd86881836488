use anyhow::{anyhow, Context};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use worldlink_model::Category;

/// Similarity a span needs to match a name in an ordinary category
pub const DEFAULT_SIMILARITY_THRESHOLD: f32 = 0.8;

/// Similarity required in categories whose names collide with common words
pub const STRICT_SIMILARITY_THRESHOLD: f32 = 0.9;

/// Bonus added to the confidence of candidates the text already links
pub const LINKED_CONFIDENCE_BOOST: f32 = 0.1;

/// Shortest span (in characters) considered a candidate
pub const MIN_SPAN_CHARS: usize = 3;

/// Longest capitalized run (in words) expanded into sub-runs
pub const MAX_RUN_WORDS: usize = 6;

const STRICT_CATEGORIES: &[&str] = &["event", "item", "object", "language", "culture"];

const DEFAULT_IGNORED_WORDS: &[&str] = &[
    "after", "before", "but", "during", "each", "every", "her", "his", "how", "its", "not",
    "she", "that", "the", "their", "then", "there", "these", "they", "this", "those", "what",
    "when", "where", "which", "while", "who", "why", "with", "you",
];

/// Tuning for [`crate::MentionDetector`].
///
/// Loadable from JSON or TOML; missing keys take their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// Threshold for categories without an override
    pub default_threshold: f32,

    /// Per-category threshold overrides
    pub category_thresholds: BTreeMap<Category, f32>,

    /// Spans shorter than this many characters are dropped
    pub min_span_chars: usize,

    /// Confidence bonus for already-linked candidates (capped at 1.0)
    pub linked_confidence_boost: f32,

    /// Maximum words in a capitalized run sub-span
    pub max_run_words: usize,

    /// Single capitalized words never treated as candidates (case-insensitive)
    pub ignored_words: Vec<String>,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            default_threshold: DEFAULT_SIMILARITY_THRESHOLD,
            category_thresholds: STRICT_CATEGORIES
                .iter()
                .map(|c| (Category::new(c), STRICT_SIMILARITY_THRESHOLD))
                .collect(),
            min_span_chars: MIN_SPAN_CHARS,
            linked_confidence_boost: LINKED_CONFIDENCE_BOOST,
            max_run_words: MAX_RUN_WORDS,
            ignored_words: DEFAULT_IGNORED_WORDS.iter().map(|w| (*w).to_string()).collect(),
        }
    }
}

impl DetectorConfig {
    /// Fewer, surer suggestions
    pub fn strict() -> Self {
        Self {
            default_threshold: STRICT_SIMILARITY_THRESHOLD,
            category_thresholds: STRICT_CATEGORIES
                .iter()
                .map(|c| (Category::new(c), 0.95))
                .collect(),
            ..Default::default()
        }
    }

    /// More suggestions, tolerating heavier misspellings
    pub fn lenient() -> Self {
        Self {
            default_threshold: 0.7,
            category_thresholds: STRICT_CATEGORIES
                .iter()
                .map(|c| (Category::new(c), 0.85))
                .collect(),
            ..Default::default()
        }
    }

    /// Threshold applying to `category`
    #[must_use]
    pub fn threshold_for(&self, category: &Category) -> f32 {
        self.category_thresholds
            .get(category)
            .copied()
            .unwrap_or(self.default_threshold)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        let in_unit = |t: f32| t > 0.0 && t <= 1.0;

        if !in_unit(self.default_threshold) {
            return Err(format!(
                "default_threshold ({}) must be in (0, 1]",
                self.default_threshold
            ));
        }

        if let Some((category, threshold)) =
            self.category_thresholds.iter().find(|(_, t)| !in_unit(**t))
        {
            return Err(format!(
                "threshold for '{category}' ({threshold}) must be in (0, 1]"
            ));
        }

        if !(0.0..=1.0).contains(&self.linked_confidence_boost) {
            return Err(format!(
                "linked_confidence_boost ({}) must be in [0, 1]",
                self.linked_confidence_boost
            ));
        }

        if self.max_run_words == 0 {
            return Err("max_run_words must be > 0".to_string());
        }

        Ok(())
    }

    /// Parse JSON or TOML configuration and validate it
    pub fn from_bytes(bytes: &[u8]) -> anyhow::Result<Self> {
        let config: Self = match serde_json::from_slice(bytes) {
            Ok(config) => config,
            Err(json_err) => {
                let utf8 = std::str::from_utf8(bytes).map_err(|err| anyhow!("{json_err}; {err}"))?;
                toml::from_str(utf8).map_err(|toml_err| {
                    anyhow!(
                        "Detector config is not valid JSON or TOML ({json_err}); TOML parse error: {toml_err}"
                    )
                })?
            }
        };
        config.validate().map_err(|err| anyhow!(err))?;
        Ok(config)
    }

    /// Load configuration from a file
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let bytes = std::fs::read(path)
            .with_context(|| format!("Failed to read detector config {}", path.display()))?;
        Self::from_bytes(&bytes)
            .with_context(|| format!("Invalid detector config {}", path.display()))
    }
}
