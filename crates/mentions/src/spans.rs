//! Candidate span extraction.
//!
//! Two passes feed the matcher: capitalized-word runs (proper-noun
//! heuristic) and whole-word occurrences of known names. Spans inside
//! existing markup are never candidates.

use crate::markup::MarkupSpan;
use regex::{Regex, RegexBuilder};
use std::collections::{BTreeSet, HashSet};
use std::ops::Range;
use std::sync::OnceLock;

/// Lowercase words allowed inside a capitalized run ("Order of the Rose")
const CONNECTORS: &[&str] = &[
    "al", "bin", "da", "de", "del", "della", "der", "di", "du", "el", "ibn", "la", "le", "of",
    "the", "van", "von",
];

/// Connectors allowed back to back ("Keeper of the Flame")
const MAX_CONNECTOR_GAP: usize = 2;

const TOKEN_PATTERN: &str = r"[\p{L}\p{N}](?:[\p{L}\p{M}\p{N}'’\-]*[\p{L}\p{M}\p{N}])?";

fn token_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(TOKEN_PATTERN).expect("token pattern is valid"))
}

/// Span filtering knobs taken from the detector configuration
#[derive(Debug, Clone)]
pub(crate) struct SpanRules {
    pub min_span_chars: usize,
    pub max_run_words: usize,
    /// Lowercased
    pub ignored_words: HashSet<String>,
}

#[derive(Debug, Clone, Copy)]
struct Word {
    start: usize,
    end: usize,
    connector: bool,
}

/// Case-insensitive whole-word patterns for every known name
#[derive(Debug, Default)]
pub(crate) struct NamePatterns {
    patterns: Vec<Regex>,
}

impl NamePatterns {
    pub fn new<'a>(names: impl IntoIterator<Item = &'a str>, min_chars: usize) -> Self {
        let mut seen = HashSet::new();
        let mut patterns = Vec::new();

        for name in names {
            let words: Vec<&str> = name.split_whitespace().collect();
            if words.is_empty() || name.trim().chars().count() < min_chars {
                continue;
            }
            if !seen.insert(words.join(" ").to_lowercase()) {
                continue;
            }

            let pattern = words
                .iter()
                .map(|w| regex::escape(w))
                .collect::<Vec<_>>()
                .join(r"\s+");
            match RegexBuilder::new(&pattern).case_insensitive(true).build() {
                Ok(re) => patterns.push(re),
                Err(err) => log::warn!("Skipping exact-name pattern for {name:?}: {err}"),
            }
        }

        Self { patterns }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    fn find_all(&self, text: &str, out: &mut BTreeSet<(usize, usize)>) {
        for re in &self.patterns {
            for m in re.find_iter(text) {
                if is_word_bounded(text, m.start(), m.end()) {
                    out.insert((m.start(), m.end()));
                }
            }
        }
    }
}

fn is_word_bounded(text: &str, start: usize, end: usize) -> bool {
    let before = text[..start].chars().next_back();
    let after = text[end..].chars().next();
    !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
}

fn strip_possessive(token: &str) -> Option<&str> {
    ["'s", "'S", "’s", "’S"]
        .iter()
        .find_map(|suffix| token.strip_suffix(suffix))
        .filter(|stem| !stem.is_empty())
}

fn is_capitalized(token: &str) -> bool {
    token.chars().next().is_some_and(char::is_uppercase)
}

fn is_horizontal_gap(gap: &str) -> bool {
    !gap.is_empty() && gap.chars().all(|c| c == ' ' || c == '\t')
}

/// Maximal capitalized runs, connectors kept between capitalized words
fn capitalized_runs(text: &str) -> Vec<Vec<Word>> {
    let mut runs = Vec::new();
    let mut current: Vec<Word> = Vec::new();
    let mut pending: Vec<Word> = Vec::new();
    let mut prev_end: Option<usize> = None;

    let mut flush = |current: &mut Vec<Word>, pending: &mut Vec<Word>| {
        if !current.is_empty() {
            runs.push(std::mem::take(current));
        }
        pending.clear();
    };

    for m in token_regex().find_iter(text) {
        let token = m.as_str();
        let joined = prev_end.is_some_and(|end| is_horizontal_gap(&text[end..m.start()]));
        if !joined {
            flush(&mut current, &mut pending);
        }
        prev_end = Some(m.end());

        if is_capitalized(token) {
            let possessive = strip_possessive(token);
            let end = m.start() + possessive.map_or(token.len(), str::len);
            current.append(&mut pending);
            current.push(Word {
                start: m.start(),
                end,
                connector: false,
            });
            if possessive.is_some() {
                flush(&mut current, &mut pending);
                prev_end = None;
            }
        } else if !current.is_empty()
            && pending.len() < MAX_CONNECTOR_GAP
            && CONNECTORS.contains(&token)
        {
            pending.push(Word {
                start: m.start(),
                end: m.end(),
                connector: true,
            });
        } else {
            flush(&mut current, &mut pending);
        }
    }
    flush(&mut current, &mut pending);
    runs
}

fn push_sub_runs(text: &str, run: &[Word], rules: &SpanRules, out: &mut BTreeSet<(usize, usize)>) {
    for (i, first) in run.iter().enumerate() {
        if first.connector {
            continue;
        }
        for (offset, last) in run[i..].iter().take(rules.max_run_words).enumerate() {
            if last.connector {
                continue;
            }
            if offset == 0
                && rules
                    .ignored_words
                    .contains(&text[first.start..first.end].to_lowercase())
            {
                continue;
            }
            out.insert((first.start, last.end));
        }
    }
}

/// Candidate spans of `text`, deduplicated and ordered by position
pub(crate) fn candidate_spans(
    text: &str,
    markup: &[MarkupSpan],
    names: &NamePatterns,
    rules: &SpanRules,
) -> Vec<Range<usize>> {
    let mut spans = BTreeSet::new();

    for run in capitalized_runs(text) {
        push_sub_runs(text, &run, rules, &mut spans);
    }
    names.find_all(text, &mut spans);

    spans
        .into_iter()
        .filter(|&(start, end)| !markup.iter().any(|m| m.overlaps(start, end)))
        .filter(|&(start, end)| text[start..end].chars().count() >= rules.min_span_chars)
        .map(|(start, end)| start..end)
        .collect()
}
