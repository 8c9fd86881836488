//! Inline reference markup: `@[display text](category:id)`.
//!
//! Accepted mentions are rewritten into this form so later detection passes
//! treat them as already linked. A `]` or `\` inside the display text is
//! escaped with a backslash. Inside the category and id, `\`, `(`, `)`, `:`
//! and whitespace are escaped the same way.

use regex::Regex;
use serde::Serialize;
use std::collections::BTreeSet;
use std::sync::OnceLock;
use worldlink_model::{Category, ElementId};

const MARKUP_PATTERN: &str =
    r"(?s)@\[((?:[^\]\\]|\\.)*)\]\(((?:[^\s():\\]|\\.)+):((?:[^\s()\\]|\\.)+)\)";

fn markup_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(MARKUP_PATTERN).expect("markup pattern is valid"))
}

/// One markup occurrence in a text (byte offsets)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MarkupSpan {
    pub start: usize,
    pub end: usize,
    /// Unescaped display text
    pub display: String,
    pub category: Category,
    pub element_id: ElementId,
}

impl MarkupSpan {
    /// True when `[start, end)` intersects this markup
    #[must_use]
    pub fn overlaps(&self, start: usize, end: usize) -> bool {
        start < self.end && self.start < end
    }
}

/// All markup spans in `text`, in order of appearance
#[must_use]
pub fn parse(text: &str) -> Vec<MarkupSpan> {
    markup_regex()
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            Some(MarkupSpan {
                start: whole.start(),
                end: whole.end(),
                display: unescape(caps.get(1)?.as_str()),
                category: Category::new(unescape(caps.get(2)?.as_str())),
                element_id: unescape(caps.get(3)?.as_str()),
            })
        })
        .collect()
}

/// Ids embedded in markup anywhere in `text`
#[must_use]
pub fn linked_ids(text: &str) -> BTreeSet<ElementId> {
    parse(text).into_iter().map(|span| span.element_id).collect()
}

/// Render markup for `display` pointing at `id`
#[must_use]
pub fn render(display: &str, category: &Category, id: &str) -> String {
    format!(
        "@[{}]({}:{})",
        escape_display(display),
        escape_reference(category.as_str()),
        escape_reference(id)
    )
}

/// Text with every markup span replaced by its display text
#[must_use]
pub fn plain_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut cursor = 0;
    for span in parse(text) {
        out.push_str(&text[cursor..span.start]);
        out.push_str(&span.display);
        cursor = span.end;
    }
    out.push_str(&text[cursor..]);
    out
}

fn escape_display(display: &str) -> String {
    let mut out = String::with_capacity(display.len());
    for ch in display.chars() {
        if ch == '\\' || ch == ']' {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

fn escape_reference(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        if matches!(ch, '\\' | '(' | ')' | ':') || ch.is_whitespace() {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(ch) = chars.next() {
        if ch == '\\' {
            if let Some(next) = chars.next() {
                out.push(next);
                continue;
            }
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_markup() {
        let text = "Then @[Alice](character:chr4Hd8sN2vQe6Yb) went to @[Town Square](location:locA).";
        let spans = parse(text);

        assert_eq!(spans.len(), 2);
        assert_eq!(spans[0].display, "Alice");
        assert_eq!(spans[0].category.as_str(), "character");
        assert_eq!(spans[0].element_id, "chr4Hd8sN2vQe6Yb");
        assert_eq!(&text[spans[1].start..spans[1].end], "@[Town Square](location:locA)");
    }

    #[test]
    fn test_render_escapes_brackets() {
        let rendered = render("The [Lost] Sword", &Category::new("item"), "itm1");
        assert_eq!(rendered, r"@[The [Lost\] Sword](item:itm1)");

        let spans = parse(&rendered);
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].display, "The [Lost] Sword");
        assert_eq!(spans[0].end, rendered.len());
    }

    #[test]
    fn test_incomplete_markup_ignored() {
        assert!(parse("@[Alice] and @[Bob](character) and [Carol](character:c3)").is_empty());
    }

    #[test]
    fn test_linked_ids_and_plain_text() {
        let text = "@[Alice](character:c1) met @[Bob](character:c2) and @[Ally](character:c1)";
        let ids: Vec<_> = linked_ids(text).into_iter().collect();
        assert_eq!(ids, vec!["c1", "c2"]);
        assert_eq!(plain_text(text), "Alice met Bob and Ally");
    }

    #[test]
    fn test_non_ascii_category_round_trips() {
        let category = Category::new("Lieu Célèbre");
        let rendered = render("Paris", &category, "p1");
        assert_eq!(rendered, "@[Paris](lieu_célèbre:p1)");

        let spans = parse(&rendered);
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].category, category);
        assert_eq!(spans[0].element_id, "p1");
        assert_eq!(spans[0].end, rendered.len());
    }

    #[test]
    fn test_ids_with_delimiters_round_trip() {
        let location = Category::new("location");
        for id in ["p 1", "p(1)", "p:1", r"p\1", "p)1\n"] {
            let rendered = render("Paris", &location, id);
            let spans = parse(&format!("At {rendered} today."));
            assert_eq!(spans.len(), 1, "{rendered}");
            assert_eq!(spans[0].element_id, id);
            assert_eq!(spans[0].display, "Paris");
        }
        assert_eq!(render("Paris", &location, "p(1)"), r"@[Paris](location:p\(1\))");
    }

    #[test]
    fn test_overlaps() {
        let span = &parse("xx @[Bob](character:c2)")[0];
        assert!(span.overlaps(0, 4));
        assert!(!span.overlaps(0, 3));
        assert!(span.overlaps(10, 30));
    }
}
