use nucleo_matcher::pattern::{CaseMatching, Normalization, Pattern};
use nucleo_matcher::{Matcher, Utf32String};
use worldlink_model::{Category, Element};

/// Interactive fuzzy lookup of elements by name, for manual link pickers
pub struct ElementSearch {
    matcher: Matcher,
}

impl ElementSearch {
    pub fn new() -> Self {
        Self {
            matcher: Matcher::new(nucleo_matcher::Config::DEFAULT),
        }
    }

    /// Elements whose name fuzzy-matches `query`, optionally restricted to
    /// one category. Returns (element, score) sorted by score descending,
    /// with scores normalized to the best hit.
    pub fn search<'a>(
        &mut self,
        query: &str,
        elements: impl IntoIterator<Item = &'a Element>,
        category: Option<&Category>,
        limit: usize,
    ) -> Vec<(&'a Element, f32)> {
        if query.trim().is_empty() || limit == 0 {
            return Vec::new();
        }

        let pattern = Pattern::parse(query, CaseMatching::Smart, Normalization::Smart);

        let mut scored: Vec<(&'a Element, u32)> = elements
            .into_iter()
            .filter(|element| category.is_none_or(|c| &element.category == c))
            .filter_map(|element| {
                let haystack = Utf32String::from(element.name.as_str());
                let score = pattern.score(haystack.slice(..), &mut self.matcher)?;
                Some((element, score))
            })
            .collect();

        scored.sort_by(|a, b| {
            b.1.cmp(&a.1)
                .then_with(|| a.0.name.cmp(&b.0.name))
                .then_with(|| a.0.id.cmp(&b.0.id))
        });
        scored.truncate(limit);

        // Normalize scores to 0-1 range (nucleo scores are u32)
        let max_score = scored.first().map(|(_, s)| *s as f32).unwrap_or(1.0);

        scored
            .into_iter()
            .map(|(element, score)| {
                let normalized = if max_score > 0.0 {
                    score as f32 / max_score
                } else {
                    0.0
                };
                (element, normalized)
            })
            .collect()
    }
}

impl Default for ElementSearch {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn elements() -> Vec<Element> {
        vec![
            Element::new("l1", "Town Square", "location"),
            Element::new("l2", "Tower of Dawn", "location"),
            Element::new("c1", "Tobias", "character"),
            Element::new("c2", "Alice", "character"),
        ]
    }

    #[test]
    fn test_search_ranks_best_first() {
        let elements = elements();
        let mut search = ElementSearch::new();
        let results = search.search("town sq", &elements, None, 5);

        assert!(!results.is_empty());
        assert_eq!(results[0].0.id, "l1");
        assert_eq!(results[0].1, 1.0);
    }

    #[test]
    fn test_search_category_filter() {
        let elements = elements();
        let mut search = ElementSearch::new();
        let results = search.search("to", &elements, Some(&Category::new("character")), 5);

        let ids: Vec<_> = results.iter().map(|(e, _)| e.id.as_str()).collect();
        assert_eq!(ids, vec!["c1"]);
    }

    #[test]
    fn test_empty_query() {
        let elements = elements();
        assert!(ElementSearch::new().search("  ", &elements, None, 5).is_empty());
    }
}
