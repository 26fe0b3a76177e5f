//! GlossaryIndex: compiled per-category term matchers
//!
//! Each category compiles to a single case-insensitive, word-anchored
//! alternation with its terms ordered longest-first, so the more specific
//! term wins when several could match the same text. The regex engine is
//! non-backtracking, so the combined alternation stays linear-time even for
//! large glossaries.

use regex::Regex;

use super::{filter_by_language, normalize, GlossaryEntry, GlossaryError};
use crate::console;

// =============================================================================
// Types
// =============================================================================

/// One glossary term with its standalone word-boundary probe.
#[derive(Debug)]
pub struct TermPattern {
    pub text: String,
    probe: Regex,
}

impl TermPattern {
    fn build(category: &str, term: &str) -> Result<Self, GlossaryError> {
        let probe = Regex::new(&format!(r"(?i)\b{}\b", regex::escape(term))).map_err(|e| {
            GlossaryError::BadPattern {
                category: category.to_string(),
                message: e.to_string(),
            }
        })?;
        Ok(Self {
            text: term.to_string(),
            probe,
        })
    }

    /// First occurrence of this term in `text`, as byte offsets.
    pub fn find(&self, text: &str) -> Option<(usize, usize)> {
        self.probe.find(text).map(|m| (m.start(), m.end()))
    }
}

/// A resolved hit inside one text run.
#[derive(Debug, Clone, PartialEq)]
pub struct PatternHit {
    /// The glossary pattern that matched (index casing).
    pub pattern: String,
    /// The text as it appeared on the page.
    pub phrase: String,
    pub start: usize,
    pub end: usize,
}

/// All terms of one category, compiled. Immutable after construction.
#[derive(Debug)]
pub struct CategoryMatcher {
    pub category: String,
    patterns: Vec<TermPattern>,
    combined: Regex,
}

impl CategoryMatcher {
    fn build(category: String, mut terms: Vec<String>) -> Result<Self, GlossaryError> {
        // Longest-first so greedy alternation prefers the specific term
        terms.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));

        let alternation = terms
            .iter()
            .map(|t| regex::escape(t))
            .collect::<Vec<_>>()
            .join("|");
        let combined =
            Regex::new(&format!(r"(?i)\b(?:{})\b", alternation)).map_err(|e| {
                GlossaryError::BadPattern {
                    category: category.clone(),
                    message: e.to_string(),
                }
            })?;

        let patterns = terms
            .iter()
            .map(|term| TermPattern::build(&category, term))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            category,
            patterns,
            combined,
        })
    }

    pub fn patterns(&self) -> &[TermPattern] {
        &self.patterns
    }

    /// Cheap gate: does any term of this category occur in `text`?
    pub fn is_match(&self, text: &str) -> bool {
        self.combined.is_match(text)
    }

    /// Resolve the winning term for `text`.
    ///
    /// The combined alternation only gates; the actual winner is found by
    /// re-testing each term in longest-first order, so a longer term beats a
    /// shorter one even when the shorter occurs earlier in the text.
    pub fn first_match(&self, text: &str) -> Option<PatternHit> {
        if let Some(hit) = self.first_match_where(text, |_| true) {
            return Some(hit);
        }
        // Combined and per-term probes are built from the same escaped terms,
        // so a gate hit always resolves; fall back to the raw match anyway.
        self.combined.find(text).map(|m| PatternHit {
            pattern: m.as_str().to_string(),
            phrase: m.as_str().to_string(),
            start: m.start(),
            end: m.end(),
        })
    }

    /// Like `first_match`, but only considers terms the caller accepts.
    /// Used by the scanner to look past already-notified terms.
    pub fn first_match_where(
        &self,
        text: &str,
        accept: impl Fn(&str) -> bool,
    ) -> Option<PatternHit> {
        if !self.combined.is_match(text) {
            return None;
        }
        for pattern in &self.patterns {
            if !accept(&pattern.text) {
                continue;
            }
            if let Some((start, end)) = pattern.find(text) {
                return Some(PatternHit {
                    pattern: pattern.text.clone(),
                    phrase: text[start..end].to_string(),
                    start,
                    end,
                });
            }
        }
        None
    }

    /// Every non-overlapping occurrence of this category's terms in `text`,
    /// in text order, each resolved to its glossary pattern.
    pub fn matches_in(&self, text: &str) -> Vec<PatternHit> {
        self.combined
            .find_iter(text)
            .map(|m| {
                let pattern = self
                    .patterns
                    .iter()
                    .find(|p| {
                        p.probe
                            .find_at(text, m.start())
                            .is_some_and(|hit| hit.start() == m.start() && hit.end() == m.end())
                    })
                    .map(|p| p.text.clone())
                    .unwrap_or_else(|| m.as_str().to_string());
                PatternHit {
                    pattern,
                    phrase: m.as_str().to_string(),
                    start: m.start(),
                    end: m.end(),
                }
            })
            .collect()
    }
}

// =============================================================================
// GlossaryIndex
// =============================================================================

/// Compiled glossary: one matcher per category, in a fixed order.
///
/// Flat glossaries keep source category order; legacy ones arrive
/// alphabetical. The order is frozen here and used as the scan tie-break.
#[derive(Debug)]
pub struct GlossaryIndex {
    matchers: Vec<CategoryMatcher>,
    pattern_count: usize,
}

impl GlossaryIndex {
    /// Build from raw entries, filtering by page language first.
    ///
    /// Returns `NoUsableEntries` when nothing survives; callers treat that as
    /// "scanning disabled for this page".
    pub fn build(
        entries: Vec<GlossaryEntry>,
        page_language: Option<&str>,
    ) -> Result<Self, GlossaryError> {
        let filtered = filter_by_language(entries, page_language);
        let (kept, dropped) = normalize(filtered);
        if dropped > 0 {
            console::warn(&format!("glossary: dropped {} unusable entries", dropped));
        }
        if kept.is_empty() {
            return Err(GlossaryError::NoUsableEntries);
        }

        // Group by category, preserving first-appearance order
        let mut order: Vec<String> = Vec::new();
        let mut grouped: std::collections::HashMap<String, Vec<String>> =
            std::collections::HashMap::new();
        for entry in kept {
            if !grouped.contains_key(&entry.category) {
                order.push(entry.category.clone());
            }
            grouped.entry(entry.category).or_default().push(entry.term);
        }

        let mut matchers = Vec::with_capacity(order.len());
        let mut pattern_count = 0;
        for category in order {
            let terms = grouped.remove(&category).unwrap_or_default();
            pattern_count += terms.len();
            matchers.push(CategoryMatcher::build(category, terms)?);
        }

        Ok(Self {
            matchers,
            pattern_count,
        })
    }

    /// Parse JSON (either shape) and build in one step.
    pub fn from_json(json: &str, page_language: Option<&str>) -> Result<Self, GlossaryError> {
        let entries = super::parse_glossary(json)?;
        Self::build(entries, page_language)
    }

    pub fn matchers(&self) -> &[CategoryMatcher] {
        &self.matchers
    }

    pub fn category_count(&self) -> usize {
        self.matchers.len()
    }

    pub fn pattern_count(&self) -> usize {
        self.pattern_count
    }

    /// Every (category, pattern) pair, in index order. Feeds the highlight
    /// engine and the notification payload.
    pub fn all_patterns(&self) -> Vec<(String, String)> {
        self.matchers
            .iter()
            .flat_map(|m| {
                m.patterns
                    .iter()
                    .map(|p| (m.category.clone(), p.text.clone()))
            })
            .collect()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn index(json: &str) -> GlossaryIndex {
        GlossaryIndex::from_json(json, Some("en")).unwrap()
    }

    // -------------------------------------------------------------------------
    // Requirement 1: Word-anchored, case-insensitive matching
    // -------------------------------------------------------------------------
    #[test]
    fn test_word_boundary_case_insensitive() {
        let idx = index(r#"{ "Legal Risks": ["indemnify"] }"#);
        let m = &idx.matchers()[0];

        assert!(m.is_match("You agree to INDEMNIFY the Company"));
        assert!(m.is_match("indemnify."));
        // Substring inside a larger word must not match
        assert!(!m.is_match("preindemnifying"));
    }

    // -------------------------------------------------------------------------
    // Requirement 2: Longest term wins
    // -------------------------------------------------------------------------
    #[test]
    fn test_longest_term_wins() {
        let idx = index(r#"{ "Data & Privacy": ["third party", "third party beneficiary"] }"#);
        let hit = idx.matchers()[0]
            .first_match("a third party beneficiary may enforce")
            .unwrap();
        assert_eq!(hit.pattern, "third party beneficiary");
    }

    // -------------------------------------------------------------------------
    // Requirement 3: Longer term beats an earlier shorter one
    // -------------------------------------------------------------------------
    #[test]
    fn test_longer_term_beats_earlier_shorter() {
        let idx = index(r#"{ "Payment": ["fee", "non-refundable fee"] }"#);
        let hit = idx.matchers()[0]
            .first_match("the fee is a non-refundable fee")
            .unwrap();
        assert_eq!(hit.pattern, "non-refundable fee");
        assert_eq!(hit.start, 13);
    }

    // -------------------------------------------------------------------------
    // Requirement 4: Matched phrase keeps page casing
    // -------------------------------------------------------------------------
    #[test]
    fn test_phrase_keeps_page_casing() {
        let idx = index(r#"{ "Legal Risks": ["indemnify"] }"#);
        let hit = idx.matchers()[0].first_match("You must Indemnify us").unwrap();
        assert_eq!(hit.phrase, "Indemnify");
        assert_eq!(hit.pattern, "indemnify");
    }

    // -------------------------------------------------------------------------
    // Requirement 5: Regex metacharacters in terms are escaped
    // -------------------------------------------------------------------------
    #[test]
    fn test_metacharacters_escaped() {
        let idx = index(r#"{ "Payment": ["click-wrap agreement", "fees."] }"#);
        let m = &idx.matchers()[0];
        assert!(m.is_match("Any click-wrap agreement is binding"));
        // The '-' and '.' are literals, not regex operators
        assert!(!m.is_match("click wrap agreement"));
        assert!(!m.is_match("feesX"));
    }

    // -------------------------------------------------------------------------
    // Requirement 6: Zero surviving entries refuses to build
    // -------------------------------------------------------------------------
    #[test]
    fn test_empty_glossary_refuses_build() {
        let result = GlossaryIndex::from_json(r#"{ "Legal Risks": ["  "] }"#, Some("en"));
        assert!(matches!(result, Err(GlossaryError::NoUsableEntries)));

        let entries = vec![GlossaryEntry::with_language("vertraulich", "Legal", "de")];
        let result = GlossaryIndex::build(entries, Some("fr"));
        assert!(matches!(result, Err(GlossaryError::NoUsableEntries)));
    }

    // -------------------------------------------------------------------------
    // Requirement 7: Category order is frozen at build time
    // -------------------------------------------------------------------------
    #[test]
    fn test_flat_category_order_preserved() {
        let json = r#"[
            { "term": "cookie", "category": "Data & Privacy" },
            { "term": "indemnify", "category": "Legal Risks" },
            { "term": "tracking", "category": "Data & Privacy" }
        ]"#;
        let idx = index(json);
        let categories: Vec<&str> = idx.matchers().iter().map(|m| m.category.as_str()).collect();
        assert_eq!(categories, vec!["Data & Privacy", "Legal Risks"]);
        assert_eq!(idx.pattern_count(), 3);
    }

    // -------------------------------------------------------------------------
    // Requirement 8: all_patterns lists every pair in index order
    // -------------------------------------------------------------------------
    #[test]
    fn test_all_patterns() {
        let idx = index(r#"{ "A": ["alpha"], "B": ["beta", "beta max"] }"#);
        let pairs = idx.all_patterns();
        assert_eq!(pairs.len(), 3);
        assert_eq!(pairs[0], ("A".to_string(), "alpha".to_string()));
        // Within B, longest-first ordering
        assert_eq!(pairs[1].1, "beta max");
    }

    // -------------------------------------------------------------------------
    // Requirement 9: Language filter applies before compilation
    // -------------------------------------------------------------------------
    #[test]
    fn test_language_filter_applies() {
        let json = r#"[
            { "term": "indemnify", "category": "Legal Risks", "language": "en" },
            { "term": "vertraulich", "category": "Legal Risks", "language": "de" }
        ]"#;
        let idx = GlossaryIndex::from_json(json, Some("en-GB")).unwrap();
        assert_eq!(idx.pattern_count(), 1);
        assert!(!idx.matchers()[0].is_match("vertraulich"));
    }
}
