//! Scan results and notification payloads
//!
//! `TermMatch` is what one scan produces; `DetectionResults` is the per-page
//! aggregate the side panel reads; `Notification` is the payload handed to
//! the presentation layer's toast sink.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::glossary::{icon_for, severity_for, Severity};
use crate::page::NodeId;

// =============================================================================
// Constants
// =============================================================================

/// Context window radius around a match, in characters.
pub const CONTEXT_WINDOW_CHARS: usize = 40;

// =============================================================================
// TermMatch
// =============================================================================

/// One glossary hit inside one text node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TermMatch {
    pub category: String,
    /// The text as it appeared on the page.
    pub phrase: String,
    /// The glossary pattern that matched.
    pub pattern: String,
    /// Surrounding text, whitespace-collapsed.
    pub context: String,
    /// The text node that contained the match.
    pub node: NodeId,
}

impl TermMatch {
    /// Dedup key for the seen-set: one notification per (category, pattern)
    /// per logical page.
    pub fn seen_key(&self) -> String {
        seen_key(&self.category, &self.pattern)
    }
}

/// Composite `category|pattern` key, case-folded on the pattern side.
pub fn seen_key(category: &str, pattern: &str) -> String {
    format!("{}|{}", category, pattern.to_lowercase())
}

/// Snippet of `window` characters either side of `[start, end)`, clipped to
/// the text run and whitespace-collapsed.
pub fn context_snippet(text: &str, start: usize, end: usize, window: usize) -> String {
    let from = text[..start]
        .char_indices()
        .rev()
        .nth(window.saturating_sub(1))
        .map(|(i, _)| i)
        .unwrap_or(0);
    let to = text[end..]
        .char_indices()
        .nth(window)
        .map(|(i, _)| end + i)
        .unwrap_or(text.len());

    text[from..to].split_whitespace().collect::<Vec<_>>().join(" ")
}

// =============================================================================
// DetectionResults
// =============================================================================

/// Per-page aggregate of everything detected so far, accumulated across
/// scans and highlight passes. Read-only to the presentation layer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DetectionResults {
    pub found_terms: Vec<TermMatch>,
    /// category -> matched phrases, in detection order.
    pub categories: BTreeMap<String, Vec<String>>,
    pub total_terms: usize,
    pub detected_at_ms: u64,
}

impl DetectionResults {
    pub fn record(&mut self, m: &TermMatch, now_ms: u64) {
        self.categories
            .entry(m.category.clone())
            .or_default()
            .push(m.phrase.clone());
        self.found_terms.push(m.clone());
        self.total_terms = self.found_terms.len();
        self.detected_at_ms = now_ms;
    }

    pub fn record_all(&mut self, matches: &[TermMatch], now_ms: u64) {
        for m in matches {
            self.record(m, now_ms);
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

// =============================================================================
// Notification
// =============================================================================

/// Payload for the notification sink. The core only decides whether and when
/// to emit one; rendering belongs to the host.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub title: String,
    pub message: String,
    pub category: String,
    pub severity: Severity,
    pub icon: String,
    /// Every glossary pattern, for a follow-up highlight-all action.
    pub patterns: Vec<String>,
}

impl Notification {
    pub fn from_match(m: &TermMatch, patterns: Vec<String>) -> Self {
        Self {
            title: format!("Keyword detected: {}", m.phrase),
            message: format!(
                "[{}] \u{201C}\u{2026} {} \u{2026}\u{201D}",
                m.category.replace('_', " "),
                m.context
            ),
            category: m.category.clone(),
            severity: severity_for(&m.category),
            icon: icon_for(&m.category).to_string(),
            patterns,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn term_match(category: &str, pattern: &str, phrase: &str) -> TermMatch {
        TermMatch {
            category: category.to_string(),
            phrase: phrase.to_string(),
            pattern: pattern.to_string(),
            context: String::new(),
            node: NodeId(0),
        }
    }

    // -------------------------------------------------------------------------
    // Requirement 1: Snippet takes the window either side, collapsed
    // -------------------------------------------------------------------------
    #[test]
    fn test_context_snippet_window() {
        let text = "aaaa  bbbb\n\ncccc indemnify dddd\t\teeee ffff";
        let start = text.find("indemnify").unwrap();
        let snippet = context_snippet(text, start, start + "indemnify".len(), 40);
        assert_eq!(snippet, "aaaa bbbb cccc indemnify dddd eeee ffff");
    }

    // -------------------------------------------------------------------------
    // Requirement 2: Snippet clips at the node bounds
    // -------------------------------------------------------------------------
    #[test]
    fn test_context_snippet_clipped() {
        let text = "indemnify";
        let snippet = context_snippet(text, 0, text.len(), 40);
        assert_eq!(snippet, "indemnify");
    }

    // -------------------------------------------------------------------------
    // Requirement 3: Snippet window counts characters, not bytes
    // -------------------------------------------------------------------------
    #[test]
    fn test_context_snippet_multibyte() {
        let text = "a\u{e9}\u{e9}\u{e9} term b\u{e9}\u{e9}";
        let start = text.find("term").unwrap();
        let snippet = context_snippet(text, start, start + 4, 2);
        assert_eq!(snippet, "\u{e9}\u{e9} term b");
    }

    // -------------------------------------------------------------------------
    // Requirement 4: Seen key folds pattern case, keeps category
    // -------------------------------------------------------------------------
    #[test]
    fn test_seen_key() {
        let m = term_match("Legal Risks", "Indemnify", "INDEMNIFY");
        assert_eq!(m.seen_key(), "Legal Risks|indemnify");
    }

    // -------------------------------------------------------------------------
    // Requirement 5: DetectionResults accumulates and resets
    // -------------------------------------------------------------------------
    #[test]
    fn test_detection_results_accumulate() {
        let mut results = DetectionResults::default();
        results.record(&term_match("Legal Risks", "indemnify", "indemnify"), 1000);
        results.record(&term_match("Legal Risks", "waiver", "Waiver"), 2000);
        results.record(&term_match("Data & Privacy", "cookie", "cookies"), 3000);

        assert_eq!(results.total_terms, 3);
        assert_eq!(results.detected_at_ms, 3000);
        assert_eq!(results.categories["Legal Risks"], vec!["indemnify", "Waiver"]);

        results.reset();
        assert_eq!(results.total_terms, 0);
        assert!(results.categories.is_empty());
    }

    // -------------------------------------------------------------------------
    // Requirement 6: Notification formats as the toast expects
    // -------------------------------------------------------------------------
    #[test]
    fn test_notification_format() {
        let mut m = term_match("Data & Privacy", "cookie", "Cookies");
        m.context = "we use Cookies to track".to_string();
        let n = Notification::from_match(&m, vec!["cookie".to_string()]);

        assert_eq!(n.title, "Keyword detected: Cookies");
        assert!(n.message.starts_with("[Data & Privacy]"));
        assert!(n.message.contains("we use Cookies to track"));
        assert_eq!(n.severity, Severity::High);
        assert_eq!(n.patterns, vec!["cookie"]);
    }

    // -------------------------------------------------------------------------
    // Requirement 7: Underscored category names read as words
    // -------------------------------------------------------------------------
    #[test]
    fn test_notification_category_underscores() {
        let m = term_match("Legal_Risks", "indemnify", "indemnify");
        let n = Notification::from_match(&m, vec![]);
        assert!(n.message.starts_with("[Legal Risks]"));
    }
}
