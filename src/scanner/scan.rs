//! PageScanner: first-match document walk
//!
//! Walks text nodes in document order, applies the glossary matchers to each
//! eligible node, and stops at the first acceptable hit. Matchers are tried
//! in the fixed category order frozen at index build; within a category the
//! index's longest-first disambiguation picks the term.

use serde::{Deserialize, Serialize};

use crate::glossary::GlossaryIndex;
use crate::page::{is_scannable, PageDom};
use crate::scanner::result::{context_snippet, TermMatch, CONTEXT_WINDOW_CHARS};

// =============================================================================
// Types
// =============================================================================

/// Walk statistics for one scan invocation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScanStats {
    pub scan_us: u64,
    pub nodes_visited: usize,
    pub nodes_skipped: usize,
}

/// Result of a first-match walk.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScanOutcome {
    pub result: Option<TermMatch>,
    pub stats: ScanStats,
}

// =============================================================================
// PageScanner
// =============================================================================

/// Borrowing scanner over a compiled glossary index.
pub struct PageScanner<'a> {
    index: &'a GlossaryIndex,
}

impl<'a> PageScanner<'a> {
    pub fn new(index: &'a GlossaryIndex) -> Self {
        Self { index }
    }

    /// First match in document order.
    pub fn scan_first(&self, dom: &PageDom) -> ScanOutcome {
        self.scan_first_where(dom, |_, _| true)
    }

    /// First match in document order whose (category, pattern) the caller
    /// accepts. The rate-limiter passes its seen-set here so a page whose
    /// leading match was already notified can still surface a later, fresh
    /// term.
    pub fn scan_first_where(
        &self,
        dom: &PageDom,
        accept: impl Fn(&str, &str) -> bool,
    ) -> ScanOutcome {
        let started = instant::Instant::now();
        let mut stats = ScanStats::default();
        let mut result = None;

        'walk: for id in dom.text_nodes() {
            stats.nodes_visited += 1;
            if !is_scannable(dom, id) {
                stats.nodes_skipped += 1;
                continue;
            }
            let Some(text) = dom.text(id) else {
                stats.nodes_skipped += 1;
                continue;
            };
            if text.trim().is_empty() {
                stats.nodes_skipped += 1;
                continue;
            }

            for matcher in self.index.matchers() {
                let hit =
                    matcher.first_match_where(text, |pattern| accept(&matcher.category, pattern));
                if let Some(hit) = hit {
                    result = Some(TermMatch {
                        category: matcher.category.clone(),
                        phrase: hit.phrase,
                        pattern: hit.pattern,
                        context: context_snippet(text, hit.start, hit.end, CONTEXT_WINDOW_CHARS),
                        node: id,
                    });
                    break 'walk;
                }
            }
        }

        stats.scan_us = started.elapsed().as_micros() as u64;
        ScanOutcome { result, stats }
    }

    /// Every match on the page, in document order. Feeds DetectionResults
    /// aggregation; the highlight engine runs its own combined pass.
    pub fn collect_all(&self, dom: &PageDom) -> Vec<TermMatch> {
        let mut matches = Vec::new();

        for id in dom.text_nodes() {
            if !is_scannable(dom, id) {
                continue;
            }
            let Some(text) = dom.text(id) else {
                continue;
            };
            if text.trim().is_empty() {
                continue;
            }

            for matcher in self.index.matchers() {
                for hit in matcher.matches_in(text) {
                    matches.push(TermMatch {
                        category: matcher.category.clone(),
                        phrase: hit.phrase,
                        pattern: hit.pattern,
                        context: context_snippet(text, hit.start, hit.end, CONTEXT_WINDOW_CHARS),
                        node: id,
                    });
                }
            }
        }

        matches
    }
}

// =============================================================================
// Tests
// =============================================================================
