//! HighlightEngine: marker wrapping via Aho-Corasick
//!
//! One combined leftmost-longest, case-insensitive pass per text node wraps
//! every glossary occurrence in a `<mark>` element. Category and match index
//! are stored on the marker at creation time, so nothing ever needs to be
//! re-derived from highlighted text. Re-application is idempotent: marker
//! content is invisible to the eligibility filter, and `clear_all` restores
//! the exact pre-highlight text.

use aho_corasick::{AhoCorasick, AhoCorasickBuilder, MatchKind};
use serde::{Deserialize, Serialize};

use crate::glossary::GlossaryIndex;
use crate::page::{is_scannable, ElementData, NodeId, PageDom};

// =============================================================================
// Marker constants
// =============================================================================

pub const MARKER_TAG: &str = "mark";
pub const MARKER_CLASS: &str = "lg-term-highlight";
pub const MARKER_CATEGORY_ATTR: &str = "data-category";
pub const MARKER_INDEX_ATTR: &str = "data-match-index";

// =============================================================================
// Types
// =============================================================================

/// One marker created by `apply_all`, in document order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarkerInfo {
    /// The marker element in the page tree.
    pub node: NodeId,
    pub category: String,
    pub pattern: String,
    /// The wrapped text, page casing.
    pub phrase: String,
    /// Document-order index, also stored as `data-match-index`.
    pub match_index: usize,
}

/// Result of one highlight pass.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HighlightReport {
    /// Number of substrings wrapped by this pass.
    pub wrapped: usize,
    pub markers: Vec<MarkerInfo>,
    /// First marker of this pass; the host scrolls it into view.
    pub first_marker: Option<NodeId>,
}

#[derive(Debug, Clone)]
struct PatternMeta {
    category: String,
    pattern: String,
}

// =============================================================================
// HighlightEngine
// =============================================================================

pub struct HighlightEngine {
    automaton: Option<AhoCorasick>,
    meta: Vec<PatternMeta>,
}

impl HighlightEngine {
    /// Compile from every (category, pattern) pair of the glossary index.
    pub fn from_index(index: &GlossaryIndex) -> Result<Self, String> {
        Self::from_pairs(index.all_patterns())
    }

    /// Compile from explicit (category, pattern) pairs.
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Result<Self, String> {
        if pairs.is_empty() {
            return Ok(Self {
                automaton: None,
                meta: Vec::new(),
            });
        }

        let patterns: Vec<String> = pairs.iter().map(|(_, p)| p.to_lowercase()).collect();
        let meta = pairs
            .into_iter()
            .map(|(category, pattern)| PatternMeta { category, pattern })
            .collect();

        let automaton = AhoCorasickBuilder::new()
            .match_kind(MatchKind::LeftmostLongest)
            .ascii_case_insensitive(true)
            .build(&patterns)
            .map_err(|e| format!("failed to build highlight automaton: {}", e))?;

        Ok(Self {
            automaton: Some(automaton),
            meta,
        })
    }

    pub fn pattern_count(&self) -> usize {
        self.meta.len()
    }

    /// Wrap every occurrence across all eligible text nodes.
    ///
    /// Marker content fails the eligibility filter, so running this twice
    /// without an intervening `clear_all` wraps nothing the second time.
    pub fn apply_all(&self, dom: &mut PageDom) -> HighlightReport {
        let mut report = HighlightReport::default();
        let Some(automaton) = &self.automaton else {
            return report;
        };

        // Snapshot first: the walk splices nodes as it goes.
        let targets = dom.text_nodes();
        let mut match_index = 0usize;

        for id in targets {
            if !is_scannable(dom, id) {
                continue;
            }
            let Some(text) = dom.text(id).map(str::to_owned) else {
                continue;
            };

            let hits: Vec<(usize, usize, usize)> = automaton
                .find_iter(&text)
                .filter(|m| on_word_boundary(&text, m.start(), m.end()))
                .map(|m| (m.start(), m.end(), m.pattern().as_usize()))
                .collect();
            if hits.is_empty() {
                continue;
            }

            let mut replacements = Vec::with_capacity(hits.len() * 2 + 1);
            let mut cursor = 0usize;
            for (start, end, pattern_id) in hits {
                if start > cursor {
                    let lead = dom.new_text(&text[cursor..start]);
                    replacements.push(lead);
                }

                let meta = &self.meta[pattern_id];
                let mut data = ElementData::new(MARKER_TAG);
                data.attrs.insert("class".to_string(), MARKER_CLASS.to_string());
                data.attrs
                    .insert(MARKER_CATEGORY_ATTR.to_string(), meta.category.clone());
                data.attrs
                    .insert(MARKER_INDEX_ATTR.to_string(), match_index.to_string());
                let marker = dom.new_element(data);
                dom.append_text(marker, &text[start..end]);
                replacements.push(marker);

                report.markers.push(MarkerInfo {
                    node: marker,
                    category: meta.category.clone(),
                    pattern: meta.pattern.clone(),
                    phrase: text[start..end].to_string(),
                    match_index,
                });
                match_index += 1;
                cursor = end;
            }
            if cursor < text.len() {
                let tail = dom.new_text(&text[cursor..]);
                replacements.push(tail);
            }

            dom.replace_node(id, &replacements);
        }

        report.wrapped = report.markers.len();
        report.first_marker = report.markers.first().map(|m| m.node);
        report
    }
}

/// Approximate the original `\b` anchors: a hit counts only when not flanked
/// by word characters.
fn on_word_boundary(text: &str, start: usize, end: usize) -> bool {
    let is_word = |c: char| c.is_alphanumeric() || c == '_';
    let before_ok = text[..start].chars().next_back().map_or(true, |c| !is_word(c));
    let after_ok = text[end..].chars().next().map_or(true, |c| !is_word(c));
    before_ok && after_ok
}

fn is_marker(dom: &PageDom, id: NodeId) -> bool {
    dom.tag(id) == Some(MARKER_TAG)
        && dom
            .attr(id, "class")
            .is_some_and(|c| c.split_whitespace().any(|part| part == MARKER_CLASS))
}

/// Unwrap every marker, restoring its plain text, then merge adjacent text
/// nodes. Returns the number of markers removed.
pub fn clear_all(dom: &mut PageDom) -> usize {
    let markers: Vec<NodeId> = dom
        .elements_in_order()
        .into_iter()
        .filter(|&id| is_marker(dom, id))
        .collect();

    let mut cleared = 0;
    for marker in markers {
        let content = dom.subtree_text(marker);
        let text = dom.new_text(&content);
        if dom.replace_node(marker, &[text]) {
            cleared += 1;
        }
    }
    dom.normalize();
    cleared
}

/// Marker element carrying `data-match-index == index`, for the panel's
/// match navigation.
pub fn scroll_target(dom: &PageDom, index: usize) -> Option<NodeId> {
    let wanted = index.to_string();
    dom.elements_in_order()
        .into_iter()
        .find(|&id| is_marker(dom, id) && dom.attr(id, MARKER_INDEX_ATTR) == Some(wanted.as_str()))
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::glossary::GlossaryIndex;

    fn engine() -> HighlightEngine {
        let index = GlossaryIndex::from_json(
            r#"{
                "Data & Privacy": ["cookie", "third party"],
                "Legal Risks": ["indemnify"]
            }"#,
            Some("en"),
        )
        .unwrap();
        HighlightEngine::from_index(&index).unwrap()
    }

    fn page(texts: &[&str]) -> PageDom {
        let mut dom = PageDom::new();
        for text in texts {
            let p = dom.append_element(dom.root(), ElementData::new("p"));
            dom.append_text(p, text);
        }
        dom
    }

    // -------------------------------------------------------------------------
    // Requirement 1: Every occurrence is wrapped, in document order
    // -------------------------------------------------------------------------
    #[test]
    fn test_apply_all_wraps_everything() {
        let mut dom = page(&[
            "We use a Cookie and another cookie.",
            "You indemnify the third party.",
        ]);
        let report = engine().apply_all(&mut dom);

        assert_eq!(report.wrapped, 4);
        let phrases: Vec<&str> = report.markers.iter().map(|m| m.phrase.as_str()).collect();
        assert_eq!(phrases, vec!["Cookie", "cookie", "indemnify", "third party"]);
        let indices: Vec<usize> = report.markers.iter().map(|m| m.match_index).collect();
        assert_eq!(indices, vec![0, 1, 2, 3]);
    }

    // -------------------------------------------------------------------------
    // Requirement 2: Markers carry category metadata from creation
    // -------------------------------------------------------------------------
    #[test]
    fn test_marker_metadata() {
        let mut dom = page(&["indemnify"]);
        let report = engine().apply_all(&mut dom);

        let marker = report.markers[0].node;
        assert_eq!(dom.tag(marker), Some(MARKER_TAG));
        assert_eq!(dom.attr(marker, MARKER_CATEGORY_ATTR), Some("Legal Risks"));
        assert_eq!(dom.attr(marker, MARKER_INDEX_ATTR), Some("0"));
        assert_eq!(report.markers[0].pattern, "indemnify");
    }

    // -------------------------------------------------------------------------
    // Requirement 3: Text content is unchanged by wrapping
    // -------------------------------------------------------------------------
    #[test]
    fn test_wrapping_preserves_text() {
        let mut dom = page(&["We use a cookie to track the third party."]);
        let before = dom.text_content();
        engine().apply_all(&mut dom);
        assert_eq!(dom.text_content(), before);
    }

    // -------------------------------------------------------------------------
    // Requirement 4: Idempotence - a second pass wraps nothing
    // -------------------------------------------------------------------------
    #[test]
    fn test_apply_all_idempotent() {
        let mut dom = page(&["a cookie and an indemnify clause"]);
        let engine = engine();

        let first = engine.apply_all(&mut dom);
        assert_eq!(first.wrapped, 2);

        let second = engine.apply_all(&mut dom);
        assert_eq!(second.wrapped, 0);
    }

    // -------------------------------------------------------------------------
    // Requirement 5: clear_all round-trips the text exactly
    // -------------------------------------------------------------------------
    #[test]
    fn test_clear_all_round_trip() {
        let mut dom = page(&["We use a cookie. You indemnify us. cookie again."]);
        let before = dom.text_content();
        let engine = engine();

        let report = engine.apply_all(&mut dom);
        assert!(report.wrapped > 0);

        let cleared = clear_all(&mut dom);
        assert_eq!(cleared, report.wrapped);
        assert_eq!(dom.text_content(), before);

        // And the page is highlightable again
        let again = engine.apply_all(&mut dom);
        assert_eq!(again.wrapped, report.wrapped);
    }

    // -------------------------------------------------------------------------
    // Requirement 6: Word boundaries are honored
    // -------------------------------------------------------------------------
    #[test]
    fn test_word_boundaries() {
        let mut dom = page(&["supercookies are not a cookie match, cookies neither"]);
        let report = engine().apply_all(&mut dom);
        assert_eq!(report.wrapped, 1);
        assert_eq!(report.markers[0].phrase, "cookie");
    }

    // -------------------------------------------------------------------------
    // Requirement 7: Ineligible nodes are left alone
    // -------------------------------------------------------------------------
    #[test]
    fn test_skips_ineligible() {
        let mut dom = PageDom::new();
        let script = dom.append_element(dom.root(), ElementData::new("script"));
        dom.append_text(script, "cookie = readCookie('indemnify');");
        let report = engine().apply_all(&mut dom);
        assert_eq!(report.wrapped, 0);
    }

    // -------------------------------------------------------------------------
    // Requirement 8: scroll_target resolves match indices
    // -------------------------------------------------------------------------
    #[test]
    fn test_scroll_target() {
        let mut dom = page(&["cookie first", "indemnify second"]);
        let report = engine().apply_all(&mut dom);

        assert_eq!(scroll_target(&dom, 0), Some(report.markers[0].node));
        assert_eq!(scroll_target(&dom, 1), Some(report.markers[1].node));
        assert_eq!(scroll_target(&dom, 5), None);
        assert_eq!(report.first_marker, Some(report.markers[0].node));
    }

    // -------------------------------------------------------------------------
    // Requirement 9: Longest pattern wins on overlap
    // -------------------------------------------------------------------------
    #[test]
    fn test_leftmost_longest() {
        let engine = HighlightEngine::from_pairs(vec![
            ("Data & Privacy".to_string(), "party".to_string()),
            ("Data & Privacy".to_string(), "third party".to_string()),
        ])
        .unwrap();
        let mut dom = page(&["a third party appears"]);
        let report = engine.apply_all(&mut dom);
        assert_eq!(report.wrapped, 1);
        assert_eq!(report.markers[0].pattern, "third party");
    }

    // -------------------------------------------------------------------------
    // Requirement 10: An empty pattern set is inert
    // -------------------------------------------------------------------------
    #[test]
    fn test_empty_engine() {
        let engine = HighlightEngine::from_pairs(vec![]).unwrap();
        let mut dom = page(&["a cookie"]);
        let report = engine.apply_all(&mut dom);
        assert_eq!(report.wrapped, 0);
        assert!(report.first_marker.is_none());
    }
}
