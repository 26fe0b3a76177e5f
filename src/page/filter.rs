//! Visibility & eligibility filter
//!
//! Pure predicate deciding whether a node may be scanned. Evaluated per text
//! node on every scan, so it must not allocate or mutate anything beyond the
//! ancestor walk.

use super::{NodeId, PageDom};
use crate::highlight::{MARKER_CLASS, MARKER_TAG};

/// Tags whose text is never scanned.
pub const SKIP_TAGS: [&str; 7] = [
    "script", "style", "noscript", "template", "textarea", "input", "select",
];

fn is_marker(dom: &PageDom, el: NodeId) -> bool {
    dom.tag(el) == Some(MARKER_TAG)
        && dom
            .attr(el, "class")
            .is_some_and(|c| c.split_whitespace().any(|part| part == MARKER_CLASS))
}

/// True when `node` is eligible for scanning.
///
/// A node is scannable iff its nearest element ancestor exists and, walking
/// up the chain, no ancestor is a skipped tag, editable, `display:none`, or
/// a highlight marker; and the nearest element itself is not
/// `visibility:hidden` and has a nonzero rendered box.
pub fn is_scannable(dom: &PageDom, node: NodeId) -> bool {
    let Some(nearest) = dom.nearest_element(node) else {
        return false;
    };

    for ancestor in dom.ancestor_elements(node) {
        let Some(data) = dom.element(ancestor) else {
            return false;
        };
        let tag = data.tag.to_lowercase();
        if SKIP_TAGS.contains(&tag.as_str()) {
            return false;
        }
        if data.content_editable || data.display_none {
            return false;
        }
        if is_marker(dom, ancestor) {
            return false;
        }
    }

    let Some(data) = dom.element(nearest) else {
        return false;
    };
    if data.visibility_hidden {
        return false;
    }
    if data.width <= 0.0 || data.height <= 0.0 {
        return false;
    }

    true
}

/// Concatenated text of all scannable text nodes, in document order.
/// Feeds the content signature, so churn in invisible regions cannot
/// trigger rescans.
pub fn visible_text(dom: &PageDom) -> String {
    let mut out = String::new();
    for id in dom.text_nodes() {
        if !is_scannable(dom, id) {
            continue;
        }
        if let Some(text) = dom.text(id) {
            if !out.is_empty() {
                out.push(' ');
            }
            out.push_str(text);
        }
    }
    out
}

// =============================================================================
// Tests
// =============================================================================
