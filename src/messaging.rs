//! Side-panel request/response dispatch
//!
//! Typed shapes for the messages the panel sends the content script, and a
//! dispatcher that never throws across the messaging boundary: unknown or
//! malformed requests come back as a structured failure.

use serde::{Deserialize, Serialize};

use crate::console;
use crate::highlight::{clear_all, scroll_target, HighlightEngine};
use crate::page::PageDom;
use crate::scanner::{PageScanContext, TermMatch};

// =============================================================================
// Shapes
// =============================================================================

/// Inbound panel message, discriminated by its `type` string.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PanelRequest {
    /// Wrap all glossary occurrences on the page.
    #[serde(rename = "HIGHLIGHT_ALL")]
    HighlightAll,

    /// Read the accumulated detection results.
    #[serde(rename = "GET_HIGHLIGHTED_TERMS")]
    GetHighlightedTerms,

    /// Resolve the marker for match `index` so the host can scroll to it.
    #[serde(rename = "SCROLL_TO_MATCH")]
    ScrollToMatch { index: usize },

    /// Unwrap all markers.
    #[serde(rename = "CLEAR_HIGHLIGHTS")]
    ClearHighlights,
}

/// Outbound response: `{ success, data?, error? }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PanelResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PanelResponse {
    pub fn ok(data: serde_json::Value) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn failure(message: &str) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.to_string()),
        }
    }
}

// =============================================================================
// Dispatch
// =============================================================================

/// Parse an inbound JSON message. The error string is already suitable for a
/// failure response.
pub fn parse_request(value: serde_json::Value) -> Result<PanelRequest, String> {
    serde_json::from_value(value).map_err(|e| format!("unsupported message: {}", e))
}

/// Handle one panel request against the page state. Infallible by design:
/// every outcome is a `PanelResponse`.
pub fn dispatch(
    ctx: &mut PageScanContext,
    engine: Option<&HighlightEngine>,
    dom: &mut PageDom,
    request: PanelRequest,
    now_ms: u64,
) -> PanelResponse {
    match request {
        PanelRequest::HighlightAll => {
            let Some(engine) = engine else {
                return PanelResponse::failure("scanning disabled on this page");
            };
            let report = engine.apply_all(dom);

            // Fold the pass into the page aggregate for the panel's summary
            let matches: Vec<TermMatch> = report
                .markers
                .iter()
                .map(|m| TermMatch {
                    category: m.category.clone(),
                    phrase: m.phrase.clone(),
                    pattern: m.pattern.clone(),
                    context: String::new(),
                    node: m.node,
                })
                .collect();
            ctx.record_matches(&matches, now_ms);

            match serde_json::to_value(&report) {
                Ok(data) => PanelResponse::ok(data),
                Err(e) => PanelResponse::failure(&format!("serialization failed: {}", e)),
            }
        }

        PanelRequest::GetHighlightedTerms => match serde_json::to_value(ctx.results()) {
            Ok(data) => PanelResponse::ok(data),
            Err(e) => PanelResponse::failure(&format!("serialization failed: {}", e)),
        },

        PanelRequest::ScrollToMatch { index } => match scroll_target(dom, index) {
            Some(node) => PanelResponse::ok(serde_json::json!({ "node": node.0 })),
            None => PanelResponse::failure(&format!("no match with index {}", index)),
        },

        PanelRequest::ClearHighlights => {
            let cleared = clear_all(dom);
            PanelResponse::ok(serde_json::json!({ "cleared": cleared }))
        }
    }
}

/// Parse-and-dispatch convenience for the bridge; malformed input becomes a
/// logged structured failure.
pub fn handle_message(
    ctx: &mut PageScanContext,
    engine: Option<&HighlightEngine>,
    dom: &mut PageDom,
    message: serde_json::Value,
    now_ms: u64,
) -> PanelResponse {
    match parse_request(message) {
        Ok(request) => dispatch(ctx, engine, dom, request, now_ms),
        Err(e) => {
            console::warn(&e);
            PanelResponse::failure(&e)
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
