//! PageGuard: the content-script binding
//!
//! Owns the scan context, the highlight engine, and the current document
//! snapshot on the WASM side. The JS content script stays thin: it
//! snapshots the DOM, forwards MutationObserver/history events, arms a
//! timer for `nextDeadline`, and renders whatever `tick` returns.
//!
//! Timestamps come from `Date.now()` here; the core itself only ever sees
//! explicit milliseconds.

use wasm_bindgen::prelude::*;

use crate::console;
use crate::highlight::HighlightEngine;
use crate::messaging;
use crate::page::{NodeSnapshot, PageDom};
use crate::rewrite::{reconstruct_paragraphs, ParagraphConfig};
use crate::scanner::{GuardConfig, PageScanContext};

#[wasm_bindgen]
pub struct PageGuard {
    ctx: PageScanContext,
    engine: Option<HighlightEngine>,
    dom: PageDom,
}

#[wasm_bindgen]
impl PageGuard {
    /// Create a guard with an optional JSON configuration object.
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<PageGuard, JsValue> {
        let config: GuardConfig = if config.is_null() || config.is_undefined() {
            GuardConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config)
                .map_err(|e| JsValue::from_str(&format!("Invalid config: {}", e)))?
        };

        Ok(Self {
            ctx: PageScanContext::new(config),
            engine: None,
            dom: PageDom::new(),
        })
    }

    fn now_ms() -> u64 {
        js_sys::Date::now() as u64
    }

    // -------------------------------------------------------------------------
    // Setup
    // -------------------------------------------------------------------------

    /// Load the glossary JSON (either shape) and compile the matchers plus
    /// the highlight automaton. Returns the number of compiled patterns;
    /// 0 means scanning is disabled for this page.
    #[wasm_bindgen(js_name = loadGlossary)]
    pub fn load_glossary(&mut self, json: &str) -> usize {
        let count = self.ctx.load_glossary(json);
        self.engine = self.ctx.index().and_then(|index| {
            HighlightEngine::from_index(index)
                .map_err(|e| console::warn(&e))
                .ok()
        });
        count
    }

    /// Replace the document snapshot the core scans and highlights.
    #[wasm_bindgen(js_name = setDocument)]
    pub fn set_document(&mut self, snapshot: JsValue) -> Result<(), JsValue> {
        let snapshot: NodeSnapshot = serde_wasm_bindgen::from_value(snapshot)
            .map_err(|e| JsValue::from_str(&format!("Invalid snapshot: {}", e)))?;
        self.dom = PageDom::from_snapshot(&snapshot);
        Ok(())
    }

    #[wasm_bindgen(js_name = setMuted)]
    pub fn set_muted(&mut self, muted: bool) {
        self.ctx.set_muted(muted);
    }

    #[wasm_bindgen(js_name = scanningEnabled)]
    pub fn scanning_enabled(&self) -> bool {
        self.ctx.scanning_enabled()
    }

    // -------------------------------------------------------------------------
    // Events
    // -------------------------------------------------------------------------

    #[wasm_bindgen(js_name = documentReady)]
    pub fn document_ready(&mut self) {
        self.ctx.handle_document_ready(Self::now_ms());
    }

    /// Forward a MutationObserver batch; `added_chars` is the visible text
    /// length the batch added.
    #[wasm_bindgen(js_name = mutationObserved)]
    pub fn mutation_observed(&mut self, added_chars: usize) {
        self.ctx.handle_mutation(added_chars, Self::now_ms());
    }

    /// Forward an observed URL (history hook, popstate, initial load).
    /// Returns true when this was a logical navigation and page state was
    /// reset.
    #[wasm_bindgen(js_name = urlChanged)]
    pub fn url_changed(&mut self, url: &str) -> bool {
        self.ctx.handle_navigation(url, Self::now_ms())
    }

    /// When the host should call `tick` next, as a `Date.now()` timestamp.
    #[wasm_bindgen(js_name = nextDeadline)]
    pub fn next_deadline(&self) -> Option<f64> {
        self.ctx.next_deadline_ms().map(|ms| ms as f64)
    }

    /// Run the scan pipeline if due. Returns a notification payload for the
    /// toast, or null.
    #[wasm_bindgen(js_name = tick)]
    pub fn tick(&mut self) -> JsValue {
        match self.ctx.tick(&self.dom, Self::now_ms()) {
            Some(notification) => {
                serde_wasm_bindgen::to_value(&notification).unwrap_or(JsValue::NULL)
            }
            None => JsValue::NULL,
        }
    }

    // -------------------------------------------------------------------------
    // Panel messages
    // -------------------------------------------------------------------------

    /// Handle one inbound panel message; always returns a
    /// `{ success, data?, error? }` response object.
    #[wasm_bindgen(js_name = handleMessage)]
    pub fn handle_message(&mut self, message: JsValue) -> JsValue {
        let value: serde_json::Value =
            serde_wasm_bindgen::from_value(message).unwrap_or(serde_json::Value::Null);
        let response = messaging::handle_message(
            &mut self.ctx,
            self.engine.as_ref(),
            &mut self.dom,
            value,
            Self::now_ms(),
        );
        serde_wasm_bindgen::to_value(&response).unwrap_or(JsValue::NULL)
    }

    /// Convenience for the toast's highlight action: wrap everything and
    /// return the highlight report.
    #[wasm_bindgen(js_name = highlightAll)]
    pub fn highlight_all(&mut self) -> JsValue {
        let response = messaging::dispatch(
            &mut self.ctx,
            self.engine.as_ref(),
            &mut self.dom,
            messaging::PanelRequest::HighlightAll,
            Self::now_ms(),
        );
        serde_wasm_bindgen::to_value(&response).unwrap_or(JsValue::NULL)
    }

    /// The accumulated per-page detection results.
    #[wasm_bindgen(js_name = detectionResults)]
    pub fn detection_results(&self) -> JsValue {
        serde_wasm_bindgen::to_value(self.ctx.results()).unwrap_or(JsValue::NULL)
    }

    // -------------------------------------------------------------------------
    // Persistence
    // -------------------------------------------------------------------------

    /// Seen keys for the host's page-lifetime store (sessionStorage).
    #[wasm_bindgen(js_name = exportSeen)]
    pub fn export_seen(&self) -> Vec<String> {
        self.ctx.export_seen()
    }

    #[wasm_bindgen(js_name = restoreSeen)]
    pub fn restore_seen(&mut self, keys: Vec<String>) {
        self.ctx.restore_seen(keys);
    }
}

/// Paragraph reconstruction for the rewrite flow: the host splits selection
/// text here, then drives its async rewriter session per paragraph.
#[wasm_bindgen(js_name = reconstructParagraphs)]
pub fn reconstruct_paragraphs_js(text: &str) -> Vec<String> {
    reconstruct_paragraphs(text, &ParagraphConfig::default())
}
