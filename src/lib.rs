//! ClauseCore: Legal-Term Page Scanner
//!
//! A Rust/WASM implementation of the LegalGuard content-script core.
//!
//! # Architecture
//!
//! ## Glossary
//! - `glossary/entry.rs` - Glossary loading: both JSON shapes, language filter, dedupe
//! - `glossary/index.rs` - GlossaryIndex: one compiled matcher per category
//! - `glossary/taxonomy.rs` - Category severity/icon lookup
//!
//! ## Page model
//! - `page/dom.rs` - PageDom: arena snapshot of the page's element/text tree
//! - `page/filter.rs` - Eligibility predicate (visible, not script/style/editable)
//!
//! ## Scanning pipeline
//! - `scanner/scan.rs` - PageScanner: first-match walk with context snippets
//! - `scanner/limiter.rs` - NotificationGate: seen-set + per-page cap + cooldown
//! - `scanner/signature.rs` - SignatureTracker: visible-text fingerprint skip detection
//! - `scanner/scheduler.rs` - ScanScheduler: debounce + minimum scan interval
//! - `scanner/context.rs` - PageScanContext: per-injection conductor
//!
//! ## Surfaces
//! - `navigation.rs` - PageKey minting and logical-navigation detection
//! - `highlight.rs` - HighlightEngine: marker wrapping via Aho-Corasick
//! - `messaging.rs` - Side-panel request/response dispatch
//! - `rewrite.rs` - Plain-language rewrite driver over an injected capability
//! - `wasm.rs` - PageGuard: the content-script binding
//!
//! # Usage (WASM)
//! ```javascript,ignore
//! import init, { PageGuard } from 'clausecore';
//!
//! await init();
//!
//! const guard = new PageGuard(null);
//! guard.loadGlossary(glossaryJson, navigator.language);
//! guard.setDocument(snapshotOf(document.body));
//! guard.documentReady();
//!
//! // MutationObserver callback:
//! guard.mutationObserved(addedTextLength);
//!
//! // Debounce timer callback:
//! const notification = guard.tick();
//! if (notification) renderToast(notification);
//! ```

pub mod console;
pub mod glossary;
pub mod highlight;
pub mod messaging;
pub mod navigation;
pub mod page;
pub mod rewrite;
pub mod scanner;
pub mod wasm;

pub use glossary::*;
pub use highlight::*;
pub use navigation::*;
pub use page::*;
pub use scanner::*;

use wasm_bindgen::prelude::*;

// When the `wee_alloc` feature is enabled, use `wee_alloc` as the global
// allocator for smaller WASM bundle size.
#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

/// Initialize panic hook for better error messages in browser console
#[wasm_bindgen(start)]
pub fn main() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Get version information
#[wasm_bindgen]
pub fn version() -> String {
    format!("clausecore v{}", env!("CARGO_PKG_VERSION"))
}
