//! PageScanContext: per-injection conductor
//!
//! One explicit object owns everything that used to be ambient page state:
//! glossary index, scheduler, gate, signature tracker, navigation watcher,
//! and the accumulated detection results. It is instantiated once per
//! content-script injection and reset (not recreated) on logical navigation,
//! so nothing leaks across pages.
//!
//! Pipeline per tick: scheduler fires -> gate pre-check -> signature check
//! -> document walk -> gate offer -> notification out.

use serde::{Deserialize, Serialize};

use crate::console;
use crate::glossary::GlossaryIndex;
use crate::navigation::{NavigationWatcher, PageKey};
use crate::page::{visible_text, PageDom};
use crate::scanner::limiter::{GateConfig, GateDecision, NotificationGate};
use crate::scanner::result::{DetectionResults, Notification, TermMatch};
use crate::scanner::scan::PageScanner;
use crate::scanner::scheduler::{ScanScheduler, SchedulerConfig};
use crate::scanner::signature::SignatureTracker;

// =============================================================================
// Configuration
// =============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GuardConfig {
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    #[serde(default)]
    pub gate: GateConfig,
    /// Per-site mute: when set, the scheduler never invokes the scanner.
    #[serde(default)]
    pub muted: bool,
    /// Detected page language, for glossary filtering.
    #[serde(default)]
    pub page_language: Option<String>,
}

// =============================================================================
// PageScanContext
// =============================================================================

pub struct PageScanContext {
    index: Option<GlossaryIndex>,
    scheduler: ScanScheduler,
    gate: NotificationGate,
    tracker: SignatureTracker,
    watcher: NavigationWatcher,
    results: DetectionResults,
    muted: bool,
    page_language: Option<String>,
}

impl Default for PageScanContext {
    fn default() -> Self {
        Self::new(GuardConfig::default())
    }
}

impl PageScanContext {
    pub fn new(config: GuardConfig) -> Self {
        Self {
            index: None,
            scheduler: ScanScheduler::new(config.scheduler),
            gate: NotificationGate::new(config.gate),
            tracker: SignatureTracker::new(),
            watcher: NavigationWatcher::new(),
            results: DetectionResults::default(),
            muted: config.muted,
            page_language: config.page_language,
        }
    }

    // -------------------------------------------------------------------------
    // Setup
    // -------------------------------------------------------------------------

    /// Load and compile the glossary. Fails soft: on any configuration error
    /// the scan feature is disabled for this page and the error is only
    /// logged. Returns the number of compiled patterns (0 = disabled).
    pub fn load_glossary(&mut self, json: &str) -> usize {
        match GlossaryIndex::from_json(json, self.page_language.as_deref()) {
            Ok(index) => {
                let count = index.pattern_count();
                console::info(&format!(
                    "glossary loaded: {} patterns in {} categories",
                    count,
                    index.category_count()
                ));
                self.index = Some(index);
                count
            }
            Err(e) => {
                console::warn(&format!("glossary unavailable, scanning disabled: {}", e));
                self.index = None;
                0
            }
        }
    }

    pub fn index(&self) -> Option<&GlossaryIndex> {
        self.index.as_ref()
    }

    pub fn scanning_enabled(&self) -> bool {
        self.index.is_some() && !self.muted
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    // -------------------------------------------------------------------------
    // Events
    // -------------------------------------------------------------------------

    pub fn handle_document_ready(&mut self, now_ms: u64) {
        if self.muted {
            return;
        }
        self.scheduler.on_document_ready(now_ms);
    }

    pub fn handle_mutation(&mut self, added_chars: usize, now_ms: u64) {
        if self.muted {
            return;
        }
        self.scheduler.on_mutation(added_chars, now_ms);
    }

    /// Observe a URL. When the logical page changed, all per-page state is
    /// reset synchronously before the scheduler is re-armed, so the reset
    /// happens-before any scan caused by this navigation.
    pub fn handle_navigation(&mut self, url: &str, now_ms: u64) -> bool {
        if self.watcher.observe(url).is_none() {
            return false;
        }
        self.gate.reset();
        self.tracker.reset();
        self.results.reset();
        if !self.muted {
            self.scheduler.on_navigation(now_ms);
        }
        true
    }

    pub fn page_key(&self) -> Option<&PageKey> {
        self.watcher.current()
    }

    /// When the host should call `tick` next.
    pub fn next_deadline_ms(&self) -> Option<u64> {
        self.scheduler.next_deadline_ms()
    }

    // -------------------------------------------------------------------------
    // The pipeline
    // -------------------------------------------------------------------------

    /// Run the scan pipeline if it is due. Returns a notification when a
    /// fresh term was accepted by the gate.
    pub fn tick(&mut self, dom: &PageDom, now_ms: u64) -> Option<Notification> {
        if self.muted {
            return None;
        }
        let Some(index) = &self.index else {
            return None;
        };
        if !self.scheduler.tick(now_ms) {
            return None;
        }
        // Cheap rejections before the document walk: gate state, then the
        // content signature.
        if !self.gate.scan_allowed(now_ms) {
            return None;
        }
        let text = visible_text(dom);
        if !self.tracker.has_changed(&text) {
            return None;
        }

        let gate = &self.gate;
        let outcome = PageScanner::new(index)
            .scan_first_where(dom, |category, pattern| !gate.is_seen(category, pattern));
        let m = outcome.result?;

        match self.gate.offer(&m, now_ms) {
            GateDecision::Emit => {
                self.results.record(&m, now_ms);
                let patterns = index.all_patterns().into_iter().map(|(_, p)| p).collect();
                Some(Notification::from_match(&m, patterns))
            }
            _ => None,
        }
    }

    // -------------------------------------------------------------------------
    // Results & persistence
    // -------------------------------------------------------------------------

    pub fn results(&self) -> &DetectionResults {
        &self.results
    }

    /// Fold a highlight pass's matches into the page aggregate.
    pub fn record_matches(&mut self, matches: &[TermMatch], now_ms: u64) {
        self.results.record_all(matches, now_ms);
    }

    pub fn export_seen(&self) -> Vec<String> {
        self.gate.export_seen()
    }

    pub fn restore_seen(&mut self, keys: Vec<String>) {
        self.gate.restore_seen(keys);
    }
}

// =============================================================================
// Tests
// =============================================================================
