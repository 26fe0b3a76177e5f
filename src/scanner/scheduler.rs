//! ScanScheduler: debounce + minimum scan interval
//!
//! Decides *when* the scan pipeline runs. Pure decision logic over explicit
//! events and timestamps; the host owns the real timers and the
//! MutationObserver, and drives this with `on_*` events plus `tick`.
//!
//! Two independent throttles:
//! - a debounce window: a burst of qualifying mutations keeps pushing one
//!   pending deadline out until the page goes quiet;
//! - a minimum interval between scan executions: when the debounce fires too
//!   soon after the previous run, the deadline is deferred instead of
//!   dropped, so the burst collapses to exactly one scan.

use serde::{Deserialize, Serialize};

// =============================================================================
// Configuration
// =============================================================================

pub const DEFAULT_DEBOUNCE_MS: u64 = 900;
pub const DEFAULT_MIN_SCAN_INTERVAL_MS: u64 = 4_000;
pub const DEFAULT_MIN_ADDED_CHARS: usize = 100;

fn default_debounce_ms() -> u64 {
    DEFAULT_DEBOUNCE_MS
}

fn default_min_scan_interval_ms() -> u64 {
    DEFAULT_MIN_SCAN_INTERVAL_MS
}

fn default_min_added_chars() -> usize {
    DEFAULT_MIN_ADDED_CHARS
}

/// Tuning values, not contracts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Quiet period after the last qualifying event before a scan may run.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    /// Floor between two scan executions, independent of the debounce.
    #[serde(default = "default_min_scan_interval_ms")]
    pub min_scan_interval_ms: u64,
    /// Mutations adding fewer visible characters than this are ignored.
    #[serde(default = "default_min_added_chars")]
    pub min_added_chars: usize,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            min_scan_interval_ms: DEFAULT_MIN_SCAN_INTERVAL_MS,
            min_added_chars: DEFAULT_MIN_ADDED_CHARS,
        }
    }
}

// =============================================================================
// ScanScheduler
// =============================================================================

#[derive(Debug)]
pub struct ScanScheduler {
    config: SchedulerConfig,
    /// Armed debounce deadline, if any. Re-arming cancels the previous one;
    /// this is the pipeline's only cancellation point.
    pending_at_ms: Option<u64>,
    last_scan_at_ms: Option<u64>,
}

impl Default for ScanScheduler {
    fn default() -> Self {
        Self::new(SchedulerConfig::default())
    }
}

impl ScanScheduler {
    pub fn new(config: SchedulerConfig) -> Self {
        Self {
            config,
            pending_at_ms: None,
            last_scan_at_ms: None,
        }
    }

    fn arm(&mut self, now_ms: u64) {
        self.pending_at_ms = Some(now_ms + self.config.debounce_ms);
    }

    /// Initial document-ready: schedule the first scan.
    pub fn on_document_ready(&mut self, now_ms: u64) {
        self.arm(now_ms);
    }

    /// A DOM mutation added `added_chars` of visible text. Qualifying
    /// mutations restart the debounce window.
    pub fn on_mutation(&mut self, added_chars: usize, now_ms: u64) {
        if added_chars >= self.config.min_added_chars {
            self.arm(now_ms);
        }
    }

    /// Logical navigation. The caller has already reset page state; the
    /// interval floor is lifted so the new page scans promptly.
    pub fn on_navigation(&mut self, now_ms: u64) {
        self.last_scan_at_ms = None;
        self.arm(now_ms);
    }

    /// Should a scan run now? Fires at most once per armed deadline. When
    /// the deadline has arrived but the minimum interval since the previous
    /// run has not, the deadline is deferred to that boundary.
    pub fn tick(&mut self, now_ms: u64) -> bool {
        let Some(deadline) = self.pending_at_ms else {
            return false;
        };
        if now_ms < deadline {
            return false;
        }
        if let Some(last) = self.last_scan_at_ms {
            let earliest = last + self.config.min_scan_interval_ms;
            if now_ms < earliest {
                self.pending_at_ms = Some(earliest);
                return false;
            }
        }
        self.pending_at_ms = None;
        self.last_scan_at_ms = Some(now_ms);
        true
    }

    /// When the host should call `tick` next, if anything is pending.
    pub fn next_deadline_ms(&self) -> Option<u64> {
        self.pending_at_ms
    }

    pub fn last_scan_at_ms(&self) -> Option<u64> {
        self.last_scan_at_ms
    }

    pub fn reset(&mut self) {
        self.pending_at_ms = None;
        self.last_scan_at_ms = None;
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    // -------------------------------------------------------------------------
    // Requirement 1: Document-ready schedules after the debounce
    // -------------------------------------------------------------------------
    #[test]
    fn test_document_ready_schedules() {
        let mut s = ScanScheduler::default();
        s.on_document_ready(1_000);

        assert_eq!(s.next_deadline_ms(), Some(1_900));
        assert!(!s.tick(1_500));
        assert!(s.tick(1_900));
        // Fired once; nothing pending afterwards
        assert!(!s.tick(1_901));
    }

    // -------------------------------------------------------------------------
    // Requirement 2: Small mutations are ignored
    // -------------------------------------------------------------------------
    #[test]
    fn test_small_mutation_ignored() {
        let mut s = ScanScheduler::default();
        s.on_mutation(99, 1_000);
        assert_eq!(s.next_deadline_ms(), None);

        s.on_mutation(100, 1_000);
        assert_eq!(s.next_deadline_ms(), Some(1_900));
    }

    // -------------------------------------------------------------------------
    // Requirement 3: A newer mutation restarts the debounce window
    // -------------------------------------------------------------------------
    #[test]
    fn test_debounce_restarts() {
        let mut s = ScanScheduler::default();
        s.on_mutation(200, 1_000);
        s.on_mutation(200, 1_500);

        assert!(!s.tick(1_900), "first deadline was cancelled");
        assert!(s.tick(2_400));
    }

    // -------------------------------------------------------------------------
    // Requirement 4: Minimum interval defers, and the burst collapses
    // -------------------------------------------------------------------------
    #[test]
    fn test_min_interval_collapses_burst() {
        let mut s = ScanScheduler::default();
        s.on_document_ready(0);
        assert!(s.tick(900));

        // Burst of qualifying mutations right after the scan
        s.on_mutation(500, 1_000);
        s.on_mutation(500, 1_200);

        // Debounce elapsed, but the interval floor defers to 900 + 4000
        assert!(!s.tick(2_100));
        assert_eq!(s.next_deadline_ms(), Some(4_900));
        assert!(!s.tick(4_000));
        assert!(s.tick(4_900));
        // One scan for the whole burst
        assert!(!s.tick(5_000));
    }

    // -------------------------------------------------------------------------
    // Requirement 5: Navigation lifts the interval floor
    // -------------------------------------------------------------------------
    #[test]
    fn test_navigation_rearms_promptly() {
        let mut s = ScanScheduler::default();
        s.on_document_ready(0);
        assert!(s.tick(900));

        s.on_navigation(1_000);
        // Without the floor lift this would defer to 4_900
        assert!(s.tick(1_900));
    }

    // -------------------------------------------------------------------------
    // Requirement 6: tick with nothing pending is a no-op
    // -------------------------------------------------------------------------
    #[test]
    fn test_idle_tick_noop() {
        let mut s = ScanScheduler::default();
        assert!(!s.tick(10_000));
        assert_eq!(s.next_deadline_ms(), None);
    }

    // -------------------------------------------------------------------------
    // Requirement 7: Reset clears pending work and history
    // -------------------------------------------------------------------------
    #[test]
    fn test_reset() {
        let mut s = ScanScheduler::default();
        s.on_document_ready(0);
        s.tick(900);
        s.reset();

        assert_eq!(s.next_deadline_ms(), None);
        assert_eq!(s.last_scan_at_ms(), None);
    }
}
