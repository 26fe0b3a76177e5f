//! NotificationGate: seen-set + per-page cap + cooldown
//!
//! The anti-spam core. Each (category, pattern) pair notifies at most once
//! per logical page; at most `max_per_page` notifications fire per page; and
//! after any notification a cooldown window blocks further scans entirely.
//!
//! States per page: IDLE -> COOLDOWN -> IDLE -> ... -> CAPPED (terminal).
//! There is no timer: COOLDOWN expires lazily, whenever the next scan
//! attempt compares `now` against the armed deadline.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::scanner::result::TermMatch;

// =============================================================================
// Configuration
// =============================================================================

pub const DEFAULT_MAX_PER_PAGE: u32 = 2;
pub const DEFAULT_COOLDOWN_MS: u64 = 15_000;

fn default_max_per_page() -> u32 {
    DEFAULT_MAX_PER_PAGE
}

fn default_cooldown_ms() -> u64 {
    DEFAULT_COOLDOWN_MS
}

/// Tuning values, not contracts. Hosts may override.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GateConfig {
    #[serde(default = "default_max_per_page")]
    pub max_per_page: u32,
    #[serde(default = "default_cooldown_ms")]
    pub cooldown_ms: u64,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            max_per_page: DEFAULT_MAX_PER_PAGE,
            cooldown_ms: DEFAULT_COOLDOWN_MS,
        }
    }
}

// =============================================================================
// Types
// =============================================================================

/// Lazily derived gate state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GateState {
    Idle,
    Cooldown,
    /// Terminal for the page; only a navigation reset leaves it.
    Capped,
}

/// Outcome of offering one match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GateDecision {
    /// Accepted: emit to the notification sink.
    Emit,
    /// Silently dropped: this pair already notified on this page.
    DuplicateSeen,
    /// Dropped: the per-page cap is exhausted.
    Capped,
    /// Dropped: offered while the cooldown window was still open.
    CoolingDown,
}

// =============================================================================
// NotificationGate
// =============================================================================

#[derive(Debug)]
pub struct NotificationGate {
    config: GateConfig,
    seen: HashSet<String>,
    notification_count: u32,
    cooldown_until_ms: u64,
}

impl Default for NotificationGate {
    fn default() -> Self {
        Self::new(GateConfig::default())
    }
}

impl NotificationGate {
    pub fn new(config: GateConfig) -> Self {
        Self {
            config,
            seen: HashSet::new(),
            notification_count: 0,
            cooldown_until_ms: 0,
        }
    }

    pub fn state(&self, now_ms: u64) -> GateState {
        if self.notification_count >= self.config.max_per_page {
            GateState::Capped
        } else if now_ms < self.cooldown_until_ms {
            GateState::Cooldown
        } else {
            GateState::Idle
        }
    }

    /// Cheap pre-scanner check: scanning is pointless while cooling down and
    /// forever once capped, so both reject before the walk even starts.
    pub fn scan_allowed(&self, now_ms: u64) -> bool {
        self.state(now_ms) == GateState::Idle
    }

    /// Has this (category, pattern) pair already notified on this page?
    pub fn is_seen(&self, category: &str, pattern: &str) -> bool {
        self.seen
            .contains(&crate::scanner::result::seen_key(category, pattern))
    }

    /// Offer one match. Ordering is load-bearing: a duplicate drops silently
    /// no matter what state the gate is in, and never consumes a
    /// notification slot.
    pub fn offer(&mut self, m: &TermMatch, now_ms: u64) -> GateDecision {
        let key = m.seen_key();
        if self.seen.contains(&key) {
            return GateDecision::DuplicateSeen;
        }
        if self.notification_count >= self.config.max_per_page {
            return GateDecision::Capped;
        }
        if now_ms < self.cooldown_until_ms {
            return GateDecision::CoolingDown;
        }

        self.seen.insert(key);
        self.notification_count += 1;
        self.cooldown_until_ms = now_ms + self.config.cooldown_ms;
        GateDecision::Emit
    }

    pub fn notification_count(&self) -> u32 {
        self.notification_count
    }

    pub fn cooldown_until_ms(&self) -> u64 {
        self.cooldown_until_ms
    }

    /// Reset for a new logical page.
    pub fn reset(&mut self) {
        self.seen.clear();
        self.notification_count = 0;
        self.cooldown_until_ms = 0;
    }

    // -------------------------------------------------------------------------
    // Seen-set persistence
    // -------------------------------------------------------------------------

    /// Export the seen keys so the host can stash them in a page-lifetime
    /// store (survives reloads of the same logical page).
    pub fn export_seen(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.seen.iter().cloned().collect();
        keys.sort();
        keys
    }

    /// Restore previously exported seen keys. Count is restored too, so a
    /// reloaded page that already notified twice stays capped.
    pub fn restore_seen(&mut self, keys: Vec<String>) {
        for key in keys {
            if self.seen.insert(key) {
                self.notification_count = self.notification_count.saturating_add(1);
            }
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
