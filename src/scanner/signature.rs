//! SignatureTracker: visible-text fingerprint skip detection
//!
//! A scan is only worth running when the visible text materially changed.
//! The fingerprint is deliberately cheap: character count plus a hash of a
//! bounded head of the text, so mutation churn that never alters visible
//! text (class toggles, attribute flips) cannot trigger rescans.

use serde::{Deserialize, Serialize};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

// =============================================================================
// Constants
// =============================================================================

/// How many leading characters participate in the hash.
pub const SIGNATURE_HEAD_CHARS: usize = 2048;

// =============================================================================
// Types
// =============================================================================

/// Cheap content fingerprint: length plus bounded-head hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentSignature {
    pub length: usize,
    pub head_hash: u64,
}

impl ContentSignature {
    pub fn of(text: &str) -> Self {
        let head_end = text
            .char_indices()
            .nth(SIGNATURE_HEAD_CHARS)
            .map(|(i, _)| i)
            .unwrap_or(text.len());

        let mut hasher = DefaultHasher::new();
        text[..head_end].hash(&mut hasher);

        Self {
            length: text.chars().count(),
            head_hash: hasher.finish(),
        }
    }
}

/// Result of one signature check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignatureResult {
    pub has_changed: bool,
    pub signature: ContentSignature,
    pub previous: Option<ContentSignature>,
}

// =============================================================================
// SignatureTracker
// =============================================================================

#[derive(Debug, Default)]
pub struct SignatureTracker {
    last: Option<ContentSignature>,
    check_count: u64,
    skip_count: u64,
}

impl SignatureTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if content has changed since the last check.
    /// The first check always counts as changed.
    pub fn has_changed(&mut self, text: &str) -> bool {
        self.check(text).has_changed
    }

    /// Check and return the detailed result.
    pub fn check(&mut self, text: &str) -> SignatureResult {
        self.check_count += 1;

        let signature = ContentSignature::of(text);
        let previous = self.last;

        let has_changed = match previous {
            None => true,
            Some(prev) => prev != signature,
        };
        if !has_changed {
            self.skip_count += 1;
        }

        self.last = Some(signature);
        SignatureResult {
            has_changed,
            signature,
            previous,
        }
    }

    pub fn last(&self) -> Option<ContentSignature> {
        self.last
    }

    pub fn check_count(&self) -> u64 {
        self.check_count
    }

    pub fn skip_count(&self) -> u64 {
        self.skip_count
    }

    /// Share of checks that were skippable, as a percentage.
    pub fn skip_rate(&self) -> f64 {
        if self.check_count == 0 {
            return 0.0;
        }
        (self.skip_count as f64 / self.check_count as f64) * 100.0
    }

    pub fn reset(&mut self) {
        self.last = None;
        self.check_count = 0;
        self.skip_count = 0;
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    // -------------------------------------------------------------------------
    // Requirement 1: First check always counts as changed
    // -------------------------------------------------------------------------
    #[test]
    fn test_first_check_changed() {
        let mut tracker = SignatureTracker::new();
        assert!(tracker.has_changed("Terms of Service"));
    }

    // -------------------------------------------------------------------------
    // Requirement 2: Identical content is skippable
    // -------------------------------------------------------------------------
    #[test]
    fn test_same_content_unchanged() {
        let mut tracker = SignatureTracker::new();
        tracker.has_changed("Terms of Service");
        assert!(!tracker.has_changed("Terms of Service"));
        assert_eq!(tracker.skip_count(), 1);
    }

    // -------------------------------------------------------------------------
    // Requirement 3: Different content is a change
    // -------------------------------------------------------------------------
    #[test]
    fn test_different_content_changed() {
        let mut tracker = SignatureTracker::new();
        tracker.has_changed("Terms of Service");
        assert!(tracker.has_changed("Privacy Policy"));
    }

    // -------------------------------------------------------------------------
    // Requirement 4: Length changes beyond the hashed head still register
    // -------------------------------------------------------------------------
    #[test]
    fn test_change_past_hashed_head() {
        let prefix = "x".repeat(SIGNATURE_HEAD_CHARS);
        let mut tracker = SignatureTracker::new();
        tracker.has_changed(&format!("{}tail one", prefix));
        assert!(tracker.has_changed(&format!("{}tail one two", prefix)));
    }

    // -------------------------------------------------------------------------
    // Requirement 5: Signature is deterministic
    // -------------------------------------------------------------------------
    #[test]
    fn test_signature_deterministic() {
        let a = ContentSignature::of("You agree to indemnify");
        let b = ContentSignature::of("You agree to indemnify");
        assert_eq!(a, b);
    }

    // -------------------------------------------------------------------------
    // Requirement 6: Reset clears state and counters
    // -------------------------------------------------------------------------
    #[test]
    fn test_reset() {
        let mut tracker = SignatureTracker::new();
        tracker.has_changed("a");
        tracker.has_changed("a");
        tracker.reset();

        assert_eq!(tracker.check_count(), 0);
        assert!(tracker.last().is_none());
        assert!(tracker.has_changed("a"));
    }

    // -------------------------------------------------------------------------
    // Requirement 7: Skip rate reflects skipped checks
    // -------------------------------------------------------------------------
    #[test]
    fn test_skip_rate() {
        let mut tracker = SignatureTracker::new();
        tracker.has_changed("a");
        tracker.has_changed("a");
        tracker.has_changed("a");
        tracker.has_changed("a");
        assert!((tracker.skip_rate() - 75.0).abs() < 0.01);
    }
}
