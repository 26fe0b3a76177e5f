//! PageKey minting and logical-navigation detection
//!
//! A logical page is identified by origin + path + query; the fragment never
//! participates. The host feeds every URL it observes (history mutation
//! hooks, popstate, the initial load) into the watcher, which reports a
//! change exactly once per logical page. The platform-specific history
//! patching stays on the JS side; this is the testable core of it.

use serde::{Deserialize, Serialize};

// =============================================================================
// PageKey
// =============================================================================

/// Normalized identifier for a logical page: the URL with its fragment
/// stripped.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PageKey(String);

impl PageKey {
    pub fn from_url(url: &str) -> Self {
        let non_fragment = url.split('#').next().unwrap_or(url);
        Self(non_fragment.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PageKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// NavigationWatcher
// =============================================================================

/// Tracks the current logical page and dedupes repeated sightings of the
/// same non-fragment URL.
#[derive(Debug, Default)]
pub struct NavigationWatcher {
    current: Option<PageKey>,
}

impl NavigationWatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// The current logical URL, if any navigation has been observed.
    pub fn current(&self) -> Option<&PageKey> {
        self.current.as_ref()
    }

    /// Feed an observed URL. Returns the freshly minted `PageKey` when the
    /// logical page changed, `None` for fragment-only or repeated sightings.
    pub fn observe(&mut self, url: &str) -> Option<PageKey> {
        let key = PageKey::from_url(url);
        if self.current.as_ref() == Some(&key) {
            return None;
        }
        self.current = Some(key.clone());
        Some(key)
    }

    pub fn reset(&mut self) {
        self.current = None;
    }
}

// =============================================================================
// Tests
// =============================================================================
