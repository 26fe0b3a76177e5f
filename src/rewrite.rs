//! Plain-language rewrite driver
//!
//! The on-device rewriter is an opaque capability the host injects; the core
//! only reconstructs paragraphs from flat selection text, drives the session
//! paragraph by paragraph, and substitutes a fallback line for any paragraph
//! the capability loses. Nothing here is on the scan pipeline's critical
//! path.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use unicode_segmentation::UnicodeSegmentation;

use crate::console;

// =============================================================================
// Constants
// =============================================================================

pub const DEFAULT_MAX_PARAGRAPH_CHARS: usize = 500;
pub const DEFAULT_MAX_PARAGRAPH_SENTENCES: usize = 3;

/// What the user sees for a unit of work the capability failed on.
pub const REWRITE_FALLBACK_TEXT: &str = "Error: Could not rewrite text.";

// =============================================================================
// Capability contract
// =============================================================================

/// Readiness of the rewrite capability. `Downloadable` counts as usable: the
/// platform pulls the model on first session creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Availability {
    Available,
    Downloadable,
    Unavailable,
}

impl Availability {
    pub fn is_usable(&self) -> bool {
        matches!(self, Availability::Available | Availability::Downloadable)
    }
}

#[derive(Debug, Error)]
pub enum RewriteError {
    #[error("rewrite capability not ready: {0}")]
    NotReady(String),

    #[error("failed to create rewrite session: {0}")]
    SessionCreation(String),

    #[error("rewrite failed: {0}")]
    Rewrite(String),
}

/// Session options, defaulting to the product's plain-language prompt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RewriteOptions {
    pub tone: String,
    pub length: String,
    pub prompt: String,
}

impl Default for RewriteOptions {
    fn default() -> Self {
        Self {
            tone: "more-casual".to_string(),
            length: "shorter".to_string(),
            prompt: "Write this in very simple language for a person with low literacy. \
                     Include only the rewrite."
                .to_string(),
        }
    }
}

/// One live rewriter session. The host adapter bridges this to the
/// platform's async API; the core drives it synchronously between
/// suspension points.
pub trait RewriteSession {
    fn rewrite(&mut self, text: &str) -> Result<String, RewriteError>;

    /// Release the underlying model session. Called exactly once, after the
    /// last paragraph.
    fn destroy(&mut self);
}

/// The injected capability. The core never feature-detects the platform
/// itself; it only ever sees this interface.
pub trait RewriteCapability {
    type Session: RewriteSession;

    fn availability(&self) -> Availability;
    fn create_session(&self, options: &RewriteOptions) -> Result<Self::Session, RewriteError>;
}

// =============================================================================
// Paragraph reconstruction
// =============================================================================

fn default_max_chars() -> usize {
    DEFAULT_MAX_PARAGRAPH_CHARS
}

fn default_max_sentences() -> usize {
    DEFAULT_MAX_PARAGRAPH_SENTENCES
}

/// Tuning values, not contracts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParagraphConfig {
    #[serde(default = "default_max_chars")]
    pub max_chars: usize,
    #[serde(default = "default_max_sentences")]
    pub max_sentences: usize,
}

impl Default for ParagraphConfig {
    fn default() -> Self {
        Self {
            max_chars: DEFAULT_MAX_PARAGRAPH_CHARS,
            max_sentences: DEFAULT_MAX_PARAGRAPH_SENTENCES,
        }
    }
}

/// Rebuild paragraphs from flat selection text.
///
/// Newlines flatten to spaces, whitespace runs collapse, and sentences are
/// grouped until a paragraph reaches `max_sentences` or `max_chars`,
/// whichever comes first.
pub fn reconstruct_paragraphs(text: &str, config: &ParagraphConfig) -> Vec<String> {
    let flattened = text.replace("\r\n", "\n").replace('\n', " ");
    let normalized = flattened.split_whitespace().collect::<Vec<_>>().join(" ");
    if normalized.is_empty() {
        return Vec::new();
    }

    let mut paragraphs = Vec::new();
    let mut current = String::new();
    let mut sentence_count = 0usize;

    for sentence in normalized.unicode_sentences() {
        current.push_str(sentence);
        sentence_count += 1;
        if sentence_count >= config.max_sentences || current.len() >= config.max_chars {
            paragraphs.push(current.trim().to_string());
            current = String::new();
            sentence_count = 0;
        }
    }
    let tail = current.trim();
    if !tail.is_empty() {
        paragraphs.push(tail.to_string());
    }

    paragraphs
}

// =============================================================================
// Driver
// =============================================================================

/// Result of one rewrite run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RewriteReport {
    /// One rewritten string per input paragraph; failed paragraphs carry the
    /// fallback line.
    pub paragraphs: Vec<String>,
    pub failed: usize,
}

/// Rewrite paragraphs one at a time, streaming progress after each.
///
/// A paragraph-level failure substitutes the fallback line and keeps going;
/// only an unusable capability or a failed session creation aborts the run
/// (the caller surfaces one whole-text fallback for those). The session is
/// destroyed before returning.
pub fn rewrite_paragraphs<C: RewriteCapability>(
    capability: &C,
    paragraphs: &[String],
    options: &RewriteOptions,
    mut on_progress: impl FnMut(&[String]),
) -> Result<RewriteReport, RewriteError> {
    let availability = capability.availability();
    if !availability.is_usable() {
        return Err(RewriteError::NotReady(format!("{:?}", availability)));
    }

    let mut session = capability.create_session(options)?;
    let mut report = RewriteReport::default();

    for paragraph in paragraphs {
        match session.rewrite(paragraph) {
            Ok(rewritten) => report.paragraphs.push(rewritten),
            Err(e) => {
                console::error(&format!("rewrite failed for one paragraph: {}", e));
                report.paragraphs.push(REWRITE_FALLBACK_TEXT.to_string());
                report.failed += 1;
            }
        }
        on_progress(&report.paragraphs);
    }

    session.destroy();
    Ok(report)
}

// =============================================================================
// Tests
// =============================================================================
