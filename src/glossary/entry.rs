//! Glossary loading and normalization
//!
//! Accepts both glossary JSON shapes transparently:
//! - flat: `[{ "term": "indemnify", "category": "Legal Risks", "language": "en" }, ...]`
//! - legacy: `{ "Legal Risks": ["indemnify", "hold harmless"], ... }`
//!
//! Entries are language-filtered against the page, trimmed, and deduplicated
//! before index compilation.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

use super::GlossaryError;

// =============================================================================
// Types
// =============================================================================

/// One glossary term. Immutable after load.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlossaryEntry {
    pub term: String,
    pub category: String,
    #[serde(default)]
    pub language: Option<String>,
}

impl GlossaryEntry {
    pub fn new(term: &str, category: &str) -> Self {
        Self {
            term: term.to_string(),
            category: category.to_string(),
            language: None,
        }
    }

    pub fn with_language(term: &str, category: &str, language: &str) -> Self {
        Self {
            term: term.to_string(),
            category: category.to_string(),
            language: Some(language.to_string()),
        }
    }
}

/// The two accepted on-disk shapes.
///
/// Legacy categories deserialize through a `BTreeMap`, so their build order
/// is alphabetical; flat entries keep source order.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum GlossaryDocument {
    Flat(Vec<GlossaryEntry>),
    Legacy(BTreeMap<String, Vec<String>>),
}

// =============================================================================
// Loading
// =============================================================================

/// Parse glossary JSON in either shape into a normalized entry list.
pub fn parse_glossary(json: &str) -> Result<Vec<GlossaryEntry>, GlossaryError> {
    let document: GlossaryDocument = serde_json::from_str(json)?;

    let entries = match document {
        GlossaryDocument::Flat(entries) => entries,
        GlossaryDocument::Legacy(categories) => categories
            .into_iter()
            .flat_map(|(category, terms)| {
                terms.into_iter().map(move |term| GlossaryEntry {
                    term,
                    category: category.clone(),
                    language: None,
                })
            })
            .collect(),
    };

    Ok(entries)
}

// =============================================================================
// Language filter
// =============================================================================

/// Primary subtag of a BCP-47-ish tag: "en-US" -> "en", "pt_BR" -> "pt".
fn primary_subtag(tag: &str) -> &str {
    tag.split(['-', '_']).next().unwrap_or(tag)
}

/// Keep entries usable on a page in `page_language`.
///
/// An entry survives when it has no language tag, is tagged English, or its
/// primary subtag matches the page's. Everything else is dropped.
pub fn filter_by_language(
    entries: Vec<GlossaryEntry>,
    page_language: Option<&str>,
) -> Vec<GlossaryEntry> {
    let page_primary = page_language.map(|tag| primary_subtag(tag).to_lowercase());

    entries
        .into_iter()
        .filter(|entry| match &entry.language {
            None => true,
            Some(tag) => {
                let entry_primary = primary_subtag(tag).to_lowercase();
                entry_primary == "en"
                    || page_primary
                        .as_deref()
                        .is_some_and(|page| page == entry_primary)
            }
        })
        .collect()
}

// =============================================================================
// Normalization
// =============================================================================

/// Trim terms, drop empties, and dedupe on (category, lowercased term),
/// preserving first-appearance order. Empty terms would compile to patterns
/// matching the empty string, so they are rejected here rather than at scan
/// time. Returns the survivors and the number of dropped entries.
pub fn normalize(entries: Vec<GlossaryEntry>) -> (Vec<GlossaryEntry>, usize) {
    let mut seen: HashSet<(String, String)> = HashSet::new();
    let mut kept = Vec::new();
    let mut dropped = 0usize;

    for entry in entries {
        let term = entry.term.trim();
        if term.is_empty() {
            dropped += 1;
            continue;
        }
        let key = (entry.category.clone(), term.to_lowercase());
        if !seen.insert(key) {
            dropped += 1;
            continue;
        }
        kept.push(GlossaryEntry {
            term: term.to_string(),
            category: entry.category,
            language: entry.language,
        });
    }

    (kept, dropped)
}

// =============================================================================
// Tests
// =============================================================================
