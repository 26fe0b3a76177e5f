pub mod entry;
pub mod index;
pub mod taxonomy;

pub use entry::*;
pub use index::*;
pub use taxonomy::*;

use thiserror::Error;

/// Errors raised while loading or compiling the glossary.
///
/// All of these are configuration errors: the caller disables scanning for
/// the page and logs, nothing is surfaced to the user.
#[derive(Debug, Error)]
pub enum GlossaryError {
    #[error("failed to parse glossary JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("no usable glossary entries after filtering")]
    NoUsableEntries,

    #[error("failed to compile pattern for category '{category}': {message}")]
    BadPattern { category: String, message: String },
}
