//! Core data types shared by the build and query pipelines.
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Sentinel stored in place of a blank age or answer cell.
pub const NOT_AVAILABLE: &str = "N/A";

/// Directory prefix used when no explicit storage location is given.
pub const DEFAULT_STORE_DIR_PREFIX: &str = "./faq_store_";

/// Whether a (trimmed) question cell means "no question": blank, or the
/// literal `nan` that spreadsheet exports write for empty cells.
#[must_use]
pub fn is_missing_question(question: &str) -> bool {
    question.is_empty() || question.eq_ignore_ascii_case("nan")
}

fn not_available() -> String {
    NOT_AVAILABLE.to_string()
}

/// One spreadsheet row after forward-fill and blank normalization.
///
/// `question` is trimmed and already known to be non-empty; blank age or
/// answer cells have been replaced with [`NOT_AVAILABLE`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceRow {
    pub question: String,
    pub age_context: String,
    pub answer: String,
}

/// A single age-conditioned answer.
///
/// Older indexes stored the Portuguese keys `idade`/`resposta`; both spellings
/// are accepted when reading back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerEntry {
    #[serde(alias = "idade", default = "not_available")]
    pub age_context: String,
    #[serde(alias = "resposta", default = "not_available")]
    pub answer: String,
}

impl AnswerEntry {
    pub fn new(age_context: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            age_context: age_context.into(),
            answer: answer.into(),
        }
    }
}

/// One unique question with its answers in spreadsheet row order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FaqRecord {
    pub question: String,
    pub answers: Vec<AnswerEntry>,
}

/// A ranked hit returned by the retriever.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchResult {
    pub question: String,
    pub answers: Vec<AnswerEntry>,
    /// Cosine distance to the query (0 = identical direction).
    pub distance: f64,
}

/// Identifies which collection in which store a call operates on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetrievalContext {
    pub collection_name: String,
    pub storage_location: PathBuf,
}

impl RetrievalContext {
    /// Build a context, falling back to `<prefix><collection_name>` when no
    /// storage location is given.
    pub fn new(collection_name: impl Into<String>, storage_location: Option<&Path>) -> Self {
        let collection_name = collection_name.into();
        let storage_location = storage_location
            .map(Path::to_path_buf)
            .unwrap_or_else(|| default_storage_location(&collection_name));
        Self {
            collection_name,
            storage_location,
        }
    }
}

/// Default directory for a collection's store.
#[must_use]
pub fn default_storage_location(collection_name: &str) -> PathBuf {
    PathBuf::from(format!("{DEFAULT_STORE_DIR_PREFIX}{collection_name}"))
}
