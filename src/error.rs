//! Error taxonomy for the FAQ retrieval core.

use std::path::PathBuf;

use thiserror::Error;

use crate::embedder::EmbedderError;

/// Result type alias for FAQ core operations.
pub type Result<T> = std::result::Result<T, FaqError>;

/// Errors that can occur while building or querying a FAQ index.
#[derive(Error, Debug)]
pub enum FaqError {
    /// The tabular source file does not exist.
    #[error("source not found: {}", .0.display())]
    SourceNotFound(PathBuf),

    /// The source table is malformed (too few columns, unreadable sheet, unsupported format).
    #[error("schema error: {0}")]
    Schema(String),

    /// Grouping produced no records, so there is nothing to index.
    #[error("no valid questions found in source")]
    EmptyDataset,

    /// The store could not be opened, created, or written.
    #[error("persistence error: {0}")]
    Persistence(String),

    /// A collection with this name was created concurrently.
    #[error("collection already exists: {0}")]
    DuplicateCollection(String),

    /// Stored per-record metadata could not be decoded.
    #[error("deserialization error: {0}")]
    Deserialization(#[from] serde_json::Error),

    /// The query embedder differs from the one the collection was built with.
    #[error(
        "collection '{collection}' was built with {built_with}, cannot query it with {queried_with}"
    )]
    ModelMismatch {
        collection: String,
        built_with: String,
        queried_with: String,
    },

    #[error(transparent)]
    Embedding(#[from] EmbedderError),
}

impl From<rusqlite::Error> for FaqError {
    fn from(e: rusqlite::Error) -> Self {
        Self::Persistence(e.to_string())
    }
}

impl From<std::io::Error> for FaqError {
    fn from(e: std::io::Error) -> Self {
        Self::Persistence(e.to_string())
    }
}
