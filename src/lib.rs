//! # faqrag: semantic FAQ retrieval
//!
//! Turns a spreadsheet of question / age / answer rows into a local vector
//! index and resolves free-text questions to the closest stored questions,
//! each with its age-conditioned answers.
//!
//! ## Architecture
//!
//! Build time: [`source`] → [`grouper`] → [`index`].
//! Query time: [`retriever`] → [`formatter`].
//!
//! - **[`source`]**: Spreadsheet/CSV loading with question forward-fill
//! - **[`grouper`]**: Unique questions with ordered answers
//! - **[`index`]**: Collection building over the [`db`] store (SQLite + sqlite-vec)
//! - **[`retriever`]**: Best-effort nearest-question search
//! - **[`formatter`]**: Markdown age/answer tables
//! - **[`embedder`]**: Text embedding via ONNX Runtime (multilingual-e5-small)
//! - **[`config`]**: JSON configuration
//! - **[`mcp`]**: MCP tool server (stdio) for answer-generation clients

pub mod config;
pub mod db;
pub mod embedder;
pub mod error;
pub mod formatter;
pub mod grouper;
pub mod index;
pub mod mcp;
pub mod models;
pub mod retriever;
pub mod source;

pub use error::{FaqError, Result};
pub use index::{FaqIndex, IdStrategy, IndexBuilder};
pub use models::{AnswerEntry, FaqRecord, MatchResult, RetrievalContext, SourceRow};
pub use retriever::Retriever;
