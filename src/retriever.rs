//! Best-effort query side of the FAQ engine.
use tracing::{debug, warn};

use crate::embedder::Embedder;
use crate::index::FaqIndex;
use crate::models::{MatchResult, RetrievalContext};

/// Resolves free-text questions against a persisted collection.
///
/// Every failure (missing store, missing collection, model mismatch, search
/// error) is logged and reported as "no matches".
pub struct Retriever<'a, E: Embedder + ?Sized> {
    embedder: &'a E,
}

impl<'a, E: Embedder + ?Sized> Retriever<'a, E> {
    pub fn new(embedder: &'a E) -> Self {
        Self { embedder }
    }

    /// Up to `top_k` matches for `text`, closest first.
    pub fn query(&self, text: &str, ctx: &RetrievalContext, top_k: usize) -> Vec<MatchResult> {
        if !ctx.storage_location.exists() {
            debug!(
                "Storage location {} does not exist",
                ctx.storage_location.display()
            );
            return Vec::new();
        }

        let index = match FaqIndex::open(ctx) {
            Ok(Some(index)) => index,
            Ok(None) => {
                debug!("Collection '{}' not found", ctx.collection_name);
                return Vec::new();
            }
            Err(e) => {
                warn!("Failed to open collection '{}': {e}", ctx.collection_name);
                return Vec::new();
            }
        };

        match index.search(self.embedder, text, top_k) {
            Ok(matches) => {
                debug!("Query matched {} questions", matches.len());
                matches
            }
            Err(e) => {
                warn!("Search in '{}' failed: {e}", ctx.collection_name);
                Vec::new()
            }
        }
    }
}
