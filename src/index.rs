//! Index builder: embeds grouped FAQ records into a named collection.
//!
//! The builder is the only writer of a store. Building is idempotent unless
//! a rebuild is forced: an existing collection is returned untouched and no
//! embedding work is done.
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};

use crate::db::models::{CollectionInfo, NewEntry};
use crate::db::{Db, is_constraint_violation, store_file};
use crate::embedder::Embedder;
use crate::error::{FaqError, Result};
use crate::grouper::{group_rows, merge_records};
use crate::models::{AnswerEntry, FaqRecord, MatchResult, RetrievalContext};
use crate::source::load_rows;

/// How entry ids are assigned at build time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdStrategy {
    /// `q_excel_<n>` by position; ids may change when the sheet is edited.
    #[default]
    Sequential,
    /// `q_<hash>` derived from the question text; stable across rebuilds.
    ContentHash,
}

impl IdStrategy {
    #[must_use]
    pub fn entry_id(self, position: usize, question: &str) -> String {
        match self {
            Self::Sequential => format!("q_excel_{position}"),
            Self::ContentHash => {
                let digest = format!("{:x}", Sha256::digest(question.as_bytes()));
                format!("q_{}", &digest[..16])
            }
        }
    }
}

/// Handle to a built (or previously persisted) collection.
pub struct FaqIndex {
    db: Db,
    info: CollectionInfo,
}

impl FaqIndex {
    /// Open an existing collection read-only.
    ///
    /// Returns `Ok(None)` when the store or the collection does not exist.
    pub fn open(ctx: &RetrievalContext) -> Result<Option<Self>> {
        let path = store_file(&ctx.storage_location);
        if !path.exists() {
            return Ok(None);
        }

        let db = Db::open_read_only(&path)?;
        Ok(db
            .get_collection(&ctx.collection_name)?
            .map(|info| Self { db, info }))
    }

    #[must_use]
    pub fn info(&self) -> &CollectionInfo {
        &self.info
    }

    /// Number of indexed questions.
    pub fn count(&self) -> Result<usize> {
        Ok(self.db.count_entries(self.info.id)?)
    }

    /// Reconstruct every record in insertion order.
    pub fn records(&self) -> Result<Vec<FaqRecord>> {
        self.db
            .list_entries(self.info.id)?
            .into_iter()
            .map(|entry| {
                Ok(FaqRecord {
                    answers: serde_json::from_str(&entry.answers_json)?,
                    question: entry.question,
                })
            })
            .collect()
    }

    /// Nearest questions to `text`, closest first, at most `top_k` of them.
    ///
    /// Fails if `embedder` is not the model the collection was built with.
    /// A match whose stored answers cannot be decoded is kept with no answers.
    pub fn search<E: Embedder + ?Sized>(
        &self,
        embedder: &E,
        text: &str,
        top_k: usize,
    ) -> Result<Vec<MatchResult>> {
        if top_k == 0 {
            return Ok(Vec::new());
        }

        if embedder.model_id() != self.info.embedding_model
            || embedder.dimensions() != self.info.dimensions
        {
            return Err(FaqError::ModelMismatch {
                collection: self.info.name.clone(),
                built_with: format!("{} ({})", self.info.embedding_model, self.info.dimensions),
                queried_with: format!("{} ({})", embedder.model_id(), embedder.dimensions()),
            });
        }

        let query_vector = embedder.embed(text)?;
        let hits = self.db.search(self.info.id, &query_vector, top_k)?;

        Ok(hits
            .into_iter()
            .map(|hit| MatchResult {
                answers: decode_answers(&hit.entry_id, &hit.answers_json),
                question: hit.question,
                distance: hit.distance,
            })
            .collect())
    }
}

fn decode_answers(entry_id: &str, answers_json: &str) -> Vec<AnswerEntry> {
    match serde_json::from_str(answers_json) {
        Ok(answers) => answers,
        Err(e) => {
            warn!("{} in entry {entry_id}; returning it without answers", FaqError::from(e));
            Vec::new()
        }
    }
}

/// Builds collections from grouped records using a fixed embedder.
pub struct IndexBuilder<'a, E: Embedder + ?Sized> {
    embedder: &'a E,
    id_strategy: IdStrategy,
}

impl<'a, E: Embedder + ?Sized> IndexBuilder<'a, E> {
    pub fn new(embedder: &'a E) -> Self {
        Self {
            embedder,
            id_strategy: IdStrategy::default(),
        }
    }

    #[must_use]
    pub fn with_id_strategy(mut self, id_strategy: IdStrategy) -> Self {
        self.id_strategy = id_strategy;
        self
    }

    /// Build `ctx`'s collection from already grouped records.
    ///
    /// Records are re-grouped by trimmed question first, so repeated
    /// questions end up as a single entry.
    pub fn build(
        &self,
        records: &[FaqRecord],
        ctx: &RetrievalContext,
        force_rebuild: bool,
    ) -> Result<FaqIndex> {
        self.ensure(ctx, force_rebuild, || Ok(records.to_vec()))
    }

    /// Build `ctx`'s collection from a spreadsheet.
    ///
    /// The source is only read when a (re)build actually happens.
    pub fn build_from_source(
        &self,
        source_path: &Path,
        ctx: &RetrievalContext,
        force_rebuild: bool,
    ) -> Result<FaqIndex> {
        self.ensure(ctx, force_rebuild, || Ok(group_rows(load_rows(source_path)?)))
    }

    fn ensure<F>(&self, ctx: &RetrievalContext, force_rebuild: bool, load: F) -> Result<FaqIndex>
    where
        F: FnOnce() -> Result<Vec<FaqRecord>>,
    {
        let name = ctx.collection_name.as_str();

        fs::create_dir_all(&ctx.storage_location).map_err(|e| {
            FaqError::Persistence(format!(
                "failed to create {}: {e}",
                ctx.storage_location.display()
            ))
        })?;
        let mut db = Db::open(store_file(&ctx.storage_location))?;

        if !force_rebuild {
            if let Some(info) = db.get_collection(name)? {
                info!("Collection '{name}' already built, loading it");
                return Ok(FaqIndex { db, info });
            }
        }

        // One entry per trimmed question, whatever the caller handed in
        let records = merge_records(load()?);
        if records.is_empty() {
            return Err(FaqError::EmptyDataset);
        }

        // Everything fallible that does not touch the store happens first
        let questions: Vec<&str> = records.iter().map(|r| r.question.as_str()).collect();
        info!("Embedding {} questions with {}", questions.len(), self.embedder.model_id());
        let vectors = self.embedder.embed_batch(&questions)?;
        let answers_json = records
            .iter()
            .map(|r| serde_json::to_string(&r.answers))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        let ids: Vec<String> = records
            .iter()
            .enumerate()
            .map(|(i, r)| self.id_strategy.entry_id(i, &r.question))
            .collect();

        if force_rebuild && db.delete_collection(name)? {
            info!("Deleted existing collection '{name}' for rebuild");
        }

        let info = match db.create_collection(
            name,
            self.embedder.model_id(),
            self.embedder.dimensions(),
        ) {
            Ok(info) => info,
            Err(e) if is_constraint_violation(&e) => {
                warn!(
                    "{}; using the collection created by the other writer",
                    FaqError::DuplicateCollection(name.to_string())
                );
                let info = db.get_collection(name)?.ok_or_else(|| {
                    FaqError::Persistence(format!("collection '{name}' vanished after conflict"))
                })?;
                return Ok(FaqIndex { db, info });
            }
            Err(e) => return Err(e.into()),
        };

        let entries: Vec<NewEntry<'_>> = records
            .iter()
            .enumerate()
            .map(|(i, r)| NewEntry {
                entry_id: &ids[i],
                question: &r.question,
                answers_json: &answers_json[i],
                embedding: &vectors[i],
            })
            .collect();

        let inserted = db.insert_entries(info.id, &entries).map_err(|e| {
            // The empty collection stays behind; a forced rebuild replaces it
            FaqError::Persistence(format!("failed to populate collection '{name}': {e}"))
        })?;
        debug!("Inserted {inserted} entries into '{name}'");
        info!(
            "Built collection '{name}' with {inserted} questions in {}",
            ctx.storage_location.display()
        );

        Ok(FaqIndex { db, info })
    }
}
