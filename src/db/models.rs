use chrono::{DateTime, Utc};

/// Metadata row of a named collection.
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionInfo {
    pub id: i64,
    pub name: String,
    pub embedding_model: String,
    pub dimensions: usize,
    pub distance_metric: String,
    pub created_at: DateTime<Utc>,
}

/// Entry to be written into a collection.
#[derive(Debug, Clone)]
pub struct NewEntry<'a> {
    pub entry_id: &'a str,
    pub question: &'a str,
    pub answers_json: &'a str,
    pub embedding: &'a [f32],
}

/// Entry read back from a collection, in insertion order.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredEntry {
    pub entry_id: String,
    pub question: String,
    pub answers_json: String,
}

/// Nearest-neighbour hit with its cosine distance.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    pub entry_id: String,
    pub question: String,
    pub answers_json: String,
    pub distance: f64,
}
