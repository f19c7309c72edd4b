use super::{Db, models::CollectionInfo};
use chrono::Utc;
use rusqlite::{OptionalExtension, Result, Row, params};

/// Only metric the store supports.
pub const DISTANCE_METRIC: &str = "cosine";

fn map_collection_row(row: &Row<'_>) -> Result<CollectionInfo> {
    Ok(CollectionInfo {
        id: row.get(0)?,
        name: row.get(1)?,
        embedding_model: row.get(2)?,
        dimensions: row.get::<_, i64>(3)? as usize,
        distance_metric: row.get(4)?,
        created_at: row.get(5)?,
    })
}

impl Db {
    /// Look up a collection by name.
    pub fn get_collection(&self, name: &str) -> Result<Option<CollectionInfo>> {
        self.conn
            .query_row(
                "SELECT id, name, embedding_model, dimensions, distance_metric, created_at
                 FROM collections WHERE name = ?",
                params![name],
                map_collection_row,
            )
            .optional()
    }

    /// Create an empty collection.
    ///
    /// Fails with a constraint violation if the name is already taken.
    pub fn create_collection(
        &self,
        name: &str,
        embedding_model: &str,
        dimensions: usize,
    ) -> Result<CollectionInfo> {
        self.conn.query_row(
            r#"
            INSERT INTO collections (name, embedding_model, dimensions, distance_metric, created_at)
            VALUES (?, ?, ?, ?, ?)
            RETURNING id, name, embedding_model, dimensions, distance_metric, created_at
            "#,
            params![
                name,
                embedding_model,
                dimensions as i64,
                DISTANCE_METRIC,
                Utc::now()
            ],
            map_collection_row,
        )
    }

    /// Delete a collection and its entries. Returns whether it existed.
    pub fn delete_collection(&self, name: &str) -> Result<bool> {
        // Cascades to faq_entries
        let rows = self
            .conn
            .execute("DELETE FROM collections WHERE name = ?", params![name])?;
        Ok(rows > 0)
    }

    /// All collections in creation order.
    pub fn list_collections(&self) -> Result<Vec<CollectionInfo>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, embedding_model, dimensions, distance_metric, created_at
             FROM collections ORDER BY id",
        )?;
        let rows = stmt.query_map([], map_collection_row)?;
        rows.collect()
    }
}
