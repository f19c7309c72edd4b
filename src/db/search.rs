use super::{Db, models::SearchHit, serialize_vector};
use rusqlite::{Result, params};

impl Db {
    /// Nearest entries of a collection by cosine distance, closest first.
    ///
    /// Equal distances keep insertion order.
    pub fn search(
        &self,
        collection_id: i64,
        query_vector: &[f32],
        top_k: usize,
    ) -> Result<Vec<SearchHit>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT
                entry_id,
                question,
                answers_json,
                vec_distance_cosine(embedding, ?) AS distance
            FROM faq_entries
            WHERE collection_id = ?
            ORDER BY distance ASC, id ASC
            LIMIT ?
            "#,
        )?;

        let rows = stmt.query_map(
            params![serialize_vector(query_vector), collection_id, top_k as i64],
            |row| {
                Ok(SearchHit {
                    entry_id: row.get(0)?,
                    question: row.get(1)?,
                    answers_json: row.get(2)?,
                    distance: row.get(3)?,
                })
            },
        )?;

        rows.collect()
    }
}
