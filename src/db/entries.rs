use super::{Db, models::*, serialize_vector};
use rusqlite::{Result, params};

impl Db {
    /// Bulk-insert entries into a collection inside one transaction.
    ///
    /// Entries are stored in slice order; that order is what search falls
    /// back to for equal distances.
    pub fn insert_entries(&mut self, collection_id: i64, entries: &[NewEntry<'_>]) -> Result<usize> {
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO faq_entries (collection_id, entry_id, question, answers_json, embedding)
                 VALUES (?, ?, ?, ?, ?)",
            )?;
            for entry in entries {
                stmt.execute(params![
                    collection_id,
                    entry.entry_id,
                    entry.question,
                    entry.answers_json,
                    serialize_vector(entry.embedding),
                ])?;
            }
        }
        tx.commit()?;
        Ok(entries.len())
    }

    /// Number of entries in a collection.
    pub fn count_entries(&self, collection_id: i64) -> Result<usize> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM faq_entries WHERE collection_id = ?",
            params![collection_id],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    /// All entries of a collection in insertion order.
    pub fn list_entries(&self, collection_id: i64) -> Result<Vec<StoredEntry>> {
        let mut stmt = self.conn.prepare(
            "SELECT entry_id, question, answers_json FROM faq_entries
             WHERE collection_id = ? ORDER BY id",
        )?;
        let rows = stmt.query_map(params![collection_id], |row| {
            Ok(StoredEntry {
                entry_id: row.get(0)?,
                question: row.get(1)?,
                answers_json: row.get(2)?,
            })
        })?;
        rows.collect()
    }
}
