//! Vector store for FAQ collections, backed by SQLite and sqlite-vec.
//!
//! A storage location is a directory holding one SQLite file. Each named
//! collection records the embedding model it was built with; its entries
//! carry the question, the JSON-encoded answers, and the question vector.
use rusqlite::{Connection, ErrorCode, OpenFlags, Result};
use sqlite_vec::sqlite3_vec_init;
use std::path::{Path, PathBuf};
use std::sync::Once;
use tracing::{debug, info};

pub mod collections;
pub mod entries;
pub mod models;
pub mod search;

/// File name of the store inside a storage directory.
pub const STORE_FILE_NAME: &str = "faq_index.sqlite3";

const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS collections (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE,
    embedding_model TEXT NOT NULL,
    dimensions INTEGER NOT NULL,
    distance_metric TEXT NOT NULL DEFAULT 'cosine',
    created_at DATETIME NOT NULL
);

CREATE TABLE IF NOT EXISTS faq_entries (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    collection_id INTEGER NOT NULL,
    entry_id TEXT NOT NULL,
    question TEXT NOT NULL,
    answers_json TEXT NOT NULL,
    embedding BLOB NOT NULL,
    FOREIGN KEY (collection_id) REFERENCES collections(id) ON DELETE CASCADE,
    UNIQUE(collection_id, entry_id)
);

CREATE INDEX IF NOT EXISTS idx_entries_collection ON faq_entries(collection_id);
"#;

static INIT_VEC: Once = Once::new();

/// Register the sqlite-vec extension for every new connection. Safe to call multiple times.
fn init_sqlite_vec() {
    INIT_VEC.call_once(|| unsafe {
        rusqlite::ffi::sqlite3_auto_extension(Some(std::mem::transmute(
            sqlite3_vec_init as *const (),
        )));
    });
}

/// Path of the SQLite file inside a storage directory.
#[must_use]
pub fn store_file(storage_dir: &Path) -> PathBuf {
    storage_dir.join(STORE_FILE_NAME)
}

/// A SQLite connection with sqlite-vec loaded.
pub struct Db {
    pub(crate) conn: Connection,
}

impl Db {
    /// Open (creating if needed) the store file at `path` and initialize the schema.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Opening FAQ store: {}", path.display());
        init_sqlite_vec();
        Self::init(Connection::open(path)?, true)
    }

    /// Open an existing store without writing anything to it.
    pub fn open_read_only<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        debug!("Opening FAQ store read-only: {}", path.display());
        init_sqlite_vec();
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        Self::init(conn, false)
    }

    /// Open an in-memory store (useful for testing).
    pub fn open_in_memory() -> Result<Self> {
        init_sqlite_vec();
        Self::init(Connection::open_in_memory()?, true)
    }

    fn init(conn: Connection, writable: bool) -> Result<Self> {
        let vec_version: String = conn.query_row("SELECT vec_version()", [], |row| row.get(0))?;
        debug!("sqlite-vec version: {vec_version}");

        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        if writable {
            conn.execute_batch(SCHEMA_SQL)?;
        }

        Ok(Self { conn })
    }
}

/// Whether `err` is a UNIQUE/constraint violation (e.g. a concurrently created collection).
#[must_use]
pub fn is_constraint_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _) if e.code == ErrorCode::ConstraintViolation
    )
}

/// Serialize a float32 vector into the little-endian blob layout sqlite-vec reads.
pub fn serialize_vector(vec: &[f32]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(vec.len() * 4);
    for v in vec {
        bytes.extend_from_slice(&v.to_le_bytes());
    }
    bytes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_db_init() {
        let db = Db::open_in_memory().expect("Failed to open in-memory DB");

        let tables: usize = db
            .conn
            .query_row(
                "SELECT count(*) FROM sqlite_master WHERE type='table' AND name IN ('collections', 'faq_entries')",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(tables, 2);
    }

    #[test]
    fn test_open_creates_file_and_reopens_read_only() {
        let dir = tempfile::tempdir().unwrap();
        let path = store_file(dir.path());
        Db::open(&path).unwrap();
        assert!(path.exists());

        let ro = Db::open_read_only(&path).unwrap();
        let write = ro.conn.execute_batch(
            "INSERT INTO collections (name, embedding_model, dimensions, created_at) VALUES ('x', 'm', 1, 0)",
        );
        assert!(write.is_err(), "read-only store must reject writes");
    }

    #[test]
    fn test_open_read_only_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Db::open_read_only(store_file(dir.path())).is_err());
    }

    #[test]
    fn test_serialize_vector() {
        let bytes = serialize_vector(&[1.0, 2.0, -3.5]);
        assert_eq!(bytes.len(), 12);
        assert_eq!(&bytes[0..4], &[0x00, 0x00, 0x80, 0x3f]);
        assert_eq!(&bytes[4..8], &[0x00, 0x00, 0x00, 0x40]);
        assert_eq!(&bytes[8..12], &[0x00, 0x00, 0x60, 0xc0]);
    }
}
