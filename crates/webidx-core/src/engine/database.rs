//! Loaded index database handle.

use crate::config::IndexSchema;
use crate::{Result, WebidxError};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use std::sync::Mutex;
use tempfile::NamedTempFile;

/// Row counts of the three index relations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexStats {
    pub pages: u64,
    pub words: u64,
    pub occurrences: u64,
}

/// A read-only index database.
///
/// The relations never change after construction, so the handle is shared
/// freely between searches. Queries are serialized on the connection lock.
pub struct IndexDatabase {
    conn: Mutex<Connection>,
    // Declared after `conn` so the connection closes before the file goes.
    _image: NamedTempFile,
    size_bytes: usize,
}

impl IndexDatabase {
    pub(crate) fn new(conn: Connection, image: NamedTempFile, size_bytes: usize) -> Self {
        Self {
            conn: Mutex::new(conn),
            _image: image,
            size_bytes,
        }
    }

    /// Size of the decompressed image.
    pub fn size_bytes(&self) -> usize {
        self.size_bytes
    }

    /// Run `f` with exclusive access to the connection.
    pub fn with_connection<T>(&self, f: impl FnOnce(&Connection) -> Result<T>) -> Result<T> {
        let conn = self.conn.lock().map_err(|_| WebidxError::Database {
            message: "Failed to acquire connection lock".to_string(),
            source: None,
        })?;
        f(&conn)
    }

    /// Count rows in each relation.
    pub fn stats(&self) -> Result<IndexStats> {
        self.with_connection(|conn| {
            let count = |table: &str| -> Result<u64> {
                let sql = format!("SELECT COUNT(*) FROM \"{}\"", table);
                let n: i64 = conn.query_row(&sql, [], |row| row.get(0))?;
                Ok(n.max(0) as u64)
            };

            Ok(IndexStats {
                pages: count(IndexSchema::PAGES_TABLE)?,
                words: count(IndexSchema::WORDS_TABLE)?,
                occurrences: count(IndexSchema::OCCURRENCES_TABLE)?,
            })
        })
    }
}
