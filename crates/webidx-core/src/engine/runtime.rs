//! Relational engine runtime.
//!
//! Initialization verifies the linked SQLite, probes it with an in-memory
//! connection and prepares a private scratch directory. Database images are
//! materialized into that directory and opened read-only.

use super::database::IndexDatabase;
use crate::config::{EngineConfig, IndexSchema};
use crate::{Result, WebidxError};
use rusqlite::{Connection, OpenFlags};
use std::io::Write;
use std::path::Path;
use std::time::Instant;
use tempfile::TempDir;
use tracing::{debug, info};

/// An initialized engine runtime.
pub struct EngineRuntime {
    scratch: TempDir,
    sqlite_version: String,
}

impl EngineRuntime {
    /// Initialize the runtime off the async executor.
    pub async fn initialize(config: EngineConfig) -> Result<Self> {
        tokio::task::spawn_blocking(move || Self::init_blocking(&config))
            .await
            .map_err(|e| WebidxError::bootstrap(format!("Engine init task failed: {}", e)))?
    }

    pub(crate) fn init_blocking(config: &EngineConfig) -> Result<Self> {
        let start = Instant::now();

        let linked = rusqlite::version_number();
        if linked < config.min_sqlite_version {
            return Err(WebidxError::bootstrap(format!(
                "SQLite {} is older than the required {}",
                rusqlite::version(),
                config.min_sqlite_version
            )));
        }

        let probe = Connection::open_in_memory()
            .map_err(|e| WebidxError::bootstrap(format!("Failed to open probe connection: {}", e)))?;
        let sqlite_version: String = probe
            .query_row("SELECT sqlite_version()", [], |row| row.get(0))
            .map_err(|e| WebidxError::bootstrap(format!("Engine probe failed: {}", e)))?;

        let mut builder = tempfile::Builder::new();
        builder.prefix("webidx-");
        let scratch = match &config.scratch_dir {
            Some(dir) => {
                std::fs::create_dir_all(dir).map_err(|e| {
                    WebidxError::bootstrap(format!(
                        "Failed to create scratch directory {}: {}",
                        dir.display(),
                        e
                    ))
                })?;
                builder.tempdir_in(dir)
            }
            None => builder.tempdir(),
        }
        .map_err(|e| WebidxError::bootstrap(format!("Failed to prepare scratch space: {}", e)))?;

        info!(
            "Engine ready: SQLite {} (scratch {}) in {:?}",
            sqlite_version,
            scratch.path().display(),
            start.elapsed()
        );

        Ok(Self {
            scratch,
            sqlite_version,
        })
    }

    /// Version string reported by the engine.
    pub fn sqlite_version(&self) -> &str {
        &self.sqlite_version
    }

    /// Scratch directory owned by this runtime.
    pub fn scratch_dir(&self) -> &Path {
        self.scratch.path()
    }

    /// Construct a read-only database from a decompressed image.
    pub fn open_database(&self, image: &[u8]) -> Result<IndexDatabase> {
        if !image.starts_with(IndexSchema::SQLITE_HEADER) {
            return Err(WebidxError::malformed("missing SQLite header"));
        }

        let mut file = tempfile::Builder::new()
            .prefix("index-")
            .suffix(".db")
            .tempfile_in(self.scratch.path())
            .map_err(|e| WebidxError::io_with_path(e, self.scratch.path()))?;
        file.write_all(image)
            .and_then(|_| file.flush())
            .map_err(|e| WebidxError::io_with_path(e, file.path()))?;

        let conn = Connection::open_with_flags(
            file.path(),
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(|e| WebidxError::malformed(format!("Engine rejected image: {}", e)))?;

        // Opening is lazy; reading the schema forces SQLite to parse the image.
        let objects: i64 = conn
            .query_row("SELECT COUNT(*) FROM sqlite_master", [], |row| row.get(0))
            .map_err(|e| WebidxError::malformed(format!("Engine rejected image: {}", e)))?;

        debug!(
            "Opened index image {} ({} bytes, {} schema objects)",
            file.path().display(),
            image.len(),
            objects
        );
        Ok(IndexDatabase::new(conn, file, image.len()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{build_image, fruit_index};
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_initialize_in_scratch_dir() {
        let temp_dir = TempDir::new().unwrap();
        let scratch = temp_dir.path().join("engine");

        let runtime = EngineRuntime::initialize(EngineConfig::default().with_scratch_dir(&scratch))
            .await
            .unwrap();

        assert!(runtime.scratch_dir().starts_with(&scratch));
        assert!(runtime.scratch_dir().is_dir());
        assert!(!runtime.sqlite_version().is_empty());
    }

    #[tokio::test]
    async fn test_initialize_rejects_old_engine() {
        let config = EngineConfig {
            min_sqlite_version: i32::MAX,
            ..Default::default()
        };
        let err = EngineRuntime::initialize(config).await.err().unwrap();
        assert!(matches!(err, WebidxError::Bootstrap { .. }));
    }

    #[test]
    fn test_open_database() {
        let runtime = EngineRuntime::init_blocking(&EngineConfig::default()).unwrap();
        let image = fruit_index();

        let database = runtime.open_database(&image).unwrap();
        assert_eq!(database.size_bytes(), image.len());
        assert_eq!(database.stats().unwrap().pages, 4);
    }

    #[test]
    fn test_open_database_rejects_garbage() {
        let runtime = EngineRuntime::init_blocking(&EngineConfig::default()).unwrap();

        let err = runtime.open_database(b"not a database").err().unwrap();
        assert!(matches!(err, WebidxError::MalformedIndex { .. }));

        // Valid header, corrupt body.
        let mut image = build_image(&[], &[], &[]);
        for byte in image.iter_mut().skip(16).take(84) {
            *byte = 0xff;
        }
        let err = runtime.open_database(&image).err().unwrap();
        assert!(matches!(err, WebidxError::MalformedIndex { .. }));
    }
}
