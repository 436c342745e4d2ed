//! Centralized configuration for webidx.
//!
//! This module provides constants for network operations, the on-disk index
//! schema, engine bootstrap and user-facing messages, plus the per-search
//! options accepted by the search facade.

use crate::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Network-related configuration.
pub struct NetworkConfig;

impl NetworkConfig {
    pub const DEFAULT_LOAD_TIMEOUT: Duration = Duration::from_millis(5000);
    pub const USER_AGENT: &'static str = "webidx/0.3";
}

/// Relation and column names of a precompiled index file.
pub struct IndexSchema;

impl IndexSchema {
    pub const PAGES_TABLE: &'static str = "pages";
    pub const WORDS_TABLE: &'static str = "words";
    /// `index` is a SQL keyword, so the compiled query always quotes it.
    pub const OCCURRENCES_TABLE: &'static str = "index";
    pub const WORD_TEXT_COLUMN: &'static str = "word";
    pub const HITS_COLUMN: &'static str = "hits";
    pub const PAGE_ID_COLUMN: &'static str = "page_id";
    pub const WORD_ID_COLUMN: &'static str = "word_id";
    pub const TITLE_ATTRIBUTE: &'static str = "title";
    pub const URL_ATTRIBUTE: &'static str = "url";
    /// Named parameter prefix; term `i` binds to `:word{i}`.
    pub const TERM_PARAMETER_PREFIX: &'static str = ":word";
    /// Every valid SQLite database image starts with this header.
    pub const SQLITE_HEADER: &'static [u8; 16] = b"SQLite format 3\0";
}

/// User-facing strings.
pub struct MessageConfig;

impl MessageConfig {
    pub const LOAD_FAILED: &'static str = "Unable to load index, please refresh the page.";
    pub const DIALOG_HEADING: &'static str = "Search Results";
    pub const NOTHING_FOUND: &'static str = "Nothing found.";
    pub const CLOSE_BUTTON: &'static str = "Close";
}

/// Configuration for the relational engine runtime.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Where the runtime prepares its scratch space. Defaults to the system
    /// temp directory.
    pub scratch_dir: Option<PathBuf>,
    /// Minimum linked SQLite version, as returned by
    /// `rusqlite::version_number()`.
    pub min_sqlite_version: i32,
}

impl EngineConfig {
    /// 3.25.0
    pub const DEFAULT_MIN_SQLITE_VERSION: i32 = 3_025_000;

    pub fn with_scratch_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.scratch_dir = Some(dir.into());
        self
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            scratch_dir: None,
            min_sqlite_version: Self::DEFAULT_MIN_SQLITE_VERSION,
        }
    }
}

/// Options for a single search.
///
/// Mirrors the options object accepted by the browser front-end, so a JSON
/// blob like `{"query": "rust", "dbfile": "/idx.db.gz", "titleSuffix": " - Site"}`
/// deserializes directly.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchOptions {
    /// Free-text query.
    pub query: String,
    /// URL (or local path) of the compressed index. Required until the
    /// database has been loaded once.
    #[serde(default)]
    pub dbfile: Option<String>,
    /// Load timeout in milliseconds.
    #[serde(default)]
    pub timeout: Option<u64>,
    /// Literal prefix stripped from rendered titles.
    #[serde(default)]
    pub title_prefix: Option<String>,
    /// Literal suffix stripped from rendered titles.
    #[serde(default)]
    pub title_suffix: Option<String>,
}

impl SearchOptions {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Default::default()
        }
    }

    pub fn with_dbfile(mut self, dbfile: impl Into<String>) -> Self {
        self.dbfile = Some(dbfile.into());
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout = Some(timeout_ms);
        self
    }

    pub fn with_title_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.title_prefix = Some(prefix.into());
        self
    }

    pub fn with_title_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.title_suffix = Some(suffix.into());
        self
    }

    /// Parse options from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Effective load timeout.
    pub fn load_timeout(&self) -> Duration {
        self.timeout
            .map(Duration::from_millis)
            .unwrap_or(NetworkConfig::DEFAULT_LOAD_TIMEOUT)
    }
}
