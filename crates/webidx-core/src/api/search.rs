//! Search methods on SearchApi.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::api::request::{SearchOutcome, SearchRequest};
use crate::config::MessageConfig;
use crate::engine::{EnginePhase, IndexDatabase, IndexStats};
use crate::error::{Result, WebidxError};
use crate::index::{self, RankedPage};
use crate::SearchApi;

impl SearchApi {
    /// Run a search and deliver the ranked pages to the request's sink.
    ///
    /// The first search initializes the engine and loads the index named by
    /// `dbfile`; later searches reuse both. If the index cannot be
    /// transferred, the request's error callback (if any) receives a message,
    /// no sink is called, and `SearchOutcome::LoadFailed` is returned.
    /// Engine, index and query failures are returned as errors.
    pub async fn search(&self, request: impl Into<SearchRequest>) -> Result<SearchOutcome> {
        let request = request.into();

        self.state.ensure_engine().await?;

        let database = match self.state.database() {
            Some(database) => database,
            None => {
                let location = request.options.dbfile.as_deref().ok_or_else(|| {
                    WebidxError::Config {
                        message: "dbfile is required until the index has been loaded".to_string(),
                    }
                })?;

                match self
                    .load_index(location, request.options.load_timeout())
                    .await
                {
                    Ok(database) => database,
                    Err(e) if e.is_load_failure() => {
                        warn!("Index load failed: {}", e);
                        if let Some(callback) = &request.error_callback {
                            callback(MessageConfig::LOAD_FAILED);
                        }
                        return Ok(SearchOutcome::LoadFailed {
                            message: MessageConfig::LOAD_FAILED.to_string(),
                        });
                    }
                    Err(e) => return Err(e),
                }
            }
        };

        let compiled = index::compile(&request.options.query);
        debug!("Compiled query: {}", compiled.sql());
        let pages = index::run(&compiled, &database)?;

        let sink = request
            .result_sink
            .clone()
            .unwrap_or_else(|| self.default_sink.clone());
        sink.deliver(&pages, &request.options)?;

        Ok(SearchOutcome::Delivered {
            result_count: pages.len(),
        })
    }

    /// Rank pages for `query` against the already loaded index.
    ///
    /// No sink is involved. Fails with a configuration error if no index has
    /// been loaded yet.
    pub fn query(&self, query: &str) -> Result<Vec<RankedPage>> {
        let database = self.loaded_database()?;
        index::run(&index::compile(query), &database)
    }

    /// Load the index at `location` unless one is already loaded.
    ///
    /// Concurrent callers share a single transfer and all observe its
    /// outcome. No caller waits longer than its own `timeout` for the
    /// transfer.
    pub async fn load_index(&self, location: &str, timeout: Duration) -> Result<Arc<IndexDatabase>> {
        let source = self.source.clone();
        let location = location.to_string();
        self.state
            .ensure_database_within(timeout, move || async move {
                source.fetch(&location, timeout).await
            })
            .await
    }

    /// Row counts of the loaded index.
    pub fn stats(&self) -> Result<IndexStats> {
        self.loaded_database()?.stats()
    }

    /// Current bootstrap phase.
    pub fn phase(&self) -> EnginePhase {
        self.state.phase()
    }

    fn loaded_database(&self) -> Result<Arc<IndexDatabase>> {
        self.state.database().ok_or_else(|| WebidxError::Config {
            message: "no index has been loaded yet".to_string(),
        })
    }
}
