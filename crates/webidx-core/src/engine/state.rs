//! Memoized engine and database bootstrap.
//!
//! `EngineState` is the context every search goes through. The runtime and
//! the database are each built at most once per state. A database build runs
//! as a single shared attempt: callers that arrive while it is in flight join
//! it and observe its outcome, success or failure. A failed attempt is
//! discarded, so the next caller starts a fresh one.

use super::database::IndexDatabase;
use super::runtime::EngineRuntime;
use crate::codec::{self, IndexCodec};
use crate::config::EngineConfig;
use crate::{Result, WebidxError};
use bytes::Bytes;
use futures::future::{BoxFuture, FutureExt, Shared};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::{Arc, Mutex, OnceLock};
use std::time::{Duration, Instant};
use tokio::sync::OnceCell;
use tracing::{debug, info};

/// Bootstrap progress. Only ever moves forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnginePhase {
    Uninitialized,
    EngineReady,
    DatabaseReady,
}

/// Outcome of a database build, cloned out to every caller awaiting it.
type AttemptOutcome = std::result::Result<Arc<IndexDatabase>, Arc<WebidxError>>;
type Attempt = Shared<BoxFuture<'static, AttemptOutcome>>;

#[derive(Default)]
struct Loading {
    generation: u64,
    attempt: Option<Attempt>,
}

/// Engine runtime plus the loaded database, each initialized once.
pub struct EngineState {
    config: EngineConfig,
    codec: IndexCodec,
    engine: OnceCell<Arc<EngineRuntime>>,
    database: Arc<OnceLock<Arc<IndexDatabase>>>,
    loading: Arc<Mutex<Loading>>,
}

impl EngineState {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            codec: IndexCodec::Auto,
            engine: OnceCell::new(),
            database: Arc::new(OnceLock::new()),
            loading: Arc::new(Mutex::new(Loading::default())),
        }
    }

    /// Force a payload codec instead of sniffing.
    pub fn with_codec(mut self, codec: IndexCodec) -> Self {
        self.codec = codec;
        self
    }

    pub fn phase(&self) -> EnginePhase {
        if self.database.get().is_some() {
            EnginePhase::DatabaseReady
        } else if self.engine.initialized() {
            EnginePhase::EngineReady
        } else {
            EnginePhase::Uninitialized
        }
    }

    /// The loaded database, if any.
    pub fn database(&self) -> Option<Arc<IndexDatabase>> {
        self.database.get().cloned()
    }

    /// Initialize the engine runtime on first use.
    pub async fn ensure_engine(&self) -> Result<Arc<EngineRuntime>> {
        self.engine
            .get_or_try_init(|| async {
                let runtime = EngineRuntime::initialize(self.config.clone()).await?;
                Ok::<_, WebidxError>(Arc::new(runtime))
            })
            .await
            .cloned()
    }

    /// Build the database from an already fetched payload on first use.
    ///
    /// Later calls return the existing database and ignore `payload`.
    pub async fn ensure_database_from_bytes(&self, payload: Bytes) -> Result<Arc<IndexDatabase>> {
        self.ensure_database_with(move || async move { Ok(payload) })
            .await
    }

    /// Fetch, inflate and open the database on first use.
    ///
    /// `fetch` runs only when no database exists and no attempt is in
    /// flight. Otherwise the caller waits for the running attempt.
    pub async fn ensure_database_with<F, Fut>(&self, fetch: F) -> Result<Arc<IndexDatabase>>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<Bytes>> + Send + 'static,
    {
        self.ensure_database(None, fetch).await
    }

    /// Like `ensure_database_with`, bounded by `timeout`.
    ///
    /// A caller that starts the attempt bounds its fetch by `timeout`; when
    /// that expires the attempt fails for everyone waiting on it. A caller
    /// that joins a running attempt stops waiting after its own `timeout`
    /// and leaves the attempt running.
    pub async fn ensure_database_within<F, Fut>(
        &self,
        timeout: Duration,
        fetch: F,
    ) -> Result<Arc<IndexDatabase>>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<Bytes>> + Send + 'static,
    {
        self.ensure_database(Some(timeout), fetch).await
    }

    async fn ensure_database<F, Fut>(
        &self,
        timeout: Option<Duration>,
        fetch: F,
    ) -> Result<Arc<IndexDatabase>>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<Bytes>> + Send + 'static,
    {
        if let Some(database) = self.database.get() {
            return Ok(database.clone());
        }

        let engine = self.ensure_engine().await?;
        let (attempt, started) = self.join_or_start(engine, timeout, fetch)?;

        let outcome = match timeout {
            Some(timeout) if !started => match tokio::time::timeout(timeout, attempt).await {
                Ok(outcome) => outcome,
                Err(_) => return Err(WebidxError::LoadTimeout(timeout)),
            },
            // The starter's fetch is already bounded inside the attempt.
            _ => attempt.await,
        };

        outcome.map_err(|e| e.duplicate())
    }

    /// Join the in-flight attempt, or start one. Returns whether it started.
    fn join_or_start<F, Fut>(
        &self,
        engine: Arc<EngineRuntime>,
        timeout: Option<Duration>,
        fetch: F,
    ) -> Result<(Attempt, bool)>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<Bytes>> + Send + 'static,
    {
        let mut loading = self
            .loading
            .lock()
            .map_err(|_| WebidxError::bootstrap("Index load state lock poisoned"))?;

        if let Some(database) = self.database.get() {
            let database = database.clone();
            let ready = async move { Ok::<_, Arc<WebidxError>>(database) };
            return Ok((ready.boxed().shared(), true));
        }

        if let Some(attempt) = &loading.attempt {
            debug!("Joining in-flight index load");
            return Ok((attempt.clone(), false));
        }

        loading.generation += 1;
        let generation = loading.generation;
        let build = build_database(engine, self.codec, timeout, fetch);
        let database = self.database.clone();
        let slot = self.loading.clone();

        // Runs detached so the attempt completes even if every waiter gives up.
        let task = tokio::spawn(async move {
            let outcome = match build.await {
                Ok(built) => Ok(database.get_or_init(|| built).clone()),
                Err(e) => Err(Arc::new(e)),
            };
            if let Ok(mut loading) = slot.lock() {
                if loading.generation == generation {
                    loading.attempt = None;
                }
            }
            outcome
        });

        let attempt = async move {
            task.await.unwrap_or_else(|e| {
                Err(Arc::new(WebidxError::bootstrap(format!(
                    "Index load task failed: {}",
                    e
                ))))
            })
        }
        .boxed()
        .shared();

        loading.attempt = Some(attempt.clone());
        Ok((attempt, true))
    }
}

async fn build_database<F, Fut>(
    engine: Arc<EngineRuntime>,
    codec: IndexCodec,
    timeout: Option<Duration>,
    fetch: F,
) -> Result<Arc<IndexDatabase>>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<Bytes>>,
{
    let payload = match timeout {
        Some(timeout) => tokio::time::timeout(timeout, fetch())
            .await
            .unwrap_or_else(|_| Err(WebidxError::LoadTimeout(timeout)))?,
        None => fetch().await?,
    };
    let start = Instant::now();
    let compressed = payload.len();

    let database = tokio::task::spawn_blocking(move || {
        let image = codec::inflate(&payload, codec)?;
        engine.open_database(&image)
    })
    .await
    .map_err(|e| WebidxError::bootstrap(format!("Database build task failed: {}", e)))??;

    info!(
        "Index database ready: {} compressed -> {} bytes in {:?}",
        compressed,
        database.size_bytes(),
        start.elapsed()
    );
    Ok(Arc::new(database))
}

impl Default for EngineState {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}
