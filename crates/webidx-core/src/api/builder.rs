//! Builder for configuring SearchApi initialization.

use std::path::PathBuf;
use std::sync::Arc;

use crate::codec::IndexCodec;
use crate::config::EngineConfig;
use crate::engine::EngineState;
use crate::error::Result;
use crate::network::{IndexLoader, IndexSource};
use crate::sink::{DialogSink, ResultSink};
use crate::SearchApi;

/// Builder for configuring SearchApi initialization.
///
/// # Example
///
/// ```rust,ignore
/// use webidx_core::SearchApi;
///
/// let api = SearchApi::builder()
///     .scratch_dir("/var/cache/webidx")
///     .default_sink(Arc::new(MySink))
///     .build()?;
/// ```
pub struct SearchApiBuilder {
    engine_config: EngineConfig,
    codec: IndexCodec,
    source: Option<Arc<dyn IndexSource>>,
    default_sink: Option<Arc<dyn ResultSink>>,
}

impl SearchApiBuilder {
    pub fn new() -> Self {
        Self {
            engine_config: EngineConfig::default(),
            codec: IndexCodec::Auto,
            source: None,
            default_sink: None,
        }
    }

    /// Replace the whole engine configuration.
    pub fn engine_config(mut self, config: EngineConfig) -> Self {
        self.engine_config = config;
        self
    }

    /// Directory the engine runtime prepares its scratch space in.
    ///
    /// Default: the system temp directory
    pub fn scratch_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.engine_config.scratch_dir = Some(dir.into());
        self
    }

    /// Force the payload codec instead of sniffing it.
    ///
    /// Default: `IndexCodec::Auto`
    pub fn codec(mut self, codec: IndexCodec) -> Self {
        self.codec = codec;
        self
    }

    /// Fetch index payloads through `source`.
    ///
    /// Default: `IndexLoader` (HTTP and local files)
    pub fn index_source(mut self, source: Arc<dyn IndexSource>) -> Self {
        self.source = Some(source);
        self
    }

    /// Sink used by searches that do not bring their own.
    ///
    /// Default: `DialogSink` on stdout
    pub fn default_sink(mut self, sink: Arc<dyn ResultSink>) -> Self {
        self.default_sink = Some(sink);
        self
    }

    /// Build the SearchApi instance.
    ///
    /// Nothing is initialized or fetched until the first search.
    pub fn build(self) -> Result<SearchApi> {
        let source = match self.source {
            Some(source) => source,
            None => Arc::new(IndexLoader::new()?),
        };
        let default_sink = self
            .default_sink
            .unwrap_or_else(|| Arc::new(DialogSink::stdout()));

        Ok(SearchApi {
            state: Arc::new(EngineState::new(self.engine_config).with_codec(self.codec)),
            source,
            default_sink,
        })
    }
}

impl Default for SearchApiBuilder {
    fn default() -> Self {
        Self::new()
    }
}
