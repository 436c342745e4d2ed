//! webidx core - headless search over precompiled, compressed word indexes.
//!
//! An index file is a deflated SQLite database holding `pages`, `words` and
//! an inverted `index` of per-page word hits. This crate fetches it once,
//! ranks pages for free-text queries by summed hits, and hands the ranked
//! list to a pluggable result sink.
//!
//! # Example
//!
//! ```rust,ignore
//! use webidx_core::{SearchApi, SearchOptions, SearchRequest};
//!
//! #[tokio::main]
//! async fn main() -> webidx_core::Result<()> {
//!     let api = SearchApi::new()?;
//!
//!     let request = SearchRequest::new(
//!         SearchOptions::new("async runtime")
//!             .with_dbfile("https://example.com/webidx.db.gz")
//!             .with_title_suffix(" - Example"),
//!     )
//!     .with_result_callback(|pages, _| {
//!         for page in pages {
//!             println!("{} ({} hits) {}", page.title(), page.hits, page.url());
//!         }
//!     })
//!     .with_error_callback(|message| eprintln!("{}", message));
//!
//!     api.search(request).await?;
//!     Ok(())
//! }
//! ```

pub mod codec;
pub mod config;
pub mod engine;
pub mod error;
pub mod index;
pub mod network;
pub mod sink;

mod api;

#[cfg(test)]
mod test_support;

// Re-export commonly used types
pub use api::{ErrorCallback, SearchApiBuilder, SearchOutcome, SearchRequest};
pub use codec::IndexCodec;
pub use config::{EngineConfig, SearchOptions};
pub use engine::{EnginePhase, EngineState, IndexDatabase, IndexStats};
pub use error::{Result, WebidxError};
pub use index::{CompiledQuery, RankedPage};
pub use network::{IndexLoader, IndexSource};
pub use sink::{DialogSink, FnSink, ResultSink};

use std::sync::Arc;

/// Main entry point for searching.
///
/// Holds the engine state, so every search made through one `SearchApi`
/// (or its clones) shares a single engine runtime and a single loaded
/// index. Separate instances are fully isolated.
#[derive(Clone)]
pub struct SearchApi {
    state: Arc<EngineState>,
    source: Arc<dyn IndexSource>,
    default_sink: Arc<dyn ResultSink>,
}

impl SearchApi {
    /// Create a SearchApi with default settings.
    pub fn new() -> Result<Self> {
        Self::builder().build()
    }

    /// Create a builder for SearchApi.
    pub fn builder() -> SearchApiBuilder {
        SearchApiBuilder::new()
    }
}
