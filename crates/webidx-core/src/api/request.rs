//! Per-search request and outcome types.

use crate::config::SearchOptions;
use crate::index::RankedPage;
use crate::sink::{FnSink, ResultSink};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Callback receiving a human-readable message when the index fails to load.
pub type ErrorCallback = Arc<dyn Fn(&str) + Send + Sync>;

/// A search: options plus optional callbacks.
#[derive(Clone)]
pub struct SearchRequest {
    pub options: SearchOptions,
    pub(crate) result_sink: Option<Arc<dyn ResultSink>>,
    pub(crate) error_callback: Option<ErrorCallback>,
}

impl SearchRequest {
    pub fn new(options: SearchOptions) -> Self {
        Self {
            options,
            result_sink: None,
            error_callback: None,
        }
    }

    /// Deliver results to `sink` instead of the API's default sink.
    pub fn with_result_sink(mut self, sink: Arc<dyn ResultSink>) -> Self {
        self.result_sink = Some(sink);
        self
    }

    /// Deliver results to a closure.
    pub fn with_result_callback<F>(self, callback: F) -> Self
    where
        F: Fn(&[RankedPage], &SearchOptions) + Send + Sync + 'static,
    {
        self.with_result_sink(Arc::new(FnSink::new(callback)))
    }

    /// Be told when the index cannot be loaded. Without one, load failures
    /// are only visible in the returned outcome and the logs.
    pub fn with_error_callback<F>(mut self, callback: F) -> Self
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.error_callback = Some(Arc::new(callback));
        self
    }
}

impl From<SearchOptions> for SearchRequest {
    fn from(options: SearchOptions) -> Self {
        Self::new(options)
    }
}

impl std::fmt::Debug for SearchRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchRequest")
            .field("options", &self.options)
            .field("result_sink", &self.result_sink.is_some())
            .field("error_callback", &self.error_callback.is_some())
            .finish()
    }
}

/// What happened to a search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SearchOutcome {
    /// Results were handed to the sink.
    Delivered { result_count: usize },
    /// The index could not be loaded; the sink was not called.
    LoadFailed { message: String },
}

impl SearchOutcome {
    pub fn is_delivered(&self) -> bool {
        matches!(self, SearchOutcome::Delivered { .. })
    }
}
