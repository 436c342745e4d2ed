//! Result consumers.
//!
//! A search hands its ranked pages to a `ResultSink`. `DialogSink` is the
//! default; callers substitute their own per search or per API instance.

mod dialog;

pub use dialog::{escape_html, render_dialog, trim_title, DialogSink};

use crate::config::SearchOptions;
use crate::index::RankedPage;
use crate::Result;

/// Consumer of a ranked result list.
pub trait ResultSink: Send + Sync {
    /// Receive the pages for one search, most relevant first.
    fn deliver(&self, pages: &[RankedPage], options: &SearchOptions) -> Result<()>;
}

/// Adapts a closure into a `ResultSink`.
pub struct FnSink<F>(F);

impl<F> FnSink<F>
where
    F: Fn(&[RankedPage], &SearchOptions) + Send + Sync,
{
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

impl<F> ResultSink for FnSink<F>
where
    F: Fn(&[RankedPage], &SearchOptions) + Send + Sync,
{
    fn deliver(&self, pages: &[RankedPage], options: &SearchOptions) -> Result<()> {
        (self.0)(pages, options);
        Ok(())
    }
}
