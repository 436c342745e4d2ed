//! Result sinks for terminal output.

use clap::ValueEnum;
use serde_json::{json, Value};
use std::io::Write;
use std::sync::{Arc, Mutex};
use webidx_core::config::{IndexSchema, MessageConfig};
use webidx_core::sink::trim_title;
use webidx_core::{DialogSink, RankedPage, ResultSink, SearchOptions, WebidxError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// HTML results dialog
    Dialog,
    /// One line per page: hits, title, url
    Text,
    /// One JSON document per search
    Json,
}

impl OutputFormat {
    /// Sink writing this format to stdout.
    pub fn sink(self) -> Arc<dyn ResultSink> {
        match self {
            OutputFormat::Dialog => Arc::new(DialogSink::stdout()),
            OutputFormat::Text => Arc::new(TextSink::new(std::io::stdout())),
            OutputFormat::Json => Arc::new(JsonSink::new(std::io::stdout())),
        }
    }
}

type Output = Mutex<Box<dyn Write + Send>>;

fn write_locked(out: &Output, text: &str) -> webidx_core::Result<()> {
    let mut out = out.lock().map_err(|_| WebidxError::Io {
        message: "Failed to acquire output lock".to_string(),
        path: None,
        source: None,
    })?;
    out.write_all(text.as_bytes())?;
    out.flush()?;
    Ok(())
}

pub struct TextSink {
    out: Output,
}

impl TextSink {
    pub fn new(out: impl Write + Send + 'static) -> Self {
        Self {
            out: Mutex::new(Box::new(out)),
        }
    }
}

/// Plain-text rendering of a result list.
pub fn render_text(pages: &[RankedPage], options: &SearchOptions) -> String {
    if pages.is_empty() {
        return format!("{}\n", MessageConfig::NOTHING_FOUND);
    }

    pages
        .iter()
        .map(|page| {
            format!(
                "{:>6}  {}\n        {}\n",
                page.hits,
                trim_title(page.title(), options),
                page.url()
            )
        })
        .collect()
}

impl ResultSink for TextSink {
    fn deliver(&self, pages: &[RankedPage], options: &SearchOptions) -> webidx_core::Result<()> {
        write_locked(&self.out, &render_text(pages, options))
    }
}

/// JSON document for one search. Page titles are trimmed.
pub fn render_json(pages: &[RankedPage], options: &SearchOptions) -> webidx_core::Result<Value> {
    let mut results = Vec::with_capacity(pages.len());
    for page in pages {
        let mut value = serde_json::to_value(page)?;
        if let Value::Object(fields) = &mut value {
            fields.insert(
                IndexSchema::TITLE_ATTRIBUTE.to_string(),
                Value::from(trim_title(page.title(), options)),
            );
        }
        results.push(value);
    }
    Ok(json!({ "query": options.query, "results": results }))
}

pub struct JsonSink {
    out: Output,
}

impl JsonSink {
    pub fn new(out: impl Write + Send + 'static) -> Self {
        Self {
            out: Mutex::new(Box::new(out)),
        }
    }
}

impl ResultSink for JsonSink {
    fn deliver(&self, pages: &[RankedPage], options: &SearchOptions) -> webidx_core::Result<()> {
        let document = render_json(pages, options)?;
        let mut line = serde_json::to_string(&document)?;
        line.push('\n');
        write_locked(&self.out, &line)
    }
}
