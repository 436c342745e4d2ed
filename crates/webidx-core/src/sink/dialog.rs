//! Default result presentation: an HTML `<dialog>` fragment.
//!
//! The markup matches what the browser front-end builds: a heading, either
//! a "Nothing found." paragraph or a list of linked titles with their URLs,
//! and a form with a Close button.

use super::ResultSink;
use crate::config::{MessageConfig, SearchOptions};
use crate::index::RankedPage;
use crate::{Result, WebidxError};
use std::fmt::Write as _;
use std::io::Write;
use std::sync::Mutex;
use tracing::debug;

/// Strip the configured literal suffix, then the literal prefix.
///
/// Each is applied independently and at most once.
pub fn trim_title<'a>(title: &'a str, options: &SearchOptions) -> &'a str {
    let mut title = title;

    if let Some(suffix) = options.title_suffix.as_deref().filter(|s| !s.is_empty()) {
        title = title.strip_suffix(suffix).unwrap_or(title);
    }

    if let Some(prefix) = options.title_prefix.as_deref().filter(|s| !s.is_empty()) {
        title = title.strip_prefix(prefix).unwrap_or(title);
    }

    title
}

/// Escape text for an HTML text node or quoted attribute.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Render the results dialog.
pub fn render_dialog(pages: &[RankedPage], options: &SearchOptions) -> String {
    let mut html = String::new();

    html.push_str("<dialog class=\"webidx-results-dialog\">\n");
    let _ = writeln!(html, "  <h2>{}</h2>", MessageConfig::DIALOG_HEADING);

    if pages.is_empty() {
        let _ = writeln!(html, "  <p>{}</p>", MessageConfig::NOTHING_FOUND);
    } else {
        html.push_str("  <ul>\n");
        for page in pages {
            let url = escape_html(page.url());
            let _ = writeln!(
                html,
                "    <li><a href=\"{url}\">{title}</a><br><span class=\"webidx-page-url\">{url}</span></li>",
                url = url,
                title = escape_html(trim_title(page.title(), options)),
            );
        }
        html.push_str("  </ul>\n");
    }

    let _ = writeln!(
        html,
        "  <form method=\"dialog\"><button autofocus>{}</button></form>",
        MessageConfig::CLOSE_BUTTON
    );
    html.push_str("</dialog>\n");
    html
}

/// Writes the rendered dialog to an output stream.
pub struct DialogSink {
    out: Mutex<Box<dyn Write + Send>>,
}

impl DialogSink {
    pub fn new(out: impl Write + Send + 'static) -> Self {
        Self {
            out: Mutex::new(Box::new(out)),
        }
    }

    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl Default for DialogSink {
    fn default() -> Self {
        Self::stdout()
    }
}

impl ResultSink for DialogSink {
    fn deliver(&self, pages: &[RankedPage], options: &SearchOptions) -> Result<()> {
        let html = render_dialog(pages, options);
        let mut out = self.out.lock().map_err(|_| WebidxError::Io {
            message: "Failed to acquire output lock".to_string(),
            path: None,
            source: None,
        })?;

        out.write_all(html.as_bytes())?;
        out.flush()?;
        debug!("Rendered results dialog with {} pages", pages.len());
        Ok(())
    }
}
