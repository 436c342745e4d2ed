//! Error types for webidx.
//!
//! Load failures (`LoadTimeout`, `Network`) are the only errors the search
//! facade routes to a caller-supplied error callback. Everything else
//! propagates to the caller of the search.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Main error type for webidx.
#[derive(Debug, Error)]
pub enum WebidxError {
    // Resource loading
    #[error("Index load timed out after {0:?}")]
    LoadTimeout(Duration),

    #[error("Failed to load {url}: {message}")]
    Network { url: String, message: String },

    // Engine bootstrap
    #[error("Engine bootstrap failed: {message}")]
    Bootstrap { message: String },

    #[error("Malformed index: {message}")]
    MalformedIndex { message: String },

    // Query execution
    #[error("Database error: {message}")]
    Database {
        message: String,
        #[source]
        source: Option<rusqlite::Error>,
    },

    // File system errors
    #[error("IO error at {path:?}: {message}")]
    Io {
        message: String,
        path: Option<PathBuf>,
        #[source]
        source: Option<std::io::Error>,
    },

    // Serialization errors
    #[error("JSON error: {message}")]
    Json {
        message: String,
        #[source]
        source: Option<serde_json::Error>,
    },

    // Configuration errors
    #[error("Configuration error: {message}")]
    Config { message: String },
}

/// Result type alias for webidx operations.
pub type Result<T> = std::result::Result<T, WebidxError>;

impl From<std::io::Error> for WebidxError {
    fn from(err: std::io::Error) -> Self {
        WebidxError::Io {
            message: err.to_string(),
            path: None,
            source: Some(err),
        }
    }
}

impl From<serde_json::Error> for WebidxError {
    fn from(err: serde_json::Error) -> Self {
        WebidxError::Json {
            message: err.to_string(),
            source: Some(err),
        }
    }
}

impl From<rusqlite::Error> for WebidxError {
    fn from(err: rusqlite::Error) -> Self {
        WebidxError::Database {
            message: err.to_string(),
            source: Some(err),
        }
    }
}

impl WebidxError {
    /// Create an IO error with path context.
    pub fn io_with_path(err: std::io::Error, path: impl Into<PathBuf>) -> Self {
        WebidxError::Io {
            message: err.to_string(),
            path: Some(path.into()),
            source: Some(err),
        }
    }

    /// Create a malformed-index error.
    pub fn malformed(message: impl Into<String>) -> Self {
        WebidxError::MalformedIndex {
            message: message.into(),
        }
    }

    /// Create a bootstrap error.
    pub fn bootstrap(message: impl Into<String>) -> Self {
        WebidxError::Bootstrap {
            message: message.into(),
        }
    }

    /// Copy of this error for another caller observing the same failure.
    ///
    /// Source errors are not cloneable; the copy keeps their message only.
    pub fn duplicate(&self) -> Self {
        match self {
            WebidxError::LoadTimeout(timeout) => WebidxError::LoadTimeout(*timeout),
            WebidxError::Network { url, message } => WebidxError::Network {
                url: url.clone(),
                message: message.clone(),
            },
            WebidxError::Bootstrap { message } => WebidxError::Bootstrap {
                message: message.clone(),
            },
            WebidxError::MalformedIndex { message } => WebidxError::MalformedIndex {
                message: message.clone(),
            },
            WebidxError::Database { message, .. } => WebidxError::Database {
                message: message.clone(),
                source: None,
            },
            WebidxError::Io { message, path, .. } => WebidxError::Io {
                message: message.clone(),
                path: path.clone(),
                source: None,
            },
            WebidxError::Json { message, .. } => WebidxError::Json {
                message: message.clone(),
                source: None,
            },
            WebidxError::Config { message } => WebidxError::Config {
                message: message.clone(),
            },
        }
    }

    /// Whether the index transfer itself failed.
    ///
    /// These are reported through the error callback instead of being
    /// returned to the caller.
    pub fn is_load_failure(&self) -> bool {
        matches!(
            self,
            WebidxError::LoadTimeout(_) | WebidxError::Network { .. }
        )
    }
}
