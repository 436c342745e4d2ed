//! Index file loading.
//!
//! `IndexSource` is the seam the engine bootstrap fetches through. The
//! default `IndexLoader` understands `http`/`https` URLs, `file` URLs and
//! plain filesystem paths.

use crate::network::client::HttpClient;
use crate::{Result, WebidxError};
use async_trait::async_trait;
use bytes::Bytes;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::info;
use url::Url;

/// Something that can produce the raw (still compressed) index payload.
#[async_trait]
pub trait IndexSource: Send + Sync {
    /// Fetch the payload at `location`, giving up after `timeout`.
    async fn fetch(&self, location: &str, timeout: Duration) -> Result<Bytes>;
}

/// Where an index location points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexLocation {
    Remote(Url),
    Local(PathBuf),
}

impl IndexLocation {
    /// Classify a location string.
    pub fn parse(location: &str) -> Result<Self> {
        match Url::parse(location) {
            Ok(url) => match url.scheme() {
                "http" | "https" => Ok(IndexLocation::Remote(url)),
                "file" => url
                    .to_file_path()
                    .map(IndexLocation::Local)
                    .map_err(|_| WebidxError::Config {
                        message: format!("Invalid file URL: {}", location),
                    }),
                // Drive letters parse as one-character schemes.
                scheme if scheme.len() == 1 => Ok(IndexLocation::Local(PathBuf::from(location))),
                scheme => Err(WebidxError::Config {
                    message: format!("Unsupported index URL scheme: {}", scheme),
                }),
            },
            Err(url::ParseError::RelativeUrlWithoutBase) => {
                Ok(IndexLocation::Local(PathBuf::from(location)))
            }
            Err(e) => Err(WebidxError::Config {
                message: format!("Invalid index location {}: {}", location, e),
            }),
        }
    }
}

/// Default index source backed by HTTP and the local filesystem.
pub struct IndexLoader {
    http: HttpClient,
}

impl IndexLoader {
    /// Create a loader with its own HTTP client.
    pub fn new() -> Result<Self> {
        Ok(Self {
            http: HttpClient::new()?,
        })
    }

    async fn read_local(path: &Path, timeout: Duration) -> Result<Bytes> {
        match tokio::time::timeout(timeout, tokio::fs::read(path)).await {
            Ok(Ok(data)) => Ok(Bytes::from(data)),
            Ok(Err(e)) => Err(WebidxError::Network {
                url: path.display().to_string(),
                message: e.to_string(),
            }),
            Err(_) => Err(WebidxError::LoadTimeout(timeout)),
        }
    }
}

#[async_trait]
impl IndexSource for IndexLoader {
    async fn fetch(&self, location: &str, timeout: Duration) -> Result<Bytes> {
        let start = Instant::now();

        let payload = match IndexLocation::parse(location)? {
            IndexLocation::Remote(url) => self.http.get_bytes(url.as_str(), timeout).await?,
            IndexLocation::Local(path) => Self::read_local(&path, timeout).await?,
        };

        info!(
            "Loaded index {} ({} bytes) in {:?}",
            location,
            payload.len(),
            start.elapsed()
        );
        Ok(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use tokio::net::TcpListener;

    #[test]
    fn test_parse_locations() {
        assert!(matches!(
            IndexLocation::parse("https://example.com/webidx.db.gz").unwrap(),
            IndexLocation::Remote(_)
        ));
        assert_eq!(
            IndexLocation::parse("site/webidx.db.gz").unwrap(),
            IndexLocation::Local(PathBuf::from("site/webidx.db.gz"))
        );
        assert_eq!(
            IndexLocation::parse("/srv/site/webidx.db.gz").unwrap(),
            IndexLocation::Local(PathBuf::from("/srv/site/webidx.db.gz"))
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_parse_file_url() {
        assert_eq!(
            IndexLocation::parse("file:///srv/site/webidx.db.gz").unwrap(),
            IndexLocation::Local(PathBuf::from("/srv/site/webidx.db.gz"))
        );
    }

    #[test]
    fn test_parse_unsupported_scheme() {
        let err = IndexLocation::parse("ftp://example.com/webidx.db.gz").unwrap_err();
        assert!(matches!(err, WebidxError::Config { .. }));
    }

    #[tokio::test]
    async fn test_fetch_local_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("webidx.db.gz");
        std::fs::write(&path, b"payload").unwrap();

        let loader = IndexLoader::new().unwrap();
        let bytes = loader
            .fetch(path.to_str().unwrap(), Duration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(&bytes[..], b"payload");
    }

    #[tokio::test]
    async fn test_fetch_missing_file_is_load_failure() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("missing.db.gz");

        let loader = IndexLoader::new().unwrap();
        let err = loader
            .fetch(path.to_str().unwrap(), Duration::from_secs(5))
            .await
            .unwrap_err();
        assert!(err.is_load_failure());
    }

    #[tokio::test]
    async fn test_fetch_times_out_on_silent_server() {
        // Accepts connections but never writes a response.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });

        let loader = IndexLoader::new().unwrap();
        let timeout = Duration::from_millis(200);
        let err = loader
            .fetch(&format!("http://{}/webidx.db.gz", addr), timeout)
            .await
            .unwrap_err();

        match err {
            WebidxError::LoadTimeout(elapsed) => assert_eq!(elapsed, timeout),
            other => panic!("expected LoadTimeout, got {:?}", other),
        }
    }
}
