//! HTTP client for binary index transfers.
//!
//! Thin wrapper around reqwest that:
//! - Applies a per-request timeout covering connect, headers and body
//! - Treats any non-success status as a failed transfer
//! - Maps reqwest errors into the webidx error taxonomy

use crate::config::NetworkConfig;
use crate::{Result, WebidxError};
use bytes::Bytes;
use reqwest::{Client, StatusCode};
use std::time::{Duration, Instant};
use tracing::debug;

/// HTTP client used by the index loader.
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    /// Create a new HTTP client.
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .user_agent(NetworkConfig::USER_AGENT)
            .build()
            .map_err(|e| WebidxError::Network {
                url: String::new(),
                message: format!("Failed to create HTTP client: {}", e),
            })?;

        Ok(Self { client })
    }

    /// Issue a single binary GET and return the body.
    ///
    /// No retries are attempted. A timeout anywhere in the transfer yields
    /// `LoadTimeout(timeout)`.
    pub async fn get_bytes(&self, url: &str, timeout: Duration) -> Result<Bytes> {
        let start = Instant::now();

        let response = self
            .client
            .get(url)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| map_transfer_error(e, url, timeout))?;

        let status = response.status();
        if !Self::is_success(status) {
            return Err(WebidxError::Network {
                url: url.to_string(),
                message: format!("HTTP {}", status),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| map_transfer_error(e, url, timeout))?;

        debug!(
            "GET {} returned {} bytes in {:?}",
            url,
            body.len(),
            start.elapsed()
        );
        Ok(body)
    }

    /// Whether a status code completes a transfer.
    pub fn is_success(status: StatusCode) -> bool {
        status.is_success()
    }
}

fn map_transfer_error(err: reqwest::Error, url: &str, timeout: Duration) -> WebidxError {
    if err.is_timeout() {
        WebidxError::LoadTimeout(timeout)
    } else {
        WebidxError::Network {
            url: url.to_string(),
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_status_codes() {
        assert!(HttpClient::is_success(StatusCode::OK));
        assert!(HttpClient::is_success(StatusCode::NON_AUTHORITATIVE_INFORMATION));

        assert!(!HttpClient::is_success(StatusCode::NOT_MODIFIED));
        assert!(!HttpClient::is_success(StatusCode::NOT_FOUND));
        assert!(!HttpClient::is_success(StatusCode::INTERNAL_SERVER_ERROR));
    }

    #[tokio::test]
    async fn test_client_creation() {
        assert!(HttpClient::new().is_ok());
    }

    #[tokio::test]
    async fn test_unreachable_host_is_network_error() {
        let client = HttpClient::new().unwrap();
        // Port 9 (discard) on loopback is closed in test environments.
        let err = client
            .get_bytes("http://127.0.0.1:9/index.db.gz", Duration::from_secs(2))
            .await
            .unwrap_err();
        assert!(err.is_load_failure());
    }

    #[tokio::test]
    async fn test_timeout_reports_request_timeout() {
        // Accepts connections but never answers.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });

        let client = HttpClient::new().unwrap();
        let timeout = Duration::from_millis(150);
        let err = client
            .get_bytes(&format!("http://{}/webidx.db.gz", addr), timeout)
            .await
            .unwrap_err();

        assert!(matches!(err, WebidxError::LoadTimeout(t) if t == timeout));
    }
}
