//! Index file transfer.
//!
//! This module provides:
//! - An HTTP client that fetches binary payloads with a timeout
//! - The `IndexSource` seam plus a default loader for URLs and local paths

mod client;
mod loader;

pub use client::HttpClient;
pub use loader::{IndexLoader, IndexLocation, IndexSource};
