//! Index payload decompression.
//!
//! The index builder ships the SQLite image zlib-deflated. Gzip and zstd
//! wrappers, and uncompressed images, are recognized by their magic bytes.

use crate::config::IndexSchema;
use crate::{Result, WebidxError};
use flate2::read::{GzDecoder, ZlibDecoder};
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::time::Instant;
use tracing::debug;

const GZIP_MAGIC: &[u8] = &[0x1f, 0x8b];
const ZSTD_MAGIC: &[u8] = &[0x28, 0xb5, 0x2f, 0xfd];

/// Compression wrapper of an index payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexCodec {
    /// Sniff the payload.
    #[default]
    Auto,
    Zlib,
    Gzip,
    Zstd,
    /// Already a database image.
    Raw,
}

impl IndexCodec {
    /// Guess the codec from the payload's leading bytes.
    pub fn detect(payload: &[u8]) -> Self {
        if payload.starts_with(GZIP_MAGIC) {
            IndexCodec::Gzip
        } else if payload.starts_with(ZSTD_MAGIC) {
            IndexCodec::Zstd
        } else if payload.starts_with(IndexSchema::SQLITE_HEADER) {
            IndexCodec::Raw
        } else {
            IndexCodec::Zlib
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            IndexCodec::Auto => "auto",
            IndexCodec::Zlib => "zlib",
            IndexCodec::Gzip => "gzip",
            IndexCodec::Zstd => "zstd",
            IndexCodec::Raw => "raw",
        }
    }
}

impl std::fmt::Display for IndexCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Inflate a payload into a SQLite database image.
///
/// Fails with `MalformedIndex` if the payload does not decompress or the
/// result is not a database image.
pub fn inflate(payload: &[u8], codec: IndexCodec) -> Result<Vec<u8>> {
    let start = Instant::now();
    let codec = match codec {
        IndexCodec::Auto => IndexCodec::detect(payload),
        other => other,
    };

    let image = match codec {
        IndexCodec::Zlib => read_all(ZlibDecoder::new(payload), codec)?,
        IndexCodec::Gzip => read_all(GzDecoder::new(payload), codec)?,
        IndexCodec::Zstd => zstd::decode_all(payload)
            .map_err(|e| WebidxError::malformed(format!("zstd: {}", e)))?,
        IndexCodec::Raw | IndexCodec::Auto => payload.to_vec(),
    };

    if !image.starts_with(IndexSchema::SQLITE_HEADER) {
        return Err(WebidxError::malformed(format!(
            "{} payload did not inflate to a SQLite database image",
            codec
        )));
    }

    debug!(
        "Inflated {} index: {} -> {} bytes in {:?}",
        codec,
        payload.len(),
        image.len(),
        start.elapsed()
    );
    Ok(image)
}

fn read_all(mut reader: impl Read, codec: IndexCodec) -> Result<Vec<u8>> {
    let mut image = Vec::new();
    reader
        .read_to_end(&mut image)
        .map_err(|e| WebidxError::malformed(format!("{}: {}", codec, e)))?;
    Ok(image)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::{GzEncoder, ZlibEncoder};
    use flate2::Compression;
    use std::io::Write;

    fn fake_image() -> Vec<u8> {
        let mut image = IndexSchema::SQLITE_HEADER.to_vec();
        image.extend(std::iter::repeat(0xab).take(4096));
        image
    }

    fn zlib(data: &[u8]) -> Vec<u8> {
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(data).unwrap();
        encoder.finish().unwrap()
    }

    fn gzip(data: &[u8]) -> Vec<u8> {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(data).unwrap();
        encoder.finish().unwrap()
    }

    #[test]
    fn test_detect() {
        let image = fake_image();
        assert_eq!(IndexCodec::detect(&zlib(&image)), IndexCodec::Zlib);
        assert_eq!(IndexCodec::detect(&gzip(&image)), IndexCodec::Gzip);
        assert_eq!(
            IndexCodec::detect(&zstd::encode_all(&image[..], 3).unwrap()),
            IndexCodec::Zstd
        );
        assert_eq!(IndexCodec::detect(&image), IndexCodec::Raw);
    }

    #[test]
    fn test_inflate_each_codec() {
        let image = fake_image();
        assert_eq!(inflate(&zlib(&image), IndexCodec::Auto).unwrap(), image);
        assert_eq!(inflate(&gzip(&image), IndexCodec::Auto).unwrap(), image);
        assert_eq!(
            inflate(&zstd::encode_all(&image[..], 3).unwrap(), IndexCodec::Zstd).unwrap(),
            image
        );
        assert_eq!(inflate(&image, IndexCodec::Raw).unwrap(), image);
    }

    #[test]
    fn test_inflate_garbage_is_malformed() {
        let err = inflate(b"definitely not deflate", IndexCodec::Auto).unwrap_err();
        assert!(matches!(err, WebidxError::MalformedIndex { .. }));
    }

    #[test]
    fn test_inflate_non_database_is_malformed() {
        let err = inflate(&zlib(b"<html>404</html>"), IndexCodec::Zlib).unwrap_err();
        assert!(matches!(err, WebidxError::MalformedIndex { .. }));
    }

    #[test]
    fn test_wrong_explicit_codec_is_malformed() {
        let image = fake_image();
        let err = inflate(&gzip(&image), IndexCodec::Zlib).unwrap_err();
        assert!(matches!(err, WebidxError::MalformedIndex { .. }));
    }
}
