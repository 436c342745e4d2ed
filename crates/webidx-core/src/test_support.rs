//! Index fixtures for unit tests.

use flate2::write::ZlibEncoder;
use flate2::Compression;
use rusqlite::{params, Connection};
use std::io::Write;
use tempfile::TempDir;

/// Build an uncompressed SQLite index image.
///
/// `pages` are `(id, title, url)`, `words` are `(id, word)` and
/// `occurrences` are `(word_id, page_id, hits)`.
pub(crate) fn build_image(
    pages: &[(i64, &str, &str)],
    words: &[(i64, &str)],
    occurrences: &[(i64, i64, i64)],
) -> Vec<u8> {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("webidx.db");

    {
        let conn = Connection::open(&path).unwrap();
        conn.execute_batch(
            "CREATE TABLE pages (id INTEGER PRIMARY KEY, title TEXT NOT NULL, url TEXT NOT NULL);
             CREATE TABLE words (id INTEGER PRIMARY KEY, word TEXT NOT NULL UNIQUE);
             CREATE TABLE `index` (word_id INTEGER NOT NULL, page_id INTEGER NOT NULL, hits INTEGER NOT NULL);",
        )
        .unwrap();

        for (id, title, url) in pages {
            conn.execute(
                "INSERT INTO pages (id, title, url) VALUES (?1, ?2, ?3)",
                params![id, title, url],
            )
            .unwrap();
        }
        for (id, word) in words {
            conn.execute("INSERT INTO words (id, word) VALUES (?1, ?2)", params![id, word])
                .unwrap();
        }
        for (word_id, page_id, hits) in occurrences {
            conn.execute(
                "INSERT INTO `index` (word_id, page_id, hits) VALUES (?1, ?2, ?3)",
                params![word_id, page_id, hits],
            )
            .unwrap();
        }
    }

    std::fs::read(&path).unwrap()
}

/// Zlib-deflate a payload the way the index builder does.
pub(crate) fn zlib(data: &[u8]) -> Vec<u8> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

/// Four pages, three words.
///
/// "apple banana" ranks: Fruit Salad (2 + 4), Bananas (5), Apples (3).
pub(crate) fn fruit_index() -> Vec<u8> {
    build_image(
        &[
            (1, "Apples - Site", "/apples.html"),
            (2, "Bananas - Site", "/bananas.html"),
            (3, "Fruit Salad - Site", "/salad.html"),
            (4, "About", "/about.html"),
        ],
        &[(1, "apple"), (2, "banana"), (3, "cherry")],
        &[(1, 1, 3), (2, 2, 5), (1, 3, 2), (2, 3, 4), (3, 4, 1)],
    )
}
