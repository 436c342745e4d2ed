//! Integration tests for the webidx binary.

use flate2::write::ZlibEncoder;
use flate2::Compression;
use rusqlite::{params, Connection};
use serde_json::Value;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};
use tempfile::TempDir;

/// Write a compressed three-page index into `dir`.
fn write_index(dir: &Path) -> PathBuf {
    let db_path = dir.join("site.db");
    {
        let conn = Connection::open(&db_path).unwrap();
        conn.execute_batch(
            "CREATE TABLE pages (id INTEGER PRIMARY KEY, title TEXT, url TEXT);
             CREATE TABLE words (id INTEGER PRIMARY KEY, word TEXT UNIQUE);
             CREATE TABLE `index` (word_id INTEGER, page_id INTEGER, hits INTEGER);",
        )
        .unwrap();
        for (id, title, url) in [
            (1, "Apples - Site", "/apples.html"),
            (2, "Bananas - Site", "/bananas.html"),
            (3, "Fruit Salad - Site", "/salad.html"),
        ] {
            conn.execute("INSERT INTO pages VALUES (?1, ?2, ?3)", params![id, title, url])
                .unwrap();
        }
        for (id, word) in [(1, "apple"), (2, "banana")] {
            conn.execute("INSERT INTO words VALUES (?1, ?2)", params![id, word])
                .unwrap();
        }
        for (word_id, page_id, hits) in [(1, 1, 3), (2, 2, 5), (1, 3, 2), (2, 3, 4)] {
            conn.execute(
                "INSERT INTO `index` VALUES (?1, ?2, ?3)",
                params![word_id, page_id, hits],
            )
            .unwrap();
        }
    }

    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(&std::fs::read(&db_path).unwrap())
        .unwrap();
    let index_path = dir.join("webidx.db.gz");
    std::fs::write(&index_path, encoder.finish().unwrap()).unwrap();
    index_path
}

fn webidx(args: &[&str], stdin: &str) -> Output {
    let mut child = Command::new(env!("CARGO_BIN_EXE_webidx"))
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to start webidx");

    child
        .stdin
        .take()
        .unwrap()
        .write_all(stdin.as_bytes())
        .unwrap();
    child.wait_with_output().unwrap()
}

fn stdout(output: &Output) -> String {
    String::from_utf8(output.stdout.clone()).unwrap()
}

#[test]
fn test_single_query_text() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let index = write_index(temp_dir.path());

    let output = webidx(
        &[
            "--dbfile",
            index.to_str().unwrap(),
            "--title-suffix",
            " - Site",
            "apple",
            "banana",
        ],
        "",
    );

    assert!(output.status.success());
    let lines: Vec<String> = stdout(&output).lines().map(str::to_string).collect();
    assert_eq!(lines[0], "     6  Fruit Salad");
    assert_eq!(lines[2], "     5  Bananas");
    assert_eq!(lines[4], "     3  Apples");
}

#[test]
fn test_stdin_queries_json() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let index = write_index(temp_dir.path());

    let output = webidx(
        &["--dbfile", index.to_str().unwrap(), "--format", "json"],
        "banana\n\ndurian\n",
    );

    assert!(output.status.success());
    let documents: Vec<Value> = stdout(&output)
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(documents.len(), 2);
    assert_eq!(documents[0]["query"], "banana");
    assert_eq!(documents[0]["results"][0]["url"], "/bananas.html");
    assert_eq!(documents[1]["results"], Value::Array(Vec::new()));
}

#[test]
fn test_dialog_format() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let index = write_index(temp_dir.path());

    let output = webidx(
        &["--dbfile", index.to_str().unwrap(), "--format", "dialog", "durian"],
        "",
    );

    assert!(output.status.success());
    let html = stdout(&output);
    assert!(html.starts_with("<dialog"));
    assert!(html.contains("Nothing found."));
}

#[test]
fn test_stats() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let index = write_index(temp_dir.path());

    let output = webidx(&["--dbfile", index.to_str().unwrap(), "--stats"], "");

    assert!(output.status.success());
    assert_eq!(stdout(&output), "3 pages, 2 words, 4 occurrences\n");
}

#[test]
fn test_load_failure_exits_nonzero() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let missing = temp_dir.path().join("missing.db.gz");

    let output = webidx(&["--dbfile", missing.to_str().unwrap(), "apple"], "");

    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("Unable to load index, please refresh the page."));
}
