//! Query compilation and ranking over the word index.
//!
//! This module provides:
//! - Tokenization of free-text queries
//! - Compilation into a parameterized multi-term union query
//! - Ranked execution against a loaded index database

mod query;
mod ranker;

pub use query::{compile, compile_terms, tokenize, CompiledQuery};
pub use ranker::{run, RankedPage};
