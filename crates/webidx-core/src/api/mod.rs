//! API implementation submodules.
//!
//! `search` contains the `impl SearchApi` block; the struct itself lives in
//! `lib.rs`.

mod builder;
mod request;
mod search;

pub use builder::SearchApiBuilder;
pub use request::{ErrorCallback, SearchOutcome, SearchRequest};
