//! Embedded relational engine bootstrap.
//!
//! This module provides:
//! - The engine runtime (SQLite checks and scratch space)
//! - Read-only index database handles
//! - `EngineState`, the memoized once-only bootstrap shared by searches

mod database;
mod runtime;
mod state;

pub use database::{IndexDatabase, IndexStats};
pub use runtime::EngineRuntime;
pub use state::{EnginePhase, EngineState};
