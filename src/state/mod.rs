//! State management module
//!
//! Handles high-water mark tracking, checkpointing, and resumability.
//! State is persisted between runs to enable incremental syncs.
//!
//! # Overview
//!
//! The state module provides:
//! - `State` - per-resource replication state, serialized as
//!   `{"<resource>": {"replication_key_value": ...}}`
//! - `StateManager` - shared in-memory state with atomic file persistence
//! - Checkpointing between resources (and optionally between pages)

mod manager;
mod types;

pub use manager::StateManager;
pub use types::{State, StreamState};

#[cfg(test)]
mod manager_tests;
