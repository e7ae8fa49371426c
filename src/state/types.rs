//! State types for tracking sync progress
//!
//! These types are serialized to JSON and persisted between runs.

use crate::pagination::PageToken;
use crate::types::compare_replication_values;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Replication state of every resource, keyed by resource name
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct State {
    /// Per-stream state
    pub streams: BTreeMap<String, StreamState>,
}

impl State {
    /// Create a new empty state
    pub fn new() -> Self {
        Self::default()
    }

    /// Get state for a stream
    pub fn get_stream(&self, stream: &str) -> Option<&StreamState> {
        self.streams.get(stream)
    }

    /// Get mutable state for a stream, creating if needed
    pub fn get_stream_mut(&mut self, stream: &str) -> &mut StreamState {
        self.streams.entry(stream.to_string()).or_default()
    }
}

/// State for a single stream
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StreamState {
    /// Highest replication key value observed so far
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replication_key_value: Option<Value>,

    /// Page to resume from, present only while a sync is in flight
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bookmark: Option<PageToken>,
}

impl StreamState {
    /// Create a new empty stream state
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a stream state with a high-water mark
    pub fn with_replication_value(value: Value) -> Self {
        Self {
            replication_key_value: Some(value),
            bookmark: None,
        }
    }

    /// Raise the high-water mark to `candidate` if it is greater.
    ///
    /// Nulls are ignored. Returns whether the mark moved.
    pub fn advance(&mut self, candidate: &Value) -> bool {
        if candidate.is_null() {
            return false;
        }
        let greater = match &self.replication_key_value {
            None | Some(Value::Null) => true,
            Some(current) => compare_replication_values(candidate, current) == Ordering::Greater,
        };
        if greater {
            self.replication_key_value = Some(candidate.clone());
        }
        greater
    }

    /// Fold another state into this one without lowering the mark
    pub fn merge(&mut self, other: StreamState) {
        if let Some(value) = &other.replication_key_value {
            self.advance(value);
        }
        self.bookmark = other.bookmark;
    }
}
