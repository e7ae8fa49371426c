//! Engine types
//!
//! Message types, sinks and configuration for the sync engine.

use crate::error::{ErrorKind, Result};
use crate::types::{LogLevel, Record};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt;

/// A message emitted during sync
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    /// One validated record
    Record {
        /// Stream name
        stream: String,
        /// The record
        record: Record,
        /// When the record was emitted
        emitted_at: DateTime<Utc>,
    },
    /// Full state checkpoint
    State(Value),
    /// Log message
    Log {
        /// Log level
        level: LogLevel,
        /// Log message
        message: String,
    },
}

impl Message {
    /// Create a record message
    pub fn record(stream: impl Into<String>, record: Record) -> Self {
        Self::Record {
            stream: stream.into(),
            record,
            emitted_at: Utc::now(),
        }
    }

    /// Create a state message
    pub fn state(state: Value) -> Self {
        Self::State(state)
    }

    /// Create a log message
    pub fn log(level: LogLevel, message: impl Into<String>) -> Self {
        Self::Log {
            level,
            message: message.into(),
        }
    }

    /// Create an info log
    pub fn info(message: impl Into<String>) -> Self {
        Self::log(LogLevel::Info, message)
    }

    /// Create a debug log
    pub fn debug(message: impl Into<String>) -> Self {
        Self::log(LogLevel::Debug, message)
    }

    /// Create a warning log
    pub fn warn(message: impl Into<String>) -> Self {
        Self::log(LogLevel::Warn, message)
    }

    /// Create an error log
    pub fn error(message: impl Into<String>) -> Self {
        Self::log(LogLevel::Error, message)
    }

    /// Check if this is a record message
    pub fn is_record(&self) -> bool {
        matches!(self, Self::Record { .. })
    }

    /// Check if this is a state message
    pub fn is_state(&self) -> bool {
        matches!(self, Self::State(_))
    }

    /// Check if this is a log message
    pub fn is_log(&self) -> bool {
        matches!(self, Self::Log { .. })
    }

    /// Protocol form of the message, one JSON object per line
    pub fn to_json(&self) -> Value {
        match self {
            Self::Record {
                stream,
                record,
                emitted_at,
            } => json!({
                "type": "RECORD",
                "stream": stream,
                "record": record,
                "emitted_at": emitted_at.to_rfc3339(),
            }),
            Self::State(value) => json!({
                "type": "STATE",
                "value": value,
            }),
            Self::Log { level, message } => json!({
                "type": "LOG",
                "level": level.as_str(),
                "message": message,
            }),
        }
    }
}

/// Destination of engine messages.
///
/// Records are handed over as soon as their page is validated.
pub trait MessageSink: Send {
    /// Accept one message
    fn emit(&mut self, message: Message) -> Result<()>;
}

impl MessageSink for Vec<Message> {
    fn emit(&mut self, message: Message) -> Result<()> {
        self.push(message);
        Ok(())
    }
}

/// Configuration for sync operation
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Commit and emit state after every page that has a successor
    pub checkpoint_per_page: bool,
    /// Stop at the first failed resource
    pub fail_fast: bool,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            checkpoint_per_page: false,
            fail_fast: true,
        }
    }
}

impl SyncConfig {
    /// Create a new sync config
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Checkpoint state after each page
    #[must_use]
    pub fn with_state_per_page(mut self, checkpoint: bool) -> Self {
        self.checkpoint_per_page = checkpoint;
        self
    }

    /// Set fail fast mode
    #[must_use]
    pub fn with_fail_fast(mut self, fail_fast: bool) -> Self {
        self.fail_fast = fail_fast;
        self
    }
}

/// Where the page loop of a resource currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncPhase {
    /// Restoring the high-water mark
    Init,
    /// Building parameters and sending the request
    Fetching,
    /// Normalizing, tagging and validating a page
    Normalizing,
    /// Raising the high-water mark and finding the next page
    Advancing,
    /// No more pages
    Done,
}

impl fmt::Display for SyncPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SyncPhase::Init => "init",
            SyncPhase::Fetching => "fetching",
            SyncPhase::Normalizing => "normalizing",
            SyncPhase::Advancing => "advancing",
            SyncPhase::Done => "done",
        };
        f.write_str(name)
    }
}

/// Outcome of one resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StreamStatus {
    /// Every page was extracted
    Succeeded,
    /// The resource was aborted
    Failed {
        /// Category of the failure
        kind: ErrorKind,
        /// Cause of the failure
        error: String,
    },
}

/// Per-resource counters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamSummary {
    /// Resource name
    pub stream: String,
    /// Records emitted
    pub records: usize,
    /// Pages fetched
    pub pages: usize,
    /// Outcome
    #[serde(flatten)]
    pub status: StreamStatus,
}

impl StreamSummary {
    /// Whether the resource completed
    pub fn succeeded(&self) -> bool {
        self.status == StreamStatus::Succeeded
    }
}

/// Statistics from a sync operation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SyncStats {
    /// Total records emitted
    pub records_synced: usize,
    /// Total pages fetched
    pub pages_fetched: usize,
    /// Resources that completed
    pub streams_synced: usize,
    /// Resources that failed
    pub errors: usize,
    /// Duration in milliseconds
    pub duration_ms: u64,
    /// One entry per attempted resource
    pub streams: Vec<StreamSummary>,
}

impl SyncStats {
    /// Create new stats
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the outcome of a resource
    pub fn add_stream(&mut self, summary: StreamSummary) {
        self.records_synced += summary.records;
        self.pages_fetched += summary.pages;
        if summary.succeeded() {
            self.streams_synced += 1;
        } else {
            self.errors += 1;
        }
        self.streams.push(summary);
    }

    /// Set duration
    pub fn set_duration(&mut self, ms: u64) {
        self.duration_ms = ms;
    }

    /// Whether every attempted resource completed
    pub fn is_success(&self) -> bool {
        self.errors == 0
    }

    /// Names of the failed resources
    pub fn failed_streams(&self) -> Vec<&str> {
        self.streams
            .iter()
            .filter(|s| !s.succeeded())
            .map(|s| s.stream.as_str())
            .collect()
    }
}
