//! Execution engine module
//!
//! Incremental extraction loop and resource orchestration.
//!
//! # Overview
//!
//! The engine module provides:
//! - `SyncEngine` - drives the page loop of each resource and commits state
//! - `SyncConfig` - per-page checkpointing and fail-fast switches
//! - `Message` / `MessageSink` - records, state checkpoints and logs as they
//!   are produced
//!
//! Each resource goes through `init → fetching → normalizing → advancing`
//! once per page, until the pagination strategy returns no token. Pages are
//! fetched strictly one after the other. A page is normalized and validated
//! in full before any of its records reaches the sink.

mod types;

pub use types::{
    Message, MessageSink, StreamStatus, StreamSummary, SyncConfig, SyncPhase, SyncStats,
};

use crate::config::TapConfig;
use crate::error::{Error, Result};
use crate::http::{RawResponse, RequestConfig, Transport};
use crate::normalize::ResponseNormalizer;
use crate::pagination::PageToken;
use crate::params::ParamContext;
use crate::resources::ResourceDefinition;
use crate::schema::validate_record;
use crate::state::{StateManager, StreamState};
use crate::types::Record;
use chrono::{NaiveDate, Utc};
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Field every record is tagged with
const BRAND_FIELD: &str = "brand_id";

/// Sync engine for orchestrating data extraction
pub struct SyncEngine {
    /// Transport used for every request
    transport: Arc<dyn Transport>,
    /// State manager
    state: StateManager,
    /// Sync configuration
    config: SyncConfig,
    /// Base URL template
    api_url: String,
    /// Brand every request is scoped to
    brand_id: u64,
    /// Configured start boundary
    start_date: Option<NaiveDate>,
    /// Configured end boundary
    end_date: Option<NaiveDate>,
    /// Date "yesterday" is computed from
    today: NaiveDate,
    /// Statistics
    stats: SyncStats,
}

/// Counters of the resource being synced
#[derive(Debug, Default)]
struct PageProgress {
    records: usize,
    pages: usize,
    phase: Option<SyncPhase>,
}

impl PageProgress {
    fn enter(&mut self, stream: &str, phase: SyncPhase) {
        debug!(stream, page = self.pages + 1, %phase, "Sync phase");
        self.phase = Some(phase);
    }
}

impl SyncEngine {
    /// Create a new sync engine
    pub fn new(transport: Arc<dyn Transport>, state: StateManager, tap: &TapConfig) -> Self {
        Self {
            transport,
            state,
            config: SyncConfig::default(),
            api_url: tap.api_url.clone(),
            brand_id: tap.brand_id,
            start_date: tap.start_date,
            end_date: tap.end_date,
            today: Utc::now().date_naive(),
            stats: SyncStats::default(),
        }
    }

    /// Set sync configuration
    #[must_use]
    pub fn with_config(mut self, config: SyncConfig) -> Self {
        self.config = config;
        self
    }

    /// Override the current date
    #[must_use]
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = today;
        self
    }

    /// Get the state manager
    pub fn state(&self) -> &StateManager {
        &self.state
    }

    /// Get statistics
    pub fn stats(&self) -> &SyncStats {
        &self.stats
    }

    /// Sync resources one after the other.
    ///
    /// State is checkpointed and emitted after every resource that
    /// completes. In fail-fast mode the first failure stops the run;
    /// otherwise the remaining resources are still attempted and the first
    /// failure is returned at the end.
    pub async fn sync(
        &mut self,
        resources: &[&ResourceDefinition],
        sink: &mut dyn MessageSink,
    ) -> Result<()> {
        let started = Instant::now();
        let mut first_error = None;

        for resource in resources {
            match self.sync_resource(resource, sink).await {
                Ok(_) => {
                    self.state.checkpoint().await?;
                    sink.emit(Message::state(self.state.to_value().await?))?;
                }
                Err(e) => {
                    sink.emit(Message::error(e.to_string()))?;
                    if self.config.fail_fast {
                        self.stats.set_duration(elapsed_ms(started));
                        return Err(e);
                    }
                    first_error.get_or_insert(e);
                }
            }
        }

        self.stats.set_duration(elapsed_ms(started));
        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Sync a single resource.
    ///
    /// On success the resource state is committed to the state manager (not
    /// saved). On failure nothing is committed beyond per-page checkpoints,
    /// and the error names the resource.
    pub async fn sync_resource(
        &mut self,
        resource: &ResourceDefinition,
        sink: &mut dyn MessageSink,
    ) -> Result<StreamSummary> {
        let stream = resource.name;
        info!(stream, service = %resource.service, "Starting sync");
        sink.emit(Message::info(format!("Starting sync for stream: {stream}")))?;

        let mut progress = PageProgress::default();
        let result = self.run_pages(resource, sink, &mut progress).await;

        let status = match &result {
            Ok(()) => StreamStatus::Succeeded,
            Err(e) => StreamStatus::Failed {
                kind: e.kind(),
                error: e.to_string(),
            },
        };
        let summary = StreamSummary {
            stream: stream.to_string(),
            records: progress.records,
            pages: progress.pages,
            status,
        };
        self.stats.add_stream(summary.clone());

        match result {
            Ok(()) => {
                info!(
                    stream,
                    records = progress.records,
                    pages = progress.pages,
                    "Completed sync"
                );
                sink.emit(Message::info(format!(
                    "Completed sync for {stream}: {} records in {} pages",
                    progress.records, progress.pages
                )))?;
                Ok(summary)
            }
            Err(e) => {
                let phase = progress.phase.unwrap_or(SyncPhase::Init);
                warn!(stream, %phase, error = %e, "Sync failed");
                Err(Error::stream_failed(stream, e))
            }
        }
    }

    async fn run_pages(
        &self,
        resource: &ResourceDefinition,
        sink: &mut dyn MessageSink,
        progress: &mut PageProgress,
    ) -> Result<()> {
        let stream = resource.name;
        progress.enter(stream, SyncPhase::Init);

        let stored = self.state.stream_state(stream).await.unwrap_or_default();
        let mut current = StreamState {
            replication_key_value: stored.replication_key_value.clone(),
            bookmark: None,
        };
        let mut token = stored.bookmark;
        if let Some(bookmark) = &token {
            info!(stream, %bookmark, "Resuming from bookmark");
        }

        let url = resource.url(&self.api_url, self.brand_id)?;
        let ctx = ParamContext::new(self.start_date, self.end_date, self.today)
            .with_replication_value(stored.replication_key_value);

        if resource.params.is_empty_window(&ctx)? {
            info!(
                stream,
                start = %ctx.start_boundary()?,
                end = %ctx.end_boundary(),
                "Date window is empty, nothing to request"
            );
            progress.enter(stream, SyncPhase::Done);
            self.state.commit_stream(stream, current).await;
            return Ok(());
        }

        loop {
            progress.enter(stream, SyncPhase::Fetching);
            let query = resource.params.build(&ctx, token.as_ref())?;
            let response = self
                .transport
                .get(&url, RequestConfig::with_query(query))
                .await?;
            response.error_for_status()?;
            progress.pages += 1;

            progress.enter(stream, SyncPhase::Normalizing);
            let records = self.normalize_page(resource, &response, token.as_ref())?;
            debug!(stream, count = records.len(), url = %response.url, "Page normalized");
            for record in records.iter().cloned() {
                sink.emit(Message::record(stream, record))?;
            }
            progress.records += records.len();

            progress.enter(stream, SyncPhase::Advancing);
            if let Some(key) = resource.replication_key {
                for value in records.iter().filter_map(|r| r.get(key)) {
                    current.advance(value);
                }
            }
            let next = resource
                .pagination
                .next_token(&response, token.as_ref(), self.today)?;

            if self.config.checkpoint_per_page {
                if let Some(next) = &next {
                    self.checkpoint_page(stream, &current, next, sink).await?;
                }
            }

            match next {
                Some(next) => token = Some(next),
                None => break,
            }
        }

        progress.enter(stream, SyncPhase::Done);
        self.state.commit_stream(stream, current).await;
        Ok(())
    }

    /// Normalize, tag and validate one page, all or nothing
    fn normalize_page(
        &self,
        resource: &ResourceDefinition,
        response: &RawResponse,
        token: Option<&PageToken>,
    ) -> Result<Vec<Record>> {
        let mut records =
            resource
                .normalizer
                .normalize(response)
                .map_err(|e| Error::Normalization {
                    stream: resource.name.to_string(),
                    token: token.map(ToString::to_string),
                    status: response.status,
                    message: e.to_string(),
                })?;

        for record in &mut records {
            record.insert(BRAND_FIELD.to_string(), Value::from(self.brand_id));
            validate_record(resource.name, &resource.schema, record)?;
        }
        Ok(records)
    }

    async fn checkpoint_page(
        &self,
        stream: &str,
        current: &StreamState,
        next: &PageToken,
        sink: &mut dyn MessageSink,
    ) -> Result<()> {
        let update = StreamState {
            replication_key_value: current.replication_key_value.clone(),
            bookmark: Some(next.clone()),
        };
        self.state.commit_stream(stream, update).await;
        self.state.checkpoint().await?;
        sink.emit(Message::state(self.state.to_value().await?))
    }
}

fn elapsed_ms(started: Instant) -> u64 {
    started.elapsed().as_millis() as u64
}

#[cfg(test)]
mod tests;
