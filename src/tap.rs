//! The tap: spec, check, discover and read
//!
//! `Tap` ties the validated configuration, the resource registry and a
//! transport together. The CLI is a thin layer over it.

use crate::config::{config_schema, Catalog, TapConfig};
use crate::engine::{MessageSink, SyncConfig, SyncEngine, SyncStats};
use crate::error::{Error, Result};
use crate::http::{HttpClient, RequestConfig, Transport};
use crate::params::ParamContext;
use crate::resources::ResourceRegistry;
use crate::state::StateManager;
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::info;

// ============================================================================
// Tap Spec
// ============================================================================

/// Tap specification returned by `spec`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TapSpec {
    /// Tap name
    pub name: String,

    /// Human-readable title
    pub title: String,

    /// Description
    pub description: Option<String>,

    /// JSON schema of the configuration
    pub connection_specification: Value,
}

// ============================================================================
// Check Result
// ============================================================================

/// Result of a connection check
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckResult {
    /// Whether the check succeeded
    pub success: bool,

    /// Error message if failed
    pub message: Option<String>,
}

impl CheckResult {
    /// Create a successful check result
    pub fn success() -> Self {
        Self {
            success: true,
            message: None,
        }
    }

    /// Create a failed check result
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
        }
    }
}

// ============================================================================
// Read Options
// ============================================================================

/// What to read and how
#[derive(Debug, Clone, Default)]
pub struct ReadOptions {
    /// Resources to read; empty means all
    pub streams: Vec<String>,
    /// Engine switches
    pub sync: SyncConfig,
    /// Override of the current date
    pub today: Option<NaiveDate>,
}

impl ReadOptions {
    /// Read every resource with default switches
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict the read to `streams`
    #[must_use]
    pub fn with_streams(mut self, streams: Vec<String>) -> Self {
        self.streams = streams;
        self
    }

    /// Set engine switches
    #[must_use]
    pub fn with_sync(mut self, sync: SyncConfig) -> Self {
        self.sync = sync;
        self
    }

    /// Override the current date
    #[must_use]
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }
}

/// Outcome of a read
#[derive(Debug)]
pub struct ReadReport {
    /// Counters per resource
    pub stats: SyncStats,
    /// Failure that ended the read, if any
    pub error: Option<Error>,
}

impl ReadReport {
    /// Whether every selected resource completed
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

// ============================================================================
// Tap
// ============================================================================

/// A configured tap
pub struct Tap {
    config: TapConfig,
    registry: ResourceRegistry,
    transport: Arc<dyn Transport>,
}

impl Tap {
    /// Build a tap talking to the API over HTTP
    pub fn new(config: TapConfig) -> Result<Self> {
        let client = HttpClient::with_auth(config.http_client_config(), config.authenticator()?)?;
        Self::with_transport(config, Arc::new(client))
    }

    /// Build a tap over any transport
    pub fn with_transport(config: TapConfig, transport: Arc<dyn Transport>) -> Result<Self> {
        Ok(Self {
            config,
            registry: ResourceRegistry::new()?,
            transport,
        })
    }

    /// Tap specification; needs no configuration
    pub fn spec() -> TapSpec {
        TapSpec {
            name: crate::NAME.to_string(),
            title: "Social Analytics".to_string(),
            description: Some(
                "Incremental extraction of brand analytics from the Facebook, Instagram, \
                 Pinterest and Twitter backends"
                    .to_string(),
            ),
            connection_specification: config_schema(),
        }
    }

    /// Validated configuration
    pub fn config(&self) -> &TapConfig {
        &self.config
    }

    /// Resource registry
    pub fn registry(&self) -> &ResourceRegistry {
        &self.registry
    }

    /// Send one authenticated request for the first resource
    pub async fn check(&self) -> CheckResult {
        match self.try_check().await {
            Ok(()) => CheckResult::success(),
            Err(e) => CheckResult::failure(format!("Connection failed: {e}")),
        }
    }

    async fn try_check(&self) -> Result<()> {
        let resource = self
            .registry
            .iter()
            .next()
            .ok_or_else(|| Error::config("no resources are registered"))?;
        let url = resource.url(&self.config.api_url, self.config.brand_id)?;
        let ctx = ParamContext::new(
            self.config.start_date,
            self.config.end_date,
            Utc::now().date_naive(),
        );
        let query = resource.params.build(&ctx, None)?;

        info!(stream = resource.name, %url, "Checking connection");
        let request = RequestConfig::with_query(query).retries(0);
        let response = self.transport.get(&url, request).await?;
        response.error_for_status()
    }

    /// Discovery catalog of every resource
    pub fn discover(&self) -> Catalog {
        self.registry.catalog()
    }

    /// Names of every resource
    pub fn stream_names(&self) -> Vec<&'static str> {
        self.registry.names()
    }

    /// Read the selected resources, streaming messages into `sink`.
    ///
    /// Selecting an unknown resource fails before any request. Failures
    /// during extraction are returned in the report with the statistics of
    /// everything attempted.
    pub async fn read(
        &self,
        state: StateManager,
        options: ReadOptions,
        sink: &mut dyn MessageSink,
    ) -> Result<ReadReport> {
        let resources = self.registry.select(&options.streams)?;

        let mut engine = SyncEngine::new(Arc::clone(&self.transport), state, &self.config)
            .with_config(options.sync);
        if let Some(today) = options.today {
            engine = engine.with_today(today);
        }

        let error = engine.sync(&resources, sink).await.err();
        Ok(ReadReport {
            stats: engine.stats().clone(),
            error,
        })
    }
}
