//! CLI runner - executes commands

use crate::cli::commands::{parse_stream_list, Cli, Commands, OutputFormat};
use crate::config::TapConfig;
use crate::engine::{Message, MessageSink, SyncConfig};
use crate::error::{Error, Result};
use crate::state::StateManager;
use crate::tap::{ReadOptions, ReadReport, Tap};
use serde_json::{json, Value};
use std::io::{self, Write};
use tracing::info;

/// Writes protocol messages to stdout
#[derive(Debug, Clone, Copy)]
pub struct StdoutSink {
    format: OutputFormat,
}

impl StdoutSink {
    /// Create a sink for the given format
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Write one message
    pub fn write(&self, msg: &Value) -> Result<()> {
        let line = render(msg, self.format)?;
        let mut stdout = io::stdout().lock();
        writeln!(stdout, "{line}")?;
        Ok(())
    }
}

impl MessageSink for StdoutSink {
    fn emit(&mut self, message: Message) -> Result<()> {
        self.write(&message.to_json())
    }
}

/// Serialize a message in the requested format
pub(crate) fn render(msg: &Value, format: OutputFormat) -> Result<String> {
    let line = match format {
        OutputFormat::Json => serde_json::to_string(msg)?,
        OutputFormat::Pretty => serde_json::to_string_pretty(msg)?,
    };
    Ok(line)
}

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        match &self.cli.command {
            Commands::Spec => self.spec(),
            Commands::Check => self.check().await,
            Commands::Discover => self.discover(),
            Commands::Streams => self.streams(),
            Commands::Read {
                streams,
                state_per_page,
                keep_going,
            } => {
                self.read(streams.as_deref(), *state_per_page, *keep_going)
                    .await
            }
        }
    }

    /// Load configuration; inline JSON takes precedence over the file
    pub(crate) fn load_config(&self) -> Result<TapConfig> {
        if let Some(json_str) = &self.cli.config_json {
            return TapConfig::from_json(json_str);
        }
        if let Some(path) = &self.cli.config {
            return TapConfig::from_file(path);
        }
        Err(Error::config("a configuration is required (--config or --config-json)"))
    }

    /// Load state
    pub(crate) fn load_state(&self) -> Result<StateManager> {
        if let Some(state_json) = &self.cli.state_json {
            StateManager::from_json(state_json)
        } else if let Some(path) = &self.cli.state {
            StateManager::from_file(path)
        } else {
            Ok(StateManager::in_memory())
        }
    }

    fn tap(&self) -> Result<Tap> {
        Tap::new(self.load_config()?)
    }

    fn output_message(&self, msg: &Value) -> Result<()> {
        StdoutSink::new(self.cli.format).write(msg)
    }

    /// Show spec
    fn spec(&self) -> Result<()> {
        let spec = Tap::spec();
        self.output_message(&json!({
            "type": "SPEC",
            "spec": {
                "name": spec.name,
                "title": spec.title,
                "description": spec.description,
                "connectionSpecification": spec.connection_specification
            }
        }))
    }

    /// Check connection
    async fn check(&self) -> Result<()> {
        let tap = self.tap()?;
        self.output_message(&json!({
            "type": "LOG",
            "level": "INFO",
            "message": format!("Checking connection for brand {}", tap.config().brand_id)
        }))?;

        let result = tap.check().await;
        let status = if result.success { "SUCCEEDED" } else { "FAILED" };
        self.output_message(&json!({
            "type": "CONNECTION_STATUS",
            "connectionStatus": {
                "status": status,
                "message": result.message.as_deref().unwrap_or("Connection successful")
            }
        }))?;

        if result.success {
            Ok(())
        } else {
            Err(Error::auth(
                result.message.unwrap_or_else(|| "connection check failed".to_string()),
            ))
        }
    }

    /// Discover streams
    fn discover(&self) -> Result<()> {
        let tap = self.tap()?;
        let catalog = tap.discover();
        self.output_message(&json!({
            "type": "CATALOG",
            "catalog": catalog
        }))
    }

    /// List available streams (lightweight, no schemas)
    fn streams(&self) -> Result<()> {
        let tap = self.tap()?;
        self.output_message(&json!({
            "type": "STREAMS",
            "streams": tap.stream_names()
        }))
    }

    /// Read streams
    async fn read(&self, streams: Option<&str>, state_per_page: bool, keep_going: bool) -> Result<()> {
        let tap = self.tap()?;
        let state = self.load_state()?;

        let options = ReadOptions::new()
            .with_streams(parse_stream_list(streams))
            .with_sync(
                SyncConfig::new()
                    .with_state_per_page(state_per_page)
                    .with_fail_fast(!keep_going),
            );

        info!(brand_id = tap.config().brand_id, "Starting read");
        let mut sink = StdoutSink::new(self.cli.format);
        let report = tap.read(state, options, &mut sink).await?;

        self.output_message(&summary(&report, self.cli.state.as_ref().map(|p| p.display().to_string())))?;

        match report.error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

/// SYNC_SUMMARY message for a finished read
pub(crate) fn summary(report: &ReadReport, state_file: Option<String>) -> Value {
    let stats = &report.stats;
    let status = if stats.is_success() && report.is_success() {
        "SUCCEEDED"
    } else if stats.streams_synced == 0 {
        "FAILED"
    } else {
        "PARTIAL"
    };

    json!({
        "type": "SYNC_SUMMARY",
        "summary": {
            "status": status,
            "total_records": stats.records_synced,
            "total_pages": stats.pages_fetched,
            "total_streams": stats.streams.len(),
            "successful_streams": stats.streams_synced,
            "failed_streams": stats.errors,
            "duration_ms": stats.duration_ms,
            "state_file": state_file,
            "error_kind": report.error.as_ref().map(Error::kind),
            "streams": stats.streams
        }
    })
}
