//! Tap configuration
//!
//! The configuration is a flat JSON object supplied by the user. It is parsed
//! leniently with serde and then validated into typed fields, so that every
//! problem is reported as a configuration error before any request is sent.

use crate::auth::Authenticator;
use crate::error::{Error, Result};
use crate::http::{HttpClientConfig, RateLimiterConfig};
use crate::resources::{Service, DEFAULT_API_URL};
use crate::types::{parse_date, SyncMode};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt;
use std::path::Path;
use std::time::Duration;

// ============================================================================
// Tap Config
// ============================================================================

/// Validated tap configuration
#[derive(Clone, PartialEq)]
pub struct TapConfig {
    /// Bearer token for the analytics API
    pub api_key: String,

    /// Brand every request is scoped to
    pub brand_id: u64,

    /// Lower date boundary when no state exists
    pub start_date: Option<NaiveDate>,

    /// Upper date boundary; yesterday when absent
    pub end_date: Option<NaiveDate>,

    /// Forwarded as `User-Agent`
    pub user_agent: Option<String>,

    /// Base URL template, may contain `{service}`
    pub api_url: String,

    /// Per-request timeout in seconds
    pub request_timeout_seconds: u64,

    /// Transport retries for transient failures
    pub max_retries: u32,

    /// Optional client-side rate limit
    pub requests_per_second: Option<u32>,
}

impl fmt::Debug for TapConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TapConfig")
            .field("api_key", &"***")
            .field("brand_id", &self.brand_id)
            .field("start_date", &self.start_date)
            .field("end_date", &self.end_date)
            .field("user_agent", &self.user_agent)
            .field("api_url", &self.api_url)
            .field("request_timeout_seconds", &self.request_timeout_seconds)
            .field("max_retries", &self.max_retries)
            .field("requests_per_second", &self.requests_per_second)
            .finish()
    }
}

/// Config as written by the user, before validation
#[derive(Debug, Deserialize)]
struct RawConfig {
    #[serde(default)]
    api_key: Option<String>,
    #[serde(default)]
    brand_id: Option<Value>,
    #[serde(default)]
    start_date: Option<String>,
    #[serde(default)]
    end_date: Option<String>,
    #[serde(default)]
    user_agent: Option<String>,
    #[serde(default)]
    api_url: Option<String>,
    #[serde(default = "default_timeout")]
    request_timeout_seconds: u64,
    #[serde(default = "default_max_retries")]
    max_retries: u32,
    #[serde(default)]
    requests_per_second: Option<u32>,
}

fn default_timeout() -> u64 {
    30
}

fn default_max_retries() -> u32 {
    3
}

impl TapConfig {
    /// Parse and validate a config object
    pub fn from_value(value: Value) -> Result<Self> {
        if !value.is_object() {
            return Err(Error::config("config must be a JSON object"));
        }
        let raw: RawConfig = serde_json::from_value(value)
            .map_err(|e| Error::config(format!("invalid config: {e}")))?;

        let api_key = raw
            .api_key
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty())
            .ok_or_else(|| Error::missing_field("api_key"))?;

        let brand_id = parse_brand_id(raw.brand_id)?;
        let start_date = raw
            .start_date
            .as_deref()
            .map(|s| parse_config_date("start_date", s))
            .transpose()?;
        let end_date = raw
            .end_date
            .as_deref()
            .map(|s| parse_config_date("end_date", s))
            .transpose()?;

        if let (Some(start), Some(end)) = (start_date, end_date) {
            if end < start {
                return Err(Error::invalid_value(
                    "end_date",
                    format!("{end} is before start_date {start}"),
                ));
            }
        }

        if raw.request_timeout_seconds == 0 {
            return Err(Error::invalid_value(
                "request_timeout_seconds",
                "must be greater than zero",
            ));
        }
        if raw.requests_per_second == Some(0) {
            return Err(Error::invalid_value(
                "requests_per_second",
                "must be greater than zero",
            ));
        }

        let api_url = raw
            .api_url
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        Ok(Self {
            api_key,
            brand_id,
            start_date,
            end_date,
            user_agent: raw.user_agent.filter(|agent| !agent.trim().is_empty()),
            api_url,
            request_timeout_seconds: raw.request_timeout_seconds,
            max_retries: raw.max_retries,
            requests_per_second: raw.requests_per_second,
        })
    }

    /// Parse and validate inline JSON
    pub fn from_json(json: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(json)
            .map_err(|e| Error::config(format!("config is not valid JSON: {e}")))?;
        Self::from_value(value)
    }

    /// Load and validate a config file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::config(format!("cannot read config file '{}': {e}", path.display()))
        })?;
        Self::from_json(&content)
    }

    /// Bearer authenticator for the API key
    pub fn authenticator(&self) -> Result<Authenticator> {
        Authenticator::bearer(&self.api_key)
    }

    /// Transport settings derived from this config
    pub fn http_client_config(&self) -> HttpClientConfig {
        let mut builder = HttpClientConfig::builder()
            .timeout(Duration::from_secs(self.request_timeout_seconds))
            .max_retries(self.max_retries);
        if let Some(agent) = &self.user_agent {
            builder = builder.user_agent(agent.clone());
        }
        if let Some(limit) = self.requests_per_second.and_then(RateLimiterConfig::per_second) {
            builder = builder.rate_limit(limit);
        }
        builder.build()
    }
}

fn parse_brand_id(value: Option<Value>) -> Result<u64> {
    match value {
        None | Some(Value::Null) => Err(Error::missing_field("brand_id")),
        // Integral floats such as 42.0 are accepted.
        Some(Value::Number(n)) => n
            .as_u64()
            .or_else(|| {
                n.as_f64()
                    .filter(|f| f.fract() == 0.0 && *f >= 0.0 && *f <= u64::MAX as f64)
                    .map(|f| f as u64)
            })
            .ok_or_else(|| Error::invalid_value("brand_id", format!("{n} is not a positive integer"))),
        Some(Value::String(s)) => s
            .trim()
            .parse::<u64>()
            .map_err(|_| Error::invalid_value("brand_id", format!("'{s}' is not a number"))),
        Some(other) => Err(Error::invalid_value(
            "brand_id",
            format!("expected a number, got {other}"),
        )),
    }
}

fn parse_config_date(field: &str, value: &str) -> Result<NaiveDate> {
    parse_date(value).ok_or_else(|| {
        Error::invalid_value(field, format!("'{value}' is not a date or date-time"))
    })
}

/// JSON schema describing the configuration, printed by `spec`
pub fn config_schema() -> Value {
    json!({
        "$schema": "http://json-schema.org/draft-07/schema#",
        "title": "Social analytics tap",
        "type": "object",
        "required": ["api_key", "brand_id"],
        "properties": {
            "api_key": {
                "type": "string",
                "title": "API key",
                "description": "Bearer token for the analytics API",
                "secret": true
            },
            "brand_id": {
                "type": "integer",
                "title": "Brand ID",
                "description": "Brand every request is scoped to"
            },
            "start_date": {
                "type": "string",
                "format": "date",
                "description": "First date to extract when no state exists"
            },
            "end_date": {
                "type": "string",
                "format": "date",
                "description": "Last date to extract; defaults to yesterday"
            },
            "user_agent": {
                "type": "string",
                "description": "Value of the User-Agent header"
            },
            "api_url": {
                "type": "string",
                "default": DEFAULT_API_URL,
                "description": "Base URL template; {service} is the backend host name"
            },
            "request_timeout_seconds": {
                "type": "integer",
                "default": default_timeout(),
                "minimum": 1
            },
            "max_retries": {
                "type": "integer",
                "default": default_max_retries(),
                "minimum": 0
            },
            "requests_per_second": {
                "type": "integer",
                "minimum": 1
            }
        }
    })
}

// ============================================================================
// Catalog Types
// ============================================================================

/// Discovered catalog (available streams)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Catalog {
    /// Available streams
    pub streams: Vec<CatalogStream>,
}

/// Stream in the catalog
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogStream {
    /// Stream name
    pub name: String,

    /// JSON schema for the stream
    #[serde(default)]
    pub json_schema: Value,

    /// Supported sync modes
    #[serde(default)]
    pub supported_sync_modes: Vec<SyncMode>,

    /// Default cursor field
    #[serde(default)]
    pub default_cursor_field: Option<Vec<String>>,

    /// Source-defined primary key
    #[serde(default)]
    pub source_defined_primary_key: Option<Vec<Vec<String>>>,

    /// Backend serving the stream
    pub service: Service,
}
