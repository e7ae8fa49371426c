//! Error types for the analytics tap
//!
//! This module defines the error hierarchy for the whole crate.
//! All public APIs return `Result<T, Error>` where Error is defined here.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// The main error type for the tap
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Missing required config field: {field}")]
    MissingConfigField { field: String },

    #[error("Invalid config value for '{field}': {message}")]
    InvalidConfigValue { field: String, message: String },

    #[error("Invalid schema for resource '{resource}': {message}")]
    SchemaDefinition { resource: String, message: String },

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    // ============================================================================
    // Authentication Errors
    // ============================================================================
    #[error("Authentication failed: {message}")]
    Auth { message: String },

    // ============================================================================
    // Transport Errors
    // ============================================================================
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("Request timeout after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("Max retries ({max_retries}) exceeded")]
    MaxRetriesExceeded { max_retries: u32 },

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // ============================================================================
    // Data Processing Errors
    // ============================================================================
    #[error("JSONPath error: {message}")]
    JsonPath { message: String },

    #[error("Failed to decode response: {message}")]
    Decode { message: String },

    #[error(
        "Failed to normalize page of '{stream}' (status {status}, token {}): {message}",
        .token.as_deref().unwrap_or("<first page>")
    )]
    Normalization {
        stream: String,
        token: Option<String>,
        status: u16,
        message: String,
    },

    #[error("Record from '{stream}' violates schema at '{field}': {message}")]
    SchemaValidation {
        stream: String,
        field: String,
        message: String,
    },

    #[error("Pagination error: {message}")]
    Pagination { message: String },

    #[error("Pagination loop detected: token '{token}' is identical to the previous token")]
    PaginationLoop { token: String },

    // ============================================================================
    // State Errors
    // ============================================================================
    #[error("State error: {message}")]
    State { message: String },

    // ============================================================================
    // Stream Errors
    // ============================================================================
    #[error("Stream '{stream}' not found")]
    StreamNotFound { stream: String },

    #[error("Stream '{stream}' failed: {source}")]
    StreamFailed {
        stream: String,
        #[source]
        source: Box<Error>,
    },

    // ============================================================================
    // Template Errors
    // ============================================================================
    #[error("Template error: {message}")]
    Template { message: String },

    #[error("Undefined variable in template: {variable}")]
    UndefinedVariable { variable: String },

    // ============================================================================
    // I/O Errors
    // ============================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Coarse error category, reported per failed stream and on exit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Bad configuration or schema declaration, detected before extraction
    Configuration,
    /// Network failure or non-2xx response
    Transport,
    /// Response body did not have the expected shape
    Normalization,
    /// A normalized record does not conform to its declared schema
    SchemaValidation,
    /// Anything else (state persistence, I/O)
    Internal,
}

impl ErrorKind {
    /// Name used in reports
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Configuration => "configuration",
            ErrorKind::Transport => "transport",
            ErrorKind::Normalization => "normalization",
            ErrorKind::SchemaValidation => "schema_validation",
            ErrorKind::Internal => "internal",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Error {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a missing field error
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingConfigField {
            field: field.into(),
        }
    }

    /// Create an invalid config value error
    pub fn invalid_value(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidConfigValue {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a schema definition error
    pub fn schema_definition(resource: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SchemaDefinition {
            resource: resource.into(),
            message: message.into(),
        }
    }

    /// Create an auth error
    pub fn auth(message: impl Into<String>) -> Self {
        Self::Auth {
            message: message.into(),
        }
    }

    /// Create an HTTP status error
    pub fn http_status(status: u16, body: impl Into<String>) -> Self {
        Self::HttpStatus {
            status,
            body: body.into(),
        }
    }

    /// Create a JSONPath error
    pub fn json_path(message: impl Into<String>) -> Self {
        Self::JsonPath {
            message: message.into(),
        }
    }

    /// Create a decode error
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    /// Create a schema validation error
    pub fn schema_validation(
        stream: impl Into<String>,
        field: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::SchemaValidation {
            stream: stream.into(),
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a pagination error
    pub fn pagination(message: impl Into<String>) -> Self {
        Self::Pagination {
            message: message.into(),
        }
    }

    /// Create a template error
    pub fn template(message: impl Into<String>) -> Self {
        Self::Template {
            message: message.into(),
        }
    }

    /// Create an undefined variable error
    pub fn undefined_var(variable: impl Into<String>) -> Self {
        Self::UndefinedVariable {
            variable: variable.into(),
        }
    }

    /// Create a state error
    pub fn state(message: impl Into<String>) -> Self {
        Self::State {
            message: message.into(),
        }
    }

    /// Wrap an error with the name of the stream it aborted
    pub fn stream_failed(stream: impl Into<String>, source: Error) -> Self {
        Self::StreamFailed {
            stream: stream.into(),
            source: Box::new(source),
        }
    }

    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Config { .. }
            | Error::MissingConfigField { .. }
            | Error::InvalidConfigValue { .. }
            | Error::SchemaDefinition { .. }
            | Error::Auth { .. }
            | Error::Template { .. }
            | Error::UndefinedVariable { .. }
            | Error::StreamNotFound { .. } => ErrorKind::Configuration,
            Error::Http(_)
            | Error::HttpStatus { .. }
            | Error::Timeout { .. }
            | Error::MaxRetriesExceeded { .. }
            | Error::InvalidUrl(_) => ErrorKind::Transport,
            Error::Decode { .. }
            | Error::Normalization { .. }
            | Error::JsonPath { .. }
            | Error::Pagination { .. }
            | Error::PaginationLoop { .. } => ErrorKind::Normalization,
            Error::SchemaValidation { .. } => ErrorKind::SchemaValidation,
            Error::StreamFailed { source, .. } => source.kind(),
            Error::JsonParse(_) | Error::State { .. } | Error::Io(_) => ErrorKind::Internal,
        }
    }
}

/// Result type alias for the tap
pub type Result<T> = std::result::Result<T, Error>;
