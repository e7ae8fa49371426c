//! Raw HTTP response as seen by pagination and normalization

use crate::error::{Error, Result};
use serde_json::Value;
use std::collections::BTreeMap;
use url::Url;

/// A completed HTTP exchange.
///
/// `url` is the effective request URL, including the query string that was
/// actually sent.
#[derive(Debug, Clone, PartialEq)]
pub struct RawResponse {
    /// HTTP status code
    pub status: u16,
    /// Response headers, names lowercased
    pub headers: BTreeMap<String, String>,
    /// Parsed JSON body (`Null` for an empty body)
    pub body: Value,
    /// Effective request URL
    pub url: Url,
}

impl RawResponse {
    /// Create a response with no headers
    pub fn new(status: u16, body: Value, url: Url) -> Self {
        Self {
            status,
            headers: BTreeMap::new(),
            body,
            url,
        }
    }

    /// Create a response, parsing the URL
    pub fn from_parts(status: u16, body: Value, url: &str) -> Result<Self> {
        Ok(Self::new(status, body, Url::parse(url)?))
    }

    /// Add a header
    #[must_use]
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
        self
    }

    /// Whether the status is 2xx
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Look up a header, case-insensitively
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Value of a query parameter of the request that produced this response
    pub fn query_param(&self, name: &str) -> Option<String> {
        self.url
            .query_pairs()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.into_owned())
    }

    /// Fail with a transport error unless the status is 2xx
    pub fn error_for_status(&self) -> Result<()> {
        if self.is_success() {
            return Ok(());
        }
        let body = match &self.body {
            Value::Null => String::new(),
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        Err(Error::http_status(self.status, body))
    }
}
