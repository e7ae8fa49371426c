//! HTTP transport module
//!
//! The engine talks to the API through the [`Transport`] trait. The default
//! implementation, [`HttpClient`], wraps reqwest with:
//!
//! - **Automatic Retries**: 429, 5xx and timeouts, with configurable backoff
//! - **Rate Limiting**: optional token bucket rate limiter using governor
//! - **Authentication**: bearer token via the auth module
//!
//! Retries happen here and only here. A response that is still non-2xx
//! after the last attempt is handed back as-is so the caller can report it.

mod client;
mod rate_limit;
mod response;

pub use client::{HttpClient, HttpClientConfig, RequestConfig};
pub use rate_limit::{RateLimiter, RateLimiterConfig};
pub use response::RawResponse;

use crate::error::Result;
use async_trait::async_trait;

/// Something that can send a request and hand back the raw response
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send a GET request to `url` with the given request configuration.
    ///
    /// Returns `Err` only for failures that produced no HTTP response at all.
    async fn get(&self, url: &str, request: RequestConfig) -> Result<RawResponse>;
}
