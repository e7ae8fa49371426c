//! Authentication module
//!
//! Supports: Bearer token (the analytics API), or no authentication
//! (local mocks and health checks).
//!
//! The `Authenticator` is the only place credentials are attached to
//! outgoing requests.

mod authenticator;
mod types;

pub use authenticator::Authenticator;
pub use types::AuthConfig;

#[cfg(test)]
mod tests;
