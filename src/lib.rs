//! # Social Analytics Tap
//!
//! Incremental extraction of brand analytics from a social-media analytics
//! API. Eleven built-in resources cover the Facebook, Instagram, Pinterest
//! and Twitter backends; each one is a declarative definition of endpoint,
//! query parameters, pagination, normalization and schema.
//!
//! ## Features
//!
//! - **Bearer Authentication**: one API key per configuration
//! - **Pagination**: date windows, day-by-day date cursors, offset URLs
//! - **Normalization**: time series, label/value and nested category shapes
//!   flattened into one record per data point
//! - **Incremental Sync**: per-resource high-water marks, optional per-page
//!   bookmarks for resuming interrupted runs
//! - **Schema Validation**: every record checked before it is emitted
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use social_analytics_tap::config::TapConfig;
//! use social_analytics_tap::engine::Message;
//! use social_analytics_tap::state::StateManager;
//! use social_analytics_tap::tap::{ReadOptions, Tap};
//!
//! #[tokio::main]
//! async fn main() -> social_analytics_tap::Result<()> {
//!     let config = TapConfig::from_file("config.json")?;
//!     let tap = Tap::new(config)?;
//!
//!     let mut messages: Vec<Message> = Vec::new();
//!     let options = ReadOptions::new().with_streams(vec!["twitter_metrics".into()]);
//!     let report = tap.read(StateManager::from_file("state.json")?, options, &mut messages).await?;
//!     println!("{} records", report.stats.records_synced);
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                          Tap Interface                          │
//! │  spec() → TapSpec    check() → Status    discover() → Catalog   │
//! │  read(state, options, sink) → ReadReport                        │
//! └─────────────────────────────────────────────────────────────────┘
//!                                │
//! ┌──────────┬───────────┬───────┴───────┬───────────┬─────────────┐
//! │   Auth   │   HTTP    │   Paginate    │ Normalize │   Schema    │
//! ├──────────┼───────────┼───────────────┼───────────┼─────────────┤
//! │ Bearer   │ GET       │ Date window   │ Records   │ Validation  │
//! │          │ Retry     │ Date cursor   │ Timeseries│ Catalog     │
//! │          │ Rate Limit│ Offset URL    │ Label/Val │             │
//! │          │ Backoff   │ JSONPath      │ Nested    │             │
//! └──────────┴───────────┴───────────────┴───────────┴─────────────┘
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
// Allow common clippy pedantic lints
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::ref_option)]
#![allow(clippy::unused_self)]
#![allow(clippy::struct_excessive_bools)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::match_wildcard_for_single_variants)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types for the tap
pub mod error;

/// Common types and type aliases
pub mod types;

/// Authentication
pub mod auth;

/// HTTP transport with retry and rate limiting
pub mod http;

/// Pagination strategies
pub mod pagination;

/// Response normalizers
pub mod normalize;

/// Query parameter builders
pub mod params;

/// Record schemas and validation
pub mod schema;

/// State management and checkpointing
pub mod state;

/// Built-in resource definitions
pub mod resources;

/// Tap configuration and discovery catalog
pub mod config;

/// Main execution engine
pub mod engine;

/// Spec, check, discover and read
pub mod tap;

/// Template interpolation
pub mod template;

/// JSONPath extraction
pub mod jsonpath;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use types::*;

// Re-export commonly used types
pub use config::TapConfig;
pub use tap::{ReadOptions, ReadReport, Tap};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
