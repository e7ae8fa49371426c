//! CLI module
//!
//! Command-line interface for running the tap.
//!
//! # Commands
//!
//! - `spec` - Print the configuration schema
//! - `check` - Test connection to the API
//! - `discover` - List available streams with schemas
//! - `streams` - List stream names (lightweight)
//! - `read` - Extract data from streams
//!
//! Every command writes JSON messages to stdout, one per line. Logs go to
//! stderr.

mod commands;
mod runner;

pub use commands::{parse_stream_list, Cli, Commands, OutputFormat};
pub use runner::{Runner, StdoutSink};
