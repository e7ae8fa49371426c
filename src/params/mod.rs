//! Request parameter module
//!
//! Builds the query string of each page request from the replication
//! high-water mark, the configured date boundaries and the page token.
//!
//! Variants: date window (`start_date`/`end_date` plus fixed constants),
//! single-day date cursor (`date`), offset (`offset` plus fixed constants),
//! and none.

mod builder;

pub use builder::{ParamBuilder, ParamContext};
