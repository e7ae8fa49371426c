//! Pagination module
//!
//! Supports: JSONPath cursor (with `X-Next-Page` header fallback),
//! offset carried in a next-page URL, synthetic date cursor, single page.
//!
//! # Overview
//!
//! A strategy looks at one raw response and decides the token for the next
//! page, or that pagination is complete. Tokens are handed to the request
//! parameter builder, never interpreted by the engine.

mod strategies;
mod types;

pub use strategies::{DateCursorPaginator, JsonPathPaginator, NoPaginator, OffsetUrlPaginator};
pub use types::{
    PageToken, PaginationConfig, Paginator, DEFAULT_NEXT_PAGE_HEADER, DEFAULT_NEXT_PAGE_PATH,
};
