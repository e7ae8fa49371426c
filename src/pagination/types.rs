//! Pagination types

use super::strategies::{DateCursorPaginator, JsonPathPaginator, NoPaginator, OffsetUrlPaginator};
use crate::error::{Error, Result};
use crate::http::RawResponse;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Default JSONPath of the next-page cursor
pub const DEFAULT_NEXT_PAGE_PATH: &str = "$.paging.next";

/// Response header consulted when no cursor path is configured
pub const DEFAULT_NEXT_PAGE_HEADER: &str = "X-Next-Page";

/// Opaque position of the next page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum PageToken {
    /// Cursor taken verbatim from the response
    Cursor(String),
    /// Offset extracted from a next-page link
    Offset(String),
    /// Next calendar day to request
    Date(NaiveDate),
}

impl fmt::Display for PageToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PageToken::Cursor(cursor) => write!(f, "{cursor}"),
            PageToken::Offset(offset) => write!(f, "offset={offset}"),
            PageToken::Date(date) => write!(f, "{}", crate::types::format_date(*date)),
        }
    }
}

/// Trait for pagination strategies
pub trait Paginator: Send + Sync {
    /// Decide the token for the page after `response`.
    ///
    /// `Ok(None)` ends pagination. `today` anchors date-relative decisions.
    fn next_token(
        &self,
        response: &RawResponse,
        previous: Option<&PageToken>,
        today: NaiveDate,
    ) -> Result<Option<PageToken>>;
}

/// Pagination strategy attached to a resource
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PaginationConfig {
    /// Single page
    #[default]
    None,

    /// Cursor at a JSONPath, or in a response header when no path is set
    JsonPath {
        /// JSONPath of the cursor (`None` means use the header)
        path: Option<String>,
        /// Header consulted when `path` is unset
        header: String,
    },

    /// Next-page URL whose query string carries `offset`
    OffsetUrl {
        /// JSONPath of the next-page URL
        path: String,
    },

    /// One day per page, read back from the request's `date` parameter
    DateCursor,
}

impl PaginationConfig {
    /// Cursor at the default `$.paging.next` path
    pub fn json_path_default() -> Self {
        Self::json_path(DEFAULT_NEXT_PAGE_PATH)
    }

    /// Cursor at a JSONPath
    pub fn json_path(path: impl Into<String>) -> Self {
        let path = path.into();
        Self::JsonPath {
            path: (!path.trim().is_empty()).then_some(path),
            header: DEFAULT_NEXT_PAGE_HEADER.to_string(),
        }
    }

    /// Cursor in the `X-Next-Page` response header
    pub fn header() -> Self {
        Self::JsonPath {
            path: None,
            header: DEFAULT_NEXT_PAGE_HEADER.to_string(),
        }
    }

    /// Offset carried in the URL at `$.paging.next`
    pub fn offset_url() -> Self {
        Self::OffsetUrl {
            path: DEFAULT_NEXT_PAGE_PATH.to_string(),
        }
    }

    /// Short name used in logs and discovery metadata
    pub fn name(&self) -> &'static str {
        match self {
            Self::None => "single_page",
            Self::JsonPath { path: Some(_), .. } => "json_path_cursor",
            Self::JsonPath { path: None, .. } => "header_cursor",
            Self::OffsetUrl { .. } => "offset_url",
            Self::DateCursor => "date_cursor",
        }
    }

    /// Compute the next token and reject tokens that would repeat the last page
    pub fn next_token(
        &self,
        response: &RawResponse,
        previous: Option<&PageToken>,
        today: NaiveDate,
    ) -> Result<Option<PageToken>> {
        let next = match self {
            Self::None => NoPaginator.next_token(response, previous, today)?,
            Self::JsonPath { path, header } => JsonPathPaginator::new(path.clone(), header.clone())
                .next_token(response, previous, today)?,
            Self::OffsetUrl { path } => {
                OffsetUrlPaginator::new(path.clone()).next_token(response, previous, today)?
            }
            Self::DateCursor => DateCursorPaginator.next_token(response, previous, today)?,
        };

        if let (Some(next), Some(previous)) = (&next, previous) {
            if next == previous {
                return Err(Error::PaginationLoop {
                    token: next.to_string(),
                });
            }
        }
        Ok(next)
    }
}
