//! Pagination strategy implementations
//!
//! Each strategy handles a specific pagination pattern.

use super::types::{PageToken, Paginator, DEFAULT_NEXT_PAGE_HEADER, DEFAULT_NEXT_PAGE_PATH};
use crate::error::{Error, Result};
use crate::http::RawResponse;
use crate::jsonpath;
use crate::types::parse_date;
use chrono::{Duration, NaiveDate};

// ============================================================================
// No Pagination
// ============================================================================

/// Single request, no further pages
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPaginator;

impl Paginator for NoPaginator {
    fn next_token(
        &self,
        _response: &RawResponse,
        _previous: Option<&PageToken>,
        _today: NaiveDate,
    ) -> Result<Option<PageToken>> {
        Ok(None)
    }
}

// ============================================================================
// JSONPath Cursor
// ============================================================================

/// Cursor pagination
///
/// The first match of `path` in the body is the next cursor. With no path,
/// the cursor is read from a response header instead.
#[derive(Debug, Clone)]
pub struct JsonPathPaginator {
    /// JSONPath to extract the cursor from the body
    pub path: Option<String>,
    /// Header name used when `path` is unset
    pub header: String,
}

impl JsonPathPaginator {
    /// Create a new cursor paginator
    pub fn new(path: Option<String>, header: impl Into<String>) -> Self {
        Self {
            path,
            header: header.into(),
        }
    }
}

impl Default for JsonPathPaginator {
    fn default() -> Self {
        Self::new(
            Some(DEFAULT_NEXT_PAGE_PATH.to_string()),
            DEFAULT_NEXT_PAGE_HEADER,
        )
    }
}

impl Paginator for JsonPathPaginator {
    fn next_token(
        &self,
        response: &RawResponse,
        _previous: Option<&PageToken>,
        _today: NaiveDate,
    ) -> Result<Option<PageToken>> {
        let cursor = match &self.path {
            Some(path) => jsonpath::find_first(&response.body, path)?
                .as_ref()
                .and_then(jsonpath::scalar_to_string),
            None => response
                .header(&self.header)
                .filter(|value| !value.trim().is_empty())
                .map(str::to_string),
        };
        Ok(cursor.map(PageToken::Cursor))
    }
}

// ============================================================================
// Offset In Next-Page URL
// ============================================================================

/// Offset pagination driven by a next-page link
///
/// The body links to the next page (e.g. `{"paging": {"next": "...?offset=50"}}`);
/// only the `offset` query parameter of that link is carried forward.
#[derive(Debug, Clone)]
pub struct OffsetUrlPaginator {
    /// JSONPath of the next-page URL
    pub path: String,
}

impl OffsetUrlPaginator {
    /// Create a new offset paginator
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }
}

impl Default for OffsetUrlPaginator {
    fn default() -> Self {
        Self::new(DEFAULT_NEXT_PAGE_PATH)
    }
}

impl Paginator for OffsetUrlPaginator {
    fn next_token(
        &self,
        response: &RawResponse,
        _previous: Option<&PageToken>,
        _today: NaiveDate,
    ) -> Result<Option<PageToken>> {
        let Some(link) = jsonpath::find_first(&response.body, &self.path)?
            .as_ref()
            .and_then(jsonpath::scalar_to_string)
        else {
            return Ok(None);
        };

        // Links may be relative to the request URL.
        let url = response
            .url
            .join(&link)
            .map_err(|e| Error::pagination(format!("next-page link '{link}' is not a URL: {e}")))?;

        url.query_pairs()
            .find(|(key, _)| key == "offset")
            .map(|(_, value)| Some(PageToken::Offset(value.into_owned())))
            .ok_or_else(|| {
                Error::pagination(format!("next-page link '{link}' carries no offset"))
            })
    }
}

// ============================================================================
// Synthetic Date Cursor
// ============================================================================

/// One page per day
///
/// The next token is the day after the request's `date` parameter. Pages
/// stop once that day reaches yesterday.
#[derive(Debug, Clone, Copy, Default)]
pub struct DateCursorPaginator;

impl Paginator for DateCursorPaginator {
    fn next_token(
        &self,
        response: &RawResponse,
        _previous: Option<&PageToken>,
        today: NaiveDate,
    ) -> Result<Option<PageToken>> {
        let raw = response.query_param("date").ok_or_else(|| {
            Error::pagination(format!("request {} has no 'date' parameter", response.url))
        })?;
        let date = parse_date(&raw)
            .ok_or_else(|| Error::pagination(format!("request date '{raw}' is not a date")))?;

        let next = date + Duration::days(1);
        let yesterday = today - Duration::days(1);
        if next < yesterday {
            Ok(Some(PageToken::Date(next)))
        } else {
            Ok(None)
        }
    }
}
