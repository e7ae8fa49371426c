//! Parameter builder implementation

use crate::error::{Error, Result};
use crate::pagination::PageToken;
use crate::types::{format_date, parse_date, QueryParams};
use chrono::{Duration, NaiveDate};
use serde_json::Value;

/// Inputs shared by every page request of a resource
#[derive(Debug, Clone, PartialEq)]
pub struct ParamContext {
    /// Current high-water mark of the resource, if any
    pub replication_value: Option<Value>,
    /// Configured start date
    pub start_date: Option<NaiveDate>,
    /// Configured end date
    pub end_date: Option<NaiveDate>,
    /// The current date
    pub today: NaiveDate,
}

impl ParamContext {
    /// Create a context with no high-water mark
    pub fn new(
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
        today: NaiveDate,
    ) -> Self {
        Self {
            replication_value: None,
            start_date,
            end_date,
            today,
        }
    }

    /// Set the high-water mark
    #[must_use]
    pub fn with_replication_value(mut self, value: Option<Value>) -> Self {
        self.replication_value = value;
        self
    }

    /// First day to request: the high-water mark, else the configured start
    pub fn start_boundary(&self) -> Result<NaiveDate> {
        match &self.replication_value {
            Some(Value::String(mark)) => parse_date(mark).ok_or_else(|| {
                Error::state(format!("high-water mark '{mark}' is not a date"))
            }),
            Some(Value::Null) | None => self
                .start_date
                .ok_or_else(|| Error::missing_field("start_date")),
            Some(other) => Err(Error::state(format!(
                "high-water mark {other} is not a date"
            ))),
        }
    }

    /// Last day to request: the configured end, else yesterday
    pub fn end_boundary(&self) -> NaiveDate {
        self.end_date
            .unwrap_or_else(|| self.today - Duration::days(1))
    }
}

/// How a resource derives its query parameters
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ParamBuilder {
    /// No parameters
    #[default]
    None,

    /// `start_date`..`end_date` window plus fixed parameters
    DateWindow {
        /// Fixed parameters sent with every request
        constants: &'static [(&'static str, &'static str)],
    },

    /// A single `date`, taken from the page token after the first page
    DateCursor,

    /// Fixed parameters plus the `offset` carried by the page token
    Offset {
        /// Fixed parameters sent with every request
        constants: &'static [(&'static str, &'static str)],
    },
}

impl ParamBuilder {
    /// Short name used in logs and discovery metadata
    pub fn name(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::DateWindow { .. } => "date_window",
            Self::DateCursor => "date_cursor",
            Self::Offset { .. } => "offset",
        }
    }

    /// Whether a date window would start after it ends.
    ///
    /// Only date windows can be empty; every other builder always has a
    /// first page to request.
    pub fn is_empty_window(&self, ctx: &ParamContext) -> Result<bool> {
        match self {
            Self::DateWindow { .. } => Ok(ctx.start_boundary()? > ctx.end_boundary()),
            Self::None | Self::DateCursor | Self::Offset { .. } => Ok(false),
        }
    }

    /// Build the query parameters for one page
    pub fn build(&self, ctx: &ParamContext, token: Option<&PageToken>) -> Result<QueryParams> {
        let mut params = QueryParams::new();
        match self {
            Self::None => {}
            Self::DateWindow { constants } => {
                insert_constants(&mut params, constants);
                params.insert("start_date".to_string(), format_date(ctx.start_boundary()?));
                params.insert("end_date".to_string(), format_date(ctx.end_boundary()));
            }
            Self::DateCursor => {
                let date = match token {
                    Some(PageToken::Date(date)) => *date,
                    None => ctx.start_boundary()?,
                    Some(other) => return Err(unexpected_token(self, other)),
                };
                params.insert("date".to_string(), format_date(date));
            }
            Self::Offset { constants } => {
                insert_constants(&mut params, constants);
                match token {
                    Some(PageToken::Offset(offset)) => {
                        params.insert("offset".to_string(), offset.clone());
                    }
                    None => {}
                    Some(other) => return Err(unexpected_token(self, other)),
                }
            }
        }
        Ok(params)
    }
}

fn insert_constants(params: &mut QueryParams, constants: &[(&str, &str)]) {
    for (key, value) in constants {
        params.insert((*key).to_string(), (*value).to_string());
    }
}

fn unexpected_token(builder: &ParamBuilder, token: &PageToken) -> Error {
    Error::pagination(format!(
        "{} parameters cannot use page token '{token}'",
        builder.name()
    ))
}
