//! Normalizer types

use super::normalizers::{
    DateKeyedNormalizer, LabelValueNormalizer, NestedCategoryNormalizer, RecordsNormalizer,
    TimeseriesNormalizer,
};
use crate::error::Result;
use crate::http::RawResponse;
use crate::types::Record;

/// Trait for turning a raw response into records
pub trait ResponseNormalizer: Send + Sync {
    /// Normalize one page.
    ///
    /// Shape mismatches are errors; an empty page (`null`, `{}`, `[]`) is not.
    fn normalize(&self, response: &RawResponse) -> Result<Vec<Record>>;
}

/// Normalizer attached to a resource
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum NormalizerConfig {
    /// The body (or the value at `path`) is a list of records or one record
    #[default]
    Records,

    /// Records live at a JSON path inside the body
    RecordsAt {
        /// JSONPath of the record list
        path: String,
    },

    /// `{"timeseries_metrics": [{"timestamp", "metrics": {..}}]}`
    Timeseries,

    /// `{metric: {"labels": [..], "values": [..]}}`
    LabelValue,

    /// `{metric: scalar | {sub: value}}`, dated by the request's `date` parameter
    NestedCategory,

    /// `{date: {metric: value}}`
    DateKeyed,
}

impl NormalizerConfig {
    /// Records at a JSON path
    pub fn records_at(path: impl Into<String>) -> Self {
        Self::RecordsAt { path: path.into() }
    }

    /// Short name used in logs and discovery metadata
    pub fn name(&self) -> &'static str {
        match self {
            Self::Records | Self::RecordsAt { .. } => "records",
            Self::Timeseries => "timeseries",
            Self::LabelValue => "label_value",
            Self::NestedCategory => "nested_category",
            Self::DateKeyed => "date_keyed",
        }
    }
}

impl ResponseNormalizer for NormalizerConfig {
    fn normalize(&self, response: &RawResponse) -> Result<Vec<Record>> {
        match self {
            Self::Records => RecordsNormalizer::new().normalize(response),
            Self::RecordsAt { path } => RecordsNormalizer::with_path(path.clone()).normalize(response),
            Self::Timeseries => TimeseriesNormalizer.normalize(response),
            Self::LabelValue => LabelValueNormalizer.normalize(response),
            Self::NestedCategory => NestedCategoryNormalizer.normalize(response),
            Self::DateKeyed => DateKeyedNormalizer.normalize(response),
        }
    }
}
