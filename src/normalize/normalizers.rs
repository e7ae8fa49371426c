//! Normalizer implementations
//!
//! Each normalizer handles one response shape.

use super::types::ResponseNormalizer;
use crate::error::{Error, Result};
use crate::http::RawResponse;
use crate::jsonpath;
use crate::types::{JsonObject, Record};
use serde_json::Value;

// ============================================================================
// Record Lists
// ============================================================================

/// List of records, or a single record, optionally located by a JSON path
#[derive(Debug, Clone, Default)]
pub struct RecordsNormalizer {
    /// JSONPath of the records (`None` means the whole body)
    path: Option<String>,
}

impl RecordsNormalizer {
    /// Records are the whole body
    pub fn new() -> Self {
        Self::default()
    }

    /// Records live at `path`
    pub fn with_path(path: impl Into<String>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }

    fn locate(&self, body: &Value) -> Result<Value> {
        let Some(path) = &self.path else {
            return Ok(body.clone());
        };

        let mut matches = jsonpath::find_all(body, path)?;
        match matches.len() {
            0 => Err(Error::decode(format!("no records at '{path}'"))),
            1 => Ok(matches.remove(0)),
            _ => Ok(Value::Array(matches)),
        }
    }
}

impl ResponseNormalizer for RecordsNormalizer {
    fn normalize(&self, response: &RawResponse) -> Result<Vec<Record>> {
        if is_empty_page(&response.body) {
            return Ok(Vec::new());
        }

        match self.locate(&response.body)? {
            Value::Null => Ok(Vec::new()),
            Value::Array(items) => items
                .into_iter()
                .enumerate()
                .map(|(i, item)| match item {
                    Value::Object(record) => Ok(record),
                    other => Err(Error::decode(format!(
                        "record {i} is {}, expected an object",
                        type_name(&other)
                    ))),
                })
                .collect(),
            Value::Object(record) if record.is_empty() => Ok(Vec::new()),
            Value::Object(record) => Ok(vec![record]),
            other => Err(Error::decode(format!(
                "expected a list of records, got {}",
                type_name(&other)
            ))),
        }
    }
}

// ============================================================================
// Timeseries Unwrap
// ============================================================================

/// `{"timeseries_metrics": [{"timestamp": t, "metrics": {..}}]}`
///
/// One record per entry with `date = timestamp` and the metrics lifted to
/// the top level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TimeseriesNormalizer;

impl ResponseNormalizer for TimeseriesNormalizer {
    fn normalize(&self, response: &RawResponse) -> Result<Vec<Record>> {
        if is_empty_page(&response.body) {
            return Ok(Vec::new());
        }

        let body = expect_object(&response.body, "response body")?;
        let rows = match body.get("timeseries_metrics") {
            None => return Err(Error::decode("missing 'timeseries_metrics'")),
            Some(Value::Null) => return Ok(Vec::new()),
            Some(Value::Array(rows)) => rows,
            Some(other) => {
                return Err(Error::decode(format!(
                    "'timeseries_metrics' is {}, expected an array",
                    type_name(other)
                )))
            }
        };

        let mut records = Vec::with_capacity(rows.len());
        for (i, row) in rows.iter().enumerate() {
            let row = expect_object(row, &format!("timeseries entry {i}"))?;

            let timestamp = match row.get("timestamp") {
                Some(Value::Null) | None => {
                    return Err(Error::decode(format!(
                        "timeseries entry {i} has no 'timestamp'"
                    )))
                }
                Some(timestamp) => timestamp.clone(),
            };

            let mut record = Record::new();
            record.insert("date".to_string(), timestamp);
            match row.get("metrics") {
                None | Some(Value::Null) => {}
                Some(Value::Object(metrics)) => {
                    for (name, value) in metrics {
                        if record.contains_key(name) {
                            return Err(Error::decode(format!(
                                "timeseries entry {i} has a metric named '{name}'"
                            )));
                        }
                        record.insert(name.clone(), value.clone());
                    }
                }
                Some(other) => {
                    return Err(Error::decode(format!(
                        "metrics of timeseries entry {i} is {}, expected an object",
                        type_name(other)
                    )))
                }
            }
            records.push(record);
        }
        Ok(records)
    }
}

// ============================================================================
// Label/Value Zip
// ============================================================================

/// `{metric: {"labels": [dates..], "values": [numbers..]}}`
///
/// Labels and values are zipped pairwise; lists of different lengths are a
/// shape error.
#[derive(Debug, Clone, Copy, Default)]
pub struct LabelValueNormalizer;

impl ResponseNormalizer for LabelValueNormalizer {
    fn normalize(&self, response: &RawResponse) -> Result<Vec<Record>> {
        if is_empty_page(&response.body) {
            return Ok(Vec::new());
        }

        let body = expect_object(&response.body, "response body")?;
        let mut records = Vec::new();
        for (metric, series) in body {
            let series = expect_object(series, &format!("metric '{metric}'"))?;
            let labels = expect_list(series, "labels", metric)?;
            let values = expect_list(series, "values", metric)?;

            if labels.len() != values.len() {
                return Err(Error::decode(format!(
                    "'{metric}': {} labels but {} values",
                    labels.len(),
                    values.len()
                )));
            }

            for (label, value) in labels.iter().zip(values) {
                records.push(record([
                    ("date", label.clone()),
                    ("metric_name", Value::String(metric.clone())),
                    ("metric_value", value.clone()),
                ]));
            }
        }
        Ok(records)
    }
}

// ============================================================================
// Nested Category, Dated By The Request
// ============================================================================

/// `{metric: scalar | {sub: value}}`
///
/// The body carries no dates; every record is stamped with the `date` query
/// parameter of the request. A scalar metric uses its own name as sub name.
#[derive(Debug, Clone, Copy, Default)]
pub struct NestedCategoryNormalizer;

impl ResponseNormalizer for NestedCategoryNormalizer {
    fn normalize(&self, response: &RawResponse) -> Result<Vec<Record>> {
        if is_empty_page(&response.body) {
            return Ok(Vec::new());
        }

        let date = response
            .query_param("date")
            .ok_or_else(|| Error::decode(format!("request {} has no 'date' parameter", response.url)))?;
        let date = Value::String(date);

        let body = expect_object(&response.body, "response body")?;
        let mut records = Vec::new();
        for (metric, value) in body {
            match value {
                Value::Object(categories) => {
                    for (sub, sub_value) in categories {
                        if sub_value.is_object() || sub_value.is_array() {
                            return Err(Error::decode(format!(
                                "'{metric}.{sub}' is nested more than one level deep"
                            )));
                        }
                        records.push(record([
                            ("date", date.clone()),
                            ("metric_name", Value::String(metric.clone())),
                            ("metric_sub_name", Value::String(sub.clone())),
                            ("metric_value", sub_value.clone()),
                        ]));
                    }
                }
                Value::Array(_) => {
                    return Err(Error::decode(format!(
                        "metric '{metric}' is an array, expected a scalar or an object"
                    )))
                }
                scalar => records.push(record([
                    ("date", date.clone()),
                    ("metric_name", Value::String(metric.clone())),
                    ("metric_sub_name", Value::String(metric.clone())),
                    ("metric_value", scalar.clone()),
                ])),
            }
        }
        Ok(records)
    }
}

// ============================================================================
// Date-Keyed Metric Map
// ============================================================================

/// `{date: {metric: value}}`, one record per (date, metric)
#[derive(Debug, Clone, Copy, Default)]
pub struct DateKeyedNormalizer;

impl ResponseNormalizer for DateKeyedNormalizer {
    fn normalize(&self, response: &RawResponse) -> Result<Vec<Record>> {
        if is_empty_page(&response.body) {
            return Ok(Vec::new());
        }

        let body = expect_object(&response.body, "response body")?;
        let mut records = Vec::new();
        for (date, metrics) in body {
            if metrics.is_null() {
                continue;
            }
            let metrics = expect_object(metrics, &format!("metrics for '{date}'"))?;
            for (metric, value) in metrics {
                records.push(record([
                    ("date", Value::String(date.clone())),
                    ("metric_name", Value::String(metric.clone())),
                    ("metric_value", value.clone()),
                ]));
            }
        }
        Ok(records)
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// `null`, `{}` and `[]` are pages without data
fn is_empty_page(body: &Value) -> bool {
    match body {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}

fn expect_object<'a>(value: &'a Value, what: &str) -> Result<&'a JsonObject> {
    value.as_object().ok_or_else(|| {
        Error::decode(format!(
            "{what} is {}, expected an object",
            type_name(value)
        ))
    })
}

fn expect_list<'a>(series: &'a JsonObject, key: &str, metric: &str) -> Result<&'a [Value]> {
    match series.get(key) {
        Some(Value::Array(items)) => Ok(items),
        Some(Value::Null) => Ok(&[]),
        Some(other) => Err(Error::decode(format!(
            "'{metric}.{key}' is {}, expected an array",
            type_name(other)
        ))),
        None => Err(Error::decode(format!("metric '{metric}' has no '{key}'"))),
    }
}

fn record<const N: usize>(fields: [(&str, Value); N]) -> Record {
    fields
        .into_iter()
        .map(|(key, value)| (key.to_string(), value))
        .collect()
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
