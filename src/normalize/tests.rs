//! Tests for the normalize module

use super::*;
use crate::error::Error;
use crate::http::RawResponse;
use crate::types::Record;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use test_case::test_case;

fn response(body: Value) -> RawResponse {
    RawResponse::from_parts(200, body, "https://api.test/brands/1/x").unwrap()
}

fn dated(body: Value, date: &str) -> RawResponse {
    RawResponse::from_parts(200, body, &format!("https://api.test/brands/1/x?date={date}")).unwrap()
}

fn records(values: Value) -> Vec<Record> {
    serde_json::from_value(values).unwrap()
}

// ============================================================================
// Empty Pages
// ============================================================================

#[test_case(NormalizerConfig::Records ; "records")]
#[test_case(NormalizerConfig::records_at("$.data") ; "records at path")]
#[test_case(NormalizerConfig::Timeseries ; "timeseries")]
#[test_case(NormalizerConfig::LabelValue ; "label value")]
#[test_case(NormalizerConfig::NestedCategory ; "nested category")]
#[test_case(NormalizerConfig::DateKeyed ; "date keyed")]
fn test_empty_pages_yield_nothing(config: NormalizerConfig) {
    for body in [Value::Null, json!({}), json!([])] {
        assert!(config.normalize(&response(body)).unwrap().is_empty());
    }
}

// ============================================================================
// Records
// ============================================================================

#[test]
fn test_records_list() {
    let resp = response(json!([{"id": "1", "name": "A"}, {"id": "2", "name": "B"}]));
    let out = NormalizerConfig::Records.normalize(&resp).unwrap();
    assert_eq!(out, records(json!([{"id": "1", "name": "A"}, {"id": "2", "name": "B"}])));
}

#[test]
fn test_records_single_object() {
    let resp = response(json!({"id": 9, "handle": "brand"}));
    let out = NormalizerConfig::Records.normalize(&resp).unwrap();
    assert_eq!(out, records(json!([{"id": 9, "handle": "brand"}])));
}

#[test]
fn test_records_at_path() {
    let resp = response(json!({
        "data": [{"id": 1}, {"id": 2}],
        "paging": {"next": null}
    }));
    let out = NormalizerConfig::records_at("$.data").normalize(&resp).unwrap();
    assert_eq!(out.len(), 2);
    assert_eq!(out[1]["id"], json!(2));

    let out = NormalizerConfig::records_at("$.data[*]").normalize(&resp).unwrap();
    assert_eq!(out.len(), 2);
}

#[test]
fn test_records_at_path_empty_list() {
    let resp = response(json!({"data": [], "paging": {}}));
    let out = NormalizerConfig::records_at("$.data").normalize(&resp).unwrap();
    assert!(out.is_empty());
}

#[test]
fn test_records_at_missing_path_is_error() {
    let resp = response(json!({"error": "unexpected"}));
    let err = NormalizerConfig::records_at("$.data").normalize(&resp).unwrap_err();
    assert!(matches!(err, crate::Error::Decode { .. }));
}

#[test]
fn test_records_non_object_item_is_error() {
    let resp = response(json!([{"id": 1}, 2]));
    let err = NormalizerConfig::Records.normalize(&resp).unwrap_err();
    assert!(err.to_string().contains("record 1"));
}

// ============================================================================
// Timeseries
// ============================================================================

#[test]
fn test_timeseries_unwrap() {
    let resp = response(json!({
        "timeseries_metrics": [
            {"timestamp": "2024-01-01T00:00:00", "metrics": {"impressions": 10, "reach": 5}},
            {"timestamp": "2024-01-02T00:00:00", "metrics": {"impressions": 12}}
        ]
    }));
    let out = NormalizerConfig::Timeseries.normalize(&resp).unwrap();
    assert_eq!(
        out,
        records(json!([
            {"date": "2024-01-01T00:00:00", "impressions": 10, "reach": 5},
            {"date": "2024-01-02T00:00:00", "impressions": 12}
        ]))
    );
}

#[test]
fn test_timeseries_null_metrics_list() {
    let resp = response(json!({"timeseries_metrics": null}));
    assert!(NormalizerConfig::Timeseries.normalize(&resp).unwrap().is_empty());
}

#[test_case(json!({"other": []}) ; "missing key")]
#[test_case(json!({"timeseries_metrics": {"a": 1}}) ; "not an array")]
#[test_case(json!({"timeseries_metrics": [{"metrics": {}}]}) ; "missing timestamp")]
#[test_case(json!({"timeseries_metrics": [{"timestamp": "2024-01-01", "metrics": 3}]}) ; "metrics not object")]
#[test_case(json!({"timeseries_metrics": [{"timestamp": "2024-01-01", "metrics": {"date": 1}}]}) ; "date collision")]
fn test_timeseries_shape_errors(body: Value) {
    let err = NormalizerConfig::Timeseries.normalize(&response(body)).unwrap_err();
    assert!(matches!(err, crate::Error::Decode { .. }));
}

// ============================================================================
// Label/Value
// ============================================================================

#[test]
fn test_label_value_zip() {
    let resp = response(json!({
        "engagement": {"labels": ["2024-01-01", "2024-01-02"], "values": [10, 20]}
    }));
    let out = NormalizerConfig::LabelValue.normalize(&resp).unwrap();
    assert_eq!(
        out,
        records(json!([
            {"date": "2024-01-01", "metric_name": "engagement", "metric_value": 10},
            {"date": "2024-01-02", "metric_name": "engagement", "metric_value": 20}
        ]))
    );
}

#[test]
fn test_label_value_dynamic_metric_names() {
    let resp = response(json!({
        "follower_count": {"labels": ["2024-01-01"], "values": [100]},
        "impressions": {"labels": ["2024-01-01"], "values": [7]}
    }));
    let out = NormalizerConfig::LabelValue.normalize(&resp).unwrap();
    let names: Vec<&Value> = out.iter().map(|r| &r["metric_name"]).collect();
    assert_eq!(names, vec![&json!("follower_count"), &json!("impressions")]);
}

#[test]
fn test_label_value_length_mismatch_is_an_error() {
    let resp = response(json!({
        "reach": {"labels": ["2024-01-01", "2024-01-02", "2024-01-03"], "values": [1, 2]}
    }));
    let err = NormalizerConfig::LabelValue.normalize(&resp).unwrap_err();
    assert!(matches!(err, Error::Decode { .. }));
    assert!(err.to_string().contains("'reach': 3 labels but 2 values"), "{err}");
}

#[test_case(json!({"reach": 5}) ; "series not object")]
#[test_case(json!({"reach": {"values": [1]}}) ; "missing labels")]
#[test_case(json!({"reach": {"labels": "x", "values": [1]}}) ; "labels not array")]
fn test_label_value_shape_errors(body: Value) {
    assert!(NormalizerConfig::LabelValue.normalize(&response(body)).is_err());
}

// ============================================================================
// Nested Category
// ============================================================================

#[test]
fn test_nested_category_expansion() {
    let resp = dated(
        json!({"age": {"18-24": 100, "25-34": 200}, "gender": 50}),
        "2024-02-01",
    );
    let out = NormalizerConfig::NestedCategory.normalize(&resp).unwrap();
    assert_eq!(
        out,
        records(json!([
            {"date": "2024-02-01", "metric_name": "age", "metric_sub_name": "18-24", "metric_value": 100},
            {"date": "2024-02-01", "metric_name": "age", "metric_sub_name": "25-34", "metric_value": 200},
            {"date": "2024-02-01", "metric_name": "gender", "metric_sub_name": "gender", "metric_value": 50}
        ]))
    );
}

#[test]
fn test_nested_category_requires_request_date() {
    let resp = response(json!({"gender": 50}));
    let err = NormalizerConfig::NestedCategory.normalize(&resp).unwrap_err();
    assert!(err.to_string().contains("date"));
}

#[test]
fn test_nested_category_rejects_deeper_nesting() {
    let resp = dated(json!({"city": {"CA": {"Toronto": 3}}}), "2024-02-01");
    assert!(NormalizerConfig::NestedCategory.normalize(&resp).is_err());
}

#[test]
fn test_normalization_is_idempotent() {
    let resp = dated(json!({"age": {"18-24": 1}, "gender": 2}), "2024-02-01");
    let first = NormalizerConfig::NestedCategory.normalize(&resp).unwrap();
    let second = NormalizerConfig::NestedCategory.normalize(&resp).unwrap();
    assert_eq!(first, second);
}

// ============================================================================
// Date-Keyed
// ============================================================================

#[test]
fn test_date_keyed_map() {
    let resp = response(json!({
        "2024-03-01": {"followers": 10, "impressions": 99},
        "2024-03-02": {"followers": 11}
    }));
    let out = NormalizerConfig::DateKeyed.normalize(&resp).unwrap();
    assert_eq!(
        out,
        records(json!([
            {"date": "2024-03-01", "metric_name": "followers", "metric_value": 10},
            {"date": "2024-03-01", "metric_name": "impressions", "metric_value": 99},
            {"date": "2024-03-02", "metric_name": "followers", "metric_value": 11}
        ]))
    );
}

#[test]
fn test_date_keyed_non_object_metrics_is_error() {
    let resp = response(json!({"2024-03-01": [1, 2]}));
    assert!(NormalizerConfig::DateKeyed.normalize(&resp).is_err());
}

#[test]
fn test_normalizer_names() {
    assert_eq!(NormalizerConfig::Records.name(), "records");
    assert_eq!(NormalizerConfig::records_at("$.data").name(), "records");
    assert_eq!(NormalizerConfig::Timeseries.name(), "timeseries");
    assert_eq!(NormalizerConfig::LabelValue.name(), "label_value");
    assert_eq!(NormalizerConfig::NestedCategory.name(), "nested_category");
    assert_eq!(NormalizerConfig::DateKeyed.name(), "date_keyed");
}
