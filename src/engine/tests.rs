//! Tests for engine module

use super::*;
use crate::error::ErrorKind;
use crate::resources::ResourceRegistry;
use crate::types::QueryParams;
use async_trait::async_trait;
use pretty_assertions::assert_eq;
use serde_json::json;
use std::collections::VecDeque;
use std::sync::Mutex;
use url::Url;

// ============================================================================
// Scripted Transport
// ============================================================================

/// Answers requests from a fixed list of (status, body) pairs
#[derive(Default)]
struct ScriptedTransport {
    pages: Mutex<VecDeque<(u16, Value)>>,
    requests: Mutex<Vec<(String, QueryParams)>>,
}

impl ScriptedTransport {
    fn new(pages: Vec<(u16, Value)>) -> Arc<Self> {
        Arc::new(Self {
            pages: Mutex::new(pages.into()),
            requests: Mutex::new(Vec::new()),
        })
    }

    fn ok(bodies: Vec<Value>) -> Arc<Self> {
        Self::new(bodies.into_iter().map(|body| (200, body)).collect())
    }

    fn requests(&self) -> Vec<(String, QueryParams)> {
        self.requests.lock().unwrap().clone()
    }

    fn queries(&self) -> Vec<QueryParams> {
        self.requests().into_iter().map(|(_, query)| query).collect()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn get(&self, url: &str, request: RequestConfig) -> Result<RawResponse> {
        self.requests
            .lock()
            .unwrap()
            .push((url.to_string(), request.query.clone()));
        let next = self.pages.lock().unwrap().pop_front();
        let (status, body) = next.ok_or_else(|| Error::state("no scripted response left"))?;
        let effective = Url::parse_with_params(url, request.query.iter())?;
        Ok(RawResponse::new(status, body, effective))
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn tap_config() -> TapConfig {
    TapConfig::from_value(json!({
        "api_key": "secret",
        "brand_id": 42,
        "start_date": "2024-01-01"
    }))
    .unwrap()
}

fn engine(transport: Arc<ScriptedTransport>, state: StateManager) -> SyncEngine {
    SyncEngine::new(transport, state, &tap_config()).with_today(date("2024-01-10"))
}

async fn mark(state: &StateManager, stream: &str) -> Option<Value> {
    state
        .stream_state(stream)
        .await
        .and_then(|s| s.replication_key_value)
}

fn query(pairs: &[(&str, &str)]) -> QueryParams {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect()
}

fn records(messages: &[Message]) -> Vec<Record> {
    messages
        .iter()
        .filter_map(|m| match m {
            Message::Record { record, .. } => Some(record.clone()),
            _ => None,
        })
        .collect()
}

fn state_messages(messages: &[Message]) -> Vec<Value> {
    messages
        .iter()
        .filter_map(|m| match m {
            Message::State(value) => Some(value.clone()),
            _ => None,
        })
        .collect()
}

fn timeseries(rows: &[(&str, i64)]) -> Value {
    let rows: Vec<Value> = rows
        .iter()
        .map(|(ts, likes)| json!({"timestamp": ts, "metrics": {"likes": likes}}))
        .collect();
    json!({ "timeseries_metrics": rows })
}

// ============================================================================
// Message Tests
// ============================================================================

#[test]
fn test_message_kinds() {
    let msg = Message::record("users", Record::new());
    assert!(msg.is_record());
    assert!(!msg.is_state());

    let msg = Message::state(json!({}));
    assert!(msg.is_state());
    assert!(!msg.is_log());

    for msg in [
        Message::info("i"),
        Message::debug("d"),
        Message::warn("w"),
        Message::error("e"),
    ] {
        assert!(msg.is_log());
    }
}

#[test]
fn test_message_to_json() {
    let mut record = Record::new();
    record.insert("id".to_string(), json!(1));
    let line = Message::record("pinterest_account", record).to_json();
    assert_eq!(line["type"], "RECORD");
    assert_eq!(line["stream"], "pinterest_account");
    assert_eq!(line["record"], json!({"id": 1}));
    assert!(line["emitted_at"].is_string());

    let line = Message::state(json!({"x": {}})).to_json();
    assert_eq!(line, json!({"type": "STATE", "value": {"x": {}}}));

    let line = Message::warn("careful").to_json();
    assert_eq!(
        line,
        json!({"type": "LOG", "level": "WARN", "message": "careful"})
    );
}

#[test]
fn test_sync_config_default() {
    let config = SyncConfig::default();
    assert!(!config.checkpoint_per_page);
    assert!(config.fail_fast);

    let config = SyncConfig::new()
        .with_state_per_page(true)
        .with_fail_fast(false);
    assert!(config.checkpoint_per_page);
    assert!(!config.fail_fast);
}

#[test]
fn test_sync_stats_counts_outcomes() {
    let mut stats = SyncStats::new();
    stats.add_stream(StreamSummary {
        stream: "a".to_string(),
        records: 3,
        pages: 2,
        status: StreamStatus::Succeeded,
    });
    stats.add_stream(StreamSummary {
        stream: "b".to_string(),
        records: 1,
        pages: 1,
        status: StreamStatus::Failed {
            kind: ErrorKind::Transport,
            error: "HTTP 500".to_string(),
        },
    });
    assert_eq!(stats.records_synced, 4);
    assert_eq!(stats.pages_fetched, 3);
    assert_eq!(stats.streams_synced, 1);
    assert_eq!(stats.errors, 1);
    assert!(!stats.is_success());
    assert_eq!(stats.failed_streams(), vec!["b"]);

    let summary = serde_json::to_value(&stats.streams[1]).unwrap();
    assert_eq!(summary["status"], "failed");
    assert_eq!(summary["error"], "HTTP 500");
    assert_eq!(summary["kind"], "transport");
}

// ============================================================================
// Page Loop Tests
// ============================================================================

#[tokio::test]
async fn test_date_window_pages_until_cursor_is_missing() {
    let registry = ResourceRegistry::new().unwrap();
    let resource = registry.require("twitter_metrics").unwrap();

    let mut first = timeseries(&[("2024-01-01T00:00:00", 3), ("2024-01-02T00:00:00", 4)]);
    first["paging"] = json!({"next": "page-2"});
    let second = timeseries(&[("2024-01-03T00:00:00", 5)]);
    let transport = ScriptedTransport::ok(vec![first, second]);

    let mut engine = engine(transport.clone(), StateManager::in_memory());
    let mut sink: Vec<Message> = Vec::new();
    let summary = engine.sync_resource(resource, &mut sink).await.unwrap();

    assert_eq!(summary.records, 3);
    assert_eq!(summary.pages, 2);
    assert!(summary.succeeded());

    let emitted = records(&sink);
    assert_eq!(emitted.len(), 3);
    assert!(emitted.iter().all(|r| r["brand_id"] == json!(42)));
    assert_eq!(emitted[0]["date"], json!("2024-01-01T00:00:00"));
    assert_eq!(emitted[2]["likes"], json!(5));

    let expected = query(&[
        ("end_date", "2024-01-09"),
        ("scale", "DAILY"),
        ("start_date", "2024-01-01"),
    ]);
    assert_eq!(transport.queries(), vec![expected.clone(), expected]);
    assert_eq!(
        transport.requests()[0].0,
        "https://twitter.example-analytics.com/brands/42/metrics"
    );

    assert_eq!(
        mark(engine.state(), "twitter_metrics").await,
        Some(json!("2024-01-03T00:00:00"))
    );
}

#[tokio::test]
async fn test_incremental_run_starts_at_high_water_mark() {
    let registry = ResourceRegistry::new().unwrap();
    let resource = registry.require("facebook_page_metrics").unwrap();

    let state = StateManager::from_json(
        r#"{"facebook_page_metrics": {"replication_key_value": "2024-01-05T00:00:00"}}"#,
    )
    .unwrap();
    let transport = ScriptedTransport::ok(vec![json!({"timeseries_metrics": []})]);
    let mut engine = engine(transport.clone(), state);
    let mut sink: Vec<Message> = Vec::new();
    engine.sync_resource(resource, &mut sink).await.unwrap();

    assert_eq!(transport.queries()[0]["start_date"], "2024-01-05");
    assert!(records(&sink).is_empty());
    assert_eq!(
        mark(engine.state(), "facebook_page_metrics").await,
        Some(json!("2024-01-05T00:00:00"))
    );
}

#[tokio::test]
async fn test_empty_date_window_sends_no_request() {
    let registry = ResourceRegistry::new().unwrap();
    let resource = registry.require("twitter_metrics").unwrap();

    let state = StateManager::from_json(
        r#"{"twitter_metrics": {"replication_key_value": "2024-01-12T00:00:00"}}"#,
    )
    .unwrap();
    let transport = ScriptedTransport::ok(vec![]);
    let mut engine = engine(transport.clone(), state);
    let mut sink: Vec<Message> = Vec::new();
    let summary = engine.sync_resource(resource, &mut sink).await.unwrap();

    assert!(transport.requests().is_empty());
    assert_eq!(summary.pages, 0);
    assert_eq!(summary.records, 0);
    assert_eq!(
        mark(engine.state(), "twitter_metrics").await,
        Some(json!("2024-01-12T00:00:00"))
    );
}

#[tokio::test]
async fn test_high_water_mark_never_regresses() {
    let registry = ResourceRegistry::new().unwrap();
    let resource = registry.require("twitter_metrics").unwrap();

    let state = StateManager::from_json(
        r#"{"twitter_metrics": {"replication_key_value": "2024-01-08T00:00:00"}}"#,
    )
    .unwrap();
    let transport = ScriptedTransport::ok(vec![timeseries(&[("2024-01-06T00:00:00", 1)])]);
    let mut engine = engine(transport, state);
    engine.sync_resource(resource, &mut Vec::<Message>::new()).await.unwrap();

    assert_eq!(
        mark(engine.state(), "twitter_metrics").await,
        Some(json!("2024-01-08T00:00:00"))
    );
}

#[tokio::test]
async fn test_date_cursor_walks_days_until_yesterday() {
    let registry = ResourceRegistry::new().unwrap();
    let resource = registry
        .require("instagram_daily_followers_demographics")
        .unwrap();

    let body = json!({"age": {"18-24": 100, "25-34": 200}, "gender": 50});
    let transport = ScriptedTransport::ok(vec![body.clone(), body]);
    let mut engine = SyncEngine::new(transport.clone(), StateManager::in_memory(), &tap_config())
        .with_today(date("2024-01-04"));
    let mut sink: Vec<Message> = Vec::new();
    engine.sync_resource(resource, &mut sink).await.unwrap();

    assert_eq!(
        transport.queries(),
        vec![
            query(&[("date", "2024-01-01")]),
            query(&[("date", "2024-01-02")]),
        ]
    );

    let emitted = records(&sink);
    assert_eq!(emitted.len(), 6);
    assert_eq!(emitted[0]["date"], json!("2024-01-01"));
    assert_eq!(emitted[5]["date"], json!("2024-01-02"));
    let gender = emitted.iter().find(|r| r["metric_name"] == "gender").unwrap();
    assert_eq!(gender["metric_sub_name"], json!("gender"));

    assert_eq!(
        mark(engine.state(), "instagram_daily_followers_demographics").await,
        Some(json!("2024-01-02"))
    );
}

#[tokio::test]
async fn test_offset_pagination_re_embeds_offset() {
    let registry = ResourceRegistry::new().unwrap();
    let resource = registry.require("instagram_relationships").unwrap();

    let transport = ScriptedTransport::ok(vec![
        json!({
            "data": [{"id": 1, "email": "a@example.com"}],
            "paging": {"next": "https://instagram-backend.example-analytics.com/brands/42/instagram/relationships?all_relationships=True&offset=50"}
        }),
        json!({"data": [{"id": 2, "tags": [{"id": 7, "name": "vip", "color": "red"}]}]}),
    ]);
    let mut engine = engine(transport.clone(), StateManager::in_memory());
    let mut sink: Vec<Message> = Vec::new();
    engine.sync_resource(resource, &mut sink).await.unwrap();

    assert_eq!(
        transport.queries(),
        vec![
            query(&[("all_relationships", "True")]),
            query(&[("all_relationships", "True"), ("offset", "50")]),
        ]
    );
    let ids: Vec<_> = records(&sink).iter().map(|r| r["id"].clone()).collect();
    assert_eq!(ids, vec![json!(1), json!(2)]);
    assert_eq!(
        mark(engine.state(), "instagram_relationships").await,
        None
    );
}

#[tokio::test]
async fn test_resume_from_bookmark() {
    let registry = ResourceRegistry::new().unwrap();
    let resource = registry.require("instagram_relationships").unwrap();

    let state = StateManager::from_json(
        r#"{"instagram_relationships": {"bookmark": {"type": "offset", "value": "100"}}}"#,
    )
    .unwrap();
    let transport = ScriptedTransport::ok(vec![json!({"data": []})]);
    let mut engine = engine(transport.clone(), state);
    engine.sync_resource(resource, &mut Vec::<Message>::new()).await.unwrap();

    assert_eq!(transport.queries()[0]["offset"], "100");
    let stream = engine
        .state()
        .stream_state("instagram_relationships")
        .await
        .unwrap();
    assert_eq!(stream.bookmark, None);
}

#[tokio::test]
async fn test_empty_page_ends_the_resource() {
    let registry = ResourceRegistry::new().unwrap();
    let resource = registry.require("pinterest_account_stats").unwrap();

    let transport = ScriptedTransport::ok(vec![json!({})]);
    let mut engine = engine(transport.clone(), StateManager::in_memory());
    let summary = engine.sync_resource(resource, &mut Vec::<Message>::new()).await.unwrap();

    assert_eq!(summary.records, 0);
    assert_eq!(summary.pages, 1);
    assert_eq!(transport.requests().len(), 1);
}

// ============================================================================
// Failure Tests
// ============================================================================

#[tokio::test]
async fn test_invalid_record_fails_the_whole_page() {
    let registry = ResourceRegistry::new().unwrap();
    let resource = registry.require("twitter_metrics").unwrap();

    let body = json!({"timeseries_metrics": [
        {"timestamp": "2024-01-01T00:00:00", "metrics": {"likes": 1}},
        {"timestamp": "2024-01-02T00:00:00", "metrics": {"likes": "many"}}
    ]});
    let transport = ScriptedTransport::ok(vec![body]);
    let mut engine = engine(transport, StateManager::in_memory());
    let mut sink: Vec<Message> = Vec::new();
    let err = engine.sync_resource(resource, &mut sink).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::SchemaValidation);
    assert!(err.to_string().contains("twitter_metrics"));
    assert!(records(&sink).is_empty());
    assert!(engine.state().stream_state("twitter_metrics").await.is_none());
}

#[tokio::test]
async fn test_unknown_field_fails_validation() {
    let registry = ResourceRegistry::new().unwrap();
    let resource = registry.require("pinterest_account").unwrap();

    let transport = ScriptedTransport::ok(vec![json!([{"id": 1, "surprise": true}])]);
    let mut engine = engine(transport, StateManager::in_memory());
    let err = engine
        .sync_resource(resource, &mut Vec::<Message>::new())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::SchemaValidation);
    assert!(err.to_string().contains("surprise"));
}

#[tokio::test]
async fn test_configured_brand_replaces_upstream_brand() {
    let registry = ResourceRegistry::new().unwrap();
    let resource = registry.require("pinterest_account").unwrap();

    let transport = ScriptedTransport::ok(vec![json!([
        {"id": 1, "brand_id": 999},
        {"id": 2, "brand_id": null},
        {"id": 3}
    ])]);
    let mut engine = engine(transport, StateManager::in_memory());
    let mut sink: Vec<Message> = Vec::new();
    engine.sync_resource(resource, &mut sink).await.unwrap();

    let brands: Vec<Value> = records(&sink).iter().map(|r| r["brand_id"].clone()).collect();
    assert_eq!(brands, vec![json!(42), json!(42), json!(42)]);
}

#[tokio::test]
async fn test_normalization_error_names_stream_token_and_status() {
    let registry = ResourceRegistry::new().unwrap();
    let resource = registry.require("twitter_metrics").unwrap();

    let transport = ScriptedTransport::ok(vec![json!({"unexpected": 1})]);
    let mut engine = engine(transport, StateManager::in_memory());
    let err = engine
        .sync_resource(resource, &mut Vec::<Message>::new())
        .await
        .unwrap_err();

    match err {
        Error::StreamFailed { stream, source } => {
            assert_eq!(stream, "twitter_metrics");
            match *source {
                Error::Normalization {
                    stream,
                    token,
                    status,
                    ..
                } => {
                    assert_eq!(stream, "twitter_metrics");
                    assert_eq!(token, None);
                    assert_eq!(status, 200);
                }
                other => panic!("expected normalization error, got {other:?}"),
            }
        }
        other => panic!("expected stream failure, got {other:?}"),
    }
}

#[tokio::test]
async fn test_http_error_keeps_previous_state() {
    let registry = ResourceRegistry::new().unwrap();
    let resource = registry.require("twitter_metrics").unwrap();

    let state = StateManager::from_json(
        r#"{"twitter_metrics": {"replication_key_value": "2024-01-03T00:00:00"}}"#,
    )
    .unwrap();
    let mut first = timeseries(&[("2024-01-04T00:00:00", 1)]);
    first["paging"] = json!({"next": "page-2"});
    let transport = ScriptedTransport::new(vec![(200, first), (500, json!("boom"))]);
    let mut engine = engine(transport, state);
    let err = engine
        .sync_resource(resource, &mut Vec::<Message>::new())
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Transport);
    assert!(err.to_string().contains("boom"));
    assert_eq!(
        mark(engine.state(), "twitter_metrics").await,
        Some(json!("2024-01-03T00:00:00"))
    );
    assert_eq!(engine.stats().errors, 1);
    assert_eq!(engine.stats().streams[0].pages, 1);
}

#[tokio::test]
async fn test_repeated_cursor_is_a_pagination_loop() {
    let registry = ResourceRegistry::new().unwrap();
    let resource = registry.require("instagram_relationships").unwrap();

    let page = json!({"data": [], "paging": {"next": "/brands/42/instagram/relationships?offset=50"}});
    let transport = ScriptedTransport::ok(vec![page.clone(), page]);
    let mut engine = engine(transport.clone(), StateManager::in_memory());
    let err = engine
        .sync_resource(resource, &mut Vec::<Message>::new())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        Error::StreamFailed { ref source, .. } if matches!(**source, Error::PaginationLoop { .. })
    ));
    assert_eq!(transport.requests().len(), 2);
}

#[tokio::test]
async fn test_missing_start_date_is_a_configuration_error() {
    let registry = ResourceRegistry::new().unwrap();
    let resource = registry.require("pinterest_account_stats").unwrap();

    let tap = TapConfig::from_value(json!({"api_key": "k", "brand_id": 1})).unwrap();
    let transport = ScriptedTransport::ok(vec![]);
    let mut engine = SyncEngine::new(transport.clone(), StateManager::in_memory(), &tap);
    let err = engine
        .sync_resource(resource, &mut Vec::<Message>::new())
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Configuration);
    assert!(transport.requests().is_empty());
}

// ============================================================================
// Orchestration Tests
// ============================================================================

#[tokio::test]
async fn test_sync_emits_state_after_each_resource() {
    let registry = ResourceRegistry::new().unwrap();
    let resources = registry
        .select(&["pinterest_account".to_string(), "twitter_metrics".to_string()])
        .unwrap();

    let transport = ScriptedTransport::ok(vec![
        json!([{"id": 1}]),
        timeseries(&[("2024-01-02T00:00:00", 9)]),
    ]);
    let mut engine = engine(transport, StateManager::in_memory());
    let mut sink: Vec<Message> = Vec::new();
    engine.sync(&resources, &mut sink).await.unwrap();

    let states = state_messages(&sink);
    assert_eq!(states.len(), 2);
    assert_eq!(
        states[1]["twitter_metrics"],
        json!({"replication_key_value": "2024-01-02T00:00:00"})
    );
    assert_eq!(engine.stats().streams_synced, 2);
    assert_eq!(engine.stats().records_synced, 2);
    assert!(engine.stats().is_success());
}

#[tokio::test]
async fn test_state_per_page_carries_bookmark() {
    let registry = ResourceRegistry::new().unwrap();
    let resources = registry.select(&["instagram_relationships".to_string()]).unwrap();

    let transport = ScriptedTransport::ok(vec![
        json!({"data": [{"id": 1}], "paging": {"next": "/brands/42/instagram/relationships?offset=25"}}),
        json!({"data": [{"id": 2}]}),
    ]);
    let mut engine = engine(transport, StateManager::in_memory())
        .with_config(SyncConfig::new().with_state_per_page(true));
    let mut sink: Vec<Message> = Vec::new();
    engine.sync(&resources, &mut sink).await.unwrap();

    let states = state_messages(&sink);
    assert_eq!(states.len(), 2);
    assert_eq!(
        states[0]["instagram_relationships"]["bookmark"],
        json!({"type": "offset", "value": "25"})
    );
    assert!(states[1]["instagram_relationships"].get("bookmark").is_none());
}

#[tokio::test]
async fn test_fail_fast_stops_at_first_failure() {
    let registry = ResourceRegistry::new().unwrap();
    let resources = registry
        .select(&["pinterest_account".to_string(), "twitter_account".to_string()])
        .unwrap();

    let transport = ScriptedTransport::new(vec![(401, json!({"error": "bad token"}))]);
    let mut engine = engine(transport.clone(), StateManager::in_memory());
    let mut sink: Vec<Message> = Vec::new();
    let err = engine.sync(&resources, &mut sink).await.unwrap_err();

    assert!(err.to_string().contains("pinterest_account"));
    assert_eq!(transport.requests().len(), 1);
    assert!(state_messages(&sink).is_empty());
    assert!(sink
        .iter()
        .any(|m| matches!(m, Message::Log { level: crate::types::LogLevel::Error, .. })));
}

#[tokio::test]
async fn test_keep_going_runs_remaining_resources() {
    let registry = ResourceRegistry::new().unwrap();
    let resources = registry
        .select(&["pinterest_account".to_string(), "twitter_account".to_string()])
        .unwrap();

    let transport = ScriptedTransport::new(vec![
        (503, json!(null)),
        (200, json!([{"id": 5, "handle": "brand"}])),
    ]);
    let mut engine = engine(transport, StateManager::in_memory())
        .with_config(SyncConfig::new().with_fail_fast(false));
    let mut sink: Vec<Message> = Vec::new();
    let err = engine.sync(&resources, &mut sink).await.unwrap_err();

    assert!(err.to_string().contains("pinterest_account"));
    assert_eq!(records(&sink).len(), 1);
    assert_eq!(state_messages(&sink).len(), 1);
    assert_eq!(engine.stats().failed_streams(), vec!["pinterest_account"]);
    assert_eq!(engine.stats().streams_synced, 1);
}
