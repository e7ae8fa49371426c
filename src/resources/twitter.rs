//! Twitter backend resources

use super::definition::{ResourceDefinition, Service};
use crate::normalize::NormalizerConfig;
use crate::params::ParamBuilder;
use crate::schema::{date_time, number, string, JsonSchema, SchemaProperty};

const DAILY: &[(&str, &str)] = &[("scale", "DAILY")];

/// Metrics reported once in total and split by organic/promoted reach
const SPLIT_METRICS: &[&str] = &[
    "engagement_rate",
    "engagements",
    "impressions",
    "likes",
    "replies",
    "retweets",
    "url_clicks",
    "user_profile_clicks",
    "video_views",
];

const SPLIT_SUFFIXES: &[&str] = &["", "_organic", "_promoted", "_total"];

const PLAIN_METRICS: &[&str] = &[
    "new_followers",
    "quote_tweets",
    "total_followers",
    "total_retweets",
    "tweets_published",
];

pub(super) fn resources() -> Vec<ResourceDefinition> {
    vec![account(), metrics()]
}

fn account() -> ResourceDefinition {
    let schema = JsonSchema::from_properties([
        ("id", number()),
        ("ads_account_id", number()),
        ("brand_id", number()),
        ("handle", string()),
        ("last_stats_updated_at", date_time()),
        ("status", number()),
        ("total_followers", number()),
        ("twitter_avatar", string()),
        ("twitter_user_id", string()),
    ]);

    ResourceDefinition::new(
        "twitter_account",
        Service::Twitter,
        "/brands/{brand_id}/account",
        schema,
    )
    .with_primary_keys(&["id"])
}

fn metrics() -> ResourceDefinition {
    let split: Vec<String> = SPLIT_METRICS
        .iter()
        .flat_map(|metric| SPLIT_SUFFIXES.iter().map(move |suffix| format!("{metric}{suffix}")))
        .collect();

    let mut fields: Vec<(&str, SchemaProperty)> =
        vec![("brand_id", number()), ("date", date_time())];
    fields.extend(split.iter().map(|name| (name.as_str(), number())));
    fields.extend(PLAIN_METRICS.iter().map(|name| (*name, number())));

    ResourceDefinition::new(
        "twitter_metrics",
        Service::Twitter,
        "/brands/{brand_id}/metrics",
        JsonSchema::from_properties(fields),
    )
    .with_primary_keys(&["brand_id", "date"])
    .with_replication_key("date")
    .with_params(ParamBuilder::DateWindow { constants: DAILY })
    .with_normalizer(NormalizerConfig::Timeseries)
}
