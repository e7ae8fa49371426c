//! Facebook backend resources

use super::definition::{ResourceDefinition, Service};
use crate::normalize::NormalizerConfig;
use crate::params::ParamBuilder;
use crate::schema::{date_time, number, string, JsonSchema};

const DAILY: &[(&str, &str)] = &[("scale", "DAILY")];

pub(super) fn resources() -> Vec<ResourceDefinition> {
    vec![businesses(), page_metrics()]
}

fn businesses() -> ResourceDefinition {
    let schema = JsonSchema::from_properties([
        ("id", string()),
        ("name", string()),
        ("profile_picture_uri", string()),
    ]);

    ResourceDefinition::new(
        "facebook_businesses",
        Service::Facebook,
        "/brands/{brand_id}/fb_businesses",
        schema,
    )
    .with_primary_keys(&["id"])
}

fn page_metrics() -> ResourceDefinition {
    let schema = JsonSchema::from_properties([
        ("brand_id", number()),
        ("date", date_time()),
        ("avg_effectiveness", number()),
        ("avg_engagement_rate", number()),
        ("engagements", number()),
        ("impressions", number()),
        ("link_clicks", number()),
        ("new_fans", number()),
        ("post_count", number()),
        ("reach", number()),
        ("total_fans", number()),
    ]);

    ResourceDefinition::new(
        "facebook_page_metrics",
        Service::Facebook,
        "/brands/{brand_id}/page/metrics",
        schema,
    )
    .with_primary_keys(&["brand_id", "date"])
    .with_replication_key("date")
    .with_params(ParamBuilder::DateWindow { constants: DAILY })
    .with_normalizer(NormalizerConfig::Timeseries)
}
