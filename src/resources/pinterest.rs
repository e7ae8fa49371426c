//! Pinterest backend resources

use super::definition::{ResourceDefinition, Service};
use crate::normalize::NormalizerConfig;
use crate::params::ParamBuilder;
use crate::schema::{boolean, date_time, number, string, JsonSchema};

const DAILY: &[(&str, &str)] = &[("scale", "DAILY")];

pub(super) fn resources() -> Vec<ResourceDefinition> {
    vec![account(), account_stats()]
}

fn account() -> ResourceDefinition {
    let schema = JsonSchema::from_properties([
        ("id", number()),
        ("avatar_url", string()),
        ("brand_id", number()),
        ("created_at", date_time()),
        ("deleted_at", date_time()),
        ("ga_view_id", string()),
        ("has_360", boolean()),
        ("import_protected_pins", boolean()),
        ("last_stats_updated_at", date_time()),
        ("pinterest_account_id", string()),
        ("pinterest_token", string()),
        ("pinterest_username", string()),
        ("total_followers", number()),
        ("total_profile_reach", number()),
        ("updated_at", date_time()),
    ]);

    ResourceDefinition::new(
        "pinterest_account",
        Service::Pinterest,
        "/brands/{brand_id}/account",
        schema,
    )
    .with_primary_keys(&["id"])
}

fn account_stats() -> ResourceDefinition {
    let schema = JsonSchema::from_properties([
        ("brand_id", number()),
        ("date", date_time()),
        ("metric_name", string()),
        ("metric_value", number()),
    ]);

    ResourceDefinition::new(
        "pinterest_account_stats",
        Service::Pinterest,
        "/brands/{brand_id}/account/stats",
        schema,
    )
    .with_primary_keys(&["brand_id", "date", "metric_name"])
    .with_replication_key("date")
    .with_params(ParamBuilder::DateWindow { constants: DAILY })
    .with_normalizer(NormalizerConfig::DateKeyed)
}
