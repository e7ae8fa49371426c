//! Instagram backend resources

use super::definition::{ResourceDefinition, Service};
use crate::normalize::NormalizerConfig;
use crate::pagination::PaginationConfig;
use crate::params::ParamBuilder;
use crate::schema::{array, boolean, date_time, number, object, string, JsonSchema};

const DAILY: &[(&str, &str)] = &[("scale", "DAILY")];
const DAILY_UNFILLED: &[(&str, &str)] = &[("fill_empty", "False"), ("scale", "DAILY")];
const ALL_RELATIONSHIPS: &[(&str, &str)] = &[("all_relationships", "True")];

pub(super) fn resources() -> Vec<ResourceDefinition> {
    vec![
        daily_insights(
            "instagram_daily_brand_user_insights",
            "/brands/{brand_id}/brand_user_insights",
            DAILY,
        ),
        daily_insights(
            "instagram_daily_followers_lost_insights",
            "/brands/{brand_id}/followers_lost_insights",
            DAILY,
        ),
        followers_demographics(),
        daily_insights(
            "instagram_daily_followers_insights",
            "/brands/{brand_id}/followers_insights",
            DAILY_UNFILLED,
        ),
        relationships(),
    ]
}

/// Label/value series over a date window, one record per (date, metric)
fn daily_insights(
    name: &'static str,
    path: &'static str,
    constants: &'static [(&'static str, &'static str)],
) -> ResourceDefinition {
    let schema = JsonSchema::from_properties([
        ("brand_id", number()),
        ("date", date_time()),
        ("metric_name", string()),
        ("metric_value", number()),
    ]);

    ResourceDefinition::new(name, Service::Instagram, path, schema)
        .with_primary_keys(&["brand_id", "date", "metric_name"])
        .with_replication_key("date")
        .with_params(ParamBuilder::DateWindow { constants })
        .with_normalizer(NormalizerConfig::LabelValue)
}

fn followers_demographics() -> ResourceDefinition {
    let schema = JsonSchema::from_properties([
        ("brand_id", number()),
        ("date", date_time()),
        ("metric_name", string()),
        ("metric_sub_name", string()),
        ("metric_value", number()),
    ]);

    ResourceDefinition::new(
        "instagram_daily_followers_demographics",
        Service::Instagram,
        "/brands/{brand_id}/followers_demographics",
        schema,
    )
    .with_primary_keys(&["brand_id", "date", "metric_name", "metric_sub_name"])
    .with_replication_key("date")
    .with_pagination(PaginationConfig::DateCursor)
    .with_params(ParamBuilder::DateCursor)
    .with_normalizer(NormalizerConfig::NestedCategory)
}

fn relationships() -> ResourceDefinition {
    let tag = object([("id", number()), ("color", string()), ("name", string())]);
    let user = object([
        ("avg_effectiveness", number()),
        ("avg_engagement", number()),
        ("avg_likes", number()),
        ("avg_posts_weekly", number()),
        ("avg_reach", number()),
        ("avg_total_engagement", number()),
        ("bio", string()),
        ("bio_url", string()),
        ("followers", number()),
        ("following", number()),
        ("handle", string()),
        ("instagram_id", number()),
        ("is_business", number()),
    ]);

    let schema = JsonSchema::from_properties([
        ("brand_id", number()),
        ("acceptance_status", string()),
        ("avg_effectiveness", number()),
        ("avg_emv", string()),
        ("avg_engagement", number()),
        ("avg_reach", number()),
        ("avg_total_engagements", number()),
        ("cover_image", string()),
        ("created_at", date_time()),
        ("email", string()),
        ("has_piq", boolean()),
        ("id", number()),
        ("invitation_accepted_at", date_time()),
        ("invitation_revoked_at", date_time()),
        ("is_fb_connected", boolean()),
        ("last_post_created_at", date_time()),
        ("notes", string()),
        ("piq_avg_effectiveness", number()),
        ("piq_avg_engagement", number()),
        ("piq_avg_reach", number()),
        ("piq_avg_total_engagements", number()),
        ("piq_cover_image", string()),
        ("piq_last_post_created_at", date_time()),
        ("piq_recent_images", string()),
        ("piq_total_emv", number()),
        ("piq_total_followers_gained", number()),
        ("piq_total_posts", number()),
        ("recent_images", string()),
        ("relation_followers", number()),
        ("relation_instagram_id", number()),
        ("riq_avg_effectiveness", number()),
        ("riq_avg_emv", string()),
        ("riq_avg_engagement", number()),
        ("riq_avg_reach", number()),
        ("riq_avg_total_engagements", number()),
        ("riq_cover_image", string()),
        ("riq_last_post_created_at", date_time()),
        ("riq_recent_images", string()),
        ("riq_story_avg_completion_rate", number()),
        ("riq_story_avg_exit_rate", number()),
        ("riq_story_avg_impressions", number()),
        ("riq_story_avg_reach", number()),
        ("riq_story_total_posts", number()),
        ("riq_total_emv", number()),
        ("riq_total_followers_gained", number()),
        ("riq_total_posts", number()),
        ("story_avg_completion_rate", number()),
        ("story_avg_exit_rate", number()),
        ("story_avg_impressions", number()),
        ("story_avg_reach", number()),
        ("story_total_posts", number()),
        ("tags", array(tag)),
        ("total_emv", number()),
        ("total_followers_gained", number()),
        ("total_posts", number()),
        ("user", user),
    ]);

    ResourceDefinition::new(
        "instagram_relationships",
        Service::Instagram,
        "/brands/{brand_id}/instagram/relationships",
        schema,
    )
    .with_primary_keys(&["brand_id", "id"])
    .with_pagination(PaginationConfig::offset_url())
    .with_params(ParamBuilder::Offset {
        constants: ALL_RELATIONSHIPS,
    })
    .with_normalizer(NormalizerConfig::records_at("$.data"))
}
