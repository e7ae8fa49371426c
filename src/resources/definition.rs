//! Resource definition types

use crate::config::CatalogStream;
use crate::error::{Error, Result};
use crate::normalize::NormalizerConfig;
use crate::pagination::PaginationConfig;
use crate::params::ParamBuilder;
use crate::schema::{check_definition, JsonSchema};
use crate::template::{self, TemplateContext};
use crate::types::SyncMode;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Base URL template; `{service}` is replaced by the backend host name
pub const DEFAULT_API_URL: &str = "https://{service}.example-analytics.com";

/// Backend service hosting a resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Service {
    /// Facebook pages and businesses
    Facebook,
    /// Instagram insights and relationships
    Instagram,
    /// Pinterest account and stats
    Pinterest,
    /// Twitter account and metrics
    Twitter,
}

impl Service {
    /// Every backend
    pub const ALL: [Service; 4] = [
        Service::Facebook,
        Service::Instagram,
        Service::Pinterest,
        Service::Twitter,
    ];

    /// Host name of the backend, substituted for `{service}`
    pub fn host_name(&self) -> &'static str {
        match self {
            Service::Facebook => "facebook",
            Service::Instagram => "instagram-backend",
            Service::Pinterest => "pinterest",
            Service::Twitter => "twitter",
        }
    }
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.host_name())
    }
}

/// One extractable endpoint
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceDefinition {
    /// Unique resource name
    pub name: &'static str,
    /// Backend hosting the endpoint
    pub service: Service,
    /// Path template, may reference `{brand_id}`
    pub path: &'static str,
    /// Ordered primary key fields
    pub primary_keys: &'static [&'static str],
    /// Replication key; `None` means full refresh
    pub replication_key: Option<&'static str>,
    /// Declared record schema
    pub schema: JsonSchema,
    /// How the next page is found
    pub pagination: PaginationConfig,
    /// How query parameters are built
    pub params: ParamBuilder,
    /// How a page becomes records
    pub normalizer: NormalizerConfig,
}

impl ResourceDefinition {
    /// Create a definition with cursor pagination at `$.paging.next`, no
    /// parameters and a plain record list body
    pub fn new(name: &'static str, service: Service, path: &'static str, schema: JsonSchema) -> Self {
        Self {
            name,
            service,
            path,
            primary_keys: &[],
            replication_key: None,
            schema,
            pagination: PaginationConfig::json_path_default(),
            params: ParamBuilder::None,
            normalizer: NormalizerConfig::Records,
        }
    }

    /// Set the primary keys
    #[must_use]
    pub fn with_primary_keys(mut self, keys: &'static [&'static str]) -> Self {
        self.primary_keys = keys;
        self
    }

    /// Set the replication key
    #[must_use]
    pub fn with_replication_key(mut self, key: &'static str) -> Self {
        self.replication_key = Some(key);
        self
    }

    /// Set the pagination strategy
    #[must_use]
    pub fn with_pagination(mut self, pagination: PaginationConfig) -> Self {
        self.pagination = pagination;
        self
    }

    /// Set the parameter builder
    #[must_use]
    pub fn with_params(mut self, params: ParamBuilder) -> Self {
        self.params = params;
        self
    }

    /// Set the normalizer
    #[must_use]
    pub fn with_normalizer(mut self, normalizer: NormalizerConfig) -> Self {
        self.normalizer = normalizer;
        self
    }

    /// Incremental when a replication key is declared
    pub fn sync_mode(&self) -> SyncMode {
        if self.replication_key.is_some() {
            SyncMode::Incremental
        } else {
            SyncMode::FullRefresh
        }
    }

    /// Full request URL for `brand_id`, given a base URL template
    pub fn url(&self, api_url: &str, brand_id: u64) -> Result<String> {
        let base = template::render(
            api_url,
            &TemplateContext::new().with("service", self.service.host_name()),
        )?;
        let path = template::render(self.path, &TemplateContext::new().with("brand_id", brand_id))?;
        Ok(format!(
            "{}/{}",
            base.trim_end_matches('/'),
            path.trim_start_matches('/')
        ))
    }

    /// Check the definition is internally consistent
    pub fn validate(&self) -> Result<()> {
        if let Some(var) = template::extract_variables(self.path)
            .into_iter()
            .find(|var| var != "brand_id")
        {
            return Err(Error::schema_definition(
                self.name,
                format!("path '{}' uses unknown variable '{var}'", self.path),
            ));
        }
        check_definition(self.name, &self.schema, self.primary_keys, self.replication_key)
    }

    /// Discovery entry for this resource
    pub fn catalog_stream(&self) -> CatalogStream {
        let supported_sync_modes = match self.sync_mode() {
            SyncMode::Incremental => vec![SyncMode::FullRefresh, SyncMode::Incremental],
            SyncMode::FullRefresh => vec![SyncMode::FullRefresh],
        };

        CatalogStream {
            name: self.name.to_string(),
            json_schema: self.schema.to_json(),
            supported_sync_modes,
            default_cursor_field: self.replication_key.map(|key| vec![key.to_string()]),
            source_defined_primary_key: (!self.primary_keys.is_empty()).then(|| {
                self.primary_keys
                    .iter()
                    .map(|key| vec![(*key).to_string()])
                    .collect()
            }),
            service: self.service,
        }
    }
}
