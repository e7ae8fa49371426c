//! Resource registry

use super::definition::ResourceDefinition;
use super::{facebook, instagram, pinterest, twitter};
use crate::config::Catalog;
use crate::error::{Error, Result};
use crate::schema::number;
use std::collections::BTreeSet;

/// Field attached to every record
const BRAND_FIELD: &str = "brand_id";

/// Validated, immutable set of resource definitions
#[derive(Debug, Clone)]
pub struct ResourceRegistry {
    resources: Vec<ResourceDefinition>,
}

impl ResourceRegistry {
    /// Build the registry of every resource the tap knows
    pub fn new() -> Result<Self> {
        let definitions = facebook::resources()
            .into_iter()
            .chain(instagram::resources())
            .chain(pinterest::resources())
            .chain(twitter::resources())
            .collect();
        Self::from_definitions(definitions)
    }

    /// Build a registry from explicit definitions.
    ///
    /// Every schema gains a numeric `brand_id` if it does not declare one.
    /// Malformed definitions and duplicate names are configuration errors.
    pub fn from_definitions(mut definitions: Vec<ResourceDefinition>) -> Result<Self> {
        let mut names = BTreeSet::new();
        for definition in &mut definitions {
            if !names.insert(definition.name) {
                return Err(Error::schema_definition(
                    definition.name,
                    "resource name is used more than once",
                ));
            }
            if definition.schema.get_property(BRAND_FIELD).is_none() {
                definition.schema.add_property(BRAND_FIELD, number());
            }
            definition.validate()?;
        }
        Ok(Self {
            resources: definitions,
        })
    }

    /// Look up a resource by name
    pub fn get(&self, name: &str) -> Option<&ResourceDefinition> {
        self.resources.iter().find(|r| r.name == name)
    }

    /// Look up a resource, failing if unknown
    pub fn require(&self, name: &str) -> Result<&ResourceDefinition> {
        self.get(name).ok_or_else(|| Error::StreamNotFound {
            stream: name.to_string(),
        })
    }

    /// Resources to sync, in registry order.
    ///
    /// An empty selection means every resource.
    pub fn select(&self, names: &[String]) -> Result<Vec<&ResourceDefinition>> {
        if names.is_empty() {
            return Ok(self.resources.iter().collect());
        }
        for name in names {
            self.require(name)?;
        }
        Ok(self
            .resources
            .iter()
            .filter(|r| names.iter().any(|n| n == r.name))
            .collect())
    }

    /// Iterate over every resource
    pub fn iter(&self) -> impl Iterator<Item = &ResourceDefinition> {
        self.resources.iter()
    }

    /// Names of every resource
    pub fn names(&self) -> Vec<&'static str> {
        self.resources.iter().map(|r| r.name).collect()
    }

    /// Number of resources
    pub fn len(&self) -> usize {
        self.resources.len()
    }

    /// Whether the registry is empty
    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    /// Discovery catalog of every resource
    pub fn catalog(&self) -> Catalog {
        Catalog {
            streams: self
                .resources
                .iter()
                .map(ResourceDefinition::catalog_stream)
                .collect(),
        }
    }
}
