//! Schema types

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// JSON Schema type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JsonType {
    String,
    Number,
    Boolean,
    Object,
    Array,
    Null,
}

impl std::fmt::Display for JsonType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JsonType::String => write!(f, "string"),
            JsonType::Number => write!(f, "number"),
            JsonType::Boolean => write!(f, "boolean"),
            JsonType::Object => write!(f, "object"),
            JsonType::Array => write!(f, "array"),
            JsonType::Null => write!(f, "null"),
        }
    }
}

/// JSON type can be a single type or array of types (for nullable)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum JsonTypeOrArray {
    Single(JsonType),
    Multiple(Vec<JsonType>),
}

impl JsonTypeOrArray {
    /// Create a nullable type
    pub fn nullable(t: JsonType) -> Self {
        if t == JsonType::Null {
            JsonTypeOrArray::Single(JsonType::Null)
        } else {
            JsonTypeOrArray::Multiple(vec![t, JsonType::Null])
        }
    }

    /// Check if this type is nullable
    pub fn is_nullable(&self) -> bool {
        match self {
            JsonTypeOrArray::Single(JsonType::Null) => true,
            JsonTypeOrArray::Multiple(types) => types.contains(&JsonType::Null),
            JsonTypeOrArray::Single(_) => false,
        }
    }

    /// Get the primary (non-null) type
    pub fn primary_type(&self) -> Option<JsonType> {
        match self {
            JsonTypeOrArray::Single(t) => Some(*t),
            JsonTypeOrArray::Multiple(types) => {
                types.iter().copied().find(|t| *t != JsonType::Null)
            }
        }
    }
}

/// JSON Schema property definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaProperty {
    /// Property type(s)
    #[serde(rename = "type")]
    pub json_type: JsonTypeOrArray,

    /// Format hint (e.g., "date-time")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,

    /// Nested properties (for objects)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<BTreeMap<String, SchemaProperty>>,

    /// Array items schema
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<SchemaProperty>>,

    /// Names declared more than once while building `properties`
    #[serde(skip)]
    pub(crate) duplicates: Vec<String>,
}

impl SchemaProperty {
    /// Create a nullable property of the given type
    pub fn nullable(json_type: JsonType) -> Self {
        Self {
            json_type: JsonTypeOrArray::nullable(json_type),
            format: None,
            properties: None,
            items: None,
            duplicates: Vec::new(),
        }
    }

    /// Set format hint
    #[must_use]
    pub fn with_format(mut self, format: &str) -> Self {
        self.format = Some(format.to_string());
        self
    }

    /// Check if nullable
    pub fn is_nullable(&self) -> bool {
        self.json_type.is_nullable()
    }

    /// Whether values must be date-time strings
    pub fn is_date_time(&self) -> bool {
        self.format.as_deref() == Some("date-time")
    }
}

// ============================================================================
// Declaration Helpers
// ============================================================================

/// Nullable string
pub fn string() -> SchemaProperty {
    SchemaProperty::nullable(JsonType::String)
}

/// Nullable number
pub fn number() -> SchemaProperty {
    SchemaProperty::nullable(JsonType::Number)
}

/// Nullable boolean
pub fn boolean() -> SchemaProperty {
    SchemaProperty::nullable(JsonType::Boolean)
}

/// Nullable date-time string
pub fn date_time() -> SchemaProperty {
    string().with_format("date-time")
}

/// Nullable object with the given properties
pub fn object<'a>(properties: impl IntoIterator<Item = (&'a str, SchemaProperty)>) -> SchemaProperty {
    let (properties, duplicates) = collect_properties(properties);
    SchemaProperty {
        properties: Some(properties),
        duplicates,
        ..SchemaProperty::nullable(JsonType::Object)
    }
}

/// Nullable array of `items`
pub fn array(items: SchemaProperty) -> SchemaProperty {
    SchemaProperty {
        items: Some(Box::new(items)),
        ..SchemaProperty::nullable(JsonType::Array)
    }
}

fn collect_properties<'a>(
    properties: impl IntoIterator<Item = (&'a str, SchemaProperty)>,
) -> (BTreeMap<String, SchemaProperty>, Vec<String>) {
    let mut map = BTreeMap::new();
    let mut duplicates = Vec::new();
    for (name, property) in properties {
        if map.insert(name.to_string(), property).is_some() {
            duplicates.push(name.to_string());
        }
    }
    (map, duplicates)
}

/// Full JSON Schema document for one resource
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonSchema {
    /// Schema type (always "object" for top-level)
    #[serde(rename = "type")]
    pub json_type: JsonType,

    /// Object properties
    #[serde(default)]
    pub properties: BTreeMap<String, SchemaProperty>,

    /// Allow additional properties
    #[serde(rename = "additionalProperties", default)]
    pub additional_properties: bool,

    /// Names declared more than once
    #[serde(skip)]
    pub(crate) duplicates: Vec<String>,
}

impl JsonSchema {
    /// Build a closed schema from a list of properties
    pub fn from_properties<'a>(
        properties: impl IntoIterator<Item = (&'a str, SchemaProperty)>,
    ) -> Self {
        let (properties, duplicates) = collect_properties(properties);
        Self {
            json_type: JsonType::Object,
            properties,
            additional_properties: false,
            duplicates,
        }
    }

    /// Add a property, remembering if it was already declared
    pub fn add_property(&mut self, name: &str, property: SchemaProperty) {
        if self.properties.insert(name.to_string(), property).is_some() {
            self.duplicates.push(name.to_string());
        }
    }

    /// Get a property
    pub fn get_property(&self, name: &str) -> Option<&SchemaProperty> {
        self.properties.get(name)
    }

    /// Convert to JSON value
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}
