//! Schema checks
//!
//! `check_definition` runs once per resource at startup;
//! `validate_record` runs on every record before it is emitted.

use super::types::{JsonSchema, JsonType, SchemaProperty};
use crate::error::{Error, Result};
use crate::types::{parse_datetime, Record};
use serde_json::Value;
use std::collections::BTreeMap;

/// Check that a declared schema is well formed and declares its keys
pub fn check_definition(
    resource: &str,
    schema: &JsonSchema,
    primary_keys: &[&str],
    replication_key: Option<&str>,
) -> Result<()> {
    if let Some(name) = schema.duplicates.first() {
        return Err(Error::schema_definition(
            resource,
            format!("field '{name}' is declared more than once"),
        ));
    }
    check_properties(resource, "", &schema.properties)?;

    for key in primary_keys.iter().copied().chain(replication_key) {
        if !schema.properties.contains_key(key) {
            return Err(Error::schema_definition(
                resource,
                format!("key '{key}' is not declared in the schema"),
            ));
        }
    }
    Ok(())
}

fn check_properties(
    resource: &str,
    prefix: &str,
    properties: &BTreeMap<String, SchemaProperty>,
) -> Result<()> {
    for (name, property) in properties {
        check_property(resource, &join(prefix, name), property)?;
    }
    Ok(())
}

fn check_property(resource: &str, path: &str, property: &SchemaProperty) -> Result<()> {
    if let Some(name) = property.duplicates.first() {
        return Err(Error::schema_definition(
            resource,
            format!("field '{}' is declared more than once", join(path, name)),
        ));
    }

    match property.json_type.primary_type() {
        Some(JsonType::Array) => match &property.items {
            Some(items) => check_property(resource, &format!("{path}[]"), items),
            None => Err(Error::schema_definition(
                resource,
                format!("array '{path}' has no item type"),
            )),
        },
        Some(JsonType::Object) => match &property.properties {
            Some(properties) => check_properties(resource, path, properties),
            None => Ok(()),
        },
        _ => Ok(()),
    }
}

/// Check one record against its resource schema
pub fn validate_record(stream: &str, schema: &JsonSchema, record: &Record) -> Result<()> {
    for (name, value) in record {
        match schema.properties.get(name) {
            Some(property) => validate_value(stream, name, property, value)?,
            None if schema.additional_properties => {}
            None => {
                return Err(Error::schema_validation(
                    stream,
                    name.as_str(),
                    "field is not declared in the schema",
                ))
            }
        }
    }
    Ok(())
}

fn validate_value(stream: &str, path: &str, property: &SchemaProperty, value: &Value) -> Result<()> {
    if value.is_null() {
        return if property.is_nullable() {
            Ok(())
        } else {
            Err(Error::schema_validation(stream, path, "null is not allowed"))
        };
    }

    let Some(expected) = property.json_type.primary_type() else {
        return Err(Error::schema_validation(stream, path, "expected null"));
    };

    let matches = match expected {
        JsonType::String => value.is_string(),
        JsonType::Number => value.is_number(),
        JsonType::Boolean => value.is_boolean(),
        JsonType::Object => value.is_object(),
        JsonType::Array => value.is_array(),
        JsonType::Null => false,
    };
    if !matches {
        return Err(Error::schema_validation(
            stream,
            path,
            format!("expected {expected}, got {}", describe(value)),
        ));
    }

    match value {
        Value::String(text) if property.is_date_time() && parse_datetime(text).is_none() => Err(
            Error::schema_validation(stream, path, format!("'{text}' is not a date-time")),
        ),
        Value::Object(fields) => match &property.properties {
            Some(properties) => {
                for (name, nested) in fields {
                    let nested_path = join(path, name);
                    match properties.get(name) {
                        Some(nested_property) => {
                            validate_value(stream, &nested_path, nested_property, nested)?;
                        }
                        None => {
                            return Err(Error::schema_validation(
                                stream,
                                nested_path,
                                "field is not declared in the schema",
                            ))
                        }
                    }
                }
                Ok(())
            }
            None => Ok(()),
        },
        Value::Array(items) => match &property.items {
            Some(item_property) => {
                for (i, item) in items.iter().enumerate() {
                    validate_value(stream, &format!("{path}[{i}]"), item_property, item)?;
                }
                Ok(())
            }
            None => Ok(()),
        },
        _ => Ok(()),
    }
}

fn join(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{prefix}.{name}")
    }
}

fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
