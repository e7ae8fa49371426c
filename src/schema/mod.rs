//! Schema module
//!
//! Declared JSON schemas for every resource, plus the checks run against
//! them.
//!
//! # Features
//!
//! - **Declaration helpers**: `string()`, `number()`, `date_time()`, nested
//!   `object()` and `array()` properties, all nullable
//! - **Definition checks**: duplicate fields, arrays without items, keys that
//!   are not declared; all reported at startup
//! - **Record validation**: every emitted record is checked against its
//!   schema, recursively, with the offending field path in the error

mod types;
mod validate;

pub use types::{
    array, boolean, date_time, number, object, string, JsonSchema, JsonType, JsonTypeOrArray,
    SchemaProperty,
};
pub use validate::{check_definition, validate_record};
