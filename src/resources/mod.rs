//! Resource definitions
//!
//! Every endpoint the tap extracts is a `ResourceDefinition`: its backend
//! service, path, keys, schema, and the pagination, parameter and
//! normalization policies that drive it. The definitions are static tables,
//! one file per backend, validated once when the registry is built.

mod definition;
mod facebook;
mod instagram;
mod pinterest;
mod registry;
mod twitter;

pub use definition::{ResourceDefinition, Service, DEFAULT_API_URL};
pub use registry::ResourceRegistry;
