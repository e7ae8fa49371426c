//! Response normalization module
//!
//! Supports: record lists, timeseries unwrap, label/value zip, nested
//! category maps (dated by the request), date-keyed metric maps.
//!
//! # Overview
//!
//! Every endpoint of the analytics API answers in its own shape. A normalizer
//! turns one page of raw JSON into flat records. A whole page is normalized
//! before any of its records is used, so a malformed page never produces a
//! partial batch.

mod normalizers;
mod types;

pub use normalizers::{
    DateKeyedNormalizer, LabelValueNormalizer, NestedCategoryNormalizer, RecordsNormalizer,
    TimeseriesNormalizer,
};
pub use types::{NormalizerConfig, ResponseNormalizer};

#[cfg(test)]
mod tests;
