//! Data domain: reading uploads, schema validation and typed listings.

pub mod domain;
pub mod service;

pub use domain::{Dataset, FeatureRecord, RawTable, TrainingRow, FEATURE_COLUMNS, REQUIRED_COLUMNS};
