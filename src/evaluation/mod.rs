//! Evaluation of fitted pipelines on held-out data.

pub mod domain;
pub mod service;

pub use domain::EvalReport;
