//! Inference domain: the active-model cell and the prediction service.

pub mod domain;
pub mod service;

pub use domain::ActiveModel;
pub use service::PredictionService;
