//! Retraining and serving core for the house price model.
//!
//! Uploads flow through `data` (schema checks, typed rows), `preprocessing`
//! (column encoders), `training` (forest and artifact store) and `lifecycle`
//! (state machine, audit trail, hot swap). `inference` reads the active model.
pub mod common;
pub mod data;
pub mod preprocessing;
pub mod training;
pub mod evaluation;
pub mod inference;
pub mod lifecycle;
pub mod api;

pub use api::Engine;
pub use common::{AppCfg, ErrorCode, HearthError, HearthResult};
pub use data::FeatureRecord;
pub use lifecycle::{AuditRecord, AuditStatus, RetrainOutcome, RetrainState};
