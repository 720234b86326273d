//! Model lifecycle: the retrain state machine and its audit trail.

pub mod domain;
pub mod repo_fs;
pub mod service;

pub use domain::{AuditRecord, AuditSink, AuditStatus, RetrainOutcome, RetrainReport, RetrainState};
pub use repo_fs::FsAuditLog;
pub use service::ModelLifecycle;
