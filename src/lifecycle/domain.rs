//! Retrain states, outcomes and the audit trail contract.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::common::error::{HearthError, HearthResult};
use crate::evaluation::EvalReport;

/// Stages of a retrain. `Swapped` and `Failed` are terminal.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum RetrainState {
    Idle,
    Validating,
    Training,
    Persisting,
    Swapped,
    Failed,
}

impl RetrainState {
    pub fn as_str(&self) -> &'static str {
        match self {
            RetrainState::Idle => "idle",
            RetrainState::Validating => "validating",
            RetrainState::Training => "training",
            RetrainState::Persisting => "persisting",
            RetrainState::Swapped => "swapped",
            RetrainState::Failed => "failed",
        }
    }

    /// Whether `next` is a legal successor of `self`.
    pub fn can_advance_to(&self, next: RetrainState) -> bool {
        use RetrainState::*;
        matches!(
            (self, next),
            (Idle, Validating)
                | (Validating, Training)
                | (Training, Persisting)
                | (Persisting, Swapped)
                | (Validating, Failed)
                | (Training, Failed)
                | (Persisting, Failed)
        )
    }
}

impl fmt::Display for RetrainState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum AuditStatus {
    Success,
    Failed,
}

/// One line of the retrain history. Written once, never edited.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AuditRecord {
    pub actor: String,
    pub dataset_name: String,
    pub timestamp: DateTime<Utc>,
    pub status: AuditStatus,
}

/// Append-only retrain history.
pub trait AuditSink: Send + Sync {
    fn append(&self, record: &AuditRecord) -> HearthResult<()>;
    /// All records, newest first.
    fn history(&self) -> HearthResult<Vec<AuditRecord>>;
}

/// Details of a retrain that reached `Swapped`.
#[derive(Clone, Debug, PartialEq)]
pub struct RetrainReport {
    pub dataset_name: String,
    pub train_rows: usize,
    pub holdout_rows: usize,
    pub evaluation: Option<EvalReport>,
    pub trained_at: DateTime<Utc>,
}

/// Result of a retrain as seen by the caller.
#[derive(Clone, Debug, PartialEq)]
pub enum RetrainOutcome {
    Success(RetrainReport),
    Failed {
        /// Stage that was running when the error occurred.
        stage: RetrainState,
        error: HearthError,
    },
}

impl RetrainOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, RetrainOutcome::Success(_))
    }

    pub fn error(&self) -> Option<&HearthError> {
        match self {
            RetrainOutcome::Success(_) => None,
            RetrainOutcome::Failed { error, .. } => Some(error),
        }
    }

    pub fn status(&self) -> AuditStatus {
        if self.is_success() {
            AuditStatus::Success
        } else {
            AuditStatus::Failed
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_path_is_linear() {
        use RetrainState::*;
        let path = [Idle, Validating, Training, Persisting, Swapped];
        for pair in path.windows(2) {
            assert!(pair[0].can_advance_to(pair[1]), "{} -> {}", pair[0], pair[1]);
        }
        assert!(!Idle.can_advance_to(Training));
        assert!(!Training.can_advance_to(Swapped));
    }

    #[test]
    fn terminal_states_go_nowhere() {
        use RetrainState::*;
        for next in [Idle, Validating, Training, Persisting, Swapped, Failed] {
            assert!(!Swapped.can_advance_to(next));
            assert!(!Failed.can_advance_to(next));
        }
        assert!(!Idle.can_advance_to(Failed));
    }

    #[test]
    fn audit_record_serializes_status_by_name() {
        let record = AuditRecord {
            actor: "admin".into(),
            dataset_name: "listings.csv".into(),
            timestamp: DateTime::parse_from_rfc3339("2026-03-01T10:00:00Z")
                .unwrap()
                .with_timezone(&Utc),
            status: AuditStatus::Failed,
        };
        let line = serde_json::to_string(&record).unwrap();
        assert!(line.contains("\"status\":\"Failed\""));
        assert_eq!(serde_json::from_str::<AuditRecord>(&line).unwrap(), record);
    }
}
