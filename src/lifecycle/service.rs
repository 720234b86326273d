//! Retrain orchestration: validate, fit, persist, swap, audit.
//!
//! Every failure is caught here and turned into a `RetrainOutcome::Failed`
//! plus a `Failed` audit record. The artifact is always written before the
//! active model is swapped, and a failed retrain touches neither.

use std::io::Read;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use tracing::{debug, error, info, info_span, warn};

use crate::common::error::{HearthError, HearthResult};
use crate::common::time;
use crate::data::domain::Dataset;
use crate::data::service as data_service;
use crate::evaluation::service as evaluation_service;
use crate::inference::domain::ActiveModel;
use crate::training::domain::{ArtifactStore, FittedPipeline, TrainConfig};
use crate::training::service as training_service;

use super::domain::{
    AuditRecord, AuditSink, AuditStatus, RetrainOutcome, RetrainReport, RetrainState,
};

/// Tracks the current stage of one retrain.
struct Progress {
    state: RetrainState,
}

impl Progress {
    fn new() -> Self {
        Self {
            state: RetrainState::Idle,
        }
    }

    fn advance(&mut self, next: RetrainState) {
        debug_assert!(
            self.state.can_advance_to(next),
            "illegal retrain transition {} -> {}",
            self.state,
            next
        );
        debug!(from = %self.state, to = %next, "retrain stage");
        self.state = next;
    }
}

/// Owns the active model, its persisted artifact and the retrain history.
pub struct ModelLifecycle {
    active: ActiveModel,
    store: Arc<dyn ArtifactStore>,
    audit: Arc<dyn AuditSink>,
    cfg: TrainConfig,
    retrain_lock: Mutex<()>,
}

impl ModelLifecycle {
    pub fn new(
        active: ActiveModel,
        store: Arc<dyn ArtifactStore>,
        audit: Arc<dyn AuditSink>,
        cfg: TrainConfig,
    ) -> Self {
        Self {
            active,
            store,
            audit,
            cfg,
            retrain_lock: Mutex::new(()),
        }
    }

    pub fn active(&self) -> &ActiveModel {
        &self.active
    }

    /// Load the persisted artifact into the active cell, if one exists.
    pub fn load_persisted(&self) -> HearthResult<bool> {
        let Some(bytes) = self.store.load()? else {
            info!("no persisted model artifact; predictions unavailable until a retrain");
            return Ok(false);
        };
        let pipeline = FittedPipeline::from_bytes(&bytes)?;
        info!(
            trained_at = %pipeline.trained_at,
            train_rows = pipeline.train_rows,
            "persisted model loaded"
        );
        self.active.swap(Arc::new(pipeline));
        Ok(true)
    }

    /// Read a delimited upload and retrain on it.
    pub fn retrain_upload<R: Read>(
        &self,
        actor: &str,
        dataset_name: &str,
        reader: R,
    ) -> RetrainOutcome {
        match data_service::read_csv(reader) {
            Ok(table) => self.retrain(actor, &Dataset::new(dataset_name, table)),
            Err(err) => self.reject(actor, dataset_name, err),
        }
    }

    /// Record a retrain that failed before its dataset could be read.
    pub fn reject(&self, actor: &str, dataset_name: &str, err: HearthError) -> RetrainOutcome {
        let mut progress = Progress::new();
        progress.advance(RetrainState::Validating);
        self.fail(actor, dataset_name, progress, err)
    }

    /// Run a full retrain. At most one runs at a time; predictions keep using
    /// the previous model until the swap.
    pub fn retrain(&self, actor: &str, dataset: &Dataset) -> RetrainOutcome {
        let span = info_span!("retrain", actor, dataset = %dataset.name);
        let _enter = span.enter();
        let _guard = self.retrain_lock.lock();

        let mut progress = Progress::new();
        match self.run_stages(&mut progress, dataset) {
            Ok(report) => {
                info!(
                    train_rows = report.train_rows,
                    holdout_rows = report.holdout_rows,
                    rmse = report.evaluation.as_ref().map(|e| e.rmse),
                    "model retrained and swapped in"
                );
                self.record(actor, &dataset.name, AuditStatus::Success);
                RetrainOutcome::Success(report)
            }
            Err(err) => self.fail(actor, &dataset.name, progress, err),
        }
    }

    fn run_stages(
        &self,
        progress: &mut Progress,
        dataset: &Dataset,
    ) -> HearthResult<RetrainReport> {
        progress.advance(RetrainState::Validating);
        data_service::validate_schema(&dataset.table.headers)?;

        progress.advance(RetrainState::Training);
        let run = training_service::fit(&dataset.table, &self.cfg)?;
        let evaluation = match evaluation_service::evaluate(&run.pipeline, &run.holdout) {
            Ok(report) => report,
            Err(err) => {
                warn!(error = %err, "hold-out evaluation failed");
                None
            }
        };

        progress.advance(RetrainState::Persisting);
        let bytes = run.pipeline.to_bytes()?;
        self.store.save(&bytes)?;

        progress.advance(RetrainState::Swapped);
        let report = RetrainReport {
            dataset_name: dataset.name.clone(),
            train_rows: run.pipeline.train_rows,
            holdout_rows: run.holdout.len(),
            evaluation,
            trained_at: run.pipeline.trained_at,
        };
        self.active.swap(Arc::new(run.pipeline));
        Ok(report)
    }

    fn fail(
        &self,
        actor: &str,
        dataset_name: &str,
        mut progress: Progress,
        err: HearthError,
    ) -> RetrainOutcome {
        let stage = progress.state;
        progress.advance(RetrainState::Failed);
        error!(stage = %stage, code = err.code() as u32, error = %err, "retrain failed");
        self.record(actor, dataset_name, AuditStatus::Failed);
        RetrainOutcome::Failed { stage, error: err }
    }

    /// Audit failures are logged and otherwise ignored.
    fn record(&self, actor: &str, dataset_name: &str, status: AuditStatus) {
        let record = AuditRecord {
            actor: actor.to_string(),
            dataset_name: dataset_name.to_string(),
            timestamp: time::now_utc(),
            status,
        };
        if let Err(err) = self.audit.append(&record) {
            warn!(error = %err, ?status, "could not write retrain history");
        }
    }

    /// Retrain history, newest first.
    pub fn history(&self) -> HearthResult<Vec<AuditRecord>> {
        self.audit.history()
    }

    /// When the persisted artifact was last written.
    pub fn last_retrained(&self) -> HearthResult<Option<DateTime<Utc>>> {
        self.store.modified_at()
    }
}
