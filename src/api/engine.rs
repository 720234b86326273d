//! Facade wiring configuration, storage, the lifecycle manager and predictions.

use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{error, info};

use crate::common::config::AppCfg;
use crate::common::error::HearthResult;
use crate::data::domain::{Dataset, FeatureRecord};
use crate::data::service as data_service;
use crate::inference::{ActiveModel, PredictionService};
use crate::lifecycle::{AuditRecord, FsAuditLog, ModelLifecycle, RetrainOutcome};
use crate::training::{FsArtifactStore, TrainConfig};

/// What the surrounding web layer holds: one per process.
pub struct Engine {
    cfg: AppCfg,
    lifecycle: ModelLifecycle,
    predictor: PredictionService,
}

impl Engine {
    /// Build filesystem-backed storage under `cfg.data_root` and load any
    /// persisted model. A corrupt artifact is logged and the engine starts
    /// without a model.
    pub fn open(cfg: AppCfg) -> Self {
        let active = ActiveModel::new();
        let lifecycle = ModelLifecycle::new(
            active.clone(),
            Arc::new(FsArtifactStore::new(&cfg)),
            Arc::new(FsAuditLog::new(&cfg)),
            TrainConfig::from_cfg(&cfg),
        );
        if let Err(err) = lifecycle.load_persisted() {
            error!(error = %err, "persisted model could not be loaded");
        }
        info!(data_root = %cfg.data_root, model_loaded = active.is_loaded(), "engine ready");

        Self {
            cfg,
            lifecycle,
            predictor: PredictionService::new(active),
        }
    }

    pub fn cfg(&self) -> &AppCfg {
        &self.cfg
    }

    pub fn is_model_loaded(&self) -> bool {
        self.lifecycle.active().is_loaded()
    }

    pub fn predict(&self, record: &FeatureRecord) -> HearthResult<f64> {
        self.predictor.predict(record)
    }

    pub fn predict_batch(&self, records: &[FeatureRecord]) -> HearthResult<Vec<f64>> {
        self.predictor.predict_batch(records)
    }

    pub fn retrain(&self, actor: &str, dataset: &Dataset) -> RetrainOutcome {
        self.lifecycle.retrain(actor, dataset)
    }

    pub fn retrain_upload<R: Read>(
        &self,
        actor: &str,
        dataset_name: &str,
        reader: R,
    ) -> RetrainOutcome {
        self.lifecycle.retrain_upload(actor, dataset_name, reader)
    }

    /// Retrain from a CSV file on disk; the audit trail names the file.
    pub fn retrain_path(&self, actor: &str, path: &Path) -> RetrainOutcome {
        match data_service::ingest_file(path) {
            Ok(dataset) => self.lifecycle.retrain(actor, &dataset),
            Err(err) => {
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| "Unknown".to_string());
                self.lifecycle.reject(actor, &name, err)
            }
        }
    }

    pub fn history(&self) -> HearthResult<Vec<AuditRecord>> {
        self.lifecycle.history()
    }

    pub fn last_retrained(&self) -> HearthResult<Option<DateTime<Utc>>> {
        self.lifecycle.last_retrained()
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use crate::common::error::HearthError;
    use crate::lifecycle::{AuditStatus, RetrainState};
    use crate::training::service::tests::{market_csv, probe};

    fn cfg_in(dir: &tempfile::TempDir) -> AppCfg {
        AppCfg {
            n_trees: 15,
            ..AppCfg::default().with_data_root(dir.path().to_string_lossy())
        }
    }

    #[test]
    fn fresh_engine_has_no_model() {
        let dir = tempfile::tempdir().unwrap();
        let engine = Engine::open(cfg_in(&dir));
        assert!(!engine.is_model_loaded());
        assert_eq!(engine.predict(&probe()), Err(HearthError::ModelUnavailable));
        assert_eq!(engine.last_retrained().unwrap(), None);
    }

    #[test]
    fn retrain_from_file_then_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let csv_path = dir.path().join("listings_2026.csv");
        fs::write(&csv_path, market_csv(1.0)).unwrap();

        let engine = Engine::open(cfg_in(&dir));
        assert!(engine.retrain_path("admin", &csv_path).is_success());
        let price = engine.predict(&probe()).unwrap();
        assert_eq!(engine.history().unwrap()[0].dataset_name, "listings_2026.csv");

        let reopened = Engine::open(cfg_in(&dir));
        assert!(reopened.is_model_loaded());
        assert_eq!(reopened.predict(&probe()).unwrap(), price);
    }

    #[test]
    fn missing_file_is_audited_as_failed() {
        let dir = tempfile::tempdir().unwrap();
        let engine = Engine::open(cfg_in(&dir));
        let outcome = engine.retrain_path("admin", &dir.path().join("nope.csv"));
        assert!(matches!(
            outcome,
            RetrainOutcome::Failed {
                stage: RetrainState::Validating,
                ..
            }
        ));
        let history = engine.history().unwrap();
        assert_eq!(history[0].status, AuditStatus::Failed);
        assert_eq!(history[0].dataset_name, "nope.csv");
    }

    #[test]
    fn corrupt_artifact_does_not_stop_startup() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = cfg_in(&dir);
        fs::create_dir_all(cfg.models_dir()).unwrap();
        fs::write(cfg.models_dir().join(&cfg.artifact_name), b"not a model").unwrap();

        let engine = Engine::open(cfg);
        assert!(!engine.is_model_loaded());
    }
}
