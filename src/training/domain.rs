//! Domain types for fitted pipelines, training configuration and artifact storage.

use chrono::{DateTime, Utc};
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::common::config::AppCfg;
use crate::common::error::{HearthError, HearthResult};
use crate::data::domain::{FeatureRecord, TrainingRow};
use crate::preprocessing::{FittedPreprocessor, Frame};

use super::forest::{ForestParams, RandomForestRegressor};

const ARTIFACT_MAGIC: &[u8; 6] = b"HEARTH";
const ARTIFACT_VERSION: u16 = 1;

/// Parameters of one training run.
#[derive(Clone, Debug, PartialEq)]
pub struct TrainConfig {
    pub n_trees: usize,
    pub seed: u64,
    /// Fraction of rows held out, in `[0, 1)`.
    pub test_size: f64,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            n_trees: 300,
            seed: 42,
            test_size: 0.2,
        }
    }
}

impl TrainConfig {
    pub fn from_cfg(cfg: &AppCfg) -> Self {
        Self {
            n_trees: cfg.n_trees,
            seed: cfg.seed,
            test_size: cfg.test_size,
        }
    }

    /// The same seed drives both the split and the forest.
    pub fn forest_params(&self) -> ForestParams {
        ForestParams {
            n_trees: self.n_trees,
            seed: self.seed,
            ..ForestParams::default()
        }
    }
}

/// Everything learned by one training run. Never modified after fit.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FittedPipeline {
    pub preprocessor: FittedPreprocessor,
    pub forest: RandomForestRegressor,
    pub trained_at: DateTime<Utc>,
    pub train_rows: usize,
}

impl FittedPipeline {
    /// Predict the price of a single listing.
    pub fn predict(&self, record: &FeatureRecord) -> HearthResult<f64> {
        let x = self.encode(std::slice::from_ref(record))?;
        self.forest.predict_row(x.row(0))
    }

    /// Predict prices for several listings in one encoding pass.
    pub fn predict_many(&self, records: &[FeatureRecord]) -> HearthResult<Vec<f64>> {
        let x = self.encode(records)?;
        Ok(self.forest.predict(&x)?.to_vec())
    }

    fn encode(&self, records: &[FeatureRecord]) -> HearthResult<Array2<f64>> {
        self.preprocessor.transform(&Frame::from_records(records))
    }

    /// Serialize into the on-disk artifact format: magic, version, bincode payload.
    pub fn to_bytes(&self) -> HearthResult<Vec<u8>> {
        let payload = bincode::serialize(self).map_err(HearthError::persistence)?;
        let mut out = Vec::with_capacity(ARTIFACT_MAGIC.len() + 2 + payload.len());
        out.extend_from_slice(ARTIFACT_MAGIC);
        out.extend_from_slice(&ARTIFACT_VERSION.to_le_bytes());
        out.extend_from_slice(&payload);
        Ok(out)
    }

    pub fn from_bytes(bytes: &[u8]) -> HearthResult<Self> {
        let header = ARTIFACT_MAGIC.len() + 2;
        if bytes.len() < header || &bytes[..ARTIFACT_MAGIC.len()] != ARTIFACT_MAGIC {
            return Err(HearthError::Persistence("not a model artifact".into()));
        }
        let version = u16::from_le_bytes([bytes[header - 2], bytes[header - 1]]);
        if version != ARTIFACT_VERSION {
            return Err(HearthError::Persistence(format!(
                "unsupported artifact version {version}"
            )));
        }
        bincode::deserialize(&bytes[header..]).map_err(HearthError::persistence)
    }
}

/// Output of a fit: the pipeline plus the rows held out from it.
#[derive(Clone, Debug)]
pub struct TrainingRun {
    pub pipeline: FittedPipeline,
    pub holdout: Vec<TrainingRow>,
}

/// Single named, overwritable blob holding the active model artifact.
pub trait ArtifactStore: Send + Sync {
    fn save(&self, bytes: &[u8]) -> HearthResult<()>;
    /// `Ok(None)` when nothing has been saved yet.
    fn load(&self) -> HearthResult<Option<Vec<u8>>>;
    fn modified_at(&self) -> HearthResult<Option<DateTime<Utc>>>;
}
