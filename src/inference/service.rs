//! Prediction service over the active model.

use rayon::prelude::*;
use tracing::debug;

use crate::common::error::{HearthError, HearthResult};
use crate::data::domain::FeatureRecord;

use super::domain::ActiveModel;

/// Serves price predictions from whatever model is active at call time.
#[derive(Clone, Debug)]
pub struct PredictionService {
    active: ActiveModel,
}

impl PredictionService {
    pub fn new(active: ActiveModel) -> Self {
        Self { active }
    }

    /// Predict one listing. A retrain finishing mid-call does not affect it.
    pub fn predict(&self, record: &FeatureRecord) -> HearthResult<f64> {
        let model = self.active.snapshot().ok_or(HearthError::ModelUnavailable)?;
        let price = model.predict(record)?;
        debug!(location = ?record.location, price, "prediction served");
        Ok(price)
    }

    /// Predict many listings against a single snapshot.
    pub fn predict_batch(&self, records: &[FeatureRecord]) -> HearthResult<Vec<f64>> {
        let model = self.active.snapshot().ok_or(HearthError::ModelUnavailable)?;
        records
            .par_chunks(256)
            .map(|chunk| model.predict_many(chunk))
            .collect::<HearthResult<Vec<Vec<f64>>>>()
            .map(|parts| parts.into_iter().flatten().collect())
    }
}
