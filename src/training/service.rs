//! Service layer turning an uploaded table into a fitted pipeline.

use std::time::Instant;

use ndarray::Array1;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tracing::{debug, info};

use crate::common::error::{HearthError, HearthResult};
use crate::common::time;
use crate::data::domain::{FeatureRecord, RawTable, TrainingRow};
use crate::data::service as data_service;
use crate::preprocessing::{Frame, Preprocessor};

use super::domain::{FittedPipeline, TrainConfig, TrainingRun};
use super::forest::RandomForestRegressor;

/// Seeded shuffle split of `n` row indices into `(train, test)`.
///
/// The test part takes `ceil(n * test_size)` rows from the front of the
/// permutation; the rest is training data.
pub fn train_test_split(n: usize, test_size: f64, seed: u64) -> (Vec<usize>, Vec<usize>) {
    let mut indices: Vec<usize> = (0..n).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let n_test = ((n as f64) * test_size).ceil() as usize;
    let n_test = n_test.min(n);
    let train = indices.split_off(n_test);
    (train, indices)
}

/// Validate, parse and fit an uploaded table.
pub fn fit(table: &RawTable, cfg: &TrainConfig) -> HearthResult<TrainingRun> {
    data_service::validate_schema(&table.headers)?;
    if table.is_empty() {
        return Err(HearthError::EmptyDataset { rows: 0 });
    }
    let rows = data_service::parse_rows(table)?;
    fit_rows(&rows, cfg)
}

/// Fit the housing pipeline on typed rows.
pub fn fit_rows(rows: &[TrainingRow], cfg: &TrainConfig) -> HearthResult<TrainingRun> {
    if rows.is_empty() {
        return Err(HearthError::EmptyDataset { rows: 0 });
    }

    let (train_idx, test_idx) = train_test_split(rows.len(), cfg.test_size, cfg.seed);
    if train_idx.is_empty() {
        return Err(HearthError::EmptyDataset { rows: rows.len() });
    }
    debug!(train = train_idx.len(), holdout = test_idx.len(), "dataset split");

    let train_records: Vec<FeatureRecord> =
        train_idx.iter().map(|&i| rows[i].features.clone()).collect();
    let targets = Array1::from_iter(train_idx.iter().map(|&i| rows[i].price));

    let started = Instant::now();
    let frame = Frame::from_records(&train_records);
    let preprocessor = Preprocessor::housing().fit(&frame)?;
    let x = preprocessor.transform(&frame)?;
    let forest = RandomForestRegressor::fit(&x, &targets, &cfg.forest_params())?;

    info!(
        rows = train_idx.len(),
        features = preprocessor.n_features_out(),
        trees = forest.trees().len(),
        fit_ms = time::elapsed_ms(started) as u64,
        "pipeline fitted"
    );

    Ok(TrainingRun {
        pipeline: FittedPipeline {
            preprocessor,
            forest,
            trained_at: time::now_utc(),
            train_rows: train_idx.len(),
        },
        holdout: test_idx.iter().map(|&i| rows[i].clone()).collect(),
    })
}
