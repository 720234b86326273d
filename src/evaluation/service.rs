//! Evaluation of a fitted pipeline against held-out rows.

use crate::common::error::HearthResult;
use crate::data::domain::{FeatureRecord, TrainingRow};
use crate::training::domain::FittedPipeline;

use super::domain::EvalReport;

/// Score `pipeline` on `holdout`. Returns `None` for an empty hold-out set.
pub fn evaluate(
    pipeline: &FittedPipeline,
    holdout: &[TrainingRow],
) -> HearthResult<Option<EvalReport>> {
    if holdout.is_empty() {
        return Ok(None);
    }

    let records: Vec<FeatureRecord> = holdout.iter().map(|r| r.features.clone()).collect();
    let predicted = pipeline.predict_many(&records)?;
    let actual: Vec<f64> = holdout.iter().map(|r| r.price).collect();

    Ok(Some(score(&actual, &predicted)))
}

fn score(actual: &[f64], predicted: &[f64]) -> EvalReport {
    let n = actual.len() as f64;
    let mean = actual.iter().sum::<f64>() / n;

    let mut sq_err = 0.0;
    let mut abs_err = 0.0;
    let mut total_var = 0.0;
    for (a, p) in actual.iter().zip(predicted) {
        sq_err += (a - p) * (a - p);
        abs_err += (a - p).abs();
        total_var += (a - mean) * (a - mean);
    }

    EvalReport {
        rows: actual.len(),
        rmse: (sq_err / n).sqrt(),
        mae: abs_err / n,
        r2: (total_var > 0.0).then(|| 1.0 - sq_err / total_var),
    }
}
