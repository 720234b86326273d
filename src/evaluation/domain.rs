//! Hold-out metrics for a fitted pipeline.

use serde::{Deserialize, Serialize};

/// Regression quality measured on rows the model did not see.
///
/// Informational only; no retrain is accepted or rejected on these numbers.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EvalReport {
    pub rows: usize,
    pub rmse: f64,
    pub mae: f64,
    /// `None` when the hold-out targets have no variance.
    pub r2: Option<f64>,
}
