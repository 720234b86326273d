//! Bootstrapped regression forest (CART trees, squared-error splits, averaged).

use ndarray::{Array1, Array2, ArrayView1};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::common::error::{HearthError, HearthResult};

/// Hyperparameters for the forest.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ForestParams {
    pub n_trees: usize,
    pub seed: u64,
    /// `None` grows every tree until its leaves are pure.
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self {
            n_trees: 300,
            seed: 42,
            max_depth: None,
            min_samples_split: 2,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
enum Node {
    Leaf {
        value: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
}

struct SplitChoice {
    feature: usize,
    threshold: f64,
}

/// Single regression tree stored as a node arena; node 0 is the root.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RegressionTree {
    nodes: Vec<Node>,
}

impl RegressionTree {
    /// Grow a tree on the given sample indices (duplicates allowed).
    fn grow(
        x: &Array2<f64>,
        y: &Array1<f64>,
        samples: Vec<usize>,
        params: &ForestParams,
    ) -> Self {
        let mut nodes = vec![Node::Leaf { value: 0.0 }];
        let mut pending = vec![(0usize, samples, 0usize)];

        while let Some((id, idx, depth)) = pending.pop() {
            let depth_ok = params.max_depth.map_or(true, |max| depth < max);
            let split = if depth_ok && idx.len() >= params.min_samples_split.max(2) {
                best_split(x, y, &idx)
            } else {
                None
            };

            let Some(split) = split else {
                nodes[id] = Node::Leaf {
                    value: mean(y, &idx),
                };
                continue;
            };

            let (left_idx, right_idx): (Vec<usize>, Vec<usize>) = idx
                .iter()
                .partition(|&&i| x[[i, split.feature]] <= split.threshold);

            let left = nodes.len();
            nodes.push(Node::Leaf { value: 0.0 });
            let right = nodes.len();
            nodes.push(Node::Leaf { value: 0.0 });
            nodes[id] = Node::Split {
                feature: split.feature,
                threshold: split.threshold,
                left,
                right,
            };
            pending.push((right, right_idx, depth + 1));
            pending.push((left, left_idx, depth + 1));
        }

        Self { nodes }
    }

    pub fn predict_row(&self, row: ArrayView1<f64>) -> f64 {
        let mut id = 0;
        loop {
            match &self.nodes[id] {
                Node::Leaf { value } => return *value,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    id = if row[*feature] <= *threshold {
                        *left
                    } else {
                        *right
                    };
                }
            }
        }
    }

    pub fn n_nodes(&self) -> usize {
        self.nodes.len()
    }
}

fn mean(y: &Array1<f64>, idx: &[usize]) -> f64 {
    if idx.is_empty() {
        return 0.0;
    }
    idx.iter().map(|&i| y[i]).sum::<f64>() / idx.len() as f64
}

/// Exhaustive search for the split with the largest squared-error reduction.
///
/// Maximises `S_l^2/n_l + S_r^2/n_r`, which is equivalent to minimising the
/// summed within-child squared error.
fn best_split(x: &Array2<f64>, y: &Array1<f64>, idx: &[usize]) -> Option<SplitChoice> {
    let first = y[idx[0]];
    if idx.iter().all(|&i| y[i] == first) {
        return None;
    }

    let n = idx.len();
    let total: f64 = idx.iter().map(|&i| y[i]).sum();
    let mut best_score = total * total / n as f64;
    let mut best: Option<SplitChoice> = None;
    let mut order = idx.to_vec();

    for feature in 0..x.ncols() {
        order.sort_by(|&a, &b| x[[a, feature]].total_cmp(&x[[b, feature]]));

        let mut left_sum = 0.0;
        for k in 0..n - 1 {
            left_sum += y[order[k]];
            let here = x[[order[k], feature]];
            let next = x[[order[k + 1], feature]];
            if here == next {
                continue;
            }

            let n_left = (k + 1) as f64;
            let n_right = (n - k - 1) as f64;
            let right_sum = total - left_sum;
            let score = left_sum * left_sum / n_left + right_sum * right_sum / n_right;
            if score > best_score {
                best_score = score;
                let mut threshold = here + (next - here) / 2.0;
                if threshold >= next {
                    threshold = here;
                }
                best = Some(SplitChoice { feature, threshold });
            }
        }
    }

    best
}

/// Ensemble of bootstrapped regression trees whose outputs are averaged.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RandomForestRegressor {
    params: ForestParams,
    n_features: usize,
    trees: Vec<RegressionTree>,
}

impl RandomForestRegressor {
    /// Fit on a feature matrix and targets. Same inputs and seed give the same forest.
    pub fn fit(x: &Array2<f64>, y: &Array1<f64>, params: &ForestParams) -> HearthResult<Self> {
        let n = x.nrows();
        if n == 0 {
            return Err(HearthError::EmptyDataset { rows: 0 });
        }
        if y.len() != n {
            return Err(HearthError::internal(format!(
                "feature rows ({n}) and targets ({}) differ",
                y.len()
            )));
        }
        if params.n_trees == 0 {
            return Err(HearthError::internal("forest needs at least one tree"));
        }

        let mut rng = StdRng::seed_from_u64(params.seed);
        let tree_seeds: Vec<u64> = (0..params.n_trees).map(|_| rng.random()).collect();

        let trees = tree_seeds
            .par_iter()
            .map(|&seed| {
                let mut rng = StdRng::seed_from_u64(seed);
                let samples = (0..n).map(|_| rng.random_range(0..n)).collect();
                RegressionTree::grow(x, y, samples, params)
            })
            .collect();

        Ok(Self {
            params: params.clone(),
            n_features: x.ncols(),
            trees,
        })
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn trees(&self) -> &[RegressionTree] {
        &self.trees
    }

    pub fn params(&self) -> &ForestParams {
        &self.params
    }

    pub fn predict_row(&self, row: ArrayView1<f64>) -> HearthResult<f64> {
        if row.len() != self.n_features {
            return Err(HearthError::encoding(
                "features",
                format!("expected {} features, got {}", self.n_features, row.len()),
            ));
        }
        let total: f64 = self.trees.iter().map(|t| t.predict_row(row)).sum();
        Ok(total / self.trees.len() as f64)
    }

    pub fn predict(&self, x: &Array2<f64>) -> HearthResult<Array1<f64>> {
        x.rows()
            .into_iter()
            .map(|row| self.predict_row(row))
            .collect::<HearthResult<Vec<f64>>>()
            .map(Array1::from_vec)
    }
}
