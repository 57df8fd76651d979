//! Random-forest classifier.
//!
//! The trainable capability behind the pipeline: bootstrap-sampled
//! gini trees with per-tree feature subsetting and majority-vote
//! prediction. All randomness flows from one seeded `StdRng`, so a
//! fixed seed, config, and dataset reproduce the artifact bit for bit.

pub mod tree;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::config::TrainingConfig;
use crate::dataset::FEATURE_COLUMNS;
use crate::error::{TrainError, TrainResult};
use self::tree::{majority_label, DecisionTree};

/// Serialized forest state. The feature schema is carried by column
/// order so the prediction server can consume the artifact standalone.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForest {
    pub feature_columns: Vec<String>,
    pub estimator_count: usize,
    pub random_seed: u64,
    /// Distinct labels observed during training, ascending.
    pub classes: Vec<i64>,
    pub trees: Vec<DecisionTree>,
    /// Out-of-bag accuracy; `None` when skipped.
    pub oob_score: Option<f64>,
}

impl RandomForest {
    /// Train a forest. `x` is row-major with one column per entry of
    /// `FEATURE_COLUMNS`; `y` holds the matching labels.
    pub fn train(x: &[Vec<f64>], y: &[i64], config: &TrainingConfig) -> TrainResult<Self> {
        config.validate()?;
        if x.is_empty() {
            return Err(TrainError::Training("no training rows".to_string()));
        }
        if x.len() != y.len() {
            return Err(TrainError::Training(format!(
                "feature/label length mismatch: {} vs {}",
                x.len(),
                y.len()
            )));
        }

        let n_rows = x.len();
        let n_features = x[0].len();
        if n_features == 0 {
            return Err(TrainError::Training("rows have no feature columns".to_string()));
        }
        let subset_size = ((n_features as f64 * config.max_feature_fraction).round() as usize)
            .clamp(1, n_features);

        let mut rng = StdRng::seed_from_u64(config.random_seed);
        let mut trees = Vec::with_capacity(config.estimator_count);
        let mut in_bag: Vec<Vec<bool>> = Vec::new();

        for _ in 0..config.estimator_count {
            let rows: Vec<usize> = if config.bootstrap_replacement {
                (0..n_rows).map(|_| rng.gen_range(0..n_rows)).collect()
            } else {
                (0..n_rows).collect()
            };

            let mut features: Vec<usize> = (0..n_features).collect();
            features.shuffle(&mut rng);
            features.truncate(subset_size);
            features.sort_unstable();

            if !config.skip_out_of_bag {
                let mut bag = vec![false; n_rows];
                for &r in &rows {
                    bag[r] = true;
                }
                in_bag.push(bag);
            }

            trees.push(DecisionTree::fit(x, y, &rows, &features));
        }

        let mut classes: Vec<i64> = y.to_vec();
        classes.sort_unstable();
        classes.dedup();

        let oob_score = if config.skip_out_of_bag {
            None
        } else {
            out_of_bag_score(&trees, &in_bag, x, y)
        };

        Ok(Self {
            feature_columns: FEATURE_COLUMNS.iter().map(|s| s.to_string()).collect(),
            estimator_count: config.estimator_count,
            random_seed: config.random_seed,
            classes,
            trees,
            oob_score,
        })
    }

    /// Majority vote across trees; ties break to the smallest label.
    pub fn predict_row(&self, row: &[f64]) -> i64 {
        let mut votes: BTreeMap<i64, usize> = BTreeMap::new();
        for tree in &self.trees {
            *votes.entry(tree.predict_row(row)).or_insert(0) += 1;
        }
        majority_label(&votes)
    }

    pub fn predict(&self, x: &[Vec<f64>]) -> Vec<i64> {
        x.iter().map(|row| self.predict_row(row)).collect()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn from_json(raw: &str) -> serde_json::Result<Self> {
        serde_json::from_str(raw)
    }
}

/// Accuracy over rows voted on only by trees that never saw them.
/// `None` when no row was left out of every bag that covers it.
fn out_of_bag_score(
    trees: &[DecisionTree],
    in_bag: &[Vec<bool>],
    x: &[Vec<f64>],
    y: &[i64],
) -> Option<f64> {
    let mut voted = 0usize;
    let mut correct = 0usize;
    for (r, row) in x.iter().enumerate() {
        let mut votes: BTreeMap<i64, usize> = BTreeMap::new();
        for (tree, bag) in trees.iter().zip(in_bag) {
            if !bag[r] {
                *votes.entry(tree.predict_row(row)).or_insert(0) += 1;
            }
        }
        if votes.is_empty() {
            continue;
        }
        voted += 1;
        if majority_label(&votes) == y[r] {
            correct += 1;
        }
    }
    if voted == 0 {
        None
    } else {
        Some(correct as f64 / voted as f64)
    }
}
