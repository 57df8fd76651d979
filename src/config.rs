//! Training configuration and environment plumbing.
//!
//! One binary, two roles: the `PBC_WORKER=1` env flag (or `--worker`
//! argument) selects the worker role. Both roles read the desired
//! estimator count from `N_ESTIMATORS`; the controller defaults to 15,
//! the worker to 50.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{TrainError, TrainResult};

/// Env flag that switches the binary into worker mode.
pub const WORKER_ENV: &str = "PBC_WORKER";
/// Desired full-run estimator count.
pub const ESTIMATORS_ENV: &str = "N_ESTIMATORS";
/// Overrides for the dataset and artifact locations (mainly for tests).
pub const DATA_PATH_ENV: &str = "PBC_DATA_PATH";
pub const MODEL_PATH_ENV: &str = "PBC_MODEL_PATH";

pub const DEFAULT_DATA_PATH: &str = "data/pbc.csv";
pub const DEFAULT_MODEL_PATH: &str = "model.json";

pub const DEFAULT_CONTROLLER_ESTIMATORS: usize = 15;
pub const DEFAULT_WORKER_ESTIMATORS: usize = 50;

/// Parameters for one forest training run. Immutable once built; the
/// worker receives the pieces it needs through its environment at
/// spawn time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingConfig {
    /// Number of trees in the forest.
    pub estimator_count: usize,
    /// Fraction of feature columns each tree may split on, in (0, 1].
    pub max_feature_fraction: f64,
    /// Bootstrap rows with replacement (vs. training every tree on all rows).
    pub bootstrap_replacement: bool,
    /// Seed for bootstrap and feature sampling. Fixed for reproducibility.
    pub random_seed: u64,
    /// Skip out-of-bag error estimation. Nothing downstream consumes it.
    pub skip_out_of_bag: bool,
}

impl TrainingConfig {
    /// The pipeline's fixed training policy, varying only the
    /// estimator count.
    pub fn with_estimators(estimator_count: usize) -> Self {
        Self {
            estimator_count,
            max_feature_fraction: 0.9,
            bootstrap_replacement: true,
            random_seed: 42,
            skip_out_of_bag: true,
        }
    }

    pub fn validate(&self) -> TrainResult<()> {
        if self.estimator_count == 0 {
            return Err(TrainError::InvalidConfig(
                "estimator_count must be >= 1".to_string(),
            ));
        }
        if !(self.max_feature_fraction > 0.0 && self.max_feature_fraction <= 1.0) {
            return Err(TrainError::InvalidConfig(format!(
                "max_feature_fraction must be in (0, 1], got {}",
                self.max_feature_fraction
            )));
        }
        Ok(())
    }
}

/// True when this process should run as the training worker.
pub fn worker_mode(args: &[String]) -> bool {
    if args.iter().any(|a| a == "--worker") {
        return true;
    }
    std::env::var(WORKER_ENV).map(|v| v == "1").unwrap_or(false)
}

/// Estimator target from `N_ESTIMATORS`, falling back to `default`.
pub fn estimator_target(default: usize) -> usize {
    parse_estimator_target(std::env::var(ESTIMATORS_ENV).ok().as_deref(), default)
}

fn parse_estimator_target(raw: Option<&str>, default: usize) -> usize {
    raw.and_then(|v| v.trim().parse::<usize>().ok())
        .filter(|&n| n > 0)
        .unwrap_or(default)
}

pub fn data_path() -> PathBuf {
    std::env::var(DATA_PATH_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_DATA_PATH))
}

pub fn model_path() -> PathBuf {
    std::env::var(MODEL_PATH_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_MODEL_PATH))
}
