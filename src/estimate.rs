//! Wall-clock estimation via a calibration (bench) pass.
//!
//! Forest training cost is roughly linear in the estimator count for a
//! fixed dataset, so training a small forest on the full dataset and
//! scaling by the count ratio gives a usable forecast without running
//! the real job twice. The estimate only drives the progress display;
//! it never gates the real run.

use std::time::Instant;

use crate::config::TrainingConfig;
use crate::dataset::Dataset;
use crate::error::{TrainError, TrainResult};
use crate::forest::RandomForest;

/// Bench estimator count: a fifth of the target, at least one tree.
pub fn bench_count(target: usize) -> usize {
    (target / 5).max(1)
}

/// Measured result of one calibration pass. Transient; never persisted.
#[derive(Debug, Clone, Copy)]
pub struct Calibration {
    pub sample_estimator_count: usize,
    pub elapsed_ms: f64,
}

impl Calibration {
    /// Extrapolated total for a `target`-estimator run, floored at 1ms.
    pub fn estimated_total_ms(&self, target: usize) -> f64 {
        (self.elapsed_ms * target as f64 / self.sample_estimator_count as f64).max(1.0)
    }
}

/// Run the bench training pass: full calibration dataset, reduced
/// estimator count, same feature/seed/replacement policy as the real
/// run. A failure here is fatal and aborts before the worker spawns.
pub fn calibrate(
    dataset: &Dataset,
    target: usize,
    base: &TrainingConfig,
) -> TrainResult<Calibration> {
    let bench_config = TrainingConfig {
        estimator_count: bench_count(target),
        ..base.clone()
    };

    let start = Instant::now();
    RandomForest::train(&dataset.features, &dataset.labels, &bench_config)
        .map_err(|e| TrainError::Calibration(e.to_string()))?;
    let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;

    Ok(Calibration {
        sample_estimator_count: bench_config.estimator_count,
        elapsed_ms,
    })
}
