//! Error taxonomy for the training pipeline.
//!
//! Invalid dataset rows are not errors: the loader drops them locally
//! and never surfaces them. Everything here is fatal to the process
//! that hits it; nothing is retried.

use thiserror::Error;

pub type TrainResult<T> = std::result::Result<T, TrainError>;

#[derive(Debug, Error)]
pub enum TrainError {
    /// The dataset file cannot be opened or read at all.
    #[error("dataset source unavailable: {0}")]
    SourceUnavailable(String),

    /// Zero valid rows survived filtering. Training on nothing is nonsensical.
    #[error("dataset contains no valid rows")]
    EmptyDataset,

    /// The config would not produce a usable forest.
    #[error("invalid training config: {0}")]
    InvalidConfig(String),

    /// The calibration (bench) pass failed. Aborts before the worker spawns.
    #[error("calibration training failed: {0}")]
    Calibration(String),

    /// Full training failed inside the worker.
    #[error("training failed: {0}")]
    Training(String),

    /// The worker process could not be started.
    #[error("failed to spawn worker: {0}")]
    Spawn(String),

    /// The trained model could not be written to disk.
    #[error("failed to persist model artifact: {0}")]
    Persist(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
