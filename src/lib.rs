//! Offline trainer for the PBC stage classifier.
//!
//! One binary, two roles: a controller that calibrates, spawns, and
//! supervises, and an isolated worker process that does the actual
//! training and persists the model artifact. The roles communicate
//! through a one-shot JSON message over the worker's stdout plus the
//! process exit code.

pub mod config;
pub mod controller;
pub mod dataset;
pub mod error;
pub mod estimate;
pub mod forest;
pub mod progress;
pub mod worker;

pub use config::TrainingConfig;
pub use dataset::Dataset;
pub use error::{TrainError, TrainResult};
pub use forest::RandomForest;
