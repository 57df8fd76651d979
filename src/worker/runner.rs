//! Worker process entry point.
//!
//! Runs as a child process spawned by the controller. Loads the
//! dataset itself (shipping it over the channel would be prohibitively
//! large), trains at the full estimator count, persists the artifact,
//! and emits exactly one structured message on stdout before exiting.
//! All log output goes to stderr, which the parent inherits.

use std::io::Write;
use std::path::Path;
use std::time::Instant;

use super::ipc::WorkerMessage;
use crate::config::{self, TrainingConfig};
use crate::error::{TrainError, TrainResult};
use crate::forest::RandomForest;
use crate::progress::format_duration;
use crate::dataset;

/// Run the worker to completion. Returns the process exit code.
pub fn run_worker() -> i32 {
    eprintln!(
        "[WORKER] Starting training worker (pid={})",
        std::process::id()
    );

    match train_and_persist() {
        Ok(elapsed_ms) => {
            send_message(&WorkerMessage::Done { time: elapsed_ms });
            eprintln!(
                "[WORKER] Training complete in {}",
                format_duration(elapsed_ms)
            );
            0
        }
        Err(e) => {
            // Persist failures travel through the message channel too;
            // the exit code alone carries no structured reason.
            send_message(&WorkerMessage::Failed {
                error: e.to_string(),
            });
            eprintln!("[WORKER] Error: {e}");
            1
        }
    }
}

fn train_and_persist() -> TrainResult<f64> {
    let data_path = config::data_path();
    eprintln!("[WORKER] Loading dataset: {}", data_path.display());
    let dataset = dataset::load(&data_path)?;
    eprintln!("[WORKER] Loaded {} records", dataset.len());

    let target = config::estimator_target(config::DEFAULT_WORKER_ESTIMATORS);
    let train_config = TrainingConfig::with_estimators(target);

    eprintln!("[WORKER] Training full model with {target} estimators");
    let start = Instant::now();
    let model = RandomForest::train(&dataset.features, &dataset.labels, &train_config)?;
    let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;

    persist(&model, &config::model_path())?;
    Ok(elapsed_ms)
}

/// Write the artifact as one complete file, only after training has
/// fully succeeded. Bytes are staged to a sibling temp file and
/// renamed over the target so a failure mid-write never leaves a
/// half-formed artifact behind.
pub fn persist(model: &RandomForest, path: &Path) -> TrainResult<()> {
    let bytes = serde_json::to_vec(model)?;
    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, &bytes)
        .map_err(|e| TrainError::Persist(format!("{}: {e}", tmp.display())))?;
    std::fs::rename(&tmp, path)
        .map_err(|e| TrainError::Persist(format!("{}: {e}", path.display())))?;
    eprintln!("[WORKER] Model written to {}", path.display());
    Ok(())
}

/// The one structured message this process ever emits on stdout.
fn send_message(message: &WorkerMessage) {
    if let Ok(json) = serde_json::to_string(message) {
        let mut stdout = std::io::stdout().lock();
        let _ = writeln!(stdout, "{json}");
        let _ = stdout.flush();
    }
}
