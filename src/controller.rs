//! Controller orchestration.
//!
//! Load the dataset, run the calibration pass, spawn the isolated
//! training worker, and report progress until the worker reports back
//! or dies. The controller does no CPU-bound work after spawning; it
//! only ticks the progress timer and waits on worker events.

use std::time::Instant;

use crate::config::{self, TrainingConfig};
use crate::dataset;
use crate::error::TrainResult;
use crate::estimate;
use crate::progress::{format_duration, ProgressReporter};
use crate::worker::ipc::WorkerMessage;
use crate::worker::supervisor::{self, WorkerEvent};

/// Run the controller to completion. Returns the process exit code.
pub async fn run() -> i32 {
    match orchestrate().await {
        Ok(code) => code,
        Err(e) => {
            log::error!("Controller error: {e}");
            eprintln!("Controller error: {e}");
            1
        }
    }
}

async fn orchestrate() -> TrainResult<i32> {
    let data_path = config::data_path();
    log::info!("Loading dataset for calibration: {}", data_path.display());
    let calibration_set = dataset::load(&data_path)?;
    log::info!("Loaded {} records", calibration_set.len());

    let target = config::estimator_target(config::DEFAULT_CONTROLLER_ESTIMATORS);
    let base = TrainingConfig::with_estimators(target);

    log::info!(
        "Running quick benchmark with {} estimators",
        estimate::bench_count(target)
    );
    let calibration = estimate::calibrate(&calibration_set, target, &base)?;
    let estimated_total_ms = calibration.estimated_total_ms(target);
    log::info!(
        "Bench: {:.0} ms -> estimated total {:.0} ms ({})",
        calibration.elapsed_ms,
        estimated_total_ms,
        format_duration(estimated_total_ms)
    );

    // Calibration is complete before the worker spawns; the bench and
    // full training passes never overlap.
    let mut handle = supervisor::spawn(target)?;
    let start = Instant::now();
    let mut reporter = ProgressReporter::start(estimated_total_ms);

    // The first event decides the outcome: the worker sends at most
    // one message, and a bare exit means it died without one.
    let event = handle.next_event().await;
    reporter.stop();

    match event {
        Some(WorkerEvent::Message(WorkerMessage::Done { time })) => {
            let wall_ms = start.elapsed().as_secs_f64() * 1000.0;
            // Wall time includes spawn/startup overhead, so the two
            // figures legitimately differ.
            println!(
                "\nWorker finished training in {} (reported {:.0} ms)",
                format_duration(wall_ms),
                time
            );
            Ok(0)
        }
        Some(WorkerEvent::Message(WorkerMessage::Failed { error })) => {
            eprintln!("\nWorker error: {error}");
            Ok(1)
        }
        Some(WorkerEvent::Malformed(line)) => {
            eprintln!("\nUnrecognized worker message: {line}");
            Ok(1)
        }
        Some(WorkerEvent::Exited(code)) => {
            // Died without sending anything: no structured reason
            // exists, only the exit code.
            match code {
                Some(code) => eprintln!("\nWorker exited with code {code} before reporting a result"),
                None => eprintln!("\nWorker terminated by signal before reporting a result"),
            }
            Ok(1)
        }
        None => {
            eprintln!("\nWorker event stream closed unexpectedly");
            Ok(1)
        }
    }
}
