//! Worker process lifecycle and event bridge.
//!
//! Spawns the training worker as a child process (same binary with the
//! worker env flag set) and turns its stdout lines plus its exit into
//! a single ordered event stream for the controller.

use std::io::{BufRead, BufReader};
use std::process::{Child, Command, Stdio};

use tokio::sync::mpsc;

use super::ipc::{self, WorkerMessage};
use crate::config;
use crate::error::{TrainError, TrainResult};

/// Everything the controller can observe about a running worker.
#[derive(Debug)]
pub enum WorkerEvent {
    /// A well-formed IPC message.
    Message(WorkerMessage),
    /// A non-empty stdout line that failed to decode. Surfaced as its
    /// own anomaly class instead of being dropped.
    Malformed(String),
    /// Process termination; `None` when killed by a signal. Always the
    /// last event, after every line the worker managed to write.
    Exited(Option<i32>),
}

/// Handle to a spawned worker: an async stream of `WorkerEvent`s.
pub struct WorkerHandle {
    events: mpsc::UnboundedReceiver<WorkerEvent>,
}

impl WorkerHandle {
    /// Next event, or `None` once the stream is exhausted.
    pub async fn next_event(&mut self) -> Option<WorkerEvent> {
        self.events.recv().await
    }

    /// Bridge an already-spawned child (stdout piped) into an event
    /// stream. One blocking thread drains stdout to EOF and then reaps
    /// the child, so messages always arrive before the exit event.
    pub fn attach(mut child: Child) -> TrainResult<Self> {
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| TrainError::Spawn("worker stdout not piped".to_string()))?;

        let (tx, rx) = mpsc::unbounded_channel();

        std::thread::spawn(move || {
            let reader = BufReader::new(stdout);
            for line in reader.lines() {
                let line = match line {
                    Ok(l) => l,
                    Err(e) => {
                        eprintln!("[SUPERVISOR] Worker stdout read error: {e}");
                        break;
                    }
                };
                if line.trim().is_empty() {
                    continue;
                }
                let event = match ipc::decode_line(&line) {
                    Ok(msg) => WorkerEvent::Message(msg),
                    Err(_) => WorkerEvent::Malformed(line),
                };
                if tx.send(event).is_err() {
                    break;
                }
            }
            // Reap regardless of whether anyone is still listening.
            let code = child.wait().ok().and_then(|status| status.code());
            let _ = tx.send(WorkerEvent::Exited(code));
        });

        Ok(Self { events: rx })
    }
}

/// Spawn the training worker at the full target estimator count.
///
/// The worker reloads the dataset itself; only the config travels via
/// its environment. Stderr is inherited so worker logs reach the
/// operator directly; stdout is reserved for IPC.
pub fn spawn(target_estimators: usize) -> TrainResult<WorkerHandle> {
    let exe = std::env::current_exe()
        .map_err(|e| TrainError::Spawn(format!("cannot find own executable: {e}")))?;

    log::info!(
        "Spawning worker: {} ({}={target_estimators})",
        exe.display(),
        config::ESTIMATORS_ENV
    );

    let child = Command::new(exe)
        .env(config::WORKER_ENV, "1")
        .env(config::ESTIMATORS_ENV, target_estimators.to_string())
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::inherit())
        .spawn()
        .map_err(|e| TrainError::Spawn(e.to_string()))?;

    WorkerHandle::attach(child)
}
