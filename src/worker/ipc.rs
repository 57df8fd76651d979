//! IPC protocol types for controller ↔ worker communication.
//!
//! JSON Lines over the worker's stdout pipe. The worker sends exactly
//! one message per lifetime; everything else it prints goes to stderr.

use serde::{Deserialize, Serialize};

/// The single structured message a worker emits before exiting.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "status")]
pub enum WorkerMessage {
    /// Training and persistence succeeded.
    #[serde(rename = "done")]
    Done {
        /// Worker-measured training time in milliseconds.
        time: f64,
    },
    /// Load, training, or persistence failed.
    #[serde(rename = "error")]
    Failed { error: String },
}

/// Decode one stdout line. A failure here is its own anomaly class:
/// the supervisor surfaces malformed messages instead of dropping them.
pub fn decode_line(line: &str) -> Result<WorkerMessage, serde_json::Error> {
    serde_json::from_str(line)
}
