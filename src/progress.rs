//! Operator-facing progress display.
//!
//! A 1-second repeating tick that rewrites a single stdout line with
//! elapsed and estimated-remaining time while the worker runs. The
//! reporter never blocks training (it lives on the controller side of
//! the process boundary) and must be stopped exactly once; `stop` is
//! idempotent so every terminal path can call it safely.

use std::io::Write;
use std::time::{Duration, Instant};

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Render a millisecond count as a short human duration.
///
/// Under one second renders as "0s"; otherwise rounds to whole seconds
/// and decomposes into h/m/s, omitting leading zero units.
pub fn format_duration(ms: f64) -> String {
    if ms < 1000.0 {
        return "0s".to_string();
    }
    let total = (ms / 1000.0).round() as u64;
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;
    if hours > 0 {
        format!("{hours}h {minutes}m {seconds}s")
    } else if minutes > 0 {
        format!("{minutes}m {seconds}s")
    } else {
        format!("{seconds}s")
    }
}

/// Cancellable progress ticker, owned by the controller.
pub struct ProgressReporter {
    handle: Option<JoinHandle<()>>,
}

impl ProgressReporter {
    /// Start ticking against the given total-duration estimate.
    pub fn start(estimated_total_ms: f64) -> Self {
        let handle = tokio::spawn(async move {
            let start = Instant::now();
            let mut tick = tokio::time::interval(Duration::from_secs(1));
            tick.set_missed_tick_behavior(MissedTickBehavior::Skip);
            // The first interval tick fires immediately; swallow it so
            // the first line appears after one full second.
            tick.tick().await;
            loop {
                tick.tick().await;
                let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;
                let remaining_ms = (estimated_total_ms - elapsed_ms).max(0.0);
                print!(
                    "\rElapsed: {} / est. remaining: {} ",
                    format_duration(elapsed_ms),
                    format_duration(remaining_ms)
                );
                let _ = std::io::stdout().flush();
            }
        });
        Self {
            handle: Some(handle),
        }
    }

    /// Stop the ticker. Safe to call more than once; only the first
    /// call does anything.
    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }

    pub fn is_stopped(&self) -> bool {
        self.handle.is_none()
    }
}

impl Drop for ProgressReporter {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration_table() {
        assert_eq!(format_duration(0.0), "0s");
        assert_eq!(format_duration(999.0), "0s");
        assert_eq!(format_duration(59_000.0), "59s");
        assert_eq!(format_duration(60_000.0), "1m 0s");
        assert_eq!(format_duration(125_000.0), "2m 5s");
        assert_eq!(format_duration(3_600_000.0), "1h 0m 0s");
        assert_eq!(format_duration(3_725_000.0), "1h 2m 5s");
    }

    #[test]
    fn test_format_duration_rounds_to_nearest_second() {
        assert_eq!(format_duration(1_499.0), "1s");
        assert_eq!(format_duration(1_500.0), "2s");
    }

    #[tokio::test]
    async fn test_stop_is_idempotent() {
        let mut reporter = ProgressReporter::start(10_000.0);
        assert!(!reporter.is_stopped());
        reporter.stop();
        assert!(reporter.is_stopped());
        // Second stop is a no-op, not a panic.
        reporter.stop();
        assert!(reporter.is_stopped());
    }
}
