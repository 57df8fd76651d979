//! Out-of-process training worker.
//!
//! Full-complexity training runs in a separate child process for:
//! - Crash isolation: a training crash or OOM cannot take down the
//!   coordinating/reporting logic
//! - Clean concurrency: the controller keeps its progress timer
//!   running while the blocking work happens elsewhere

pub mod ipc;
pub mod runner;
pub mod supervisor;
