//! Acquisition session module
//!
//! This module runs an acquisition: it pulls samples from a source, keeps
//! the most recent ones in a sliding buffer, persists every sample to a log
//! file and keeps a viewer up to date.
//!
//! # Features
//!
//! - Batch-wise acquisition with time, viewer and exhaustion stop conditions
//! - Tab-separated logs that can be replayed later
//! - Latest-first or arrival-order buffering

pub mod acquisition;
pub mod log_writer;
pub mod types;

pub use acquisition::AcquisitionLoop;
pub use log_writer::{format_line, LogSink};
pub use types::{AcquisitionSettings, InsertOrder, LoopState, RunSummary, StopReason};
