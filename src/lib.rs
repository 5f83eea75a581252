//! # aves: sensor acquisition and live plotting
//!
//! Reads whitespace-separated samples from a serial device (or replays a
//! previously recorded log), appends them to a tab-separated log file and
//! plots a sliding window of the most recent samples.
//!
//! ## Architecture
//!
//! - **Backend**: [`SampleSource`](backend::SampleSource) implementations for
//!   serial ports and replay files
//! - **Session**: the [`AcquisitionLoop`](session::AcquisitionLoop) driving
//!   source, log sink, buffer and renderer
//! - **Frontend**: an eframe/egui window with egui_plot graphs, fed over
//!   crossbeam channels from the acquisition thread
//! - **Config**: versioned YAML/TOML/JSON documents describing device
//!   columns, log columns and the plot grid
//!
//! ## Example
//!
//! ```ignore
//! use aves_rs::backend::ReplaySource;
//! use aves_rs::session::{AcquisitionLoop, AcquisitionSettings, LogSink};
//!
//! let columns = vec!["time".to_string(), "light".to_string()];
//! let source = ReplaySource::from_path("data/run.txt", columns.clone());
//! let sink = LogSink::new(Some("data/copy.txt".into()), columns);
//! let summary = AcquisitionLoop::new(Box::new(source), sink, AcquisitionSettings::default()).run()?;
//! println!("{} samples", summary.samples);
//! ```

pub mod app;
pub mod backend;
pub mod buffer;
pub mod cli;
pub mod config;
pub mod error;
pub mod frontend;
pub mod session;
pub mod template;
pub mod types;

// Re-export commonly used types
pub use backend::{ReplaySource, SampleSource, SerialSource};
pub use buffer::{BufferSnapshot, SlidingBuffer};
pub use config::{Config, GuiConfig};
pub use error::{AvesError, Result};
pub use session::{AcquisitionLoop, AcquisitionSettings, LogSink, RunSummary, StopReason};
pub use types::{BatchSize, Sample, Value};
