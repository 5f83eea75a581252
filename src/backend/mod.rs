//! Backend module: where samples come from
//!
//! # Components
//!
//! - [`SampleSource`] - Common interface for every input
//! - [`ReplaySource`] - Re-reads a log file written by a previous run
//! - [`SerialSource`] - Reads a live device over a serial port
//!
//! A source is chosen once at construction and used through
//! `Box<dyn SampleSource>` afterwards; see [`source_for_port`].
//!
//! # Example
//!
//! ```ignore
//! use aves_rs::backend::{source_for_port, SampleSource};
//! use aves_rs::types::BatchSize;
//!
//! let mut source = source_for_port("data/run.txt", &config)?;
//! source.open()?;
//! while let Some(sample) = source.read_sample()? {
//!     println!("{:?}", sample);
//! }
//! ```

pub mod replay;
pub mod serial;
pub mod source_trait;

pub use replay::{parse_line, ReplaySource};
pub use serial::SerialSource;
pub use source_trait::{SampleSource, SourceStats, DISCARD_STREAK_REPORT};

use crate::config::Config;
use crate::error::{AvesError, Result};
use std::path::Path;
use tracing::debug;

/// Pick the source for a `--port` argument.
///
/// An existing file is replayed using the output columns; anything else is
/// treated as a serial device described by the input section.
pub fn source_for_port(port: &str, config: &Config) -> Result<Box<dyn SampleSource>> {
    if Path::new(port).is_file() {
        debug!("{} is a file, using replay source", port);
        let columns = config
            .output
            .as_ref()
            .ok_or_else(|| {
                AvesError::Config("replaying a file requires an 'output' section".to_string())
            })?
            .columns
            .clone();
        return Ok(Box::new(ReplaySource::from_path(port, columns)));
    }

    let arduino = config.input_device()?;
    Ok(Box::new(SerialSource::new(
        port,
        arduino.baudrate,
        arduino.timeout(),
        arduino.columns.clone(),
    )))
}
