//! Append-only log of acquired samples
//!
//! Layout:
//!
//! ```text
//! # 2024-03-01 12:00:00.123456
//! #time_computer	time	temperature
//! 2024-03-01T12:00:00.200000	0.2	21.5
//! ```
//!
//! Every sample is flushed as soon as it is written so an interrupted run
//! loses at most the line being written.

use crate::error::{AvesError, Result};
use crate::types::Sample;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Writes samples as tab-separated lines
#[derive(Debug)]
pub struct LogSink {
    destination: Option<PathBuf>,
    columns: Vec<String>,
    writer: Option<BufWriter<File>>,
    samples_written: u64,
}

impl LogSink {
    /// Create a sink; `None` disables logging entirely
    pub fn new(destination: Option<PathBuf>, columns: Vec<String>) -> Self {
        Self {
            destination,
            columns,
            writer: None,
            samples_written: 0,
        }
    }

    /// A sink that never writes
    pub fn disabled() -> Self {
        Self::new(None, Vec::new())
    }

    /// Where samples go, if anywhere
    pub fn destination(&self) -> Option<&Path> {
        self.destination.as_deref()
    }

    pub fn is_enabled(&self) -> bool {
        self.destination.is_some()
    }

    pub fn samples_written(&self) -> u64 {
        self.samples_written
    }

    /// Create the file and write the header
    pub fn open(&mut self) -> Result<()> {
        let Some(path) = self.destination.clone() else {
            return Ok(());
        };
        if self.writer.is_some() {
            return Ok(());
        }

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .map_err(|e| AvesError::resource(parent.display().to_string(), e))?;
        }
        let file = File::create(&path).map_err(|e| AvesError::resource(path.display().to_string(), e))?;
        let mut writer = BufWriter::new(file);

        let header = format!(
            "# {}\n#{}\n",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.6f"),
            self.columns.join("\t")
        );
        writer
            .write_all(header.as_bytes())
            .and_then(|_| writer.flush())
            .map_err(|e| AvesError::resource(path.display().to_string(), e))?;

        info!("Logging samples to {}", path.display());
        self.writer = Some(writer);
        Ok(())
    }

    /// Append samples in configured column order
    pub fn write(&mut self, samples: &[Sample]) -> Result<()> {
        let Some(path) = &self.destination else {
            return Ok(());
        };
        let Some(writer) = self.writer.as_mut() else {
            return Err(AvesError::resource(
                path.display().to_string(),
                std::io::Error::new(std::io::ErrorKind::NotConnected, "log file is not open"),
            ));
        };

        for sample in samples {
            let line = format_line(sample, &self.columns)?;
            writer
                .write_all(line.as_bytes())
                .and_then(|_| writer.flush())
                .map_err(|e| AvesError::resource(path.display().to_string(), e))?;
            self.samples_written += 1;
        }
        Ok(())
    }

    /// Flush and release the file
    pub fn close(&mut self) -> Result<()> {
        if let Some(mut writer) = self.writer.take() {
            writer.flush()?;
            debug!("Closed log after {} samples", self.samples_written);
        }
        Ok(())
    }
}

impl Drop for LogSink {
    fn drop(&mut self) {
        let _ = self.close();
    }
}

/// One log line, newline included
pub fn format_line(sample: &Sample, columns: &[String]) -> Result<String> {
    let mut fields = Vec::with_capacity(columns.len());
    for column in columns {
        let value = sample.get(column).ok_or_else(|| {
            AvesError::Config(format!(
                "output column '{}' is not produced by the input (fields: {})",
                column,
                sample.field_names().collect::<Vec<_>>().join(", ")
            ))
        })?;
        fields.push(value.to_string());
    }
    let mut line = fields.join("\t");
    line.push('\n');
    Ok(line)
}
