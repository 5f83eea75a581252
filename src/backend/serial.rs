//! Live source: samples from a serial device
//!
//! The device prints one line per reading, whitespace-separated numbers in
//! the order of the configured columns. Lines that do not fit are dropped and
//! the next line is read; the source only gives up when the device goes quiet
//! for a full read timeout or disconnects.

use super::source_trait::{SampleSource, SourceStats, DISCARD_STREAK_REPORT};
use crate::config::InputColumn;
use crate::error::{AvesError, FrameError, Result};
use crate::types::{capture_timestamp, Sample, TIME_COMPUTER};
use std::io::{BufRead, BufReader, ErrorKind};
use std::time::Duration;
use tracing::{debug, info, trace, warn};

/// Reads samples from a serial port
pub struct SerialSource {
    port: String,
    baudrate: u32,
    timeout: Duration,
    columns: Vec<InputColumn>,
    reader: Option<Box<dyn BufRead + Send>>,
    exhausted: bool,
    stats: SourceStats,
}

impl SerialSource {
    /// Create a source for a port; the device is opened by [`SampleSource::open`]
    pub fn new(
        port: impl Into<String>,
        baudrate: u32,
        timeout: Duration,
        columns: Vec<InputColumn>,
    ) -> Self {
        Self {
            port: port.into(),
            baudrate,
            timeout,
            columns,
            reader: None,
            exhausted: false,
            stats: SourceStats::default(),
        }
    }

    /// Create a source over an already open byte stream
    pub fn from_reader<R>(reader: R, columns: Vec<InputColumn>, label: impl Into<String>) -> Self
    where
        R: BufRead + Send + 'static,
    {
        Self {
            port: label.into(),
            baudrate: 0,
            timeout: Duration::ZERO,
            columns,
            reader: Some(Box::new(reader)),
            exhausted: false,
            stats: SourceStats::default(),
        }
    }

    /// Configured columns
    pub fn columns(&self) -> &[InputColumn] {
        &self.columns
    }

    /// Turn one raw line into a sample, applying conversion factors
    pub fn parse_frame(&self, raw: &[u8]) -> std::result::Result<Sample, FrameError> {
        let text = std::str::from_utf8(raw)
            .map_err(|_| FrameError::Garbage(String::from_utf8_lossy(raw).trim().to_string()))?;

        let tokens: Vec<&str> = text.split_whitespace().collect();
        if tokens.len() != self.columns.len() {
            return Err(FrameError::FieldCount {
                expected: self.columns.len(),
                found: tokens.len(),
            });
        }

        let mut sample = Sample::new();
        for (column, token) in self.columns.iter().zip(tokens) {
            let raw_value = token
                .parse::<f64>()
                .map_err(|_| FrameError::Garbage(text.trim().to_string()))?;
            sample.insert(column.name.clone(), raw_value * column.conversion_factor);
        }
        sample.insert(TIME_COMPUTER, capture_timestamp());
        Ok(sample)
    }

    fn mark_exhausted(&mut self, why: &str) {
        info!("Serial source {} stopped: {}", self.port, why);
        self.exhausted = true;
    }
}

fn is_disconnect(kind: ErrorKind) -> bool {
    matches!(
        kind,
        ErrorKind::BrokenPipe
            | ErrorKind::UnexpectedEof
            | ErrorKind::ConnectionAborted
            | ErrorKind::NotConnected
    )
}

impl SampleSource for SerialSource {
    fn open(&mut self) -> Result<()> {
        if self.reader.is_some() {
            return Ok(());
        }

        let port = serialport::new(self.port.as_str(), self.baudrate)
            .timeout(self.timeout)
            .open()
            .map_err(|e| AvesError::resource(self.port.clone(), e.into()))?;

        info!(
            "Opened serial port {} at {} baud (timeout {:?})",
            self.port, self.baudrate, self.timeout
        );
        self.reader = Some(Box::new(BufReader::new(port)));
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        if self.reader.take().is_some() {
            debug!("Closed serial port {}", self.port);
        }
        Ok(())
    }

    fn read_sample(&mut self) -> Result<Option<Sample>> {
        if self.exhausted {
            return Ok(None);
        }

        let mut raw = Vec::new();
        loop {
            raw.clear();
            let Some(reader) = self.reader.as_mut() else {
                return Err(AvesError::resource(
                    self.port.clone(),
                    std::io::Error::new(ErrorKind::NotConnected, "serial port is not open"),
                ));
            };

            match reader.read_until(b'\n', &mut raw) {
                Ok(0) => {
                    self.mark_exhausted("end of stream");
                    return Ok(None);
                }
                Ok(_) => {}
                Err(e) if e.kind() == ErrorKind::TimedOut => {
                    if raw.is_empty() {
                        self.mark_exhausted("read timed out");
                        return Ok(None);
                    }
                    trace!("Timed out mid-line, parsing {} bytes", raw.len());
                }
                Err(e) if is_disconnect(e.kind()) => {
                    self.mark_exhausted(&format!("device disconnected ({e})"));
                    return Ok(None);
                }
                Err(e) => return Err(AvesError::resource(self.port.clone(), e)),
            }

            match self.parse_frame(&raw) {
                Ok(sample) => {
                    self.stats.record_sample(raw.len());
                    return Ok(Some(sample));
                }
                Err(frame_error) => {
                    self.stats.record_discard(raw.len());
                    warn!("{}", frame_error);
                    if self.stats.discard_streak % DISCARD_STREAK_REPORT == 0 {
                        warn!(
                            "{} consecutive lines discarded from {}",
                            self.stats.discard_streak, self.port
                        );
                    }
                }
            }
        }
    }

    fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    fn describe(&self) -> String {
        self.port.clone()
    }

    fn stats(&self) -> &SourceStats {
        &self.stats
    }
}

impl Drop for SerialSource {
    fn drop(&mut self) {
        let _ = self.close();
    }
}
