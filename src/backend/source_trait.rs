//! SampleSource trait for unified input handling
//!
//! This module provides a common trait for every place samples can come
//! from: a live serial device or a previously recorded log file. The
//! acquisition loop only talks to this trait, so a new kind of input only
//! needs its own open/read/close implementation.

use crate::error::Result;
use crate::types::{BatchSize, Sample};

/// Number of consecutive discarded frames after which a streak is reported
pub const DISCARD_STREAK_REPORT: u64 = 100;

/// Statistics for source operations
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourceStats {
    /// Samples successfully produced
    pub samples_read: u64,
    /// Lines skipped because they were comments or blank
    pub lines_skipped: u64,
    /// Malformed frames discarded by the live source
    pub frames_discarded: u64,
    /// Current run of consecutive discarded frames
    pub discard_streak: u64,
    /// Total bytes consumed from the underlying resource
    pub bytes_read: u64,
}

impl SourceStats {
    /// Record a successfully parsed sample
    pub fn record_sample(&mut self, bytes: usize) {
        self.samples_read += 1;
        self.bytes_read += bytes as u64;
        self.discard_streak = 0;
    }

    /// Record a skipped comment or blank line
    pub fn record_skip(&mut self, bytes: usize) {
        self.lines_skipped += 1;
        self.bytes_read += bytes as u64;
    }

    /// Record a discarded malformed frame
    pub fn record_discard(&mut self, bytes: usize) {
        self.frames_discarded += 1;
        self.discard_streak += 1;
        self.bytes_read += bytes as u64;
    }

    /// Percentage of frames that produced a sample
    pub fn success_rate(&self) -> f64 {
        let total = self.samples_read + self.frames_discarded;
        if total == 0 {
            100.0
        } else {
            (self.samples_read as f64 / total as f64) * 100.0
        }
    }
}

/// Unified interface for sample inputs
///
/// Implementations must be `Send` so an opened source can be moved onto the
/// acquisition thread. Every implementation releases its resource on `Drop`
/// as well as in [`SampleSource::close`].
///
/// # Example
///
/// ```ignore
/// fn drain(source: &mut dyn SampleSource) -> Result<Vec<Sample>> {
///     source.open()?;
///     let samples = source.read_samples(BatchSize::Unbounded)?;
///     source.close()?;
///     Ok(samples)
/// }
/// ```
pub trait SampleSource: Send {
    /// Acquire the underlying file or device
    fn open(&mut self) -> Result<()>;

    /// Release the underlying file or device.
    ///
    /// Safe to call repeatedly and after a failed or partial open.
    fn close(&mut self) -> Result<()>;

    /// Read one sample, or `None` once no more data is available.
    ///
    /// Returning `None` sets the exhausted flag for good.
    fn read_sample(&mut self) -> Result<Option<Sample>>;

    /// Whether the source has run out of data
    fn is_exhausted(&self) -> bool;

    /// Human-readable description of the input (path or port name)
    fn describe(&self) -> String;

    /// Read statistics
    fn stats(&self) -> &SourceStats;

    /// Read up to `batch` samples.
    ///
    /// Stops early when the source is exhausted; a partial or empty result
    /// is not an error.
    fn read_samples(&mut self, batch: BatchSize) -> Result<Vec<Sample>> {
        let mut samples = match batch {
            BatchSize::Count(n) => Vec::with_capacity(n),
            BatchSize::Unbounded => Vec::new(),
        };
        while !batch.is_satisfied(samples.len()) {
            match self.read_sample()? {
                Some(sample) => samples.push(sample),
                None => break,
            }
        }
        Ok(samples)
    }
}

impl<S: SampleSource + ?Sized> SampleSource for Box<S> {
    fn open(&mut self) -> Result<()> {
        (**self).open()
    }

    fn close(&mut self) -> Result<()> {
        (**self).close()
    }

    fn read_sample(&mut self) -> Result<Option<Sample>> {
        (**self).read_sample()
    }

    fn is_exhausted(&self) -> bool {
        (**self).is_exhausted()
    }

    fn describe(&self) -> String {
        (**self).describe()
    }

    fn stats(&self) -> &SourceStats {
        (**self).stats()
    }

    fn read_samples(&mut self, batch: BatchSize) -> Result<Vec<Sample>> {
        (**self).read_samples(batch)
    }
}
