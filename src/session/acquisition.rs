//! Acquisition loop: source to buffer, sink and viewer
//!
//! Each iteration checks the stop conditions, pulls one batch, persists it,
//! merges it into the sliding buffer and hands the buffer to the renderer.
//! Samples pulled in an iteration are always written and buffered before the
//! loop can stop.

use super::log_writer::LogSink;
use super::types::{AcquisitionSettings, InsertOrder, LoopState, RunSummary, StopReason};
use crate::backend::SampleSource;
use crate::buffer::{numeric_range, SlidingBuffer};
use crate::error::Result;
use crate::frontend::Renderer;
use crate::types::{BatchSize, Sample};
use std::time::{Duration, Instant};
use tracing::{debug, info, trace};

/// Drives one acquisition run
pub struct AcquisitionLoop {
    source: Box<dyn SampleSource>,
    sink: LogSink,
    buffer: SlidingBuffer,
    renderer: Option<Box<dyn Renderer>>,
    settings: AcquisitionSettings,
    state: LoopState,
    started: Instant,
    iterations: u64,
    samples: u64,
}

impl AcquisitionLoop {
    /// Create a loop; nothing is opened until [`AcquisitionLoop::open`] or
    /// [`AcquisitionLoop::run`]
    pub fn new(source: Box<dyn SampleSource>, sink: LogSink, settings: AcquisitionSettings) -> Self {
        let mut settings = settings;
        settings.batch_size = settings.batch_size.max(1);
        Self {
            source,
            sink,
            buffer: SlidingBuffer::new(settings.window),
            renderer: None,
            settings,
            state: LoopState::Running,
            started: Instant::now(),
            iterations: 0,
            samples: 0,
        }
    }

    /// Attach a viewer (builder style)
    pub fn with_renderer(mut self, renderer: Box<dyn Renderer>) -> Self {
        self.renderer = Some(renderer);
        self
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn buffer(&self) -> &SlidingBuffer {
        &self.buffer
    }

    pub fn settings(&self) -> &AcquisitionSettings {
        &self.settings
    }

    /// Time since the run started
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Acquire the source and sink and start the clock.
    ///
    /// Safe to call more than once.
    pub fn open(&mut self) -> Result<()> {
        self.source.open()?;
        self.sink.open()?;
        self.started = Instant::now();
        info!(
            "Acquiring from {} (batch {}, window {:?})",
            self.source.describe(),
            self.settings.batch_size,
            self.settings.window
        );
        Ok(())
    }

    /// First stop condition that holds, if any
    pub fn stop_condition(&self) -> Option<StopReason> {
        if let Some(limit) = self.settings.time_limit {
            if self.started.elapsed() > limit {
                return Some(StopReason::TimeLimit);
            }
        }
        if self
            .renderer
            .as_ref()
            .is_some_and(|renderer| renderer.closed_by_user())
        {
            return Some(StopReason::ViewerClosed);
        }
        if self.source.is_exhausted() {
            return Some(StopReason::SourceExhausted);
        }
        None
    }

    /// Run a single iteration and return the resulting state
    pub fn step(&mut self) -> Result<LoopState> {
        if !self.state.is_running() {
            return Ok(self.state);
        }
        if let Some(reason) = self.stop_condition() {
            info!("Stopping acquisition: {}", reason);
            self.state = LoopState::StopRequested(reason);
            return Ok(self.state);
        }

        let batch = self
            .source
            .read_samples(BatchSize::Count(self.settings.batch_size))?;
        self.iterations += 1;
        self.samples += batch.len() as u64;

        self.sink.write(&batch)?;
        match self.settings.order {
            InsertOrder::LatestFirst => self.buffer.extend_front(&batch),
            InsertOrder::Forward => self.buffer.extend(&batch),
        }

        if let Some(renderer) = self.renderer.as_mut() {
            if !self.buffer.is_empty() {
                let bounds = batch_bounds(&batch, self.settings.x_column.as_deref());
                renderer.set_data(&self.buffer);
                renderer.set_xlim(bounds);
                renderer.refresh();
            }
        }

        trace!(
            "Iteration {}: {} samples, buffer holds {}",
            self.iterations,
            batch.len(),
            self.buffer.len()
        );
        Ok(self.state)
    }

    /// Release the source and sink.
    ///
    /// Both are closed even if the first close fails.
    pub fn close(&mut self) -> Result<()> {
        let source_closed = self.source.close();
        let sink_closed = self.sink.close();
        if let Some(reason) = self.state.reason() {
            self.state = LoopState::Stopped(reason);
        }
        source_closed.and(sink_closed)
    }

    /// Iterate until a stop condition holds, then close everything
    pub fn run(&mut self) -> Result<RunSummary> {
        let outcome = self.open().and_then(|_| self.run_until_stopped());
        let closed = self.close();
        let reason = outcome?;
        closed?;

        let summary = self.summary(reason);
        info!(
            "Acquisition finished ({}): {} samples in {} iterations, {:.2?}",
            summary.reason, summary.samples, summary.iterations, summary.elapsed
        );
        Ok(summary)
    }

    /// Hand the buffer over once the run is done
    pub fn into_buffer(mut self) -> SlidingBuffer {
        std::mem::take(&mut self.buffer)
    }

    fn run_until_stopped(&mut self) -> Result<StopReason> {
        loop {
            if let Some(reason) = self.step()?.reason() {
                return Ok(reason);
            }
        }
    }

    fn summary(&self, reason: StopReason) -> RunSummary {
        RunSummary {
            reason,
            iterations: self.iterations,
            samples: self.samples,
            samples_written: self.sink.samples_written(),
            elapsed: self.started.elapsed(),
            source_stats: self.source.stats().clone(),
        }
    }
}

impl Drop for AcquisitionLoop {
    fn drop(&mut self) {
        if !self.state.is_stopped() {
            debug!("Acquisition loop dropped while active, releasing resources");
            let _ = self.close();
        }
    }
}

/// Range of the x field over one batch
fn batch_bounds(batch: &[Sample], x_column: Option<&str>) -> Option<(f64, f64)> {
    let x = x_column?;
    numeric_range(batch.iter().filter_map(|sample| sample.get(x)))
}
