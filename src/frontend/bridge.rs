//! Thread boundary between the acquisition loop and the viewer window.
//!
//! The loop owns a [`ChannelRenderer`] and calls it synchronously; the
//! window owns the [`ViewerBridge`] and drains it once per frame. Only owned
//! snapshots cross the channel. Closing the window flips a shared flag the
//! loop polls as its viewer stop condition.
//!
//! Frames and end-of-run reports travel on separate channels. When the
//! window falls behind, the oldest queued frame is evicted so the newest
//! buffer contents always reach it.

use super::renderer::Renderer;
use crate::buffer::{BufferSnapshot, SlidingBuffer};
use crate::session::StopReason;
use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, trace};

/// Frames waiting for the window before older ones are evicted
const FRAME_CHANNEL_CAPACITY: usize = 4;

/// End-of-run reports waiting for the window
const STATUS_CHANNEL_CAPACITY: usize = 4;

/// Messages sent from the acquisition side to the window
#[derive(Debug, Clone)]
pub enum ViewerMessage {
    /// New buffer contents and the x limits of the latest batch
    Frame {
        snapshot: BufferSnapshot,
        xlim: Option<(f64, f64)>,
    },

    /// Acquisition ended normally
    Finished { reason: StopReason, samples: u64 },

    /// Acquisition ended with an error
    Failed(String),
}

/// Window-side handle
pub struct ViewerBridge {
    frame_rx: Receiver<ViewerMessage>,
    status_rx: Receiver<ViewerMessage>,
    closed: Arc<AtomicBool>,
}

impl ViewerBridge {
    /// Create a connected pair.
    ///
    /// `refresh` is the pause the renderer takes after each published frame.
    pub fn new(refresh: Duration) -> (Self, ChannelRenderer) {
        let (frame_tx, frame_rx) = bounded(FRAME_CHANNEL_CAPACITY);
        let (status_tx, status_rx) = bounded(STATUS_CHANNEL_CAPACITY);
        let closed = Arc::new(AtomicBool::new(false));
        let renderer = ChannelRenderer {
            frame_tx,
            backlog: frame_rx.clone(),
            status_tx,
            closed: Arc::clone(&closed),
            refresh,
            pending: None,
            xlim: None,
        };
        (
            Self {
                frame_rx,
                status_rx,
                closed,
            },
            renderer,
        )
    }

    /// Drain all pending messages, frames first.
    ///
    /// End-of-run reports are only sent after the last frame, so this order
    /// matches the order they were produced in.
    pub fn drain(&self) -> Vec<ViewerMessage> {
        let mut msgs: Vec<ViewerMessage> = self.frame_rx.try_iter().collect();
        msgs.extend(self.status_rx.try_iter());
        msgs
    }

    /// Try to receive a single message without blocking.
    pub fn try_recv(&self) -> Option<ViewerMessage> {
        self.frame_rx
            .try_recv()
            .or_else(|_| self.status_rx.try_recv())
            .ok()
    }

    /// Tell the acquisition side the window is gone
    pub fn mark_closed(&self) {
        if !self.closed.swap(true, Ordering::SeqCst) {
            debug!("Viewer closed by user");
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

impl Drop for ViewerBridge {
    fn drop(&mut self) {
        self.mark_closed();
    }
}

/// Acquisition-side renderer publishing snapshots over a channel
pub struct ChannelRenderer {
    frame_tx: Sender<ViewerMessage>,
    /// Second handle on the frame queue, used to evict stale frames
    backlog: Receiver<ViewerMessage>,
    status_tx: Sender<ViewerMessage>,
    closed: Arc<AtomicBool>,
    refresh: Duration,
    pending: Option<BufferSnapshot>,
    xlim: Option<(f64, f64)>,
}

impl ChannelRenderer {
    /// Handle for reporting the end of the run after the renderer has been
    /// handed to the loop
    pub fn notifier(&self) -> ViewerNotifier {
        ViewerNotifier {
            msg_tx: self.status_tx.clone(),
        }
    }

    /// Publish immediately without pausing
    pub fn publish(&mut self) {
        let Some(snapshot) = self.pending.take() else {
            return;
        };
        let mut msg = ViewerMessage::Frame {
            snapshot,
            xlim: self.xlim,
        };
        loop {
            match self.frame_tx.try_send(msg) {
                Ok(()) => return,
                Err(TrySendError::Full(rejected)) => {
                    trace!("Viewer is behind, evicting oldest frame");
                    let _ = self.backlog.try_recv();
                    msg = rejected;
                }
                Err(TrySendError::Disconnected(_)) => {
                    self.closed.store(true, Ordering::SeqCst);
                    return;
                }
            }
        }
    }
}

impl Renderer for ChannelRenderer {
    fn set_data(&mut self, buffer: &SlidingBuffer) {
        self.pending = Some(buffer.snapshot());
    }

    fn set_xlim(&mut self, bounds: Option<(f64, f64)>) {
        if bounds.is_some() {
            self.xlim = bounds;
        }
    }

    fn refresh(&mut self) {
        self.publish();
        if !self.refresh.is_zero() {
            std::thread::sleep(self.refresh);
        }
    }

    fn closed_by_user(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

/// Reports how the run ended
#[derive(Clone)]
pub struct ViewerNotifier {
    msg_tx: Sender<ViewerMessage>,
}

impl ViewerNotifier {
    pub fn finished(&self, reason: StopReason, samples: u64) {
        let _ = self.msg_tx.send(ViewerMessage::Finished { reason, samples });
    }

    pub fn failed(&self, error: impl std::fmt::Display) {
        let _ = self.msg_tx.send(ViewerMessage::Failed(error.to_string()));
    }
}
