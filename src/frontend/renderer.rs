//! Renderer trait: what the acquisition loop needs from a viewer

use crate::buffer::SlidingBuffer;

/// Receives buffer updates from the acquisition loop.
///
/// Calls are synchronous and happen on the acquisition thread, in the
/// order `set_data`, `set_xlim`, `refresh` once per batch.
#[cfg_attr(test, mockall::automock)]
pub trait Renderer: Send {
    /// Replace the plotted data with the current buffer contents
    fn set_data(&mut self, buffer: &SlidingBuffer);

    /// Horizontal limits for the latest data; `None` keeps the previous ones
    fn set_xlim(&mut self, bounds: Option<(f64, f64)>);

    /// Make the update visible; may pause briefly
    fn refresh(&mut self);

    /// Whether the user closed the viewer
    fn closed_by_user(&self) -> bool;
}
