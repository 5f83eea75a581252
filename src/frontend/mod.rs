//! Frontend module for the egui viewer
//!
//! This module provides the plot window using eframe/egui. It receives
//! buffer snapshots from the acquisition thread through crossbeam channels
//! and renders them on the grid described by the `gui` configuration.
//!
//! # Main Types
//!
//! - [`Renderer`] - What the acquisition loop calls after each batch
//! - [`ViewerBridge`] / [`ChannelRenderer`] - The two ends of the thread boundary
//! - [`ViewerApp`] - Window state implementing [`eframe::App`]
//!
//! # Submodules
//!
//! - `plot` - Plot grid rendering with egui_plot
//! - `status_bar` - Sample counts and run outcome

pub mod bridge;
mod plot;
pub mod renderer;
mod status_bar;

pub use bridge::{ChannelRenderer, ViewerBridge, ViewerMessage, ViewerNotifier};
pub use plot::{axis_bounds, calculate_y_bounds_for_range, cell_rect, PlotGrid};
#[cfg(test)]
pub use renderer::MockRenderer;
pub use renderer::Renderer;
pub use status_bar::RunStatus;

use crate::buffer::BufferSnapshot;
use crate::config::GuiConfig;
use crate::error::{AvesError, Result};
use status_bar::{render_status_bar, StatusBarContext};
use tracing::{info, warn};

/// Main application state for the viewer window
pub struct ViewerApp {
    gui: GuiConfig,
    bridge: ViewerBridge,
    plots: PlotGrid,
    snapshot: BufferSnapshot,
    xlim: Option<(f64, f64)>,
    status: RunStatus,
    frames: u64,
}

impl ViewerApp {
    pub fn new(gui: GuiConfig, bridge: ViewerBridge) -> Self {
        Self {
            gui,
            bridge,
            plots: PlotGrid::default(),
            snapshot: BufferSnapshot::default(),
            xlim: None,
            status: RunStatus::Running,
            frames: 0,
        }
    }

    /// Apply pending messages; returns true if new data arrived
    pub fn process_messages(&mut self) -> bool {
        let mut fresh = false;
        for msg in self.bridge.drain() {
            match msg {
                ViewerMessage::Frame { snapshot, xlim } => {
                    self.snapshot = snapshot;
                    if xlim.is_some() {
                        self.xlim = xlim;
                    }
                    self.frames += 1;
                    fresh = true;
                }
                ViewerMessage::Finished { reason, samples } => {
                    info!("Viewer notified: {} after {} samples", reason, samples);
                    self.status = RunStatus::Finished { reason, samples };
                }
                ViewerMessage::Failed(error) => {
                    warn!("Viewer notified of failure: {}", error);
                    self.status = RunStatus::Failed(error);
                }
            }
        }
        fresh
    }

    pub fn status(&self) -> &RunStatus {
        &self.status
    }

    pub fn snapshot(&self) -> &BufferSnapshot {
        &self.snapshot
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }
}

impl eframe::App for ViewerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let fresh = self.process_messages();

        if ctx.input(|i| i.viewport().close_requested()) {
            self.bridge.mark_closed();
        }

        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            egui::MenuBar::new().ui(ui, |ui| {
                ui.menu_button("View", |ui| {
                    ui.checkbox(&mut self.gui.zoom_all_together, "Zoom all together");
                });
            });
        });

        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            render_status_bar(
                ui,
                &StatusBarContext {
                    status: &self.status,
                    shown: self.snapshot.len(),
                    window: self.snapshot.maxlen,
                    frames: self.frames,
                },
            );
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            if self.gui.axes.is_empty() {
                ui.centered_and_justified(|ui| {
                    ui.label("No plots configured");
                });
            } else {
                self.plots
                    .render(ui, &self.gui, &self.snapshot, self.xlim, fresh);
            }
        });

        if matches!(self.status, RunStatus::Running) {
            ctx.request_repaint_after(self.gui.refresh_interval());
        }
    }
}

/// Open the viewer window and block until the user closes it
pub fn run_viewer(gui: GuiConfig, bridge: ViewerBridge) -> Result<()> {
    let title = gui.window_title.clone();
    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1024.0, 720.0])
            .with_min_inner_size([400.0, 300.0])
            .with_title(title.clone()),
        ..Default::default()
    };

    eframe::run_native(
        &title,
        native_options,
        Box::new(|_cc| Ok(Box::new(ViewerApp::new(gui, bridge)))),
    )
    .map_err(|e| AvesError::Viewer(e.to_string()))
}
