//! Plot rendering module using egui_plot
//!
//! One plot per configured axis, placed on the layout grid. Each plot draws
//! its columns against the shared x column of the latest snapshot.
//!
//! # Main Types
//!
//! - [`PlotGrid`] - Lays out and renders every configured axis

use crate::buffer::BufferSnapshot;
use crate::config::{AxisConfig, GuiConfig};
use egui::{Color32, Pos2, Rect, RichText, Ui, UiBuilder, Vec2};
use egui_plot::{Corner, Legend, Line, Plot, PlotBounds, PlotPoints};

/// Gap between neighbouring plots in points
const CELL_MARGIN: f32 = 4.0;

/// Link group shared by every plot when zooming together
const SHARED_X_GROUP: &str = "aves_shared_x";

/// Line colors, cycled per column within a plot
const PALETTE: [Color32; 6] = [
    Color32::from_rgb(31, 119, 180),
    Color32::from_rgb(255, 127, 14),
    Color32::from_rgb(44, 160, 44),
    Color32::from_rgb(214, 39, 40),
    Color32::from_rgb(148, 103, 189),
    Color32::from_rgb(140, 86, 75),
];

/// Color for the `index`-th line of a plot
pub fn series_color(index: usize) -> Color32 {
    PALETTE[index % PALETTE.len()]
}

/// Screen area of one axis inside `area`
pub fn cell_rect(area: Rect, shape: (usize, usize), axis: &AxisConfig) -> Rect {
    let (rows, cols) = shape;
    if rows == 0 || cols == 0 {
        return area;
    }
    let cell = Vec2::new(area.width() / cols as f32, area.height() / rows as f32);
    let min = Pos2::new(
        area.min.x + cell.x * axis.col as f32,
        area.min.y + cell.y * axis.row as f32,
    );
    let size = Vec2::new(cell.x * axis.colspan as f32, cell.y * axis.rowspan as f32);
    Rect::from_min_size(min, size).shrink(CELL_MARGIN)
}

/// Calculate Y bounds for the given columns within the given X range
pub fn calculate_y_bounds_for_range(
    snapshot: &BufferSnapshot,
    x_column: &str,
    columns: &[String],
    x_min: f64,
    x_max: f64,
) -> (f64, f64) {
    let mut y_min = f64::MAX;
    let mut y_max = f64::MIN;

    for column in columns {
        for [x, y] in snapshot.plot_points(x_column, column) {
            if x >= x_min && x <= x_max && y.is_finite() {
                y_min = y_min.min(y);
                y_max = y_max.max(y);
            }
        }
    }

    // Add some padding to Y bounds
    if y_min < f64::MAX && y_max > f64::MIN {
        let y_range = y_max - y_min;
        let padding = if y_range > 0.0 { y_range * 0.1 } else { 1.0 };
        (y_min - padding, y_max + padding)
    } else {
        (-1.0, 1.0)
    }
}

/// Bounds a plot should be reset to, or `None` to leave it alone.
///
/// Fixed limits from the configuration win over the acquisition's x limits.
pub fn axis_bounds(
    snapshot: &BufferSnapshot,
    x_column: &str,
    axis: &AxisConfig,
    xlim: Option<(f64, f64)>,
) -> Option<([f64; 2], [f64; 2])> {
    let (x_min, x_max) = axis
        .options
        .xlim
        .map(|[lo, hi]| (lo, hi))
        .or(xlim)?;
    // A single sample gives a zero-width range
    let (x_min, x_max) = if x_max > x_min {
        (x_min, x_max)
    } else {
        (x_min - 0.5, x_max + 0.5)
    };
    let (y_min, y_max) = match axis.options.ylim {
        Some([lo, hi]) => (lo, hi),
        None => calculate_y_bounds_for_range(snapshot, x_column, &axis.columns, x_min, x_max),
    };
    Some(([x_min, y_min], [x_max, y_max]))
}

/// Renders the configured plots
pub struct PlotGrid {
    /// Line width for all plots
    pub line_width: f32,
}

impl Default for PlotGrid {
    fn default() -> Self {
        Self { line_width: 1.5 }
    }
}

impl PlotGrid {
    /// Render every axis into the remaining space of `ui`.
    ///
    /// Bounds are only pushed to the plots when `fresh` is set, so the user
    /// can zoom and pan between updates.
    pub fn render(
        &self,
        ui: &mut Ui,
        gui: &GuiConfig,
        snapshot: &BufferSnapshot,
        xlim: Option<(f64, f64)>,
        fresh: bool,
    ) {
        let area = ui.available_rect_before_wrap();
        let shape = gui.plot_shape();

        for (name, axis) in &gui.axes {
            let rect = cell_rect(area, shape, axis);
            ui.scope_builder(UiBuilder::new().max_rect(rect), |ui| {
                self.render_axis(ui, name, axis, gui, snapshot, xlim, fresh);
            });
        }
        ui.allocate_rect(area, egui::Sense::hover());
    }

    #[allow(clippy::too_many_arguments)]
    fn render_axis(
        &self,
        ui: &mut Ui,
        name: &str,
        axis: &AxisConfig,
        gui: &GuiConfig,
        snapshot: &BufferSnapshot,
        xlim: Option<(f64, f64)>,
        fresh: bool,
    ) {
        if let Some(title) = &axis.options.title {
            ui.vertical_centered(|ui| {
                ui.label(RichText::new(title).strong());
            });
        }

        let mut plot = Plot::new(("aves_axis", name))
            .allow_zoom(true)
            .allow_drag(true)
            .show_axes(true)
            .show_grid(true);
        if let Some(xlabel) = &axis.options.xlabel {
            plot = plot.x_axis_label(xlabel.clone());
        }
        if let Some(ylabel) = &axis.options.ylabel {
            plot = plot.y_axis_label(ylabel.clone());
        }
        if axis.shows_legend() {
            plot = plot.legend(
                Legend::default()
                    .position(Corner::RightTop)
                    .background_alpha(0.8),
            );
        }
        if gui.zoom_all_together {
            plot = plot.link_axis(SHARED_X_GROUP, [true, false]);
        }

        let bounds = if fresh {
            axis_bounds(snapshot, &gui.x_column, axis, xlim)
        } else {
            None
        };

        plot.show(ui, |plot_ui| {
            if let Some((min, max)) = bounds {
                plot_ui.set_plot_bounds(PlotBounds::from_min_max(min, max));
            }

            for (index, (column, legend)) in axis.legend_entries().into_iter().enumerate() {
                let points = snapshot.plot_points(&gui.x_column, column);
                if points.is_empty() {
                    continue;
                }
                let line = Line::new(legend, PlotPoints::from(points))
                    .color(series_color(index))
                    .width(self.line_width);
                plot_ui.line(line);
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::SlidingBuffer;
    use crate::types::Sample;

    fn snapshot() -> BufferSnapshot {
        let mut buffer = SlidingBuffer::unbounded();
        for (x, y) in [(0.0, 1.0), (1.0, 3.0), (2.0, 10.0)] {
            buffer.append(&Sample::new().with("x", x).with("y", y));
        }
        buffer.snapshot()
    }

    #[test]
    fn test_cell_rect_spans() {
        let area = Rect::from_min_size(Pos2::ZERO, Vec2::new(300.0, 200.0));
        let mut axis = AxisConfig::at(1, 1, &["y"]);
        axis.colspan = 2;

        let rect = cell_rect(area, (2, 3), &axis);
        assert_eq!(rect.min, Pos2::new(100.0 + CELL_MARGIN, 100.0 + CELL_MARGIN));
        assert_eq!(rect.max, Pos2::new(300.0 - CELL_MARGIN, 200.0 - CELL_MARGIN));
    }

    #[test]
    fn test_y_bounds_only_within_x_range() {
        let columns = vec!["y".to_string()];
        let (lo, hi) = calculate_y_bounds_for_range(&snapshot(), "x", &columns, 0.0, 1.0);
        assert!((lo - 0.8).abs() < 1e-9);
        assert!((hi - 3.2).abs() < 1e-9);

        assert_eq!(
            calculate_y_bounds_for_range(&snapshot(), "x", &columns, 5.0, 6.0),
            (-1.0, 1.0)
        );
    }

    #[test]
    fn test_axis_bounds_prefers_configured_limits() {
        let mut axis = AxisConfig::at(0, 0, &["y"]);
        assert_eq!(axis_bounds(&snapshot(), "x", &axis, None), None);

        let (min, max) = axis_bounds(&snapshot(), "x", &axis, Some((0.0, 2.0))).unwrap();
        assert_eq!((min[0], max[0]), (0.0, 2.0));

        axis.options.xlim = Some([-5.0, 5.0]);
        axis.options.ylim = Some([0.0, 40.0]);
        let (min, max) = axis_bounds(&snapshot(), "x", &axis, Some((0.0, 2.0))).unwrap();
        assert_eq!(min, [-5.0, 0.0]);
        assert_eq!(max, [5.0, 40.0]);
    }

    #[test]
    fn test_axis_bounds_widens_single_point() {
        let axis = AxisConfig::at(0, 0, &["y"]);
        let (min, max) = axis_bounds(&snapshot(), "x", &axis, Some((1.0, 1.0))).unwrap();
        assert_eq!((min[0], max[0]), (0.5, 1.5));
    }

    #[test]
    fn test_series_color_cycles() {
        assert_eq!(series_color(0), series_color(PALETTE.len()));
        assert_ne!(series_color(0), series_color(1));
    }
}
