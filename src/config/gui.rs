//! Viewer layout configuration
//!
//! Plots are placed on a grid. Each axis occupies `rowspan x colspan` cells
//! starting at `(row, col)`; the grid is just large enough to hold every axis.

use crate::error::{AvesError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

/// Default window title
pub const DEFAULT_WINDOW_TITLE: &str = "aves";

/// Default pause between viewer refreshes in milliseconds
pub const DEFAULT_REFRESH_TIME_MS: u64 = 100;

fn default_window_title() -> String {
    DEFAULT_WINDOW_TITLE.to_string()
}

fn default_refresh_time_ms() -> u64 {
    DEFAULT_REFRESH_TIME_MS
}

fn default_span() -> usize {
    1
}

/// The `gui` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuiConfig {
    /// Title of the viewer window
    #[serde(default = "default_window_title")]
    pub window_title: String,

    /// Link the x axis of every plot when zooming or panning
    #[serde(default)]
    pub zoom_all_together: bool,

    /// Pause after each refresh so the window stays interactive
    #[serde(default = "default_refresh_time_ms")]
    pub refresh_time_ms: u64,

    /// Field plotted on the horizontal axis of every plot
    pub x_column: String,

    /// Plots by name
    #[serde(default)]
    pub axes: BTreeMap<String, AxisConfig>,
}

impl GuiConfig {
    /// Create a layout with no axes
    pub fn new(x_column: impl Into<String>) -> Self {
        Self {
            window_title: default_window_title(),
            zoom_all_together: false,
            refresh_time_ms: DEFAULT_REFRESH_TIME_MS,
            x_column: x_column.into(),
            axes: BTreeMap::new(),
        }
    }

    /// Add an axis (builder style)
    pub fn with_axis(mut self, name: impl Into<String>, axis: AxisConfig) -> Self {
        self.axes.insert(name.into(), axis);
        self
    }

    /// Grid size as `(rows, cols)`
    pub fn plot_shape(&self) -> (usize, usize) {
        self.axes.values().fold((0, 0), |(rows, cols), axis| {
            (
                rows.max(axis.row + axis.rowspan),
                cols.max(axis.col + axis.colspan),
            )
        })
    }

    /// Refresh pause as a duration
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_millis(self.refresh_time_ms)
    }

    /// Every field some plot draws, x column included
    pub fn plotted_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.x_column.as_str()];
        for axis in self.axes.values() {
            for column in &axis.columns {
                if !fields.contains(&column.as_str()) {
                    fields.push(column);
                }
            }
        }
        fields
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.x_column.trim().is_empty() {
            return Err(AvesError::Config("gui.x_column must not be empty".into()));
        }
        for (name, axis) in &self.axes {
            axis.validate()
                .map_err(|e| AvesError::Config(format!("gui.axes.{}: {}", name, e)))?;
        }
        Ok(())
    }
}

/// One plot of the viewer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisConfig {
    #[serde(default)]
    pub row: usize,
    #[serde(default)]
    pub col: usize,
    #[serde(default = "default_span")]
    pub rowspan: usize,
    #[serde(default = "default_span")]
    pub colspan: usize,

    /// Fields drawn as lines against the x column
    #[serde(default)]
    pub columns: Vec<String>,

    /// Legend names, one per column
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub columns_legend: Option<Vec<String>>,

    #[serde(default)]
    pub options: AxisOptions,
}

impl Default for AxisConfig {
    fn default() -> Self {
        Self {
            row: 0,
            col: 0,
            rowspan: 1,
            colspan: 1,
            columns: Vec::new(),
            columns_legend: None,
            options: AxisOptions::default(),
        }
    }
}

impl AxisConfig {
    /// Axis at a grid cell drawing the given columns
    pub fn at(row: usize, col: usize, columns: &[&str]) -> Self {
        Self {
            row,
            col,
            columns: columns.iter().map(|c| c.to_string()).collect(),
            ..Default::default()
        }
    }

    /// Display names paired with column names
    pub fn legend_entries(&self) -> Vec<(&str, &str)> {
        match &self.columns_legend {
            Some(legend) => self
                .columns
                .iter()
                .zip(legend)
                .map(|(c, l)| (c.as_str(), l.as_str()))
                .collect(),
            None => self.columns.iter().map(|c| (c.as_str(), c.as_str())).collect(),
        }
    }

    /// Whether the plot gets a legend
    pub fn shows_legend(&self) -> bool {
        self.columns.len() > 1
    }

    fn validate(&self) -> std::result::Result<(), String> {
        if self.rowspan == 0 || self.colspan == 0 {
            return Err("rowspan and colspan must be at least 1".into());
        }
        if let Some(legend) = &self.columns_legend {
            if legend.len() != self.columns.len() {
                return Err(format!(
                    "columns_legend has {} entries but there are {} columns",
                    legend.len(),
                    self.columns.len()
                ));
            }
        }
        for (label, limits) in [("xlim", self.options.xlim), ("ylim", self.options.ylim)] {
            if let Some([lo, hi]) = limits {
                if !(lo.is_finite() && hi.is_finite() && lo < hi) {
                    return Err(format!("{} must be [low, high] with low < high", label));
                }
            }
        }
        Ok(())
    }
}

/// Decorations and fixed limits for one plot
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AxisOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub xlabel: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ylabel: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub xlim: Option<[f64; 2]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ylim: Option<[f64; 2]>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plot_shape_covers_spans() {
        let mut wide = AxisConfig::at(1, 0, &["a"]);
        wide.colspan = 3;
        let gui = GuiConfig::new("time")
            .with_axis("top", AxisConfig::at(0, 0, &["b"]))
            .with_axis("bottom", wide);
        assert_eq!(gui.plot_shape(), (2, 3));
    }

    #[test]
    fn test_plot_shape_empty() {
        assert_eq!(GuiConfig::new("t").plot_shape(), (0, 0));
    }

    #[test]
    fn test_legend_defaults_to_column_names() {
        let mut axis = AxisConfig::at(0, 0, &["t1", "t2"]);
        assert_eq!(axis.legend_entries(), vec![("t1", "t1"), ("t2", "t2")]);
        assert!(axis.shows_legend());

        axis.columns_legend = Some(vec!["Inside".into(), "Outside".into()]);
        assert_eq!(
            axis.legend_entries(),
            vec![("t1", "Inside"), ("t2", "Outside")]
        );
    }

    #[test]
    fn test_plotted_fields_unique() {
        let gui = GuiConfig::new("time")
            .with_axis("a", AxisConfig::at(0, 0, &["x", "y"]))
            .with_axis("b", AxisConfig::at(1, 0, &["y", "time"]));
        assert_eq!(gui.plotted_fields(), vec!["time", "x", "y"]);
    }

    #[test]
    fn test_validate_rejects_bad_axes() {
        let mut axis = AxisConfig::at(0, 0, &["a", "b"]);
        axis.columns_legend = Some(vec!["only one".into()]);
        let gui = GuiConfig::new("time").with_axis("bad", axis);
        let err = gui.validate().unwrap_err();
        assert!(err.to_string().contains("gui.axes.bad"));

        let mut axis = AxisConfig::at(0, 0, &["a"]);
        axis.options.ylim = Some([5.0, 1.0]);
        assert!(GuiConfig::new("time").with_axis("a", axis).validate().is_err());

        let mut axis = AxisConfig::at(0, 0, &["a"]);
        axis.rowspan = 0;
        assert!(GuiConfig::new("time").with_axis("a", axis).validate().is_err());
    }
}
