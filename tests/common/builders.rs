//! Test data builders for creating test objects

use aves_rs::config::{
    AxisConfig, Config, DeviceConfig, GuiConfig, InputColumn, InputConfig, OutputConfig,
    SUPPORTED_VERSION,
};
use aves_rs::Sample;

/// Builder for configuration documents
pub struct ConfigBuilder {
    device: Option<DeviceConfig>,
    output: Option<Vec<String>>,
    gui: Option<GuiConfig>,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            device: None,
            output: None,
            gui: None,
        }
    }

    pub fn device(mut self, baudrate: u32, columns: &[(&str, f64)]) -> Self {
        self.device = Some(DeviceConfig {
            baudrate,
            timeout: 1.0,
            columns: columns
                .iter()
                .map(|(name, factor)| InputColumn::new(*name, *factor))
                .collect(),
        });
        self
    }

    pub fn output(mut self, columns: &[&str]) -> Self {
        self.output = Some(columns.iter().map(|c| c.to_string()).collect());
        self
    }

    /// One plot per column stacked in a single grid column
    pub fn stacked_plots(mut self, x_column: &str, columns: &[&str]) -> Self {
        let mut gui = GuiConfig::new(x_column);
        for (row, column) in columns.iter().enumerate() {
            gui = gui.with_axis(*column, AxisConfig::at(row, 0, &[*column]));
        }
        self.gui = Some(gui);
        self
    }

    pub fn build(self) -> Config {
        Config {
            version: SUPPORTED_VERSION,
            input: self.device.map(|arduino| InputConfig { arduino }),
            output: self.output.map(|columns| OutputConfig { columns }),
            gui: self.gui,
        }
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Sample with a text time label followed by numeric fields
pub fn sample(time: &str, fields: &[(&str, f64)]) -> Sample {
    fields
        .iter()
        .fold(Sample::new().with("time", time), |s, (name, value)| {
            s.with(*name, *value)
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_builder() {
        let config = ConfigBuilder::new()
            .device(9600, &[("time", 0.001), ("light", 1.0)])
            .output(&["time_computer", "time", "light"])
            .stacked_plots("time", &["light"])
            .build();

        assert_eq!(config.input_device().unwrap().baudrate, 9600);
        assert_eq!(config.output_columns().unwrap().len(), 3);
        assert_eq!(config.gui.unwrap().plot_shape(), (1, 1));
    }
}
