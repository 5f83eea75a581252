//! Configuration module for aves
//!
//! A single document describes the device output, the log file layout and
//! the viewer. YAML is the primary format; TOML and JSON are picked by file
//! extension.
//!
//! # Sections
//!
//! - `version` - Schema version, must be [`SUPPORTED_VERSION`]
//! - `input` - Serial device settings and its columns (live acquisition)
//! - `output` - Columns written to and replayed from log files
//! - `gui` - Viewer layout; absent means headless
//!
//! # Example
//!
//! ```ignore
//! use aves_rs::config::Config;
//!
//! let config = Config::load("config.yaml")?;
//! if let Some(gui) = &config.gui {
//!     println!("{} plots", gui.axes.len());
//! }
//! ```

pub mod gui;

pub use gui::{AxisConfig, AxisOptions, GuiConfig};

use crate::error::{AvesError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::debug;

/// The only configuration schema version understood
pub const SUPPORTED_VERSION: u64 = 2;

/// Configuration file used when none is given
pub const DEFAULT_CONFIG_FILE: &str = "config.yaml";

// ==================== Format Detection ====================

/// On-disk format of a configuration document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Yaml,
    Toml,
    Json,
}

impl ConfigFormat {
    /// Format from the file extension; anything unknown is read as YAML
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        match path
            .as_ref()
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .as_deref()
        {
            Some("toml") => ConfigFormat::Toml,
            Some("json") => ConfigFormat::Json,
            _ => ConfigFormat::Yaml,
        }
    }

    fn parse<T: for<'de> Deserialize<'de>>(self, content: &str) -> std::result::Result<T, String> {
        match self {
            ConfigFormat::Yaml => serde_yaml::from_str(content).map_err(|e| e.to_string()),
            ConfigFormat::Toml => toml::from_str(content).map_err(|e| e.to_string()),
            ConfigFormat::Json => serde_json::from_str(content).map_err(|e| e.to_string()),
        }
    }

    fn render<T: Serialize>(self, value: &T) -> std::result::Result<String, String> {
        match self {
            ConfigFormat::Yaml => serde_yaml::to_string(value).map_err(|e| e.to_string()),
            ConfigFormat::Toml => toml::to_string_pretty(value).map_err(|e| e.to_string()),
            ConfigFormat::Json => serde_json::to_string_pretty(value).map_err(|e| e.to_string()),
        }
    }
}

// ==================== Input Section ====================

/// One whitespace-separated field printed by the device
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputColumn {
    /// Field name the converted value is stored under
    pub name: String,
    /// Multiplier applied to the raw reading
    pub conversion_factor: f64,
}

impl InputColumn {
    pub fn new(name: impl Into<String>, conversion_factor: f64) -> Self {
        Self {
            name: name.into(),
            conversion_factor,
        }
    }
}

/// Serial device settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceConfig {
    pub baudrate: u32,
    /// Read timeout in seconds; a read this long with no data ends acquisition
    pub timeout: f64,
    pub columns: Vec<InputColumn>,
}

impl DeviceConfig {
    /// Read timeout as a duration
    pub fn timeout(&self) -> Duration {
        Duration::try_from_secs_f64(self.timeout).unwrap_or(Duration::ZERO)
    }
}

/// The `input` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputConfig {
    pub arduino: DeviceConfig,
}

// ==================== Output Section ====================

/// The `output` section: column order of log files
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    pub columns: Vec<String>,
}

// ==================== Document ====================

#[derive(Deserialize)]
struct VersionProbe {
    #[serde(default)]
    version: Option<serde_json::Value>,
}

/// Complete configuration document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub version: u64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input: Option<InputConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<OutputConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gui: Option<GuiConfig>,
}

impl Config {
    /// Load a configuration file, format chosen by extension
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            AvesError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        let config = Self::from_str_with_format(&content, ConfigFormat::from_path(path))
            .map_err(|e| match e {
                AvesError::Config(msg) => AvesError::Config(format!("{:?}: {}", path, msg)),
                other => other,
            })?;
        debug!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    /// Parse a document.
    ///
    /// The version is checked before anything else so an old document fails
    /// with [`AvesError::ConfigVersion`] rather than a shape error.
    pub fn from_str_with_format(content: &str, format: ConfigFormat) -> Result<Self> {
        let probe: VersionProbe = format
            .parse(content)
            .map_err(|e| AvesError::Config(format!("Failed to parse config: {}", e)))?;
        let found = probe.version.as_ref().and_then(serde_json::Value::as_u64);
        if found != Some(SUPPORTED_VERSION) {
            return Err(AvesError::ConfigVersion {
                found,
                supported: SUPPORTED_VERSION,
            });
        }

        let config: Config = format
            .parse(content)
            .map_err(|e| AvesError::Config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Save the document, format chosen by extension
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                AvesError::Config(format!("Failed to create config directory: {}", e))
            })?;
        }

        let content = ConfigFormat::from_path(path)
            .render(self)
            .map_err(|e| AvesError::Config(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content).map_err(|e| {
            AvesError::Config(format!("Failed to write config file {:?}: {}", path, e))
        })
    }

    /// Device settings, required for live acquisition
    pub fn input_device(&self) -> Result<&DeviceConfig> {
        self.input
            .as_ref()
            .map(|input| &input.arduino)
            .ok_or_else(|| {
                AvesError::Config("reading a serial port requires an 'input' section".into())
            })
    }

    /// Log file columns, if logging is configured
    pub fn output_columns(&self) -> Option<&[String]> {
        self.output.as_ref().map(|o| o.columns.as_slice())
    }

    fn validate(&self) -> Result<()> {
        if let Some(input) = &self.input {
            let device = &input.arduino;
            if device.columns.is_empty() {
                return Err(AvesError::Config(
                    "input.arduino.columns must not be empty".into(),
                ));
            }
            if !(device.timeout.is_finite() && device.timeout >= 0.0) {
                return Err(AvesError::Config(format!(
                    "input.arduino.timeout must be a non-negative number of seconds, got {}",
                    device.timeout
                )));
            }
        }
        if let Some(output) = &self.output {
            if output.columns.is_empty() {
                return Err(AvesError::Config("output.columns must not be empty".into()));
            }
        }
        if let Some(gui) = &self.gui {
            gui.validate()?;
        }
        Ok(())
    }
}
