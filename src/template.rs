//! Bundled project templates
//!
//! A template is a handful of files compiled into the binary and copied
//! into a fresh directory by `aves init`.

use crate::error::{AvesError, Result};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

/// Template used when none is named
pub const DEFAULT_TEMPLATE: &str = "simple_demo";

/// A file shipped with a template
#[derive(Debug, Clone, Copy)]
pub struct TemplateFile {
    pub name: &'static str,
    pub contents: &'static str,
}

/// A named set of files
#[derive(Debug, Clone, Copy)]
pub struct Template {
    pub name: &'static str,
    pub files: &'static [TemplateFile],
}

const TEMPLATES: &[Template] = &[Template {
    name: "simple_demo",
    files: &[
        TemplateFile {
            name: "config.yaml",
            contents: include_str!("../templates/simple_demo/config.yaml"),
        },
        TemplateFile {
            name: "sensor_sketch.ino",
            contents: include_str!("../templates/simple_demo/sensor_sketch.ino"),
        },
    ],
}];

/// Names of every bundled template
pub fn template_names() -> Vec<&'static str> {
    TEMPLATES.iter().map(|t| t.name).collect()
}

/// Look up a template by name
pub fn find(name: &str) -> Result<&'static Template> {
    TEMPLATES.iter().find(|t| t.name == name).ok_or_else(|| {
        AvesError::Template(format!(
            "{} is not a valid template (valid templates are: {})",
            name,
            template_names().join(", ")
        ))
    })
}

impl Template {
    /// Destination paths of this template's files under `destdir`
    pub fn destinations(&self, destdir: &Path) -> Vec<PathBuf> {
        self.files.iter().map(|f| destdir.join(f.name)).collect()
    }

    /// Copy the files into `destdir`, creating it if needed.
    ///
    /// Nothing is written when any destination already exists.
    pub fn install(&self, destdir: &Path) -> Result<Vec<PathBuf>> {
        std::fs::create_dir_all(destdir)
            .map_err(|e| AvesError::resource(destdir.display().to_string(), e))?;

        let existing: Vec<String> = self
            .destinations(destdir)
            .into_iter()
            .filter(|dst| dst.exists())
            .map(|dst| dst.display().to_string())
            .collect();
        if !existing.is_empty() {
            return Err(AvesError::Template(format!(
                "The following files already exist, please remove or rename them: {}",
                existing.join(", ")
            )));
        }

        info!(
            "Copying files from template {} to {}",
            self.name,
            destdir.display()
        );
        let mut written = Vec::with_capacity(self.files.len());
        for file in self.files {
            let dst = destdir.join(file.name);
            let mut out = OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&dst)
                .map_err(|e| AvesError::resource(dst.display().to_string(), e))?;
            out.write_all(file.contents.as_bytes())
                .map_err(|e| AvesError::resource(dst.display().to_string(), e))?;
            info!("  {}", file.name);
            written.push(dst);
        }
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[test]
    fn test_unknown_template() {
        let err = find("fancy").unwrap_err();
        assert!(matches!(err, AvesError::Template(_)));
        assert!(err.to_string().contains("simple_demo"));
    }

    #[test]
    fn test_install_into_new_directory() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("a/b/project");

        let written = find(DEFAULT_TEMPLATE).unwrap().install(&dest).unwrap();
        assert_eq!(written.len(), 2);
        assert!(dest.join("config.yaml").is_file());
        assert!(dest.join("sensor_sketch.ino").is_file());
    }

    #[test]
    fn test_refuses_to_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("sensor_sketch.ino"), "mine").unwrap();

        let err = find(DEFAULT_TEMPLATE)
            .unwrap()
            .install(dir.path())
            .unwrap_err();
        assert!(err.to_string().contains("sensor_sketch.ino"));
        assert!(!dir.path().join("config.yaml").exists());
        assert_eq!(
            std::fs::read_to_string(dir.path().join("sensor_sketch.ino")).unwrap(),
            "mine"
        );
    }

    #[test]
    fn test_bundled_config_is_valid() {
        let dir = tempfile::tempdir().unwrap();
        find(DEFAULT_TEMPLATE).unwrap().install(dir.path()).unwrap();

        let config = Config::load(dir.path().join("config.yaml")).unwrap();
        let device = config.input_device().unwrap();
        assert_eq!(device.columns.len(), 3);
        let gui = config.gui.unwrap();
        assert_eq!(gui.plot_shape(), (2, 1));
        for field in gui.plotted_fields() {
            assert!(config.output.as_ref().unwrap().columns.iter().any(|c| c == field));
        }
    }
}
