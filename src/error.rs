//! Error handling for aves
//!
//! This module defines the error taxonomy used throughout the crate and a
//! Result alias. Fatal errors unwind to the top-level run; transient frame
//! errors from the serial device are handled inside the live source and
//! never leave it.

use thiserror::Error;

/// Main error type for aves operations
#[derive(Error, Debug)]
pub enum AvesError {
    /// A device or file could not be opened (or failed while in use)
    #[error("Cannot use {resource}: {source}")]
    Resource {
        resource: String,
        #[source]
        source: std::io::Error,
    },

    /// A malformed line in a replay file
    #[error("Parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    /// The configuration document has an unsupported schema version
    #[error("Unsupported configuration version {}, expected {}", display_version(.found), .supported)]
    ConfigVersion { found: Option<u64>, supported: u64 },

    /// Errors related to configuration content
    #[error("Configuration error: {0}")]
    Config(String),

    /// Errors raised by the viewer window
    #[error("Viewer error: {0}")]
    Viewer(String),

    /// Errors while copying a project template
    #[error("Template error: {0}")]
    Template(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic errors with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<AvesError>,
    },
}

impl AvesError {
    /// Add context to an error
    pub fn with_context(self, context: impl Into<String>) -> Self {
        AvesError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Build a resource error for a named device or file
    pub fn resource(resource: impl Into<String>, source: std::io::Error) -> Self {
        AvesError::Resource {
            resource: resource.into(),
            source,
        }
    }

    /// Whether this error (or the error it wraps) is a parse error
    pub fn is_parse(&self) -> bool {
        match self {
            AvesError::Parse { .. } => true,
            AvesError::WithContext { source, .. } => source.is_parse(),
            _ => false,
        }
    }

    /// Whether this error (or the error it wraps) is a resource error
    pub fn is_resource(&self) -> bool {
        match self {
            AvesError::Resource { .. } => true,
            AvesError::WithContext { source, .. } => source.is_resource(),
            _ => false,
        }
    }
}

fn display_version(found: &Option<u64>) -> String {
    found
        .map(|v| v.to_string())
        .unwrap_or_else(|| "<missing>".to_string())
}

/// Result type alias for aves operations
pub type Result<T> = std::result::Result<T, AvesError>;

/// A line from the live device that could not be turned into a sample.
///
/// Recovered locally by discarding the line and reading the next one.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FrameError {
    /// Wrong number of whitespace-separated fields
    #[error("Received {found} fields, expecting {expected}")]
    FieldCount { expected: usize, found: usize },

    /// Bytes that are not UTF-8 or tokens that are not numbers
    #[error("Discarding garbage in serial port: {0}")]
    Garbage(String),
}

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Add context to an error result
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context lazily to an error result
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| e.with_context(f()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_display() {
        let err = AvesError::Parse {
            line: 4,
            message: "invalid float literal".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Parse error at line 4: invalid float literal"
        );
    }

    #[test]
    fn test_config_version_display() {
        let err = AvesError::ConfigVersion {
            found: Some(1),
            supported: 2,
        };
        assert_eq!(
            err.to_string(),
            "Unsupported configuration version 1, expected 2"
        );

        let missing = AvesError::ConfigVersion {
            found: None,
            supported: 2,
        };
        assert!(missing.to_string().contains("<missing>"));
    }

    #[test]
    fn test_error_with_context_keeps_kind() {
        let err = AvesError::resource(
            "/dev/ttyACM0",
            std::io::Error::new(std::io::ErrorKind::NotFound, "no such device"),
        );
        let with_ctx = err.with_context("Opening input");
        assert!(with_ctx.to_string().contains("Opening input"));
        assert!(with_ctx.is_resource());
        assert!(!with_ctx.is_parse());
    }

    #[test]
    fn test_frame_error_display() {
        let err = FrameError::FieldCount {
            expected: 3,
            found: 2,
        };
        assert_eq!(err.to_string(), "Received 2 fields, expecting 3");
    }
}
