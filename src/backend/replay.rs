//! Replay source: samples from a previously written log file
//!
//! The file format is the one produced by [`crate::session::LogSink`]:
//! comment lines start with `#`, every other line holds whitespace-separated
//! tokens. The first token is kept verbatim as text, the rest are numbers.

use super::source_trait::{SampleSource, SourceStats};
use crate::error::{AvesError, Result};
use crate::types::{Sample, Value};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use tracing::{debug, info, trace};

/// Replays samples line by line from a text log
pub struct ReplaySource {
    path: Option<PathBuf>,
    label: String,
    columns: Vec<String>,
    reader: Option<Box<dyn BufRead + Send>>,
    line_number: usize,
    exhausted: bool,
    stats: SourceStats,
}

impl ReplaySource {
    /// Create a source for a file; nothing is touched until [`SampleSource::open`]
    pub fn from_path(path: impl AsRef<Path>, columns: Vec<String>) -> Self {
        let path = path.as_ref().to_path_buf();
        Self {
            label: path.display().to_string(),
            path: Some(path),
            columns,
            reader: None,
            line_number: 0,
            exhausted: false,
            stats: SourceStats::default(),
        }
    }

    /// Create a source over an already open reader
    pub fn from_reader<R>(reader: R, columns: Vec<String>, label: impl Into<String>) -> Self
    where
        R: BufRead + Send + 'static,
    {
        Self {
            path: None,
            label: label.into(),
            columns,
            reader: Some(Box::new(reader)),
            line_number: 0,
            exhausted: false,
            stats: SourceStats::default(),
        }
    }

    /// Column names tokens are mapped onto
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// 1-based number of the last line consumed
    pub fn line_number(&self) -> usize {
        self.line_number
    }
}

/// Turn one data line into a sample.
///
/// Token 0 stays text, tokens 1.. must be floats. Extra tokens beyond the
/// configured columns are ignored.
pub fn parse_line(text: &str, line: usize, columns: &[String]) -> Result<Sample> {
    let tokens: Vec<&str> = text.split_whitespace().collect();
    if tokens.len() < columns.len() {
        return Err(AvesError::Parse {
            line,
            message: format!(
                "found {} values, expecting {} ({})",
                tokens.len(),
                columns.len(),
                columns.join(", ")
            ),
        });
    }

    let mut sample = Sample::new();
    for (index, (name, token)) in columns.iter().zip(tokens).enumerate() {
        let value = if index == 0 {
            Value::from(token)
        } else {
            let number = token.parse::<f64>().map_err(|e| AvesError::Parse {
                line,
                message: format!("column '{}': '{}' is not a number ({})", name, token, e),
            })?;
            Value::Number(number)
        };
        sample.insert(name.clone(), value);
    }
    Ok(sample)
}

impl SampleSource for ReplaySource {
    fn open(&mut self) -> Result<()> {
        if self.reader.is_some() {
            return Ok(());
        }
        let Some(path) = &self.path else {
            return Err(AvesError::resource(
                self.label.clone(),
                std::io::Error::new(std::io::ErrorKind::NotFound, "no path to open"),
            ));
        };

        let file = File::open(path).map_err(|e| AvesError::resource(self.label.clone(), e))?;
        self.reader = Some(Box::new(BufReader::new(file)));
        self.line_number = 0;
        info!("Replaying samples from {}", self.label);
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        if self.reader.take().is_some() {
            debug!(
                "Closed replay source {} after {} lines",
                self.label, self.line_number
            );
        }
        Ok(())
    }

    fn read_sample(&mut self) -> Result<Option<Sample>> {
        if self.exhausted {
            return Ok(None);
        }
        let Some(reader) = self.reader.as_mut() else {
            return Err(AvesError::resource(
                self.label.clone(),
                std::io::Error::new(std::io::ErrorKind::NotConnected, "source is not open"),
            ));
        };

        let mut line = String::new();
        loop {
            line.clear();
            let bytes = reader
                .read_line(&mut line)
                .map_err(|e| AvesError::resource(self.label.clone(), e))?;
            if bytes == 0 {
                debug!("Reached end of {}", self.label);
                self.exhausted = true;
                return Ok(None);
            }
            self.line_number += 1;

            let text = line.trim();
            if text.is_empty() || line.starts_with('#') {
                trace!("Skipping line {}", self.line_number);
                self.stats.record_skip(bytes);
                continue;
            }

            let sample = parse_line(text, self.line_number, &self.columns)?;
            self.stats.record_sample(bytes);
            return Ok(Some(sample));
        }
    }

    fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    fn describe(&self) -> String {
        self.label.clone()
    }

    fn stats(&self) -> &SourceStats {
        &self.stats
    }
}

impl Drop for ReplaySource {
    fn drop(&mut self) {
        let _ = self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::BatchSize;
    use std::io::{Cursor, Write};

    fn columns(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn replay(text: &str, names: &[&str]) -> ReplaySource {
        ReplaySource::from_reader(Cursor::new(text.to_string()), columns(names), "memory")
    }

    #[test]
    fn test_comments_and_blank_lines_skipped() {
        let mut source = replay(
            "# 2024-01-01 10:00:00\n#time\ta\tb\n\nt0 1.0 2.0\n   \nt1 1.5 2.5\n",
            &["time", "a", "b"],
        );
        let samples = source.read_samples(BatchSize::Unbounded).unwrap();

        assert_eq!(samples.len(), 2);
        assert_eq!(samples[0].get("time"), Some(&Value::from("t0")));
        assert_eq!(samples[1].number("a"), Some(1.5));
        assert_eq!(samples[1].number("b"), Some(2.5));
        assert_eq!(source.stats().lines_skipped, 4);
        assert!(source.is_exhausted());
    }

    #[test]
    fn test_first_token_stays_text() {
        let mut source = replay("0.250 3 4\n", &["time", "a", "b"]);
        let sample = source.read_sample().unwrap().unwrap();
        assert_eq!(sample.get("time"), Some(&Value::Text("0.250".into())));
        assert_eq!(sample.get("a"), Some(&Value::Number(3.0)));
    }

    #[test]
    fn test_extra_tokens_ignored() {
        let mut source = replay("t0 1 2 3 4\n", &["time", "a"]);
        let sample = source.read_sample().unwrap().unwrap();
        assert_eq!(sample.len(), 2);
        assert_eq!(sample.number("a"), Some(1.0));
    }

    #[test]
    fn test_short_line_is_parse_error_with_line_number() {
        let mut source = replay("# header\nt0 1.0 2.0\nt1 1.0\n", &["time", "a", "b"]);
        assert!(source.read_sample().unwrap().is_some());

        let err = source.read_sample().unwrap_err();
        match err {
            AvesError::Parse { line, .. } => assert_eq!(line, 3),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_bad_number_is_parse_error() {
        let mut source = replay("t0 1.0 nope\n", &["time", "a", "b"]);
        let err = source.read_sample().unwrap_err();
        assert!(err.is_parse());
        assert!(err.to_string().contains("nope"));
    }

    #[test]
    fn test_indented_hash_is_not_a_comment() {
        let mut source = replay("# header\n   # note 1\n", &["time", "a", "b"]);
        let err = source.read_sample().unwrap_err();
        match err {
            AvesError::Parse { line, .. } => assert_eq!(line, 2),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_exhaustion_is_sticky() {
        let mut source = replay("t0 1\n", &["time", "a"]);
        assert!(source.read_sample().unwrap().is_some());
        assert!(source.read_sample().unwrap().is_none());
        assert!(source.is_exhausted());
        assert!(source.read_sample().unwrap().is_none());
        assert!(source.read_samples(BatchSize::Count(5)).unwrap().is_empty());
    }

    #[test]
    fn test_open_missing_file_is_resource_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut source = ReplaySource::from_path(dir.path().join("missing.txt"), columns(&["t"]));
        let err = source.open().unwrap_err();
        assert!(err.is_resource());
        source.close().unwrap();
        source.close().unwrap();
    }

    #[test]
    fn test_read_before_open_is_resource_error() {
        let mut source = ReplaySource::from_path("never-opened.txt", columns(&["t"]));
        assert!(source.read_sample().unwrap_err().is_resource());
    }

    #[test]
    fn test_from_path_reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "# header").unwrap();
        writeln!(file, "#time\tx").unwrap();
        writeln!(file, "t0\t1.0").unwrap();
        writeln!(file, "t1\t2.0").unwrap();
        file.flush().unwrap();

        let mut source = ReplaySource::from_path(file.path(), columns(&["time", "x"]));
        source.open().unwrap();
        let samples = source.read_samples(BatchSize::Count(10)).unwrap();
        source.close().unwrap();

        assert_eq!(samples.len(), 2);
        assert_eq!(samples[1].number("x"), Some(2.0));
        assert_eq!(source.line_number(), 4);
    }
}
