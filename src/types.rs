//! Core data types for aves
//!
//! This module contains the fundamental data structures used throughout
//! the crate for representing sensor readings.
//!
//! # Main Types
//!
//! - [`Value`] - A single field value, numeric or textual
//! - [`Sample`] - One reading event: field name to value
//! - [`BatchSize`] - How many samples to pull from a source at once
//!
//! # Field Names
//!
//! Field names come from configuration (column names), not from the code.
//! The only reserved name is [`TIME_COMPUTER`], which the live source stamps
//! with the wall-clock time at which a line was successfully parsed.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Reserved field holding the capture timestamp of live samples
pub const TIME_COMPUTER: &str = "time_computer";

/// Timestamp layout used for [`TIME_COMPUTER`] (ISO 8601, microseconds)
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f";

/// A single field value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Floating point reading
    Number(f64),
    /// Opaque token (time labels, timestamps)
    Text(String),
}

impl Value {
    /// Numeric interpretation of the value.
    ///
    /// Text values are parsed when they look like numbers, so replayed time
    /// labels such as `"0.25"` can still drive a numeric axis.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(v) => Some(*v),
            Value::Text(s) => s.trim().parse::<f64>().ok(),
        }
    }

    /// Text content, if this is a text value
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Number(_) => None,
            Value::Text(s) => Some(s),
        }
    }

    /// Returns true for numeric values
    pub fn is_number(&self) -> bool {
        matches!(self, Value::Number(_))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Number(v)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl fmt::Display for Value {
    /// Numbers are written so that they parse back to the same `f64`;
    /// integral values keep a trailing `.0` so columns stay visibly floating point.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(v) => {
                if v.is_finite() && v.fract() == 0.0 && v.abs() < 1e16 {
                    write!(f, "{:.1}", v)
                } else {
                    write!(f, "{}", v)
                }
            }
            Value::Text(s) => write!(f, "{}", s),
        }
    }
}

/// One reading event: a mapping from field name to value
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    fields: BTreeMap<String, Value>,
}

impl Sample {
    /// Create an empty sample
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field (builder style)
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    /// Set a field, replacing any previous value
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(name.into(), value.into());
    }

    /// Get a field value
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Numeric value of a field
    pub fn number(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(Value::as_f64)
    }

    /// Whether the sample carries a field
    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Field names in sorted order
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Iterate over `(name, value)` pairs
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of fields
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true if the sample has no fields
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Whether two samples have exactly the same key set
    pub fn same_keys(&self, other: &Sample) -> bool {
        self.fields.len() == other.fields.len()
            && self.fields.keys().zip(other.fields.keys()).all(|(a, b)| a == b)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Sample {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Number of samples requested from a source in one call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchSize {
    /// At most this many samples
    Count(usize),
    /// Read until the source is exhausted
    Unbounded,
}

impl BatchSize {
    /// Whether `collected` samples satisfy this request
    pub fn is_satisfied(&self, collected: usize) -> bool {
        match self {
            BatchSize::Count(n) => collected >= *n,
            BatchSize::Unbounded => false,
        }
    }
}

impl From<usize> for BatchSize {
    fn from(n: usize) -> Self {
        BatchSize::Count(n)
    }
}

/// Current local time formatted for [`TIME_COMPUTER`]
pub fn capture_timestamp() -> String {
    chrono::Local::now().format(TIMESTAMP_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_display_keeps_float_look() {
        assert_eq!(Value::Number(2.0).to_string(), "2.0");
        assert_eq!(Value::Number(-3.0).to_string(), "-3.0");
        assert_eq!(Value::Number(1.5).to_string(), "1.5");
        assert_eq!(Value::Number(0.1).to_string(), "0.1");
        assert_eq!(Value::Number(1e20).to_string(), "100000000000000000000");
        assert_eq!(Value::Text("t0".into()).to_string(), "t0");
    }

    #[test]
    fn test_value_display_parses_back() {
        for v in [0.1, 1.0 / 3.0, 123456.789, -0.000_012_5, 2.5e-8] {
            let text = Value::Number(v).to_string();
            assert_eq!(text.parse::<f64>().unwrap(), v);
        }
    }

    #[test]
    fn test_value_as_f64() {
        assert_eq!(Value::Number(4.5).as_f64(), Some(4.5));
        assert_eq!(Value::from("0.25").as_f64(), Some(0.25));
        assert_eq!(Value::from("t1").as_f64(), None);
    }

    #[test]
    fn test_sample_builder_and_keys() {
        let a = Sample::new().with("time", "t0").with("a", 1.0);
        let b: Sample = [("a", Value::Number(2.0)), ("time", Value::from("t1"))]
            .into_iter()
            .collect();

        assert_eq!(a.len(), 2);
        assert!(a.same_keys(&b));
        assert_eq!(a.number("a"), Some(1.0));
        assert_eq!(a.field_names().collect::<Vec<_>>(), vec!["a", "time"]);

        let c = Sample::new().with("a", 1.0);
        assert!(!a.same_keys(&c));
    }

    #[test]
    fn test_batch_size() {
        assert!(BatchSize::Count(2).is_satisfied(2));
        assert!(!BatchSize::Count(2).is_satisfied(1));
        assert!(BatchSize::Count(0).is_satisfied(0));
        assert!(!BatchSize::Unbounded.is_satisfied(usize::MAX));
    }

    #[test]
    fn test_capture_timestamp_format() {
        let ts = capture_timestamp();
        assert!(chrono::NaiveDateTime::parse_from_str(&ts, TIMESTAMP_FORMAT).is_ok());
        assert!(!ts.contains(char::is_whitespace));
    }
}
