//! Bounded per-field sample history
//!
//! [`SlidingBuffer`] keeps the most recent `maxlen` values of every field so
//! memory stays bounded during long experiments and plots only show a
//! window of the latest data. All fields grow in lock-step: appending one
//! sample extends every field by exactly one entry.
//!
//! # Insertion orders
//!
//! - [`SlidingBuffer::append`] pushes at the back and evicts from the front
//!   (replay-forward order)
//! - [`SlidingBuffer::append_front`] pushes at the front and evicts from the
//!   back (latest-first order)
//!
//! Samples fed to one buffer are expected to share the same key set. This
//! is a precondition of the callers and is only checked in debug builds.

use crate::types::{Sample, Value};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, VecDeque};

/// Upper bound on the capacity reserved up front for a new field
const INITIAL_CAPACITY_LIMIT: usize = 4096;

/// Ring buffers of values, one per field
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SlidingBuffer {
    /// Maximum entries per field (`None` = unbounded)
    maxlen: Option<usize>,
    /// Field name to value history
    fields: BTreeMap<String, VecDeque<Value>>,
}

impl SlidingBuffer {
    /// Create a buffer keeping at most `maxlen` entries per field
    pub fn new(maxlen: Option<usize>) -> Self {
        Self {
            maxlen,
            fields: BTreeMap::new(),
        }
    }

    /// Create an unbounded buffer
    pub fn unbounded() -> Self {
        Self::new(None)
    }

    /// Configured maximum length
    pub fn maxlen(&self) -> Option<usize> {
        self.maxlen
    }

    /// Append a sample at the back, evicting the oldest front entry when full
    pub fn append(&mut self, sample: &Sample) {
        let maxlen = self.maxlen;
        for (name, value) in sample.iter() {
            let series = self.series_mut(name);
            if maxlen == Some(0) {
                continue;
            }
            if maxlen.is_some_and(|max| series.len() >= max) {
                series.pop_front();
            }
            series.push_back(value.clone());
        }
        debug_assert!(self.is_lockstep(), "field lengths diverged after append");
    }

    /// Append a sample at the front, evicting the oldest back entry when full
    pub fn append_front(&mut self, sample: &Sample) {
        let maxlen = self.maxlen;
        for (name, value) in sample.iter() {
            let series = self.series_mut(name);
            if maxlen == Some(0) {
                continue;
            }
            if maxlen.is_some_and(|max| series.len() >= max) {
                series.pop_back();
            }
            series.push_front(value.clone());
        }
        debug_assert!(
            self.is_lockstep(),
            "field lengths diverged after append_front"
        );
    }

    /// Append samples in input order
    pub fn extend<'a>(&mut self, samples: impl IntoIterator<Item = &'a Sample>) {
        for sample in samples {
            self.append(sample);
        }
    }

    /// Front-append samples in input order (the last input ends up first)
    pub fn extend_front<'a>(&mut self, samples: impl IntoIterator<Item = &'a Sample>) {
        for sample in samples {
            self.append_front(sample);
        }
    }

    /// Change the maximum length.
    ///
    /// Every field is rebuilt keeping at most the first `maxlen` existing
    /// entries, so growing never drops data and shrinking truncates the tail.
    pub fn set_maxlen(&mut self, maxlen: Option<usize>) {
        if maxlen == self.maxlen {
            return;
        }
        for series in self.fields.values_mut() {
            let keep = maxlen.map_or(series.len(), |max| max.min(series.len()));
            *series = series.iter().take(keep).cloned().collect();
        }
        self.maxlen = maxlen;
        debug_assert!(self.is_lockstep(), "field lengths diverged after resize");
    }

    /// Drop all values but keep field names and `maxlen`
    pub fn clear(&mut self) {
        for series in self.fields.values_mut() {
            series.clear();
        }
    }

    /// Number of entries per field
    pub fn len(&self) -> usize {
        self.fields.values().next().map_or(0, VecDeque::len)
    }

    /// Returns true if no values are buffered
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether every field holds the same number of entries
    pub fn is_lockstep(&self) -> bool {
        let mut lengths = self.fields.values().map(VecDeque::len);
        match lengths.next() {
            Some(first) => lengths.all(|len| len == first),
            None => true,
        }
    }

    /// Known field names in sorted order
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Value history of one field
    pub fn field(&self, name: &str) -> Option<&VecDeque<Value>> {
        self.fields.get(name)
    }

    /// Numeric history of one field (non-numeric entries become NaN)
    pub fn numeric(&self, name: &str) -> Option<Vec<f64>> {
        self.field(name).map(|series| {
            series
                .iter()
                .map(|v| v.as_f64().unwrap_or(f64::NAN))
                .collect()
        })
    }

    /// Minimum and maximum of the numeric entries of one field
    pub fn numeric_range(&self, name: &str) -> Option<(f64, f64)> {
        numeric_range(self.field(name)?.iter())
    }

    /// Owned copy of the current contents
    pub fn snapshot(&self) -> BufferSnapshot {
        BufferSnapshot {
            maxlen: self.maxlen,
            fields: self
                .fields
                .iter()
                .map(|(name, series)| (name.clone(), series.iter().cloned().collect()))
                .collect(),
        }
    }

    fn series_mut(&mut self, name: &str) -> &mut VecDeque<Value> {
        let capacity = self.maxlen.unwrap_or(0).min(INITIAL_CAPACITY_LIMIT);
        self.fields
            .entry(name.to_string())
            .or_insert_with(|| VecDeque::with_capacity(capacity))
    }
}

/// Minimum and maximum of the numeric values in an iterator
pub fn numeric_range<'a>(values: impl IntoIterator<Item = &'a Value>) -> Option<(f64, f64)> {
    values
        .into_iter()
        .filter_map(Value::as_f64)
        .filter(|v| !v.is_nan())
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((min, max)) => Some((min.min(v), max.max(v))),
        })
}

/// Owned, read-only copy of a [`SlidingBuffer`]
///
/// This is what crosses the thread boundary to the viewer window.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BufferSnapshot {
    /// Maximum length of the buffer the snapshot was taken from
    pub maxlen: Option<usize>,
    /// Field name to values
    pub fields: BTreeMap<String, Vec<Value>>,
}

impl BufferSnapshot {
    /// Number of entries per field
    pub fn len(&self) -> usize {
        self.fields.values().next().map_or(0, Vec::len)
    }

    /// Returns true if the snapshot holds no values
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// `[x, y]` pairs for plotting `y_field` against `x_field`.
    ///
    /// Entries where either value is not numeric are skipped.
    pub fn plot_points(&self, x_field: &str, y_field: &str) -> Vec<[f64; 2]> {
        let (Some(xs), Some(ys)) = (self.fields.get(x_field), self.fields.get(y_field)) else {
            return Vec::new();
        };
        xs.iter()
            .zip(ys)
            .filter_map(|(x, y)| Some([x.as_f64()?, y.as_f64()?]))
            .collect()
    }

    /// Minimum and maximum of the numeric entries of one field
    pub fn numeric_range(&self, name: &str) -> Option<(f64, f64)> {
        numeric_range(self.fields.get(name)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn sample(i: usize) -> Sample {
        Sample::new()
            .with("time", format!("t{}", i))
            .with("a", i as f64)
            .with("b", (i * 10) as f64)
    }

    fn numbers(buffer: &SlidingBuffer, name: &str) -> Vec<f64> {
        buffer.numeric(name).unwrap_or_default()
    }

    #[test]
    fn test_append_caps_at_maxlen() {
        let mut buffer = SlidingBuffer::new(Some(3));
        for i in 0..5 {
            buffer.append(&sample(i));
        }
        assert_eq!(buffer.len(), 3);
        assert_eq!(numbers(&buffer, "a"), vec![2.0, 3.0, 4.0]);
        assert_eq!(numbers(&buffer, "b"), vec![20.0, 30.0, 40.0]);
        assert!(buffer.is_lockstep());
    }

    #[test]
    fn test_append_front_keeps_latest_first() {
        let mut buffer = SlidingBuffer::new(Some(3));
        buffer.extend_front(&(0..5).map(sample).collect::<Vec<_>>());
        assert_eq!(numbers(&buffer, "a"), vec![4.0, 3.0, 2.0]);
        let labels: Vec<_> = buffer
            .field("time")
            .unwrap()
            .iter()
            .map(|v| v.to_string())
            .collect();
        assert_eq!(labels, vec!["t4", "t3", "t2"]);
    }

    #[test]
    fn test_unbounded_keeps_everything() {
        let mut buffer = SlidingBuffer::unbounded();
        buffer.extend(&(0..1000).map(sample).collect::<Vec<_>>());
        assert_eq!(buffer.len(), 1000);
        assert_eq!(buffer.maxlen(), None);
    }

    #[test]
    fn test_zero_maxlen_keeps_nothing() {
        let mut buffer = SlidingBuffer::new(Some(0));
        buffer.append(&sample(1));
        buffer.append_front(&sample(2));
        assert!(buffer.is_empty());
        assert_eq!(buffer.field_names().count(), 3);
    }

    #[test]
    fn test_set_maxlen_grow_keeps_data() {
        let mut buffer = SlidingBuffer::new(Some(3));
        buffer.extend(&(0..3).map(sample).collect::<Vec<_>>());
        buffer.set_maxlen(Some(10));
        assert_eq!(numbers(&buffer, "a"), vec![0.0, 1.0, 2.0]);

        buffer.append(&sample(3));
        assert_eq!(buffer.len(), 4);

        buffer.set_maxlen(None);
        assert_eq!(numbers(&buffer, "a"), vec![0.0, 1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_set_maxlen_shrink_keeps_first_entries() {
        let mut buffer = SlidingBuffer::new(None);
        buffer.extend(&(0..6).map(sample).collect::<Vec<_>>());
        buffer.set_maxlen(Some(2));
        assert_eq!(numbers(&buffer, "a"), vec![0.0, 1.0]);
        assert_eq!(numbers(&buffer, "b"), vec![0.0, 10.0]);

        // FIFO continues from the truncated contents
        buffer.append(&sample(9));
        assert_eq!(numbers(&buffer, "a"), vec![1.0, 9.0]);
    }

    #[test]
    fn test_numeric_views() {
        let mut buffer = SlidingBuffer::new(Some(5));
        buffer.append(&Sample::new().with("time", "0.5").with("a", 3.0));
        buffer.append(&Sample::new().with("time", "t1").with("a", -1.0));

        assert_eq!(buffer.numeric_range("a"), Some((-1.0, 3.0)));
        assert_eq!(buffer.numeric_range("time"), Some((0.5, 0.5)));
        let time = buffer.numeric("time").unwrap();
        assert_eq!(time[0], 0.5);
        assert!(time[1].is_nan());
        assert!(buffer.numeric("missing").is_none());
    }

    #[test]
    fn test_snapshot_plot_points() {
        let mut buffer = SlidingBuffer::new(None);
        buffer.append(&Sample::new().with("x", 1.0).with("y", 10.0));
        buffer.append(&Sample::new().with("x", "bad").with("y", 20.0));
        buffer.append(&Sample::new().with("x", 3.0).with("y", 30.0));

        let snapshot = buffer.snapshot();
        assert_eq!(snapshot.len(), 3);
        assert_eq!(
            snapshot.plot_points("x", "y"),
            vec![[1.0, 10.0], [3.0, 30.0]]
        );
        assert!(snapshot.plot_points("x", "z").is_empty());
        assert_eq!(snapshot.numeric_range("y"), Some((10.0, 30.0)));
    }

    #[test]
    fn test_clear_keeps_fields() {
        let mut buffer = SlidingBuffer::new(Some(4));
        buffer.append(&sample(0));
        buffer.clear();
        assert!(buffer.is_empty());
        assert_eq!(buffer.maxlen(), Some(4));
        assert_eq!(buffer.field_names().collect::<Vec<_>>(), vec!["a", "b", "time"]);
    }

    proptest! {
        #[test]
        fn test_length_is_count_capped_at_maxlen(
            count in 0usize..200,
            maxlen in prop::option::of(0usize..50),
            front in any::<bool>(),
        ) {
            let mut buffer = SlidingBuffer::new(maxlen);
            for i in 0..count {
                if front {
                    buffer.append_front(&sample(i));
                } else {
                    buffer.append(&sample(i));
                }
                prop_assert!(buffer.is_lockstep());
            }
            let expected = maxlen.map_or(count, |max| count.min(max));
            for name in ["time", "a", "b"] {
                let len = buffer.field(name).map_or(0, VecDeque::len);
                prop_assert_eq!(len, expected);
            }
        }

        #[test]
        fn test_fifo_keeps_most_recent(count in 1usize..150, maxlen in 1usize..40) {
            let samples: Vec<Sample> = (0..count).map(sample).collect();
            let first_kept = count.saturating_sub(maxlen);
            let expected: Vec<f64> = (first_kept..count).map(|i| i as f64).collect();

            let mut forward = SlidingBuffer::new(Some(maxlen));
            forward.extend(&samples);
            prop_assert_eq!(numbers(&forward, "a"), expected.clone());

            let mut latest_first = SlidingBuffer::new(Some(maxlen));
            latest_first.extend_front(&samples);
            let reversed: Vec<f64> = expected.into_iter().rev().collect();
            prop_assert_eq!(numbers(&latest_first, "a"), reversed);
        }

        #[test]
        fn test_set_maxlen_truncation_policy(
            count in 0usize..100,
            new_max in prop::option::of(0usize..120),
        ) {
            let mut buffer = SlidingBuffer::unbounded();
            buffer.extend(&(0..count).map(sample).collect::<Vec<_>>());
            buffer.set_maxlen(new_max);

            let keep = new_max.map_or(count, |max| max.min(count));
            let expected: Vec<f64> = (0..keep).map(|i| i as f64).collect();
            prop_assert_eq!(numbers(&buffer, "a"), expected);
            prop_assert!(buffer.is_lockstep());
        }
    }
}
