//! Common test utilities and helpers

#![allow(dead_code)] // Test utilities may not all be used in every test file

pub mod builders;

use std::path::{Path, PathBuf};

/// Assert two floats are approximately equal
pub fn assert_float_eq(a: f64, b: f64, epsilon: f64) {
    assert!(
        (a - b).abs() < epsilon,
        "Expected {} to be approximately equal to {} (epsilon: {})",
        a,
        b,
        epsilon
    );
}

/// Write a log file the way the log sink lays it out
pub fn write_log(dir: &Path, name: &str, columns: &[&str], rows: &[&str]) -> PathBuf {
    let path = dir.join(name);
    let mut content = format!("# 2024-05-01 12:00:00.000000\n#{}\n", columns.join("\t"));
    for row in rows {
        content.push_str(row);
        content.push('\n');
    }
    std::fs::write(&path, content).expect("write log fixture");
    path
}

/// Data lines of a log file, headers stripped
pub fn data_lines(path: &Path) -> Vec<String> {
    std::fs::read_to_string(path)
        .expect("read log")
        .lines()
        .filter(|line| !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}
