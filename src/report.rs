//! Structured results of the reporting commands.
//!
//! Computation lives on [`crate::series::Series`] and [`crate::frame::DataFrame`]; these types
//! only carry the numbers. `Display` renders them for terminals and `serde` serializes them for
//! `--json` output.

use std::fmt;

use serde::Serialize;

use crate::types::{DataType, Value, dtype_name};

/// Statistics of one column (the `describe` command).
///
/// Numeric-only fields are `None` when the column is not numeric.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnSummary {
    pub label: String,
    pub dtype: Option<DataType>,
    pub length: usize,
    pub null_count: usize,
    pub sum: Option<Value>,
    pub mean: Option<f64>,
    pub median: Option<Value>,
    pub std: Option<f64>,
    pub min_max: Option<(Value, Value)>,
    /// Most frequent non-null value and its frequency; `(0, 0)` when there is none.
    pub mode: (Value, usize),
}

fn round4(v: f64) -> f64 {
    (v * 10_000.0).round() / 10_000.0
}

fn show_value(v: &Value) -> String {
    match v {
        Value::Null => "null".to_string(),
        Value::Float64(f) => round4(*f).to_string(),
        other => other.to_string(),
    }
}

fn show<T>(v: Option<T>, render: impl Fn(T) -> String) -> String {
    v.map(render).unwrap_or_else(|| "n/a".to_string())
}

impl fmt::Display for ColumnSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Type:         {}", dtype_name(self.dtype))?;
        writeln!(f, "Length:       {}", self.length)?;
        writeln!(f, "Null values:  {}", self.null_count)?;
        writeln!(f, "Label:        {}", self.label)?;
        writeln!(f, "Sum:          {}", show(self.sum.as_ref(), show_value))?;
        writeln!(f, "Mean:         {}", show(self.mean, |v| round4(v).to_string()))?;
        writeln!(f, "Median:       {}", show(self.median.as_ref(), show_value))?;
        writeln!(f, "Std:          {}", show(self.std, |v| round4(v).to_string()))?;
        writeln!(
            f,
            "Min-Max:      {}",
            show(self.min_max.as_ref(), |(lo, hi)| format!(
                "({}, {})",
                show_value(lo),
                show_value(hi)
            ))
        )?;
        write!(
            f,
            "Mode:         ({}, {})",
            show_value(&self.mode.0),
            self.mode.1
        )
    }
}

/// Per-column null counts, in column order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NullCounts {
    pub columns: Vec<(String, usize)>,
}

impl NullCounts {
    /// Sum of nulls across all columns.
    pub fn total(&self) -> usize {
        self.columns.iter().map(|(_, n)| n).sum()
    }

    /// Count for one column, if present.
    pub fn get(&self, label: &str) -> Option<usize> {
        self.columns
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, n)| *n)
    }

    /// Only the columns that contain at least one null.
    pub fn with_nulls(&self) -> impl Iterator<Item = (&str, usize)> {
        self.columns
            .iter()
            .filter(|(_, n)| *n > 0)
            .map(|(l, n)| (l.as_str(), *n))
    }
}

impl fmt::Display for NullCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self.with_nulls().map(|(l, _)| l.len()).max().unwrap_or(0);
        for (label, n) in self.with_nulls() {
            writeln!(f, "{label:<width$}\t{n}")?;
        }
        write!(f, "\nTotal null values: {}", self.total())
    }
}

/// Column labels with their detected dtype.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnListing {
    pub columns: Vec<(String, Option<DataType>)>,
}

impl fmt::Display for ColumnListing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self.columns.iter().map(|(l, _)| l.len()).max().unwrap_or(0) + 2;
        for (label, dtype) in &self.columns {
            writeln!(f, "{label:<width$}\t{}", dtype_name(*dtype))?;
        }
        write!(f, "Total: {} columns.", self.columns.len())
    }
}
