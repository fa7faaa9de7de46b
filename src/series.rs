//! A single named column: values, unified dtype, null accounting, statistics and transforms.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::error::{DataError, DataResult};
use crate::report::ColumnSummary;
use crate::types::{DataType, Value, ValueKey, dtype_name, parse_cell, unify_all};

/// How [`Series::fill_na`] computes the replacement value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FillMethod {
    Mean,
    Median,
    Mode,
}

impl FromStr for FillMethod {
    type Err = DataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mean" => Ok(FillMethod::Mean),
            "median" => Ok(FillMethod::Median),
            "mode" => Ok(FillMethod::Mode),
            _ => Err(DataError::InvalidMethod {
                kind: "fill",
                name: s.to_owned(),
                expected: "mean, median, mode",
            }),
        }
    }
}

/// How [`Series::normalize`] rescales numeric cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NormalizeMethod {
    /// `(x - mean) / std`, population standard deviation.
    ZScore,
    /// `(x - min) / (max - min)`.
    MinMax,
}

impl FromStr for NormalizeMethod {
    type Err = DataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "zscore" => Ok(NormalizeMethod::ZScore),
            "minmax" => Ok(NormalizeMethod::MinMax),
            _ => Err(DataError::InvalidMethod {
                kind: "normalize",
                name: s.to_owned(),
                expected: "zscore, minmax",
            }),
        }
    }
}

/// Element-wise arithmetic operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl BinaryOp {
    pub fn from_symbol(token: &str) -> Option<Self> {
        match token {
            "+" => Some(BinaryOp::Add),
            "-" => Some(BinaryOp::Subtract),
            "*" => Some(BinaryOp::Multiply),
            "/" => Some(BinaryOp::Divide),
            _ => None,
        }
    }

    pub fn symbol(self) -> char {
        match self {
            BinaryOp::Add => '+',
            BinaryOp::Subtract => '-',
            BinaryOp::Multiply => '*',
            BinaryOp::Divide => '/',
        }
    }

    /// Binding strength: `* /` bind tighter than `+ -`.
    pub fn precedence(self) -> u8 {
        match self {
            BinaryOp::Add | BinaryOp::Subtract => 1,
            BinaryOp::Multiply | BinaryOp::Divide => 2,
        }
    }

    /// Applies the operator to one pair of cells.
    ///
    /// Null on either side yields null. Integer `+ - *` stay integer unless they overflow;
    /// division is always float and follows IEEE semantics for zero divisors.
    pub fn apply(self, lhs: &Value, rhs: &Value, position: usize) -> DataResult<Value> {
        match (lhs, rhs) {
            (Value::Null, _) | (_, Value::Null) => Ok(Value::Null),
            (Value::Utf8(s), _) | (_, Value::Utf8(s)) => Err(DataError::InvalidOperand {
                op: self.symbol(),
                value: s.clone(),
                position,
            }),
            (Value::Int64(a), Value::Int64(b)) => Ok(self.apply_int(*a, *b)),
            _ => {
                let (a, b) = match (lhs.as_f64(), rhs.as_f64()) {
                    (Some(a), Some(b)) => (a, b),
                    _ => return Ok(Value::Null),
                };
                Ok(Value::Float64(self.apply_float(a, b)))
            }
        }
    }

    fn apply_int(self, a: i64, b: i64) -> Value {
        let exact = match self {
            BinaryOp::Add => a.checked_add(b),
            BinaryOp::Subtract => a.checked_sub(b),
            BinaryOp::Multiply => a.checked_mul(b),
            BinaryOp::Divide => None,
        };
        match exact {
            Some(v) => Value::Int64(v),
            None => Value::Float64(self.apply_float(a as f64, b as f64)),
        }
    }

    fn apply_float(self, a: f64, b: f64) -> f64 {
        match self {
            BinaryOp::Add => a + b,
            BinaryOp::Subtract => a - b,
            BinaryOp::Multiply => a * b,
            BinaryOp::Divide => a / b,
        }
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// Right-hand side of a Series arithmetic method: another column, or a scalar that is
/// broadcast to the column length.
#[derive(Debug, Clone)]
pub enum Operand<'a> {
    Series(&'a Series),
    Scalar(Value),
}

impl Operand<'_> {
    fn value_at(&self, i: usize) -> &Value {
        match self {
            Operand::Series(s) => &s.values[i],
            Operand::Scalar(v) => v,
        }
    }
}

impl<'a> From<&'a Series> for Operand<'a> {
    fn from(s: &'a Series) -> Self {
        Operand::Series(s)
    }
}

impl From<Value> for Operand<'_> {
    fn from(v: Value) -> Self {
        Operand::Scalar(v)
    }
}

impl From<i64> for Operand<'_> {
    fn from(v: i64) -> Self {
        Operand::Scalar(Value::Int64(v))
    }
}

impl From<f64> for Operand<'_> {
    fn from(v: f64) -> Self {
        Operand::Scalar(Value::Float64(v))
    }
}

/// A named column of [`Value`]s with a unified [`DataType`].
///
/// `dtype` is `None` while the column holds no non-null cell.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    label: String,
    values: Vec<Value>,
    dtype: Option<DataType>,
}

impl Series {
    /// Builds a column from raw text cells: empty cells become null, the rest are typed by
    /// detection and coerced to the unified dtype.
    pub fn from_text<I, S>(label: impl Into<String>, cells: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let values = cells.into_iter().map(|c| parse_cell(c.as_ref())).collect();
        Self::from_values(label, values)
    }

    /// Builds a column from values. Text cells are re-detected, so `"3"` becomes an integer.
    pub fn from_values(label: impl Into<String>, values: Vec<Value>) -> Self {
        let mut s = Self {
            label: label.into(),
            values,
            dtype: None,
        };
        s.refresh_dtype();
        s
    }

    /// Zero-filled integer column of length `len`.
    pub fn zeros(label: impl Into<String>, len: usize) -> Self {
        Self {
            label: label.into(),
            values: vec![Value::Int64(0); len],
            dtype: Some(DataType::Int64),
        }
    }

    /// Column of `len` copies of `value`.
    pub fn constant(label: impl Into<String>, value: Value, len: usize) -> Self {
        Self::from_values(label, vec![value; len])
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn get(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    pub fn dtype(&self) -> Option<DataType> {
        self.dtype
    }

    pub fn is_numeric(&self) -> bool {
        self.dtype.is_some_and(DataType::is_numeric)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Text cells of the column as written to CSV (null → empty string).
    pub fn to_text(&self) -> Vec<String> {
        self.values.iter().map(Value::to_string).collect()
    }

    pub(crate) fn push(&mut self, value: Value) {
        self.values.push(value);
    }

    pub(crate) fn set(&mut self, index: usize, value: Value) {
        self.values[index] = value;
    }

    pub(crate) fn remove(&mut self, index: usize) -> Value {
        self.values.remove(index)
    }

    /// Re-runs detection and unification over the whole column, then coerces cells to the
    /// unified dtype (integers widen to floats in float columns).
    pub(crate) fn refresh_dtype(&mut self) {
        for v in &mut self.values {
            if let Value::Utf8(s) = v {
                *v = parse_cell(s);
            }
        }
        self.dtype = unify_all(&self.values);
        if self.dtype == Some(DataType::Float64) {
            for v in &mut self.values {
                if let Value::Int64(i) = v {
                    *v = Value::Float64(*i as f64);
                }
            }
        }
    }

    pub fn count_null(&self) -> usize {
        self.values.iter().filter(|v| v.is_null()).count()
    }

    pub fn count_non_null(&self) -> usize {
        self.len() - self.count_null()
    }

    fn numbers(&self) -> impl Iterator<Item = f64> + '_ {
        self.values.iter().filter_map(Value::as_f64)
    }

    /// Sum of non-null cells; integer columns sum to an integer. `None` for non-numeric columns.
    pub fn sum(&self) -> Option<Value> {
        match self.dtype? {
            DataType::Int64 => {
                let total: i128 = self
                    .values
                    .iter()
                    .filter_map(|v| match v {
                        Value::Int64(i) => Some(*i as i128),
                        _ => None,
                    })
                    .sum();
                Some(match i64::try_from(total) {
                    Ok(v) => Value::Int64(v),
                    Err(_) => Value::Float64(total as f64),
                })
            }
            DataType::Float64 => Some(Value::Float64(self.numbers().sum())),
            DataType::Utf8 | DataType::Mixed => None,
        }
    }

    /// `sum / count_non_null`. NaN when there are no non-null cells.
    pub fn mean(&self) -> Option<f64> {
        if !self.is_numeric() {
            return None;
        }
        let total: f64 = self.numbers().sum();
        Some(total / self.count_non_null() as f64)
    }

    /// Population standard deviation over non-null cells.
    pub fn std(&self) -> Option<f64> {
        let mean = self.mean()?;
        let n = self.count_non_null() as f64;
        let squares: f64 = self.numbers().map(|x| (x - mean).powi(2)).sum();
        Some((squares / n).sqrt())
    }

    /// Smallest and largest non-null cell, keeping the cell type.
    pub fn minmax(&self) -> Option<(Value, Value)> {
        if !self.is_numeric() {
            return None;
        }
        let mut lo: Option<(f64, &Value)> = None;
        let mut hi: Option<(f64, &Value)> = None;
        for v in &self.values {
            let Some(x) = v.as_f64() else { continue };
            if x.is_nan() {
                continue;
            }
            if lo.is_none_or(|(m, _)| x < m) {
                lo = Some((x, v));
            }
            if hi.is_none_or(|(m, _)| x > m) {
                hi = Some((x, v));
            }
        }
        match (lo, hi) {
            (Some((_, lo)), Some((_, hi))) => Some((lo.clone(), hi.clone())),
            _ => None,
        }
    }

    /// Median by position `floor((n + 1) / 2)` into the sorted non-null cells, where `n` is the
    /// full column length including nulls.
    ///
    /// For `[1, 2, 3, 4]` this returns `3`. Fails with [`DataError::MedianOutOfRange`] when
    /// nulls push the index past the available values.
    pub fn median(&self) -> DataResult<Option<Value>> {
        if !self.is_numeric() {
            return Ok(None);
        }
        let mut present: Vec<&Value> = self.values.iter().filter(|v| !v.is_null()).collect();
        present.sort_by(|a, b| {
            let a = a.as_f64().unwrap_or(f64::NAN);
            let b = b.as_f64().unwrap_or(f64::NAN);
            a.total_cmp(&b)
        });
        let index = (self.len() + 1) / 2;
        match present.get(index) {
            Some(v) => Ok(Some((*v).clone())),
            None => Err(DataError::MedianOutOfRange {
                label: self.label.clone(),
                index,
                available: present.len(),
            }),
        }
    }

    /// Distinct values (null included) with their counts, in first-seen order.
    pub fn frequency_table(&self) -> Vec<(Value, usize)> {
        let mut slots: HashMap<ValueKey, usize> = HashMap::new();
        let mut table: Vec<(Value, usize)> = Vec::new();
        for v in &self.values {
            match slots.get(&v.key()) {
                Some(&slot) => table[slot].1 += 1,
                None => {
                    slots.insert(v.key(), table.len());
                    table.push((v.clone(), 1));
                }
            }
        }
        table
    }

    /// Most frequent non-null value and its frequency. Ties go to the value seen first.
    /// `(0, 0)` when the column has no non-null value.
    pub fn mode(&self) -> (Value, usize) {
        let mut best = (Value::Int64(0), 0);
        for (value, freq) in self.frequency_table() {
            if !value.is_null() && freq > best.1 {
                best = (value, freq);
            }
        }
        best
    }

    /// Statistics used by the `describe` command.
    ///
    /// A median that [`Self::median`] cannot produce is reported as `None`; the other
    /// statistics are still filled in.
    pub fn summary(&self) -> ColumnSummary {
        let median = self.median().unwrap_or_else(|e| {
            tracing::debug!(column = %self.label, error = %e, "median unavailable");
            None
        });
        ColumnSummary {
            label: self.label.clone(),
            dtype: self.dtype,
            length: self.len(),
            null_count: self.count_null(),
            sum: self.sum(),
            mean: self.mean(),
            median,
            std: self.std(),
            min_max: self.minmax(),
            mode: self.mode(),
        }
    }

    /// Replaces every null with one fill value cast to the column dtype. Non-numeric columns
    /// always use [`FillMethod::Mode`]. A column with no non-null cell is filled with `0`.
    ///
    /// Returns the number of cells filled.
    pub fn fill_na(&mut self, method: FillMethod) -> DataResult<usize> {
        let nulls = self.count_null();
        if nulls == 0 {
            return Ok(0);
        }

        if self.count_non_null() == 0 {
            let dtype = self.dtype.unwrap_or(DataType::Int64);
            let zero = Value::Int64(0).cast(dtype);
            self.values.fill(zero);
            self.dtype = Some(dtype);
            return Ok(nulls);
        }

        let method = if self.is_numeric() {
            method
        } else {
            if method != FillMethod::Mode {
                tracing::info!(column = %self.label, "forcing method \"mode\" for non-numeric column");
            }
            FillMethod::Mode
        };

        let fill = match method {
            FillMethod::Mean => self.mean().map(Value::Float64).unwrap_or(Value::Null),
            FillMethod::Median => self.median()?.unwrap_or(Value::Null),
            FillMethod::Mode => self.mode().0,
        };
        let fill = match self.dtype {
            Some(dtype) => fill.cast(dtype),
            None => fill,
        };

        for v in self.values.iter_mut().filter(|v| v.is_null()) {
            *v = fill.clone();
        }
        Ok(nulls)
    }

    /// Rescales non-null cells in place; nulls stay null. The dtype becomes float even when no
    /// cell changes.
    pub fn normalize(&mut self, method: NormalizeMethod) -> DataResult<()> {
        if let Some(dtype) = self.dtype.filter(|d| !d.is_numeric()) {
            return Err(DataError::NotNumeric {
                label: self.label.clone(),
                dtype: dtype.to_string(),
            });
        }

        if self.count_non_null() > 0 {
            let (offset, scale) = match method {
                NormalizeMethod::ZScore => (
                    self.mean().unwrap_or(f64::NAN),
                    self.std().unwrap_or(f64::NAN),
                ),
                NormalizeMethod::MinMax => {
                    let (lo, hi) = self.minmax().map_or((f64::NAN, f64::NAN), |(lo, hi)| {
                        (
                            lo.as_f64().unwrap_or(f64::NAN),
                            hi.as_f64().unwrap_or(f64::NAN),
                        )
                    });
                    (lo, hi - lo)
                }
            };
            for v in &mut self.values {
                if let Some(x) = v.as_f64() {
                    *v = Value::Float64((x - offset) / scale);
                }
            }
        }

        self.dtype = Some(DataType::Float64);
        Ok(())
    }

    /// Converts every cell to `dtype`; cells that cannot convert become null. The dtype is set
    /// to `dtype` regardless of how many cells converted.
    ///
    /// Returns the number of non-null cells that were lost.
    pub fn cast(&mut self, dtype: DataType) -> usize {
        let mut lost = 0;
        for v in &mut self.values {
            let next = v.cast(dtype);
            if next.is_null() && !v.is_null() {
                lost += 1;
            }
            *v = next;
        }
        self.dtype = Some(dtype);
        lost
    }

    /// Element-wise `op` against another column or a broadcast scalar.
    ///
    /// The result keeps this column's label. Its dtype is unified from scratch and the cells are
    /// coerced to it, so one overflowing integer widens the whole result to float.
    pub fn binary<'a>(&self, op: BinaryOp, rhs: impl Into<Operand<'a>>) -> DataResult<Series> {
        let rhs = rhs.into();
        if let Operand::Series(other) = &rhs {
            if other.len() != self.len() {
                return Err(DataError::LengthMismatch {
                    expected: self.len(),
                    actual: other.len(),
                });
            }
        }

        let values = self
            .values
            .iter()
            .enumerate()
            .map(|(i, lhs)| op.apply(lhs, rhs.value_at(i), i))
            .collect::<DataResult<Vec<_>>>()?;

        Ok(Series::from_values(self.label.clone(), values))
    }

    pub fn add<'a>(&self, rhs: impl Into<Operand<'a>>) -> DataResult<Series> {
        self.binary(BinaryOp::Add, rhs)
    }

    pub fn subtract<'a>(&self, rhs: impl Into<Operand<'a>>) -> DataResult<Series> {
        self.binary(BinaryOp::Subtract, rhs)
    }

    pub fn multiply<'a>(&self, rhs: impl Into<Operand<'a>>) -> DataResult<Series> {
        self.binary(BinaryOp::Multiply, rhs)
    }

    pub fn divide<'a>(&self, rhs: impl Into<Operand<'a>>) -> DataResult<Series> {
        self.binary(BinaryOp::Divide, rhs)
    }
}

impl fmt::Display for Series {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} ({})", self.label, dtype_name(self.dtype))?;
        for v in &self.values {
            match v {
                Value::Null => writeln!(f, "  null")?,
                other => writeln!(f, "  {other}")?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ints(label: &str, cells: &[&str]) -> Series {
        Series::from_text(label, cells.iter().copied())
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn from_text_infers_integer_dtype() {
        let s = ints("a", &["1", "2", "", "4"]);
        assert_eq!(s.dtype(), Some(DataType::Int64));
        assert_eq!(
            s.values(),
            &[Value::Int64(1), Value::Int64(2), Value::Null, Value::Int64(4)]
        );
        assert_eq!(s.count_null(), 1);
        assert_eq!(s.count_non_null(), 3);
    }

    #[test]
    fn mixing_integer_and_float_text_widens_to_float() {
        let s = ints("a", &["1", "2.5", "3"]);
        assert_eq!(s.dtype(), Some(DataType::Float64));
        assert_eq!(
            s.values(),
            &[Value::Float64(1.0), Value::Float64(2.5), Value::Float64(3.0)]
        );
    }

    #[test]
    fn text_with_numbers_is_mixed_and_keeps_cell_kinds() {
        let s = ints("a", &["1", "x", "2.5"]);
        assert_eq!(s.dtype(), Some(DataType::Mixed));
        assert_eq!(
            s.values(),
            &[Value::Int64(1), Value::from("x"), Value::Float64(2.5)]
        );
        assert_eq!(ints("b", &["x", "y"]).dtype(), Some(DataType::Utf8));
        assert_eq!(ints("c", &["", ""]).dtype(), None);
    }

    #[test]
    fn zeros_is_integer_scaffolding() {
        let s = Series::zeros("z", 3);
        assert_eq!(s.dtype(), Some(DataType::Int64));
        assert_eq!(s.values(), &vec![Value::Int64(0); 3][..]);
    }

    #[test]
    fn numeric_statistics_ignore_nulls() {
        let s = ints("a", &["2", "", "4", "6"]);
        assert_eq!(s.sum(), Some(Value::Int64(12)));
        assert!(approx(s.mean().unwrap(), 4.0));
        assert!(approx(s.std().unwrap(), (8.0f64 / 3.0).sqrt()));
        assert_eq!(s.minmax(), Some((Value::Int64(2), Value::Int64(6))));
    }

    #[test]
    fn statistics_are_not_applicable_to_text() {
        let s = ints("a", &["x", "y", ""]);
        assert_eq!(s.sum(), None);
        assert_eq!(s.mean(), None);
        assert_eq!(s.std(), None);
        assert_eq!(s.minmax(), None);
        assert_eq!(s.median(), Ok(None));
    }

    #[test]
    fn mean_of_an_empty_numeric_column_is_nan() {
        let mut s = ints("a", &["", ""]);
        s.cast(DataType::Float64);
        assert!(s.mean().unwrap().is_nan());
        assert_eq!(s.minmax(), None);
    }

    #[test]
    fn median_uses_position_from_full_length() {
        assert_eq!(ints("a", &["4", "1", "3", "2"]).median(), Ok(Some(Value::Int64(3))));
        assert_eq!(ints("a", &["3", "1", "2"]).median(), Ok(Some(Value::Int64(3))));
        assert_eq!(
            ints("a", &["5", "1", "", "3", "2"]).median(),
            Ok(Some(Value::Int64(5)))
        );
    }

    #[test]
    fn median_past_the_non_null_values_is_an_error() {
        let err = ints("a", &["1", "", ""]).median().unwrap_err();
        assert_eq!(
            err,
            DataError::MedianOutOfRange {
                label: "a".into(),
                index: 2,
                available: 1
            }
        );
    }

    #[test]
    fn summary_reports_missing_median_as_none() {
        let summary = ints("a", &["1", "", ""]).summary();
        assert_eq!(summary.median, None);
        assert_eq!(summary.sum, Some(Value::Int64(1)));
        assert_eq!(summary.null_count, 2);
    }

    #[test]
    fn mode_prefers_first_seen_on_ties_and_skips_null() {
        let s = ints("a", &["", "", "", "b", "a", "a"]);
        assert_eq!(s.mode(), (Value::from("a"), 2));

        let t = ints("a", &["x", "y", "y", "x"]);
        assert_eq!(t.mode(), (Value::from("x"), 2));
    }

    #[test]
    fn mode_of_all_null_is_zero_sentinel() {
        assert_eq!(ints("a", &["", ""]).mode(), (Value::Int64(0), 0));
        assert_eq!(Series::from_values("e", vec![]).mode(), (Value::Int64(0), 0));
    }

    #[test]
    fn frequency_table_counts_null_in_first_seen_order() {
        let s = ints("a", &["2", "", "2", "1", ""]);
        assert_eq!(
            s.frequency_table(),
            vec![
                (Value::Int64(2), 2),
                (Value::Null, 2),
                (Value::Int64(1), 1)
            ]
        );
    }

    #[test]
    fn fill_na_mean_casts_to_integer_dtype() {
        let mut s = ints("a", &["1", "", "2"]);
        assert_eq!(s.fill_na(FillMethod::Mean), Ok(1));
        assert_eq!(
            s.values(),
            &[Value::Int64(1), Value::Int64(1), Value::Int64(2)]
        );
        assert_eq!(s.count_null(), 0);
    }

    #[test]
    fn fill_na_on_text_forces_mode() {
        let mut s = ints("a", &["x", "", "y", "y"]);
        s.fill_na(FillMethod::Mean).unwrap();
        assert_eq!(s.values()[1], Value::from("y"));
        assert_eq!(s.dtype(), Some(DataType::Utf8));
    }

    #[test]
    fn fill_na_on_all_null_column_fills_zero() {
        let mut s = ints("a", &["", ""]);
        assert_eq!(s.fill_na(FillMethod::Median), Ok(2));
        assert_eq!(s.values(), &[Value::Int64(0), Value::Int64(0)]);
        assert_eq!(s.dtype(), Some(DataType::Int64));
    }

    #[test]
    fn fill_na_median_propagates_index_errors() {
        let mut s = ints("a", &["1", "", ""]);
        assert!(matches!(
            s.fill_na(FillMethod::Median),
            Err(DataError::MedianOutOfRange { .. })
        ));
    }

    #[test]
    fn normalize_minmax_leaves_nulls() {
        let mut s = ints("a", &["0", "", "5", "10"]);
        s.normalize(NormalizeMethod::MinMax).unwrap();
        assert_eq!(s.dtype(), Some(DataType::Float64));
        assert_eq!(
            s.values(),
            &[
                Value::Float64(0.0),
                Value::Null,
                Value::Float64(0.5),
                Value::Float64(1.0)
            ]
        );
    }

    #[test]
    fn normalize_zscore_centers_and_scales() {
        let mut s = ints("a", &["2", "4", "4", "4", "5", "5", "7", "9"]);
        s.normalize(NormalizeMethod::ZScore).unwrap();
        assert!(approx(s.mean().unwrap(), 0.0));
        assert!(approx(s.std().unwrap(), 1.0));
    }

    #[test]
    fn normalize_all_null_still_becomes_float() {
        let mut s = ints("a", &["", ""]);
        s.normalize(NormalizeMethod::ZScore).unwrap();
        assert_eq!(s.dtype(), Some(DataType::Float64));
        assert_eq!(s.count_null(), 2);
    }

    #[test]
    fn normalize_rejects_text() {
        let mut s = ints("a", &["x"]);
        assert!(matches!(
            s.normalize(NormalizeMethod::MinMax),
            Err(DataError::NotNumeric { .. })
        ));
    }

    #[test]
    fn cast_forces_dtype_and_nulls_failures() {
        let mut s = ints("a", &["1", "x", "2.5"]);
        assert_eq!(s.cast("integer".parse().unwrap()), 1);
        assert_eq!(s.dtype(), Some(DataType::Int64));
        assert_eq!(
            s.values(),
            &[Value::Int64(1), Value::Null, Value::Int64(2)]
        );
    }

    #[test]
    fn arithmetic_propagates_nulls_and_broadcasts_scalars() {
        let a = ints("a", &["1", "", "3"]);
        let b = ints("b", &["10", "20", ""]);
        let sum = a.add(&b).unwrap();
        assert_eq!(
            sum.values(),
            &[Value::Int64(11), Value::Null, Value::Null]
        );
        assert_eq!(sum.dtype(), Some(DataType::Int64));

        let scaled = a.multiply(0.5).unwrap();
        assert_eq!(
            scaled.values(),
            &[Value::Float64(0.5), Value::Null, Value::Float64(1.5)]
        );
        assert_eq!(scaled.dtype(), Some(DataType::Float64));
    }

    #[test]
    fn division_follows_float_semantics() {
        let a = ints("a", &["1", "0", "-1"]);
        let q = a.divide(0_i64).unwrap();
        assert_eq!(q.values()[0], Value::Float64(f64::INFINITY));
        assert!(matches!(q.values()[1], Value::Float64(v) if v.is_nan()));
        assert_eq!(q.values()[2], Value::Float64(f64::NEG_INFINITY));
        assert_eq!(q.dtype(), Some(DataType::Float64));
    }

    #[test]
    fn integer_overflow_promotes_to_float() {
        let a = Series::from_values("a", vec![Value::Int64(i64::MAX)]);
        let r = a.add(1_i64).unwrap();
        assert_eq!(r.values(), &[Value::Float64(i64::MAX as f64 + 1.0)]);
    }

    #[test]
    fn overflow_in_one_row_widens_every_cell() {
        let a = Series::from_values("a", vec![Value::Int64(i64::MAX), Value::Int64(1)]);
        let r = a.add(1_i64).unwrap();
        assert_eq!(r.dtype(), Some(DataType::Float64));
        assert_eq!(
            r.values(),
            &[Value::Float64(i64::MAX as f64 + 1.0), Value::Float64(2.0)]
        );
        assert_eq!(r.to_text()[1], "2.0");
    }

    #[test]
    fn arithmetic_rejects_mismatched_lengths_and_text() {
        let a = ints("a", &["1", "2"]);
        let b = ints("b", &["1"]);
        assert_eq!(
            a.subtract(&b).unwrap_err(),
            DataError::LengthMismatch {
                expected: 2,
                actual: 1
            }
        );

        let t = ints("t", &["1", "x"]);
        assert!(matches!(
            t.add(1_i64).unwrap_err(),
            DataError::InvalidOperand { op: '+', position: 1, .. }
        ));
    }

    #[test]
    fn methods_parse_from_names() {
        assert_eq!("median".parse::<FillMethod>(), Ok(FillMethod::Median));
        assert_eq!("minmax".parse::<NormalizeMethod>(), Ok(NormalizeMethod::MinMax));
        assert!(matches!(
            "avg".parse::<FillMethod>(),
            Err(DataError::InvalidMethod { kind: "fill", .. })
        ));
    }
}
