//! Column-major table of equally long [`Series`].

use std::collections::HashSet;

use crate::error::{DataError, DataResult};
use crate::report::{ColumnListing, NullCounts};
use crate::series::Series;
use crate::types::{Value, ValueKey};

/// Column-major text table: `(label, cells)` pairs in column order, all of equal length.
///
/// This is the shape exchanged with the CSV boundary in [`crate::io`].
pub type TextColumns = Vec<(String, Vec<String>)>;

/// Direction for [`DataFrame::drop_na`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    /// Axis 0: evaluate and drop rows.
    Rows,
    /// Axis 1: evaluate and drop columns.
    Columns,
}

impl TryFrom<i64> for Axis {
    type Error = DataError;

    fn try_from(v: i64) -> Result<Self, Self::Error> {
        match v {
            0 => Ok(Axis::Rows),
            1 => Ok(Axis::Columns),
            other => Err(DataError::InvalidAxis(other)),
        }
    }
}

/// An ordered collection of [`Series`] sharing one row count.
///
/// Insertion order is the column order. Labels are unique.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataFrame {
    columns: Vec<Series>,
}

impl DataFrame {
    /// Empty frame with shape `(0, 0)`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a frame from columns, checking label uniqueness and equal lengths.
    pub fn from_columns(columns: Vec<Series>) -> DataResult<Self> {
        let mut df = Self::new();
        for s in columns {
            df.append_column(s)?;
        }
        Ok(df)
    }

    /// Builds a frame from column-major raw text; every column is typed by detection.
    pub fn from_text_columns(columns: TextColumns) -> DataResult<Self> {
        Self::from_columns(
            columns
                .into_iter()
                .map(|(label, cells)| Series::from_text(label, cells))
                .collect(),
        )
    }

    /// Column-major text view; nulls become empty strings.
    pub fn to_text_columns(&self) -> TextColumns {
        self.columns
            .iter()
            .map(|s| (s.label().to_owned(), s.to_text()))
            .collect()
    }

    /// `(row_count, column_count)`; `(0, 0)` for a frame without columns.
    pub fn shape(&self) -> (usize, usize) {
        (self.row_count(), self.column_count())
    }

    pub fn row_count(&self) -> usize {
        self.columns.first().map_or(0, Series::len)
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn columns(&self) -> &[Series] {
        &self.columns
    }

    pub fn column_labels(&self) -> Vec<&str> {
        self.columns.iter().map(Series::label).collect()
    }

    fn position(&self, label: &str) -> DataResult<usize> {
        self.columns
            .iter()
            .position(|s| s.label() == label)
            .ok_or_else(|| DataError::ColumnNotFound {
                label: label.to_owned(),
            })
    }

    /// Column by label.
    pub fn column(&self, label: &str) -> DataResult<&Series> {
        let idx = self.position(label)?;
        Ok(&self.columns[idx])
    }

    /// Mutable column by label, for in-place transforms (`fill_na`, `normalize`, `cast`).
    pub fn column_mut(&mut self, label: &str) -> DataResult<&mut Series> {
        let idx = self.position(label)?;
        Ok(&mut self.columns[idx])
    }

    pub fn columns_mut(&mut self) -> impl Iterator<Item = &mut Series> {
        self.columns.iter_mut()
    }

    /// Replaces the column `label` with `series`, which takes over the label.
    ///
    /// The replacement's dtype is re-derived over the whole column.
    pub fn set_column(&mut self, label: &str, series: Series) -> DataResult<()> {
        let idx = self.position(label)?;
        if series.len() != self.row_count() {
            return Err(DataError::LengthMismatch {
                expected: self.row_count(),
                actual: series.len(),
            });
        }
        let mut series = series.with_label(label);
        series.refresh_dtype();
        self.columns[idx] = series;
        self.validate()
    }

    /// Appends a column. Its length must match the row count unless the frame has no columns.
    pub fn append_column(&mut self, series: Series) -> DataResult<()> {
        if self.columns.iter().any(|s| s.label() == series.label()) {
            return Err(DataError::DuplicateColumn {
                label: series.label().to_owned(),
            });
        }
        if !self.is_empty() && series.len() != self.row_count() {
            return Err(DataError::LengthMismatch {
                expected: self.row_count(),
                actual: series.len(),
            });
        }
        self.columns.push(series);
        self.validate()
    }

    fn check_width(&self, row: &[Value]) -> DataResult<()> {
        if row.len() != self.column_count() {
            return Err(DataError::RowWidthMismatch {
                expected: self.column_count(),
                actual: row.len(),
            });
        }
        Ok(())
    }

    fn check_index(&self, index: usize) -> DataResult<()> {
        if index >= self.row_count() {
            return Err(DataError::RowOutOfRange {
                index,
                row_count: self.row_count(),
            });
        }
        Ok(())
    }

    /// Materializes row `index` (one value per column, in column order).
    pub fn get_row(&self, index: usize) -> DataResult<Vec<Value>> {
        self.check_index(index)?;
        Ok(self.columns.iter().map(|s| s.values()[index].clone()).collect())
    }

    /// Overwrites row `index`; every touched column re-derives its dtype.
    pub fn set_row(&mut self, index: usize, row: Vec<Value>) -> DataResult<()> {
        self.check_width(&row)?;
        self.check_index(index)?;
        for (s, v) in self.columns.iter_mut().zip(row) {
            s.set(index, v);
            s.refresh_dtype();
        }
        self.validate()
    }

    /// Appends a row; every column re-derives its dtype.
    pub fn append_row(&mut self, row: Vec<Value>) -> DataResult<()> {
        self.check_width(&row)?;
        for (s, v) in self.columns.iter_mut().zip(row) {
            s.push(v);
            s.refresh_dtype();
        }
        self.validate()
    }

    /// Removes row `index` from every column. The index is checked before anything is removed.
    pub fn delete_row(&mut self, index: usize) -> DataResult<Vec<Value>> {
        self.check_index(index)?;
        let removed = self
            .columns
            .iter_mut()
            .map(|s| {
                let v = s.remove(index);
                s.refresh_dtype();
                v
            })
            .collect();
        self.validate()?;
        Ok(removed)
    }

    /// Iterates materialized rows in order.
    pub fn rows(&self) -> impl Iterator<Item = Vec<Value>> + '_ {
        (0..self.row_count()).map(move |i| {
            self.columns
                .iter()
                .map(|s| s.values()[i].clone())
                .collect()
        })
    }

    fn row_has_null(&self, index: usize) -> bool {
        self.columns.iter().any(|s| s.values()[index].is_null())
    }

    fn row_null_ratio(&self, index: usize) -> f64 {
        let nulls = self
            .columns
            .iter()
            .filter(|s| s.values()[index].is_null())
            .count();
        nulls as f64 / self.column_count() as f64
    }

    /// Null count of every column, in column order.
    pub fn count_na(&self) -> NullCounts {
        NullCounts {
            columns: self
                .columns
                .iter()
                .map(|s| (s.label().to_owned(), s.count_null()))
                .collect(),
        }
    }

    /// Number of rows with at least one null cell.
    pub fn count_na_rows(&self) -> usize {
        (0..self.row_count()).filter(|&i| self.row_has_null(i)).count()
    }

    /// Column labels with their dtypes.
    pub fn list_columns(&self) -> ColumnListing {
        ColumnListing {
            columns: self
                .columns
                .iter()
                .map(|s| (s.label().to_owned(), s.dtype()))
                .collect(),
        }
    }

    /// Drops rows ([`Axis::Rows`]) or columns ([`Axis::Columns`]) whose null fraction is at least
    /// `threshold`. Returns how many rows or columns were dropped.
    ///
    /// `threshold` must be within `[0, 1]`.
    pub fn drop_na(&mut self, axis: Axis, threshold: f64) -> DataResult<usize> {
        if !(0.0..=1.0).contains(&threshold) {
            return Err(DataError::InvalidThreshold(threshold));
        }
        match axis {
            Axis::Rows => self.drop_na_rows(threshold),
            Axis::Columns => Ok(self.drop_na_columns(threshold)),
        }
    }

    fn drop_na_rows(&mut self, threshold: f64) -> DataResult<usize> {
        let doomed: Vec<usize> = (0..self.row_count())
            .filter(|&i| self.row_null_ratio(i) >= threshold)
            .collect();
        // Highest index first so earlier positions stay valid.
        for &i in doomed.iter().rev() {
            for s in &mut self.columns {
                s.remove(i);
            }
        }
        for s in &mut self.columns {
            s.refresh_dtype();
        }
        self.validate()?;
        Ok(doomed.len())
    }

    fn drop_na_columns(&mut self, threshold: f64) -> usize {
        let before = self.columns.len();
        self.columns.retain(|s| {
            let ratio = s.count_null() as f64 / s.len() as f64;
            let drop = ratio >= threshold;
            if drop {
                tracing::info!(column = s.label(), null_ratio = ratio, "dropped column");
            }
            !drop
        });
        before - self.columns.len()
    }

    /// New frame keeping only the first occurrence of each distinct row.
    ///
    /// Rows compare by their full value tuple in column order; null equals null. `self` is
    /// left untouched.
    pub fn drop_duplicates(&self) -> DataFrame {
        let mut seen: HashSet<Vec<ValueKey>> = HashSet::new();
        let mut kept: Vec<Vec<Value>> = vec![Vec::new(); self.column_count()];
        let mut duplicates = 0usize;

        for row in self.rows() {
            let key: Vec<ValueKey> = row.iter().map(Value::key).collect();
            if seen.insert(key) {
                for (col, v) in kept.iter_mut().zip(row) {
                    col.push(v);
                }
            } else {
                duplicates += 1;
            }
        }
        tracing::debug!(duplicates, "dropped duplicate rows");

        let columns = self
            .columns
            .iter()
            .zip(kept)
            .map(|(s, values)| Series::from_values(s.label(), values))
            .collect();
        DataFrame { columns }
    }

    /// Checks that every column has the same length.
    pub fn validate(&self) -> DataResult<()> {
        let expected = self.row_count();
        match self.columns.iter().find(|s| s.len() != expected) {
            Some(s) => Err(DataError::LengthMismatch {
                expected,
                actual: s.len(),
            }),
            None => Ok(()),
        }
    }
}
