//! Command controller.
//!
//! A [`Session`] owns the table read from one CSV input and exposes the cleansing commands:
//! reports (`describe`, null counts, column listing) and transforms (`fill_na`, `drop_na`,
//! `drop_duplicates`, `normalize`, `evaluate`), plus writing the result back out.
//!
//! If a [`CommandObserver`] is configured in [`SessionOptions`], every command reports its
//! outcome to it:
//!
//! - `on_success` with the shape of the resulting table
//! - `on_failure` with a computed severity
//! - `on_alert` when that severity is >= [`SessionOptions::alert_at_or_above`]
//!
//! # Examples
//!
//! ```no_run
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! use rust_data_cleansing::series::FillMethod;
//! use rust_data_cleansing::session::{CommandSeverity, Session, SessionOptions, StdErrObserver};
//!
//! # fn main() -> Result<(), rust_data_cleansing::SessionError> {
//! let opts = SessionOptions {
//!     observer: Some(Arc::new(StdErrObserver)),
//!     alert_at_or_above: CommandSeverity::Error,
//!     ..Default::default()
//! };
//!
//! let mut session = Session::open("people.csv", opts)?;
//! let filled = session.fill_na(FillMethod::Median, None)?;
//! println!("filled {filled} cells");
//! session.write(Some(Path::new("people.clean.csv")))?;
//! # Ok(())
//! # }
//! ```

pub mod observability;

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::{IngestionError, SessionError, SessionResult};
use crate::expr::SeriesExpression;
use crate::frame::{Axis, DataFrame};
use crate::io::{CsvOptions, read_csv_from_path, write_csv_to_path, write_csv_to_writer};
use crate::report::{ColumnListing, ColumnSummary, NullCounts};
use crate::series::{FillMethod, NormalizeMethod, Series};

pub use observability::{
    CommandContext, CommandKind, CommandObserver, CommandSeverity, CommandStats, CompositeObserver,
    FileObserver, StdErrObserver,
};

/// Label given to the result of [`Session::evaluate`] when none is requested.
pub const DEFAULT_OUTPUT_LABEL: &str = "out";

/// Options controlling a [`Session`].
///
/// Use [`Default`] for common cases.
#[derive(Clone)]
pub struct SessionOptions {
    /// Delimiter used for both reading and writing.
    pub csv: CsvOptions,
    /// Optional observer for logging/alerts.
    pub observer: Option<Arc<dyn CommandObserver>>,
    /// Severity threshold at which `on_alert` is invoked.
    pub alert_at_or_above: CommandSeverity,
}

impl fmt::Debug for SessionOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionOptions")
            .field("csv", &self.csv)
            .field("observer_set", &self.observer.is_some())
            .field("alert_at_or_above", &self.alert_at_or_above)
            .finish()
    }
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            csv: CsvOptions::default(),
            observer: None,
            alert_at_or_above: CommandSeverity::Critical,
        }
    }
}

/// One loaded table plus the options its commands run with.
#[derive(Debug, Clone)]
pub struct Session {
    frame: DataFrame,
    input: Option<PathBuf>,
    options: SessionOptions,
}

impl Session {
    /// Reads `path` as CSV and opens a session over it.
    pub fn open(path: impl AsRef<Path>, options: SessionOptions) -> SessionResult<Self> {
        let path = path.as_ref();
        let ctx = CommandContext {
            command: CommandKind::Open,
            input: Some(path.to_path_buf()),
        };
        let result = read_csv_from_path(path, &options.csv).map_err(SessionError::from);
        match &result {
            Ok(df) => notify(&options, &ctx, Ok(df.shape())),
            Err(e) => notify(&options, &ctx, Err(e)),
        }
        Ok(Self {
            frame: result?,
            input: ctx.input,
            options,
        })
    }

    /// Opens a session over an in-memory frame.
    pub fn from_frame(frame: DataFrame, options: SessionOptions) -> Self {
        Self {
            frame,
            input: None,
            options,
        }
    }

    pub fn frame(&self) -> &DataFrame {
        &self.frame
    }

    pub fn into_frame(self) -> DataFrame {
        self.frame
    }

    pub fn input(&self) -> Option<&Path> {
        self.input.as_deref()
    }

    pub fn options(&self) -> &SessionOptions {
        &self.options
    }

    pub fn shape(&self) -> (usize, usize) {
        self.frame.shape()
    }

    /// Statistics of one column.
    pub fn describe(&self, label: &str) -> SessionResult<ColumnSummary> {
        let result = self
            .frame
            .column(label)
            .map(Series::summary)
            .map_err(SessionError::from);
        self.finish(CommandKind::Describe, result, |_| self.frame.shape())
    }

    /// Null count of every column.
    pub fn count_na_columns(&self) -> NullCounts {
        let counts = self.frame.count_na();
        self.succeed(CommandKind::CountNa, self.frame.shape());
        counts
    }

    /// Number of rows holding at least one null.
    pub fn count_na_rows(&self) -> usize {
        let n = self.frame.count_na_rows();
        self.succeed(CommandKind::CountNa, self.frame.shape());
        n
    }

    pub fn list_columns(&self) -> ColumnListing {
        let listing = self.frame.list_columns();
        self.succeed(CommandKind::ListColumns, self.frame.shape());
        listing
    }

    /// Fills the nulls of `column`, or of every column when `None`, returning the number of
    /// cells filled.
    ///
    /// Non-numeric columns are always filled with their mode. When every column is processed
    /// the frame is only updated if all of them succeed.
    pub fn fill_na(&mut self, method: FillMethod, column: Option<&str>) -> SessionResult<usize> {
        let result = match column {
            Some(label) => self
                .frame
                .column_mut(label)
                .and_then(|s| s.fill_na(method))
                .map_err(SessionError::from),
            None => {
                let mut staged = self.frame.clone();
                let filled = staged
                    .columns_mut()
                    .try_fold(0, |acc, s| s.fill_na(method).map(|n| acc + n))
                    .map_err(SessionError::from);
                if filled.is_ok() {
                    self.frame = staged;
                }
                filled
            }
        };
        self.finish(CommandKind::FillNa, result, |_| self.frame.shape())
    }

    /// Drops rows or columns whose null ratio is at or above `threshold`; returns how many
    /// were removed.
    pub fn drop_na(&mut self, axis: Axis, threshold: f64) -> SessionResult<usize> {
        let result = self
            .frame
            .drop_na(axis, threshold)
            .map_err(SessionError::from);
        self.finish(CommandKind::DropNa, result, |_| self.frame.shape())
    }

    /// New frame keeping the first occurrence of every distinct row.
    pub fn drop_duplicates(&self) -> DataFrame {
        let unique = self.frame.drop_duplicates();
        self.succeed(CommandKind::DropDuplicates, unique.shape());
        unique
    }

    /// Normalizes one numeric column in place.
    pub fn normalize(&mut self, method: NormalizeMethod, column: &str) -> SessionResult<()> {
        let result = self
            .frame
            .column_mut(column)
            .and_then(|s| s.normalize(method))
            .map_err(SessionError::from);
        self.finish(CommandKind::Normalize, result, |_| self.frame.shape())
    }

    /// Evaluates `expression` over the table into a one-column frame labelled `label`
    /// (or [`DEFAULT_OUTPUT_LABEL`]).
    pub fn evaluate(&self, expression: &str, label: Option<&str>) -> SessionResult<DataFrame> {
        let result = SeriesExpression::parse(expression, &self.frame)
            .and_then(|e| e.evaluate())
            .and_then(|s| DataFrame::from_columns(vec![s.with_label(label.unwrap_or(DEFAULT_OUTPUT_LABEL))]))
            .map_err(SessionError::from);
        self.finish(CommandKind::Evaluate, result, DataFrame::shape)
    }

    /// Writes the session's table to `out`, or to stdout when `None`.
    pub fn write(&self, out: Option<&Path>) -> SessionResult<()> {
        self.write_frame(&self.frame, out)
    }

    /// Writes `frame` (typically the result of [`Self::drop_duplicates`] or [`Self::evaluate`])
    /// with this session's CSV options.
    pub fn write_frame(&self, frame: &DataFrame, out: Option<&Path>) -> SessionResult<()> {
        let result = match out {
            Some(path) => write_csv_to_path(frame, path, &self.options.csv),
            None => write_csv_to_writer(frame, io::stdout().lock(), &self.options.csv),
        }
        .map_err(SessionError::from);
        self.finish(CommandKind::Write, result, |_| frame.shape())
    }

    fn context(&self, command: CommandKind) -> CommandContext {
        CommandContext {
            command,
            input: self.input.clone(),
        }
    }

    fn succeed(&self, command: CommandKind, shape: (usize, usize)) {
        notify(&self.options, &self.context(command), Ok(shape));
    }

    fn finish<T>(
        &self,
        command: CommandKind,
        result: SessionResult<T>,
        shape: impl FnOnce(&T) -> (usize, usize),
    ) -> SessionResult<T> {
        let ctx = self.context(command);
        match &result {
            Ok(v) => notify(&self.options, &ctx, Ok(shape(v))),
            Err(e) => notify(&self.options, &ctx, Err(e)),
        }
        result
    }
}

fn notify(options: &SessionOptions, ctx: &CommandContext, outcome: Result<(usize, usize), &SessionError>) {
    let Some(obs) = options.observer.as_ref() else {
        return;
    };
    match outcome {
        Ok((rows, columns)) => obs.on_success(ctx, CommandStats { rows, columns }),
        Err(e) => {
            let sev = severity_for_error(e);
            obs.on_failure(ctx, sev, e);
            if sev >= options.alert_at_or_above {
                obs.on_alert(ctx, sev, e);
            }
        }
    }
}

fn severity_for_error(e: &SessionError) -> CommandSeverity {
    match e {
        SessionError::Ingestion(IngestionError::Io(_)) => CommandSeverity::Critical,
        SessionError::Ingestion(IngestionError::Csv(err)) => match err.kind() {
            ::csv::ErrorKind::Io(_) => CommandSeverity::Critical,
            _ => CommandSeverity::Error,
        },
        SessionError::Ingestion(IngestionError::HeaderMismatch { .. })
        | SessionError::Ingestion(IngestionError::Data(_))
        | SessionError::Data(_) => CommandSeverity::Error,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DataError;
    use crate::types::Value;

    fn session() -> Session {
        let df = DataFrame::from_text_columns(vec![
            ("a".into(), vec!["1".into(), "".into(), "3".into()]),
            ("b".into(), vec!["x".into(), "".into(), "x".into()]),
        ])
        .unwrap();
        Session::from_frame(df, SessionOptions::default())
    }

    #[test]
    fn fill_all_columns_forces_mode_on_text() {
        let mut s = session();
        assert_eq!(s.fill_na(FillMethod::Mean, None).unwrap(), 2);
        assert_eq!(s.frame().column("a").unwrap().values()[1], Value::Int64(2));
        assert_eq!(s.frame().column("b").unwrap().values()[1], Value::from("x"));
    }

    #[test]
    fn failed_fill_leaves_frame_untouched() {
        let cells = |xs: &[&str]| xs.iter().map(|x| x.to_string()).collect::<Vec<_>>();
        let df = DataFrame::from_text_columns(vec![
            ("a".into(), cells(&["1", "2", "3", ""])),
            ("b".into(), cells(&["1", "", "", ""])),
        ])
        .unwrap();
        let mut s = Session::from_frame(df.clone(), SessionOptions::default());
        // "a" fills fine, but the median index 2 of "b" points past its single value.
        let err = s.fill_na(FillMethod::Median, None).unwrap_err();
        assert!(matches!(err, SessionError::Data(DataError::MedianOutOfRange { .. })));
        assert_eq!(s.frame(), &df);
    }

    #[test]
    fn evaluate_defaults_output_label() {
        let s = session();
        let out = s.evaluate("a * 2", None).unwrap();
        assert_eq!(out.column_labels(), vec![DEFAULT_OUTPUT_LABEL]);
        let out = s.evaluate("a * 2", Some("double")).unwrap();
        assert_eq!(out.column_labels(), vec!["double"]);
        assert_eq!(
            out.column("double").unwrap().values(),
            &[Value::Int64(2), Value::Null, Value::Int64(6)]
        );
    }

    #[test]
    fn normalize_text_column_is_not_numeric() {
        let mut s = session();
        assert!(matches!(
            s.normalize(NormalizeMethod::ZScore, "b"),
            Err(SessionError::Data(DataError::NotNumeric { .. }))
        ));
    }

    #[test]
    fn io_errors_are_critical() {
        let io_err = SessionError::from(IngestionError::Io(io::Error::other("boom")));
        assert_eq!(severity_for_error(&io_err), CommandSeverity::Critical);
        let data = SessionError::from(DataError::InvalidAxis(3));
        assert_eq!(severity_for_error(&data), CommandSeverity::Error);
    }
}
