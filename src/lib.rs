//! `rust-data-cleansing` is a small library (and the `cleanse` CLI) for cleaning tabular CSV data
//! in memory.
//!
//! A CSV file is read into a [`frame::DataFrame`] of labelled [`series::Series`] columns. Every
//! cell is typed by detection (no schema is needed) and each column carries a dtype unified from
//! its cells. The frame then supports the usual cleansing steps: null reports, filling nulls,
//! dropping sparse rows/columns, removing duplicate rows, normalizing a column and evaluating
//! columnar arithmetic expressions.
//!
//! ## Type detection
//!
//! - Empty cells are [`types::Value::Null`].
//! - `^[+-]?[0-9]+$` is an integer ([`types::DataType::Int64`]).
//! - `^[+-]?([0-9]+\.[0-9]*|[0-9]*\.[0-9]+)$` is a float ([`types::DataType::Float64`]).
//! - Anything else is text ([`types::DataType::Utf8`]).
//!
//! Integer and float cells in one column make a float column. Text together with numbers makes a
//! [`types::DataType::Mixed`] column. A column of nulls only has no dtype.
//!
//! ## Quick example: read, clean, write
//!
//! ```no_run
//! use rust_data_cleansing::frame::Axis;
//! use rust_data_cleansing::io::{read_csv_from_path, write_csv_to_path, CsvOptions};
//! use rust_data_cleansing::series::FillMethod;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let opts = CsvOptions::default();
//! let mut df = read_csv_from_path("data.csv", &opts)?;
//! df.drop_na(Axis::Columns, 0.5)?;
//! df.column_mut("age")?.fill_na(FillMethod::Median)?;
//! write_csv_to_path(&df.drop_duplicates(), "data.clean.csv", &opts)?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Expressions
//!
//! Tokens are separated by whitespace; `+ - * /` follow the usual precedence and parentheses
//! group. Nulls propagate through every operator.
//!
//! ```rust
//! use rust_data_cleansing::expr::SeriesExpression;
//! use rust_data_cleansing::frame::DataFrame;
//! use rust_data_cleansing::types::Value;
//!
//! let df = DataFrame::from_text_columns(vec![
//!     ("price".to_string(), vec!["2".to_string(), "".to_string()]),
//!     ("qty".to_string(), vec!["3".to_string(), "4".to_string()]),
//! ])
//! .unwrap();
//!
//! let expr = SeriesExpression::parse("price * qty + 1", &df).unwrap();
//! assert_eq!(expr.postfix_string(), "price qty * 1 +");
//!
//! let total = expr.evaluate().unwrap();
//! assert_eq!(total.values(), &[Value::Int64(7), Value::Null]);
//! ```
//!
//! ## Modules
//!
//! - [`types`]: cell values, column dtypes and type detection
//! - [`series`]: a labelled column with statistics, null filling, normalization and arithmetic
//! - [`frame`]: the table of columns with row access and row/column transforms
//! - [`expr`]: infix column expressions (shunting-yard to postfix, then evaluation)
//! - [`io`]: CSV read/write
//! - [`report`]: serializable report values with terminal rendering
//! - [`session`]: the command controller with observer hooks, used by the `cleanse` binary
//! - [`error`]: error types for each layer

pub mod error;
pub mod expr;
pub mod frame;
pub mod io;
pub mod report;
pub mod series;
pub mod session;
pub mod types;

pub use error::{DataError, DataResult, IngestionError, IngestionResult, SessionError, SessionResult};
pub use frame::DataFrame;
pub use series::Series;
