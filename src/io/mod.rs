//! CSV boundary: reading a table into a [`crate::frame::DataFrame`] and writing it back.
//!
//! Cells are read as raw text and typed by detection; nulls are written as empty fields.

pub mod csv;

pub use csv::{read_csv_from_path, read_csv_from_reader, write_csv_to_path, write_csv_to_writer};

/// Options shared by CSV reading and writing.
///
/// Use [`Default`] for comma-separated files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CsvOptions {
    /// Field delimiter byte.
    pub delimiter: u8,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self { delimiter: b',' }
    }
}
