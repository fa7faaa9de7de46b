//! CSV read/write implementation.

use std::collections::HashSet;
use std::io::{Read, Write};
use std::path::Path;

use tempfile::NamedTempFile;

use crate::error::{DataError, IngestionError, IngestionResult};
use crate::frame::{DataFrame, TextColumns};

use super::CsvOptions;

/// Read a CSV file into a [`DataFrame`].
///
/// Rules:
///
/// - The first record is the header row and must name at least one column.
/// - Header labels must be unique.
/// - Every record must have one field per header (ragged records are a CSV error).
/// - Empty fields become nulls; everything else is typed by detection.
pub fn read_csv_from_path(path: impl AsRef<Path>, options: &CsvOptions) -> IngestionResult<DataFrame> {
    let rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .delimiter(options.delimiter)
        .from_path(path)?;
    collect_frame(rdr)
}

/// Read CSV data from any byte source.
pub fn read_csv_from_reader<R: Read>(reader: R, options: &CsvOptions) -> IngestionResult<DataFrame> {
    let rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .delimiter(options.delimiter)
        .from_reader(reader);
    collect_frame(rdr)
}

fn collect_frame<R: Read>(mut rdr: csv::Reader<R>) -> IngestionResult<DataFrame> {
    let headers = rdr.headers()?.clone();
    if headers.is_empty() {
        return Err(IngestionError::HeaderMismatch {
            message: "input has no header row".to_string(),
        });
    }

    let mut seen = HashSet::with_capacity(headers.len());
    for label in headers.iter() {
        if !seen.insert(label) {
            return Err(DataError::DuplicateColumn {
                label: label.to_owned(),
            }
            .into());
        }
    }

    let mut columns: TextColumns = headers
        .iter()
        .map(|label| (label.to_owned(), Vec::new()))
        .collect();
    for result in rdr.records() {
        let record = result?;
        for ((_, cells), raw) in columns.iter_mut().zip(record.iter()) {
            cells.push(raw.to_owned());
        }
    }

    let df = DataFrame::from_text_columns(columns)?;
    tracing::debug!(rows = df.row_count(), columns = df.column_count(), "read csv");
    Ok(df)
}

/// Write `df` as CSV (header row first) to `writer`.
pub fn write_csv_to_writer<W: Write>(df: &DataFrame, writer: W, options: &CsvOptions) -> IngestionResult<()> {
    if df.is_empty() {
        return Ok(());
    }
    let mut wtr = csv::WriterBuilder::new()
        .delimiter(options.delimiter)
        .from_writer(writer);
    wtr.write_record(df.column_labels())?;
    let text: Vec<Vec<String>> = df.columns().iter().map(|s| s.to_text()).collect();
    for row in 0..df.row_count() {
        wtr.write_record(text.iter().map(|cells| cells[row].as_str()))?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write `df` as CSV to `path`, replacing any existing file only once the whole table has been
/// written.
///
/// The data goes to a temporary file in the destination directory first, which is then renamed
/// over `path`.
pub fn write_csv_to_path(df: &DataFrame, path: impl AsRef<Path>, options: &CsvOptions) -> IngestionResult<()> {
    let path = path.as_ref();
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir)?;
    write_csv_to_writer(df, tmp.as_file_mut(), options)?;
    tmp.persist(path).map_err(|e| e.error)?;
    tracing::debug!(path = %path.display(), rows = df.row_count(), "wrote csv");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{DataType, Value};

    fn read(text: &str) -> IngestionResult<DataFrame> {
        read_csv_from_reader(text.as_bytes(), &CsvOptions::default())
    }

    fn write(df: &DataFrame) -> String {
        let mut out = Vec::new();
        write_csv_to_writer(df, &mut out, &CsvOptions::default()).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn reads_and_types_columns() {
        let df = read("id,score,name\n1,2.5,ann\n2,,bob\n").unwrap();
        assert_eq!(df.shape(), (2, 3));
        assert_eq!(df.column("id").unwrap().dtype(), Some(DataType::Int64));
        assert_eq!(df.column("score").unwrap().dtype(), Some(DataType::Float64));
        assert_eq!(df.column("name").unwrap().dtype(), Some(DataType::Utf8));
        assert_eq!(df.column("score").unwrap().values()[1], Value::Null);
    }

    #[test]
    fn header_only_input_gives_empty_columns() {
        let df = read("a,b\n").unwrap();
        assert_eq!(df.shape(), (0, 2));
        assert_eq!(df.column("a").unwrap().dtype(), None);
    }

    #[test]
    fn empty_input_is_header_mismatch() {
        assert!(matches!(read(""), Err(IngestionError::HeaderMismatch { .. })));
    }

    #[test]
    fn duplicate_headers_are_rejected() {
        let err = read("a,a\n1,2\n").unwrap_err();
        assert!(matches!(
            err,
            IngestionError::Data(DataError::DuplicateColumn { ref label }) if label == "a"
        ));
    }

    #[test]
    fn ragged_records_are_csv_errors() {
        assert!(matches!(read("a,b\n1,2\n3\n"), Err(IngestionError::Csv(_))));
    }

    #[test]
    fn custom_delimiter_reads_and_writes() {
        let opts = CsvOptions { delimiter: b';' };
        let df = read_csv_from_reader("a;b\n1;x\n".as_bytes(), &opts).unwrap();
        let mut out = Vec::new();
        write_csv_to_writer(&df, &mut out, &opts).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "a;b\n1;x\n");
    }

    #[test]
    fn nulls_write_as_empty_and_floats_keep_fraction() {
        let df = read("a,b\n1,3\n,4.5\n").unwrap();
        assert_eq!(write(&df), "a,b\n1,3.0\n,4.5\n");
    }

    #[test]
    fn empty_frame_writes_nothing() {
        assert_eq!(write(&DataFrame::new()), "");
    }

    #[test]
    fn path_write_replaces_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out.csv");
        std::fs::write(&out, "stale\n").unwrap();

        let df = read("x\n7\n").unwrap();
        write_csv_to_path(&df, &out, &CsvOptions::default()).unwrap();
        assert_eq!(std::fs::read_to_string(&out).unwrap(), "x\n7\n");
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }
}
