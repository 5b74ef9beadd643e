//! CSV dialects used by the repository.
//!
//! All tables are comma-delimited with a header row. Dataset tables are read
//! strictly: a row with more fields than the header is rejected, a shorter
//! row is padded with empty strings. Index tables are read leniently and
//! surplus fields are dropped.

use std::path::Path;

use csv::{ReaderBuilder, StringRecord, Terminator, WriterBuilder};
use dplace_model::{Record, Row};

use crate::error::{IngestError, Result};
use crate::files::write_atomic;

/// Header plus header-keyed rows of one CSV file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CsvTable {
    pub header: Vec<String>,
    pub rows: Vec<Row>,
}

impl CsvTable {
    /// Values of one row in header order.
    pub fn values<'a>(&'a self, row: &'a Row) -> impl Iterator<Item = &'a str> + 'a {
        self.header
            .iter()
            .map(move |column| row.get(column).map(String::as_str).unwrap_or(""))
    }
}

/// Read a CSV file, rejecting rows with more fields than header columns.
pub fn read_dicts(path: &Path) -> Result<CsvTable> {
    read_table(path, true)
}

/// Read a CSV file, dropping fields beyond the header.
pub fn read_dicts_lenient(path: &Path) -> Result<CsvTable> {
    read_table(path, false)
}

fn read_table(path: &Path, strict: bool) -> Result<CsvTable> {
    let mut reader = ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .map_err(|e| csv_error(path, e))?;

    let header: Vec<String> = reader
        .headers()
        .map_err(|e| csv_error(path, e))?
        .iter()
        .map(str::to_string)
        .collect();

    let mut rows = Vec::new();
    let mut record = StringRecord::new();
    let mut index = 0;
    while reader
        .read_record(&mut record)
        .map_err(|e| csv_error(path, e))?
    {
        index += 1;
        if strict && record.len() > header.len() {
            return Err(IngestError::ExtraFields {
                path: path.to_path_buf(),
                row: index,
            });
        }
        let row: Row = header
            .iter()
            .enumerate()
            .map(|(i, column)| (column.clone(), record.get(i).unwrap_or("").to_string()))
            .collect();
        rows.push(row);
    }

    tracing::debug!(path = %path.display(), rows = rows.len(), "read CSV");
    Ok(CsvTable { header, rows })
}

/// Read and validate every row of a record table; an absent file is empty.
pub fn read_records<T: Record>(path: &Path) -> Result<Vec<T>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let table = read_dicts(path)?;
    table
        .rows
        .iter()
        .enumerate()
        .map(|(i, row)| {
            T::from_row(row).map_err(|source| IngestError::Record {
                path: path.to_path_buf(),
                row: i + 1,
                source,
            })
        })
        .collect()
}

/// Write records in their declared column order.
pub fn write_records<T: Record>(path: &Path, records: &[T]) -> Result<()> {
    write_rows(path, T::FIELDS, records.iter().map(Record::to_row))
}

/// Write a header and rows, replacing `path` atomically.
pub fn write_rows<H, R, S>(path: &Path, header: &[H], rows: R) -> Result<()>
where
    H: AsRef<str>,
    R: IntoIterator,
    R::Item: IntoIterator<Item = S>,
    S: AsRef<[u8]>,
{
    let bytes = to_bytes(path, header, rows)?;
    write_atomic(path, &bytes)
}

/// Serialize a header and rows with the repository dialect.
pub fn to_bytes<H, R, S>(path: &Path, header: &[H], rows: R) -> Result<Vec<u8>>
where
    H: AsRef<str>,
    R: IntoIterator,
    R::Item: IntoIterator<Item = S>,
    S: AsRef<[u8]>,
{
    let mut writer = WriterBuilder::new()
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    writer
        .write_record(header.iter().map(|h| h.as_ref().as_bytes()))
        .map_err(|e| csv_error(path, e))?;
    for row in rows {
        writer.write_record(row).map_err(|e| csv_error(path, e))?;
    }
    writer.into_inner().map_err(|e| IngestError::FileWrite {
        operation: "serialize",
        path: path.to_path_buf(),
        source: e.into_error(),
    })
}

fn csv_error(path: &Path, source: csv::Error) -> IngestError {
    if let csv::ErrorKind::Io(io) = source.kind()
        && io.kind() == std::io::ErrorKind::NotFound
    {
        return IngestError::FileNotFound {
            path: path.to_path_buf(),
        };
    }
    IngestError::Csv {
        path: path.to_path_buf(),
        source,
    }
}
