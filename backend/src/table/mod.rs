//! Table sources and sinks.
//!
//! A [`TableSource`] hands out its spec and a lazy, restartable sequence of
//! rows. A [`TableSink`] is opened with a spec, receives rows in order and is
//! finalized with [`TableSink::close`]. A sink dropped before `close` commits
//! nothing.
//!
//! - [`BufferedSink`] - collects rows in memory, closes to a [`DataTable`]
//! - [`CsvFileSink`] - writes a temporary file, persisted on close

use std::collections::HashSet;
use std::io::Write;
use std::path::PathBuf;

use tempfile::NamedTempFile;

use crate::error::{TableError, TableResult};
use crate::models::{DataTable, Row, TableSpec};

/// Header of the row key column in CSV output.
pub const ROW_ID_HEADER: &str = "RowID";

/// The byte the `csv` crate expects for `delimiter`.
pub fn delimiter_byte(delimiter: char) -> TableResult<u8> {
    u8::try_from(delimiter)
        .ok()
        .filter(u8::is_ascii)
        .ok_or(TableError::InvalidDelimiter(delimiter))
}

// =============================================================================
// Traits
// =============================================================================

/// Producer of rows for one table.
pub trait TableSource {
    fn spec(&self) -> &TableSpec;

    /// Total number of rows, when known up front.
    fn row_count(&self) -> Option<usize>;

    /// A fresh pass over the rows.
    fn rows(&self) -> Box<dyn Iterator<Item = TableResult<Row>> + '_>;
}

/// Consumer of rows producing a finalized table handle.
pub trait TableSink {
    type Output;

    fn open(&mut self, spec: &TableSpec) -> TableResult<()>;

    fn add_row(&mut self, row: Row) -> TableResult<()>;

    fn close(self) -> TableResult<Self::Output>;
}

impl TableSource for DataTable {
    fn spec(&self) -> &TableSpec {
        &self.spec
    }

    fn row_count(&self) -> Option<usize> {
        Some(self.rows.len())
    }

    fn rows(&self) -> Box<dyn Iterator<Item = TableResult<Row>> + '_> {
        Box::new(self.rows.iter().cloned().map(Ok))
    }
}

// =============================================================================
// Sinks
// =============================================================================

/// Tracks the opened spec and rejects malformed or duplicated rows.
#[derive(Debug, Default)]
struct RowGuard {
    spec: Option<TableSpec>,
    keys: HashSet<String>,
}

impl RowGuard {
    fn open(&mut self, spec: &TableSpec) {
        self.spec = Some(spec.clone());
        self.keys.clear();
    }

    fn admit(&mut self, row: &Row) -> TableResult<()> {
        let spec = self.spec.as_ref().ok_or(TableError::SinkNotOpen)?;
        spec.check_row(row)?;
        if !self.keys.insert(row.key.clone()) {
            return Err(TableError::DuplicateRowKey(row.key.clone()));
        }
        Ok(())
    }
}

/// In-memory sink.
#[derive(Debug, Default)]
pub struct BufferedSink {
    guard: RowGuard,
    rows: Vec<Row>,
}

impl BufferedSink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TableSink for BufferedSink {
    type Output = DataTable;

    fn open(&mut self, spec: &TableSpec) -> TableResult<()> {
        self.guard.open(spec);
        self.rows.clear();
        Ok(())
    }

    fn add_row(&mut self, row: Row) -> TableResult<()> {
        self.guard.admit(&row)?;
        self.rows.push(row);
        Ok(())
    }

    fn close(self) -> TableResult<DataTable> {
        let spec = self.guard.spec.ok_or(TableError::SinkNotOpen)?;
        Ok(DataTable {
            spec,
            rows: self.rows,
        })
    }
}

/// CSV file sink.
///
/// Rows go to a temporary file next to the target; the target only appears
/// when [`TableSink::close`] succeeds.
pub struct CsvFileSink {
    target: PathBuf,
    delimiter: char,
    guard: RowGuard,
    writer: Option<csv::Writer<NamedTempFile>>,
}

impl CsvFileSink {
    pub fn new(target: impl Into<PathBuf>, delimiter: char) -> Self {
        Self {
            target: target.into(),
            delimiter,
            guard: RowGuard::default(),
            writer: None,
        }
    }
}

impl TableSink for CsvFileSink {
    type Output = PathBuf;

    fn open(&mut self, spec: &TableSpec) -> TableResult<()> {
        let dir = match self.target.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let delimiter = delimiter_byte(self.delimiter)?;
        let file = NamedTempFile::new_in(dir)?;
        let mut writer = csv::WriterBuilder::new()
            .delimiter(delimiter)
            .from_writer(file);
        writer.write_record(header_record(spec))?;

        self.guard.open(spec);
        self.writer = Some(writer);
        Ok(())
    }

    fn add_row(&mut self, row: Row) -> TableResult<()> {
        self.guard.admit(&row)?;
        let writer = self.writer.as_mut().ok_or(TableError::SinkNotOpen)?;
        writer.write_record(row_record(&row))?;
        Ok(())
    }

    fn close(self) -> TableResult<PathBuf> {
        let writer = self.writer.ok_or(TableError::SinkNotOpen)?;
        let mut file = writer.into_inner().map_err(|e| e.into_error())?;
        file.flush()?;
        file.persist(&self.target).map_err(|e| e.error)?;
        Ok(self.target)
    }
}

// =============================================================================
// Writers
// =============================================================================

fn header_record(spec: &TableSpec) -> Vec<String> {
    std::iter::once(ROW_ID_HEADER.to_string())
        .chain(spec.columns().iter().map(|c| c.name.clone()))
        .collect()
}

fn row_record(row: &Row) -> Vec<String> {
    std::iter::once(row.key.clone())
        .chain(row.cells.iter().map(|c| c.to_plain_string()))
        .collect()
}

/// Write a table as CSV, row keys first.
pub fn write_csv<W: Write>(table: &DataTable, writer: W, delimiter: char) -> TableResult<()> {
    let mut csv_writer = csv::WriterBuilder::new()
        .delimiter(delimiter_byte(delimiter)?)
        .from_writer(writer);
    csv_writer.write_record(header_record(&table.spec))?;
    for row in &table.rows {
        csv_writer.write_record(row_record(row))?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Render a table as CSV text.
pub fn to_csv_string(table: &DataTable, delimiter: char) -> TableResult<String> {
    let mut buf = Vec::new();
    write_csv(table, &mut buf, delimiter)?;
    String::from_utf8(buf).map_err(|e| TableError::Encoding(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Cell, ColumnKind, ColumnSpec};
    use tempfile::tempdir;

    fn text_spec() -> TableSpec {
        TableSpec::new(vec![ColumnSpec::new("Formatted(A)", ColumnKind::Text)]).unwrap()
    }

    #[test]
    fn test_buffered_sink_roundtrip() {
        let mut sink = BufferedSink::new();
        sink.open(&text_spec()).unwrap();
        sink.add_row(Row::new("r1", vec![Cell::Text("3.14".into())])).unwrap();
        let table = sink.close().unwrap();
        assert_eq!(table.row_count(), 1);
        assert_eq!(table.row("r1").unwrap().cells[0], Cell::Text("3.14".into()));
    }

    #[test]
    fn test_sink_rejects_bad_rows() {
        let mut sink = BufferedSink::new();
        assert!(matches!(
            sink.add_row(Row::new("r1", vec![])),
            Err(TableError::SinkNotOpen)
        ));

        sink.open(&text_spec()).unwrap();
        assert!(sink.add_row(Row::new("r1", vec![])).is_err());
        sink.add_row(Row::new("r1", vec![Cell::Text("a".into())])).unwrap();
        assert!(matches!(
            sink.add_row(Row::new("r1", vec![Cell::Text("b".into())])),
            Err(TableError::DuplicateRowKey(_))
        ));
    }

    #[test]
    fn test_csv_sink_commits_on_close() {
        let dir = tempdir().unwrap();
        let target = dir.path().join("out.csv");

        let mut sink = CsvFileSink::new(&target, ',');
        sink.open(&text_spec()).unwrap();
        sink.add_row(Row::new("Row0", vec![Cell::Text("1.000".into())])).unwrap();
        assert!(!target.exists());

        let path = sink.close().unwrap();
        let content = std::fs::read_to_string(path).unwrap();
        assert_eq!(content, "RowID,Formatted(A)\nRow0,1.000\n");
    }

    #[test]
    fn test_csv_sink_dropped_commits_nothing() {
        let dir = tempdir().unwrap();
        let target = dir.path().join("out.csv");
        {
            let mut sink = CsvFileSink::new(&target, ',');
            sink.open(&text_spec()).unwrap();
            sink.add_row(Row::new("Row0", vec![Cell::Text("x".into())])).unwrap();
        }
        assert!(!target.exists());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_delimiter_must_be_ascii() {
        assert_eq!(delimiter_byte(';').unwrap(), b';');
        assert_eq!(delimiter_byte('\t').unwrap(), b'\t');
        assert!(matches!(delimiter_byte('\u{e9}'), Err(TableError::InvalidDelimiter('\u{e9}'))));

        let table = DataTable::new(text_spec(), vec![]).unwrap();
        assert!(to_csv_string(&table, '\u{e9}').is_err());

        let dir = tempdir().unwrap();
        let mut sink = CsvFileSink::new(dir.path().join("out.csv"), '\u{e9}');
        assert!(matches!(sink.open(&text_spec()), Err(TableError::InvalidDelimiter(_))));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_to_csv_string() {
        let table = DataTable::new(
            text_spec(),
            vec![Row::new("r1", vec![Cell::Text("1,5".into())])],
        )
        .unwrap();
        let csv = to_csv_string(&table, ';').unwrap();
        assert_eq!(csv, "RowID;Formatted(A)\nr1;1,5\n");
    }
}
