//! CSV table reader with encoding, delimiter and column kind auto-detection.
//!
//! Column kinds are inferred from the non-empty values of each column:
//!
//! | Kind      | Rule                                          |
//! |-----------|-----------------------------------------------|
//! | `Integer` | every value parses as `i64`                   |
//! | `Boolean` | every value is `true` / `false` (any case)    |
//! | `Double`  | every value parses as `f64`                   |
//! | `Text`    | anything else, or no value at all             |
//!
//! Empty cells become [`Cell::Missing`]. Row keys are `Row0`, `Row1`, ...
//! unless a key column is named in [`ReadOptions`].

use std::path::Path;

use crate::error::{TableError, TableResult};
use crate::models::{Cell, ColumnKind, ColumnSpec, DataTable, Row, TableSpec};
use crate::table::delimiter_byte;

/// Reader options.
#[derive(Debug, Clone, Default)]
pub struct ReadOptions {
    /// Field delimiter; auto-detected when `None`.
    pub delimiter: Option<char>,
    /// Column whose values become the row keys. It is not part of the table.
    pub key_column: Option<String>,
}

impl ReadOptions {
    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = Some(delimiter);
        self
    }

    pub fn with_key_column(mut self, column: impl Into<String>) -> Self {
        self.key_column = Some(column.into());
        self
    }
}

/// Result of parsing with metadata
#[derive(Debug, Clone)]
pub struct ParseResult {
    pub table: DataTable,
    /// Detected encoding
    pub encoding: String,
    /// Detected or used delimiter
    pub delimiter: char,
}

/// Detect the encoding of raw bytes using chardet
pub fn detect_encoding(bytes: &[u8]) -> String {
    let charset = chardet::detect(bytes).0;

    match charset.to_lowercase().as_str() {
        "ascii" | "utf-8" | "utf8" | "" => "utf-8".to_string(),
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        _ => charset,
    }
}

/// Decode bytes with the given encoding. Unknown encodings fall back to
/// lossy UTF-8.
pub fn decode_content(bytes: &[u8], encoding: &str) -> TableResult<String> {
    let text = match encoding.to_lowercase().as_str() {
        "utf-8" | "utf8" | "ascii" => match std::str::from_utf8(bytes) {
            Ok(s) => s.to_string(),
            Err(_) => String::from_utf8_lossy(bytes).into_owned(),
        },
        "iso-8859-1" | "latin-1" | "latin1" => encoding_rs::ISO_8859_15.decode(bytes).0.into_owned(),
        "windows-1252" | "cp1252" => encoding_rs::WINDOWS_1252.decode(bytes).0.into_owned(),
        other => match encoding_rs::Encoding::for_label(other.as_bytes()) {
            Some(enc) => enc.decode(bytes).0.into_owned(),
            None => String::from_utf8_lossy(bytes).into_owned(),
        },
    };
    Ok(text.trim_start_matches('\u{feff}').to_string())
}

/// Detect the delimiter by counting occurrences in the header line.
/// Ties go to the earlier candidate; no candidate at all gives `,`.
pub fn detect_delimiter(content: &str) -> char {
    let header = content.lines().find(|l| !l.trim().is_empty()).unwrap_or("");

    let mut best = (',', 0);
    for sep in [';', ',', '\t', '|'] {
        let count = header.matches(sep).count();
        if count > best.1 {
            best = (sep, count);
        }
    }
    best.0
}

/// Infer the kind of a column from its raw values.
pub fn infer_kind<'a>(values: impl IntoIterator<Item = &'a str>) -> ColumnKind {
    let mut seen = false;
    let (mut integer, mut boolean, mut double) = (true, true, true);

    for value in values.into_iter().filter(|v| !v.is_empty()) {
        seen = true;
        integer &= value.parse::<i64>().is_ok();
        boolean &= parse_bool(value).is_some();
        double &= value.parse::<f64>().is_ok();
        if !(integer || boolean || double) {
            break;
        }
    }

    match (seen, integer, boolean, double) {
        (false, ..) => ColumnKind::Text,
        (true, true, _, _) => ColumnKind::Integer,
        (true, _, true, _) => ColumnKind::Boolean,
        (true, _, _, true) => ColumnKind::Double,
        _ => ColumnKind::Text,
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    if value.eq_ignore_ascii_case("true") {
        Some(true)
    } else if value.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

/// Convert one raw value into a cell of an inferred kind.
fn parse_cell(value: &str, kind: ColumnKind) -> Cell {
    if value.is_empty() {
        return Cell::Missing;
    }
    // Kinds were inferred from these same values.
    match kind {
        ColumnKind::Integer => value.parse().map(Cell::Integer).unwrap_or(Cell::Missing),
        ColumnKind::Boolean => parse_bool(value).map(Cell::Boolean).unwrap_or(Cell::Missing),
        ColumnKind::Double => value.parse().map(Cell::Double).unwrap_or(Cell::Missing),
        ColumnKind::Text => Cell::Text(value.to_string()),
    }
}

/// Parse CSV text with an explicit delimiter into a typed table.
///
/// # Example
/// ```ignore
/// use numfmt::parser::parse_csv_str;
///
/// let table = parse_csv_str("name;price\nA;3.5\nB;4", ';', None)?;
/// assert_eq!(table.spec.names(), vec!["name", "price"]);
/// ```
pub fn parse_csv_str(content: &str, delimiter: char, key_column: Option<&str>) -> TableResult<DataTable> {
    if content.trim().is_empty() {
        return Err(TableError::EmptyFile);
    }

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter_byte(delimiter)?)
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(content.as_bytes());

    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    if headers.is_empty() || headers.iter().all(String::is_empty) {
        return Err(TableError::NoHeaders);
    }

    let key_index = match key_column {
        Some(name) => Some(
            headers
                .iter()
                .position(|h| h == name)
                .ok_or_else(|| TableError::UnknownColumn(name.to_string()))?,
        ),
        None => None,
    };

    // Raw values, one Vec per record, padded or cut to the header width
    let mut keys = Vec::new();
    let mut raw: Vec<Vec<String>> = Vec::new();
    for record in reader.records() {
        let record = record?;
        let line = record.position().map(|p| p.line() as usize).unwrap_or(0);
        let mut values: Vec<String> = (0..headers.len())
            .map(|i| record.get(i).unwrap_or("").to_string())
            .collect();

        let key = match key_index {
            Some(k) => {
                let key = values.remove(k);
                if key.is_empty() {
                    return Err(TableError::Csv {
                        line,
                        message: "empty row key".to_string(),
                    });
                }
                key
            }
            None => format!("Row{}", raw.len()),
        };
        keys.push(key);
        raw.push(values);
    }

    let names: Vec<&String> = headers
        .iter()
        .enumerate()
        .filter(|(i, _)| Some(*i) != key_index)
        .map(|(_, h)| h)
        .collect();

    let kinds: Vec<ColumnKind> = (0..names.len())
        .map(|c| infer_kind(raw.iter().map(|values| values[c].as_str())))
        .collect();

    let spec = TableSpec::new(
        names
            .iter()
            .zip(&kinds)
            .map(|(name, kind)| ColumnSpec::new(name.as_str(), *kind))
            .collect(),
    )?;

    let rows = keys
        .into_iter()
        .zip(raw)
        .map(|(key, values)| {
            let cells = values
                .iter()
                .zip(&kinds)
                .map(|(value, kind)| parse_cell(value, *kind))
                .collect();
            Row::new(key, cells)
        })
        .collect();

    DataTable::new(spec, rows)
}

/// Parse CSV bytes with auto-detection of encoding and delimiter.
pub fn parse_bytes_auto(bytes: &[u8], options: &ReadOptions) -> TableResult<ParseResult> {
    if bytes.is_empty() {
        return Err(TableError::EmptyFile);
    }

    let encoding = detect_encoding(bytes);
    let content = decode_content(bytes, &encoding)?;
    let delimiter = options.delimiter.unwrap_or_else(|| detect_delimiter(&content));
    let table = parse_csv_str(&content, delimiter, options.key_column.as_deref())?;

    Ok(ParseResult {
        table,
        encoding,
        delimiter,
    })
}

/// Parse a CSV file with auto-detection of encoding and delimiter.
pub fn parse_csv_file_auto<P: AsRef<Path>>(path: P, options: &ReadOptions) -> TableResult<ParseResult> {
    let bytes = std::fs::read(path.as_ref())?;
    parse_bytes_auto(&bytes, options)
}
