//! Row transformation: floating-point cells to formatted text cells.

use super::schema::formattable_columns;
use crate::error::{NodeError, NodeResult};
use crate::format::FormatPattern;
use crate::models::{Cell, Row, TableSpec};

/// Formats rows of one input spec with one pattern.
///
/// Column classification is computed once and reused for every row.
#[derive(Debug, Clone)]
pub struct RowFormatter<'a> {
    spec: &'a TableSpec,
    pattern: &'a FormatPattern,
    columns: Vec<usize>,
}

impl<'a> RowFormatter<'a> {
    pub fn new(spec: &'a TableSpec, pattern: &'a FormatPattern) -> Self {
        Self {
            spec,
            pattern,
            columns: formattable_columns(spec),
        }
    }

    /// Format every floating-point cell of `row`, dropping all other cells.
    ///
    /// The key is kept. A floating-point column holding anything but a
    /// double (a missing value in particular) is an error; no substitute
    /// value is produced.
    pub fn transform(&self, row: &Row) -> NodeResult<Row> {
        self.spec.check_row(row)?;

        let mut cells = Vec::with_capacity(self.columns.len());
        for &i in &self.columns {
            let column = &self.spec.columns()[i];
            let text = match &row.cells[i] {
                Cell::Double(value) => self.pattern.render(*value).map_err(|e| NodeError::RowFormat {
                    row: row.key.clone(),
                    column: column.name.clone(),
                    reason: e.to_string(),
                })?,
                Cell::Missing => {
                    return Err(NodeError::RowFormat {
                        row: row.key.clone(),
                        column: column.name.clone(),
                        reason: "missing value".to_string(),
                    })
                }
                other @ (Cell::Integer(_) | Cell::Boolean(_) | Cell::Text(_)) => {
                    let found = other.kind().map(|k| k.as_str()).unwrap_or("missing");
                    return Err(NodeError::RowFormat {
                        row: row.key.clone(),
                        column: column.name.clone(),
                        reason: format!("expected a double value, found {}", found),
                    });
                }
            };
            cells.push(Cell::Text(text));
        }

        Ok(Row::new(row.key.clone(), cells))
    }
}

/// Format one row. See [`RowFormatter::transform`].
pub fn transform_row(row: &Row, input: &TableSpec, pattern: &FormatPattern) -> NodeResult<Row> {
    RowFormatter::new(input, pattern).transform(row)
}
