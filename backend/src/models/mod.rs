//! Table model shared by the reader, the node and the writers.
//!
//! - [`ColumnKind`] - Value kind of a column
//! - [`ColumnSpec`] - Name and kind of one column
//! - [`TableSpec`] - Ordered column layout of a table
//! - [`Cell`] - One value of a row
//! - [`Row`] - Keyed sequence of cells
//! - [`DataTable`] - Materialized table (spec + rows)

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use crate::error::{TableError, TableResult};

// =============================================================================
// Columns
// =============================================================================

/// Value kind of a column.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    /// Plain 64-bit floating point.
    Double,
    /// 64-bit integer.
    Integer,
    /// Boolean.
    Boolean,
    /// Free text.
    Text,
}

impl ColumnKind {
    /// Whether values of this kind are plain floating point numbers.
    pub fn is_floating_point(self) -> bool {
        match self {
            ColumnKind::Double => true,
            ColumnKind::Integer | ColumnKind::Boolean | ColumnKind::Text => false,
        }
    }

    /// Short lowercase name, as serialized.
    pub fn as_str(self) -> &'static str {
        match self {
            ColumnKind::Double => "double",
            ColumnKind::Integer => "integer",
            ColumnKind::Boolean => "boolean",
            ColumnKind::Text => "text",
        }
    }
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Name and kind of a single column.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ColumnSpec {
    pub name: String,
    pub kind: ColumnKind,
}

impl ColumnSpec {
    pub fn new(name: impl Into<String>, kind: ColumnKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

/// Ordered column layout. Column order defines cell positions in every row.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(try_from = "Vec<ColumnSpec>", into = "Vec<ColumnSpec>")]
pub struct TableSpec {
    columns: Vec<ColumnSpec>,
}

impl TableSpec {
    /// Build a spec, rejecting duplicate column names.
    pub fn new(columns: Vec<ColumnSpec>) -> TableResult<Self> {
        let mut seen = HashSet::new();
        for column in &columns {
            if !seen.insert(column.name.as_str()) {
                return Err(TableError::DuplicateColumn(column.name.clone()));
            }
        }
        Ok(Self { columns })
    }

    /// Build a spec from columns already known to have distinct names.
    pub(crate) fn from_distinct(columns: Vec<ColumnSpec>) -> Self {
        debug_assert_eq!(
            columns.iter().map(|c| c.name.as_str()).collect::<HashSet<_>>().len(),
            columns.len()
        );
        Self { columns }
    }

    /// A spec without columns.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn columns(&self) -> &[ColumnSpec] {
        &self.columns
    }

    pub fn column(&self, index: usize) -> Option<&ColumnSpec> {
        self.columns.get(index)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Position of the column with the given name.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    pub fn names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    /// Check that a row has one cell per column.
    pub fn check_row(&self, row: &Row) -> TableResult<()> {
        if row.cells.len() != self.columns.len() {
            return Err(TableError::RowShape {
                key: row.key.clone(),
                expected: self.columns.len(),
                found: row.cells.len(),
            });
        }
        Ok(())
    }
}

impl TryFrom<Vec<ColumnSpec>> for TableSpec {
    type Error = TableError;

    fn try_from(columns: Vec<ColumnSpec>) -> Result<Self, Self::Error> {
        TableSpec::new(columns)
    }
}

impl From<TableSpec> for Vec<ColumnSpec> {
    fn from(spec: TableSpec) -> Self {
        spec.columns
    }
}

// =============================================================================
// Cells and rows
// =============================================================================

/// One value of a row.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum Cell {
    Double(f64),
    Integer(i64),
    Boolean(bool),
    Text(String),
    /// No value at all; distinct from `Double(0.0)`.
    Missing,
}

impl Cell {
    pub fn is_missing(&self) -> bool {
        matches!(self, Cell::Missing)
    }

    /// Kind of the value held, `None` for a missing cell.
    pub fn kind(&self) -> Option<ColumnKind> {
        match self {
            Cell::Double(_) => Some(ColumnKind::Double),
            Cell::Integer(_) => Some(ColumnKind::Integer),
            Cell::Boolean(_) => Some(ColumnKind::Boolean),
            Cell::Text(_) => Some(ColumnKind::Text),
            Cell::Missing => None,
        }
    }

    /// Textual form used by the CSV writer; missing cells are empty.
    pub fn to_plain_string(&self) -> String {
        match self {
            Cell::Double(v) => v.to_string(),
            Cell::Integer(v) => v.to_string(),
            Cell::Boolean(v) => v.to_string(),
            Cell::Text(s) => s.clone(),
            Cell::Missing => String::new(),
        }
    }
}

/// A keyed row. The key is unique within its table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Row {
    pub key: String,
    pub cells: Vec<Cell>,
}

impl Row {
    pub fn new(key: impl Into<String>, cells: Vec<Cell>) -> Self {
        Self {
            key: key.into(),
            cells,
        }
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

// =============================================================================
// Materialized table
// =============================================================================

/// A fully materialized table: the handle produced by a finalized sink.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DataTable {
    pub spec: TableSpec,
    pub rows: Vec<Row>,
}

impl DataTable {
    /// Build a table, checking row shapes and key uniqueness.
    pub fn new(spec: TableSpec, rows: Vec<Row>) -> TableResult<Self> {
        let mut keys = HashSet::new();
        for row in &rows {
            spec.check_row(row)?;
            if !keys.insert(row.key.as_str()) {
                return Err(TableError::DuplicateRowKey(row.key.clone()));
            }
        }
        Ok(Self { spec, rows })
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Look up a row by key.
    pub fn row(&self, key: &str) -> Option<&Row> {
        self.rows.iter().find(|r| r.key == key)
    }

    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_column_rejected() {
        let result = TableSpec::new(vec![
            ColumnSpec::new("A", ColumnKind::Double),
            ColumnSpec::new("A", ColumnKind::Text),
        ]);
        assert!(matches!(result, Err(TableError::DuplicateColumn(name)) if name == "A"));
    }

    #[test]
    fn test_only_double_is_floating_point() {
        assert!(ColumnKind::Double.is_floating_point());
        assert!(!ColumnKind::Integer.is_floating_point());
        assert!(!ColumnKind::Boolean.is_floating_point());
        assert!(!ColumnKind::Text.is_floating_point());
    }

    #[test]
    fn test_row_shape_checked() {
        let spec = TableSpec::new(vec![ColumnSpec::new("A", ColumnKind::Double)]).unwrap();
        let row = Row::new("Row0", vec![Cell::Double(1.0), Cell::Missing]);
        let err = spec.check_row(&row).unwrap_err();
        assert!(err.to_string().contains("expected 1"));
    }

    #[test]
    fn test_duplicate_row_key_rejected() {
        let spec = TableSpec::new(vec![ColumnSpec::new("A", ColumnKind::Integer)]).unwrap();
        let rows = vec![
            Row::new("r1", vec![Cell::Integer(1)]),
            Row::new("r1", vec![Cell::Integer(2)]),
        ];
        assert!(matches!(
            DataTable::new(spec, rows),
            Err(TableError::DuplicateRowKey(_))
        ));
    }

    #[test]
    fn test_spec_json_shape() {
        let spec = TableSpec::new(vec![ColumnSpec::new("A", ColumnKind::Double)]).unwrap();
        let json = serde_json::to_value(&spec).unwrap();
        assert_eq!(json[0]["name"], "A");
        assert_eq!(json[0]["kind"], "double");

        let duplicated = serde_json::json!([
            { "name": "A", "kind": "double" },
            { "name": "A", "kind": "text" }
        ]);
        assert!(serde_json::from_value::<TableSpec>(duplicated).is_err());
    }

    #[test]
    fn test_cell_json_shape() {
        let json = serde_json::to_value(Cell::Text("3.14".into())).unwrap();
        assert_eq!(json["type"], "text");
        assert_eq!(json["value"], "3.14");
        let missing = serde_json::to_value(Cell::Missing).unwrap();
        assert_eq!(missing["type"], "missing");
    }
}
