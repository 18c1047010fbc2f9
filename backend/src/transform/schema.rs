//! Output spec derivation.
//!
//! [`formattable_columns`] is the single place deciding which input columns
//! get formatted. Both [`derive_output_spec`] and the row transformer use it,
//! so the announced spec and the produced rows always agree.

use crate::models::{ColumnKind, ColumnSpec, TableSpec};

/// Name of the text column produced for input column `name`.
pub fn formatted_column_name(name: &str) -> String {
    format!("Formatted({})", name)
}

/// Positions of the floating-point columns of `spec`, in order.
pub fn formattable_columns(spec: &TableSpec) -> Vec<usize> {
    spec.columns()
        .iter()
        .enumerate()
        .filter(|(_, column)| column.kind.is_floating_point())
        .map(|(i, _)| i)
        .collect()
}

/// Output layout: one text column per floating-point input column.
///
/// Every other column is dropped. Pure and deterministic.
pub fn derive_output_spec(input: &TableSpec) -> TableSpec {
    let columns = formattable_columns(input)
        .into_iter()
        .filter_map(|i| input.column(i))
        .map(|column| ColumnSpec::new(formatted_column_name(&column.name), ColumnKind::Text))
        .collect();
    // Input names are distinct and the renaming is injective.
    TableSpec::from_distinct(columns)
}
