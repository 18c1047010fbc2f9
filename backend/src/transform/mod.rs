//! Transformation module.
//!
//! - Schema: output spec derivation and the shared column classification
//! - Row: floating-point cells to formatted text cells
//! - Pipeline: row-at-a-time driver with cancellation and progress

pub mod pipeline;
pub mod row;
pub mod schema;

pub use pipeline::{execute_rows, CancelHandle, ExecutionContext, ExecutionMonitor, RowsExecuted};
pub use row::{transform_row, RowFormatter};
pub use schema::{derive_output_spec, formattable_columns, formatted_column_name};
