//! # numfmt - Number Formatter workflow node
//!
//! Renders every floating-point column of a table through a printf-style
//! format pattern. Each `Double` column `X` becomes a text column
//! `Formatted(X)`; all other columns are dropped and row keys are kept.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │  Settings   │────▶│  Validator  │────▶│ Output spec │────▶│  Row loop   │──▶ sink
//! │ ("%.3f")    │     │ (probe run) │     │ Formatted() │     │ (cancel/%)  │
//! └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use numfmt::{parse_csv_file_auto, BufferedSink, ExecutionContext, FormatSettings,
//!              NodeRunner, NumberFormatter, ReadOptions};
//!
//! let parsed = parse_csv_file_auto("prices.csv", &ReadOptions::default())?;
//! let runner = NodeRunner::new(NumberFormatter);
//! let summary = runner.execute(
//!     &FormatSettings::new("%.2f"),
//!     &parsed.table,
//!     BufferedSink::new(),
//!     &ExecutionContext::new(),
//! )?;
//! println!("Formatted {} rows", summary.rows);
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Hierarchical error types
//! - [`models`] - Column specs, cells, rows and tables
//! - [`format`] - Format pattern parsing and rendering
//! - [`validation`] - Pattern probe and settings schema checks
//! - [`transform`] - Output spec, row transformation and the row loop
//! - [`node`] - Node capability trait and configure/execute runner
//! - [`table`] - Table sources and sinks
//! - [`parser`] - CSV reading with auto-detection
//! - [`settings`] - Persisted format pattern
//! - [`config`] - Environment configuration
//! - [`api`] - HTTP API server and log streaming

// Core modules
pub mod error;
pub mod models;

// Formatting
pub mod format;
pub mod validation;

// Transformation
pub mod node;
pub mod transform;

// Tables
pub mod parser;
pub mod table;

// Configuration
pub mod config;
pub mod settings;

// HTTP API
pub mod api;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{
    ConfigError, FormatError, NodeError, NodeResult, ServerError, SettingsError, TableError,
};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{Cell, ColumnKind, ColumnSpec, DataTable, Row, TableSpec};

// =============================================================================
// Re-exports - Formatting
// =============================================================================

pub use format::FormatPattern;
pub use validation::{is_valid_format, validate_format, validate_settings, PROBE_VALUE};

// =============================================================================
// Re-exports - Transformation
// =============================================================================

pub use node::{
    Configured, ExecutionSummary, FormatterConfig, NodeRunner, NumberFormatter, RowTransform, TableNode,
};
pub use transform::{
    derive_output_spec, formattable_columns, formatted_column_name, transform_row, CancelHandle,
    ExecutionContext, ExecutionMonitor,
};

// =============================================================================
// Re-exports - Tables
// =============================================================================

pub use parser::{parse_bytes_auto, parse_csv_file_auto, parse_csv_str, ParseResult, ReadOptions};
pub use table::{to_csv_string, write_csv, BufferedSink, CsvFileSink, TableSink, TableSource};

// =============================================================================
// Re-exports - Configuration
// =============================================================================

pub use config::AppConfig;
pub use settings::{FormatSettings, SettingsStore, DEFAULT_NUMBER_FORMAT, KEY_NUMBER_FORMAT};

// Server
pub mod server {
    pub use crate::api::server::start_server;
}
