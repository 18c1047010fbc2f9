//! Error types for the Number Formatter node.
//!
//! This module defines the error hierarchy used across the crate:
//!
//! - [`FormatError`] - Pattern parsing and rendering errors
//! - [`TableError`] - Table reading, writing and shape errors
//! - [`SettingsError`] - Settings store errors
//! - [`ConfigError`] - Environment configuration errors
//! - [`NodeError`] - Top-level configure/execute errors
//! - [`ServerError`] - HTTP layer errors
//!
//! Error conversion is automatic via `From` implementations,
//! allowing `?` to work across error boundaries.

use thiserror::Error;

// =============================================================================
// Format Pattern Errors
// =============================================================================

/// Errors raised while parsing a format pattern or rendering a value with it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    /// The directive ends in a conversion character nobody knows.
    #[error("Unknown format conversion: '{0}'")]
    UnknownConversion(String),

    /// The conversion exists but does not accept a floating-point argument.
    #[error("Illegal format conversion: '{0}' cannot format a floating-point value")]
    IllegalConversion(char),

    /// A flag requiring a width was given without one.
    #[error("Missing format width: '{0}'")]
    MissingWidth(String),

    /// The flags contradict each other.
    #[error("Illegal format flags: '{0}'")]
    IllegalFlags(String),

    /// A flag is not allowed with the conversion it is attached to.
    #[error("Conversion = '{conversion}', Flags = '{flag}'")]
    FlagMismatch { flag: char, conversion: char },

    /// Precision is not allowed for this conversion.
    #[error("Illegal format precision: {0}")]
    IllegalPrecision(usize),

    /// Width is not allowed for this conversion.
    #[error("Illegal format width: {0}")]
    IllegalWidth(usize),

    /// Width does not fit in a signed 32-bit integer.
    #[error("Format width out of range: {0}")]
    WidthOutOfRange(String),

    /// Precision does not fit in a signed 32-bit integer.
    #[error("Format precision out of range: {0}")]
    PrecisionOutOfRange(String),

    /// Explicit argument index does not fit in a signed 32-bit integer.
    #[error("Format argument index out of range: {0}")]
    ArgumentIndexOutOfRange(String),

    /// The directive refers to an argument that is not supplied.
    #[error("Format specifier '{0}' has no matching argument")]
    MissingArgument(String),
}

// =============================================================================
// Table Errors
// =============================================================================

/// Errors while reading, writing or validating tables.
#[derive(Debug, Error)]
pub enum TableError {
    /// Failed to read or write a file.
    #[error("Table IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to decode the input bytes.
    #[error("Failed to decode input: {0}")]
    Encoding(String),

    /// Invalid CSV content.
    #[error("Invalid CSV at line {line}: {message}")]
    Csv { line: usize, message: String },

    /// Empty input.
    #[error("CSV file is empty")]
    EmptyFile,

    /// No headers found.
    #[error("No headers found in CSV")]
    NoHeaders,

    /// The delimiter is not a single ASCII character.
    #[error("Invalid CSV delimiter: '{0}' is not an ASCII character")]
    InvalidDelimiter(char),

    /// Two columns share the same name.
    #[error("Duplicate column name: {0}")]
    DuplicateColumn(String),

    /// The requested column does not exist.
    #[error("Unknown column: {0}")]
    UnknownColumn(String),

    /// Two rows share the same key.
    #[error("Duplicate row key: {0}")]
    DuplicateRowKey(String),

    /// A row does not have one cell per column.
    #[error("Row '{key}' has {found} cells, expected {expected}")]
    RowShape {
        key: String,
        expected: usize,
        found: usize,
    },

    /// A row was added to a sink that was not opened.
    #[error("Table sink used before open")]
    SinkNotOpen,

    /// JSON serialization error.
    #[error("Table JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<csv::Error> for TableError {
    fn from(err: csv::Error) -> Self {
        let line = err
            .position()
            .map(|p| p.line() as usize)
            .unwrap_or(0);
        TableError::Csv {
            line,
            message: err.to_string(),
        }
    }
}

// =============================================================================
// Settings Errors
// =============================================================================

/// Errors from the settings store.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// Settings document failed schema validation.
    #[error("Invalid settings: {}", .0.join("; "))]
    Invalid(Vec<String>),

    /// IO error.
    #[error("Settings IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error.
    #[error("Settings JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

// =============================================================================
// Config Errors
// =============================================================================

/// Errors while reading the environment configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A variable is set but cannot be parsed.
    #[error("Invalid value for {var}: '{value}'")]
    InvalidValue { var: String, value: String },
}

// =============================================================================
// Node Errors (top-level)
// =============================================================================

/// Top-level errors of the configure and execute phases.
///
/// [`NodeError::Canceled`] is an expected outcome rather than a failure;
/// use [`NodeError::is_canceled`] to tell them apart.
#[derive(Debug, Error)]
pub enum NodeError {
    /// The configured pattern failed the probe render.
    #[error("The entered format is not a valid pattern String! Reason: {source} (pattern: \"{pattern}\")")]
    InvalidFormat {
        pattern: String,
        #[source]
        source: FormatError,
    },

    /// A floating-point cell could not be rendered.
    #[error("Cannot format row '{row}', column '{column}': {reason}")]
    RowFormat {
        row: String,
        column: String,
        reason: String,
    },

    /// Execution was canceled by the driver.
    #[error("Execution canceled")]
    Canceled,

    /// Execute produced a spec different from the one announced by configure.
    #[error("Output spec differs from configured spec")]
    SpecMismatch,

    /// Table error.
    #[error("Table error: {0}")]
    Table(#[from] TableError),

    /// Settings error.
    #[error("Settings error: {0}")]
    Settings(#[from] SettingsError),
}

impl NodeError {
    /// Whether this is a cancellation rather than a failure.
    pub fn is_canceled(&self) -> bool {
        matches!(self, NodeError::Canceled)
    }
}

// =============================================================================
// Server Errors
// =============================================================================

/// HTTP server errors.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Node error.
    #[error("Node error: {0}")]
    Node(#[from] NodeError),

    /// Invalid request.
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Server internal error.
    #[error("Internal server error: {0}")]
    Internal(String),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for pattern operations.
pub type FormatResult<T> = Result<T, FormatError>;

/// Result type for table operations.
pub type TableResult<T> = Result<T, TableError>;

/// Result type for settings operations.
pub type SettingsResult<T> = Result<T, SettingsError>;

/// Result type for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Result type for node operations.
pub type NodeResult<T> = Result<T, NodeError>;

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_conversion_chain() {
        // TableError -> NodeError
        let table_err = TableError::EmptyFile;
        let node_err: NodeError = table_err.into();
        assert!(node_err.to_string().contains("empty"));

        // NodeError -> ServerError
        let server_err: ServerError = NodeError::Canceled.into();
        assert!(server_err.to_string().contains("canceled"));
    }

    #[test]
    fn test_invalid_format_message() {
        let err = NodeError::InvalidFormat {
            pattern: "%zzz".into(),
            source: FormatError::UnknownConversion("z".into()),
        };
        let msg = err.to_string();
        assert!(msg.contains("not a valid pattern String"));
        assert!(msg.contains("%zzz"));
        assert!(msg.contains("'z'"));
    }

    #[test]
    fn test_canceled_is_distinguishable() {
        assert!(NodeError::Canceled.is_canceled());
        let failed = NodeError::RowFormat {
            row: "Row0".into(),
            column: "A".into(),
            reason: "missing value".into(),
        };
        assert!(!failed.is_canceled());
    }
}
