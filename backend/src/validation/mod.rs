//! Configuration checks for the Number Formatter node.
//!
//! Two gates run before any row is touched:
//!
//! - **Format check**: the configured pattern must parse and must render the
//!   probe value [`PROBE_VALUE`]. The probe output is discarded; only failure
//!   matters. This runs once per configuration pass, never per row.
//! - **Settings check**: a persisted settings document must match the
//!   embedded JSON Schema (`schemas/number-formatter-settings.json`) before
//!   it is loaded.
//!
//! # Example
//!
//! ```rust,ignore
//! use numfmt::validation::{validate_format, validate_settings};
//! use serde_json::json;
//!
//! assert!(validate_format("%.3f").is_ok());
//! assert!(validate_format("%zzz").is_err());
//!
//! assert!(validate_settings(&json!({ "number_format": "%.2f" })).is_ok());
//! ```

use once_cell::sync::Lazy;
use serde_json::Value;

use crate::error::FormatError;
use crate::format::FormatPattern;

/// Sample value rendered by the format check.
pub const PROBE_VALUE: f64 = 0.0123456789;

static SETTINGS_SCHEMA: Lazy<Value> = Lazy::new(|| {
    serde_json::from_str(include_str!("../../schemas/number-formatter-settings.json"))
        .expect("Invalid embedded schema")
});

/// Parse `pattern` and render the probe value through it.
///
/// Returns the parsed pattern so callers can reuse it for every row.
pub fn validate_format(pattern: &str) -> Result<FormatPattern, FormatError> {
    let parsed = FormatPattern::parse(pattern)?;
    parsed.render(PROBE_VALUE)?;
    Ok(parsed)
}

/// Quick check: true if `pattern` passes [`validate_format`].
pub fn is_valid_format(pattern: &str) -> bool {
    validate_format(pattern).is_ok()
}

/// Validate a JSON value against a JSON schema.
///
/// # Returns
/// * `Ok(())` if valid
/// * `Err(Vec<String>)` with every error otherwise
pub fn validate(schema: &Value, data: &Value) -> Result<(), Vec<String>> {
    let validator = jsonschema::draft7::new(schema)
        .map_err(|e| vec![format!("Invalid schema: {}", e)])?;

    let errors: Vec<String> = validator
        .iter_errors(data)
        .map(|e| e.to_string())
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validate a settings document against the embedded settings schema.
pub fn validate_settings(data: &Value) -> Result<(), Vec<String>> {
    validate(&SETTINGS_SCHEMA, data)
}

/// Quick check against the settings schema.
pub fn is_valid_settings(data: &Value) -> bool {
    jsonschema::draft7::is_valid(&SETTINGS_SCHEMA, data)
}
