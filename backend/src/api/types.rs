//! REST API types.

use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::error::{NodeError, ServerError};
use crate::models::{DataTable, TableSpec};
use crate::node::ExecutionSummary;
use crate::parser::ParseResult;

/// Response sent after a CSV upload was formatted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormatResponse {
    /// Unique job identifier
    pub job_id: String,

    /// Always "ready"; failures use [`error_response`]
    pub status: String,

    /// Announced output columns
    pub output_spec: TableSpec,

    /// One entry per input row, in input order
    pub rows: Vec<FormattedRow>,

    /// Output table as CSV, row keys first
    pub csv: String,

    pub metadata: FormatMetadata,
}

/// Formatted values of one row.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FormattedRow {
    pub key: String,
    pub values: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormatMetadata {
    /// Pattern the job ran with
    pub pattern: String,
    pub row_count: usize,
    pub csv_info: CsvMetadata,
}

/// CSV file metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CsvMetadata {
    pub encoding: String,
    pub delimiter: String,
    pub row_count: usize,
    /// Input columns with their inferred kinds
    pub columns: TableSpec,
}

impl FormatResponse {
    pub fn new(
        pattern: &str,
        parsed: &ParseResult,
        summary: ExecutionSummary<DataTable>,
        csv: String,
    ) -> Self {
        let rows = summary
            .output
            .rows
            .iter()
            .map(|row| FormattedRow {
                key: row.key.clone(),
                values: row.cells.iter().map(|c| c.to_plain_string()).collect(),
            })
            .collect();

        Self {
            job_id: summary.job_id,
            status: "ready".to_string(),
            output_spec: summary.output_spec,
            rows,
            csv,
            metadata: FormatMetadata {
                pattern: pattern.to_string(),
                row_count: summary.rows,
                csv_info: CsvMetadata {
                    encoding: parsed.encoding.clone(),
                    delimiter: parsed.delimiter.to_string(),
                    row_count: parsed.table.row_count(),
                    columns: parsed.table.spec.clone(),
                },
            },
        }
    }
}

/// Body of `POST /api/validate`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidateRequest {
    pub pattern: String,
}

/// Result of a pattern check.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ValidateResponse {
    pub pattern: String,
    pub valid: bool,
    /// Probe value rendered through the pattern
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sample: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Create an error response
pub fn error_response(error: &str) -> Value {
    json!({
        "jobId": Uuid::new_v4().to_string(),
        "status": "error",
        "error": error,
        "rows": [],
    })
}

/// HTTP status for a server error.
pub fn status_for(err: &ServerError) -> StatusCode {
    match err {
        ServerError::BadRequest(_) => StatusCode::BAD_REQUEST,
        ServerError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        ServerError::Node(node) => match node {
            NodeError::InvalidFormat { .. } | NodeError::Table(_) => StatusCode::BAD_REQUEST,
            NodeError::RowFormat { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            NodeError::Canceled => StatusCode::SERVICE_UNAVAILABLE,
            NodeError::SpecMismatch | NodeError::Settings(_) => StatusCode::INTERNAL_SERVER_ERROR,
        },
    }
}

/// Status code plus JSON error body.
pub fn error_reply(err: &ServerError) -> (StatusCode, Json<Value>) {
    (status_for(err), Json(error_response(&err.to_string())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{FormatError, TableError};

    #[test]
    fn test_status_mapping() {
        let invalid = ServerError::Node(NodeError::InvalidFormat {
            pattern: "%d".into(),
            source: FormatError::IllegalConversion('d'),
        });
        assert_eq!(status_for(&invalid), StatusCode::BAD_REQUEST);

        let row = ServerError::Node(NodeError::RowFormat {
            row: "Row0".into(),
            column: "A".into(),
            reason: "missing value".into(),
        });
        assert_eq!(status_for(&row), StatusCode::UNPROCESSABLE_ENTITY);

        let table = ServerError::Node(NodeError::Table(TableError::EmptyFile));
        assert_eq!(status_for(&table), StatusCode::BAD_REQUEST);

        assert_eq!(
            status_for(&ServerError::Internal("boom".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_error_body() {
        let (status, Json(body)) = error_reply(&ServerError::BadRequest("No file provided".into()));
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["status"], "error");
        assert!(body["error"].as_str().unwrap().contains("No file provided"));
    }

    #[test]
    fn test_validate_response_skips_empty_fields() {
        let ok = ValidateResponse {
            pattern: "%.3f".into(),
            valid: true,
            sample: Some("0.012".into()),
            error: None,
        };
        let json = serde_json::to_value(&ok).unwrap();
        assert_eq!(json["sample"], "0.012");
        assert!(json.get("error").is_none());
    }
}
