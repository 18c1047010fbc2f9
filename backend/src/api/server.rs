//! HTTP Server for the Number Formatter.
//!
//! # API Endpoints
//!
//! | Method | Path              | Description                              |
//! |--------|-------------------|------------------------------------------|
//! | GET    | `/health`         | Health check                             |
//! | POST   | `/api/format`     | Upload a CSV and format its double columns |
//! | POST   | `/api/validate`   | Check a format pattern                   |
//! | GET    | `/api/logs`       | SSE stream of run logs                   |
//!
//! `/api/format` takes a multipart form with a `file` field and optional
//! `pattern` and `key_column` fields. Without `pattern` the pattern stored
//! in the settings file is used.

use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    http::{header, Method, StatusCode},
    response::{sse::Event, Json, Sse},
    routing::{get, post},
    Router,
};
use futures::stream::Stream;
use serde_json::{json, Value};
use std::{convert::Infallible, net::SocketAddr, time::Duration};
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt as _;
use tower_http::cors::CorsLayer;

use super::logs::{log_info, log_success, LOG_BROADCASTER};
use super::types::{error_reply, FormatResponse, ValidateRequest, ValidateResponse};
use crate::config::AppConfig;
use crate::error::{ServerError, ServerResult};
use crate::node::{NodeRunner, NumberFormatter};
use crate::parser::{parse_bytes_auto, ReadOptions};
use crate::settings::{FormatSettings, SettingsStore};
use crate::table::{to_csv_string, BufferedSink};
use crate::transform::{CancelHandle, ExecutionContext};
use crate::validation::{validate_format, PROBE_VALUE};

type ApiError = (StatusCode, Json<Value>);

/// Start the HTTP server; returns after Ctrl-C.
pub async fn start_server(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .expose_headers([header::CONTENT_TYPE]);

    let port = config.port;
    let body_limit = config.max_upload_bytes;

    let app = Router::new()
        .route("/", get(health))
        .route("/health", get(health))
        .route("/api/format", post(format_csv))
        .route("/api/validate", post(validate_pattern))
        .route("/api/logs", get(sse_logs))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors)
        .with_state(config);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    println!("🚀 Number Formatter running on http://localhost:{}", port);
    println!("   POST /api/format   - Upload CSV file");
    println!("   POST /api/validate - Check a format pattern");
    println!("   GET  /api/logs     - SSE log stream");
    println!("   GET  /health       - Health check");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;

    Ok(())
}

/// Health check endpoint
async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "numfmt",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "format": "POST /api/format",
            "validate": "POST /api/validate",
            "logs": "GET /api/logs (SSE)"
        }
    }))
}

/// SSE endpoint for real-time log streaming
async fn sse_logs() -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = LOG_BROADCASTER.subscribe();

    // Lagged receivers skip the entries they missed
    let stream = BroadcastStream::new(rx).filter_map(|result| {
        let entry = result.ok()?;
        let json = serde_json::to_string(&entry).ok()?;
        Some(Ok(Event::default().data(json)))
    });

    Sse::new(stream).keep_alive(
        axum::response::sse::KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}

/// Pattern check endpoint
async fn validate_pattern(Json(request): Json<ValidateRequest>) -> Json<ValidateResponse> {
    Json(check_pattern(&request.pattern))
}

/// Validate `pattern` and render the probe value for display.
pub fn check_pattern(pattern: &str) -> ValidateResponse {
    match validate_format(pattern).and_then(|p| p.render(PROBE_VALUE)) {
        Ok(sample) => ValidateResponse {
            pattern: pattern.to_string(),
            valid: true,
            sample: Some(sample),
            error: None,
        },
        Err(e) => ValidateResponse {
            pattern: pattern.to_string(),
            valid: false,
            sample: None,
            error: Some(e.to_string()),
        },
    }
}

/// Cancels the job when the request future is dropped.
struct CancelOnDrop(CancelHandle);

impl Drop for CancelOnDrop {
    fn drop(&mut self) {
        self.0.cancel();
    }
}

/// Upload endpoint
async fn format_csv(
    State(config): State<AppConfig>,
    mut multipart: Multipart,
) -> Result<Json<FormatResponse>, ApiError> {
    let mut file_data: Option<Vec<u8>> = None;
    let mut file_name: Option<String> = None;
    let mut pattern: Option<String> = None;
    let mut key_column: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| error_reply(&ServerError::BadRequest(format!("Multipart error: {}", e))))?
    {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "file" => {
                file_name = field.file_name().map(|s| s.to_string());
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| error_reply(&ServerError::BadRequest(format!("Read error: {}", e))))?;
                file_data = Some(bytes.to_vec());
            }
            "pattern" | "key_column" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| error_reply(&ServerError::BadRequest(format!("Read error: {}", e))))?;
                if name == "pattern" {
                    pattern = Some(text);
                } else {
                    key_column = Some(text).filter(|k| !k.trim().is_empty());
                }
            }
            _ => {}
        }
    }

    let bytes = file_data.ok_or_else(|| error_reply(&ServerError::BadRequest("No file provided".into())))?;

    let settings = match pattern {
        Some(p) if p.is_empty() => {
            return Err(error_reply(&ServerError::BadRequest(
                "Format pattern must not be empty".into(),
            )))
        }
        Some(p) => FormatSettings::new(p),
        None => SettingsStore::open(&config.settings_path)
            .map_err(|e| error_reply(&ServerError::Node(e.into())))?
            .snapshot(),
    };

    log_info(format!(
        "Upload: {} ({} bytes), pattern \"{}\"",
        file_name.as_deref().unwrap_or("unknown"),
        bytes.len(),
        settings.number_format
    ));

    let cancel = CancelHandle::new();
    let _guard = CancelOnDrop(cancel.clone());

    let response = tokio::task::spawn_blocking(move || run_format_job(&bytes, &settings, key_column, cancel))
        .await
        .map_err(|e| error_reply(&ServerError::Internal(format!("Job panicked: {}", e))))?
        .map_err(|e| error_reply(&e))?;

    log_success(format!("Job {} done: {} rows", response.job_id, response.metadata.row_count));
    Ok(Json(response))
}

/// Parse `bytes` as CSV and format it with `settings`.
pub fn run_format_job(
    bytes: &[u8],
    settings: &FormatSettings,
    key_column: Option<String>,
    cancel: CancelHandle,
) -> ServerResult<FormatResponse> {
    let options = ReadOptions {
        delimiter: None,
        key_column,
    };
    let parsed = parse_bytes_auto(bytes, &options).map_err(|e| ServerError::Node(e.into()))?;

    let runner = NodeRunner::new(NumberFormatter);
    let ctx = ExecutionContext::new().with_cancel_handle(cancel);
    let summary = runner.execute(settings, &parsed.table, BufferedSink::new(), &ctx)?;

    let csv = to_csv_string(&summary.output, parsed.delimiter).map_err(|e| ServerError::Internal(e.to_string()))?;
    Ok(FormatResponse::new(&settings.number_format, &parsed, summary, csv))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::FormattedRow;
    use crate::error::NodeError;

    #[test]
    fn test_check_pattern() {
        let ok = check_pattern("%.3f");
        assert!(ok.valid);
        assert_eq!(ok.sample.as_deref(), Some("0.012"));

        let hex = check_pattern("%a");
        assert_eq!(hex.sample.as_deref(), Some("0x1.948b0f8fab5e6p-7"));

        let bad = check_pattern("%zzz");
        assert!(!bad.valid);
        assert!(bad.error.unwrap().contains("'z'"));
    }

    #[test]
    fn test_run_format_job() {
        let csv = b"name;price;qty\nA;3.14159;2\nB;2.5;1";
        let response = run_format_job(csv, &FormatSettings::new("%.2f"), None, CancelHandle::new()).unwrap();

        assert_eq!(response.status, "ready");
        assert_eq!(response.output_spec.names(), vec!["Formatted(price)"]);
        assert_eq!(
            response.rows[0],
            FormattedRow {
                key: "Row0".into(),
                values: vec!["3.14".into()],
            }
        );
        assert_eq!(response.csv, "RowID;Formatted(price)\nRow0;3.14\nRow1;2.50\n");
        assert_eq!(response.metadata.csv_info.delimiter, ";");
    }

    #[test]
    fn test_run_format_job_with_key_column() {
        let csv = b"id,v\nx,1.5\ny,2.25";
        let response = run_format_job(csv, &FormatSettings::new("%.1f"), Some("id".into()), CancelHandle::new()).unwrap();
        let keys: Vec<&str> = response.rows.iter().map(|r| r.key.as_str()).collect();
        assert_eq!(keys, vec!["x", "y"]);
        assert_eq!(response.rows[1].values, vec!["2.3"]);
    }

    #[test]
    fn test_run_format_job_errors() {
        let csv = b"a\n1.5";
        let err = run_format_job(csv, &FormatSettings::new("%d"), None, CancelHandle::new()).unwrap_err();
        assert!(matches!(err, ServerError::Node(NodeError::InvalidFormat { .. })));

        let cancel = CancelHandle::new();
        cancel.cancel();
        let err = run_format_job(csv, &FormatSettings::default(), None, cancel).unwrap_err();
        assert!(matches!(err, ServerError::Node(NodeError::Canceled)));

        let err = run_format_job(b"", &FormatSettings::default(), None, CancelHandle::new()).unwrap_err();
        assert!(matches!(err, ServerError::Node(NodeError::Table(_))));
    }
}
