//! Row-at-a-time execution driver.
//!
//! The driver pulls rows from a [`TableSource`], maps each one, pushes the
//! result into a [`TableSink`] and, after every row, asks the
//! [`ExecutionMonitor`] whether to stop and reports progress.
//!
//! Output is all-or-nothing: on any error (cancellation included) the sink
//! is dropped without being closed.
//!
//! # Example
//!
//! ```rust,ignore
//! use numfmt::transform::pipeline::{execute_rows, ExecutionContext};
//! use numfmt::table::BufferedSink;
//!
//! let ctx = ExecutionContext::new();
//! let stop = ctx.cancel_handle();
//! // hand `stop` to another thread; `stop.cancel()` aborts after the current row
//! let table = execute_rows(&input, BufferedSink::new(), &output_spec, &ctx, |row| {
//!     Ok(row.clone())
//! })?;
//! ```

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::{NodeError, NodeResult};
use crate::models::{Row, TableSpec};
use crate::table::{TableSink, TableSource};

/// Callbacks the driver invokes once per row.
pub trait ExecutionMonitor {
    /// `Err(NodeError::Canceled)` once cancellation was requested.
    fn check_canceled(&self) -> NodeResult<()>;

    /// Fraction of rows done, in `[0, 1]`.
    fn set_progress(&self, fraction: f64, message: &str);
}

/// Cloneable handle used to request cancellation from another thread.
#[derive(Debug, Clone, Default)]
pub struct CancelHandle {
    flag: Arc<AtomicBool>,
}

impl CancelHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_canceled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

type ProgressFn = Box<dyn Fn(f64, &str) + Send + Sync>;

/// Default monitor: a cancellation flag plus an optional progress callback.
#[derive(Default)]
pub struct ExecutionContext {
    cancel: CancelHandle,
    progress: Option<ProgressFn>,
}

impl ExecutionContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Share an existing cancellation handle.
    pub fn with_cancel_handle(mut self, cancel: CancelHandle) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn with_progress(mut self, progress: impl Fn(f64, &str) + Send + Sync + 'static) -> Self {
        self.progress = Some(Box::new(progress));
        self
    }

    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }
}

impl fmt::Debug for ExecutionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecutionContext")
            .field("cancel", &self.cancel)
            .field("progress", &self.progress.is_some())
            .finish()
    }
}

impl ExecutionMonitor for ExecutionContext {
    fn check_canceled(&self) -> NodeResult<()> {
        if self.cancel.is_canceled() {
            Err(NodeError::Canceled)
        } else {
            Ok(())
        }
    }

    fn set_progress(&self, fraction: f64, message: &str) {
        if let Some(progress) = &self.progress {
            progress(fraction, message);
        }
    }
}

/// Result of a completed run.
#[derive(Debug)]
pub struct RowsExecuted<T> {
    pub output: T,
    pub rows: usize,
}

/// Drive `source` through `transform` into `sink`.
///
/// The sink is opened with `output_spec` and closed only after the last row
/// went through.
pub fn execute_rows<S, K, M, F>(
    source: &S,
    mut sink: K,
    output_spec: &TableSpec,
    monitor: &M,
    mut transform: F,
) -> NodeResult<RowsExecuted<K::Output>>
where
    S: TableSource + ?Sized,
    K: TableSink,
    M: ExecutionMonitor + ?Sized,
    F: FnMut(&Row) -> NodeResult<Row>,
{
    sink.open(output_spec)?;
    let total = source.row_count();
    let mut processed = 0usize;

    for row in source.rows() {
        let row = row?;
        sink.add_row(transform(&row)?)?;
        processed += 1;

        monitor.check_canceled()?;
        if let Some(total) = total.filter(|t| *t > 0) {
            monitor.set_progress(
                processed as f64 / total as f64,
                &format!("Formatting row {}", processed),
            );
        }
    }

    let output = sink.close()?;
    Ok(RowsExecuted {
        output,
        rows: processed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Cell, ColumnKind, ColumnSpec, DataTable};
    use crate::table::BufferedSink;
    use std::sync::Mutex;

    fn numbers(n: usize) -> DataTable {
        let spec = TableSpec::new(vec![ColumnSpec::new("v", ColumnKind::Double)]).unwrap();
        let rows = (0..n)
            .map(|i| Row::new(format!("Row{}", i), vec![Cell::Double(i as f64)]))
            .collect();
        DataTable::new(spec, rows).unwrap()
    }

    /// Cancels once `after` rows were checked.
    struct CancelAfter {
        after: usize,
        seen: Mutex<usize>,
    }

    impl ExecutionMonitor for CancelAfter {
        fn check_canceled(&self) -> NodeResult<()> {
            let mut seen = self.seen.lock().unwrap();
            *seen += 1;
            if *seen >= self.after {
                Err(NodeError::Canceled)
            } else {
                Ok(())
            }
        }

        fn set_progress(&self, _fraction: f64, _message: &str) {}
    }

    #[test]
    fn test_identity_run() {
        let input = numbers(3);
        let ctx = ExecutionContext::new();
        let done = execute_rows(&input, BufferedSink::new(), &input.spec, &ctx, |r| Ok(r.clone())).unwrap();
        assert_eq!(done.rows, 3);
        assert_eq!(done.output, input);
    }

    #[test]
    fn test_progress_reported_per_row() {
        let input = numbers(4);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink_seen = Arc::clone(&seen);
        let ctx = ExecutionContext::new().with_progress(move |fraction, message| {
            sink_seen.lock().unwrap().push((fraction, message.to_string()));
        });

        execute_rows(&input, BufferedSink::new(), &input.spec, &ctx, |r| Ok(r.clone())).unwrap();

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 4);
        assert_eq!(seen[0], (0.25, "Formatting row 1".to_string()));
        assert_eq!(seen[3].0, 1.0);
    }

    #[test]
    fn test_cancellation_stops_mid_run() {
        let input = numbers(10);
        let monitor = CancelAfter {
            after: 3,
            seen: Mutex::new(0),
        };
        let mut transformed = 0;
        let result = execute_rows(&input, BufferedSink::new(), &input.spec, &monitor, |r| {
            transformed += 1;
            Ok(r.clone())
        });
        assert!(matches!(result, Err(ref e) if e.is_canceled()));
        assert_eq!(transformed, 3);
    }

    #[test]
    fn test_cancel_handle_before_start() {
        let input = numbers(2);
        let ctx = ExecutionContext::new();
        ctx.cancel_handle().cancel();
        let result = execute_rows(&input, BufferedSink::new(), &input.spec, &ctx, |r| Ok(r.clone()));
        assert!(matches!(result, Err(NodeError::Canceled)));
    }

    #[test]
    fn test_transform_error_aborts() {
        let input = numbers(5);
        let ctx = ExecutionContext::new();
        let result = execute_rows(&input, BufferedSink::new(), &input.spec, &ctx, |r| {
            if r.key == "Row2" {
                Err(NodeError::RowFormat {
                    row: r.key.clone(),
                    column: "v".into(),
                    reason: "boom".into(),
                })
            } else {
                Ok(r.clone())
            }
        });
        assert!(matches!(result, Err(NodeError::RowFormat { ref row, .. }) if row == "Row2"));
    }
}
