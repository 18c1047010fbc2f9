//! Workflow node lifecycle.
//!
//! A node exposes three capabilities through [`TableNode`]: validate its
//! settings into an immutable config, derive its output spec from an input
//! spec, and build the [`RowTransform`] that maps input rows to output rows
//! during one run. [`NodeRunner`] wraps any
//! such node and provides the two phases a host drives:
//!
//! - **configure**: validate settings and announce the output spec
//! - **execute**: run every row through the node into a sink, with
//!   cancellation and progress, committing all-or-nothing
//!
//! # Example
//!
//! ```rust,ignore
//! use numfmt::node::{NodeRunner, NumberFormatter};
//! use numfmt::settings::FormatSettings;
//! use numfmt::table::BufferedSink;
//! use numfmt::transform::ExecutionContext;
//!
//! let runner = NodeRunner::new(NumberFormatter);
//! let settings = FormatSettings::new("%.2f");
//! let summary = runner.execute(&settings, &table, BufferedSink::new(), &ExecutionContext::new())?;
//! println!("{} rows formatted", summary.rows);
//! ```

use crate::api::logs::{log_job, LogEntry};
use crate::error::{NodeError, NodeResult};
use crate::format::FormatPattern;
use crate::models::{Row, TableSpec};
use crate::settings::FormatSettings;
use crate::table::{TableSink, TableSource};
use crate::transform::{derive_output_spec, execute_rows, ExecutionMonitor, RowFormatter};
use crate::validation::validate_format;

// =============================================================================
// Capability trait
// =============================================================================

/// Maps input rows to output rows for one run.
pub trait RowTransform {
    fn transform(&self, row: &Row) -> NodeResult<Row>;
}

impl RowTransform for RowFormatter<'_> {
    fn transform(&self, row: &Row) -> NodeResult<Row> {
        RowFormatter::transform(self, row)
    }
}

/// What a table-to-table node can do.
pub trait TableNode {
    /// Raw user settings.
    type Settings;
    /// Validated, immutable form of the settings.
    type Config;

    /// Display name used in logs.
    fn name(&self) -> &'static str;

    fn validate_config(&self, settings: &Self::Settings) -> NodeResult<Self::Config>;

    /// Must be pure: the same input spec always gives the same output spec.
    fn derive_spec(&self, input: &TableSpec) -> TableSpec;

    /// Row mapper for one execution over `input`; built once per run.
    fn row_transform<'a>(&'a self, config: &'a Self::Config, input: &'a TableSpec) -> Box<dyn RowTransform + 'a>;
}

// =============================================================================
// Number Formatter
// =============================================================================

/// Validated formatter configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatterConfig {
    pub pattern: FormatPattern,
}

/// Renders every floating-point column through a format pattern.
#[derive(Debug, Clone, Copy, Default)]
pub struct NumberFormatter;

impl TableNode for NumberFormatter {
    type Settings = FormatSettings;
    type Config = FormatterConfig;

    fn name(&self) -> &'static str {
        "Number Formatter"
    }

    fn validate_config(&self, settings: &FormatSettings) -> NodeResult<FormatterConfig> {
        let pattern = validate_format(&settings.number_format).map_err(|source| NodeError::InvalidFormat {
            pattern: settings.number_format.clone(),
            source,
        })?;
        Ok(FormatterConfig { pattern })
    }

    fn derive_spec(&self, input: &TableSpec) -> TableSpec {
        derive_output_spec(input)
    }

    fn row_transform<'a>(&'a self, config: &'a FormatterConfig, input: &'a TableSpec) -> Box<dyn RowTransform + 'a> {
        Box::new(RowFormatter::new(input, &config.pattern))
    }
}

// =============================================================================
// Runner
// =============================================================================

/// Outcome of the configure phase.
#[derive(Debug, Clone)]
pub struct Configured<C> {
    pub config: C,
    pub input_spec: TableSpec,
    pub output_spec: TableSpec,
}

/// Outcome of a successful execute phase.
#[derive(Debug)]
pub struct ExecutionSummary<T> {
    pub job_id: String,
    pub rows: usize,
    pub output_spec: TableSpec,
    pub output: T,
}

/// Drives a [`TableNode`] through configure and execute.
#[derive(Debug, Clone, Default)]
pub struct NodeRunner<N> {
    node: N,
}

impl<N: TableNode> NodeRunner<N> {
    pub fn new(node: N) -> Self {
        Self { node }
    }

    pub fn node(&self) -> &N {
        &self.node
    }

    /// Validate `settings` and announce the output spec for `input`.
    pub fn configure(&self, settings: &N::Settings, input: &TableSpec) -> NodeResult<Configured<N::Config>> {
        let config = self.node.validate_config(settings)?;
        let output_spec = self.node.derive_spec(input);
        Ok(Configured {
            config,
            input_spec: input.clone(),
            output_spec,
        })
    }

    /// Configure against `source` and execute in one go.
    pub fn execute<S, K, M>(
        &self,
        settings: &N::Settings,
        source: &S,
        sink: K,
        monitor: &M,
    ) -> NodeResult<ExecutionSummary<K::Output>>
    where
        S: TableSource + ?Sized,
        K: TableSink,
        M: ExecutionMonitor + ?Sized,
    {
        let job_id = uuid::Uuid::new_v4().to_string();
        let configured = self.configure(settings, source.spec()).map_err(|e| {
            log_job(&job_id, LogEntry::error(format!("{}: {}", self.node.name(), e)));
            e
        })?;
        self.run(job_id, &configured, source, sink, monitor)
    }

    /// Execute with a config obtained from an earlier [`NodeRunner::configure`].
    ///
    /// Fails with [`NodeError::SpecMismatch`] when `source` no longer yields
    /// the announced output spec.
    pub fn execute_configured<S, K, M>(
        &self,
        configured: &Configured<N::Config>,
        source: &S,
        sink: K,
        monitor: &M,
    ) -> NodeResult<ExecutionSummary<K::Output>>
    where
        S: TableSource + ?Sized,
        K: TableSink,
        M: ExecutionMonitor + ?Sized,
    {
        self.run(uuid::Uuid::new_v4().to_string(), configured, source, sink, monitor)
    }

    fn run<S, K, M>(
        &self,
        job_id: String,
        configured: &Configured<N::Config>,
        source: &S,
        sink: K,
        monitor: &M,
    ) -> NodeResult<ExecutionSummary<K::Output>>
    where
        S: TableSource + ?Sized,
        K: TableSink,
        M: ExecutionMonitor + ?Sized,
    {
        let input = source.spec();
        let output_spec = self.node.derive_spec(input);
        if output_spec != configured.output_spec {
            log_job(&job_id, LogEntry::error("Output spec differs from configured spec"));
            return Err(NodeError::SpecMismatch);
        }

        log_job(
            &job_id,
            LogEntry::info(format!(
                "{}: {} input columns, {} output columns",
                self.node.name(),
                input.len(),
                output_spec.len()
            )),
        );

        let mapper = self.node.row_transform(&configured.config, input);
        let result = execute_rows(source, sink, &output_spec, monitor, |row| mapper.transform(row));

        match result {
            Ok(done) => {
                log_job(&job_id, LogEntry::success(format!("Formatted {} rows", done.rows)));
                Ok(ExecutionSummary {
                    job_id,
                    rows: done.rows,
                    output_spec,
                    output: done.output,
                })
            }
            Err(e) if e.is_canceled() => {
                log_job(&job_id, LogEntry::warning("Execution canceled, no output written"));
                Err(e)
            }
            Err(e) => {
                log_job(&job_id, LogEntry::error(e.to_string()));
                Err(e)
            }
        }
    }
}
