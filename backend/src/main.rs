//! numfmt CLI - Format the floating-point columns of CSV files
//!
//! # Main Commands
//!
//! ```bash
//! numfmt format prices.csv -p "%.2f"   # Format double columns, CSV to stdout
//! numfmt configure prices.csv          # Show the output columns
//! numfmt validate "%,.3f"              # Check a format pattern
//! numfmt settings set "%e"             # Store the default pattern
//! numfmt serve                         # Start HTTP server (port 3000)
//! ```

use clap::{Parser, Subcommand};
use numfmt::api::logs::log_warning;
use numfmt::server::start_server;
use numfmt::{
    parse_csv_file_auto, to_csv_string, AppConfig, BufferedSink, CancelHandle, CsvFileSink,
    ExecutionContext, FormatSettings, NodeRunner, NumberFormatter, ParseResult, ReadOptions,
    SettingsStore, PROBE_VALUE,
};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Parser)]
#[command(name = "numfmt")]
#[command(about = "Render floating-point CSV columns through a printf-style pattern", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Format every double column of a CSV file
    Format {
        /// Input CSV file
        input: PathBuf,

        /// Format pattern (default: stored setting)
        #[arg(short, long)]
        pattern: Option<String>,

        /// CSV delimiter (auto-detect if not specified)
        #[arg(short, long)]
        delimiter: Option<char>,

        /// Column holding the row keys
        #[arg(short, long)]
        key_column: Option<String>,

        /// Output CSV file, written only if every row succeeds (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print the output table as JSON instead of CSV
        #[arg(long, conflicts_with = "output")]
        json: bool,
    },

    /// Validate the pattern and print the output spec of a CSV file
    Configure {
        /// Input CSV file
        input: PathBuf,

        /// Format pattern (default: stored setting)
        #[arg(short, long)]
        pattern: Option<String>,

        /// CSV delimiter (auto-detect if not specified)
        #[arg(short, long)]
        delimiter: Option<char>,

        /// Column holding the row keys
        #[arg(short, long)]
        key_column: Option<String>,
    },

    /// Check a format pattern against the probe value
    Validate {
        /// Format pattern
        pattern: String,
    },

    /// Manage the stored format pattern
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },

    /// Start HTTP server
    Serve {
        /// Port to listen on (default: NUMFMT_PORT or 3000)
        #[arg(short, long)]
        port: Option<u16>,
    },
}

#[derive(Subcommand)]
enum SettingsAction {
    /// Print the stored pattern
    Get,

    /// Store a new pattern
    Set {
        /// Format pattern
        pattern: String,
    },

    /// Restore the default pattern
    Reset,

    /// Print the settings file location
    Path,
}

#[tokio::main]
async fn main() {
    let config = match AppConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("❌ Error: {}", e);
            std::process::exit(1);
        }
    };

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Format {
            input,
            pattern,
            delimiter,
            key_column,
            output,
            json,
        } => {
            cmd_format(
                &config,
                input,
                pattern,
                read_options(delimiter, key_column),
                output,
                json,
            )
            .await
        }

        Commands::Configure {
            input,
            pattern,
            delimiter,
            key_column,
        } => cmd_configure(&config, &input, pattern, read_options(delimiter, key_column)),

        Commands::Validate { pattern } => cmd_validate(&pattern),

        Commands::Settings { action } => cmd_settings(&config, action),

        Commands::Serve { port } => {
            let config = match port {
                Some(p) => config.with_port(p),
                None => config,
            };
            start_server(config).await
        }
    };

    if let Err(e) = result {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

fn read_options(delimiter: Option<char>, key_column: Option<String>) -> ReadOptions {
    ReadOptions {
        delimiter,
        key_column,
    }
}

/// Pattern given on the command line, or the stored one.
fn resolve_settings(config: &AppConfig, pattern: Option<String>) -> Result<FormatSettings, Box<dyn std::error::Error>> {
    match pattern {
        Some(p) => Ok(FormatSettings::new(p)),
        None => Ok(SettingsStore::open(&config.settings_path)?.snapshot()),
    }
}

fn load_input(input: &Path, options: &ReadOptions) -> Result<ParseResult, Box<dyn std::error::Error>> {
    eprintln!("📄 Reading: {}", input.display());
    let parsed = parse_csv_file_auto(input, options)?;
    eprintln!("   Encoding: {}", parsed.encoding);
    eprintln!("   Delimiter: '{}'", format_delimiter(parsed.delimiter));
    eprintln!("   Rows: {}", parsed.table.row_count());
    Ok(parsed)
}

fn format_delimiter(d: char) -> String {
    match d {
        '\t' => "\\t".to_string(),
        c => c.to_string(),
    }
}

/// Result of a blocking format job.
enum FormatOutput {
    File(PathBuf),
    Text(String),
}

async fn cmd_format(
    config: &AppConfig,
    input: PathBuf,
    pattern: Option<String>,
    options: ReadOptions,
    output: Option<PathBuf>,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let settings = resolve_settings(config, pattern)?;
    let cancel = CancelHandle::new();
    let job_cancel = cancel.clone();

    let job = tokio::task::spawn_blocking(move || -> Result<FormatOutput, String> {
        let parsed = load_input(&input, &options).map_err(|e| e.to_string())?;
        let last_percent = AtomicUsize::new(usize::MAX);
        let ctx = ExecutionContext::new()
            .with_cancel_handle(job_cancel)
            .with_progress(move |fraction, message| {
                let percent = (fraction * 100.0) as usize;
                if last_percent.swap(percent, Ordering::Relaxed) != percent && percent % 10 == 0 {
                    eprintln!("   {:>3}% {}", percent, message);
                }
            });
        let runner = NodeRunner::new(NumberFormatter);

        match output {
            Some(path) => {
                let sink = CsvFileSink::new(path, parsed.delimiter);
                let summary = runner
                    .execute(&settings, &parsed.table, sink, &ctx)
                    .map_err(|e| e.to_string())?;
                Ok(FormatOutput::File(summary.output))
            }
            None => {
                let summary = runner
                    .execute(&settings, &parsed.table, BufferedSink::new(), &ctx)
                    .map_err(|e| e.to_string())?;
                let text = if json {
                    summary.output.to_json().map_err(|e| e.to_string())?
                } else {
                    to_csv_string(&summary.output, parsed.delimiter).map_err(|e| e.to_string())?
                };
                Ok(FormatOutput::Text(text))
            }
        }
    });
    tokio::pin!(job);

    let result = tokio::select! {
        res = &mut job => res,
        _ = tokio::signal::ctrl_c() => {
            log_warning("Ctrl-C received, canceling");
            cancel.cancel();
            job.await
        }
    };

    match result?? {
        FormatOutput::File(path) => eprintln!("💾 Output written to: {}", path.display()),
        FormatOutput::Text(text) => print!("{}", text),
    }
    Ok(())
}

fn cmd_configure(
    config: &AppConfig,
    input: &Path,
    pattern: Option<String>,
    options: ReadOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    let settings = resolve_settings(config, pattern)?;
    let parsed = load_input(input, &options)?;

    let configured = NodeRunner::new(NumberFormatter).configure(&settings, &parsed.table.spec)?;
    eprintln!("✅ Pattern \"{}\" is valid", configured.config.pattern);
    println!("{}", serde_json::to_string_pretty(&configured.output_spec)?);
    Ok(())
}

fn cmd_validate(pattern: &str) -> Result<(), Box<dyn std::error::Error>> {
    let parsed = numfmt::validate_format(pattern)?;
    eprintln!("✅ Valid pattern");
    println!("{}", parsed.render(PROBE_VALUE)?);
    Ok(())
}

fn cmd_settings(config: &AppConfig, action: SettingsAction) -> Result<(), Box<dyn std::error::Error>> {
    let mut store = SettingsStore::open(&config.settings_path)?;

    match action {
        SettingsAction::Get => println!("{}", store.get()),

        SettingsAction::Set { pattern } => {
            if pattern.is_empty() {
                return Err("Format pattern must not be empty".into());
            }
            if let Err(e) = numfmt::validate_format(&pattern) {
                eprintln!("⚠️  Pattern does not pass validation: {}", e);
            }
            store.set(pattern);
            store.save()?;
            eprintln!("💾 Saved to: {}", store.path().display());
        }

        SettingsAction::Reset => {
            store.reset();
            store.save()?;
            eprintln!("↩️  Reset to \"{}\"", store.get());
        }

        SettingsAction::Path => println!("{}", store.path().display()),
    }

    Ok(())
}
