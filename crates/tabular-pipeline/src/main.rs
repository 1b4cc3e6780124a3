//! CLI entry point for the table cleaning and reporting pipeline.

use anyhow::{Context, Result, anyhow};
use clap::{Parser, ValueEnum};
use polars::io::csv::read::CsvReadOptions;
use polars::prelude::*;
use std::path::{Path, PathBuf};
use tabular_pipeline::{CleaningPlan, QualityReport, ReportConfig, ReportEmitter, TableCleaner};
use tracing::{debug, error, info};

/// Reports the CLI can emit after cleaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ReportKind {
    /// Plain-text summary report
    Summary,
    /// Multi-sheet workbook with data, statistics, nulls and types
    Workbook,
    /// Cleaned table as delimited text
    Csv,
    /// Data quality report as plain text
    Quality,
    /// Per-column missing-data workbook
    Missing,
}

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Table cleaning and report generation",
    long_about = "Loads a CSV file, applies an optional JSON cleaning plan and renders reports.\n\n\
                  EXAMPLES:\n  \
                  # Quality report only\n  \
                  tabular-pipeline -i data.csv\n\n  \
                  # Clean with a plan and export the result\n  \
                  tabular-pipeline -i data.csv --plan plan.json --report csv --report workbook\n\n  \
                  # Machine-readable quality report\n  \
                  tabular-pipeline -i data.csv --plan plan.json --json"
)]
struct Args {
    /// Path to the CSV file to process
    #[arg(short, long)]
    input: String,

    /// JSON cleaning plan applied before reporting
    #[arg(short, long)]
    plan: Option<String>,

    /// Output directory for reports
    #[arg(short, long, default_value = "./output")]
    output: String,

    /// Report name used in titles and file names
    ///
    /// If not specified, uses the input file stem
    #[arg(short, long)]
    name: Option<String>,

    /// Separator for delimited output (single ASCII character)
    #[arg(long, default_value = ",")]
    separator: char,

    /// Do not write a byte-order mark at the start of delimited output
    #[arg(long)]
    no_bom: bool,

    /// Reports to emit (repeatable)
    #[arg(short, long, value_enum)]
    report: Vec<ReportKind>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Suppress progress output (only show errors and final result)
    #[arg(short, long)]
    quiet: bool,

    /// Print the quality report as JSON to stdout instead of text
    ///
    /// Disables all progress logs; only outputs the final JSON report.
    #[arg(long)]
    json: bool,
}

/// Initialize the tracing subscriber for logging.
///
/// When `json_output` is true, logging is completely disabled to ensure
/// only JSON is written to stdout.
fn init_logging(level: &str, quiet: bool, json_output: bool) {
    if json_output {
        return;
    }

    use tracing_subscriber::EnvFilter;

    let effective_level = if quiet { "warn" } else { level };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(effective_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(&args.log_level, args.quiet, args.json);

    if !Path::new(&args.input).exists() {
        return Err(anyhow!("Input file not found: {}", args.input));
    }

    let separator = u8::try_from(args.separator)
        .map_err(|_| anyhow!("Separator must be a single ASCII character"))?;
    let config = ReportConfig::builder()
        .output_dir(&args.output)
        .separator(separator)
        .csv_bom(!args.no_bom)
        .build()?;

    info!("Loading dataset from: {}", args.input);
    let data = load_csv_with_fallbacks(&args.input)?;
    info!("Dataset loaded successfully: {:?}", data.shape());

    let mut cleaner = TableCleaner::new(data);

    if let Some(ref plan_path) = args.plan {
        let plan = CleaningPlan::from_path(Path::new(plan_path))?;
        info!("Applying cleaning plan with {} steps", plan.steps.len());
        cleaner.apply_plan(&plan)?;
    }

    let quality = cleaner.quality_report()?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&quality)?);
    }

    let name = args
        .name
        .clone()
        .unwrap_or_else(|| extract_file_stem(&args.input));
    let emitter = ReportEmitter::with_config(cleaner.into_current(), name, config);

    emit_reports(&emitter, &quality, &args)?;

    if !args.json {
        println!("{}", quality.render());
    }

    Ok(())
}

/// Render every requested report, logging where each one landed.
fn emit_reports(emitter: &ReportEmitter, quality: &QualityReport, args: &Args) -> Result<()> {
    let mut emitted = Vec::new();

    for &kind in &args.report {
        if emitted.contains(&kind) {
            continue;
        }
        emitted.push(kind);

        match kind {
            ReportKind::Summary => {
                let path = emitter.default_output_path("summary", "txt");
                let rendering = emitter.render_summary(Some(&path));
                if let Some(err) = rendering.error {
                    error!("Summary report not saved: {}", err);
                }
            }
            ReportKind::Workbook => {
                let path = emitter.default_output_path("full", "xlsx");
                emitter.render_workbook(&path, true)?;
            }
            ReportKind::Csv => {
                let path = emitter.default_output_path("clean", "csv");
                emitter.render_delimited(&path, None)?;
            }
            ReportKind::Quality => {
                let path = emitter.default_output_path("quality", "txt");
                write_text(&path, &quality.render())?;
                info!("Quality report written to: {}", path.display());
            }
            ReportKind::Missing => {
                let path = emitter.default_output_path("missing", "xlsx");
                let rendering = emitter.render_missing_report(Some(&path));
                if let Some(err) = rendering.error {
                    error!("Missing-data report not saved: {}", err);
                }
            }
        }
    }

    Ok(())
}

fn write_text(path: &Path, text: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Creating directory {}", parent.display()))?;
    }
    std::fs::write(path, text).with_context(|| format!("Writing {}", path.display()))
}

/// Extract the file stem (name without extension) from a path.
fn extract_file_stem(path: &str) -> String {
    Path::new(path)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("report")
        .to_string()
}

/// Load CSV with multiple fallback strategies
fn load_csv_with_fallbacks(path: &str) -> Result<DataFrame> {
    // Standard loading with quote handling
    match CsvReadOptions::default()
        .with_infer_schema_length(Some(100))
        .with_has_header(true)
        .with_parse_options(CsvParseOptions::default().with_quote_char(Some(b'"')))
        .try_into_reader_with_file_path(Some(PathBuf::from(path)))?
        .finish()
    {
        Ok(df) => return Ok(df),
        Err(e) => {
            debug!("Standard loading failed: {}", e);
        }
    }

    // Pre-clean content and retry
    match std::fs::read_to_string(path) {
        Ok(content) => {
            let cleaned = clean_csv_content(&content);
            let cursor = std::io::Cursor::new(cleaned);

            CsvReadOptions::default()
                .with_infer_schema_length(Some(100))
                .with_has_header(true)
                .into_reader_with_file_handle(cursor)
                .finish()
                .map_err(|e| e.into())
        }
        Err(e) => {
            error!("Could not read file: {}", e);
            Err(e.into())
        }
    }
}

/// Strip a leading byte-order mark, collapse doubled quotes and drop blank lines.
fn clean_csv_content(content: &str) -> String {
    content
        .trim_start_matches('\u{feff}')
        .replace("\"\"\"", "\"")
        .replace("\"\"", "\"")
        .lines()
        .filter(|line| !line.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
