//! Tabular Cleaning and Reporting Library
//!
//! A sequential, stateful cleaning pipeline over in-memory Polars tables, plus
//! a report emitter that renders a cleaned table into text, spreadsheet and
//! delimited outputs.
//!
//! # Overview
//!
//! - **Cleaning**: duplicate removal, missing-value strategies, text
//!   standardization, type conversion, outlier removal, normalization and
//!   regex validation, each recorded in an operation log
//! - **Quality Reports**: null counts, duplicates, types, numeric statistics
//!   and memory use of the live table
//! - **Reporting**: summary text, multi-sheet workbooks, CSV, pivots,
//!   frequency tables, group comparisons, missing-data and filtered views
//! - **Plans**: declarative JSON cleaning plans applied step by step
//! - **Narration**: human-readable progress lines routed to an injectable sink
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use tabular_pipeline::{KeepStrategy, MissingStrategy, ReportEmitter, TableCleaner};
//! use polars::prelude::*;
//!
//! let mut cleaner = TableCleaner::new(df);
//! cleaner.remove_duplicates(None, KeepStrategy::First)?;
//! cleaner.handle_missing(MissingStrategy::Median, None, Some(&["age"]))?;
//! let (_, invalid) = cleaner.validate_email("email")?;
//!
//! println!("{}", cleaner.print_quality_report()?);
//!
//! let emitter = ReportEmitter::new(cleaner.into_current(), "participants");
//! emitter.render_delimited(&emitter.default_output_path("clean", "csv"), None)?;
//! ```
//!
//! # Error Handling
//!
//! Cleaning operations degrade instead of failing: a missing column or an
//! unsupported option is narrated as a warning and the table is returned
//! unchanged. `Err` is reserved for unexpected failures inside Polars or I/O.
//!
//! # Narration
//!
//! By default every narration line goes to `tracing`. Headless callers can
//! collect them instead:
//!
//! ```rust,ignore
//! use tabular_pipeline::{CollectingNarrator, NormalizeMethod, TableCleaner};
//! use std::sync::Arc;
//!
//! let narrator = CollectingNarrator::new();
//! let mut cleaner = TableCleaner::with_narrator(df, Arc::new(narrator.clone()));
//! cleaner.normalize("missing_column", NormalizeMethod::Minmax)?;
//! assert_eq!(narrator.warnings().len(), 1);
//! ```

pub mod cleaner;
pub mod config;
pub mod error;
pub mod narration;
pub mod quality;
pub mod reporting;
pub mod statistics;
pub mod types;
pub mod utils;

// Re-export main types for convenience
pub use cleaner::{CleaningPlan, CleaningStep, ColumnConversion, EMAIL_PATTERN, PHONE_PATTERN, TableCleaner};
pub use config::{
    Aggregate, ConfigValidationError, KeepStrategy, MissingStrategy, NormalizeMethod,
    OutlierMethod, ReportConfig, ReportConfigBuilder, TargetType, TextOperation,
};
pub use error::{Result, ResultExt, TableError};
pub use narration::{
    ClosureNarrator, CollectingNarrator, Narration, NarrationLevel, Narrator, SilentNarrator,
    TracingNarrator,
};
pub use quality::QualityReport;
pub use reporting::{FrequencyTable, Rendering, ReportEmitter};
pub use types::CellValue;
