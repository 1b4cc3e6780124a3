//! Report rendering.
//!
//! [`ReportEmitter`] takes a table snapshot and a report name and renders it
//! as:
//! - a plain-text summary
//! - a multi-sheet `.xlsx` workbook (data, statistics, nulls, types)
//! - delimited text
//! - pivot, frequency, group-comparison, missing-data and filtered tables
//!
//! Renderings that produce a table or text return a [`Rendering`], which keeps
//! the in-memory result even when writing it to disk failed. The two full
//! exports (`render_workbook`, `render_delimited`) have no in-memory result and
//! return `Result<()>`.
//!
//! # Example
//!
//! ```rust,ignore
//! use tabular_pipeline::reporting::ReportEmitter;
//! use tabular_pipeline::config::Aggregate;
//!
//! let emitter = ReportEmitter::new(cleaned_df, "participants");
//!
//! let summary = emitter.render_summary(None).into_output();
//! emitter.render_workbook(&emitter.default_output_path("full", "xlsx"), true)?;
//!
//! let pivot = emitter.render_pivot("city", "event", "amount", Aggregate::Sum, None);
//! println!("{}", pivot.output);
//! ```

mod emitter;
mod tables;
mod workbook;

pub use emitter::{ReportEmitter, Rendering};
pub use tables::{
    FrequencyTable, filter_table, frequency_table, group_comparison_table, missing_table,
    null_table, pivot_table, statistics_table, type_table,
};
pub use workbook::{MAX_COLUMNS, MAX_ROWS, MAX_SHEET_NAME_LEN, sheet_name, write_frame, write_workbook};
