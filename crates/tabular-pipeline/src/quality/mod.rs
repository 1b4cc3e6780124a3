//! Data quality reporting.
//!
//! A [`QualityReport`] is a point-in-time snapshot of a table: its shape,
//! null counts, duplicate rows, column types, numeric statistics, estimated
//! memory use and the cleaning log at the time it was taken. It is never
//! stored by the cleaner; every call recomputes it.

use crate::error::Result;
use crate::statistics::{ColumnStatistics, describe_numeric};
use crate::utils::{duplicate_row_count, get_dtype_category};
use polars::prelude::*;
use serde::Serialize;
use std::fmt::Write;

/// Null count of one column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnNulls {
    pub column: String,
    pub null_count: usize,
    /// Share of rows that are null, 0-100. Zero for an empty table.
    pub null_percentage: f64,
}

/// Storage type of one column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnType {
    pub column: String,
    /// Polars dtype name (`i64`, `str`, ...)
    pub dtype: String,
    /// Broad category (`numeric`, `text`, ...)
    pub category: String,
}

/// Per-column null counts, in column order.
pub fn column_nulls(df: &DataFrame) -> Vec<ColumnNulls> {
    let height = df.height();
    df.get_columns()
        .iter()
        .map(|c| {
            let null_count = c.null_count();
            ColumnNulls {
                column: c.name().to_string(),
                null_count,
                null_percentage: if height == 0 {
                    0.0
                } else {
                    null_count as f64 / height as f64 * 100.0
                },
            }
        })
        .collect()
}

/// Per-column types, in column order.
pub fn column_types(df: &DataFrame) -> Vec<ColumnType> {
    df.get_columns()
        .iter()
        .map(|c| ColumnType {
            column: c.name().to_string(),
            dtype: c.dtype().to_string(),
            category: get_dtype_category(c.dtype()).as_str().to_string(),
        })
        .collect()
}

/// Quality snapshot of a table.
#[derive(Debug, Clone, Serialize)]
pub struct QualityReport {
    pub total_rows: usize,
    pub total_columns: usize,
    pub null_counts: Vec<ColumnNulls>,
    pub duplicate_rows: usize,
    pub column_types: Vec<ColumnType>,
    pub numeric_statistics: Vec<ColumnStatistics>,
    pub memory_usage_mb: f64,
    pub cleaning_log: Vec<String>,
}

impl QualityReport {
    /// Compute the report for `df`, copying `log` into it.
    pub fn from_table(df: &DataFrame, log: &[String]) -> Result<Self> {
        Ok(Self {
            total_rows: df.height(),
            total_columns: df.width(),
            null_counts: column_nulls(df),
            duplicate_rows: duplicate_row_count(df)?,
            column_types: column_types(df),
            numeric_statistics: describe_numeric(df)?,
            memory_usage_mb: df.estimated_size() as f64 / (1024.0 * 1024.0),
            cleaning_log: log.to_vec(),
        })
    }

    /// Human-readable rendering.
    ///
    /// Only columns with nulls are listed; the cleaning history is omitted
    /// when empty.
    pub fn render(&self) -> String {
        let rule = "=".repeat(80);
        let mut out = String::new();

        out.push_str(&rule);
        out.push('\n');
        out.push_str("DATA QUALITY REPORT\n");
        out.push_str(&rule);
        out.push('\n');
        out.push_str("\nDimensions:\n");
        out.push_str(&format!("   Rows: {}\n", self.total_rows));
        out.push_str(&format!("   Columns: {}\n", self.total_columns));
        out.push_str(&format!("   Memory usage: {:.2} MB\n", self.memory_usage_mb));
        out.push_str(&format!("\nDuplicates: {}\n", self.duplicate_rows));

        out.push_str("\nNull values:\n");
        for nulls in self.null_counts.iter().filter(|n| n.null_count > 0) {
            out.push_str(&format!(
                "   {}: {} ({:.1}%)\n",
                nulls.column, nulls.null_count, nulls.null_percentage
            ));
        }

        if !self.cleaning_log.is_empty() {
            out.push_str("\nCleaning history:\n");
            for (i, entry) in self.cleaning_log.iter().enumerate() {
                out.push_str(&format!("   {}. {entry}\n", i + 1));
            }
        }

        out.push_str(&rule);
        out
    }
}
