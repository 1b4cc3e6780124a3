//! Stateful table cleaning.
//!
//! [`TableCleaner`] owns a live table and an untouched snapshot of the table it
//! was built from. Each operation takes the current table, produces a new one,
//! replaces the live table with it and appends a line to the operation log:
//!
//! - Removing duplicate rows and fully empty rows/columns
//! - Handling missing values (drop, fill, forward/backward fill, mean, median)
//! - Text standardization and special-character removal
//! - Type conversion
//! - Outlier removal and normalization
//! - Regex validation of emails and phone numbers
//!
//! Operations never abort a session over a bad argument: a missing column or
//! unknown strategy is narrated as a warning and the table is left unchanged.
//! An `Err` is only returned for unexpected failures inside polars, and in that
//! case the live table is also left unchanged.

mod converters;
mod missing;
mod outliers;
mod plan;
mod text;
mod validators;

pub use plan::{CleaningPlan, CleaningStep, ColumnConversion};
pub use validators::{EMAIL_PATTERN, PHONE_PATTERN};

use crate::config::KeepStrategy;
use crate::error::{Result, TableError};
use crate::narration::{Narration, Narrator, TracingNarrator};
use crate::quality::QualityReport;
use crate::utils::{duplicate_mask, filter_rows, row_keys};
use polars::prelude::*;
use std::sync::Arc;
use tracing::debug;

/// Sequential, stateful cleaner over an in-memory table.
pub struct TableCleaner {
    current: DataFrame,
    original: DataFrame,
    operation_log: Vec<String>,
    narrator: Arc<dyn Narrator>,
}

impl TableCleaner {
    /// Wrap a table, narrating through `tracing`.
    pub fn new(df: DataFrame) -> Self {
        Self::with_narrator(df, Arc::new(TracingNarrator))
    }

    /// Wrap a table with a custom narration sink.
    pub fn with_narrator(df: DataFrame, narrator: Arc<dyn Narrator>) -> Self {
        Self {
            original: df.clone(),
            current: df,
            operation_log: Vec::new(),
            narrator,
        }
    }

    /// The live table.
    pub fn current(&self) -> &DataFrame {
        &self.current
    }

    /// Consume the cleaner, returning the live table.
    pub fn into_current(self) -> DataFrame {
        self.current
    }

    /// The table as it was handed to the constructor.
    pub fn original(&self) -> &DataFrame {
        &self.original
    }

    /// Operations applied so far, oldest first.
    pub fn operation_log(&self) -> &[String] {
        &self.operation_log
    }

    /// Compute a quality report over the live table.
    pub fn quality_report(&self) -> Result<QualityReport> {
        QualityReport::from_table(&self.current, &self.operation_log)
    }

    /// Render the quality report through the narrator and return the text.
    pub fn print_quality_report(&self) -> Result<String> {
        let text = self.quality_report()?.render();
        self.narrator.narrate(Narration::info(text.clone()));
        Ok(text)
    }

    /// Restore the live table from the original snapshot.
    ///
    /// The operation log is kept; the reset itself is logged.
    pub fn reset(&mut self) -> &DataFrame {
        self.current = self.original.clone();
        self.record(
            "Table restored to original".to_string(),
            "Data restored to original state".to_string(),
        );
        &self.current
    }

    /// Remove rows that repeat another row over `subset` (all columns when `None`).
    ///
    /// With [`KeepStrategy::First`] the earliest row of each group survives, with
    /// [`KeepStrategy::Last`] the latest. Surviving rows keep their order.
    pub fn remove_duplicates(
        &mut self,
        subset: Option<&[&str]>,
        keep: KeepStrategy,
    ) -> Result<&DataFrame> {
        let columns = self.resolve_columns(subset);
        if subset.is_some_and(|s| !s.is_empty()) && columns.is_empty() {
            return Ok(&self.current);
        }

        let keys = row_keys(&self.current, &columns)?;
        let keep_mask: Vec<bool> = duplicate_mask(&keys, keep == KeepStrategy::Last)
            .into_iter()
            .map(|duplicated| !duplicated)
            .collect();

        let before = self.current.height();
        let df = filter_rows(&self.current, &keep_mask)?;
        let removed = before - df.height();
        self.current = df;

        self.record(
            format!("Duplicates removed: {removed}"),
            format!("{removed} duplicate row(s) removed"),
        );
        Ok(&self.current)
    }

    /// Remove rows and columns that are entirely null, then trim whitespace
    /// around every text cell.
    pub fn drop_empty(&mut self) -> Result<&DataFrame> {
        let mut df = self.current.clone();
        let height = df.height();

        let mut empty_row = vec![true; height];
        for column in df.get_columns() {
            let nulls = column.as_materialized_series().is_null();
            for (flag, is_null) in empty_row.iter_mut().zip(nulls.into_iter()) {
                *flag &= is_null.unwrap_or(false);
            }
        }
        let keep_rows: Vec<bool> = empty_row.iter().map(|e| !e).collect();
        df = filter_rows(&df, &keep_rows)?;
        let rows_removed = height - df.height();

        let mut columns_removed = 0;
        if df.height() > 0 {
            let keep: Vec<String> = df
                .get_columns()
                .iter()
                .filter(|c| c.null_count() < c.len())
                .map(|c| c.name().to_string())
                .collect();
            columns_removed = df.width() - keep.len();
            if columns_removed > 0 {
                df = df.select(keep)?;
            }
        }

        for name in crate::utils::text_column_names(&df) {
            text::map_text_column(&mut df, &name, |s| s.trim().to_string())?;
        }

        self.current = df;
        self.record(
            format!("Empty rows removed: {rows_removed}, empty columns removed: {columns_removed}"),
            format!(
                "Cleanup finished: {rows_removed} empty row(s) and {columns_removed} empty column(s) removed"
            ),
        );
        Ok(&self.current)
    }

    // ------------------------------------------------------------------------
    // Internal helpers
    // ------------------------------------------------------------------------

    /// Append a log entry and narrate the completed operation.
    fn record(&mut self, entry: String, message: String) {
        debug!(operation = %entry, rows = self.current.height(), "operation applied");
        self.operation_log.push(entry);
        self.narrator.narrate(Narration::info(message));
    }

    /// Narrate a degraded call.
    fn warn(&self, error: &TableError) {
        self.narrator.narrate(Narration::warning(error.to_string()));
    }

    /// Narrate a per-item failure inside an otherwise successful call.
    fn report_failure(&self, error: &TableError) {
        self.narrator.narrate(Narration::error(error.to_string()));
    }

    fn has_column(&self, name: &str) -> bool {
        self.current.column(name).is_ok()
    }

    /// Existing columns among `requested`, or every column when nothing (or an
    /// empty list) was requested. Missing names are narrated and skipped.
    fn resolve_columns(&self, requested: Option<&[&str]>) -> Vec<String> {
        match requested {
            Some(names) if !names.is_empty() => names
                .iter()
                .filter(|name| {
                    let exists = self.has_column(name);
                    if !exists {
                        self.warn(&TableError::ColumnNotFound(name.to_string()));
                    }
                    exists
                })
                .map(|name| name.to_string())
                .collect(),
            _ => self
                .current
                .get_column_names()
                .into_iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::narration::CollectingNarrator;

    fn cleaner_with(df: DataFrame) -> (TableCleaner, CollectingNarrator) {
        let narrator = CollectingNarrator::new();
        let cleaner = TableCleaner::with_narrator(df, Arc::new(narrator.clone()));
        (cleaner, narrator)
    }

    fn participants() -> DataFrame {
        df![
            "nome" => ["Ana", "Bruno", "Ana", "Carla", "Ana"],
            "cidade" => ["Recife", "Natal", "Recife", "Recife", "Olinda"],
            "idade" => [30, 25, 30, 41, 30],
        ]
        .unwrap()
    }

    // ========================================================================
    // remove_duplicates() tests
    // ========================================================================

    #[test]
    fn test_remove_duplicates_all_columns() {
        let (mut cleaner, _) = cleaner_with(participants());
        let df = cleaner.remove_duplicates(None, KeepStrategy::First).unwrap();

        assert_eq!(df.height(), 4);
        assert_eq!(cleaner.operation_log(), &["Duplicates removed: 1".to_string()]);
    }

    #[test]
    fn test_remove_duplicates_subset_keep_first_preserves_order() {
        let (mut cleaner, _) = cleaner_with(participants());
        let df = cleaner
            .remove_duplicates(Some(&["nome"]), KeepStrategy::First)
            .unwrap();

        let cities: Vec<_> = df.column("cidade").unwrap().str().unwrap().into_iter().collect();
        assert_eq!(cities, vec![Some("Recife"), Some("Natal"), Some("Recife")]);
    }

    #[test]
    fn test_remove_duplicates_subset_keep_last() {
        let (mut cleaner, _) = cleaner_with(participants());
        let df = cleaner
            .remove_duplicates(Some(&["nome"]), KeepStrategy::Last)
            .unwrap();

        let names: Vec<_> = df.column("nome").unwrap().str().unwrap().into_iter().collect();
        assert_eq!(names, vec![Some("Bruno"), Some("Carla"), Some("Ana")]);
        let cities: Vec<_> = df.column("cidade").unwrap().str().unwrap().into_iter().collect();
        assert_eq!(cities[2], Some("Olinda"));
    }

    #[test]
    fn test_remove_duplicates_is_idempotent() {
        let (mut cleaner, _) = cleaner_with(participants());
        let once = cleaner
            .remove_duplicates(Some(&["cidade"]), KeepStrategy::First)
            .unwrap()
            .clone();
        let twice = cleaner
            .remove_duplicates(Some(&["cidade"]), KeepStrategy::First)
            .unwrap();

        assert!(once.equals_missing(twice));
        assert_eq!(cleaner.operation_log()[1], "Duplicates removed: 0");
    }

    #[test]
    fn test_remove_duplicates_treats_nulls_as_equal() {
        let df = df!["a" => [None, Some(1), None]].unwrap();
        let (mut cleaner, _) = cleaner_with(df);
        assert_eq!(
            cleaner.remove_duplicates(None, KeepStrategy::First).unwrap().height(),
            2
        );
    }

    #[test]
    fn test_remove_duplicates_signed_zeros_are_equal() {
        let df = df!["x" => [0.0, -0.0, 1.5]].unwrap();
        let (mut cleaner, _) = cleaner_with(df);
        let df = cleaner.remove_duplicates(None, KeepStrategy::First).unwrap();

        assert_eq!(df.height(), 2);
        assert_eq!(cleaner.operation_log(), &["Duplicates removed: 1".to_string()]);
    }

    #[test]
    fn test_remove_duplicates_unknown_subset_is_noop() {
        let (mut cleaner, narrator) = cleaner_with(participants());
        let df = cleaner
            .remove_duplicates(Some(&["email"]), KeepStrategy::First)
            .unwrap();

        assert_eq!(df.height(), 5);
        assert!(cleaner.operation_log().is_empty());
        assert_eq!(narrator.warnings().len(), 1);
        assert!(narrator.warnings()[0].contains("email"));
    }

    // ========================================================================
    // reset() tests
    // ========================================================================

    #[test]
    fn test_reset_restores_original_and_keeps_log() {
        let input = participants();
        let (mut cleaner, _) = cleaner_with(input.clone());

        cleaner.remove_duplicates(None, KeepStrategy::First).unwrap();
        cleaner
            .standardize_text(None, crate::config::TextOperation::Upper)
            .unwrap();
        let restored = cleaner.reset();

        assert!(restored.equals_missing(&input));
        assert_eq!(cleaner.operation_log().len(), 3);
        assert_eq!(cleaner.operation_log()[2], "Table restored to original");
    }

    #[test]
    fn test_original_never_changes() {
        let input = participants();
        let (mut cleaner, _) = cleaner_with(input.clone());
        cleaner.remove_duplicates(None, KeepStrategy::First).unwrap();
        assert!(cleaner.original().equals_missing(&input));
    }

    // ========================================================================
    // drop_empty() tests
    // ========================================================================

    #[test]
    fn test_drop_empty_rows_columns_and_whitespace() {
        let df = df![
            "nome" => [Some("  Ana "), None, Some("Bia")],
            "vazio" => [None::<i32>, None, None],
            "idade" => [Some(30), None, Some(22)],
        ]
        .unwrap();
        let (mut cleaner, _) = cleaner_with(df);
        let df = cleaner.drop_empty().unwrap();

        assert_eq!(df.shape(), (2, 2));
        assert_eq!(df.column("nome").unwrap().str().unwrap().get(0), Some("Ana"));
        assert_eq!(
            cleaner.operation_log()[0],
            "Empty rows removed: 1, empty columns removed: 1"
        );
    }

    #[test]
    fn test_quality_report_includes_log() {
        let (mut cleaner, _) = cleaner_with(participants());
        cleaner.remove_duplicates(None, KeepStrategy::First).unwrap();
        let report = cleaner.quality_report().unwrap();

        assert_eq!(report.total_rows, 4);
        assert_eq!(report.cleaning_log, vec!["Duplicates removed: 1".to_string()]);
    }

    #[test]
    fn test_print_quality_report_narrates_text() {
        let (cleaner, narrator) = cleaner_with(participants());
        let text = cleaner.print_quality_report().unwrap();

        assert!(text.contains("DATA QUALITY REPORT"));
        assert_eq!(narrator.messages().last().unwrap(), &text);
    }
}
