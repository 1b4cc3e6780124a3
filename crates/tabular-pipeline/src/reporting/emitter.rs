//! Report rendering over a read-only table snapshot.

use super::tables::{
    FrequencyTable, filter_table, frequency_table, group_comparison_table, missing_table,
    null_table, pivot_table, statistics_table, type_table,
};
use super::workbook::{ensure_parent, write_workbook};
use crate::config::{Aggregate, ReportConfig};
use crate::error::{Result, ResultExt, TableError};
use crate::narration::{Narration, Narrator, TracingNarrator};
use crate::quality::column_nulls;
use crate::statistics::{DESCRIBE_LABELS, describe_numeric};
use crate::types::CellValue;
use crate::utils::{duplicate_row_count, text_column_names, text_mode, text_values, unique_count};
use chrono::{DateTime, Local};
use polars::prelude::*;
use std::collections::HashSet;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// Result of a rendering that may also have been persisted.
///
/// The in-memory output is always present. When a target was given,
/// `saved_to` holds the written path on success and `error` the failure
/// otherwise.
#[derive(Debug)]
pub struct Rendering<T> {
    pub output: T,
    pub saved_to: Option<PathBuf>,
    pub error: Option<TableError>,
}

impl<T> Rendering<T> {
    fn in_memory(output: T) -> Self {
        Self {
            output,
            saved_to: None,
            error: None,
        }
    }

    /// Whether the output was written to its target.
    pub fn is_persisted(&self) -> bool {
        self.saved_to.is_some()
    }

    /// Whether computing or persisting the output failed.
    pub fn is_failed(&self) -> bool {
        self.error.is_some()
    }

    /// Drop the persistence outcome.
    pub fn into_output(self) -> T {
        self.output
    }
}

/// Renders a table snapshot into text, workbook and delimited reports.
///
/// The source table is never modified; every rendering reads it afresh.
pub struct ReportEmitter {
    source: DataFrame,
    name: String,
    created_at: DateTime<Local>,
    config: ReportConfig,
    narrator: Arc<dyn Narrator>,
}

impl ReportEmitter {
    /// Create an emitter with default output settings.
    pub fn new(source: DataFrame, name: impl Into<String>) -> Self {
        Self::with_config(source, name, ReportConfig::default())
    }

    /// Create an emitter with custom output settings.
    pub fn with_config(source: DataFrame, name: impl Into<String>, config: ReportConfig) -> Self {
        Self {
            source,
            name: name.into(),
            created_at: Local::now(),
            config,
            narrator: Arc::new(TracingNarrator),
        }
    }

    /// Replace the narration sink.
    pub fn with_narrator(mut self, narrator: Arc<dyn Narrator>) -> Self {
        self.narrator = narrator;
        self
    }

    pub fn source(&self) -> &DataFrame {
        &self.source
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn created_at(&self) -> DateTime<Local> {
        self.created_at
    }

    pub fn config(&self) -> &ReportConfig {
        &self.config
    }

    /// `<output_dir>/<name>_<suffix>_<YYYYmmdd_HHMMSS>.<extension>`
    pub fn default_output_path(&self, suffix: &str, extension: &str) -> PathBuf {
        let stamp = self.created_at.format("%Y%m%d_%H%M%S");
        self.config.output_dir.join(format!(
            "{}_{suffix}_{stamp}.{}",
            self.name,
            extension.trim_start_matches('.')
        ))
    }

    // ------------------------------------------------------------------------
    // Persistence helpers
    // ------------------------------------------------------------------------

    fn saved(&self, label: &str, path: &Path) {
        info!(path = %path.display(), "{label} saved");
        self.narrator
            .narrate(Narration::info(format!("{label} saved to: {}", path.display())));
    }

    fn failed(&self, label: &str, error: &TableError) {
        self.narrator
            .narrate(Narration::error(format!("Failed to generate {label}: {error}")));
    }

    /// Wrap an in-memory result, writing it to `target` when given.
    fn persist<T, W>(&self, label: &str, output: T, target: Option<&Path>, write: W) -> Rendering<T>
    where
        W: FnOnce(&Path, &T) -> Result<()>,
    {
        let Some(path) = target else {
            return Rendering::in_memory(output);
        };

        match write(path, &output) {
            Ok(()) => {
                self.saved(label, path);
                Rendering {
                    output,
                    saved_to: Some(path.to_path_buf()),
                    error: None,
                }
            }
            Err(e) => {
                self.failed(label, &e);
                Rendering {
                    output,
                    saved_to: None,
                    error: Some(e),
                }
            }
        }
    }

    /// Narrate a table-computation failure and return an empty rendering.
    fn degraded(&self, label: &str, error: TableError) -> Rendering<DataFrame> {
        self.failed(label, &error);
        Rendering {
            output: DataFrame::empty(),
            saved_to: None,
            error: Some(error),
        }
    }

    /// Persist a single table as a one-sheet workbook.
    fn persist_table(
        &self,
        label: &str,
        sheet: &str,
        table: DataFrame,
        target: Option<&Path>,
    ) -> Rendering<DataFrame> {
        self.persist(label, table, target, |path, df| write_workbook(path, &[(sheet, df)]))
    }

    // ------------------------------------------------------------------------
    // Summary
    // ------------------------------------------------------------------------

    fn summary_text(&self) -> Result<String> {
        let df = &self.source;
        let rule = "=".repeat(80);
        let mut out = String::new();

        out.push_str(&rule);
        out.push('\n');
        out.push_str(&format!("SUMMARY REPORT - {}\n", self.name.to_uppercase()));
        out.push_str(&format!(
            "Generated at: {}\n",
            Local::now().format("%d/%m/%Y %H:%M:%S")
        ));
        out.push_str(&rule);
        out.push('\n');

        let columns: Vec<String> = df
            .get_column_names()
            .into_iter()
            .map(|s| s.to_string())
            .collect();
        out.push_str("\nGENERAL INFORMATION\n");
        out.push_str(&format!("   Total records: {}\n", df.height()));
        out.push_str(&format!("   Total columns: {}\n", df.width()));
        out.push_str(&format!("   Columns: {}\n", columns.join(", ")));

        let nulls: Vec<_> = column_nulls(df)
            .into_iter()
            .filter(|n| n.null_count > 0)
            .collect();
        if !nulls.is_empty() {
            out.push_str("\nMISSING VALUES\n");
            for n in &nulls {
                out.push_str(&format!(
                    "   {}: {} ({:.1}%)\n",
                    n.column, n.null_count, n.null_percentage
                ));
            }
        }

        out.push_str(&format!("\nDUPLICATES: {}\n", duplicate_row_count(df)?));

        let stats = describe_numeric(df)?;
        if !stats.is_empty() {
            out.push_str("\nNUMERIC STATISTICS\n");
            out.push_str(&describe_block(&stats));
            out.push('\n');
        }

        let text_columns = text_column_names(df);
        if !text_columns.is_empty() {
            out.push_str("\nCATEGORICAL STATISTICS\n");
            for name in text_columns.iter().take(self.config.categorical_summary_limit) {
                let values = text_values(df.column(name)?.as_materialized_series())?;
                out.push_str(&format!("   {name}:\n"));
                out.push_str(&format!("      Unique values: {}\n", unique_count(&values)));
                out.push_str(&format!(
                    "      Most common: {}\n",
                    text_mode(&values).unwrap_or_else(|| "N/A".to_string())
                ));
            }
        }

        out.push_str(&format!("\n{rule}"));
        Ok(out)
    }

    /// Render the summary report, writing it verbatim to `target` when given.
    pub fn render_summary(&self, target: Option<&Path>) -> Rendering<String> {
        let text = match self.summary_text() {
            Ok(text) => text,
            Err(e) => {
                self.failed("text report", &e);
                return Rendering {
                    output: String::new(),
                    saved_to: None,
                    error: Some(e),
                };
            }
        };

        self.persist("Text report", text, target, |path, text| {
            ensure_parent(path)?;
            std::fs::write(path, text).context(format!("Writing {}", path.display()))
        })
    }

    /// Narrate the summary report and return it.
    pub fn print_summary(&self) -> String {
        let text = self.render_summary(None).into_output();
        self.narrator.narrate(Narration::info(text.clone()));
        text
    }

    // ------------------------------------------------------------------------
    // Full exports
    // ------------------------------------------------------------------------

    /// Write the multi-sheet workbook: `Data`, `Statistics` (when
    /// `include_stats`), `Null Values` and `Data Types`.
    pub fn render_workbook(&self, target: &Path, include_stats: bool) -> Result<()> {
        let result = self.write_workbook_report(target, include_stats);
        match &result {
            Ok(()) => self.saved("Workbook report", target),
            Err(e) => self.failed("workbook report", e),
        }
        result
    }

    fn write_workbook_report(&self, target: &Path, include_stats: bool) -> Result<()> {
        let derived = self.workbook_sheets(include_stats)?;

        let mut sheets: Vec<(&str, &DataFrame)> = vec![("Data", &self.source)];
        sheets.extend(derived.iter().map(|(name, df)| (*name, df)));

        write_workbook(target, &sheets)
    }

    /// Derived sheets of the full workbook, after `Data`.
    fn workbook_sheets(&self, include_stats: bool) -> Result<Vec<(&'static str, DataFrame)>> {
        let mut sheets = Vec::with_capacity(3);
        if include_stats {
            sheets.push(("Statistics", statistics_table(&self.source)?));
        }
        sheets.push(("Null Values", null_table(&self.source)?));
        sheets.push(("Data Types", type_table(&self.source)?));
        Ok(sheets)
    }

    /// Write the table as delimited text with a header row and no index
    /// column. `separator` defaults to the configured one.
    pub fn render_delimited(&self, target: &Path, separator: Option<u8>) -> Result<()> {
        let separator = separator.unwrap_or(self.config.separator);
        let result = self.write_delimited(target, separator);
        match &result {
            Ok(()) => self.saved("Delimited report", target),
            Err(e) => self.failed("delimited report", e),
        }
        result
    }

    fn write_delimited(&self, target: &Path, separator: u8) -> Result<()> {
        if !separator.is_ascii() || matches!(separator, b'"' | b'\n' | b'\r') {
            return Err(TableError::InvalidConfig(format!(
                "invalid separator byte {separator:#04x}"
            )));
        }
        ensure_parent(target)?;

        let mut file = File::create(target).context(format!("Creating {}", target.display()))?;
        let mut df = self.source.clone();
        CsvWriter::new(&mut file)
            .include_header(true)
            .include_bom(self.config.csv_bom)
            .with_separator(separator)
            .finish(&mut df)
            .context(format!("Writing {}", target.display()))
    }

    // ------------------------------------------------------------------------
    // Derived reports
    // ------------------------------------------------------------------------

    /// Cross-tabulate `values` by `index` and `columns`, saved as a workbook
    /// when `target` is given.
    pub fn render_pivot(
        &self,
        index: &str,
        columns: &str,
        values: &str,
        aggregate: Aggregate,
        target: Option<&Path>,
    ) -> Rendering<DataFrame> {
        match pivot_table(&self.source, index, columns, values, aggregate) {
            Ok(pivot) => {
                debug!(rows = pivot.height(), columns = pivot.width(), "pivot table built");
                self.narrator.narrate(Narration::info("Pivot table generated"));
                self.persist_table("Pivot table", "Pivot", pivot, target)
            }
            Err(e) => self.degraded("pivot table", e),
        }
    }

    /// Frequency tables for the given columns, one workbook sheet per column
    /// when `target` is given. Missing columns are skipped and repeated
    /// columns are built once.
    pub fn render_frequency(
        &self,
        columns: &[&str],
        target: Option<&Path>,
    ) -> Rendering<Vec<FrequencyTable>> {
        let mut tables = Vec::new();
        let mut requested = HashSet::new();
        for name in columns.iter().filter(|name| requested.insert(**name)) {
            match frequency_table(&self.source, name) {
                Ok(table) => {
                    self.narrator
                        .narrate(Narration::info(format!("Frequency table built for '{name}'")));
                    tables.push(table);
                }
                Err(e) => self.narrator.narrate(Narration::warning(e.to_string())),
            }
        }

        if tables.is_empty() {
            return Rendering::in_memory(tables);
        }

        self.persist("Frequency report", tables, target, |path, tables| {
            let sheets: Vec<(&str, &DataFrame)> = tables
                .iter()
                .map(|t| (t.column.as_str(), &t.table))
                .collect();
            write_workbook(path, &sheets)
        })
    }

    /// Mean, sum and count of each compare column per group.
    pub fn render_group_comparison(
        &self,
        group: &str,
        compare: &[&str],
        target: Option<&Path>,
    ) -> Rendering<DataFrame> {
        match group_comparison_table(&self.source, group, compare) {
            Ok(table) => {
                self.narrator
                    .narrate(Narration::info("Comparison report generated"));
                self.persist_table("Comparison report", "Comparison", table, target)
            }
            Err(e) => self.degraded("comparison report", e),
        }
    }

    /// Columns with nulls, highest share first.
    pub fn render_missing_report(&self, target: Option<&Path>) -> Rendering<DataFrame> {
        match missing_table(&self.source) {
            Ok(table) => {
                self.narrator.narrate(Narration::info(format!(
                    "Missing data report: {} column(s) with nulls",
                    table.height()
                )));
                self.persist_table("Missing data report", "Missing Data", table, target)
            }
            Err(e) => self.degraded("missing data report", e),
        }
    }

    /// Rows matching every `column == value` filter. Filters on unknown
    /// columns are ignored.
    pub fn render_filtered(
        &self,
        filters: &[(&str, CellValue)],
        target: Option<&Path>,
    ) -> Rendering<DataFrame> {
        match filter_table(&self.source, filters) {
            Ok(table) => {
                self.narrator.narrate(Narration::info(format!(
                    "Filters applied: {} record(s) found",
                    table.height()
                )));
                self.persist_table("Filtered report", "Filtered", table, target)
            }
            Err(e) => self.degraded("filtered report", e),
        }
    }
}

/// Render describe statistics as an aligned text table, one column per
/// numeric column.
fn describe_block(stats: &[crate::statistics::ColumnStatistics]) -> String {
    let cells: Vec<Vec<String>> = stats
        .iter()
        .map(|s| {
            s.values()
                .iter()
                .map(|v| if v.is_nan() { "NaN".to_string() } else { format!("{v:.6}") })
                .collect()
        })
        .collect();

    let widths: Vec<usize> = stats
        .iter()
        .zip(&cells)
        .map(|(s, col)| {
            col.iter()
                .map(String::len)
                .chain(std::iter::once(s.column.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();
    let label_width = DESCRIBE_LABELS.iter().map(|l| l.len()).max().unwrap_or(0);

    let mut lines = Vec::with_capacity(DESCRIBE_LABELS.len() + 1);
    let mut header = " ".repeat(label_width);
    for (s, width) in stats.iter().zip(&widths) {
        header.push_str(&format!("  {:>width$}", s.column));
    }
    lines.push(header);

    for (row, label) in DESCRIBE_LABELS.iter().enumerate() {
        let mut line = format!("{label:<label_width$}");
        for (col, width) in cells.iter().zip(&widths) {
            line.push_str(&format!("  {:>width$}", col[row]));
        }
        lines.push(line);
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::narration::CollectingNarrator;

    fn emitter(df: DataFrame) -> (ReportEmitter, CollectingNarrator) {
        let narrator = CollectingNarrator::new();
        let emitter = ReportEmitter::new(df, "eventos").with_narrator(Arc::new(narrator.clone()));
        (emitter, narrator)
    }

    fn participants() -> DataFrame {
        df![
            "nome" => [Some("Ana"), Some("Bia"), None, Some("Ana")],
            "cidade" => ["Recife", "Natal", "Recife", "Recife"],
            "idade" => [Some(30), Some(25), Some(41), None],
        ]
        .unwrap()
    }

    #[test]
    fn test_default_output_path() {
        let config = ReportConfig::builder().output_dir("relatorios").build().unwrap();
        let emitter = ReportEmitter::with_config(participants(), "eventos", config);
        let path = emitter.default_output_path("summary", ".txt");

        let file = path.file_name().unwrap().to_str().unwrap().to_string();
        assert!(path.starts_with("relatorios"));
        assert!(file.starts_with("eventos_summary_"));
        assert!(file.ends_with(".txt"));
        assert_eq!(file.len(), "eventos_summary_".len() + 15 + 4);
    }

    #[test]
    fn test_summary_sections() {
        let (emitter, _) = emitter(participants());
        let text = emitter.render_summary(None).into_output();

        assert!(text.contains("SUMMARY REPORT - EVENTOS"));
        assert!(text.contains("   Total records: 4"));
        assert!(text.contains("   Columns: nome, cidade, idade"));
        assert!(text.contains("   nome: 1 (25.0%)"));
        assert!(!text.contains("   cidade: 0"));
        assert!(text.contains("DUPLICATES: 0"));
        assert!(text.contains("NUMERIC STATISTICS"));
        assert!(text.contains("      Most common: Recife"));
    }

    #[test]
    fn test_summary_is_written_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("summary.txt");
        let (emitter, narrator) = emitter(participants());
        let rendering = emitter.render_summary(Some(&path));

        assert!(rendering.is_persisted());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), rendering.output);
        assert!(narrator.messages()[0].contains("summary.txt"));
    }

    #[test]
    fn test_describe_block_layout() {
        let stats = describe_numeric(&df!["idade" => [30.0, 40.0]].unwrap()).unwrap();
        let block = describe_block(&stats);
        let lines: Vec<&str> = block.lines().collect();

        assert_eq!(lines.len(), 9);
        assert!(lines[0].trim_end().ends_with("idade"));
        assert!(lines[1].starts_with("count"));
        assert!(lines[1].ends_with("2.000000"));
    }

    #[test]
    fn test_pivot_failure_returns_empty_table() {
        let (emitter, narrator) = emitter(participants());
        let rendering = emitter.render_pivot("cidade", "loja", "idade", Aggregate::Sum, None);

        assert!(rendering.is_failed());
        assert_eq!(rendering.output.height(), 0);
        assert_eq!(narrator.errors().len(), 1);
    }

    #[test]
    fn test_frequency_persistence_failure_keeps_tables() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, "x").unwrap();
        let target = blocker.join("freq.xlsx");

        let (emitter, _) = emitter(participants());
        let rendering = emitter.render_frequency(&["cidade"], Some(&target));

        assert!(!rendering.is_persisted());
        assert!(rendering.is_failed());
        assert_eq!(rendering.output.len(), 1);
    }

    #[test]
    fn test_workbook_sheet_order() {
        let (emitter, _) = emitter(participants());

        let names = |include_stats| -> Vec<&str> {
            emitter
                .workbook_sheets(include_stats)
                .unwrap()
                .into_iter()
                .map(|(name, _)| name)
                .collect()
        };

        assert_eq!(names(true), vec!["Statistics", "Null Values", "Data Types"]);
        assert_eq!(names(false), vec!["Null Values", "Data Types"]);
    }

    #[test]
    fn test_render_workbook_unwritable_target() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "not a directory").unwrap();

        let (emitter, narrator) = emitter(participants());
        let result = emitter.render_workbook(&blocker.join("full.xlsx"), true);

        assert!(result.is_err());
        assert_eq!(narrator.errors().len(), 1);
    }

    #[test]
    fn test_frequency_repeated_column_built_once() {
        let (emitter, _) = emitter(participants());
        let tables = emitter
            .render_frequency(&["cidade", "cidade"], None)
            .into_output();

        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].column, "cidade");
    }

    #[test]
    fn test_render_delimited_rejects_bad_separator() {
        let dir = tempfile::tempdir().unwrap();
        let (emitter, _) = emitter(participants());
        let err = emitter
            .render_delimited(&dir.path().join("x.csv"), Some(b'"'))
            .unwrap_err();
        assert_eq!(err.error_code(), "INVALID_CONFIG");
    }

    #[test]
    fn test_source_is_never_modified() {
        let input = participants();
        let (emitter, _) = emitter(input.clone());
        let _ = emitter.render_filtered(&[("cidade", CellValue::from("Recife"))], None);
        let _ = emitter.render_missing_report(None);
        assert!(emitter.source().equals_missing(&input));
    }
}
