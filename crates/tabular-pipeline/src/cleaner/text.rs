//! Text standardization and special-character removal.

use super::TableCleaner;
use crate::config::TextOperation;
use crate::error::{Result, TableError};
use crate::utils::{is_text_dtype, text_column_names, title_case};
use once_cell::sync::Lazy;
use polars::prelude::*;
use regex::Regex;
use tracing::debug;

static SPECIAL_KEEP_SPACES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^a-zA-Z0-9\s]").expect("valid character class"));
static SPECIAL_NO_SPACES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^a-zA-Z0-9]").expect("valid character class"));

/// Replace a string column by mapping every non-null cell; nulls stay null.
pub(crate) fn map_text_column<F>(df: &mut DataFrame, name: &str, f: F) -> Result<()>
where
    F: Fn(&str) -> String,
{
    let series = df.column(name)?.as_materialized_series();
    let mapped: Vec<Option<String>> = series.str()?.into_iter().map(|v| v.map(&f)).collect();
    df.replace(name, Series::new(name.into(), mapped))?;
    Ok(())
}

/// Apply a [`TextOperation`] to one cell.
fn apply_operation(value: &str, operation: TextOperation) -> String {
    match operation {
        TextOperation::Lower => value.to_lowercase(),
        TextOperation::Upper => value.to_uppercase(),
        TextOperation::Title => title_case(value),
        TextOperation::Strip => value.trim().to_string(),
    }
}

impl TableCleaner {
    /// Text columns among the requested ones; non-text columns are narrated
    /// and skipped. Without a request every text column is selected.
    fn text_targets(&self, columns: Option<&[&str]>) -> Vec<String> {
        if columns.is_none_or(|c| c.is_empty()) {
            return text_column_names(&self.current);
        }

        self.resolve_columns(columns)
            .into_iter()
            .filter(|name| {
                let Ok(column) = self.current.column(name) else {
                    return false;
                };
                let is_text = is_text_dtype(column.dtype());
                if !is_text {
                    self.warn(&TableError::WrongColumnType {
                        column: name.clone(),
                        dtype: column.dtype().to_string(),
                        expected: "text",
                    });
                }
                is_text
            })
            .collect()
    }

    /// Apply a case or whitespace transform to the selected text columns
    /// (every text column when `columns` is `None`).
    pub fn standardize_text(
        &mut self,
        columns: Option<&[&str]>,
        operation: TextOperation,
    ) -> Result<&DataFrame> {
        let targets = self.text_targets(columns);
        let mut df = self.current.clone();

        for name in &targets {
            debug!(column = %name, operation = %operation, "standardizing text");
            map_text_column(&mut df, name, |v| apply_operation(v, operation))?;
        }

        self.current = df;
        self.record(
            format!("Text standardized: {operation}"),
            format!("Text standardized ({operation})"),
        );
        Ok(&self.current)
    }

    /// Strip every character that is not an ASCII letter or digit (or
    /// whitespace, when `keep_spaces`). Case is preserved.
    pub fn remove_special_characters(
        &mut self,
        columns: &[&str],
        keep_spaces: bool,
    ) -> Result<&DataFrame> {
        if columns.is_empty() {
            return Ok(&self.current);
        }

        let pattern: &Regex = if keep_spaces {
            &SPECIAL_KEEP_SPACES
        } else {
            &SPECIAL_NO_SPACES
        };

        let targets = self.text_targets(Some(columns));
        let mut df = self.current.clone();
        for name in &targets {
            map_text_column(&mut df, name, |v| pattern.replace_all(v, "").into_owned())?;
        }

        self.current = df;
        self.record(
            format!("Special characters removed from: {}", columns.join(", ")),
            "Special characters removed".to_string(),
        );
        Ok(&self.current)
    }
}
