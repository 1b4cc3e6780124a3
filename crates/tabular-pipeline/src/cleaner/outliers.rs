//! Outlier removal and column normalization.

use super::TableCleaner;
use crate::config::{NormalizeMethod, OutlierMethod};
use crate::error::{Result, TableError};
use crate::statistics::{mean, present, quantile_sorted, sample_std, sorted};
use crate::utils::{filter_rows, is_numeric_dtype, numeric_values};
use polars::prelude::*;
use tracing::debug;

/// Row mask keeping values inside the method's bounds. Nulls never pass.
fn within_bounds(values: &[Option<f64>], method: OutlierMethod, threshold: f64) -> Vec<bool> {
    let observed = present(values);

    match method {
        OutlierMethod::Iqr => {
            let ordered = sorted(&observed);
            let q1 = quantile_sorted(&ordered, 0.25);
            let q3 = quantile_sorted(&ordered, 0.75);
            let iqr = q3 - q1;
            let lower = q1 - threshold * iqr;
            let upper = q3 + threshold * iqr;
            debug!(q1, q3, lower, upper, "iqr bounds");

            values
                .iter()
                .map(|v| v.is_some_and(|x| x >= lower && x <= upper))
                .collect()
        }
        OutlierMethod::Zscore => {
            let m = mean(&observed);
            let std = sample_std(&observed);
            debug!(mean = m, std, "zscore parameters");

            values
                .iter()
                .map(|v| v.is_some_and(|x| ((x - m) / std).abs() < threshold))
                .collect()
        }
    }
}

impl TableCleaner {
    /// Remove rows whose value in any listed numeric column falls outside the
    /// method's bounds.
    ///
    /// Columns are processed in order and the table is re-filtered after each
    /// one, so later bounds are computed on the already filtered rows.
    /// Missing and non-numeric columns are skipped.
    pub fn remove_outliers(
        &mut self,
        columns: &[&str],
        method: OutlierMethod,
        threshold: f64,
    ) -> Result<&DataFrame> {
        let before = self.current.height();
        let mut df = self.current.clone();

        for name in self.resolve_columns(Some(columns)) {
            let series = df.column(&name)?.as_materialized_series();
            if !is_numeric_dtype(series.dtype()) {
                debug!(column = %name, dtype = %series.dtype(), "skipping non-numeric column");
                continue;
            }

            let keep = within_bounds(&numeric_values(series)?, method, threshold);
            df = filter_rows(&df, &keep)?;
        }

        let removed = before - df.height();
        self.current = df;
        self.record(
            format!("Outliers removed: {removed} ({method})"),
            format!("{removed} outlier(s) removed using the {method} method"),
        );
        Ok(&self.current)
    }

    /// Rescale one column in place.
    ///
    /// `minmax` maps to `[0, 1]`; a constant column divides zero by zero and
    /// becomes NaN. `zscore` centers on the mean in sample standard deviations.
    pub fn normalize(&mut self, column: &str, method: NormalizeMethod) -> Result<&DataFrame> {
        let Ok(existing) = self.current.column(column) else {
            self.warn(&TableError::ColumnNotFound(column.to_string()));
            return Ok(&self.current);
        };

        let series = existing.as_materialized_series();
        if !is_numeric_dtype(series.dtype()) {
            self.warn(&TableError::WrongColumnType {
                column: column.to_string(),
                dtype: series.dtype().to_string(),
                expected: "numeric",
            });
            return Ok(&self.current);
        }

        let values = numeric_values(series)?;
        let observed = present(&values);

        let (offset, scale, label) = match method {
            NormalizeMethod::Minmax => {
                let min = observed.iter().copied().fold(f64::INFINITY, f64::min);
                let max = observed.iter().copied().fold(f64::NEG_INFINITY, f64::max);
                (min, max - min, "min-max")
            }
            NormalizeMethod::Zscore => (mean(&observed), sample_std(&observed), "z-score"),
        };

        let scaled: Vec<Option<f64>> = values
            .into_iter()
            .map(|v| v.map(|x| (x - offset) / scale))
            .collect();

        let mut df = self.current.clone();
        df.replace(column, Series::new(column.into(), scaled))?;
        self.current = df;

        self.record(
            format!("Column '{column}' normalized ({label})"),
            format!("Column '{column}' normalized using {method}"),
        );
        Ok(&self.current)
    }
}
