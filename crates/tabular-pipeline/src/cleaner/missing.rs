//! Missing-value handling.
//!
//! Fill strategies work column by column and only touch columns that contain
//! nulls. The statistical strategies (mean, median) skip non-numeric columns
//! without narrating, since "fill every numeric column" is their usual intent.

use super::TableCleaner;
use crate::config::MissingStrategy;
use crate::error::{Result, TableError};
use crate::statistics::{mean, median, present};
use crate::types::CellValue;
use crate::utils::{fill_numeric_nulls, fill_string_nulls, filter_rows, is_numeric_dtype, numeric_values};
use polars::prelude::*;
use tracing::debug;

/// Fill nulls of one series with a constant, keeping the column type when the
/// constant fits it and falling back to text otherwise.
fn fill_with_constant(series: &Series, value: &CellValue) -> Result<Series> {
    let dtype = series.dtype();

    let filled = match value {
        CellValue::Int(_) | CellValue::Float(_) if is_numeric_dtype(dtype) => {
            let v = value.as_f64().unwrap_or(f64::NAN);
            let filled = fill_numeric_nulls(series, v)?;
            // A constant outside the column's range keeps the float column.
            if v.fract() == 0.0 {
                filled.strict_cast(dtype).unwrap_or(filled)
            } else {
                filled
            }
        }
        CellValue::Bool(b) if matches!(dtype, DataType::Boolean) => {
            let values: Vec<bool> = series.bool()?.into_iter().map(|v| v.unwrap_or(*b)).collect();
            Series::new(series.name().clone(), values)
        }
        other => fill_string_nulls(series, &other.to_string())?,
    };

    Ok(filled)
}

impl TableCleaner {
    /// Handle null cells in `columns` (all columns when `None`).
    ///
    /// `fill_value` is only read by [`MissingStrategy::Fill`]; calling that
    /// strategy without one is narrated and leaves the table unchanged.
    pub fn handle_missing(
        &mut self,
        strategy: MissingStrategy,
        fill_value: Option<&CellValue>,
        columns: Option<&[&str]>,
    ) -> Result<&DataFrame> {
        let targets = self.resolve_columns(columns);
        if targets.is_empty() {
            return Ok(&self.current);
        }

        match strategy {
            MissingStrategy::Drop => self.drop_missing(&targets),
            MissingStrategy::Fill => match fill_value {
                Some(value) => self.fill_missing(&targets, value),
                None => {
                    self.warn(&TableError::InvalidConfig(
                        "the fill strategy requires a fill value".to_string(),
                    ));
                    Ok(&self.current)
                }
            },
            MissingStrategy::Forward | MissingStrategy::Backward => {
                self.propagate_missing(&targets, strategy)
            }
            MissingStrategy::Mean | MissingStrategy::Median => {
                self.fill_missing_statistic(&targets, strategy)
            }
        }
    }

    fn drop_missing(&mut self, targets: &[String]) -> Result<&DataFrame> {
        let mut keep = vec![true; self.current.height()];
        for name in targets {
            let nulls = self.current.column(name)?.as_materialized_series().is_null();
            for (flag, is_null) in keep.iter_mut().zip(nulls.into_iter()) {
                *flag &= !is_null.unwrap_or(false);
            }
        }

        let before = self.current.height();
        self.current = filter_rows(&self.current, &keep)?;
        let removed = before - self.current.height();

        self.record(
            format!("Rows with missing values removed: {removed}"),
            format!("{removed} row(s) with missing values removed"),
        );
        Ok(&self.current)
    }

    fn fill_missing(&mut self, targets: &[String], value: &CellValue) -> Result<&DataFrame> {
        let mut df = self.current.clone();
        for name in targets {
            let series = df.column(name)?.as_materialized_series().clone();
            if series.null_count() == 0 {
                continue;
            }
            let filled = fill_with_constant(&series, value)?;
            df.replace(name, filled)?;
        }

        self.current = df;
        self.record(
            format!("Missing values filled with: {value}"),
            "Missing values filled".to_string(),
        );
        Ok(&self.current)
    }

    fn propagate_missing(
        &mut self,
        targets: &[String],
        strategy: MissingStrategy,
    ) -> Result<&DataFrame> {
        let fill = if strategy == MissingStrategy::Forward {
            FillNullStrategy::Forward(None)
        } else {
            FillNullStrategy::Backward(None)
        };

        let mut df = self.current.clone();
        for name in targets {
            let series = df.column(name)?.as_materialized_series().clone();
            if series.null_count() == 0 {
                continue;
            }
            df.replace(name, series.fill_null(fill)?)?;
        }

        self.current = df;
        let entry = if strategy == MissingStrategy::Forward {
            "Forward fill applied"
        } else {
            "Backward fill applied"
        };
        self.record(entry.to_string(), entry.to_string());
        Ok(&self.current)
    }

    fn fill_missing_statistic(
        &mut self,
        targets: &[String],
        strategy: MissingStrategy,
    ) -> Result<&DataFrame> {
        let mut df = self.current.clone();
        for name in targets {
            let series = df.column(name)?.as_materialized_series().clone();
            if !is_numeric_dtype(series.dtype()) || series.null_count() == 0 {
                continue;
            }

            let values = present(&numeric_values(&series)?);
            let statistic = if strategy == MissingStrategy::Mean {
                mean(&values)
            } else {
                median(&values)
            };
            debug!(column = %name, strategy = %strategy, value = statistic, "filling nulls");
            df.replace(name, fill_numeric_nulls(&series, statistic)?)?;
        }

        self.current = df;
        let label = if strategy == MissingStrategy::Mean {
            "mean"
        } else {
            "median"
        };
        self.record(
            format!("Missing values filled with {label}"),
            format!("Missing values filled with {label}"),
        );
        Ok(&self.current)
    }
}
