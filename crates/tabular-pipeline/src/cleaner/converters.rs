//! Column type conversion.
//!
//! Numeric targets coerce cell by cell: text is parsed as a plain number,
//! anything unparseable becomes null (`float`) or 0 (`int`). Datetime targets
//! accept ISO dates and datetimes plus day-first `dd/mm/yyyy`; numbers are read
//! as nanoseconds since the Unix epoch.

use super::TableCleaner;
use crate::config::TargetType;
use crate::error::{Result, TableError};
use crate::utils::{is_numeric_dtype, numeric_values, parse_number, text_values};
use chrono::{NaiveDate, NaiveDateTime};
use polars::prelude::*;
use tracing::debug;

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%d/%m/%Y"];

/// Parse a datetime string into microseconds since the Unix epoch.
fn parse_datetime_micros(value: &str) -> Option<i64> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.timestamp_micros());
    }

    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(dt.and_utc().timestamp_micros());
        }
    }

    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
            return date
                .and_hms_opt(0, 0, 0)
                .map(|dt| dt.and_utc().timestamp_micros());
        }
    }

    None
}

/// Numeric view of any column: numbers as-is, text parsed, temporal values
/// by their physical representation.
fn coerce_numeric(series: &Series) -> Result<Vec<Option<f64>>> {
    let dtype = series.dtype();

    if is_numeric_dtype(dtype) || matches!(dtype, DataType::Boolean) {
        return Ok(numeric_values(series)?);
    }

    match dtype {
        DataType::String => Ok(series
            .str()?
            .into_iter()
            .map(|v| v.and_then(parse_number))
            .collect()),
        DataType::Datetime(_, _) | DataType::Date | DataType::Duration(_) | DataType::Time => {
            let physical = series.to_physical_repr().cast(&DataType::Float64)?;
            Ok(physical.f64()?.into_iter().collect())
        }
        DataType::Null => Ok(vec![None; series.len()]),
        other => Err(TableError::WrongColumnType {
            column: series.name().to_string(),
            dtype: other.to_string(),
            expected: "numeric, text or temporal",
        }),
    }
}

fn to_int(series: &Series) -> Result<Series> {
    let mut values = Vec::with_capacity(series.len());
    for value in coerce_numeric(series)? {
        let v = match value {
            Some(v) if v.is_nan() => 0.0,
            Some(v) => v,
            None => 0.0,
        };
        if !v.is_finite() || v.trunc() < i64::MIN as f64 || v.trunc() >= i64::MAX as f64 {
            return Err(TableError::TypeConversionFailed {
                column: series.name().to_string(),
                target_type: TargetType::Int.to_string(),
                reason: format!("value {v} cannot be represented as an integer"),
            });
        }
        values.push(v.trunc() as i64);
    }
    Ok(Series::new(series.name().clone(), values))
}

fn to_float(series: &Series) -> Result<Series> {
    Ok(Series::new(series.name().clone(), coerce_numeric(series)?))
}

fn to_datetime(series: &Series) -> Result<Series> {
    let target = DataType::Datetime(TimeUnit::Microseconds, None);
    let dtype = series.dtype();

    let micros: Vec<Option<i64>> = match dtype {
        DataType::Datetime(_, _) | DataType::Date => return Ok(series.cast(&target)?),
        DataType::String => series
            .str()?
            .into_iter()
            .map(|v| v.and_then(parse_datetime_micros))
            .collect(),
        dt if is_numeric_dtype(dt) => numeric_values(series)?
            .into_iter()
            .map(|v| v.filter(|n| n.is_finite()).map(|ns| (ns / 1_000.0).trunc() as i64))
            .collect(),
        DataType::Null => vec![None; series.len()],
        other => {
            return Err(TableError::WrongColumnType {
                column: series.name().to_string(),
                dtype: other.to_string(),
                expected: "text, numeric or temporal",
            });
        }
    };

    Ok(Series::new(series.name().clone(), micros).cast(&target)?)
}

fn to_string(series: &Series) -> Result<Series> {
    Ok(Series::new(series.name().clone(), text_values(series)?))
}

/// Convert one series, describing any failure as a conversion failure.
pub(crate) fn convert_series(series: &Series, target: TargetType) -> Result<Series> {
    let converted = match target {
        TargetType::Int => to_int(series),
        TargetType::Float => to_float(series),
        TargetType::Datetime => to_datetime(series),
        TargetType::String => to_string(series),
    };

    converted.map_err(|e| match e {
        TableError::TypeConversionFailed { .. } => e,
        other => TableError::TypeConversionFailed {
            column: series.name().to_string(),
            target_type: target.to_string(),
            reason: other.to_string(),
        },
    })
}

impl TableCleaner {
    /// Convert each listed column to its target type.
    ///
    /// Columns are converted independently: a missing column or a failed
    /// conversion is narrated and the remaining entries still run.
    pub fn convert_types(&mut self, conversions: &[(&str, TargetType)]) -> Result<&DataFrame> {
        for &(name, target) in conversions {
            if !self.has_column(name) {
                self.warn(&TableError::ColumnNotFound(name.to_string()));
                continue;
            }

            let series = self.current.column(name)?.as_materialized_series().clone();
            debug!(column = %name, from = %series.dtype(), to = %target, "converting column");

            match convert_series(&series, target) {
                Ok(converted) => {
                    let mut df = self.current.clone();
                    df.replace(name, converted)?;
                    self.current = df;
                    self.record(
                        format!("Column '{name}' converted to {target}"),
                        format!("Column '{name}' converted to {target}"),
                    );
                }
                Err(e) => self.report_failure(&e),
            }
        }

        Ok(&self.current)
    }
}
