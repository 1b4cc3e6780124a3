//! Descriptive statistics over column values.
//!
//! Conventions follow the usual dataframe `describe` output: standard
//! deviation uses the sample (n - 1) denominator and quartiles use linear
//! interpolation between closest ranks. Empty inputs produce NaN rather than
//! an error so degenerate columns show up in reports as they are.

use crate::utils::{is_numeric_dtype, numeric_values};
use polars::prelude::*;
use serde::Serialize;

/// Non-null, non-NaN values of a column.
pub(crate) fn present(values: &[Option<f64>]) -> Vec<f64> {
    values.iter().flatten().copied().filter(|v| !v.is_nan()).collect()
}

/// Arithmetic mean; NaN when empty.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation; NaN with fewer than two values.
pub fn sample_std(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 2 {
        return f64::NAN;
    }
    let m = mean(values);
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (n - 1) as f64;
    variance.sqrt()
}

/// Quantile of already sorted values with linear interpolation.
pub fn quantile_sorted(sorted: &[f64], q: f64) -> f64 {
    match sorted.len() {
        0 => f64::NAN,
        1 => sorted[0],
        n => {
            let pos = q * (n - 1) as f64;
            let lower = pos.floor() as usize;
            let upper = pos.ceil() as usize;
            let fraction = pos - lower as f64;
            sorted[lower] + (sorted[upper] - sorted[lower]) * fraction
        }
    }
}

/// Sort a copy of the values ascending.
pub fn sorted(values: &[f64]) -> Vec<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    sorted
}

/// Median; NaN when empty.
pub fn median(values: &[f64]) -> f64 {
    quantile_sorted(&sorted(values), 0.5)
}

/// Descriptive statistics for one numeric column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnStatistics {
    pub column: String,
    pub count: usize,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    #[serde(rename = "25%")]
    pub q25: f64,
    #[serde(rename = "50%")]
    pub q50: f64,
    #[serde(rename = "75%")]
    pub q75: f64,
    pub max: f64,
}

/// Row labels of the describe table, in display order.
pub const DESCRIBE_LABELS: [&str; 8] = ["count", "mean", "std", "min", "25%", "50%", "75%", "max"];

impl ColumnStatistics {
    /// Compute statistics for a numeric series; `None` for other types.
    pub fn from_series(series: &Series) -> PolarsResult<Option<Self>> {
        if !is_numeric_dtype(series.dtype()) {
            return Ok(None);
        }

        let values = present(&numeric_values(series)?);
        let ordered = sorted(&values);

        Ok(Some(Self {
            column: series.name().to_string(),
            count: values.len(),
            mean: mean(&values),
            std: sample_std(&values),
            min: ordered.first().copied().unwrap_or(f64::NAN),
            q25: quantile_sorted(&ordered, 0.25),
            q50: quantile_sorted(&ordered, 0.5),
            q75: quantile_sorted(&ordered, 0.75),
            max: ordered.last().copied().unwrap_or(f64::NAN),
        }))
    }

    /// Values in the order of [`DESCRIBE_LABELS`].
    pub fn values(&self) -> [f64; 8] {
        [
            self.count as f64,
            self.mean,
            self.std,
            self.min,
            self.q25,
            self.q50,
            self.q75,
            self.max,
        ]
    }
}

/// Statistics for every numeric column of a table, in column order.
pub fn describe_numeric(df: &DataFrame) -> PolarsResult<Vec<ColumnStatistics>> {
    let mut stats = Vec::new();
    for column in df.get_columns() {
        if let Some(s) = ColumnStatistics::from_series(column.as_materialized_series())? {
            stats.push(s);
        }
    }
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quantiles_linear_interpolation() {
        let values = sorted(&[100.0, 105.0, 98.0, 102.0, 101.0, 99.0, 103.0, 104.0, 1000.0, 97.0]);
        assert!((quantile_sorted(&values, 0.25) - 99.25).abs() < 1e-9);
        assert!((quantile_sorted(&values, 0.75) - 103.75).abs() < 1e-9);
        assert!((quantile_sorted(&values, 0.5) - 101.5).abs() < 1e-9);
    }

    #[test]
    fn test_empty_inputs_are_nan() {
        assert!(mean(&[]).is_nan());
        assert!(sample_std(&[1.0]).is_nan());
        assert!(quantile_sorted(&[], 0.5).is_nan());
    }

    #[test]
    fn test_sample_std() {
        let std = sample_std(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]);
        assert!((std - 2.138089935).abs() < 1e-6);
    }

    #[test]
    fn test_column_statistics_skip_nulls() {
        let series = Series::new("valor".into(), &[Some(1.0), None, Some(3.0), Some(5.0)]);
        let stats = ColumnStatistics::from_series(&series).unwrap().unwrap();

        assert_eq!(stats.count, 3);
        assert_eq!(stats.mean, 3.0);
        assert_eq!(stats.min, 1.0);
        assert_eq!(stats.q50, 3.0);
        assert_eq!(stats.max, 5.0);
    }

    #[test]
    fn test_column_statistics_non_numeric() {
        let series = Series::new("nome".into(), &["a", "b"]);
        assert!(ColumnStatistics::from_series(&series).unwrap().is_none());
    }

    #[test]
    fn test_describe_numeric_keeps_column_order() {
        let df = df![
            "b" => [1.0, 2.0],
            "nome" => ["x", "y"],
            "a" => [3, 4],
        ]
        .unwrap();
        let stats = describe_numeric(&df).unwrap();
        let names: Vec<_> = stats.iter().map(|s| s.column.as_str()).collect();
        assert_eq!(names, vec!["b", "a"]);
    }
}
