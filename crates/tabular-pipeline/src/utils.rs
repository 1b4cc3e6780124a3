//! Shared utilities for cleaning and reporting.
//!
//! This module contains the dtype helpers and cell accessors used across the
//! cleaner, the quality report and the report emitter.

use polars::prelude::*;
use std::collections::HashMap;

// =============================================================================
// Data Type Utilities
// =============================================================================

/// Category of a data type, as shown in quality reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DtypeCategory {
    /// Integer or floating point numbers
    Numeric,
    /// Date or datetime types
    Datetime,
    /// Boolean type
    Boolean,
    /// String/text type
    Text,
    /// Other/unknown types
    Other,
}

impl DtypeCategory {
    /// Lowercase name of the category.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Numeric => "numeric",
            Self::Datetime => "datetime",
            Self::Boolean => "boolean",
            Self::Text => "text",
            Self::Other => "other",
        }
    }
}

/// Check if a DataType is numeric (integer or float).
#[inline]
pub fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

/// Check if a DataType is a datetime type.
#[inline]
pub fn is_datetime_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Datetime(_, _) | DataType::Date | DataType::Time
    )
}

/// Check if a DataType holds text.
#[inline]
pub fn is_text_dtype(dtype: &DataType) -> bool {
    matches!(dtype, DataType::String)
}

/// Get the category of a DataType.
pub fn get_dtype_category(dtype: &DataType) -> DtypeCategory {
    if is_numeric_dtype(dtype) {
        DtypeCategory::Numeric
    } else if is_datetime_dtype(dtype) {
        DtypeCategory::Datetime
    } else if matches!(dtype, DataType::Boolean) {
        DtypeCategory::Boolean
    } else if is_text_dtype(dtype) {
        DtypeCategory::Text
    } else {
        DtypeCategory::Other
    }
}

/// Names of the text columns of a table, in column order.
pub fn text_column_names(df: &DataFrame) -> Vec<String> {
    df.get_columns()
        .iter()
        .filter(|c| is_text_dtype(c.dtype()))
        .map(|c| c.name().to_string())
        .collect()
}

/// Names of the numeric columns of a table, in column order.
pub fn numeric_column_names(df: &DataFrame) -> Vec<String> {
    df.get_columns()
        .iter()
        .filter(|c| is_numeric_dtype(c.dtype()))
        .map(|c| c.name().to_string())
        .collect()
}

// =============================================================================
// Cell Access Utilities
// =============================================================================

/// Numeric view of a series; nulls stay `None`.
///
/// Only meaningful for numeric and boolean series; other types fail the cast.
pub fn numeric_values(series: &Series) -> PolarsResult<Vec<Option<f64>>> {
    let floats = series.cast(&DataType::Float64)?;
    Ok(floats.f64()?.into_iter().collect())
}

/// Text view of any series; nulls stay `None`.
pub fn text_values(series: &Series) -> PolarsResult<Vec<Option<String>>> {
    let strings = series.cast(&DataType::String)?;
    Ok(strings
        .str()?
        .into_iter()
        .map(|v| v.map(str::to_string))
        .collect())
}

/// One comparable key per row over the given columns.
///
/// Nulls are encoded distinctly from any text so that a null cell never
/// collides with the string `"null"`. Float zeros compare equal regardless of
/// sign.
pub fn row_keys(df: &DataFrame, columns: &[String]) -> PolarsResult<Vec<String>> {
    let mut keys = vec![String::new(); df.height()];

    for name in columns {
        let series = df.column(name)?.as_materialized_series();
        let values = if matches!(series.dtype(), DataType::Float32 | DataType::Float64) {
            // Adding 0.0 folds -0.0 into 0.0.
            numeric_values(series)?
                .into_iter()
                .map(|v| v.map(|f| (f + 0.0).to_string()))
                .collect()
        } else {
            text_values(series)?
        };
        for (key, value) in keys.iter_mut().zip(values) {
            match value {
                Some(text) => {
                    key.push('\u{1}');
                    key.push_str(&text);
                }
                None => key.push('\u{0}'),
            }
            key.push('\u{1f}');
        }
    }

    Ok(keys)
}

/// Mark rows that repeat an earlier row (or a later one when `keep_last`).
pub fn duplicate_mask(keys: &[String], keep_last: bool) -> Vec<bool> {
    let mut seen = std::collections::HashSet::with_capacity(keys.len());
    let mut duplicated = vec![false; keys.len()];

    if keep_last {
        for (i, key) in keys.iter().enumerate().rev() {
            duplicated[i] = !seen.insert(key.as_str());
        }
    } else {
        for (i, key) in keys.iter().enumerate() {
            duplicated[i] = !seen.insert(key.as_str());
        }
    }

    duplicated
}

/// Count of rows that duplicate an earlier row over all columns.
pub fn duplicate_row_count(df: &DataFrame) -> PolarsResult<usize> {
    let columns: Vec<String> = df
        .get_column_names()
        .into_iter()
        .map(|s| s.to_string())
        .collect();
    let keys = row_keys(df, &columns)?;
    Ok(duplicate_mask(&keys, false).into_iter().filter(|d| *d).count())
}

/// Filter a table with a plain boolean row mask.
pub fn filter_rows(df: &DataFrame, keep: &[bool]) -> PolarsResult<DataFrame> {
    let mask = BooleanChunked::from_slice("mask".into(), keep);
    df.filter(&mask)
}

// =============================================================================
// String Utilities
// =============================================================================

/// Parse a plain numeric literal, ignoring surrounding whitespace.
///
/// Unlike spreadsheet-style parsing this does not strip currency or thousands
/// separators: `"1,000"` is not a number.
pub fn parse_number(s: &str) -> Option<f64> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok()
}

/// Title-case a string: the first cased letter of every run is upper-cased,
/// the rest lower-cased. Any non-letter starts a new run.
pub fn title_case(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut in_word = false;

    for c in s.chars() {
        if c.is_alphabetic() {
            if in_word {
                result.extend(c.to_lowercase());
            } else {
                result.extend(c.to_uppercase());
            }
            in_word = true;
        } else {
            result.push(c);
            in_word = false;
        }
    }

    result
}

/// Most frequent non-null text value; ties resolve to the smallest value.
pub fn text_mode(values: &[Option<String>]) -> Option<String> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for value in values.iter().flatten() {
        *counts.entry(value.as_str()).or_insert(0) += 1;
    }

    counts
        .into_iter()
        .max_by(|(a_val, a_count), (b_val, b_count)| {
            a_count.cmp(b_count).then_with(|| b_val.cmp(a_val))
        })
        .map(|(val, _)| val.to_string())
}

/// Number of distinct non-null text values.
pub fn unique_count(values: &[Option<String>]) -> usize {
    values
        .iter()
        .flatten()
        .collect::<std::collections::HashSet<_>>()
        .len()
}

/// Round to two decimal places.
#[inline]
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

// =============================================================================
// Series Transformation Utilities
// =============================================================================

/// Fill null values in a numeric Series with a specific value.
pub fn fill_numeric_nulls(series: &Series, fill_value: f64) -> PolarsResult<Series> {
    let filled: Vec<f64> = numeric_values(series)?
        .into_iter()
        .map(|v| v.unwrap_or(fill_value))
        .collect();
    Ok(Series::new(series.name().clone(), filled))
}

/// Fill null values in any Series with a text value; the result is a string Series.
pub fn fill_string_nulls(series: &Series, fill_value: &str) -> PolarsResult<Series> {
    let filled: Vec<String> = text_values(series)?
        .into_iter()
        .map(|v| v.unwrap_or_else(|| fill_value.to_string()))
        .collect();
    Ok(Series::new(series.name().clone(), filled))
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_numeric_dtype() {
        assert!(is_numeric_dtype(&DataType::Int64));
        assert!(is_numeric_dtype(&DataType::Float64));
        assert!(!is_numeric_dtype(&DataType::String));
        assert!(!is_numeric_dtype(&DataType::Boolean));
    }

    #[test]
    fn test_dtype_category() {
        assert_eq!(get_dtype_category(&DataType::Int32), DtypeCategory::Numeric);
        assert_eq!(get_dtype_category(&DataType::Date), DtypeCategory::Datetime);
        assert_eq!(get_dtype_category(&DataType::Boolean), DtypeCategory::Boolean);
        assert_eq!(get_dtype_category(&DataType::String), DtypeCategory::Text);
        assert_eq!(DtypeCategory::Text.as_str(), "text");
    }

    #[test]
    fn test_text_and_numeric_column_names() {
        let df = df![
            "nome" => ["Ana", "Bia"],
            "idade" => [30, 41],
            "cidade" => ["Recife", "Natal"],
        ]
        .unwrap();

        assert_eq!(text_column_names(&df), vec!["nome", "cidade"]);
        assert_eq!(numeric_column_names(&df), vec!["idade"]);
    }

    #[test]
    fn test_row_keys_distinguish_null_from_text() {
        let df = df!["a" => [Some("null"), None]].unwrap();
        let keys = row_keys(&df, &["a".to_string()]).unwrap();
        assert_ne!(keys[0], keys[1]);
    }

    #[test]
    fn test_duplicate_mask_first_and_last() {
        let keys: Vec<String> = ["x", "y", "x", "x"].iter().map(|s| s.to_string()).collect();
        assert_eq!(duplicate_mask(&keys, false), vec![false, false, true, true]);
        assert_eq!(duplicate_mask(&keys, true), vec![true, false, true, false]);
    }

    #[test]
    fn test_duplicate_row_count() {
        let df = df![
            "a" => [1, 1, 2, 1],
            "b" => ["x", "x", "y", "z"],
        ]
        .unwrap();
        assert_eq!(duplicate_row_count(&df).unwrap(), 1);
    }

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_number(" 42 "), Some(42.0));
        assert_eq!(parse_number("-3.5"), Some(-3.5));
        assert_eq!(parse_number("1,000"), None);
        assert_eq!(parse_number(""), None);
        assert_eq!(parse_number("abc"), None);
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("joão da silva"), "João Da Silva");
        assert_eq!(title_case("SÃO PAULO"), "São Paulo");
        assert_eq!(title_case("o'neil 2nd"), "O'Neil 2Nd");
    }

    #[test]
    fn test_text_mode_breaks_ties_by_value() {
        let values = vec![
            Some("b".to_string()),
            Some("a".to_string()),
            None,
            Some("b".to_string()),
            Some("a".to_string()),
        ];
        assert_eq!(text_mode(&values), Some("a".to_string()));
        assert_eq!(text_mode(&[None]), None);
    }

    #[test]
    fn test_unique_count_ignores_nulls() {
        let values = vec![Some("a".to_string()), None, Some("a".to_string()), Some("b".to_string())];
        assert_eq!(unique_count(&values), 2);
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(33.33333), 33.33);
        assert_eq!(round2(50.0), 50.0);
    }

    #[test]
    fn test_fill_numeric_nulls() {
        let series = Series::new("test".into(), &[Some(1.0), None, Some(3.0)]);
        let filled = fill_numeric_nulls(&series, 0.0).unwrap();

        assert_eq!(filled.get(0).unwrap().try_extract::<f64>().unwrap(), 1.0);
        assert_eq!(filled.get(1).unwrap().try_extract::<f64>().unwrap(), 0.0);
        assert_eq!(filled.get(2).unwrap().try_extract::<f64>().unwrap(), 3.0);
    }

    #[test]
    fn test_fill_string_nulls() {
        let series = Series::new("test".into(), &[Some("a"), None]);
        let filled = fill_string_nulls(&series, "Unknown").unwrap();
        assert_eq!(filled.null_count(), 0);
        assert_eq!(filled.str().unwrap().get(1), Some("Unknown"));
    }
}
