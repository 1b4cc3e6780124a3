//! Derived tables: statistics, null and type listings, frequencies, pivots,
//! group comparisons and filters.
//!
//! These are pure functions of the source table. Group keys ignore nulls and
//! are ordered numerically for numeric columns, lexicographically otherwise.

use crate::config::Aggregate;
use crate::error::{Result, TableError};
use crate::quality::{column_nulls, column_types};
use crate::statistics::{ColumnStatistics, mean};
use crate::types::CellValue;
use crate::utils::{
    filter_rows, is_numeric_dtype, is_text_dtype, numeric_values, round2, text_values,
};
use polars::prelude::*;
use std::collections::{HashMap, HashSet};

/// A frequency table for one column.
#[derive(Debug, Clone)]
pub struct FrequencyTable {
    pub column: String,
    /// Columns: the value column, `Frequency`, `Percentage`
    pub table: DataFrame,
}

/// `name`, or `name_2`, `name_3`... when `name` is already taken. The chosen
/// name is added to `taken`.
fn distinct_name(name: &str, taken: &mut HashSet<String>) -> String {
    let mut candidate = name.to_string();
    let mut n = 2;
    while taken.contains(&candidate) {
        candidate = format!("{name}_{n}");
        n += 1;
    }
    taken.insert(candidate.clone());
    candidate
}

// =============================================================================
// Grouping
// =============================================================================

/// Distinct non-null values of a series in sorted order.
struct Groups {
    /// Group of every row; `None` for null cells
    row_group: Vec<Option<usize>>,
    /// First row of every group, in group order
    first_rows: Vec<IdxSize>,
    /// Text label of every group, in group order
    labels: Vec<String>,
}

impl Groups {
    fn len(&self) -> usize {
        self.labels.len()
    }

    /// The key column: one row per group, original dtype kept.
    fn key_series(&self, series: &Series) -> PolarsResult<Series> {
        let idx = IdxCa::from_vec("idx".into(), self.first_rows.clone());
        series.take(&idx)
    }
}

fn sorted_groups(series: &Series) -> PolarsResult<Groups> {
    let labels_per_row = text_values(series)?;
    let numbers = if is_numeric_dtype(series.dtype()) {
        Some(numeric_values(series)?)
    } else {
        None
    };

    let mut first_seen: HashMap<&str, usize> = HashMap::new();
    let mut order: Vec<usize> = Vec::new();
    for (row, label) in labels_per_row.iter().enumerate() {
        if let Some(label) = label
            && !first_seen.contains_key(label.as_str())
        {
            first_seen.insert(label.as_str(), row);
            order.push(row);
        }
    }

    match &numbers {
        Some(nums) => order.sort_by(|a, b| {
            let x = nums[*a].unwrap_or(f64::NAN);
            let y = nums[*b].unwrap_or(f64::NAN);
            x.total_cmp(&y)
        }),
        None => order.sort_by(|a, b| labels_per_row[*a].cmp(&labels_per_row[*b])),
    }

    let labels: Vec<String> = order
        .iter()
        .map(|row| labels_per_row[*row].clone().unwrap_or_default())
        .collect();
    let group_of: HashMap<&str, usize> = labels
        .iter()
        .enumerate()
        .map(|(g, label)| (label.as_str(), g))
        .collect();
    let row_group = labels_per_row
        .iter()
        .map(|label| label.as_deref().and_then(|l| group_of.get(l).copied()))
        .collect();

    Ok(Groups {
        row_group,
        first_rows: order.iter().map(|r| *r as IdxSize).collect(),
        labels,
    })
}

fn numeric_column<'a>(df: &'a DataFrame, name: &str) -> Result<&'a Series> {
    let series = df.column(name)?.as_materialized_series();
    if !is_numeric_dtype(series.dtype()) {
        return Err(TableError::WrongColumnType {
            column: name.to_string(),
            dtype: series.dtype().to_string(),
            expected: "numeric",
        });
    }
    Ok(series)
}

fn existing_column<'a>(df: &'a DataFrame, name: &str) -> Result<&'a Series> {
    df.column(name)
        .map(|c| c.as_materialized_series())
        .map_err(|_| TableError::ColumnNotFound(name.to_string()))
}

// =============================================================================
// Workbook sheets
// =============================================================================

/// Transposed describe over every column.
///
/// Numeric columns fill `count` through `max`; other columns fill `count`,
/// `unique`, `top` and `freq`.
pub fn statistics_table(df: &DataFrame) -> Result<DataFrame> {
    let width = df.width();
    let mut names = Vec::with_capacity(width);
    let mut count = Vec::with_capacity(width);
    let mut unique: Vec<Option<i64>> = Vec::with_capacity(width);
    let mut top: Vec<Option<String>> = Vec::with_capacity(width);
    let mut freq: Vec<Option<i64>> = Vec::with_capacity(width);
    let mut numeric: [Vec<Option<f64>>; 7] = Default::default();

    for column in df.get_columns() {
        let series = column.as_materialized_series();
        names.push(column.name().to_string());
        count.push((series.len() - series.null_count()) as i64);

        match ColumnStatistics::from_series(series)? {
            Some(stats) => {
                unique.push(None);
                top.push(None);
                freq.push(None);
                for (slot, value) in numeric.iter_mut().zip(stats.values().into_iter().skip(1)) {
                    slot.push(Some(value));
                }
            }
            None => {
                let values = text_values(series)?;
                let mut counts: Vec<(&str, i64)> = Vec::new();
                let mut index: HashMap<&str, usize> = HashMap::new();
                for value in values.iter().flatten() {
                    match index.get(value.as_str()) {
                        Some(&i) => counts[i].1 += 1,
                        None => {
                            index.insert(value.as_str(), counts.len());
                            counts.push((value.as_str(), 1));
                        }
                    }
                }
                // Highest count wins; ties go to the first value seen.
                let most = counts
                    .iter()
                    .fold(None::<(&str, i64)>, |best, &(v, c)| match best {
                        Some((_, bc)) if bc >= c => best,
                        _ => Some((v, c)),
                    });

                unique.push(Some(counts.len() as i64));
                top.push(most.map(|(v, _)| v.to_string()));
                freq.push(most.map(|(_, c)| c));
                for slot in numeric.iter_mut() {
                    slot.push(None);
                }
            }
        }
    }

    let [m, std, min, q25, q50, q75, max] = numeric;
    let columns = vec![
        Column::new("Column".into(), names),
        Column::new("count".into(), count),
        Column::new("unique".into(), unique),
        Column::new("top".into(), top),
        Column::new("freq".into(), freq),
        Column::new("mean".into(), m),
        Column::new("std".into(), std),
        Column::new("min".into(), min),
        Column::new("25%".into(), q25),
        Column::new("50%".into(), q50),
        Column::new("75%".into(), q75),
        Column::new("max".into(), max),
    ];
    Ok(DataFrame::new(columns)?)
}

/// One row per column with its null count and percentage.
pub fn null_table(df: &DataFrame) -> Result<DataFrame> {
    let nulls = column_nulls(df);
    Ok(DataFrame::new(vec![
        Column::new(
            "Column".into(),
            nulls.iter().map(|n| n.column.clone()).collect::<Vec<_>>(),
        ),
        Column::new(
            "Null Count".into(),
            nulls.iter().map(|n| n.null_count as i64).collect::<Vec<_>>(),
        ),
        Column::new(
            "Percentage".into(),
            nulls.iter().map(|n| n.null_percentage).collect::<Vec<_>>(),
        ),
    ])?)
}

/// One row per column with its dtype.
pub fn type_table(df: &DataFrame) -> Result<DataFrame> {
    let types = column_types(df);
    Ok(DataFrame::new(vec![
        Column::new(
            "Column".into(),
            types.iter().map(|t| t.column.clone()).collect::<Vec<_>>(),
        ),
        Column::new(
            "Type".into(),
            types.iter().map(|t| t.dtype.clone()).collect::<Vec<_>>(),
        ),
    ])?)
}

// =============================================================================
// Report tables
// =============================================================================

/// Value counts of one column, most frequent first.
///
/// Ties keep first-appearance order. Percentages are relative to all rows,
/// nulls included, and rounded to two decimals. When the source column is
/// itself named `Frequency` or `Percentage` the computed column gets a `_2`
/// suffix.
pub fn frequency_table(df: &DataFrame, column: &str) -> Result<FrequencyTable> {
    let series = existing_column(df, column)?;
    let total = df.height();

    let mut first_rows: Vec<IdxSize> = Vec::new();
    let mut counts: Vec<i64> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    for (row, value) in text_values(series)?.into_iter().enumerate() {
        let Some(value) = value else { continue };
        match index.get(&value) {
            Some(&i) => counts[i] += 1,
            None => {
                index.insert(value, counts.len());
                counts.push(1);
                first_rows.push(row as IdxSize);
            }
        }
    }

    let mut order: Vec<usize> = (0..counts.len()).collect();
    order.sort_by(|a, b| counts[*b].cmp(&counts[*a]));

    let idx = IdxCa::from_vec(
        "idx".into(),
        order.iter().map(|i| first_rows[*i]).collect(),
    );
    let values = series.take(&idx)?;
    let frequency: Vec<i64> = order.iter().map(|i| counts[*i]).collect();
    let percentage: Vec<f64> = frequency
        .iter()
        .map(|c| round2(*c as f64 / total as f64 * 100.0))
        .collect();

    let mut taken = HashSet::from([column.to_string()]);
    let table = DataFrame::new(vec![
        values.into_column(),
        Column::new(distinct_name("Frequency", &mut taken).into(), frequency),
        Column::new(distinct_name("Percentage", &mut taken).into(), percentage),
    ])?;

    Ok(FrequencyTable {
        column: column.to_string(),
        table,
    })
}

fn aggregate_values(values: &[f64], aggregate: Aggregate) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    match aggregate {
        Aggregate::Sum => values.iter().sum(),
        Aggregate::Mean => mean(values),
        Aggregate::Count => values.len() as f64,
        Aggregate::Min => values.iter().copied().fold(f64::INFINITY, f64::min),
        Aggregate::Max => values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
    }
}

/// Cross-tabulation of `values` by `index` rows and `columns` columns.
///
/// Combinations without values are 0. `count` produces integer cells, every
/// other aggregate float cells. A label equal to the index name (or to an
/// earlier label) gets a numeric suffix.
pub fn pivot_table(
    df: &DataFrame,
    index: &str,
    columns: &str,
    values: &str,
    aggregate: Aggregate,
) -> Result<DataFrame> {
    let index_series = existing_column(df, index)?;
    let columns_series = existing_column(df, columns)?;
    let value_series = existing_column(df, values)?;

    let cell_values: Vec<Option<f64>> = if aggregate == Aggregate::Count {
        value_series
            .is_not_null()
            .into_iter()
            .map(|present| present.unwrap_or(false).then_some(1.0))
            .collect()
    } else {
        numeric_values(numeric_column(df, values)?)?
    };

    let rows = sorted_groups(index_series)?;
    let cols = sorted_groups(columns_series)?;

    let mut cells: Vec<Vec<Vec<f64>>> = vec![vec![Vec::new(); cols.len()]; rows.len()];
    for (row, value) in cell_values.iter().enumerate() {
        if let (Some(r), Some(c), Some(v)) = (rows.row_group[row], cols.row_group[row], value)
            && !v.is_nan()
        {
            cells[r][c].push(*v);
        }
    }

    let mut taken = HashSet::from([index.to_string()]);
    let mut output = vec![rows.key_series(index_series)?.into_column()];
    for (c, label) in cols.labels.iter().enumerate() {
        let label = distinct_name(label, &mut taken);
        let aggregated: Vec<f64> = cells
            .iter()
            .map(|row| aggregate_values(&row[c], aggregate))
            .collect();
        let column = if aggregate == Aggregate::Count {
            Column::new(
                label.as_str().into(),
                aggregated.into_iter().map(|v| v as i64).collect::<Vec<_>>(),
            )
        } else {
            Column::new(label.as_str().into(), aggregated)
        };
        output.push(column);
    }

    Ok(DataFrame::new(output)?)
}

/// Per-group mean, sum and count of each compare column.
///
/// Output columns are the group key followed by `{c}_mean`, `{c}_sum` and
/// `{c}_count` for every compare column.
pub fn group_comparison_table(
    df: &DataFrame,
    group: &str,
    compare: &[&str],
) -> Result<DataFrame> {
    let group_series = existing_column(df, group)?;
    let groups = sorted_groups(group_series)?;

    let mut output = vec![groups.key_series(group_series)?.into_column()];
    for name in compare {
        let values = numeric_values(numeric_column(df, name)?)?;

        let mut buckets: Vec<Vec<f64>> = vec![Vec::new(); groups.len()];
        for (row, value) in values.iter().enumerate() {
            if let (Some(g), Some(v)) = (groups.row_group[row], value)
                && !v.is_nan()
            {
                buckets[g].push(*v);
            }
        }

        let means: Vec<f64> = buckets.iter().map(|b| mean(b)).collect();
        let sums: Vec<f64> = buckets.iter().map(|b| b.iter().sum()).collect();
        let counts: Vec<i64> = buckets.iter().map(|b| b.len() as i64).collect();

        output.push(Column::new(format!("{name}_mean").into(), means));
        output.push(Column::new(format!("{name}_sum").into(), sums));
        output.push(Column::new(format!("{name}_count").into(), counts));
    }

    Ok(DataFrame::new(output)?)
}

/// Columns with at least one null, highest percentage first.
pub fn missing_table(df: &DataFrame) -> Result<DataFrame> {
    let types: HashMap<String, String> = column_types(df)
        .into_iter()
        .map(|t| (t.column, t.dtype))
        .collect();

    let mut nulls: Vec<_> = column_nulls(df)
        .into_iter()
        .filter(|n| n.null_count > 0)
        .collect();
    nulls.sort_by(|a, b| b.null_percentage.total_cmp(&a.null_percentage));

    Ok(DataFrame::new(vec![
        Column::new(
            "Column".into(),
            nulls.iter().map(|n| n.column.clone()).collect::<Vec<_>>(),
        ),
        Column::new(
            "Null Count".into(),
            nulls.iter().map(|n| n.null_count as i64).collect::<Vec<_>>(),
        ),
        Column::new(
            "Percentage".into(),
            nulls.iter().map(|n| round2(n.null_percentage)).collect::<Vec<_>>(),
        ),
        Column::new(
            "Data Type".into(),
            nulls
                .iter()
                .map(|n| types.get(&n.column).cloned().unwrap_or_default())
                .collect::<Vec<_>>(),
        ),
    ])?)
}

/// Whether each cell of `series` equals `value`.
///
/// Values only match cells of a compatible type: text against text columns,
/// numbers against numeric columns, booleans against boolean columns.
fn equals_mask(series: &Series, value: &CellValue) -> PolarsResult<Vec<bool>> {
    let dtype = series.dtype();
    let mask = match value {
        CellValue::Text(text) if is_text_dtype(dtype) => series
            .str()?
            .into_iter()
            .map(|v| v == Some(text.as_str()))
            .collect(),
        CellValue::Int(_) | CellValue::Float(_) if is_numeric_dtype(dtype) => {
            let target = value.as_f64();
            numeric_values(series)?
                .into_iter()
                .map(|v| v.is_some() && v == target)
                .collect()
        }
        CellValue::Bool(b) if matches!(dtype, DataType::Boolean) => {
            series.bool()?.into_iter().map(|v| v == Some(*b)).collect()
        }
        _ => vec![false; series.len()],
    };
    Ok(mask)
}

/// Rows matching every `column == value` condition. Conditions on columns
/// that do not exist are ignored.
pub fn filter_table(df: &DataFrame, filters: &[(&str, CellValue)]) -> Result<DataFrame> {
    let mut keep = vec![true; df.height()];
    for (name, value) in filters {
        let Ok(column) = df.column(name) else {
            tracing::debug!(column = %name, "ignoring filter on missing column");
            continue;
        };
        for (flag, matched) in keep
            .iter_mut()
            .zip(equals_mask(column.as_materialized_series(), value)?)
        {
            *flag &= matched;
        }
    }
    Ok(filter_rows(df, &keep)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sales() -> DataFrame {
        df![
            "regiao" => ["Sul", "Norte", "Sul", "Norte", "Sul", "Leste"],
            "produto" => ["A", "A", "B", "B", "A", "B"],
            "valor" => [Some(10.0), Some(20.0), Some(5.0), None, Some(15.0), Some(7.0)],
            "qtd" => [1, 2, 3, 4, 5, 6],
        ]
        .unwrap()
    }

    fn strings(df: &DataFrame, name: &str) -> Vec<String> {
        text_values(df.column(name).unwrap().as_materialized_series())
            .unwrap()
            .into_iter()
            .map(|v| v.unwrap_or_default())
            .collect()
    }

    fn names(df: &DataFrame) -> Vec<String> {
        df.get_column_names()
            .into_iter()
            .map(|s| s.to_string())
            .collect()
    }

    fn floats(df: &DataFrame, name: &str) -> Vec<Option<f64>> {
        numeric_values(df.column(name).unwrap().as_materialized_series()).unwrap()
    }

    // ========================================================================
    // frequency_table() tests
    // ========================================================================

    #[test]
    fn test_frequency_counts_and_percentages() {
        let df = df![
            "cidade" => ["São Paulo", "Rio", "São Paulo", "Recife", "São Paulo", "Rio", "São Paulo", "Natal"]
        ]
        .unwrap();
        let freq = frequency_table(&df, "cidade").unwrap();

        assert_eq!(strings(&freq.table, "cidade"), vec!["São Paulo", "Rio", "Recife", "Natal"]);
        assert_eq!(floats(&freq.table, "Frequency"), vec![Some(4.0), Some(2.0), Some(1.0), Some(1.0)]);
        assert_eq!(freq.table.column("Percentage").unwrap().f64().unwrap().get(0), Some(50.0));
        assert_eq!(freq.table.column("Percentage").unwrap().f64().unwrap().get(2), Some(12.5));
    }

    #[test]
    fn test_frequency_percentage_counts_null_rows() {
        let df = df!["x" => [Some("a"), None, Some("a")]].unwrap();
        let freq = frequency_table(&df, "x").unwrap();
        assert_eq!(freq.table.height(), 1);
        assert_eq!(freq.table.column("Percentage").unwrap().f64().unwrap().get(0), Some(66.67));
    }

    #[test]
    fn test_frequency_of_column_named_frequency() {
        let df = df!["Frequency" => ["alta", "baixa", "alta"]].unwrap();
        let freq = frequency_table(&df, "Frequency").unwrap();

        assert_eq!(
            names(&freq.table),
            vec!["Frequency", "Frequency_2", "Percentage"]
        );
        assert_eq!(strings(&freq.table, "Frequency"), vec!["alta", "baixa"]);
        assert_eq!(floats(&freq.table, "Frequency_2"), vec![Some(2.0), Some(1.0)]);
    }

    #[test]
    fn test_frequency_keeps_numeric_dtype() {
        let df = df!["nota" => [3, 5, 3]].unwrap();
        let freq = frequency_table(&df, "nota").unwrap();
        assert_eq!(freq.table.column("nota").unwrap().dtype(), &DataType::Int32);
    }

    // ========================================================================
    // pivot_table() tests
    // ========================================================================

    #[test]
    fn test_pivot_sum_fills_missing_with_zero() {
        let pivot = pivot_table(&sales(), "regiao", "produto", "valor", Aggregate::Sum).unwrap();

        assert_eq!(strings(&pivot, "regiao"), vec!["Leste", "Norte", "Sul"]);
        assert_eq!(floats(&pivot, "A"), vec![Some(0.0), Some(20.0), Some(25.0)]);
        assert_eq!(floats(&pivot, "B"), vec![Some(7.0), Some(0.0), Some(5.0)]);
    }

    #[test]
    fn test_pivot_count_is_integer() {
        let pivot = pivot_table(&sales(), "regiao", "produto", "valor", Aggregate::Count).unwrap();

        assert_eq!(pivot.column("A").unwrap().dtype(), &DataType::Int64);
        assert_eq!(floats(&pivot, "A"), vec![Some(0.0), Some(1.0), Some(2.0)]);
        assert_eq!(floats(&pivot, "B"), vec![Some(1.0), Some(0.0), Some(1.0)]);
    }

    #[test]
    fn test_pivot_numeric_keys_sort_numerically() {
        let df = df![
            "ano" => [2024, 998, 2024],
            "tipo" => ["x", "x", "y"],
            "v" => [1.0, 2.0, 3.0],
        ]
        .unwrap();
        let pivot = pivot_table(&df, "ano", "tipo", "v", Aggregate::Max).unwrap();
        assert_eq!(floats(&pivot, "ano"), vec![Some(998.0), Some(2024.0)]);
    }

    #[test]
    fn test_pivot_label_matching_index_name() {
        let df = df![
            "tipo" => ["a", "b", "a"],
            "status" => ["tipo", "ok", "ok"],
            "v" => [1.0, 2.0, 3.0],
        ]
        .unwrap();
        let pivot = pivot_table(&df, "tipo", "status", "v", Aggregate::Sum).unwrap();

        assert_eq!(names(&pivot), vec!["tipo", "ok", "tipo_2"]);
        assert_eq!(strings(&pivot, "tipo"), vec!["a", "b"]);
        assert_eq!(floats(&pivot, "ok"), vec![Some(3.0), Some(2.0)]);
        assert_eq!(floats(&pivot, "tipo_2"), vec![Some(1.0), Some(0.0)]);
    }

    #[test]
    fn test_pivot_missing_column() {
        let err = pivot_table(&sales(), "regiao", "loja", "valor", Aggregate::Sum).unwrap_err();
        assert_eq!(err.error_code(), "COLUMN_NOT_FOUND");
    }

    #[test]
    fn test_pivot_text_values_need_count() {
        let err = pivot_table(&sales(), "regiao", "produto", "regiao", Aggregate::Mean).unwrap_err();
        assert_eq!(err.error_code(), "WRONG_COLUMN_TYPE");
    }

    // ========================================================================
    // group_comparison_table() tests
    // ========================================================================

    #[test]
    fn test_group_comparison() {
        let table = group_comparison_table(&sales(), "produto", &["valor", "qtd"]).unwrap();
        let names: Vec<String> = table
            .get_column_names()
            .into_iter()
            .map(|s| s.to_string())
            .collect();

        assert_eq!(
            names,
            vec!["produto", "valor_mean", "valor_sum", "valor_count", "qtd_mean", "qtd_sum", "qtd_count"]
        );
        assert_eq!(floats(&table, "valor_sum"), vec![Some(45.0), Some(12.0)]);
        assert_eq!(floats(&table, "valor_count"), vec![Some(3.0), Some(2.0)]);
        assert_eq!(floats(&table, "qtd_mean"), vec![Some(8.0 / 3.0), Some(13.0 / 3.0)]);
    }

    // ========================================================================
    // Sheet and filter tests
    // ========================================================================

    #[test]
    fn test_missing_table_sorted_and_filtered() {
        let df = df![
            "a" => [Some(1), None, None, Some(4)],
            "b" => [Some("x"), None, Some("y"), Some("z")],
            "c" => [1, 2, 3, 4],
        ]
        .unwrap();
        let table = missing_table(&df).unwrap();

        assert_eq!(strings(&table, "Column"), vec!["a", "b"]);
        assert_eq!(floats(&table, "Percentage"), vec![Some(50.0), Some(25.0)]);
        assert_eq!(strings(&table, "Data Type"), vec!["i32", "str"]);
    }

    #[test]
    fn test_statistics_table_mixes_numeric_and_text() {
        let table = statistics_table(&sales()).unwrap();

        assert_eq!(table.height(), 4);
        assert_eq!(table.column("top").unwrap().str().unwrap().get(0), Some("Sul"));
        assert_eq!(floats(&table, "freq")[0], Some(3.0));
        assert_eq!(floats(&table, "count")[2], Some(5.0));
        assert_eq!(floats(&table, "mean")[2], Some(11.4));
        assert_eq!(floats(&table, "mean")[0], None);
    }

    #[test]
    fn test_null_and_type_tables() {
        let nulls = null_table(&sales()).unwrap();
        assert_eq!(floats(&nulls, "Null Count"), vec![Some(0.0), Some(0.0), Some(1.0), Some(0.0)]);

        let types = type_table(&sales()).unwrap();
        assert_eq!(strings(&types, "Type"), vec!["str", "str", "f64", "i32"]);
    }

    #[test]
    fn test_filter_conjunction_ignores_unknown_columns() {
        let filters = vec![
            ("regiao", CellValue::from("Sul")),
            ("produto", CellValue::from("A")),
            ("loja", CellValue::from("Centro")),
        ];
        let filtered = filter_table(&sales(), &filters).unwrap();
        assert_eq!(floats(&filtered, "qtd"), vec![Some(1.0), Some(5.0)]);
    }

    #[test]
    fn test_filter_numeric_equality() {
        let filtered = filter_table(&sales(), &[("qtd", CellValue::Int(4))]).unwrap();
        assert_eq!(filtered.height(), 1);

        let none = filter_table(&sales(), &[("qtd", CellValue::from("4"))]).unwrap();
        assert_eq!(none.height(), 0);
    }
}
