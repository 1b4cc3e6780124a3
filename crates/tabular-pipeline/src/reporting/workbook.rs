//! Spreadsheet output.
//!
//! Tables are written one per worksheet with a bold header row and no index
//! column. Numbers and booleans keep their cell types; everything else is
//! written as text. Non-finite floats are written as text because Excel has
//! no representation for them.

use crate::error::{Result, ResultExt, TableError};
use crate::utils::{is_numeric_dtype, numeric_values, text_values};
use polars::prelude::*;
use rust_xlsxwriter::{Format, Workbook, Worksheet};
use std::collections::HashSet;
use std::path::Path;

/// Maximum length of a worksheet name.
pub const MAX_SHEET_NAME_LEN: usize = 31;
/// Maximum rows per worksheet, header included.
pub const MAX_ROWS: usize = 1_048_576;
/// Maximum columns per worksheet.
pub const MAX_COLUMNS: usize = 16_384;

const ILLEGAL_SHEET_CHARS: [char; 7] = ['[', ']', ':', '*', '?', '/', '\\'];

/// Make a worksheet name legal: illegal characters become `_`, the name is
/// truncated to 31 characters and an empty name becomes `Sheet`.
pub fn sheet_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| if ILLEGAL_SHEET_CHARS.contains(&c) { '_' } else { c })
        .take(MAX_SHEET_NAME_LEN)
        .collect();
    let cleaned = cleaned.trim_matches('\'').to_string();

    if cleaned.is_empty() {
        "Sheet".to_string()
    } else {
        cleaned
    }
}

/// Legal sheet name not yet taken in this workbook (names compare
/// case-insensitively).
fn unique_sheet_name(name: &str, taken: &mut HashSet<String>) -> String {
    let base = sheet_name(name);
    let mut candidate = base.clone();
    let mut n = 2;

    while taken.contains(&candidate.to_lowercase()) {
        let suffix = format!("_{n}");
        let keep = MAX_SHEET_NAME_LEN - suffix.len();
        candidate = format!("{}{suffix}", base.chars().take(keep).collect::<String>());
        n += 1;
    }

    taken.insert(candidate.to_lowercase());
    candidate
}

/// Create the parent directory of `path` if needed.
pub(crate) fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .context(format!("Creating directory {}", parent.display()))?;
    }
    Ok(())
}

fn to_row(index: usize) -> Result<u32> {
    u32::try_from(index).map_err(|_| TableError::RenderFailed(format!("row {index} out of range")))
}

fn to_col(index: usize) -> Result<u16> {
    u16::try_from(index)
        .map_err(|_| TableError::RenderFailed(format!("column {index} out of range")))
}

/// Write a table into a worksheet starting at the top-left cell.
pub fn write_frame(worksheet: &mut Worksheet, df: &DataFrame, header: &Format) -> Result<()> {
    if df.height() + 1 > MAX_ROWS {
        return Err(TableError::RenderFailed(format!(
            "{} rows exceed the worksheet limit of {}",
            df.height(),
            MAX_ROWS - 1
        )));
    }
    if df.width() > MAX_COLUMNS {
        return Err(TableError::RenderFailed(format!(
            "{} columns exceed the worksheet limit of {MAX_COLUMNS}",
            df.width()
        )));
    }

    for (c, column) in df.get_columns().iter().enumerate() {
        let col = to_col(c)?;
        worksheet.write_string_with_format(0, col, column.name().as_str(), header)?;

        let series = column.as_materialized_series();
        let dtype = series.dtype();

        if is_numeric_dtype(dtype) {
            for (r, value) in numeric_values(series)?.into_iter().enumerate() {
                match value {
                    Some(v) if v.is_finite() => {
                        worksheet.write_number(to_row(r + 1)?, col, v)?;
                    }
                    Some(v) => {
                        worksheet.write_string(to_row(r + 1)?, col, v.to_string())?;
                    }
                    None => {}
                }
            }
        } else if matches!(dtype, DataType::Boolean) {
            for (r, value) in series.bool()?.into_iter().enumerate() {
                if let Some(b) = value {
                    worksheet.write_boolean(to_row(r + 1)?, col, b)?;
                }
            }
        } else {
            for (r, value) in text_values(series)?.into_iter().enumerate() {
                if let Some(text) = value {
                    worksheet.write_string(to_row(r + 1)?, col, text)?;
                }
            }
        }
    }

    Ok(())
}

/// Write named tables to a new workbook at `path`, one sheet each, creating
/// parent directories as needed.
pub fn write_workbook(path: &Path, sheets: &[(&str, &DataFrame)]) -> Result<()> {
    ensure_parent(path)?;

    let mut workbook = Workbook::new();
    let header = Format::new().set_bold();
    let mut taken = HashSet::new();

    for (name, df) in sheets {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(unique_sheet_name(name, &mut taken))?;
        write_frame(worksheet, df, &header)?;
    }

    workbook
        .save(path)
        .map_err(|e| TableError::from(e).with_context(format!("Saving workbook {}", path.display())))
}
