//! Regex validation of contact columns.
//!
//! The built-in patterns are fixed business rules rather than full RFC
//! validation: an email needs a dotted domain with a TLD of two or more
//! letters, a phone needs the Brazilian `(DD) DDDDD-DDDD` shape.

use super::TableCleaner;
use crate::error::{Result, TableError};
use crate::utils::{filter_rows, text_values};
use once_cell::sync::Lazy;
use polars::prelude::*;
use regex::Regex;

/// Default email pattern.
pub const EMAIL_PATTERN: &str = r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$";

/// Default phone pattern: `(DD) DDDDD-DDDD` or `(DD) DDDD-DDDD`, space and
/// hyphen optional.
pub const PHONE_PATTERN: &str = r"^\(\d{2}\)\s?\d{4,5}-?\d{4}$";

static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(EMAIL_PATTERN).expect("Invalid regex: email"));
static PHONE_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(PHONE_PATTERN).expect("Invalid regex: phone"));

impl TableCleaner {
    /// Keep only rows with a well-formed email in `column`.
    ///
    /// Returns the filtered table and how many rows were removed.
    pub fn validate_email(&mut self, column: &str) -> Result<(&DataFrame, usize)> {
        self.retain_matching(column, &EMAIL_REGEX, "Invalid emails removed", "email")
    }

    /// Keep only rows with a well-formed phone number in `column`, using
    /// `pattern` instead of [`PHONE_PATTERN`] when given.
    pub fn validate_phone(
        &mut self,
        column: &str,
        pattern: Option<&str>,
    ) -> Result<(&DataFrame, usize)> {
        match pattern {
            None => self.retain_matching(column, &PHONE_REGEX, "Invalid phones removed", "phone"),
            Some(p) => match compile(p) {
                Ok(regex) => self.retain_matching(column, &regex, "Invalid phones removed", "phone"),
                Err(e) => {
                    self.warn(&e);
                    Ok((&self.current, 0))
                }
            },
        }
    }

    /// Keep only rows whose value in `column` matches a caller-supplied regex.
    ///
    /// An invalid pattern is narrated and leaves the table unchanged.
    pub fn validate_pattern(&mut self, column: &str, pattern: &str) -> Result<(&DataFrame, usize)> {
        match compile(pattern) {
            Ok(regex) => self.retain_matching(
                column,
                &regex,
                "Rows not matching pattern removed",
                "non-matching",
            ),
            Err(e) => {
                self.warn(&e);
                Ok((&self.current, 0))
            }
        }
    }

    fn retain_matching(
        &mut self,
        column: &str,
        regex: &Regex,
        log_label: &str,
        noun: &str,
    ) -> Result<(&DataFrame, usize)> {
        let Ok(existing) = self.current.column(column) else {
            self.warn(&TableError::ColumnNotFound(column.to_string()));
            return Ok((&self.current, 0));
        };

        let keep: Vec<bool> = text_values(existing.as_materialized_series())?
            .iter()
            .map(|v| v.as_deref().is_some_and(|s| regex.is_match(s)))
            .collect();
        let invalid = keep.iter().filter(|k| !**k).count();

        self.current = filter_rows(&self.current, &keep)?;
        self.record(
            format!("{log_label}: {invalid}"),
            format!("{invalid} invalid {noun} row(s) removed"),
        );
        Ok((&self.current, invalid))
    }
}

fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|e| TableError::InvalidPattern {
        pattern: pattern.to_string(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::narration::CollectingNarrator;
    use std::sync::Arc;

    fn cleaner(df: DataFrame) -> (TableCleaner, CollectingNarrator) {
        let narrator = CollectingNarrator::new();
        (
            TableCleaner::with_narrator(df, Arc::new(narrator.clone())),
            narrator,
        )
    }

    #[test]
    fn test_validate_email() {
        let df = df![
            "id" => [1, 2, 3],
            "email" => ["a@b.com", "bad@", "c@d.co"],
        ]
        .unwrap();
        let (mut cleaner, _) = cleaner(df);
        let (df, invalid) = cleaner.validate_email("email").unwrap();

        assert_eq!(invalid, 1);
        let ids: Vec<_> = df.column("id").unwrap().i32().unwrap().into_iter().collect();
        assert_eq!(ids, vec![Some(1), Some(3)]);
        assert_eq!(cleaner.operation_log(), &["Invalid emails removed: 1".to_string()]);
    }

    #[test]
    fn test_validate_email_removes_nulls_and_short_tld() {
        let df = df!["email" => [Some("x@y.c"), None, Some("ok@site.com.br")]].unwrap();
        let (mut cleaner, _) = cleaner(df);
        let (df, invalid) = cleaner.validate_email("email").unwrap();

        assert_eq!(invalid, 2);
        assert_eq!(df.height(), 1);
    }

    #[test]
    fn test_validate_phone_default_pattern() {
        let df = df![
            "telefone" => ["(81) 99999-1234", "(81)3333-1234", "81 99999-1234", "(81) 9999912345"]
        ]
        .unwrap();
        let (mut cleaner, _) = cleaner(df);
        let (df, invalid) = cleaner.validate_phone("telefone", None).unwrap();

        assert_eq!(df.height(), 2);
        assert_eq!(invalid, 2);
    }

    #[test]
    fn test_validate_phone_custom_pattern() {
        let df = df!["telefone" => ["+55 81 99999-1234", "(81) 99999-1234"]].unwrap();
        let (mut cleaner, _) = cleaner(df);
        let (df, invalid) = cleaner
            .validate_phone("telefone", Some(r"^\+55 \d{2} \d{5}-\d{4}$"))
            .unwrap();

        assert_eq!(invalid, 1);
        assert_eq!(df.column("telefone").unwrap().str().unwrap().get(0), Some("+55 81 99999-1234"));
    }

    #[test]
    fn test_validate_pattern_invalid_regex_is_noop() {
        let df = df!["codigo" => ["A1"]].unwrap();
        let (mut cleaner, narrator) = cleaner(df);
        let (df, invalid) = cleaner.validate_pattern("codigo", "([").unwrap();

        assert_eq!((df.height(), invalid), (1, 0));
        assert!(cleaner.operation_log().is_empty());
        assert_eq!(narrator.warnings().len(), 1);
    }

    #[test]
    fn test_validate_missing_column() {
        let df = df!["nome" => ["Ana"]].unwrap();
        let (mut cleaner, narrator) = cleaner(df);
        let (df, invalid) = cleaner.validate_email("email").unwrap();

        assert_eq!((df.height(), invalid), (1, 0));
        assert_eq!(narrator.warnings().len(), 1);
    }
}
