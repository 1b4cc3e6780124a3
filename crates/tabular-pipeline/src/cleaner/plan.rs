//! Declarative cleaning plans.
//!
//! A plan is an ordered list of steps loaded from JSON:
//!
//! ```json
//! {
//!   "steps": [
//!     { "step": "remove_duplicates", "subset": ["email"] },
//!     { "step": "handle_missing", "strategy": "fill", "fill_value": "N/A" },
//!     { "step": "convert_types", "conversions": [{ "column": "idade", "to": "int" }] },
//!     { "step": "validate_email", "column": "email" }
//!   ]
//! }
//! ```
//!
//! Strategy and method names stay strings until the step runs, so one
//! misspelled name skips that step with a warning instead of rejecting the
//! whole plan.

use super::TableCleaner;
use crate::config::{
    KeepStrategy, MissingStrategy, NormalizeMethod, OutlierMethod, TargetType, TextOperation,
};
use crate::error::{Result, ResultExt};
use crate::types::CellValue;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;

/// One column conversion inside a `convert_types` step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnConversion {
    pub column: String,
    pub to: String,
}

fn default_keep() -> String {
    "first".to_string()
}

fn default_text_operation() -> String {
    "lower".to_string()
}

fn default_outlier_method() -> String {
    "iqr".to_string()
}

fn default_normalize_method() -> String {
    "minmax".to_string()
}

fn default_true() -> bool {
    true
}

/// A single cleaning operation with its arguments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum CleaningStep {
    RemoveDuplicates {
        #[serde(default)]
        subset: Option<Vec<String>>,
        #[serde(default = "default_keep")]
        keep: String,
    },
    HandleMissing {
        strategy: String,
        #[serde(default)]
        fill_value: Option<CellValue>,
        #[serde(default)]
        columns: Option<Vec<String>>,
    },
    StandardizeText {
        #[serde(default)]
        columns: Option<Vec<String>>,
        #[serde(default = "default_text_operation")]
        operation: String,
    },
    RemoveSpecialCharacters {
        columns: Vec<String>,
        #[serde(default = "default_true")]
        keep_spaces: bool,
    },
    ConvertTypes {
        conversions: Vec<ColumnConversion>,
    },
    RemoveOutliers {
        columns: Vec<String>,
        #[serde(default = "default_outlier_method")]
        method: String,
        /// Defaults to the method's conventional threshold.
        #[serde(default)]
        threshold: Option<f64>,
    },
    Normalize {
        column: String,
        #[serde(default = "default_normalize_method")]
        method: String,
    },
    ValidateEmail {
        column: String,
    },
    ValidatePhone {
        column: String,
        #[serde(default)]
        pattern: Option<String>,
    },
    ValidatePattern {
        column: String,
        pattern: String,
    },
    DropEmpty,
}

/// Ordered list of cleaning steps.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CleaningPlan {
    pub steps: Vec<CleaningStep>,
}

impl CleaningPlan {
    /// Parse a plan from JSON text.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a plan from a JSON file.
    pub fn from_path(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .context(format!("Reading cleaning plan {}", path.display()))?;
        Self::from_json(&text).context(format!("Parsing cleaning plan {}", path.display()))
    }

    /// Append a step.
    pub fn with_step(mut self, step: CleaningStep) -> Self {
        self.steps.push(step);
        self
    }
}

fn as_strs(columns: &[String]) -> Vec<&str> {
    columns.iter().map(String::as_str).collect()
}

impl TableCleaner {
    /// Parse an option name, narrating it when unsupported.
    fn parse_option<T: FromStr<Err = crate::error::TableError>>(&self, name: &str) -> Option<T> {
        match name.parse::<T>() {
            Ok(value) => Some(value),
            Err(e) => {
                self.warn(&e);
                None
            }
        }
    }

    /// Run one step. An unsupported name skips the step with a warning.
    pub fn apply_step(&mut self, step: &CleaningStep) -> Result<&DataFrame> {
        match step {
            CleaningStep::RemoveDuplicates { subset, keep } => {
                let Some(keep) = self.parse_option::<KeepStrategy>(keep) else {
                    return Ok(&self.current);
                };
                let subset = subset.as_deref().map(as_strs);
                self.remove_duplicates(subset.as_deref(), keep)
            }
            CleaningStep::HandleMissing {
                strategy,
                fill_value,
                columns,
            } => {
                let Some(strategy) = self.parse_option::<MissingStrategy>(strategy) else {
                    return Ok(&self.current);
                };
                let columns = columns.as_deref().map(as_strs);
                self.handle_missing(strategy, fill_value.as_ref(), columns.as_deref())
            }
            CleaningStep::StandardizeText { columns, operation } => {
                let Some(operation) = self.parse_option::<TextOperation>(operation) else {
                    return Ok(&self.current);
                };
                let columns = columns.as_deref().map(as_strs);
                self.standardize_text(columns.as_deref(), operation)
            }
            CleaningStep::RemoveSpecialCharacters {
                columns,
                keep_spaces,
            } => self.remove_special_characters(&as_strs(columns), *keep_spaces),
            CleaningStep::ConvertTypes { conversions } => {
                let parsed: Vec<(&str, TargetType)> = conversions
                    .iter()
                    .filter_map(|c| {
                        self.parse_option::<TargetType>(&c.to)
                            .map(|target| (c.column.as_str(), target))
                    })
                    .collect();
                self.convert_types(&parsed)
            }
            CleaningStep::RemoveOutliers {
                columns,
                method,
                threshold,
            } => {
                let Some(method) = self.parse_option::<OutlierMethod>(method) else {
                    return Ok(&self.current);
                };
                let threshold = threshold.unwrap_or_else(|| method.default_threshold());
                self.remove_outliers(&as_strs(columns), method, threshold)
            }
            CleaningStep::Normalize { column, method } => {
                let Some(method) = self.parse_option::<NormalizeMethod>(method) else {
                    return Ok(&self.current);
                };
                self.normalize(column, method)
            }
            CleaningStep::ValidateEmail { column } => Ok(self.validate_email(column)?.0),
            CleaningStep::ValidatePhone { column, pattern } => {
                Ok(self.validate_phone(column, pattern.as_deref())?.0)
            }
            CleaningStep::ValidatePattern { column, pattern } => {
                Ok(self.validate_pattern(column, pattern)?.0)
            }
            CleaningStep::DropEmpty => self.drop_empty(),
        }
    }

    /// Run every step of a plan in order.
    pub fn apply_plan(&mut self, plan: &CleaningPlan) -> Result<&DataFrame> {
        for (index, step) in plan.steps.iter().enumerate() {
            self.apply_step(step)
                .context(format!("Cleaning step {} failed", index + 1))?;
        }
        Ok(&self.current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::narration::CollectingNarrator;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    const PLAN: &str = r#"{
        "steps": [
            { "step": "remove_duplicates" },
            { "step": "handle_missing", "strategy": "fill", "fill_value": 0, "columns": ["idade"] },
            { "step": "standardize_text", "columns": ["cidade"], "operation": "upper" },
            { "step": "convert_types", "conversions": [{ "column": "idade", "to": "float" }] },
            { "step": "validate_email", "column": "email" },
            { "step": "drop_empty" }
        ]
    }"#;

    fn sample() -> DataFrame {
        df![
            "cidade" => ["recife", "recife", "natal"],
            "idade" => [Some(30), Some(30), None],
            "email" => ["a@b.com", "a@b.com", "sem-email"],
        ]
        .unwrap()
    }

    #[test]
    fn test_plan_deserialization() {
        let plan = CleaningPlan::from_json(PLAN).unwrap();

        assert_eq!(plan.steps.len(), 6);
        assert_eq!(
            plan.steps[0],
            CleaningStep::RemoveDuplicates {
                subset: None,
                keep: "first".to_string()
            }
        );
        assert_eq!(
            plan.steps[1],
            CleaningStep::HandleMissing {
                strategy: "fill".to_string(),
                fill_value: Some(CellValue::Int(0)),
                columns: Some(vec!["idade".to_string()]),
            }
        );
        assert_eq!(plan.steps[5], CleaningStep::DropEmpty);
    }

    #[test]
    fn test_apply_plan_runs_steps_in_order() {
        let plan = CleaningPlan::from_json(PLAN).unwrap();
        let mut cleaner = TableCleaner::with_narrator(sample(), Arc::new(CollectingNarrator::new()));
        let df = cleaner.apply_plan(&plan).unwrap();

        assert_eq!(df.height(), 1);
        assert_eq!(df.column("cidade").unwrap().str().unwrap().get(0), Some("RECIFE"));
        assert_eq!(df.column("idade").unwrap().dtype(), &DataType::Float64);
        assert_eq!(
            cleaner.operation_log(),
            &[
                "Duplicates removed: 1".to_string(),
                "Missing values filled with: 0".to_string(),
                "Text standardized: upper".to_string(),
                "Column 'idade' converted to float".to_string(),
                "Invalid emails removed: 1".to_string(),
                "Empty rows removed: 0, empty columns removed: 0".to_string(),
            ]
        );
    }

    #[test]
    fn test_unknown_names_skip_only_that_step() {
        let plan = CleaningPlan::default()
            .with_step(CleaningStep::HandleMissing {
                strategy: "interpolate".to_string(),
                fill_value: None,
                columns: None,
            })
            .with_step(CleaningStep::Normalize {
                column: "idade".to_string(),
                method: "robust".to_string(),
            })
            .with_step(CleaningStep::RemoveDuplicates {
                subset: None,
                keep: "first".to_string(),
            });

        let narrator = CollectingNarrator::new();
        let mut cleaner = TableCleaner::with_narrator(sample(), Arc::new(narrator.clone()));
        let df = cleaner.apply_plan(&plan).unwrap();

        assert_eq!(df.height(), 2);
        assert_eq!(narrator.warnings().len(), 2);
        assert!(narrator.warnings()[0].contains("interpolate"));
        assert_eq!(cleaner.operation_log().len(), 1);
    }

    #[test]
    fn test_outlier_step_uses_method_default_threshold() {
        let json = r#"{ "step": "remove_outliers", "columns": ["x"], "method": "zscore" }"#;
        let step: CleaningStep = serde_json::from_str(json).unwrap();
        assert_eq!(
            step,
            CleaningStep::RemoveOutliers {
                columns: vec!["x".to_string()],
                method: "zscore".to_string(),
                threshold: None,
            }
        );
    }

    #[test]
    fn test_plan_from_missing_path() {
        let err = CleaningPlan::from_path(Path::new("/nonexistent/plan.json")).unwrap_err();
        assert_eq!(err.error_code(), "IO_ERROR");
    }
}
