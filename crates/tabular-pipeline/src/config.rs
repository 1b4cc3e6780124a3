//! Configuration types for cleaning operations and report rendering.
//!
//! Operation options are plain enums that deserialize from the lowercase names
//! used in cleaning plans (`"iqr"`, `"forward"`, ...). Parsing an unknown name
//! yields [`TableError::Unsupported`], which callers degrade to a no-op.
//!
//! Report output settings live in [`ReportConfig`], built with the builder
//! pattern.

use crate::error::TableError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Implements `FromStr` (case-insensitive, with aliases) and `Display` for an
/// option enum.
macro_rules! option_names {
    ($ty:ident, $kind:literal, { $($variant:ident => $name:literal $(| $alias:literal)*),+ $(,)? }) => {
        impl $ty {
            /// Canonical lowercase name.
            pub fn name(&self) -> &'static str {
                match self {
                    $(Self::$variant => $name),+
                }
            }
        }

        impl FromStr for $ty {
            type Err = TableError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_ascii_lowercase().as_str() {
                    $($name $(| $alias)* => Ok(Self::$variant),)+
                    _ => Err(TableError::unsupported($kind, s)),
                }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.name())
            }
        }
    };
}

/// Which row of a duplicate group survives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum KeepStrategy {
    /// Keep the first occurrence
    #[default]
    First,
    /// Keep the last occurrence
    Last,
}

option_names!(KeepStrategy, "keep strategy", {
    First => "first",
    Last => "last",
});

/// Strategy for handling null cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissingStrategy {
    /// Remove rows containing a null in the selected columns
    Drop,
    /// Replace nulls with a caller-supplied constant
    Fill,
    /// Propagate the previous non-null value
    Forward,
    /// Propagate the next non-null value
    Backward,
    /// Fill numeric columns with their mean
    Mean,
    /// Fill numeric columns with their median
    Median,
}

option_names!(MissingStrategy, "missing-value strategy", {
    Drop => "drop",
    Fill => "fill",
    Forward => "forward" | "ffill" | "forward_fill",
    Backward => "backward" | "bfill" | "backward_fill",
    Mean => "mean",
    Median => "median",
});

/// Case or whitespace transform applied by text standardization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TextOperation {
    #[default]
    Lower,
    Upper,
    Title,
    Strip,
}

option_names!(TextOperation, "text operation", {
    Lower => "lower",
    Upper => "upper",
    Title => "title",
    Strip => "strip",
});

/// Target type for column conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetType {
    /// Integer; non-coercible values become 0, fractions are truncated
    Int,
    /// Float; non-coercible values become null
    Float,
    /// Datetime; non-coercible values become null
    Datetime,
    /// Plain stringification
    #[serde(alias = "str")]
    String,
}

option_names!(TargetType, "target type", {
    Int => "int" | "integer",
    Float => "float",
    Datetime => "datetime",
    String => "string" | "str",
});

/// Outlier detection method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutlierMethod {
    /// Interquartile range bounds
    #[default]
    Iqr,
    /// Distance from the mean in standard deviations
    Zscore,
}

option_names!(OutlierMethod, "outlier method", {
    Iqr => "iqr",
    Zscore => "zscore" | "z-score",
});

impl OutlierMethod {
    /// Conventional threshold for the method (1.5 IQRs, 3 standard deviations).
    pub fn default_threshold(&self) -> f64 {
        match self {
            Self::Iqr => 1.5,
            Self::Zscore => 3.0,
        }
    }
}

/// Rescaling method for a single column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum NormalizeMethod {
    /// `(x - min) / (max - min)`
    #[default]
    Minmax,
    /// `(x - mean) / std`
    Zscore,
}

option_names!(NormalizeMethod, "normalization method", {
    Minmax => "minmax" | "min-max",
    Zscore => "zscore" | "z-score",
});

/// Aggregate applied to pivot cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Aggregate {
    #[default]
    Sum,
    Mean,
    Count,
    Min,
    Max,
}

option_names!(Aggregate, "aggregate", {
    Sum => "sum",
    Mean => "mean",
    Count => "count",
    Min => "min",
    Max => "max",
});

/// Output settings for [`ReportEmitter`](crate::reporting::ReportEmitter).
///
/// # Example
///
/// ```rust,ignore
/// use tabular_pipeline::config::ReportConfig;
///
/// let config = ReportConfig::builder()
///     .output_dir("reports")
///     .separator(b';')
///     .csv_bom(false)
///     .build()?;
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Directory used for default output paths.
    /// Default: "output"
    pub output_dir: PathBuf,

    /// Whether delimited files start with a UTF-8 byte-order mark.
    /// Default: true
    pub csv_bom: bool,

    /// Default cell separator for delimited output (ASCII).
    /// Default: b','
    pub separator: u8,

    /// Number of text columns described in the summary report.
    /// Default: 5
    pub categorical_summary_limit: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("output"),
            csv_bom: true,
            separator: b',',
            categorical_summary_limit: 5,
        }
    }
}

impl ReportConfig {
    /// Create a new configuration builder.
    pub fn builder() -> ReportConfigBuilder {
        ReportConfigBuilder::default()
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if !self.separator.is_ascii() || matches!(self.separator, b'"' | b'\n' | b'\r') {
            return Err(ConfigValidationError::InvalidSeparator(self.separator));
        }

        if self.categorical_summary_limit == 0 {
            return Err(ConfigValidationError::InvalidSummaryLimit(
                self.categorical_summary_limit,
            ));
        }

        Ok(())
    }
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Invalid separator byte {0:#04x} (must be ASCII and not a quote or newline)")]
    InvalidSeparator(u8),

    #[error("Invalid categorical summary limit: {0} (must be at least 1)")]
    InvalidSummaryLimit(usize),
}

impl From<ConfigValidationError> for TableError {
    fn from(e: ConfigValidationError) -> Self {
        TableError::InvalidConfig(e.to_string())
    }
}

/// Builder for [`ReportConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct ReportConfigBuilder {
    output_dir: Option<PathBuf>,
    csv_bom: Option<bool>,
    separator: Option<u8>,
    categorical_summary_limit: Option<usize>,
}

impl ReportConfigBuilder {
    /// Set the directory used for default output paths.
    pub fn output_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(path.into());
        self
    }

    /// Enable or disable the byte-order mark on delimited output.
    pub fn csv_bom(mut self, bom: bool) -> Self {
        self.csv_bom = Some(bom);
        self
    }

    /// Set the default separator for delimited output.
    pub fn separator(mut self, separator: u8) -> Self {
        self.separator = Some(separator);
        self
    }

    /// Set how many text columns the summary describes.
    pub fn categorical_summary_limit(mut self, limit: usize) -> Self {
        self.categorical_summary_limit = Some(limit);
        self
    }

    /// Build the configuration.
    pub fn build(self) -> Result<ReportConfig, ConfigValidationError> {
        let config = ReportConfig {
            output_dir: self.output_dir.unwrap_or_else(|| PathBuf::from("output")),
            csv_bom: self.csv_bom.unwrap_or(true),
            separator: self.separator.unwrap_or(b','),
            categorical_summary_limit: self.categorical_summary_limit.unwrap_or(5),
        };

        config.validate()?;
        Ok(config)
    }
}
