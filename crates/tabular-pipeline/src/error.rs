//! Custom error types for the cleaning and reporting core.
//!
//! Cleaning operations rarely surface these to callers: a missing column or an
//! unknown strategy name degrades to a warning and a no-op. The variants exist
//! so those degradations, per-column conversion failures and rendering I/O
//! failures can all be described, logged and serialized the same way.
//!
//! Errors are serializable so a web view can forward them as `{code, message}`.

use serde::Serialize;
use serde::ser::SerializeStruct;
use thiserror::Error;

/// The main error type for table cleaning and report rendering.
#[derive(Error, Debug)]
pub enum TableError {
    /// Column was not found in the table.
    #[error("Column '{0}' not found in table")]
    ColumnNotFound(String),

    /// A strategy, method or operation name is not recognized.
    #[error("Unsupported {kind}: '{name}'")]
    Unsupported { kind: &'static str, name: String },

    /// The column exists but has a type the operation cannot work with.
    #[error("Column '{column}' has type {dtype}, expected {expected}")]
    WrongColumnType {
        column: String,
        dtype: String,
        expected: &'static str,
    },

    /// Type conversion failed.
    #[error("Failed to convert column '{column}' to {target_type}: {reason}")]
    TypeConversionFailed {
        column: String,
        target_type: String,
        reason: String,
    },

    /// A validation pattern could not be compiled.
    #[error("Invalid pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    /// Invalid configuration provided.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Report rendering failed.
    #[error("Failed to render report: {0}")]
    RenderFailed(String),

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Polars error wrapper.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// Workbook writer error wrapper.
    #[error("Workbook error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with context.
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<TableError>,
    },
}

impl TableError {
    /// Shorthand for an [`TableError::Unsupported`] value.
    pub fn unsupported(kind: &'static str, name: impl Into<String>) -> Self {
        TableError::Unsupported {
            kind,
            name: name.into(),
        }
    }

    /// Add context to an error.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        TableError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Get error code for caller-side handling.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::ColumnNotFound(_) => "COLUMN_NOT_FOUND",
            Self::Unsupported { .. } => "UNSUPPORTED",
            Self::WrongColumnType { .. } => "WRONG_COLUMN_TYPE",
            Self::TypeConversionFailed { .. } => "TYPE_CONVERSION_FAILED",
            Self::InvalidPattern { .. } => "INVALID_PATTERN",
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::RenderFailed(_) => "RENDER_FAILED",
            Self::Io(_) => "IO_ERROR",
            Self::Polars(_) => "POLARS_ERROR",
            Self::Xlsx(_) => "XLSX_ERROR",
            Self::Json(_) => "JSON_ERROR",
            Self::WithContext { source, .. } => source.error_code(),
        }
    }

    /// Check if this error only degrades a single call to a no-op.
    ///
    /// Recoverable errors never abort a cleaning session: the table is left
    /// as it was and the next operation runs normally.
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::ColumnNotFound(_)
            | Self::Unsupported { .. }
            | Self::WrongColumnType { .. }
            | Self::TypeConversionFailed { .. }
            | Self::InvalidPattern { .. } => true,
            Self::WithContext { source, .. } => source.is_recoverable(),
            _ => false,
        }
    }
}

impl Serialize for TableError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("TableError", 2)?;
        state.serialize_field("code", &self.error_code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

/// Result type alias for cleaning and reporting operations.
pub type Result<T> = std::result::Result<T, TableError>;

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, polars::error::PolarsError> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| TableError::Polars(e).with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, std::io::Error> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| TableError::Io(e).with_context(context))
    }
}
