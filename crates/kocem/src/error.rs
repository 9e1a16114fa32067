//! Error types for kocem.
//!
//! This module defines all error types used throughout the kocem crate,
//! providing detailed context for debugging and user-friendly error messages.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for kocem operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Workbook Errors ===
    /// Failed to open or read a spreadsheet.
    #[error("failed to read workbook {path}: {message}")]
    Workbook {
        /// Path to the workbook.
        path: PathBuf,
        /// Description of what went wrong.
        message: String,
    },

    /// The requested sheet does not exist in the workbook.
    #[error("sheet '{sheet}' not found in {path}")]
    SheetNotFound {
        /// Path to the workbook.
        path: PathBuf,
        /// The sheet that was requested.
        sheet: String,
    },

    /// A required column is missing from a table.
    #[error("column '{column}' not found (available: {available})")]
    ColumnNotFound {
        /// The missing column.
        column: String,
        /// Comma-separated list of the columns that do exist.
        available: String,
    },

    /// Writing an Excel workbook failed.
    #[error("failed to write workbook: {0}")]
    XlsxWrite(#[from] rust_xlsxwriter::XlsxError),

    // === Format Errors ===
    /// The file extension has no reader or writer.
    #[error("unsupported file format '{extension}' for {operation}")]
    UnsupportedFormat {
        /// The offending extension (without the dot).
        extension: String,
        /// Either "reading" or "writing".
        operation: &'static str,
    },

    /// Delimited text could not be read or written.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // === Storage Errors ===
    /// Failed to open or create the database.
    #[error("failed to open database at {path}: {source}")]
    DatabaseOpen {
        /// Path to the database file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: rusqlite::Error,
    },

    /// A database query failed.
    #[error("database query failed: {0}")]
    Database(#[from] rusqlite::Error),

    /// Failed to run database migrations.
    #[error("database migration failed: {message}")]
    DatabaseMigration {
        /// Description of what went wrong.
        message: String,
    },

    // === Quiz Errors ===
    /// No template with the requested key exists.
    #[error("quiz template '{key}' not found")]
    TemplateNotFound {
        /// The template key that was looked up.
        key: String,
    },

    /// Not enough distinct wrong answers to build the options.
    #[error("need {needed} distractors for '{answer}' but only {available} candidates exist")]
    InsufficientDistractors {
        /// The correct answer the quiz was built for.
        answer: String,
        /// Number of distractors requested.
        needed: usize,
        /// Number of distinct candidates available.
        available: usize,
    },

    /// A base64 figure could not be decoded.
    #[error("failed to decode figure {name}: {source}")]
    ImageDecode {
        /// Name of the figure being decoded.
        name: String,
        /// The underlying error.
        #[source]
        source: base64::DecodeError,
    },

    // === Dataset Errors ===
    /// No input produced any rows.
    #[error("no readable files matching '{prefix}' in {dir}")]
    EmptyDataset {
        /// Directory that was scanned.
        dir: PathBuf,
        /// File name prefix that was matched.
        prefix: String,
    },

    /// An evaluation results log could not be parsed.
    #[error("results parse error on line {line}: {message}")]
    ResultsParse {
        /// 1-based line number.
        line: usize,
        /// Description of what went wrong.
        message: String,
    },

    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    /// A `SQLite` file exists but holds no kocem datasets.
    #[error("{path} is not a kocem dataset file")]
    NotADatasetFile {
        /// Path to the database file.
        path: PathBuf,
    },

    // === I/O Errors ===
    /// An input file does not exist.
    #[error("input file {path} not found")]
    InputNotFound {
        /// The missing path.
        path: PathBuf,
    },

    /// File system operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to create a required directory.
    #[error("failed to create directory {path}: {source}")]
    DirectoryCreate {
        /// Path that couldn't be created.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    // === Generic Errors ===
    /// An internal error occurred (bug).
    #[error("internal error: {0}")]
    Internal(String),
}

/// A specialized Result type for kocem operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create a new internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Create a workbook error for the given path.
    #[must_use]
    pub fn workbook(path: impl Into<PathBuf>, message: impl ToString) -> Self {
        Self::Workbook {
            path: path.into(),
            message: message.to_string(),
        }
    }

    /// Create a column-not-found error listing the available columns.
    #[must_use]
    pub fn column_not_found(column: impl Into<String>, available: &[String]) -> Self {
        Self::ColumnNotFound {
            column: column.into(),
            available: available.join(", "),
        }
    }

    /// Create an unsupported-format error.
    #[must_use]
    pub fn unsupported_format(extension: impl Into<String>, operation: &'static str) -> Self {
        Self::UnsupportedFormat {
            extension: extension.into(),
            operation,
        }
    }

    /// Create a results parse error.
    #[must_use]
    pub fn results_parse(line: usize, message: impl Into<String>) -> Self {
        Self::ResultsParse {
            line,
            message: message.into(),
        }
    }

    /// Check if this error is caused by missing input data rather than a failure.
    #[must_use]
    pub fn is_missing_input(&self) -> bool {
        matches!(
            self,
            Self::SheetNotFound { .. }
                | Self::ColumnNotFound { .. }
                | Self::EmptyDataset { .. }
                | Self::InputNotFound { .. }
        )
    }
}
