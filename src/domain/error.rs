use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AppError {
    /// A required upload field is absent or empty.
    MissingInput(String),
    /// Uploads were supplied but none of them was usable.
    NoValidInput(String),
    /// Uploaded content could not be read as CSV / multipart.
    ParseError(String),
    PayloadTooLarge(String),
    SpreadsheetError(String),
    ConfigError(String),
    Internal(String),
    IoError(String),
}

impl AppError {
    /// Whether the failure was caused by the caller's input.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            AppError::MissingInput(_)
                | AppError::NoValidInput(_)
                | AppError::ParseError(_)
                | AppError::PayloadTooLarge(_)
        )
    }

    /// The message without its category prefix.
    pub fn message(&self) -> &str {
        match self {
            AppError::MissingInput(msg)
            | AppError::NoValidInput(msg)
            | AppError::ParseError(msg)
            | AppError::PayloadTooLarge(msg)
            | AppError::SpreadsheetError(msg)
            | AppError::ConfigError(msg)
            | AppError::Internal(msg)
            | AppError::IoError(msg) => msg,
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::MissingInput(msg) => write!(f, "Missing input: {}", msg),
            AppError::NoValidInput(msg) => write!(f, "No valid input: {}", msg),
            AppError::ParseError(msg) => write!(f, "Parse error: {}", msg),
            AppError::PayloadTooLarge(msg) => write!(f, "Payload too large: {}", msg),
            AppError::SpreadsheetError(msg) => write!(f, "Spreadsheet error: {}", msg),
            AppError::ConfigError(msg) => write!(f, "Config error: {}", msg),
            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
            AppError::IoError(msg) => write!(f, "IO error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::IoError(err.to_string())
    }
}

impl From<rust_xlsxwriter::XlsxError> for AppError {
    fn from(err: rust_xlsxwriter::XlsxError) -> Self {
        AppError::SpreadsheetError(err.to_string())
    }
}

impl From<figment::Error> for AppError {
    fn from(err: figment::Error) -> Self {
        AppError::ConfigError(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
