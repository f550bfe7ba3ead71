//! Error types for saju
//!
//! This module provides structured error handling using thiserror.
//! Validation errors abort a submission before any computation happens;
//! network errors abort a remote round-trip; missing content only surfaces
//! when a caller explicitly requires the content table.

use thiserror::Error;

/// Result type alias for saju operations
pub type Result<T> = std::result::Result<T, SajuError>;

/// Errors that can occur while computing a reading
#[derive(Error, Debug)]
pub enum SajuError {
    /// A required form field was empty
    #[error("Missing field: {field}")]
    MissingField { field: &'static str },

    /// A numeric field did not parse as an integer
    #[error("Invalid number for {field}: '{value}'")]
    InvalidNumber { field: &'static str, value: String },

    /// Hour outside 0-23
    #[error("Hour must be between 0 and 23, got {hour}")]
    HourOutOfRange { hour: i64 },

    /// Hour text that is neither a clock value nor a traditional block name
    #[error("Unknown hour name: '{name}'")]
    UnknownHourName { name: String },

    /// The (year, month, day) triple is not a real Gregorian date
    #[error("Invalid date: {year:04}-{month:02}-{day:02}")]
    InvalidDate { year: i32, month: u32, day: u32 },

    /// Year outside the supported range
    #[error("Year {year} is outside the supported range {min}..={max}")]
    YearOutOfRange { year: i32, min: i32, max: i32 },

    /// Gender value that is not recognised
    #[error("Invalid gender: '{value}'")]
    InvalidGender { value: String },

    /// Narrative content table is not loaded
    #[error("Content table not available: {state}")]
    MissingContent { state: String },

    /// Backend round-trip failed or returned malformed data
    #[error("Network error: {message}")]
    Network { message: String },

    /// Invalid configuration
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// IO error during file operations
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<SajuError>,
    },
}

impl SajuError {
    /// Wrap an error with additional context
    pub fn with_context(self, context: impl Into<String>) -> Self {
        SajuError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Create an invalid config error
    pub fn invalid_config(message: impl Into<String>) -> Self {
        SajuError::InvalidConfig {
            message: message.into(),
        }
    }

    /// Create a network error
    pub fn network(message: impl Into<String>) -> Self {
        SajuError::Network {
            message: message.into(),
        }
    }

    /// True for the input-validation family (form errors the user must fix)
    pub fn is_validation(&self) -> bool {
        match self {
            SajuError::MissingField { .. }
            | SajuError::InvalidNumber { .. }
            | SajuError::HourOutOfRange { .. }
            | SajuError::UnknownHourName { .. }
            | SajuError::InvalidDate { .. }
            | SajuError::YearOutOfRange { .. }
            | SajuError::InvalidGender { .. } => true,
            SajuError::WithContext { source, .. } => source.is_validation(),
            _ => false,
        }
    }
}

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, ctx: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, ctx: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(ctx))
    }
}
