//! Error types for the fraud monitor library.
//!
//! Binaries wrap these in `anyhow`; library code returns them directly.

use thiserror::Error;

/// Why a remote scoring call produced no usable batch
#[derive(Debug, Error)]
pub enum PredictionError {
    #[error("Invalid prediction endpoint '{url}': {reason}")]
    InvalidEndpoint { url: String, reason: String },

    #[error("Prediction request timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("Prediction request failed: {0}")]
    Network(#[source] reqwest::Error),

    #[error("Prediction endpoint returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Failed to decode prediction response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Import data could not be turned into transactions
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    #[error("Failed to read import file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Expected a JSON array of records, found {0}")]
    NotAnArray(&'static str),

    #[error("CSV parse error at line {line}: {reason}")]
    Csv { line: usize, reason: String },

    #[error("Import contained no records")]
    Empty,
}

/// A rule draft was rejected
#[derive(Debug, Error, PartialEq)]
pub enum RuleError {
    #[error("Rule name must be at least 2 characters")]
    NameTooShort,

    #[error("Rule description must be at least 5 characters")]
    DescriptionTooShort,

    #[error("Rule type {kind} expects {expected}, got '{value}'")]
    InvalidValue {
        kind: String,
        expected: &'static str,
        value: String,
    },

    #[error("Rule not found: {0}")]
    NotFound(String),
}

/// Endpoint settings could not be read, validated or persisted
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Invalid endpoint URL '{0}': must start with http:// or https://")]
    InvalidUrl(String),

    #[error("Settings I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Settings file is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}
