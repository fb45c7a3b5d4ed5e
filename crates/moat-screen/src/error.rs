//! Error types for screening operations

use thiserror::Error;

/// Screening specific errors
#[derive(Debug, Error)]
pub enum ScreenError {
    /// Provider answered with a non-success status
    #[error("{provider} returned HTTP {status} for {symbol}")]
    HttpStatus {
        provider: String,
        symbol: String,
        status: u16,
    },

    /// Provider answered but the payload carried no usable record
    #[error("Data not available for {symbol}: {reason}")]
    DataUnavailable {
        symbol: String,
        reason: String,
    },

    /// Network or HTTP error
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Yahoo Finance connector error
    #[error("Yahoo Finance error: {0}")]
    YahooFinanceError(String),

    /// CSV serialization error
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    /// File system error while reading lists or writing exports
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl ScreenError {
    pub(crate) fn unavailable(symbol: &str, reason: impl Into<String>) -> Self {
        Self::DataUnavailable {
            symbol: symbol.to_string(),
            reason: reason.into(),
        }
    }
}

/// Result type alias for screening operations
pub type Result<T> = std::result::Result<T, ScreenError>;
