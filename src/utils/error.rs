//! Error handling for the bounds estimator.
//!
//! The fusion engine itself is total and never returns these; they surface
//! only from the fallible edges (configuration, calibration files and the
//! network/CSV collaborators), where callers convert them into fallbacks.

use thiserror::Error;

/// Main error type for the bounds estimator
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Data-related errors (e.g. missing or malformed market data)
    #[error("Data error: {0}")]
    DataError(String),

    /// Connection / network errors
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Forecast or sentiment model errors
    #[error("Model error: {0}")]
    ModelError(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// TOML deserialization errors
    #[error("TOML error: {0}")]
    TomlError(#[from] toml::de::Error),

    /// TOML serialization errors
    #[error("TOML serialization error: {0}")]
    TomlSerializeError(#[from] toml::ser::Error),

    /// Request errors
    #[error("Request error: {0}")]
    ReqwestError(#[from] reqwest::Error),

    /// CSV errors
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    /// Invalid argument errors
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Other errors
    #[error("Error: {0}")]
    Other(String),
}

/// Result type for the bounds estimator
pub type Result<T> = std::result::Result<T, Error>;

impl From<&str> for Error {
    fn from(err: &str) -> Self {
        Error::Other(err.to_string())
    }
}

impl From<String> for Error {
    fn from(err: String) -> Self {
        Error::Other(err)
    }
}

// Allow automatic conversion from anyhow::Error to our Error type
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Error::Other(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let config_error = Error::ConfigError("missing field".to_string());
        assert_eq!(config_error.to_string(), "Configuration error: missing field");

        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let wrapped_io_error = Error::from(io_error);
        assert!(wrapped_io_error.to_string().contains("I/O error"));

        let model_error = Error::ModelError("no weights".to_string());
        assert_eq!(model_error.to_string(), "Model error: no weights");

        let str_error = Error::from("custom error");
        assert_eq!(str_error.to_string(), "Error: custom error");

        let string_error = Error::from(String::from("owned error"));
        assert_eq!(string_error.to_string(), "Error: owned error");
    }

    #[test]
    fn test_toml_error_conversion() {
        let parsed: std::result::Result<toml::Value, _> = toml::from_str("not = [valid");
        let err = Error::from(parsed.unwrap_err());
        assert!(err.to_string().starts_with("TOML error"));
    }
}
