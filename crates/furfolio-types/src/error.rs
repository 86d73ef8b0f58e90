//! Error types for furfolio

use thiserror::Error;

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration directory not found")]
    NotFound,

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Invalid configuration value: {0}")]
    Invalid(String),
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("CSV loader error: {0}")]
    CsvLoader(String),

    #[error("Data directory not found: {0}")]
    DataDirNotFound(String),

    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("Excel export error: {0}")]
    Excel(String),

    #[error("Analytics failed: {0}")]
    Analytics(String),
}

pub type Result<T> = std::result::Result<T, Error>;
