// src/error.rs
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),
    #[error("Date error: {0}")]
    Date(#[from] DateKeyError),
    #[error("Invalid entry: {0}")]
    Validation(#[from] ValidationError),
    #[error("Image error: {0}")]
    Image(#[from] ImageError),
    #[error("CLI error: {0}")]
    Cli(String),
}

/// Write failures. Read problems never surface as errors; they degrade to an empty collection.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("Storage quota exceeded writing '{key}': {needed} bytes needed, quota is {quota} bytes")]
    QuotaExceeded { key: String, needed: u64, quota: u64 },
}

#[derive(Debug, Error, PartialEq)]
pub enum DateKeyError {
    #[error("'{0}' is not a YYYY-MM-DD date")]
    InvalidDate(String),
    #[error("'{0}' is not a YYYY-MM month")]
    InvalidMonth(String),
}

#[derive(Debug, Error, PartialEq)]
pub enum AmountError {
    #[error("amount is missing")]
    Missing,
    #[error("amount '{0}' is not a number")]
    NotANumber(String),
    #[error("amount is not finite")]
    NotFinite,
    #[error("amount has unsupported type: {0}")]
    Unsupported(String),
}

/// Caller-boundary checks; the store trusts whatever gets past these.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("food name cannot be empty")]
    EmptyFoodName,
    #[error("amount must be greater than zero (got {0})")]
    NonPositiveAmount(f64),
    #[error("invalid amount: {0}")]
    InvalidAmount(#[from] AmountError),
}

#[derive(Debug, Error)]
pub enum ImageError {
    #[error("Image I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Malformed image payload: {0}")]
    Malformed(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

// Result type alias for convenience
pub type AppResult<T> = Result<T, AppError>;
pub type StoreResult<T> = Result<T, StoreError>;
pub type DateKeyResult<T> = Result<T, DateKeyError>;
pub type ImageResult<T> = Result<T, ImageError>;
pub type ConfigResult<T> = Result<T, ConfigError>;
