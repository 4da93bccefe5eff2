//! Error types for Gramcast

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, GramcastError>;

#[derive(Error, Debug)]
pub enum GramcastError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("API error: {0}")]
    Api(#[from] ApiError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl GramcastError {
    /// Returns the appropriate exit code for this error
    ///
    /// Per-post publish failures never surface here; they are contained by
    /// the batch runner. Anything that reaches this method is fatal.
    pub fn exit_code(&self) -> i32 {
        match self {
            GramcastError::Config(_) => 2,
            GramcastError::InvalidInput(_) => 3,
            GramcastError::Store(_) => 1,
            GramcastError::Api(_) => 1,
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(String),

    #[error("Invalid value for {name}: {reason}")]
    InvalidValue { name: String, reason: String },
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Posts file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Failed to read posts file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse posts file: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Remote error (HTTP {status}): {message}")]
    Remote { status: u16, message: String },

    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),
}
