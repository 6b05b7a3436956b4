//! Error types for gdg-core

use thiserror::Error;

/// Main error type for gdg-core
#[derive(Error, Debug)]
pub enum Error {
    #[error("Gemini API error: {0}")]
    GeminiApi(String),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Tool execution error: {0}")]
    ToolExecution(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for gdg-core
pub type Result<T> = std::result::Result<T, Error>;
