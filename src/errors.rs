use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ListingError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Non-success status from listing endpoint: {0}")]
    Status(u16),

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Unexpected data from listing endpoint: {0}")]
    UnexpectedData(String),
}

#[derive(Debug, Error)]
pub enum RatError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed record on line {line}: {reason}")]
    Malformed { line: usize, reason: String },
}

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("No `const rates = {{...}};` placeholder in {0}")]
    PlaceholderMissing(PathBuf),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{key} has an invalid value: {value:?}")]
    Invalid { key: &'static str, value: String },
}
