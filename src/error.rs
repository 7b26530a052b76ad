use crate::services::fetcher::ProxyAttempt;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScraperError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Invalid pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("File not found: {path}")]
    FileNotFound { path: String },

    #[error("Fetch configuration error: {reason}")]
    FetchConfig { reason: String },

    #[error("Export error: {reason}")]
    Export { reason: String },

    #[error("All proxies failed. {message}")]
    ProxiesExhausted {
        message: String,
        attempts: Vec<ProxyAttempt>,
    },

    #[error("Could not extract any creators from {origin}. {hint}")]
    NoCreatorsFound { origin: String, hint: String },

    #[error("Anyhow error: {0}")]
    Anyhow(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, ScraperError>;
