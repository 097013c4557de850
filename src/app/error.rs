// src/app/error.rs
use std::path::PathBuf;

use thiserror::Error;

/// Bad user input. Nothing is mutated when this is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Movie title is required")]
    EmptyName,
    #[error("Rating must be numeric (got `{0}`)")]
    RatingNotNumeric(String),
}

/// Any failure talking to the remote catalog.
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("no TMDB API key configured")]
    MissingApiKey,
    #[error("request timed out: {0}")]
    Timeout(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("HTTP {0}")]
    Status(u16),
    #[error("unexpected response: {0}")]
    Malformed(String),
}

impl From<reqwest::Error> for LookupError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout(err.to_string())
        } else if let Some(status) = err.status() {
            Self::Status(status.as_u16())
        } else if err.is_decode() {
            Self::Malformed(err.to_string())
        } else {
            Self::Network(err.to_string())
        }
    }
}

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("serialize: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum PlayError {
    #[error("no local file attached")]
    NoFile,
    #[error("file not found: {}", .0.display())]
    Missing(PathBuf),
    #[error("could not launch player: {0}")]
    Launch(#[source] std::io::Error),
}
