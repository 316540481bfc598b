use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SeoError {
    #[error("tracking file is corrupt: {path}: {source}")]
    TrackingCorrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("config file is invalid: {path}: {source}")]
    InvalidConfig {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("missing environment variable: {0}")]
    MissingEnv(&'static str),

    #[error("invalid service account JSON: {0}")]
    InvalidServiceAccount(String),

    #[error("JWT signing failed: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    #[error("{service} returned HTTP {status}: {body}")]
    UpstreamStatus {
        service: &'static str,
        status: u16,
        body: String,
    },

    #[error("unknown directory: {0}")]
    UnknownDirectory(String),

    #[error("invalid submission status '{0}': expected pending, submitted, approved or rejected")]
    InvalidStatus(String),

    #[error("file not found: {0}")]
    FileNotFound(PathBuf),

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, SeoError>;
