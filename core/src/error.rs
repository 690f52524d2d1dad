use std::io;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, AdminErr>;

/// Errors that escape the engine. Per-request apply failures and post-apply
/// check failures are reported as data, never through this type.
#[derive(Error, Debug)]
pub enum AdminErr {
    #[error("invalid base URL {url:?}: {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("failed to parse {path}: {source}")]
    ConfigParse {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    // -----------------------------------------------------------------
    // Automatic conversions for common external error types
    // -----------------------------------------------------------------
    #[error(transparent)]
    Io(#[from] io::Error),

    #[error(transparent)]
    Reqwest(#[from] reqwest::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
