use std::path::PathBuf;
use thiserror::Error;

/// Remote operation failures.
///
/// `Display` is the fixed message shown to the user; the transport or HTTP
/// cause is kept as the source and only ever logged.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Failed to fetch todos. Please check if the backend server is running.")]
    FetchFailed(#[source] reqwest::Error),
    #[error("Failed to create todo. Please try again.")]
    CreateFailed(#[source] reqwest::Error),
    #[error("Failed to update todo. Please try again.")]
    UpdateFailed(#[source] reqwest::Error),
    #[error("Failed to delete todo. Please try again.")]
    DeleteFailed(#[source] reqwest::Error),
    #[error("Failed to search todos. Please try again.")]
    SearchFailed(#[source] reqwest::Error),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Title is required")]
    EmptyTitle,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },
}
