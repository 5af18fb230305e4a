//! Error types for the Stevedore publish core

use thiserror::Error;

/// Main error type for the publish core
#[derive(Error, Debug)]
pub enum PublishError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Failed to start deploy server: {0}")]
    ServerStart(String),

    #[error("Deploy server disconnected: {0}")]
    Disconnected(String),

    #[error("Session invalid: {0}")]
    SessionInvalid(String),

    #[error("Deployment already in flight: {0}")]
    DeploymentInFlight(String),

    #[error("Deploy tool fault: {0}")]
    DeployFault(String),

    #[error("{0}")]
    InvalidApplicationName(String),

    #[error("{0}")]
    InvalidStackName(String),

    #[error("Deployment cancelled: {0}")]
    DeploymentCancelled(String),

    #[error("Credentials error: {0}")]
    CredentialsError(String),

    #[error("No published version of '{package}' satisfies '{range}'")]
    NoVersionInRange { package: String, range: String },

    #[error("Invalid version range: {0}")]
    InvalidVersionRange(String),

    #[error("Stream error: {0}")]
    StreamError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<anyhow::Error> for PublishError {
    fn from(err: anyhow::Error) -> Self {
        PublishError::Internal(err.to_string())
    }
}
