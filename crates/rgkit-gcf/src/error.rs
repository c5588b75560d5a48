//! Google Cloud Function error types

use rgkit_core::ProviderError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FunctionError {
    #[error("gcloud not found. Please install the Google Cloud SDK")]
    GcloudNotFound,

    #[error("Google authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Google resource not found: {0}")]
    NotFound(String),

    #[error("Google resource already exists: {0}")]
    AlreadyExists(String),

    #[error("Google API error ({code}): {message}")]
    ApiError { code: u16, message: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Source bundle error: {0}")]
    BundleError(String),

    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Zip error: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, FunctionError>;

impl From<FunctionError> for ProviderError {
    fn from(err: FunctionError) -> Self {
        match err {
            FunctionError::NotFound(msg) => ProviderError::NotFound(msg),
            FunctionError::AuthenticationFailed(msg) => ProviderError::AuthenticationFailed(msg),
            FunctionError::InvalidConfig(msg) => ProviderError::InvalidConfig(msg),
            FunctionError::HttpError(e) if e.is_timeout() => ProviderError::Timeout(e.to_string()),
            other => ProviderError::Api(other.to_string()),
        }
    }
}
