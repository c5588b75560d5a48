//! Component lifecycle error types

use thiserror::Error;

/// Errors raised by a provider resource client.
///
/// Adapters are responsible for classifying "the resource is already gone"
/// as [`ProviderError::NotFound`]; the reconciler relies on that variant to
/// decide whether a failed delete can be treated as success.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("Command execution failed: {0}")]
    CommandFailed(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Timeout: {0}")]
    Timeout(String),
}

impl ProviderError {
    /// Whether the remote resource is known to be absent
    pub fn is_not_found(&self) -> bool {
        matches!(self, ProviderError::NotFound(_))
    }
}

/// Component lifecycle errors
#[derive(Error, Debug)]
pub enum ComponentError {
    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error("State file error: {0}")]
    StateError(String),

    #[error("Lock acquisition failed: {0}")]
    LockError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ComponentError {
    /// Whether this error carries a provider "not found" signal
    pub fn is_not_found(&self) -> bool {
        matches!(self, ComponentError::Provider(e) if e.is_not_found())
    }
}

pub type Result<T> = std::result::Result<T, ComponentError>;
