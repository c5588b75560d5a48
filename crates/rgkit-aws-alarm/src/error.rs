//! CloudWatch metric alarm error types

use aws_sdk_cloudwatch::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_cloudwatch::operation::delete_alarms::DeleteAlarmsError;
use rgkit_core::ProviderError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AlarmError {
    #[error("AWS authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("CloudWatch API error ({code}): {message}")]
    Api { code: String, message: String },

    #[error("CloudWatch request failed: {0}")]
    RequestFailed(String),

    #[error("CloudWatch request timed out: {0}")]
    Timeout(String),

    #[error("Metric alarm not found: {0}")]
    AlarmNotFound(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, AlarmError>;

impl From<AlarmError> for ProviderError {
    fn from(err: AlarmError) -> Self {
        match err {
            AlarmError::AlarmNotFound(msg) => ProviderError::NotFound(msg),
            AlarmError::AuthenticationFailed(msg) => ProviderError::AuthenticationFailed(msg),
            AlarmError::InvalidConfig(msg) => ProviderError::InvalidConfig(msg),
            AlarmError::Timeout(msg) => ProviderError::Timeout(msg),
            other => ProviderError::Api(other.to_string()),
        }
    }
}

/// Error codes CloudWatch uses for an alarm that is already gone
const NOT_FOUND_CODES: [&str; 2] = ["ResourceNotFound", "ResourceNotFoundException"];

const AUTH_CODES: [&str; 5] = [
    "ExpiredToken",
    "InvalidClientTokenId",
    "UnrecognizedClientException",
    "AccessDenied",
    "SignatureDoesNotMatch",
];

/// Classify a CloudWatch service error by its error code
pub fn classify_code(code: Option<&str>, message: String) -> AlarmError {
    match code {
        Some(code) if NOT_FOUND_CODES.contains(&code) => AlarmError::AlarmNotFound(message),
        Some(code) if AUTH_CODES.contains(&code) => AlarmError::AuthenticationFailed(message),
        code => AlarmError::Api {
            code: code.unwrap_or("Unknown").to_string(),
            message,
        },
    }
}

/// Convert an SDK failure of any CloudWatch operation
pub fn from_sdk<E, R>(err: SdkError<E, R>) -> AlarmError
where
    E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
    R: std::fmt::Debug + Send + Sync + 'static,
{
    let message = DisplayErrorContext(&err).to_string();
    match &err {
        SdkError::ServiceError(context) => classify_code(context.err().code(), message),
        SdkError::TimeoutError(_) => AlarmError::Timeout(message),
        _ => AlarmError::RequestFailed(message),
    }
}

/// DeleteAlarms reports a missing alarm as the typed `ResourceNotFound` error
pub fn from_delete_error<R>(err: SdkError<DeleteAlarmsError, R>, alarm_name: &str) -> AlarmError
where
    R: std::fmt::Debug + Send + Sync + 'static,
{
    if err
        .as_service_error()
        .is_some_and(DeleteAlarmsError::is_resource_not_found)
    {
        return AlarmError::AlarmNotFound(alarm_name.to_string());
    }
    from_sdk(err)
}
