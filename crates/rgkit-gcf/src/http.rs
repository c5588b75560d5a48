//! Shared HTTP plumbing for the Google REST APIs

use crate::error::{FunctionError, Result};
use reqwest::{RequestBuilder, Response, StatusCode};
use rgkit_core::RetryConfig;
use serde::Deserialize;
use serde_json::Value;

pub const CLOUD_FUNCTIONS_API: &str = "https://cloudfunctions.googleapis.com";
pub const CLOUD_STORAGE_API: &str = "https://storage.googleapis.com";

/// Base URLs of the Google APIs in use
#[derive(Debug, Clone)]
pub struct Endpoints {
    pub functions: String,
    pub storage: String,
}

impl Endpoints {
    /// Point both APIs at the same base URL
    pub fn single(base: impl Into<String>) -> Self {
        let base = base.into();
        Self {
            functions: base.clone(),
            storage: base,
        }
    }
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            functions: CLOUD_FUNCTIONS_API.to_string(),
            storage: CLOUD_STORAGE_API.to_string(),
        }
    }
}

/// reqwest client with retry on throttling and server errors
#[derive(Debug, Clone)]
pub struct GoogleHttp {
    client: reqwest::Client,
    retry: RetryConfig,
}

impl GoogleHttp {
    pub fn new(retry: RetryConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            retry,
        }
    }

    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }

    /// Send a request, retrying 429 and 5xx responses
    pub async fn send(&self, request: RequestBuilder) -> Result<Response> {
        let mut attempt = 1;
        loop {
            let current = request.try_clone().ok_or_else(|| FunctionError::ApiError {
                code: 0,
                message: "request cannot be retried".to_string(),
            })?;

            let response = current.send().await?;
            let status = response.status();
            let retryable = status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS;

            if retryable && attempt < self.retry.max_attempts {
                let delay = self.retry.delay_for(attempt);
                tracing::warn!(
                    "{} returned {}, retrying in {:?} ({}/{})",
                    response.url(),
                    status,
                    delay,
                    attempt,
                    self.retry.max_attempts
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
                continue;
            }

            return Ok(response);
        }
    }

    /// Send a request and decode a successful JSON body
    pub async fn send_json(&self, request: RequestBuilder) -> Result<Value> {
        let response = check(self.send(request).await?).await?;
        let body = response.text().await?;
        if body.trim().is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&body)?)
    }
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: Option<String>,
}

/// Turn a non-success response into a typed error
pub async fn check(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(classify(status, &body))
}

/// Classify an error response of a Google API
pub fn classify(status: StatusCode, body: &str) -> FunctionError {
    let (message, api_status) = match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) => (envelope.error.message, envelope.error.status),
        Err(_) => (body.trim().to_string(), None),
    };

    if status == StatusCode::NOT_FOUND || api_status.as_deref() == Some("NOT_FOUND") {
        FunctionError::NotFound(message)
    } else if status == StatusCode::CONFLICT || api_status.as_deref() == Some("ALREADY_EXISTS") {
        FunctionError::AlreadyExists(message)
    } else if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        FunctionError::AuthenticationFailed(message)
    } else {
        FunctionError::ApiError {
            code: status.as_u16(),
            message,
        }
    }
}
