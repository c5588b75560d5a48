//! Provider resource client trait definition

use crate::error::ProviderError;
use crate::record::Record;
use async_trait::async_trait;
use std::time::Duration;

/// Provider resource client abstraction
///
/// Each component type (CloudWatch metric alarm, Google Cloud Function, ...)
/// implements this trait to perform the actual remote calls. The reconciler
/// never talks to a provider API directly.
#[async_trait]
pub trait ResourceClient: Send + Sync {
    /// Returns the component type (e.g., "aws-cloudwatch-metric-alarm")
    fn kind(&self) -> &str;

    /// Returns the component display name for UI
    fn display_name(&self) -> &str;

    /// Name of the attribute whose presence means the resource exists
    fn identity_field(&self) -> &str;

    /// Create the remote resource and return any provider outputs
    async fn create(&self, config: &Record) -> Result<Record, ProviderError>;

    /// Fetch the canonical remote attributes of the resource.
    ///
    /// Must fail with [`ProviderError::NotFound`] when no resource matches
    /// the identity in `config`.
    async fn describe(&self, config: &Record) -> Result<Record, ProviderError>;

    /// Delete the remote resource.
    ///
    /// `state` is the full observed state, for adapters that need more than
    /// the identity to clean up.
    async fn delete(&self, identity: &str, state: &Record) -> Result<(), ProviderError>;
}

#[async_trait]
impl<T: ResourceClient + ?Sized> ResourceClient for std::sync::Arc<T> {
    fn kind(&self) -> &str {
        (**self).kind()
    }

    fn display_name(&self) -> &str {
        (**self).display_name()
    }

    fn identity_field(&self) -> &str {
        (**self).identity_field()
    }

    async fn create(&self, config: &Record) -> Result<Record, ProviderError> {
        (**self).create(config).await
    }

    async fn describe(&self, config: &Record) -> Result<Record, ProviderError> {
        (**self).describe(config).await
    }

    async fn delete(&self, identity: &str, state: &Record) -> Result<(), ProviderError> {
        (**self).delete(identity, state).await
    }
}

/// Retry configuration for provider operations
///
/// The reconciler itself never retries; adapters that talk to flaky APIs
/// apply this policy around their own requests.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of attempts, including the first one
    pub max_attempts: u32,

    /// Initial delay between retries
    pub initial_delay: Duration,

    /// Maximum delay between retries
    pub max_delay: Duration,

    /// Backoff multiplier
    pub backoff_multiplier: f64,
}

impl RetryConfig {
    /// A policy that tries exactly once
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    /// Delay to wait before the given retry (1-based)
    pub fn delay_for(&self, retry: u32) -> Duration {
        let factor = self
            .backoff_multiplier
            .powi(retry.saturating_sub(1) as i32);
        let delay = self.initial_delay.mul_f64(factor);
        delay.min(self.max_delay)
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            backoff_multiplier: 2.0,
        }
    }
}
