//! Google Cloud Function resource client

use crate::bundle::{BundlePublisher, BundleTarget};
use crate::error::{FunctionError, Result};
use crate::function::{FunctionInputs, describe_output};
use crate::http::{Endpoints, GoogleHttp, check};
use crate::storage::StorageClient;
use crate::token::{GcloudTokenSource, TokenSource};
use async_trait::async_trait;
use rgkit_core::{ProviderError, Record, ResourceClient, RetryConfig};
use std::sync::Arc;

pub const KIND: &str = "google-cloud-function";
pub const IDENTITY_FIELD: &str = "name";

/// Google Cloud Function (v1, HTTPS trigger) component
pub struct CloudFunctionClient {
    http: GoogleHttp,
    endpoints: Endpoints,
    token: Arc<dyn TokenSource>,
    publisher: Option<Arc<dyn BundlePublisher>>,
}

impl CloudFunctionClient {
    pub fn new() -> Self {
        Self {
            http: GoogleHttp::new(RetryConfig::default()),
            endpoints: Endpoints::default(),
            token: Arc::new(GcloudTokenSource),
            publisher: None,
        }
    }

    pub fn with_endpoints(mut self, endpoints: Endpoints) -> Self {
        self.endpoints = endpoints;
        self
    }

    pub fn with_token_source(mut self, token: Arc<dyn TokenSource>) -> Self {
        self.token = token;
        self
    }

    /// Publish bundles somewhere other than the Cloud Storage endpoint
    pub fn with_publisher(mut self, publisher: Arc<dyn BundlePublisher>) -> Self {
        self.publisher = Some(publisher);
        self
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.http = GoogleHttp::new(retry);
        self
    }

    fn publisher(&self) -> Arc<dyn BundlePublisher> {
        match &self.publisher {
            Some(publisher) => publisher.clone(),
            None => Arc::new(StorageClient::new(
                self.http.clone(),
                self.endpoints.storage.clone(),
            )),
        }
    }

    fn function_url(&self, resource: &str) -> String {
        format!(
            "{}/v1/{}",
            self.endpoints.functions.trim_end_matches('/'),
            resource
        )
    }

    async fn token_for(&self, inputs: &FunctionInputs) -> Result<String> {
        self.token.access_token(inputs.key_path().as_deref()).await
    }

    /// Zip and upload the source directory, returning the archive record
    async fn publish(&self, inputs: &FunctionInputs, token: &str) -> Result<Record> {
        let missing =
            |name: &str| FunctionError::InvalidConfig(format!("missing required input: {}", name));
        let target = BundleTarget {
            project: inputs.project_id.clone().ok_or_else(|| missing("projectId"))?,
            bucket: inputs.bucket()?.to_string(),
            name: inputs.name.clone().ok_or_else(|| missing("name"))?,
        };

        self.publisher()
            .publish(token, &target, inputs.source_dir()?)
            .await
    }

    async fn create_function(&self, config: &Record) -> Result<Record> {
        let inputs = FunctionInputs::from_record(config)?;
        let location = inputs.location()?;
        let token = self.token_for(&inputs).await?;

        let uploads_source = !inputs.has_external_source()
            && (inputs.source_code_path.is_some() || inputs.source_archive_url.is_none());
        let mut output = if uploads_source {
            self.publish(&inputs, &token).await?
        } else {
            Record::new()
        };

        let archive_url = output.get_str("sourceArchiveUrl").map(str::to_string);
        let body = inputs.create_request(archive_url)?;
        let request = self
            .http
            .client()
            .post(format!("{}/functions", self.function_url(&location)))
            .bearer_auth(&token)
            .json(&body);
        match check(self.http.send(request).await?).await {
            Ok(response) => {
                let status = response.status().as_u16();
                let operation: serde_json::Value = response.json().await?;

                tracing::info!("Requested function creation: {}", body.name);

                output.insert("status", status);
                if let Some(op) = operation.get("name") {
                    output.insert("operation", op.clone());
                }
            }
            // 前回の deploy が作成後に中断された場合など
            Err(FunctionError::AlreadyExists(message)) => {
                tracing::info!("Function already exists, adopting it: {} ({})", body.name, message);
            }
            Err(e) => return Err(e),
        }
        Ok(output)
    }

    async fn describe_function(&self, config: &Record) -> Result<Record> {
        let inputs = FunctionInputs::from_record(config)?;
        let resource = inputs.resource_name()?;
        let token = self.token_for(&inputs).await?;

        let request = self
            .http
            .client()
            .get(self.function_url(&resource))
            .bearer_auth(&token);
        let body = self.http.send_json(request).await?;
        Ok(describe_output(&body))
    }

    async fn delete_function(&self, identity: &str, state: &Record) -> Result<()> {
        let inputs = FunctionInputs {
            name: Some(identity.to_string()),
            ..FunctionInputs::from_record(state)?
        };
        let resource = inputs.resource_name()?;
        let token = self.token_for(&inputs).await?;

        if let (Some(bucket), Some(object)) = (
            state.get_str("deploymentBucket"),
            state.get_str("sourceArchiveFilename"),
        ) {
            self.publisher().unpublish(&token, bucket, object).await;
        }

        let request = self
            .http
            .client()
            .delete(self.function_url(&resource))
            .bearer_auth(&token);
        self.http.send_json(request).await?;

        tracing::info!("Deleted function: {}", resource);
        Ok(())
    }
}

impl Default for CloudFunctionClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ResourceClient for CloudFunctionClient {
    fn kind(&self) -> &str {
        KIND
    }

    fn display_name(&self) -> &str {
        "Google Cloud Function"
    }

    fn identity_field(&self) -> &str {
        IDENTITY_FIELD
    }

    async fn create(&self, config: &Record) -> std::result::Result<Record, ProviderError> {
        Ok(self.create_function(config).await?)
    }

    async fn describe(&self, config: &Record) -> std::result::Result<Record, ProviderError> {
        Ok(self.describe_function(config).await?)
    }

    async fn delete(
        &self,
        identity: &str,
        state: &Record,
    ) -> std::result::Result<(), ProviderError> {
        Ok(self.delete_function(identity, state).await?)
    }
}
