//! Cloud Storage JSON API calls used for deployment bundles

use crate::bundle::{self, BundlePublisher, BundleTarget};
use crate::error::{FunctionError, Result};
use crate::http::{GoogleHttp, check};
use async_trait::async_trait;
use reqwest::StatusCode;
use rgkit_core::Record;
use serde_json::json;
use std::path::PathBuf;

/// Deployment bucket operations
#[derive(Debug, Clone)]
pub struct StorageClient {
    http: GoogleHttp,
    base: String,
}

impl StorageClient {
    pub fn new(http: GoogleHttp, base: impl Into<String>) -> Self {
        Self {
            http,
            base: base.into().trim_end_matches('/').to_string(),
        }
    }

    /// Create the bucket; an existing bucket is fine
    pub async fn create_bucket(&self, token: &str, project: &str, bucket: &str) -> Result<()> {
        let request = self
            .http
            .client()
            .post(format!("{}/storage/v1/b", self.base))
            .query(&[("project", project)])
            .bearer_auth(token)
            .json(&json!({ "name": bucket }));

        let response = self.http.send(request).await?;
        if response.status() == StatusCode::CONFLICT {
            tracing::debug!("Deployment bucket already exists: {}", bucket);
            return Ok(());
        }
        check(response).await?;
        tracing::info!("Created deployment bucket: {}", bucket);
        Ok(())
    }

    /// Upload a zip archive as `bucket/object`
    pub async fn upload_archive(
        &self,
        token: &str,
        bucket: &str,
        object: &str,
        bytes: Vec<u8>,
    ) -> Result<()> {
        let request = self
            .http
            .client()
            .post(format!("{}/upload/storage/v1/b/{}/o", self.base, bucket))
            .query(&[("uploadType", "media"), ("name", object)])
            .bearer_auth(token)
            .header(reqwest::header::CONTENT_TYPE, "application/zip")
            .body(bytes);

        check(self.http.send(request).await?).await?;
        tracing::info!("Uploaded gs://{}/{}", bucket, object);
        Ok(())
    }

    pub async fn delete_object(&self, token: &str, bucket: &str, object: &str) -> Result<()> {
        let request = self
            .http
            .client()
            .delete(format!("{}/storage/v1/b/{}/o/{}", self.base, bucket, object))
            .bearer_auth(token);

        check(self.http.send(request).await?).await?;
        Ok(())
    }

    pub async fn delete_bucket(&self, token: &str, bucket: &str) -> Result<()> {
        let request = self
            .http
            .client()
            .delete(format!("{}/storage/v1/b/{}", self.base, bucket))
            .bearer_auth(token);

        check(self.http.send(request).await?).await?;
        Ok(())
    }
}

/// Zip upload into a Cloud Storage deployment bucket
#[async_trait]
impl BundlePublisher for StorageClient {
    async fn publish(
        &self,
        token: &str,
        target: &BundleTarget,
        source_dir: PathBuf,
    ) -> Result<Record> {
        let bundle = bundle::pack(&target.name, source_dir).await?;
        self.create_bucket(token, &target.project, &target.bucket).await?;
        self.upload_archive(token, &target.bucket, &bundle.filename, bundle.bytes)
            .await?;

        Ok(Record::new()
            .with(
                "sourceArchiveUrl",
                format!("gs://{}/{}", target.bucket, bundle.filename),
            )
            .with("sourceArchiveFilename", bundle.filename))
    }

    /// Removes the archive and then the bucket, logging failures
    async fn unpublish(&self, token: &str, bucket: &str, filename: &str) {
        if let Err(e) = self.delete_object(token, bucket, filename).await {
            tracing::warn!("Failed to delete archive gs://{}/{}: {}", bucket, filename, e);
        }
        match self.delete_bucket(token, bucket).await {
            Ok(()) => tracing::info!("Deleted deployment bucket: {}", bucket),
            Err(FunctionError::NotFound(_)) => {}
            Err(e) => tracing::warn!("Failed to delete deployment bucket {}: {}", bucket, e),
        }
    }
}
