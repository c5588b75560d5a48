//! Cloud Function inputs, request body and outputs

use crate::error::{FunctionError, Result};
use crate::token::expand_home;
use rgkit_core::Record;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::PathBuf;

pub const DEFAULT_RUNTIME: &str = "nodejs20";

/// Attributes copied out of a `functions.get` response
pub const DESCRIBE_FIELDS: &[&str] = &[
    "name",
    "sourceArchiveUrl",
    "httpsTrigger",
    "status",
    "entryPoint",
    "timeout",
    "availableMemoryMb",
    "serviceAccountEmail",
    "updateTime",
    "versionId",
    "runtime",
];

/// Component inputs as written in the project configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionInputs {
    pub name: Option<String>,
    pub project_id: Option<String>,
    pub location_id: Option<String>,
    pub key_filename: Option<String>,
    pub source_code_path: Option<String>,
    pub deployment_bucket: Option<String>,
    pub source_archive_filename: Option<String>,
    pub entry_point: Option<String>,
    pub description: Option<String>,
    pub timeout: Option<Value>,
    pub available_memory_mb: Option<i64>,
    pub labels: Option<BTreeMap<String, String>>,
    pub runtime: Option<String>,
    pub env: Option<BTreeMap<String, String>>,
    pub source_archive_url: Option<String>,
    pub source_repository: Option<Value>,
    pub source_upload_url: Option<String>,
}

impl FunctionInputs {
    pub fn from_record(record: &Record) -> Result<Self> {
        serde_json::from_value(record.clone().into_value())
            .map_err(|e| FunctionError::InvalidConfig(e.to_string()))
    }

    fn require<'a>(value: &'a Option<String>, name: &str) -> Result<&'a str> {
        value
            .as_deref()
            .filter(|v| !v.is_empty())
            .ok_or_else(|| FunctionError::InvalidConfig(format!("missing required input: {}", name)))
    }

    /// `projects/<project>/locations/<location>`
    pub fn location(&self) -> Result<String> {
        Ok(format!(
            "projects/{}/locations/{}",
            Self::require(&self.project_id, "projectId")?,
            Self::require(&self.location_id, "locationId")?
        ))
    }

    /// Fully qualified function name
    pub fn resource_name(&self) -> Result<String> {
        let name = Self::require(&self.name, "name")?;
        if name.starts_with("projects/") {
            return Ok(name.to_string());
        }
        Ok(format!("{}/functions/{}", self.location()?, name))
    }

    pub fn key_path(&self) -> Option<PathBuf> {
        self.key_filename.as_deref().map(expand_home)
    }

    pub fn source_dir(&self) -> Result<PathBuf> {
        Ok(expand_home(Self::require(
            &self.source_code_path,
            "sourceCodePath",
        )?))
    }

    pub fn bucket(&self) -> Result<&str> {
        Self::require(&self.deployment_bucket, "deploymentBucket")
    }

    /// Whether the source comes from somewhere other than an uploaded archive
    pub fn has_external_source(&self) -> bool {
        self.source_repository.is_some()
            || self.source_upload_url.as_deref().is_some_and(|u| !u.is_empty())
    }

    fn timeout(&self) -> Option<String> {
        match &self.timeout {
            Some(Value::Number(n)) => Some(format!("{}s", n)),
            Some(Value::String(s)) if s.chars().all(|c| c.is_ascii_digit()) => {
                Some(format!("{}s", s))
            }
            Some(Value::String(s)) => Some(s.clone()),
            _ => None,
        }
    }

    /// Build the `functions.create` body
    pub fn create_request(&self, source_archive_url: Option<String>) -> Result<CreateFunctionRequest> {
        let (source_repository, source_upload_url) = if self.source_repository.is_some() {
            (self.source_repository.clone(), None)
        } else {
            (None, self.source_upload_url.clone().filter(|u| !u.is_empty()))
        };
        let source_archive_url = if source_repository.is_some() || source_upload_url.is_some() {
            None
        } else {
            source_archive_url.or_else(|| self.source_archive_url.clone())
        };

        Ok(CreateFunctionRequest {
            name: self.resource_name()?,
            description: self.description.clone(),
            entry_point: self.entry_point.clone(),
            runtime: self
                .runtime
                .clone()
                .unwrap_or_else(|| DEFAULT_RUNTIME.to_string()),
            timeout: self.timeout(),
            available_memory_mb: self.available_memory_mb,
            labels: self.labels.clone(),
            environment_variables: self.env.clone(),
            source_archive_url,
            source_repository,
            source_upload_url,
            https_trigger: Map::new(),
        })
    }
}

/// CloudFunction resource for `projects.locations.functions.create`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateFunctionRequest {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry_point: Option<String>,
    pub runtime: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub available_memory_mb: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<BTreeMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub environment_variables: Option<BTreeMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_archive_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_repository: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_upload_url: Option<String>,
    pub https_trigger: Map<String, Value>,
}

/// Keep only the attributes worth persisting from a `functions.get` body
pub fn describe_output(body: &Value) -> Record {
    let mut record = Record::new();
    for field in DESCRIBE_FIELDS {
        if let Some(value) = body.get(*field)
            && !value.is_null()
        {
            record.insert(*field, value.clone());
        }
    }
    record
}

/// Lines shown by `rgkit info`
pub fn summary(state: &Record) -> Vec<(&'static str, String)> {
    let url = state
        .get("httpsTrigger")
        .and_then(|t| t.get("url"))
        .and_then(Value::as_str)
        .unwrap_or("-")
        .to_string();
    let status = state.get_str("status").unwrap_or("-").to_string();

    vec![("Function Url", url), ("Status", status)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn inputs(value: Value) -> FunctionInputs {
        FunctionInputs::from_record(&Record::from_value(value).unwrap()).unwrap()
    }

    #[test]
    fn test_resource_name() {
        let fi = inputs(json!({"name": "hello", "projectId": "p1", "locationId": "us-central1"}));
        assert_eq!(
            fi.resource_name().unwrap(),
            "projects/p1/locations/us-central1/functions/hello"
        );

        let full = inputs(json!({"name": "projects/p1/locations/us-central1/functions/hello"}));
        assert_eq!(
            full.resource_name().unwrap(),
            "projects/p1/locations/us-central1/functions/hello"
        );

        let missing = inputs(json!({"name": "hello"}));
        assert!(matches!(
            missing.resource_name(),
            Err(FunctionError::InvalidConfig(msg)) if msg.contains("projectId")
        ));
    }

    #[test]
    fn test_create_request() {
        let fi = inputs(json!({
            "name": "hello",
            "projectId": "p1",
            "locationId": "us-central1",
            "entryPoint": "hello",
            "timeout": 60,
            "availableMemoryMb": 256,
            "env": {"STAGE": "dev"},
            "labels": {"team": "core"}
        }));
        let body =
            serde_json::to_value(fi.create_request(Some("gs://b/hello.zip".into())).unwrap()).unwrap();

        assert_eq!(body["name"], "projects/p1/locations/us-central1/functions/hello");
        assert_eq!(body["runtime"], DEFAULT_RUNTIME);
        assert_eq!(body["timeout"], "60s");
        assert_eq!(body["sourceArchiveUrl"], "gs://b/hello.zip");
        assert_eq!(body["environmentVariables"]["STAGE"], "dev");
        assert_eq!(body["httpsTrigger"], json!({}));
        assert!(body.get("description").is_none());
        assert!(body.get("sourceUploadUrl").is_none());
    }

    #[test]
    fn test_create_request_prefers_repository() {
        let fi = inputs(json!({
            "name": "hello",
            "projectId": "p1",
            "locationId": "l",
            "runtime": "python312",
            "sourceRepository": {"url": "https://source.developers.google.com/projects/p1/repos/r"},
            "sourceUploadUrl": "https://upload"
        }));
        assert!(fi.has_external_source());

        let body = serde_json::to_value(fi.create_request(None).unwrap()).unwrap();
        assert_eq!(body["runtime"], "python312");
        assert!(body.get("sourceRepository").is_some());
        assert!(body.get("sourceUploadUrl").is_none());
        assert!(body.get("sourceArchiveUrl").is_none());
    }

    #[test]
    fn test_describe_output_filters_fields() {
        let body = json!({
            "name": "projects/p1/locations/l/functions/hello",
            "status": "ACTIVE",
            "httpsTrigger": {"url": "https://l-p1.cloudfunctions.net/hello"},
            "buildId": "b-123",
            "versionId": "3",
            "serviceAccountEmail": null
        });

        let record = describe_output(&body);
        assert_eq!(record.len(), 4);
        assert!(!record.contains_key("buildId"));
        assert!(!record.contains_key("serviceAccountEmail"));
        assert_eq!(
            summary(&record),
            vec![
                ("Function Url", "https://l-p1.cloudfunctions.net/hello".to_string()),
                ("Status", "ACTIVE".to_string())
            ]
        );
    }
}
