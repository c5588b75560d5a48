//! OAuth access tokens for the Google APIs

use crate::error::{FunctionError, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;

/// Environment variable holding a ready-made access token
pub const ACCESS_TOKEN_ENV: &str = "GOOGLE_OAUTH_ACCESS_TOKEN";

/// Source of bearer tokens for the Google APIs
#[async_trait]
pub trait TokenSource: Send + Sync {
    /// Get an access token, optionally for a service account key file
    async fn access_token(&self, key_filename: Option<&Path>) -> Result<String>;
}

/// Always hands out the same token
#[derive(Debug, Clone)]
pub struct StaticToken(pub String);

#[async_trait]
impl TokenSource for StaticToken {
    async fn access_token(&self, _key_filename: Option<&Path>) -> Result<String> {
        Ok(self.0.clone())
    }
}

/// Token from `GOOGLE_OAUTH_ACCESS_TOKEN`, falling back to
/// `gcloud auth print-access-token`
#[derive(Debug, Clone, Default)]
pub struct GcloudTokenSource;

#[async_trait]
impl TokenSource for GcloudTokenSource {
    async fn access_token(&self, key_filename: Option<&Path>) -> Result<String> {
        if let Ok(token) = std::env::var(ACCESS_TOKEN_ENV)
            && !token.trim().is_empty()
        {
            return Ok(token.trim().to_string());
        }

        let mut cmd = Command::new("gcloud");
        cmd.args(["auth", "print-access-token"]);
        if let Some(key) = key_filename {
            if !key.exists() {
                return Err(FunctionError::InvalidConfig(format!(
                    "key file not found: {}",
                    key.display()
                )));
            }
            cmd.env("CLOUDSDK_AUTH_CREDENTIAL_FILE_OVERRIDE", key);
        }
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());

        tracing::debug!("Running: gcloud auth print-access-token");

        let output = match cmd.output().await {
            Ok(output) => output,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(FunctionError::GcloudNotFound);
            }
            Err(e) => return Err(e.into()),
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(FunctionError::AuthenticationFailed(stderr.trim().to_string()));
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

/// Expand a leading `~` to the home directory
pub fn expand_home(path: &str) -> PathBuf {
    if path == "~" {
        return dirs::home_dir().unwrap_or_else(|| PathBuf::from(path));
    }
    match path.strip_prefix("~/") {
        Some(rest) => match dirs::home_dir() {
            Some(home) => home.join(rest),
            None => PathBuf::from(path),
        },
        None => PathBuf::from(path),
    }
}
