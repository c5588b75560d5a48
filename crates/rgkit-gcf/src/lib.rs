//! Google Cloud Function component for rgkit
//!
//! Implements `ResourceClient` for HTTPS-triggered Cloud Functions (v1 API).
//! On create the source directory is zipped, uploaded to a deployment
//! bucket, and the function is created from that archive.
//!
//! # Requirements
//!
//! - An access token in `GOOGLE_OAUTH_ACCESS_TOKEN`, or the `gcloud` CLI
//!   (`keyFilename` is passed as a credential file override)
//!
//! # Example
//!
//! ```ignore
//! use rgkit_core::{FileStateStore, Reconciler};
//! use rgkit_gcf::CloudFunctionClient;
//!
//! let reconciler = Reconciler::new(CloudFunctionClient::new(), FileStateStore::new("."));
//! let state = reconciler.deploy("google-cloud-function:hello", &inputs).await?;
//! ```

pub mod bundle;
pub mod client;
pub mod error;
pub mod function;
pub mod http;
pub mod storage;
pub mod token;

pub use bundle::{BundlePublisher, BundleTarget, SourceBundle, pack_directory};
pub use client::{CloudFunctionClient, IDENTITY_FIELD, KIND};
pub use error::{FunctionError, Result};
pub use function::{FunctionInputs, summary};
pub use http::Endpoints;
pub use storage::StorageClient;
pub use token::{GcloudTokenSource, StaticToken, TokenSource};
