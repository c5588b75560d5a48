//! CloudWatch metric alarm component for rgkit
//!
//! This crate implements the `ResourceClient` trait for CloudWatch metric
//! alarms, so that the rgkit reconciler can create, describe and delete a
//! single alarm.
//!
//! # Requirements
//!
//! - AWS credentials resolvable by the default provider chain (env vars,
//!   shared profile, SSO, instance metadata, ...)
//! - The `region` and `profile` inputs select where the alarm lives
//!   (default region: `us-east-1`)
//!
//! # Example
//!
//! ```ignore
//! use rgkit_aws_alarm::MetricAlarmClient;
//! use rgkit_core::{FileStateStore, Reconciler};
//!
//! let reconciler = Reconciler::new(MetricAlarmClient::new(), FileStateStore::new("."));
//! let state = reconciler.deploy("aws-cloudwatch-metric-alarm:cpu", &inputs).await?;
//! ```

pub mod alarm;
pub mod client;
pub mod error;

pub use alarm::{AlarmInputs, dimension_from_input, summary};
pub use client::{DEFAULT_REGION, IDENTITY_FIELD, KIND, MetricAlarmClient};
pub use error::{AlarmError, Result};
