//! rgkit component lifecycle core
//!
//! This crate provides the reconciliation contract shared by every rgkit
//! component: given desired configuration and previously persisted state,
//! decide whether to create, keep, refresh or tear down a remote resource,
//! and keep local state consistent with the remote world.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │                   rgkit CLI                      │
//! │            (deploy / remove / info)              │
//! └─────────────────┬───────────────────────────────┘
//!                   │
//! ┌─────────────────▼───────────────────────────────┐
//! │                 rgkit-core                       │
//! │  ┌──────────────────────────────────────────┐   │
//! │  │              Reconciler                   │   │
//! │  │  plan_* → ResourceClient → StateStore     │   │
//! │  └──────────────────────────────────────────┘   │
//! │  ┌──────────────┐  ┌──────────────┐            │
//! │  │    Record    │  │  State Store │            │
//! │  └──────────────┘  └──────────────┘            │
//! └───────┬─────────────────┬───────────────────────┘
//!         │                 │
//! ┌───────▼───────┐ ┌───────▼───────┐
//! │  CloudWatch   │ │ Google Cloud  │
//! │ metric alarm  │ │   Function    │
//! └───────────────┘ └───────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use rgkit_core::{FileStateStore, Reconciler, Record};
//!
//! let reconciler = Reconciler::new(client, FileStateStore::new("."));
//! let state = reconciler.deploy("aws-cloudwatch-metric-alarm:cpu", &desired).await?;
//! ```

pub mod error;
pub mod logger;
pub mod plan;
pub mod provider;
pub mod reconciler;
pub mod record;
pub mod state;

// Re-exports
pub use error::{ComponentError, ProviderError, Result};
pub use logger::{Logger, TracingLogger};
pub use plan::{LifecycleAction, plan_deploy, plan_info, plan_remove};
pub use provider::{ResourceClient, RetryConfig};
pub use reconciler::Reconciler;
pub use record::Record;
pub use state::{
    FileStateStore, InstanceState, MemoryStateStore, StateFile, StateLock, StateStore,
};
