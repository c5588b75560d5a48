//! Component lifecycle reconciler
//!
//! The [`Reconciler`] implements `deploy`, `remove` and `info` uniformly for
//! every component type. It loads the observed state of an instance, asks
//! [`crate::plan`] what to do, calls the provider client and persists the
//! merged outcome. Nothing is persisted when a provider call fails, so the
//! identity field in the store only ever appears after a successful create.

use crate::error::Result;
use crate::logger::{Logger, TracingLogger};
use crate::plan::{self, LifecycleAction};
use crate::provider::ResourceClient;
use crate::record::Record;
use crate::state::StateStore;
use std::sync::Arc;

/// Lifecycle manager for one component type
pub struct Reconciler<C, S> {
    client: C,
    store: S,
    logger: Arc<dyn Logger>,
}

impl<C, S> Reconciler<C, S>
where
    C: ResourceClient,
    S: StateStore,
{
    pub fn new(client: C, store: S) -> Self {
        Self {
            client,
            store,
            logger: Arc::new(TracingLogger),
        }
    }

    pub fn with_logger(mut self, logger: Arc<dyn Logger>) -> Self {
        self.logger = logger;
        self
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Make sure the resource described by `desired` exists.
    ///
    /// Returns the new observed state, or the current one unchanged when
    /// `desired` carries no identity.
    pub async fn deploy(&self, key: &str, desired: &Record) -> Result<Record> {
        let current = self.store.load(key).await?;
        let identity_field = self.client.identity_field();
        let action = plan::plan_deploy(identity_field, desired, &current);
        tracing::debug!("deploy {}: {}", key, action);

        match action {
            LifecycleAction::Create => {
                self.logger.log(&format!(
                    "Creating {}: '{}'",
                    self.client.display_name(),
                    desired.get_str(identity_field).unwrap_or_default()
                ));

                let created = self.client.create(desired).await?;
                let requested = desired.merge(&created);
                let observed = self.client.describe(&requested).await?;
                let record = requested.merge(&observed);

                self.store.save(key, &record).await?;
                Ok(record)
            }
            LifecycleAction::Keep => {
                let record = desired.merge(&current);
                self.store.save(key, &record).await?;
                Ok(record)
            }
            _ => Ok(current),
        }
    }

    /// Tear down the tracked resource and clear its state.
    ///
    /// A provider "not found" outcome counts as success. Any other failure
    /// is returned and the state is left as it was.
    pub async fn remove(&self, key: &str) -> Result<Record> {
        let current = self.store.load(key).await?;
        let identity_field = self.client.identity_field();
        let action = plan::plan_remove(identity_field, &current);
        tracing::debug!("remove {}: {}", key, action);

        if action == LifecycleAction::Skip {
            return Ok(Record::new());
        }

        let identity = current.get_str(identity_field).unwrap_or_default();
        self.logger.log(&format!(
            "Removing {}: '{}'",
            self.client.display_name(),
            identity
        ));

        match self.client.delete(identity, &current).await {
            Ok(()) => {}
            Err(e) if e.is_not_found() => {
                tracing::info!("{} '{}' is already gone: {}", self.client.kind(), identity, e);
            }
            Err(e) => return Err(e.into()),
        }

        self.store.clear(key).await?;
        Ok(Record::new())
    }

    /// Re-read the remote attributes of the tracked resource.
    pub async fn info(&self, key: &str, desired: &Record) -> Result<Record> {
        let current = self.store.load(key).await?;
        let identity_field = self.client.identity_field();
        let action = plan::plan_info(identity_field, &current);
        tracing::debug!("info {}: {}", key, action);

        if action == LifecycleAction::Skip {
            return Ok(Record::new());
        }

        self.logger.log(&format!(
            "Listing {} for '{}'",
            self.client.display_name(),
            current.get_str(identity_field).unwrap_or_default()
        ));

        let observed = self.client.describe(&current.merge(desired)).await?;
        let record = desired.merge(&current).merge(&observed);

        self.store.save(key, &record).await?;
        Ok(record)
    }
}
