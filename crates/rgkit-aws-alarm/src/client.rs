//! CloudWatch metric alarm resource client

use crate::alarm::{AlarmInputs, select_alarm};
use crate::error::{AlarmError, from_delete_error, from_sdk};
use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_cloudwatch::Client;
use rgkit_core::{ProviderError, Record, ResourceClient};
use std::collections::HashMap;
use tokio::sync::Mutex;

pub const KIND: &str = "aws-cloudwatch-metric-alarm";
pub const IDENTITY_FIELD: &str = "alarmName";
pub const DEFAULT_REGION: &str = "us-east-1";

/// (region, profile)
type ClientKey = (String, Option<String>);

/// CloudWatch metric alarm component
///
/// The region and profile come from the component inputs (`region`,
/// `profile`). One SDK client is loaded per region/profile pair and reused.
pub struct MetricAlarmClient {
    fixed: Option<Client>,
    clients: Mutex<HashMap<ClientKey, Client>>,
}

impl MetricAlarmClient {
    pub fn new() -> Self {
        Self {
            fixed: None,
            clients: Mutex::new(HashMap::new()),
        }
    }

    /// Use `client` for every call, ignoring `region` / `profile` inputs
    pub fn with_client(client: Client) -> Self {
        Self {
            fixed: Some(client),
            clients: Mutex::new(HashMap::new()),
        }
    }

    /// SDK client for the region/profile of a given configuration
    async fn client_for(&self, config: &Record) -> Client {
        if let Some(client) = &self.fixed {
            return client.clone();
        }

        let key = (
            config.get_str("region").unwrap_or(DEFAULT_REGION).to_string(),
            config.get_str("profile").map(str::to_string),
        );

        let mut clients = self.clients.lock().await;
        if let Some(client) = clients.get(&key) {
            return client.clone();
        }

        tracing::debug!("Loading AWS config: region={} profile={:?}", key.0, key.1);
        let mut loader =
            aws_config::defaults(BehaviorVersion::latest()).region(Region::new(key.0.clone()));
        if let Some(profile) = &key.1 {
            loader = loader.profile_name(profile);
        }
        let client = Client::new(&loader.load().await);
        clients.insert(key, client.clone());
        client
    }
}

impl Default for MetricAlarmClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ResourceClient for MetricAlarmClient {
    fn kind(&self) -> &str {
        KIND
    }

    fn display_name(&self) -> &str {
        "CloudWatch Metrics Alarm"
    }

    fn identity_field(&self) -> &str {
        IDENTITY_FIELD
    }

    async fn create(&self, config: &Record) -> Result<Record, ProviderError> {
        let inputs = AlarmInputs::from_record(config)?;
        let client = self.client_for(config).await;

        inputs
            .put_metric_alarm(&client)?
            .send()
            .await
            .map_err(from_sdk)?;

        tracing::info!(
            "Put metric alarm: {}",
            inputs.alarm_name.as_deref().unwrap_or_default()
        );
        Ok(Record::new())
    }

    async fn describe(&self, config: &Record) -> Result<Record, ProviderError> {
        let inputs = AlarmInputs::from_record(config)?;
        let alarm_name = inputs
            .alarm_name
            .clone()
            .ok_or_else(|| AlarmError::InvalidConfig("missing required input: alarmName".into()))?;
        let client = self.client_for(config).await;

        let output = inputs
            .describe_alarms_for_metric(&client)?
            .send()
            .await
            .map_err(from_sdk)?;
        Ok(select_alarm(output.metric_alarms(), &alarm_name)?)
    }

    async fn delete(&self, identity: &str, state: &Record) -> Result<(), ProviderError> {
        let client = self.client_for(state).await;

        client
            .delete_alarms()
            .alarm_names(identity)
            .send()
            .await
            .map_err(|e| from_delete_error(e, identity))?;

        tracing::info!("Deleted metric alarm: {}", identity);
        Ok(())
    }
}
