//! MetricAlarmClient with an injected SDK client

use aws_sdk_cloudwatch::config::retry::RetryConfig;
use aws_sdk_cloudwatch::config::{BehaviorVersion, Credentials, Region};
use rgkit_aws_alarm::MetricAlarmClient;
use rgkit_core::{
    MemoryStateStore, ProviderError, Reconciler, Record, ResourceClient, StateStore,
};
use serde_json::json;

const KEY: &str = "aws-cloudwatch-metric-alarm:cpu";

/// Client whose endpoint refuses connections
fn unreachable_client() -> MetricAlarmClient {
    let config = aws_sdk_cloudwatch::Config::builder()
        .behavior_version(BehaviorVersion::latest())
        .region(Region::new("eu-west-1"))
        .credentials_provider(Credentials::new("AKID", "SECRET", None, None, "test"))
        .endpoint_url("http://127.0.0.1:1")
        .retry_config(RetryConfig::disabled())
        .build();
    MetricAlarmClient::with_client(aws_sdk_cloudwatch::Client::from_conf(config))
}

fn desired() -> Record {
    Record::from_value(json!({
        "alarmName": "cpu-high",
        "comparisonOperator": "GreaterThanThreshold",
        "evaluationPeriods": 1,
        "metricName": "CPUUtilization",
        "namespace": "AWS/EC2",
        "period": 60,
        "threshold": 90,
        "region": "eu-west-1"
    }))
    .unwrap()
}

#[tokio::test]
async fn test_incomplete_inputs_fail_before_any_request() {
    let client = unreachable_client();

    let mut config = desired();
    config.remove("namespace");
    let err = client.create(&config).await.unwrap_err();
    assert!(matches!(err, ProviderError::InvalidConfig(ref m) if m.contains("namespace")));

    let err = client
        .describe(&Record::new().with("alarmName", "cpu-high"))
        .await
        .unwrap_err();
    assert!(matches!(err, ProviderError::InvalidConfig(_)));
}

#[tokio::test]
async fn test_failed_deploy_persists_nothing() {
    let reconciler = Reconciler::new(unreachable_client(), MemoryStateStore::new());

    let err = reconciler.deploy(KEY, &desired()).await.unwrap_err();
    assert!(!err.is_not_found());
    assert!(reconciler.store().load(KEY).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_unreachable_endpoint_keeps_state_on_remove() {
    let reconciler = Reconciler::new(unreachable_client(), MemoryStateStore::new());
    let state = desired().with("alarm", json!({"alarmName": "cpu-high"}));
    reconciler.store().save(KEY, &state).await.unwrap();

    assert!(reconciler.remove(KEY).await.is_err());
    assert_eq!(reconciler.store().load(KEY).await.unwrap(), state);
}
