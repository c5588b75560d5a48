//! Metric alarm inputs, CloudWatch requests and outputs

use crate::error::{AlarmError, Result};
use aws_sdk_cloudwatch::Client;
use aws_sdk_cloudwatch::operation::describe_alarms_for_metric::builders::DescribeAlarmsForMetricFluentBuilder;
use aws_sdk_cloudwatch::operation::put_metric_alarm::builders::PutMetricAlarmFluentBuilder;
use aws_sdk_cloudwatch::primitives::{DateTime, DateTimeFormat};
use aws_sdk_cloudwatch::types::{ComparisonOperator, Dimension, MetricAlarm, StandardUnit, Statistic};
use rgkit_core::Record;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Component inputs as written in the project configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlarmInputs {
    pub alarm_name: Option<String>,
    pub alarm_description: Option<String>,
    pub comparison_operator: Option<String>,
    pub threshold: Option<f64>,
    pub metric_name: Option<String>,
    pub namespace: Option<String>,
    pub dimensions: Option<Vec<Map<String, Value>>>,
    pub period: Option<i32>,
    pub evaluation_periods: Option<i32>,
    pub actions_enabled: Option<bool>,
    pub ok_actions: Option<Vec<String>>,
    pub alarm_actions: Option<Vec<String>>,
    pub insufficient_data_actions: Option<Vec<String>>,
    pub statistic: Option<String>,
    pub extended_statistic: Option<String>,
    pub unit: Option<String>,
    pub datapoints_to_alarm: Option<i32>,
    pub treat_missing_data: Option<String>,
    pub evaluate_low_sample_count_percentile: Option<String>,
}

impl AlarmInputs {
    pub fn from_record(record: &Record) -> Result<Self> {
        serde_json::from_value(record.clone().into_value())
            .map_err(|e| AlarmError::InvalidConfig(e.to_string()))
    }

    fn require<'a, T>(value: &'a Option<T>, name: &str) -> Result<&'a T> {
        value
            .as_ref()
            .ok_or_else(|| AlarmError::InvalidConfig(format!("missing required input: {}", name)))
    }

    fn dimensions(&self) -> Result<Option<Vec<Dimension>>> {
        self.dimensions
            .as_ref()
            .map(|dims| dims.iter().map(dimension_from_input).collect())
            .transpose()
    }

    fn statistic(&self) -> Option<Statistic> {
        self.statistic.as_deref().map(Statistic::from)
    }

    fn unit(&self) -> Option<StandardUnit> {
        self.unit.as_deref().map(StandardUnit::from)
    }

    /// Build the PutMetricAlarm call
    pub fn put_metric_alarm(&self, client: &Client) -> Result<PutMetricAlarmFluentBuilder> {
        let operator = Self::require(&self.comparison_operator, "comparisonOperator")?;

        Ok(client
            .put_metric_alarm()
            .alarm_name(Self::require(&self.alarm_name, "alarmName")?)
            .comparison_operator(ComparisonOperator::from(operator.as_str()))
            .evaluation_periods(*Self::require(&self.evaluation_periods, "evaluationPeriods")?)
            .metric_name(Self::require(&self.metric_name, "metricName")?)
            .namespace(Self::require(&self.namespace, "namespace")?)
            .period(*Self::require(&self.period, "period")?)
            .threshold(*Self::require(&self.threshold, "threshold")?)
            .set_actions_enabled(self.actions_enabled)
            .set_alarm_actions(self.alarm_actions.clone())
            .set_alarm_description(self.alarm_description.clone())
            .set_datapoints_to_alarm(self.datapoints_to_alarm)
            .set_dimensions(self.dimensions()?)
            .set_evaluate_low_sample_count_percentile(
                self.evaluate_low_sample_count_percentile.clone(),
            )
            .set_extended_statistic(self.extended_statistic.clone())
            .set_insufficient_data_actions(self.insufficient_data_actions.clone())
            .set_ok_actions(self.ok_actions.clone())
            .set_statistic(self.statistic())
            .set_treat_missing_data(self.treat_missing_data.clone())
            .set_unit(self.unit()))
    }

    /// Build the DescribeAlarmsForMetric call
    pub fn describe_alarms_for_metric(
        &self,
        client: &Client,
    ) -> Result<DescribeAlarmsForMetricFluentBuilder> {
        Ok(client
            .describe_alarms_for_metric()
            .metric_name(Self::require(&self.metric_name, "metricName")?)
            .namespace(Self::require(&self.namespace, "namespace")?)
            .set_period(self.period)
            .set_dimensions(self.dimensions()?)
            .set_extended_statistic(self.extended_statistic.clone())
            .set_statistic(self.statistic())
            .set_unit(self.unit()))
    }
}

/// Build a CloudWatch dimension from `{name, value}` or `{Name, Value}`.
///
/// A lower-case key is capitalised unless the capitalised key is already
/// present.
pub fn dimension_from_input(input: &Map<String, Value>) -> Result<Dimension> {
    let mut normalized = Map::new();
    for (key, value) in input {
        let capitalized = capitalize(key);
        if input.contains_key(&capitalized) && capitalized != *key {
            continue;
        }
        normalized.insert(capitalized, value.clone());
    }

    let field = |name: &str| -> Result<String> {
        match normalized.get(name) {
            Some(Value::String(s)) => Ok(s.clone()),
            Some(Value::Number(n)) => Ok(n.to_string()),
            _ => Err(AlarmError::InvalidConfig(format!(
                "dimension is missing {}: {}",
                name,
                Value::Object(input.clone())
            ))),
        }
    };

    Ok(Dimension::builder()
        .name(field("Name")?)
        .value(field("Value")?)
        .build())
}

fn capitalize(key: &str) -> String {
    let mut chars = key.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Attributes recorded in the observed state
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlarmDetails {
    pub alarm_name: String,
    pub alarm_arn: Option<String>,
    pub alarm_configuration_updated_timestamp: Option<String>,
    pub state_value: Option<String>,
    pub state_reason: Option<String>,
    pub state_updated_timestamp: Option<String>,
}

fn timestamp(value: Option<&DateTime>) -> Option<String> {
    value.and_then(|t| t.fmt(DateTimeFormat::DateTime).ok())
}

impl AlarmDetails {
    fn new(alarm_name: &str, alarm: &MetricAlarm) -> Self {
        Self {
            alarm_name: alarm_name.to_string(),
            alarm_arn: alarm.alarm_arn().map(str::to_string),
            alarm_configuration_updated_timestamp: timestamp(
                alarm.alarm_configuration_updated_timestamp(),
            ),
            state_value: alarm.state_value().map(|s| s.as_str().to_string()),
            state_reason: alarm.state_reason().map(str::to_string),
            state_updated_timestamp: timestamp(alarm.state_updated_timestamp()),
        }
    }
}

/// Pick the alarm named `alarm_name` out of a describe response.
///
/// The response covers every alarm attached to the metric, so the match has
/// to be done here.
pub fn select_alarm(alarms: &[MetricAlarm], alarm_name: &str) -> Result<Record> {
    let alarm = alarms
        .iter()
        .find(|a| a.alarm_name() == Some(alarm_name))
        .ok_or_else(|| AlarmError::AlarmNotFound(alarm_name.to_string()))?;

    let details = serde_json::to_value(AlarmDetails::new(alarm_name, alarm))?;
    Ok(Record::new().with("alarm", details))
}

/// Lines shown by `info`
pub fn summary(state: &Record) -> Vec<(&'static str, String)> {
    let alarm = state.get("alarm").cloned().unwrap_or(Value::Null);
    let text = |value: Option<&Value>| {
        value
            .and_then(Value::as_str)
            .unwrap_or("-")
            .to_string()
    };

    vec![
        ("Metric Name", text(state.get("metricName"))),
        ("Namespace", text(state.get("namespace"))),
        ("Alarm Name", text(alarm.get("alarmName"))),
        ("Alarm Arn", text(alarm.get("alarmArn"))),
        ("Alarm State", text(alarm.get("stateValue"))),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use aws_sdk_cloudwatch::config::{BehaviorVersion, Credentials, Region};
    use aws_sdk_cloudwatch::types::StateValue;
    use serde_json::json;

    fn inputs(value: Value) -> AlarmInputs {
        AlarmInputs::from_record(&Record::from_value(value).unwrap()).unwrap()
    }

    fn cpu_alarm() -> AlarmInputs {
        inputs(json!({
            "alarmName": "cpu-high",
            "comparisonOperator": "GreaterThanThreshold",
            "evaluationPeriods": 2,
            "metricName": "CPUUtilization",
            "namespace": "AWS/EC2",
            "period": 300,
            "threshold": 90,
            "statistic": "Average",
            "okActions": ["arn:aws:sns:us-east-1:123456789012:ok"],
            "dimensions": [{"name": "InstanceId", "value": "i-0123456789"}],
            "region": "eu-west-1"
        }))
    }

    fn offline_client() -> Client {
        let config = aws_sdk_cloudwatch::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new("us-east-1"))
            .credentials_provider(Credentials::new("AKID", "SECRET", None, None, "test"))
            .build();
        Client::from_conf(config)
    }

    #[tokio::test]
    async fn test_put_metric_alarm_request() {
        let call = cpu_alarm().put_metric_alarm(&offline_client()).unwrap();
        let input = call.as_input();

        assert_eq!(input.get_alarm_name().as_deref(), Some("cpu-high"));
        assert_eq!(
            input.get_comparison_operator(),
            &Some(ComparisonOperator::GreaterThanThreshold)
        );
        assert_eq!(input.get_threshold(), &Some(90.0));
        assert_eq!(input.get_evaluation_periods(), &Some(2));
        assert_eq!(input.get_statistic(), &Some(Statistic::Average));
        assert_eq!(
            input.get_ok_actions().as_deref(),
            Some(&["arn:aws:sns:us-east-1:123456789012:ok".to_string()][..])
        );
        let dimensions = input.get_dimensions().as_ref().unwrap();
        assert_eq!(dimensions[0].name(), Some("InstanceId"));
        assert_eq!(dimensions[0].value(), Some("i-0123456789"));
        assert!(input.get_alarm_description().is_none());
        assert!(input.get_unit().is_none());
    }

    #[tokio::test]
    async fn test_put_metric_alarm_requires_fields() {
        let err = inputs(json!({"alarmName": "cpu-high", "threshold": 90}))
            .put_metric_alarm(&offline_client())
            .unwrap_err();
        assert!(err.to_string().contains("comparisonOperator"));
    }

    #[tokio::test]
    async fn test_describe_alarms_for_metric_request() {
        let call = cpu_alarm()
            .describe_alarms_for_metric(&offline_client())
            .unwrap();
        let input = call.as_input();

        assert_eq!(input.get_metric_name().as_deref(), Some("CPUUtilization"));
        assert_eq!(input.get_namespace().as_deref(), Some("AWS/EC2"));
        assert_eq!(input.get_period(), &Some(300));
        assert_eq!(input.get_statistic(), &Some(Statistic::Average));

        let err = inputs(json!({"alarmName": "cpu-high"}))
            .describe_alarms_for_metric(&offline_client())
            .unwrap_err();
        assert!(matches!(err, AlarmError::InvalidConfig(_)));
    }

    #[test]
    fn test_dimension_keys_are_capitalized() {
        let mixed: Map<String, Value> =
            serde_json::from_value(json!({"Name": "AutoScalingGroupName", "value": "web"})).unwrap();
        let dim = dimension_from_input(&mixed).unwrap();
        assert_eq!(dim.name(), Some("AutoScalingGroupName"));
        assert_eq!(dim.value(), Some("web"));

        // 既に大文字のキーがある場合はそちらを優先
        let both: Map<String, Value> =
            serde_json::from_value(json!({"name": "lower", "Name": "Upper", "value": 3})).unwrap();
        let dim = dimension_from_input(&both).unwrap();
        assert_eq!(dim.name(), Some("Upper"));
        assert_eq!(dim.value(), Some("3"));

        let broken: Map<String, Value> = serde_json::from_value(json!({"name": "x"})).unwrap();
        assert!(dimension_from_input(&broken).is_err());
    }

    #[test]
    fn test_select_alarm() {
        let alarms = vec![
            MetricAlarm::builder()
                .alarm_name("cpu-low")
                .alarm_arn("arn:low")
                .state_value(StateValue::Ok)
                .build(),
            MetricAlarm::builder()
                .alarm_name("cpu-high")
                .alarm_arn("arn:high")
                .state_value(StateValue::Alarm)
                .state_reason("Threshold Crossed")
                .state_updated_timestamp(DateTime::from_secs(1_700_000_000))
                .threshold(90.0)
                .build(),
        ];

        let record = select_alarm(&alarms, "cpu-high").unwrap();
        let alarm = record.get("alarm").unwrap();
        assert_eq!(alarm["alarmName"], "cpu-high");
        assert_eq!(alarm["alarmArn"], "arn:high");
        assert_eq!(alarm["stateValue"], "ALARM");
        assert_eq!(alarm["stateUpdatedTimestamp"], "2023-11-14T22:13:20Z");
        assert!(alarm["alarmConfigurationUpdatedTimestamp"].is_null());
    }

    #[test]
    fn test_select_alarm_not_found() {
        assert!(matches!(
            select_alarm(&[], "cpu-high"),
            Err(AlarmError::AlarmNotFound(_))
        ));
    }

    #[test]
    fn test_summary() {
        let state = Record::from_value(json!({
            "metricName": "CPUUtilization",
            "namespace": "AWS/EC2",
            "alarm": {"alarmName": "cpu-high", "alarmArn": "arn:high", "stateValue": "OK"}
        }))
        .unwrap();

        let lines = summary(&state);
        assert_eq!(lines[0], ("Metric Name", "CPUUtilization".to_string()));
        assert_eq!(lines[4], ("Alarm State", "OK".to_string()));
        assert_eq!(summary(&Record::new())[3].1, "-");
    }
}
