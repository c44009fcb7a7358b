use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;
use std::time::Duration;

/// Aggregation applied to the in-window samples of a watch rule.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Statistic {
    Minimum,
    Maximum,
    Average,
    Sum,
    SampleCount,
}

/// Comparison between the aggregated statistic and the threshold.
///
/// Operators this engine does not know are kept verbatim as `Unsupported` and
/// never alarm.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ComparisonOperator {
    GreaterThanThreshold,
    GreaterThanOrEqualToThreshold,
    LessThanThreshold,
    LessThanOrEqualToThreshold,
    Unsupported(String),
}

impl ComparisonOperator {
    pub fn as_str(&self) -> &str {
        match self {
            ComparisonOperator::GreaterThanThreshold => "GreaterThanThreshold",
            ComparisonOperator::GreaterThanOrEqualToThreshold => "GreaterThanOrEqualToThreshold",
            ComparisonOperator::LessThanThreshold => "LessThanThreshold",
            ComparisonOperator::LessThanOrEqualToThreshold => "LessThanOrEqualToThreshold",
            ComparisonOperator::Unsupported(name) => name,
        }
    }

    pub fn compare(&self, value: f64, threshold: f64) -> bool {
        match self {
            ComparisonOperator::GreaterThanThreshold => value > threshold,
            ComparisonOperator::GreaterThanOrEqualToThreshold => value >= threshold,
            ComparisonOperator::LessThanThreshold => value < threshold,
            ComparisonOperator::LessThanOrEqualToThreshold => value <= threshold,
            ComparisonOperator::Unsupported(_) => false,
        }
    }
}

impl From<String> for ComparisonOperator {
    fn from(name: String) -> Self {
        match name.as_str() {
            "GreaterThanThreshold" => ComparisonOperator::GreaterThanThreshold,
            "GreaterThanOrEqualToThreshold" => ComparisonOperator::GreaterThanOrEqualToThreshold,
            "LessThanThreshold" => ComparisonOperator::LessThanThreshold,
            "LessThanOrEqualToThreshold" => ComparisonOperator::LessThanOrEqualToThreshold,
            _ => ComparisonOperator::Unsupported(name),
        }
    }
}

impl From<ComparisonOperator> for String {
    fn from(op: ComparisonOperator) -> Self {
        match op {
            ComparisonOperator::Unsupported(name) => name,
            known => known.as_str().to_owned(),
        }
    }
}

impl std::fmt::Display for ComparisonOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum WatchState {
    Alarm,
    Normal,
    Nodata,
}

impl WatchState {
    pub const ALL: [WatchState; 3] = [WatchState::Alarm, WatchState::Normal, WatchState::Nodata];

    pub fn as_str(self) -> &'static str {
        match self {
            WatchState::Alarm => "ALARM",
            WatchState::Normal => "NORMAL",
            WatchState::Nodata => "NODATA",
        }
    }
}

impl std::fmt::Display for WatchState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WatchState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        WatchState::ALL
            .into_iter()
            .find(|state| state.as_str() == s)
            .ok_or_else(|| s.to_owned())
    }
}

/// Persisted definition of a watch rule, in the CloudWatch-style key spelling
/// templates use (`MetricName`, `ComparisonOperator`, `OKActions`, ...).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct WatchRuleSpec {
    pub metric_name: String,
    pub statistic: Statistic,
    pub comparison_operator: ComparisonOperator,
    #[serde(deserialize_with = "number_or_string")]
    pub threshold: f64,
    /// Window length in seconds.
    #[serde(deserialize_with = "seconds_or_string")]
    pub period: u64,
    #[serde(
        default,
        deserialize_with = "optional_seconds_or_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub evaluation_periods: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alarm_actions: Option<Vec<String>>,
    #[serde(
        default,
        rename = "OKActions",
        skip_serializing_if = "Option::is_none"
    )]
    pub ok_actions: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insufficient_data_actions: Option<Vec<String>>,
}

impl WatchRuleSpec {
    pub fn new(
        metric_name: impl Into<String>,
        statistic: Statistic,
        comparison_operator: ComparisonOperator,
        threshold: f64,
        period: u64,
    ) -> Self {
        Self {
            metric_name: metric_name.into(),
            statistic,
            comparison_operator,
            threshold,
            period,
            evaluation_periods: None,
            alarm_actions: None,
            ok_actions: None,
            insufficient_data_actions: None,
        }
    }

    pub fn period(&self) -> Duration {
        Duration::from_secs(self.period)
    }

    /// Action resource names configured for a state, `None` when the state has no
    /// action list at all.
    pub fn actions_for(&self, state: WatchState) -> Option<&[String]> {
        match state {
            WatchState::Alarm => self.alarm_actions.as_deref(),
            WatchState::Normal => self.ok_actions.as_deref(),
            WatchState::Nodata => self.insufficient_data_actions.as_deref(),
        }
    }
}

/// One metric reading in a data submission, e.g. `{"Value": 1, "Unit": "Count"}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct MetricSample {
    #[serde(deserialize_with = "number_or_string")]
    pub value: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

impl MetricSample {
    pub fn new(value: f64, unit: Option<&str>) -> Self {
        Self {
            value,
            unit: unit.map(str::to_owned),
        }
    }
}

/// Metric name to reading, as submitted for one point in time.
pub type MetricData = BTreeMap<String, MetricSample>;

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Number(f64),
    String(String),
}

fn number_or_string<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    match NumberOrString::deserialize(deserializer)? {
        NumberOrString::Number(n) => Ok(n),
        NumberOrString::String(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}

fn seconds_or_string<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = number_or_string(deserializer)?;
    if value < 0.0 || value.fract() != 0.0 {
        return Err(serde::de::Error::custom(format!(
            "expected a whole number of seconds, got {value}"
        )));
    }
    Ok(value as u64)
}

fn optional_seconds_or_string<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    seconds_or_string(deserializer).map(Some)
}
