// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! OTLP/JSON logs payload model.
//!
//! Field names follow the protobuf JSON mapping: camelCase keys, 64-bit integers
//! (`intValue`, `timeUnixNano`) encoded as decimal strings.

use chrono::{DateTime, NaiveDateTime};
use serde::{Serialize, Serializer};

pub const SCOPE_NAME: &str = "alb-log-parser";
pub const SCOPE_VERSION: &str = "1.0.0";

fn as_string<S, T>(value: &T, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
    T: ToString,
{
    serializer.serialize_str(&value.to_string())
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum AnyValue {
    StringValue(String),
    #[serde(serialize_with = "as_string")]
    IntValue(i64),
    DoubleValue(f64),
    BoolValue(bool),
}

impl AnyValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AnyValue::StringValue(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            AnyValue::IntValue(value) => Some(*value),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeyValue {
    pub key: String,
    pub value: AnyValue,
}

impl KeyValue {
    pub fn string(key: &str, value: impl Into<String>) -> Self {
        KeyValue {
            key: key.to_string(),
            value: AnyValue::StringValue(value.into()),
        }
    }

    pub fn int(key: &str, value: i64) -> Self {
        KeyValue {
            key: key.to_string(),
            value: AnyValue::IntValue(value),
        }
    }

    pub fn double(key: &str, value: f64) -> Self {
        KeyValue {
            key: key.to_string(),
            value: AnyValue::DoubleValue(value),
        }
    }
}

/// Looks up an attribute by key.
pub fn find<'a>(attributes: &'a [KeyValue], key: &str) -> Option<&'a AnyValue> {
    attributes.iter().find(|kv| kv.key == key).map(|kv| &kv.value)
}

/// Accumulates attributes, dropping strings that hold the `-`/empty absent sentinel.
#[derive(Debug, Default)]
pub struct Attributes(Vec<KeyValue>);

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn string(mut self, key: &str, value: &str) -> Self {
        if !aws_log_parser::util::is_absent(value) {
            self.0.push(KeyValue::string(key, value));
        }
        self
    }

    pub fn int(mut self, key: &str, value: impl Into<i64>) -> Self {
        self.0.push(KeyValue::int(key, value.into()));
        self
    }

    /// Adds the integer unless it is zero, the coerced absent sentinel.
    pub fn nonzero_int(self, key: &str, value: impl Into<i64>) -> Self {
        let value = value.into();
        if value == 0 {
            return self;
        }
        self.int(key, value)
    }

    pub fn double(mut self, key: &str, value: f64) -> Self {
        self.0.push(KeyValue::double(key, value));
        self
    }

    pub fn build(self) -> Vec<KeyValue> {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Warn,
    Error,
}

impl Severity {
    pub fn number(self) -> i32 {
        match self {
            Severity::Info => 9,
            Severity::Warn => 13,
            Severity::Error => 17,
        }
    }

    pub fn text(self) -> &'static str {
        match self {
            Severity::Info => "INFO",
            Severity::Warn => "WARN",
            Severity::Error => "ERROR",
        }
    }

    /// Severity of an HTTP response status. Zero means not reported.
    pub fn from_http_status(status: i32) -> Option<Severity> {
        match status {
            0 => None,
            s if s >= 500 => Some(Severity::Error),
            s if s >= 400 => Some(Severity::Warn),
            _ => Some(Severity::Info),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogRecord {
    #[serde(serialize_with = "as_string")]
    pub time_unix_nano: u64,
    #[serde(serialize_with = "as_string")]
    pub observed_time_unix_nano: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub severity_number: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub severity_text: Option<String>,
    pub body: AnyValue,
    pub attributes: Vec<KeyValue>,
}

impl LogRecord {
    pub fn new(time_unix_nano: u64, body: String, attributes: Vec<KeyValue>) -> Self {
        LogRecord {
            time_unix_nano,
            observed_time_unix_nano: now_unix_nano(),
            severity_number: None,
            severity_text: None,
            body: AnyValue::StringValue(body),
            attributes,
        }
    }

    pub fn with_severity(mut self, severity: Option<Severity>) -> Self {
        self.severity_number = severity.map(Severity::number);
        self.severity_text = severity.map(|s| s.text().to_string());
        self
    }

    pub fn attribute(&self, key: &str) -> Option<&AnyValue> {
        find(&self.attributes, key)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Resource {
    pub attributes: Vec<KeyValue>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Scope {
    pub name: String,
    pub version: String,
}

impl Default for Scope {
    fn default() -> Self {
        Scope {
            name: SCOPE_NAME.to_string(),
            version: SCOPE_VERSION.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScopeLogs {
    pub scope: Scope,
    pub log_records: Vec<LogRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceLogs {
    pub resource: Resource,
    pub scope_logs: Vec<ScopeLogs>,
}

/// One OTLP export request. Always carries exactly one resource.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogsPayload {
    pub resource_logs: Vec<ResourceLogs>,
}

impl LogsPayload {
    pub fn new(resource_attributes: Vec<KeyValue>, log_records: Vec<LogRecord>) -> Self {
        LogsPayload {
            resource_logs: vec![ResourceLogs {
                resource: Resource {
                    attributes: resource_attributes,
                },
                scope_logs: vec![ScopeLogs {
                    scope: Scope::default(),
                    log_records,
                }],
            }],
        }
    }

    pub fn record_count(&self) -> usize {
        self.resource_logs
            .iter()
            .flat_map(|r| r.scope_logs.iter())
            .map(|s| s.log_records.len())
            .sum()
    }
}

fn now_unix_nano() -> u64 {
    chrono::Utc::now()
        .timestamp_nanos_opt()
        .and_then(|n| u64::try_from(n).ok())
        .unwrap_or_default()
}

/// RFC 3339 timestamp to Unix nanoseconds, zero when unparseable.
pub fn rfc3339_to_unix_nano(value: &str) -> u64 {
    DateTime::parse_from_rfc3339(value)
        .ok()
        .and_then(|t| t.timestamp_nanos_opt())
        .and_then(|n| u64::try_from(n).ok())
        .unwrap_or_default()
}

/// Separate UTC `YYYY-MM-DD` and `HH:MM:SS` columns to Unix nanoseconds.
pub fn date_time_to_unix_nano(date: &str, time: &str) -> u64 {
    NaiveDateTime::parse_from_str(&format!("{date} {time}"), "%Y-%m-%d %H:%M:%S")
        .ok()
        .and_then(|t| t.and_utc().timestamp_nanos_opt())
        .and_then(|n| u64::try_from(n).ok())
        .unwrap_or_default()
}

pub fn millis_to_unix_nano(millis: i64) -> u64 {
    u64::try_from(millis)
        .ok()
        .and_then(|m| m.checked_mul(1_000_000))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_payload_wire_shape() {
        let record = LogRecord {
            time_unix_nano: 1_530_570_180_186_641_000,
            observed_time_unix_nano: 1,
            severity_number: Some(9),
            severity_text: Some("INFO".to_string()),
            body: AnyValue::StringValue("GET / 200".to_string()),
            attributes: vec![
                KeyValue::int("http.response.status_code", 200),
                KeyValue::double("aws.alb.request_processing_time", 0.5),
            ],
        };
        let payload = LogsPayload::new(
            vec![KeyValue::string("cloud.provider", "aws")],
            vec![record],
        );

        let value = serde_json::to_value(&payload).expect("serialize");
        assert_eq!(
            value,
            json!({
                "resourceLogs": [{
                    "resource": {
                        "attributes": [{"key": "cloud.provider", "value": {"stringValue": "aws"}}]
                    },
                    "scopeLogs": [{
                        "scope": {"name": "alb-log-parser", "version": "1.0.0"},
                        "logRecords": [{
                            "timeUnixNano": "1530570180186641000",
                            "observedTimeUnixNano": "1",
                            "severityNumber": 9,
                            "severityText": "INFO",
                            "body": {"stringValue": "GET / 200"},
                            "attributes": [
                                {"key": "http.response.status_code", "value": {"intValue": "200"}},
                                {"key": "aws.alb.request_processing_time", "value": {"doubleValue": 0.5}}
                            ]
                        }]
                    }]
                }]
            })
        );
        assert_eq!(payload.record_count(), 1);
    }

    #[test]
    fn test_unset_severity_is_omitted() {
        let record = LogRecord::new(0, "body".to_string(), vec![]).with_severity(None);
        let value = serde_json::to_value(&record).expect("serialize");
        assert!(value.get("severityNumber").is_none());
        assert!(value.get("severityText").is_none());
    }

    #[test]
    fn test_severity_from_http_status() {
        assert_eq!(Severity::from_http_status(0), None);
        assert_eq!(Severity::from_http_status(200), Some(Severity::Info));
        assert_eq!(Severity::from_http_status(302), Some(Severity::Info));
        assert_eq!(Severity::from_http_status(404), Some(Severity::Warn));
        assert_eq!(Severity::from_http_status(503), Some(Severity::Error));
        assert_eq!(Severity::Warn.number(), 13);
        assert_eq!(Severity::Error.number(), 17);
    }

    #[test]
    fn test_attributes_drop_absent_strings() {
        let attributes = Attributes::new()
            .string("a", "-")
            .string("b", "")
            .string("c", "value")
            .nonzero_int("d", 0)
            .nonzero_int("e", 7)
            .build();
        assert_eq!(
            attributes,
            vec![KeyValue::string("c", "value"), KeyValue::int("e", 7)]
        );
    }

    #[test]
    fn test_timestamps() {
        assert_eq!(
            rfc3339_to_unix_nano("2018-07-02T22:23:00.186641Z"),
            1_530_570_180_186_641_000
        );
        assert_eq!(
            date_time_to_unix_nano("2019-12-04", "21:02:31"),
            1_575_493_351_000_000_000
        );
        assert_eq!(millis_to_unix_nano(1_576_280_412_771), 1_576_280_412_771_000_000);
        assert_eq!(rfc3339_to_unix_nano("-"), 0);
        assert_eq!(date_time_to_unix_nano("bad", "date"), 0);
        assert_eq!(millis_to_unix_nano(-5), 0);
    }
}
