// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use aws_log_parser::WafLogEntry;

use super::{with_cloud_context, KeyContext};
use crate::otel::{millis_to_unix_nano, Attributes, KeyValue, LogRecord, Severity};

pub fn resource_key(entry: &WafLogEntry) -> String {
    entry.webacl_id.clone()
}

pub fn resource_attributes(entry: &WafLogEntry, context: &KeyContext) -> Vec<KeyValue> {
    let attributes = vec![
        KeyValue::string("cloud.provider", "aws"),
        KeyValue::string("cloud.platform", "aws_waf"),
        KeyValue::string("cloud.service", "waf"),
        KeyValue::string("aws.waf.web_acl_id", entry.webacl_id.as_str()),
    ];

    match entry.web_acl_location() {
        Some(location) => {
            with_cloud_context(attributes, &location.account_id, &location.region, context)
        }
        None => with_cloud_context(attributes, "", "", context),
    }
}

fn severity(action: &str) -> Severity {
    match action {
        "BLOCK" | "CAPTCHA" | "CHALLENGE" => Severity::Warn,
        _ => Severity::Info,
    }
}

pub fn to_otel(entry: &WafLogEntry) -> LogRecord {
    let request = &entry.http_request;
    let body = format!(
        "{} {} {}{} rule={}",
        entry.action,
        request.http_method,
        request.host(),
        request.uri,
        entry.terminating_rule_id
    );
    let labels = entry
        .labels
        .iter()
        .map(|label| label.name.as_str())
        .collect::<Vec<_>>()
        .join(",");

    let attributes = Attributes::new()
        .string("http.request.method", &request.http_method)
        .string("url.path", &request.uri)
        .string("url.query", &request.args)
        .string("network.protocol.version", &request.http_version)
        .string("client.address", &request.client_ip)
        .string("client.geo.country.iso_code", &request.country)
        .string("server.address", request.host())
        .string(
            "user_agent.original",
            request.header("user-agent").unwrap_or_default(),
        )
        .nonzero_int("http.response.status_code", entry.response_code_sent)
        .string("aws.waf.action", &entry.action)
        .string("aws.waf.web_acl_id", &entry.webacl_id)
        .string("aws.waf.terminating_rule_id", &entry.terminating_rule_id)
        .string("aws.waf.terminating_rule_type", &entry.terminating_rule_type)
        .string("aws.waf.http_source_name", &entry.http_source_name)
        .string("aws.waf.http_source_id", &entry.http_source_id)
        .string("aws.waf.request_id", &request.request_id)
        .string("aws.waf.labels", &labels)
        .nonzero_int("aws.waf.format_version", entry.format_version)
        .build();

    LogRecord::new(millis_to_unix_nano(entry.timestamp), body, attributes)
        .with_severity(Some(severity(&entry.action)))
}
