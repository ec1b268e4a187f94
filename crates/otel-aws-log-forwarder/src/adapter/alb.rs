// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use aws_log_parser::AlbLogEntry;

use super::arn::Arn;
use super::{first_present, with_cloud_context, KeyContext};
use crate::otel::{rfc3339_to_unix_nano, Attributes, KeyValue, LogRecord, Severity};

/// Target group, else the negotiated certificate, else the load balancer id.
pub fn resource_key(entry: &AlbLogEntry) -> String {
    first_present(&[
        entry.target_group_arn.as_str(),
        entry.chosen_cert_arn.as_str(),
        entry.elb.as_str(),
    ])
}

pub fn resource_attributes(entry: &AlbLogEntry, context: &KeyContext) -> Vec<KeyValue> {
    let attributes = Attributes::new()
        .string("cloud.provider", "aws")
        .string("cloud.platform", "aws_elastic_load_balancing")
        .string("cloud.service", "elasticloadbalancing")
        .string("aws.alb.name", &entry.elb)
        .string("aws.alb.target_group.arn", &entry.target_group_arn)
        .build();

    let arn = [&entry.target_group_arn, &entry.chosen_cert_arn]
        .into_iter()
        .find_map(|value| Arn::parse(value));
    let (account, region) = arn.map_or(("", ""), |arn| (arn.account_id, arn.region));
    with_cloud_context(attributes, account, region, context)
}

pub fn to_otel(entry: &AlbLogEntry) -> LogRecord {
    let body = format!(
        "{} {} {} {}",
        entry.request_method, entry.request_url, entry.request_protocol, entry.elb_status_code
    );

    let attributes = Attributes::new()
        .string("http.request.method", &entry.request_method)
        .string("url.full", &entry.request_url)
        .string("aws.alb.type", &entry.r#type)
        .string("aws.alb.request_protocol", &entry.request_protocol)
        .nonzero_int("http.response.status_code", entry.elb_status_code)
        .string("client.address", &entry.client_ip)
        .nonzero_int("client.port", entry.client_port)
        .string("server.address", &entry.domain_name)
        .string("user_agent.original", &entry.user_agent)
        .string("tls.cipher", &entry.ssl_cipher)
        .string("tls.protocol.version", &entry.ssl_protocol)
        .string("aws.alb.name", &entry.elb)
        .string("aws.alb.target.address", &entry.target_ip)
        .nonzero_int("aws.alb.target.port", entry.target_port)
        .nonzero_int("aws.alb.target.status_code", entry.target_status_code)
        .double("aws.alb.request_processing_time", entry.request_processing_time)
        .double("aws.alb.target_processing_time", entry.target_processing_time)
        .double("aws.alb.response_processing_time", entry.response_processing_time)
        .int("aws.alb.received_bytes", entry.received_bytes)
        .int("aws.alb.sent_bytes", entry.sent_bytes)
        .string("aws.alb.target_group.arn", &entry.target_group_arn)
        .string("aws.alb.trace_id", &entry.trace_id)
        .string("aws.alb.chosen_cert.arn", &entry.chosen_cert_arn)
        .string("aws.alb.matched_rule_priority", &entry.matched_rule_priority)
        .string("aws.alb.request_creation_time", &entry.request_creation_time)
        .string("aws.alb.actions_executed", &entry.actions_executed)
        .string("aws.alb.redirect_url", &entry.redirect_url)
        .string("aws.alb.error_reason", &entry.error_reason)
        .string("aws.alb.target_port_list", &entry.target_port_list)
        .string("aws.alb.target_status_code_list", &entry.target_status_code_list)
        .string("aws.alb.classification", &entry.classification)
        .string("aws.alb.classification_reason", &entry.classification_reason)
        .string("aws.alb.conn_trace_id", &entry.conn_trace_id)
        .build();

    LogRecord::new(rfc3339_to_unix_nano(&entry.time), body, attributes)
        .with_severity(Severity::from_http_status(entry.elb_status_code))
}
