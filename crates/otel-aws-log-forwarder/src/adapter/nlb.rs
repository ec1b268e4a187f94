// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use aws_log_parser::util::is_absent;
use aws_log_parser::NlbLogEntry;

use super::arn::Arn;
use super::{first_present, with_cloud_context, KeyContext};
use crate::otel::{rfc3339_to_unix_nano, Attributes, KeyValue, LogRecord, Severity};

/// Load balancer id, else listener id, else the negotiated certificate.
pub fn resource_key(entry: &NlbLogEntry) -> String {
    first_present(&[
        entry.elb.as_str(),
        entry.listener_id.as_str(),
        entry.chosen_cert_arn.as_str(),
    ])
}

pub fn resource_attributes(entry: &NlbLogEntry, context: &KeyContext) -> Vec<KeyValue> {
    let attributes = Attributes::new()
        .string("cloud.provider", "aws")
        .string("cloud.platform", "aws_elastic_load_balancing")
        .string("cloud.service", "elasticloadbalancing")
        .string("aws.nlb.name", &entry.elb)
        .string("aws.nlb.listener.id", &entry.listener_id)
        .build();

    let (account, region) =
        Arn::parse(&entry.chosen_cert_arn).map_or(("", ""), |arn| (arn.account_id, arn.region));
    with_cloud_context(attributes, account, region, context)
}

/// A TLS alert from the client means the handshake went wrong.
fn severity(entry: &NlbLogEntry) -> Severity {
    if is_absent(&entry.incoming_tls_alert) {
        Severity::Info
    } else {
        Severity::Warn
    }
}

pub fn to_otel(entry: &NlbLogEntry) -> LogRecord {
    let body = format!(
        "{} {}:{} -> {}:{} {} {}",
        entry.r#type,
        entry.client_ip,
        entry.client_port,
        entry.target_ip,
        entry.target_port,
        entry.tls_protocol_version,
        entry.tls_cipher
    );

    let attributes = Attributes::new()
        .string("client.address", &entry.client_ip)
        .nonzero_int("client.port", entry.client_port)
        .string("server.address", &entry.domain_name)
        .string("tls.cipher", &entry.tls_cipher)
        .string("tls.protocol.version", &entry.tls_protocol_version)
        .string("tls.curve", &entry.tls_named_group)
        .string("tls.next_protocol", &entry.alpn_protocol)
        .string("aws.nlb.type", &entry.r#type)
        .string("aws.nlb.version", &entry.version)
        .string("aws.nlb.name", &entry.elb)
        .string("aws.nlb.listener.id", &entry.listener_id)
        .string("aws.nlb.target.address", &entry.target_ip)
        .nonzero_int("aws.nlb.target.port", entry.target_port)
        .double("aws.nlb.connection_time", entry.connection_time)
        .double("aws.nlb.tls_handshake_time", entry.tls_handshake_time)
        .int("aws.nlb.received_bytes", entry.received_bytes)
        .int("aws.nlb.sent_bytes", entry.sent_bytes)
        .string("aws.nlb.incoming_tls_alert", &entry.incoming_tls_alert)
        .string("aws.nlb.chosen_cert.arn", &entry.chosen_cert_arn)
        .string("aws.nlb.chosen_cert.serial", &entry.chosen_cert_serial)
        .string(
            "aws.nlb.alpn_client_preference_list",
            &entry.alpn_client_preference_list,
        )
        .double("aws.nlb.tls_connection_creation_time", entry.tls_handshake_time_ms)
        .build();

    LogRecord::new(rfc3339_to_unix_nano(&entry.time), body, attributes)
        .with_severity(Some(severity(entry)))
}
