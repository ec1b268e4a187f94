// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Application Load Balancer access logs.
//!
//! The layout is space delimited with a handful of double-quoted fields (request line,
//! user agent, trace id, ...). A target that never received the request is logged as
//! `-` instead of `ip:port`, and processing times of `-1` mean the request was not
//! dispatched; both are kept as logged.

use std::sync::OnceLock;

use regex::{Captures, Regex};

use crate::errors::ParseError;
use crate::util::{is_skippable, parse_float, parse_int, parse_small_int};
use crate::{LogFormat, OnMalformed, ParseLine};

const ALB_LOG_PATTERN: &str = concat!(
    r"^(?P<type>[^ ]*) (?P<time>[^ ]*) (?P<elb>[^ ]*) ",
    r"(?P<client_ip>[^ ]*):(?P<client_port>[0-9]*) ",
    r"(?P<target_ip>[^ ]*)[:-](?P<target_port>[0-9]*) ",
    r"(?P<request_processing_time>[-.0-9]*) (?P<target_processing_time>[-.0-9]*) ",
    r"(?P<response_processing_time>[-.0-9]*) ",
    r"(?P<elb_status_code>|[-0-9]*) (?P<target_status_code>-|[-0-9]*) ",
    r"(?P<received_bytes>[-0-9]*) (?P<sent_bytes>[-0-9]*) ",
    r#""(?P<request_method>[^ ]*) (?P<request_url>.*) (?P<request_protocol>- |[^ ]*)" "#,
    r#""(?P<user_agent>[^"]*)" (?P<ssl_cipher>[A-Z0-9-_]+) (?P<ssl_protocol>[A-Za-z0-9.-]*) "#,
    r#"(?P<target_group_arn>[^ ]*) "(?P<trace_id>[^"]*)" "(?P<domain_name>[^"]*)" "#,
    r#""(?P<chosen_cert_arn>[^"]*)" (?P<matched_rule_priority>[-.0-9]*) "#,
    r#"(?P<request_creation_time>[^ ]*) "(?P<actions_executed>[^"]*)" "#,
    r#""(?P<redirect_url>[^"]*)" "(?P<error_reason>[^ ]*)" "#,
    r#""(?P<target_port_list>[^\s]+?)" "(?P<target_status_code_list>[^\s]+)" "#,
    r#""(?P<classification>[^ ]*)" "(?P<classification_reason>[^ ]*)""#,
    r"(?: (?P<conn_trace_id>[^ ]*))?",
);

fn pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    #[allow(clippy::expect_used)]
    PATTERN.get_or_init(|| Regex::new(ALB_LOG_PATTERN).expect("ALB log pattern is valid"))
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AlbLogEntry {
    pub r#type: String,
    pub time: String,
    pub elb: String,
    pub client_ip: String,
    pub client_port: i32,
    pub target_ip: String,
    pub target_port: i32,
    pub request_processing_time: f64,
    pub target_processing_time: f64,
    pub response_processing_time: f64,
    pub elb_status_code: i32,
    pub target_status_code: i32,
    pub received_bytes: i64,
    pub sent_bytes: i64,
    pub request_method: String,
    pub request_url: String,
    pub request_protocol: String,
    pub user_agent: String,
    pub ssl_cipher: String,
    pub ssl_protocol: String,
    pub target_group_arn: String,
    pub trace_id: String,
    pub domain_name: String,
    pub chosen_cert_arn: String,
    pub matched_rule_priority: String,
    pub request_creation_time: String,
    pub actions_executed: String,
    pub redirect_url: String,
    pub error_reason: String,
    pub target_port_list: String,
    pub target_status_code_list: String,
    pub classification: String,
    pub classification_reason: String,
    pub conn_trace_id: String,
}

fn text(captures: &Captures<'_>, name: &str) -> String {
    captures
        .name(name)
        .map(|m| m.as_str().trim_end().to_string())
        .unwrap_or_default()
}

fn field<'a>(captures: &Captures<'a>, name: &str) -> &'a str {
    captures.name(name).map_or("", |m| m.as_str())
}

/// Parses a single ALB log line.
pub fn parse_line(line: &str) -> Result<Option<AlbLogEntry>, ParseError> {
    let line = line.trim();
    if is_skippable(line) {
        return Ok(None);
    }

    let captures = pattern().captures(line).ok_or(ParseError::NoMatch {
        format: LogFormat::Alb,
    })?;

    Ok(Some(AlbLogEntry {
        r#type: text(&captures, "type"),
        time: text(&captures, "time"),
        elb: text(&captures, "elb"),
        client_ip: text(&captures, "client_ip"),
        client_port: parse_small_int(field(&captures, "client_port")),
        target_ip: text(&captures, "target_ip"),
        target_port: parse_small_int(field(&captures, "target_port")),
        request_processing_time: parse_float(field(&captures, "request_processing_time")),
        target_processing_time: parse_float(field(&captures, "target_processing_time")),
        response_processing_time: parse_float(field(&captures, "response_processing_time")),
        elb_status_code: parse_small_int(field(&captures, "elb_status_code")),
        target_status_code: parse_small_int(field(&captures, "target_status_code")),
        received_bytes: parse_int(field(&captures, "received_bytes")),
        sent_bytes: parse_int(field(&captures, "sent_bytes")),
        request_method: text(&captures, "request_method"),
        request_url: text(&captures, "request_url"),
        request_protocol: text(&captures, "request_protocol"),
        user_agent: text(&captures, "user_agent"),
        ssl_cipher: text(&captures, "ssl_cipher"),
        ssl_protocol: text(&captures, "ssl_protocol"),
        target_group_arn: text(&captures, "target_group_arn"),
        trace_id: text(&captures, "trace_id"),
        domain_name: text(&captures, "domain_name"),
        chosen_cert_arn: text(&captures, "chosen_cert_arn"),
        matched_rule_priority: text(&captures, "matched_rule_priority"),
        request_creation_time: text(&captures, "request_creation_time"),
        actions_executed: text(&captures, "actions_executed"),
        redirect_url: text(&captures, "redirect_url"),
        error_reason: text(&captures, "error_reason"),
        target_port_list: text(&captures, "target_port_list"),
        target_status_code_list: text(&captures, "target_status_code_list"),
        classification: text(&captures, "classification"),
        classification_reason: text(&captures, "classification_reason"),
        conn_trace_id: text(&captures, "conn_trace_id"),
    }))
}

impl ParseLine for AlbLogEntry {
    const FORMAT: LogFormat = LogFormat::Alb;
    const ON_MALFORMED: OnMalformed = OnMalformed::Skip;

    fn parse_line(line: &str) -> Result<Option<Self>, ParseError> {
        parse_line(line)
    }
}
