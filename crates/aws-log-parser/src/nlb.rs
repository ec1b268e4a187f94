// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Network Load Balancer TLS access logs.
//!
//! Records are space delimited and matched against a single pattern anchored at the
//! start of the line. A record that does not match is rejected as a whole; fields are
//! never extracted on a best-effort basis.

use std::sync::OnceLock;

use regex::{Captures, Regex};

use crate::errors::ParseError;
use crate::util::{is_skippable, parse_float, parse_int, parse_small_int};
use crate::{LogFormat, OnMalformed, ParseLine};

/// type version time elb listener client:port destination:port connection_time
/// tls_handshake_time received_bytes sent_bytes incoming_tls_alert chosen_cert_arn
/// chosen_cert_serial tls_cipher tls_protocol_version tls_named_group domain_name
/// alpn_fe_protocol alpn_client_preference_list tls_connection_creation_time
const NLB_LOG_PATTERN: &str = concat!(
    r"^(?P<type>[^ ]*) (?P<version>[^ ]*) (?P<time>[^ ]*) (?P<elb>[^ ]*) (?P<listener>[^ ]*) ",
    r"(?P<client_ip>[^ ]*):(?P<client_port>[0-9]*) (?P<target_ip>[^ ]*):(?P<target_port>[0-9]*) ",
    r"(?P<connection_time>[-.0-9]*) (?P<tls_handshake_time>[-.0-9]*) ",
    r"(?P<received_bytes>[-0-9]*) (?P<sent_bytes>[-0-9]*) ",
    r"(?P<incoming_tls_alert>[^ ]*) (?P<chosen_cert_arn>[^ ]*) (?P<chosen_cert_serial>[^ ]*) ",
    r"(?P<tls_cipher>[^ ]*) (?P<tls_protocol_version>[^ ]*) (?P<tls_named_group>[^ ]*) ",
    r"(?P<domain_name>[^ ]*) (?P<alpn_protocol>[^ ]*) (?P<alpn_client_preference_list>[^ ]*) ",
    r"(?P<tls_handshake_time_ms>[-.0-9]*)",
);

fn pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    #[allow(clippy::expect_used)]
    PATTERN.get_or_init(|| Regex::new(NLB_LOG_PATTERN).expect("NLB log pattern is valid"))
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NlbLogEntry {
    pub r#type: String,
    pub version: String,
    pub time: String,
    pub elb: String,
    pub listener_id: String,
    pub client_ip: String,
    pub client_port: i32,
    pub target_ip: String,
    pub target_port: i32,
    pub connection_time: f64,
    pub tls_handshake_time: f64,
    pub received_bytes: i64,
    pub sent_bytes: i64,
    pub incoming_tls_alert: String,
    pub chosen_cert_arn: String,
    pub chosen_cert_serial: String,
    pub tls_cipher: String,
    pub tls_protocol_version: String,
    pub tls_named_group: String,
    pub domain_name: String,
    pub alpn_protocol: String,
    pub alpn_client_preference_list: String,
    pub tls_handshake_time_ms: f64,
}

fn text(captures: &Captures<'_>, name: &str) -> String {
    captures
        .name(name)
        .map(|m| m.as_str().to_string())
        .unwrap_or_default()
}

fn field<'a>(captures: &Captures<'a>, name: &str) -> &'a str {
    captures.name(name).map_or("", |m| m.as_str())
}

/// Parses a single NLB log line.
pub fn parse_line(line: &str) -> Result<Option<NlbLogEntry>, ParseError> {
    let line = line.trim();
    if is_skippable(line) {
        return Ok(None);
    }

    let captures = pattern().captures(line).ok_or(ParseError::NoMatch {
        format: LogFormat::Nlb,
    })?;

    Ok(Some(NlbLogEntry {
        r#type: text(&captures, "type"),
        version: text(&captures, "version"),
        time: text(&captures, "time"),
        elb: text(&captures, "elb"),
        listener_id: text(&captures, "listener"),
        client_ip: text(&captures, "client_ip"),
        client_port: parse_small_int(field(&captures, "client_port")),
        target_ip: text(&captures, "target_ip"),
        target_port: parse_small_int(field(&captures, "target_port")),
        connection_time: parse_float(field(&captures, "connection_time")),
        tls_handshake_time: parse_float(field(&captures, "tls_handshake_time")),
        received_bytes: parse_int(field(&captures, "received_bytes")),
        sent_bytes: parse_int(field(&captures, "sent_bytes")),
        incoming_tls_alert: text(&captures, "incoming_tls_alert"),
        chosen_cert_arn: text(&captures, "chosen_cert_arn"),
        chosen_cert_serial: text(&captures, "chosen_cert_serial"),
        tls_cipher: text(&captures, "tls_cipher"),
        tls_protocol_version: text(&captures, "tls_protocol_version"),
        tls_named_group: text(&captures, "tls_named_group"),
        domain_name: text(&captures, "domain_name"),
        alpn_protocol: text(&captures, "alpn_protocol"),
        alpn_client_preference_list: text(&captures, "alpn_client_preference_list"),
        tls_handshake_time_ms: parse_float(field(&captures, "tls_handshake_time_ms")),
    }))
}

impl ParseLine for NlbLogEntry {
    const FORMAT: LogFormat = LogFormat::Nlb;
    const ON_MALFORMED: OnMalformed = OnMalformed::Skip;

    fn parse_line(line: &str) -> Result<Option<Self>, ParseError> {
        parse_line(line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TLS_LINE: &str = "tls 2.0 2023-10-01T00:00:00.000000Z app/net-lb/1234567890abcdef listener/net-lb/1234567890abcdef/1234567890abcdef 1.2.3.4:12345 5.6.7.8:80 0.001 0.002 100 200 - arn:aws:acm:us-east-1:123456789012:certificate/12345678-1234-1234-1234-123456789012 - ECDHE-RSA-AES128-GCM-SHA256 TLSv1.2 - example.com h2 - 2.000";

    #[test]
    fn test_parse_tls_line() {
        let entry = parse_line(TLS_LINE)
            .expect("valid line")
            .expect("entry present");

        assert_eq!(entry.r#type, "tls");
        assert_eq!(entry.version, "2.0");
        assert_eq!(entry.time, "2023-10-01T00:00:00.000000Z");
        assert_eq!(entry.elb, "app/net-lb/1234567890abcdef");
        assert_eq!(
            entry.listener_id,
            "listener/net-lb/1234567890abcdef/1234567890abcdef"
        );
        assert_eq!(entry.client_ip, "1.2.3.4");
        assert_eq!(entry.client_port, 12345);
        assert_eq!(entry.target_ip, "5.6.7.8");
        assert_eq!(entry.target_port, 80);
        assert_eq!(entry.connection_time, 0.001);
        assert_eq!(entry.tls_handshake_time, 0.002);
        assert_eq!(entry.received_bytes, 100);
        assert_eq!(entry.sent_bytes, 200);
        assert_eq!(entry.incoming_tls_alert, "-");
        assert_eq!(
            entry.chosen_cert_arn,
            "arn:aws:acm:us-east-1:123456789012:certificate/12345678-1234-1234-1234-123456789012"
        );
        assert_eq!(entry.tls_cipher, "ECDHE-RSA-AES128-GCM-SHA256");
        assert_eq!(entry.tls_protocol_version, "TLSv1.2");
        assert_eq!(entry.domain_name, "example.com");
        assert_eq!(entry.alpn_protocol, "h2");
        assert_eq!(entry.tls_handshake_time_ms, 2.0);
    }

    #[test]
    fn test_invalid_line_is_an_error() {
        let result = parse_line("invalid log line");
        assert!(matches!(
            result,
            Err(ParseError::NoMatch {
                format: LogFormat::Nlb
            })
        ));
    }

    #[test]
    fn test_absent_numeric_columns_are_zero() {
        let line = "tcp 2.0 2023-10-01T00:00:00.000000Z net/my-nlb/1 listener/net/my-nlb/1/2 1.2.3.4: 5.6.7.8: - - - - - - - - - - - - - -";
        let entry = parse_line(line).expect("valid line").expect("entry");
        assert_eq!(entry.client_port, 0);
        assert_eq!(entry.target_port, 0);
        assert_eq!(entry.connection_time, 0.0);
        assert_eq!(entry.tls_handshake_time, 0.0);
        assert_eq!(entry.received_bytes, 0);
        assert_eq!(entry.sent_bytes, 0);
        assert_eq!(entry.tls_handshake_time_ms, 0.0);
    }

    #[test]
    fn test_comment_and_blank_lines_are_skipped() {
        assert!(parse_line("").expect("no error").is_none());
        assert!(parse_line("# comment").expect("no error").is_none());
    }
}
