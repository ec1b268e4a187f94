// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use aws_log_parser::util::is_absent;
use aws_log_parser::CloudFrontLogEntry;

use super::{first_present, with_cloud_context, KeyContext};
use crate::otel::{date_time_to_unix_nano, Attributes, KeyValue, LogRecord, Severity};

/// Distribution id from the object name, else the distribution domain, else the
/// `Host` header the viewer sent.
pub fn resource_key(entry: &CloudFrontLogEntry, context: &KeyContext) -> String {
    first_present(&[
        context.distribution_id.as_str(),
        entry.x_host_header.as_str(),
        entry.cs_host.as_str(),
    ])
}

/// CloudFront is a global service, so only the key can tell the account and region.
pub fn resource_attributes(entry: &CloudFrontLogEntry, context: &KeyContext) -> Vec<KeyValue> {
    let attributes = Attributes::new()
        .string("cloud.provider", "aws")
        .string("cloud.platform", "aws_cloudfront")
        .string("cloud.service", "cloudfront")
        .string("aws.cloudfront.distribution_id", &context.distribution_id)
        .string("aws.cloudfront.distribution_domain", &entry.cs_host)
        .build();
    with_cloud_context(attributes, "", "", context)
}

pub fn to_otel(entry: &CloudFrontLogEntry) -> LogRecord {
    let host = if is_absent(&entry.x_host_header) {
        &entry.cs_host
    } else {
        &entry.x_host_header
    };
    let body = format!(
        "{} {}://{}{} {}",
        entry.cs_method, entry.cs_protocol, host, entry.cs_uri_stem, entry.sc_status
    );

    let attributes = Attributes::new()
        .string("http.request.method", &entry.cs_method)
        .string("url.scheme", &entry.cs_protocol)
        .string("url.path", &entry.cs_uri_stem)
        .string("url.query", &entry.cs_uri_query)
        .nonzero_int("http.response.status_code", entry.sc_status)
        .string("network.protocol.version", &entry.cs_protocol_version)
        .string("client.address", &entry.c_ip)
        .nonzero_int("client.port", entry.c_port)
        .string("server.address", host)
        .string("user_agent.original", &entry.cs_user_agent)
        .string("http.request.header.referer", &entry.cs_referer)
        .string("tls.cipher", &entry.ssl_cipher)
        .string("tls.protocol.version", &entry.ssl_protocol)
        .int("http.response.body.size", entry.sc_bytes)
        .int("http.request.body.size", entry.cs_bytes)
        .string("aws.cloudfront.edge_location", &entry.x_edge_location)
        .string("aws.cloudfront.edge_result_type", &entry.x_edge_result_type)
        .string(
            "aws.cloudfront.edge_response_result_type",
            &entry.x_edge_response_result_type,
        )
        .string(
            "aws.cloudfront.edge_detailed_result_type",
            &entry.x_edge_detailed_result_type,
        )
        .string("aws.cloudfront.edge_request_id", &entry.x_edge_request_id)
        .string("aws.cloudfront.distribution_domain", &entry.cs_host)
        .string("aws.cloudfront.x_forwarded_for", &entry.x_forwarded_for)
        .double("aws.cloudfront.time_taken", entry.time_taken)
        .double("aws.cloudfront.time_to_first_byte", entry.time_to_first_byte)
        .string("aws.cloudfront.fle_status", &entry.fle_status)
        .nonzero_int(
            "aws.cloudfront.fle_encrypted_fields",
            entry.fle_encrypted_fields,
        )
        .string("aws.cloudfront.content_type", &entry.sc_content_type)
        .nonzero_int("aws.cloudfront.content_length", entry.sc_content_len)
        .string("aws.cloudfront.range_start", &entry.sc_range_start)
        .string("aws.cloudfront.range_end", &entry.sc_range_end)
        .build();

    LogRecord::new(
        date_time_to_unix_nano(&entry.date, &entry.time),
        body,
        attributes,
    )
    .with_severity(Severity::from_http_status(entry.sc_status))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::otel::{find, AnyValue};

    fn entry() -> CloudFrontLogEntry {
        CloudFrontLogEntry {
            date: "2019-12-04".to_string(),
            time: "21:02:31".to_string(),
            x_edge_location: "LAX1".to_string(),
            sc_bytes: 392,
            c_ip: "192.0.2.100".to_string(),
            cs_method: "GET".to_string(),
            cs_host: "d111111abcdef8.cloudfront.net".to_string(),
            cs_uri_stem: "/index.html".to_string(),
            sc_status: 404,
            x_host_header: "www.example.com".to_string(),
            cs_protocol: "https".to_string(),
            c_port: 11040,
            ..Default::default()
        }
    }

    #[test]
    fn test_resource_key_precedence() {
        let mut context = KeyContext {
            distribution_id: "E2K2LNL5N3WR51".to_string(),
            ..Default::default()
        };
        let mut entry = entry();
        assert_eq!(resource_key(&entry, &context), "E2K2LNL5N3WR51");

        context.distribution_id.clear();
        assert_eq!(resource_key(&entry, &context), "www.example.com");

        entry.x_host_header = "-".to_string();
        assert_eq!(
            resource_key(&entry, &context),
            "d111111abcdef8.cloudfront.net"
        );
    }

    #[test]
    fn test_resource_attributes() {
        let context = KeyContext {
            account_id: "123456789012".to_string(),
            distribution_id: "E2K2LNL5N3WR51".to_string(),
            ..Default::default()
        };
        let attributes = resource_attributes(&entry(), &context);
        assert_eq!(
            find(&attributes, "cloud.platform"),
            Some(&AnyValue::StringValue("aws_cloudfront".to_string()))
        );
        assert_eq!(
            find(&attributes, "aws.cloudfront.distribution_id").and_then(|v| v.as_str()),
            Some("E2K2LNL5N3WR51")
        );
        assert_eq!(
            find(&attributes, "cloud.account.id").and_then(|v| v.as_str()),
            Some("123456789012")
        );
        assert!(find(&attributes, "cloud.region").is_none());
    }

    #[test]
    fn test_to_otel() {
        let record = to_otel(&entry());
        assert_eq!(record.time_unix_nano, 1_575_493_351_000_000_000);
        assert_eq!(record.severity_text.as_deref(), Some("WARN"));
        assert_eq!(
            record.body,
            AnyValue::StringValue("GET https://www.example.com/index.html 404".to_string())
        );
        assert_eq!(
            record.attribute("server.address").and_then(|v| v.as_str()),
            Some("www.example.com")
        );
        assert_eq!(
            record.attribute("aws.cloudfront.edge_location").and_then(|v| v.as_str()),
            Some("LAX1")
        );
    }

    #[test]
    fn test_absent_status_has_no_severity() {
        let mut entry = entry();
        entry.sc_status = 0;
        let record = to_otel(&entry);
        assert_eq!(record.severity_number, None);
        assert!(record.attribute("http.response.status_code").is_none());
    }
}
