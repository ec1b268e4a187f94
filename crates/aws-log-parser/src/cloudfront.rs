// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! CloudFront standard (legacy) access logs.
//!
//! Each record is a tab separated line with 33 ordered columns, see
//! <https://docs.aws.amazon.com/AmazonCloudFront/latest/DeveloperGuide/standard-logs-reference.html>.
//! Files start with `#Version` and `#Fields` headers which are skipped.

use crate::errors::ParseError;
use crate::util::{is_skippable, parse_float, parse_int, parse_small_int};
use crate::{LogFormat, OnMalformed, ParseLine};

/// Number of columns in a CloudFront standard log record.
pub const CLOUDFRONT_FIELD_COUNT: usize = 33;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CloudFrontLogEntry {
    pub date: String,
    pub time: String,
    pub x_edge_location: String,
    pub sc_bytes: i64,
    pub c_ip: String,
    pub cs_method: String,
    pub cs_host: String,
    pub cs_uri_stem: String,
    pub sc_status: i32,
    pub cs_referer: String,
    pub cs_user_agent: String,
    pub cs_uri_query: String,
    pub cs_cookie: String,
    pub x_edge_result_type: String,
    pub x_edge_request_id: String,
    pub x_host_header: String,
    pub cs_protocol: String,
    pub cs_bytes: i64,
    pub time_taken: f64,
    pub x_forwarded_for: String,
    pub ssl_protocol: String,
    pub ssl_cipher: String,
    pub x_edge_response_result_type: String,
    pub cs_protocol_version: String,
    pub fle_status: String,
    pub fle_encrypted_fields: i32,
    pub c_port: i32,
    pub time_to_first_byte: f64,
    pub x_edge_detailed_result_type: String,
    pub sc_content_type: String,
    pub sc_content_len: i64,
    pub sc_range_start: String,
    pub sc_range_end: String,
}

/// Parses a single CloudFront log line.
///
/// Lines with more than 33 columns are accepted and the extra columns ignored.
pub fn parse_line(line: &str) -> Result<Option<CloudFrontLogEntry>, ParseError> {
    let line = line.trim();
    if is_skippable(line) {
        return Ok(None);
    }

    let fields: Vec<&str> = line.split('\t').collect();
    if fields.len() < CLOUDFRONT_FIELD_COUNT {
        return Err(ParseError::FieldCount {
            got: fields.len(),
            expected: CLOUDFRONT_FIELD_COUNT,
        });
    }

    Ok(Some(CloudFrontLogEntry {
        date: fields[0].to_string(),
        time: fields[1].to_string(),
        x_edge_location: fields[2].to_string(),
        sc_bytes: parse_int(fields[3]),
        c_ip: fields[4].to_string(),
        cs_method: fields[5].to_string(),
        cs_host: fields[6].to_string(),
        cs_uri_stem: fields[7].to_string(),
        sc_status: parse_small_int(fields[8]),
        cs_referer: fields[9].to_string(),
        cs_user_agent: fields[10].to_string(),
        cs_uri_query: fields[11].to_string(),
        cs_cookie: fields[12].to_string(),
        x_edge_result_type: fields[13].to_string(),
        x_edge_request_id: fields[14].to_string(),
        x_host_header: fields[15].to_string(),
        cs_protocol: fields[16].to_string(),
        cs_bytes: parse_int(fields[17]),
        time_taken: parse_float(fields[18]),
        x_forwarded_for: fields[19].to_string(),
        ssl_protocol: fields[20].to_string(),
        ssl_cipher: fields[21].to_string(),
        x_edge_response_result_type: fields[22].to_string(),
        cs_protocol_version: fields[23].to_string(),
        fle_status: fields[24].to_string(),
        fle_encrypted_fields: parse_small_int(fields[25]),
        c_port: parse_small_int(fields[26]),
        time_to_first_byte: parse_float(fields[27]),
        x_edge_detailed_result_type: fields[28].to_string(),
        sc_content_type: fields[29].to_string(),
        sc_content_len: parse_int(fields[30]),
        sc_range_start: fields[31].to_string(),
        sc_range_end: fields[32].to_string(),
    }))
}

impl ParseLine for CloudFrontLogEntry {
    const FORMAT: LogFormat = LogFormat::CloudFront;
    const ON_MALFORMED: OnMalformed = OnMalformed::Skip;

    fn parse_line(line: &str) -> Result<Option<Self>, ParseError> {
        parse_line(line)
    }
}
