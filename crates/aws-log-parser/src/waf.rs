// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! AWS WAF logs, one JSON document per line.
//!
//! Unknown fields are ignored and missing or `null` values take their default, so
//! only a document that is not valid JSON (or has mistyped fields) is malformed.
//! WAF objects are parsed as a whole: the file driver aborts on the first bad line.

use serde::{Deserialize, Deserializer};

use crate::errors::ParseError;
use crate::util::is_skippable;
use crate::{LogFormat, OnMalformed, ParseLine};

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WafLogEntry {
    /// Epoch milliseconds.
    #[serde(deserialize_with = "null_as_default")]
    pub timestamp: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub format_version: i32,
    #[serde(rename = "webaclId", deserialize_with = "null_as_default")]
    pub webacl_id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub terminating_rule_id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub terminating_rule_type: String,
    #[serde(deserialize_with = "null_as_default")]
    pub action: String,
    #[serde(deserialize_with = "null_as_default")]
    pub http_source_name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub http_source_id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub response_code_sent: i32,
    #[serde(deserialize_with = "null_as_default")]
    pub labels: Vec<WafLabel>,
    #[serde(deserialize_with = "null_as_default")]
    pub http_request: WafHttpRequest,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct WafLabel {
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WafHttpRequest {
    #[serde(deserialize_with = "null_as_default")]
    pub client_ip: String,
    #[serde(deserialize_with = "null_as_default")]
    pub country: String,
    #[serde(deserialize_with = "null_as_default")]
    pub headers: Vec<WafHeader>,
    #[serde(deserialize_with = "null_as_default")]
    pub uri: String,
    #[serde(deserialize_with = "null_as_default")]
    pub args: String,
    #[serde(deserialize_with = "null_as_default")]
    pub http_version: String,
    #[serde(deserialize_with = "null_as_default")]
    pub http_method: String,
    #[serde(deserialize_with = "null_as_default")]
    pub request_id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub host: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct WafHeader {
    pub name: String,
    pub value: String,
}

impl WafHttpRequest {
    /// Case-insensitive header lookup, first match wins.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|h| h.name.eq_ignore_ascii_case(name))
            .map(|h| h.value.as_str())
    }

    /// The request host: the `host` field when present, else the `Host` header.
    pub fn host(&self) -> &str {
        if !self.host.is_empty() {
            return &self.host;
        }
        self.header("host").unwrap_or_default()
    }
}

/// Web ACL location recovered from a `webaclId` ARN.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebAclLocation {
    pub account_id: String,
    /// `global` for CloudFront scoped ACLs, whose ARN carries no region.
    pub region: String,
}

impl WafLogEntry {
    /// Splits the web ACL ARN on `:`; account is segment 4 and region segment 3.
    ///
    /// Returns `None` when the identifier has fewer than six segments.
    pub fn web_acl_location(&self) -> Option<WebAclLocation> {
        let parts: Vec<&str> = self.webacl_id.split(':').collect();
        if parts.len() < 6 {
            return None;
        }
        let region = if parts[3].is_empty() {
            "global"
        } else {
            parts[3]
        };
        Some(WebAclLocation {
            account_id: parts[4].to_string(),
            region: region.to_string(),
        })
    }
}

/// Parses a single WAF JSON record.
pub fn parse_line(line: &str) -> Result<Option<WafLogEntry>, ParseError> {
    let line = line.trim();
    if is_skippable(line) {
        return Ok(None);
    }
    serde_json::from_str(line)
        .map(Some)
        .map_err(|source| ParseError::Json {
            format: LogFormat::Waf,
            source,
        })
}

impl ParseLine for WafLogEntry {
    const FORMAT: LogFormat = LogFormat::Waf;
    const ON_MALFORMED: OnMalformed = OnMalformed::Abort;

    fn parse_line(line: &str) -> Result<Option<Self>, ParseError> {
        parse_line(line)
    }
}
