// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Uniform view over parsed entries of every format.
//!
//! A [`LogAdapter`] pairs one [`LogEntry`] with the context recovered from the object
//! key, and derives the resource key, resource attributes and OTel record for it.
//! Derivation is a `match` over the entry variant, so adding a format forces every
//! derivation to handle it.

pub mod alb;
pub mod arn;
pub mod cloudfront;
pub mod nlb;
pub mod waf;

use std::sync::Arc;

use aws_log_parser::util::is_absent;
use aws_log_parser::LogEntry;

use crate::otel::{KeyValue, LogRecord};
use crate::processor::{parse_distribution_id_from_key, parse_region_account_from_key};

/// What the object key says about the producer of its logs.
///
/// Empty strings mean unknown.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyContext {
    pub account_id: String,
    pub region: String,
    /// CloudFront distribution, from `<DISTRIBUTION>.<YYYY-MM-DD-HH>.<id>` object names.
    pub distribution_id: String,
}

impl KeyContext {
    pub fn from_key(key: &str) -> Self {
        let (account_id, region) = parse_region_account_from_key(key);
        KeyContext {
            account_id,
            region,
            distribution_id: parse_distribution_id_from_key(key).unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LogAdapter {
    entry: LogEntry,
    context: Arc<KeyContext>,
}

impl LogAdapter {
    pub fn new(entry: impl Into<LogEntry>, context: Arc<KeyContext>) -> Self {
        LogAdapter {
            entry: entry.into(),
            context,
        }
    }

    pub fn entry(&self) -> &LogEntry {
        &self.entry
    }

    pub fn context(&self) -> &KeyContext {
        &self.context
    }

    /// Identifier of the resource that produced the entry, used as the group key.
    ///
    /// Empty when the entry carries no identifying field.
    pub fn resource_key(&self) -> String {
        match &self.entry {
            LogEntry::Alb(entry) => alb::resource_key(entry),
            LogEntry::Nlb(entry) => nlb::resource_key(entry),
            LogEntry::CloudFront(entry) => cloudfront::resource_key(entry, &self.context),
            LogEntry::Waf(entry) => waf::resource_key(entry),
        }
    }

    pub fn resource_attributes(&self) -> Vec<KeyValue> {
        match &self.entry {
            LogEntry::Alb(entry) => alb::resource_attributes(entry, &self.context),
            LogEntry::Nlb(entry) => nlb::resource_attributes(entry, &self.context),
            LogEntry::CloudFront(entry) => cloudfront::resource_attributes(entry, &self.context),
            LogEntry::Waf(entry) => waf::resource_attributes(entry, &self.context),
        }
    }

    pub fn to_otel(&self) -> LogRecord {
        match &self.entry {
            LogEntry::Alb(entry) => alb::to_otel(entry),
            LogEntry::Nlb(entry) => nlb::to_otel(entry),
            LogEntry::CloudFront(entry) => cloudfront::to_otel(entry),
            LogEntry::Waf(entry) => waf::to_otel(entry),
        }
    }
}

/// First candidate that is not the absent sentinel, else empty.
pub(crate) fn first_present(candidates: &[&str]) -> String {
    candidates
        .iter()
        .find(|value| !is_absent(value))
        .map(|value| value.to_string())
        .unwrap_or_default()
}

/// Appends `cloud.account.id` and `cloud.region`.
///
/// Values embedded in the entry win over the key context; unknown values are omitted.
pub(crate) fn with_cloud_context(
    mut attributes: Vec<KeyValue>,
    embedded_account: &str,
    embedded_region: &str,
    context: &KeyContext,
) -> Vec<KeyValue> {
    let account = if embedded_account.is_empty() {
        context.account_id.as_str()
    } else {
        embedded_account
    };
    let region = if embedded_region.is_empty() {
        context.region.as_str()
    } else {
        embedded_region
    };
    if !account.is_empty() {
        attributes.push(KeyValue::string("cloud.account.id", account));
    }
    if !region.is_empty() {
        attributes.push(KeyValue::string("cloud.region", region));
    }
    attributes
}
