// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use std::collections::HashMap;

use crate::adapter::LogAdapter;
use crate::otel::{KeyValue, LogRecord, LogsPayload};

/// Records that share a resource key.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceGroup {
    /// Taken from the first adapter seen for the key.
    pub resource_attributes: Vec<KeyValue>,
    pub records: Vec<LogRecord>,
}

/// Groups adapters by resource key, keeping each group's records in input order.
///
/// Map iteration order is unspecified. Sort the keys when a stable order matters.
pub fn group_by_resource(adapters: &[LogAdapter]) -> HashMap<String, ResourceGroup> {
    let mut groups: HashMap<String, ResourceGroup> = HashMap::new();
    for adapter in adapters {
        groups
            .entry(adapter.resource_key())
            .or_insert_with(|| ResourceGroup {
                resource_attributes: adapter.resource_attributes(),
                records: Vec::new(),
            })
            .records
            .push(adapter.to_otel());
    }
    groups
}

/// Contiguous slices of at most `max_batch_size` records, in list order.
pub fn batches(records: &[LogRecord], max_batch_size: usize) -> std::slice::Chunks<'_, LogRecord> {
    records.chunks(max_batch_size.max(1))
}

pub fn build_payload(resource_attributes: &[KeyValue], batch: &[LogRecord]) -> LogsPayload {
    LogsPayload::new(resource_attributes.to_vec(), batch.to_vec())
}
