// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use std::sync::Arc;

use tracing::{info, info_span, warn, Instrument};

use crate::config::Config;
use crate::errors::{ForwarderError, TransportError};
use crate::flusher::Deliverer;
use crate::group::group_by_resource;
use crate::ingest::IngestOptions;
use crate::processor::ProcessorRegistry;
use crate::source::ObjectSource;
use crate::trigger::S3Object;

/// What happened to one object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectOutcome {
    pub bucket: String,
    pub key: String,
    /// Name of the processor that claimed the object, `None` when unsupported.
    pub processor: Option<&'static str>,
    pub parsed: usize,
    /// Malformed records that were dropped.
    pub skipped: usize,
    pub delivered: usize,
}

impl ObjectOutcome {
    fn new(object: &S3Object) -> Self {
        ObjectOutcome {
            bucket: object.bucket.clone(),
            key: object.key.clone(),
            processor: None,
            parsed: 0,
            skipped: 0,
            delivered: 0,
        }
    }
}

pub struct Forwarder {
    registry: ProcessorRegistry,
    source: Arc<dyn ObjectSource>,
    deliverer: Deliverer,
    ingest_options: IngestOptions,
}

impl Forwarder {
    pub fn new(config: &Config, source: Arc<dyn ObjectSource>, deliverer: Deliverer) -> Self {
        Forwarder {
            registry: ProcessorRegistry::default(),
            source,
            deliverer,
            ingest_options: IngestOptions::from(config),
        }
    }

    /// Forwarder delivering over HTTP to the configured endpoint.
    pub fn with_http(
        config: &Config,
        source: Arc<dyn ObjectSource>,
    ) -> Result<Self, TransportError> {
        Ok(Forwarder::new(config, source, Deliverer::http(config)?))
    }

    #[must_use]
    pub fn with_registry(mut self, registry: ProcessorRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Processes objects one after another, stopping at the first failure.
    ///
    /// Unsupported and empty objects are skipped. Batches delivered before a failure
    /// stay delivered.
    pub async fn handle(&self, objects: &[S3Object]) -> Result<Vec<ObjectOutcome>, ForwarderError> {
        info!("Handling {} objects", objects.len());
        let mut outcomes = Vec::with_capacity(objects.len());
        for object in objects {
            let span = info_span!("object", bucket = %object.bucket, key = %object.key);
            let outcome = self.handle_object(object).instrument(span).await?;
            outcomes.push(outcome);
        }
        Ok(outcomes)
    }

    async fn handle_object(&self, object: &S3Object) -> Result<ObjectOutcome, ForwarderError> {
        let mut outcome = ObjectOutcome::new(object);
        let Some(processor) = self.registry.select(&object.bucket, &object.key) else {
            warn!("Skipping unsupported object");
            return Ok(outcome);
        };
        outcome.processor = Some(processor.name());
        info!("Processing object as {}", processor.name());

        let processed = processor
            .process(
                self.source.as_ref(),
                &object.bucket,
                &object.key,
                &self.ingest_options,
            )
            .await
            .map_err(|source| ForwarderError::Ingest {
                bucket: object.bucket.clone(),
                key: object.key.clone(),
                source,
            })?;
        outcome.parsed = processed.adapters.len();
        outcome.skipped = processed.malformed;

        if processed.adapters.is_empty() {
            info!("No entries found");
            return Ok(outcome);
        }
        info!("Parsed {} entries", outcome.parsed);

        let groups = group_by_resource(&processed.adapters);
        info!("Grouped entries into {} resource groups", groups.len());

        outcome.delivered =
            self.deliverer
                .deliver(&groups)
                .await
                .map_err(|source| ForwarderError::Delivery {
                    bucket: object.bucket.clone(),
                    key: object.key.clone(),
                    source,
                })?;
        Ok(outcome)
    }
}
