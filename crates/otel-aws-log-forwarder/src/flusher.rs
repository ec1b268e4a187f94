// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Batch delivery to the OTLP/HTTP logs endpoint.
//!
//! Every batch of every resource group is sent on its own task. A semaphore bounds
//! how many are in flight. Each send is retried with exponential backoff. Once any
//! batch has failed no new batches are scheduled, but the ones already in flight run
//! to completion before the first failure is returned. Delivered batches are never
//! rolled back.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use tokio::sync::{mpsc, Mutex, Semaphore};
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use crate::config::{Config, DEFAULT_RETRY_BASE_SECS};
use crate::errors::{DeliveryError, TransportError};
use crate::group::{batches, build_payload, ResourceGroup};

/// One attempt at posting a serialized payload.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, body: Vec<u8>) -> Result<(), TransportError>;
}

#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    endpoint: String,
    basic_auth: Option<(String, String)>,
}

impl HttpTransport {
    pub fn new(config: &Config) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Ok(HttpTransport {
            client,
            endpoint: config.otlp_endpoint.clone(),
            basic_auth: config
                .basic_auth()
                .map(|(user, pass)| (user.to_string(), pass.to_string())),
        })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, body: Vec<u8>) -> Result<(), TransportError> {
        let mut request = self
            .client
            .post(&self.endpoint)
            .header(CONTENT_TYPE, "application/json")
            .body(body);
        if let Some((user, pass)) = &self.basic_auth {
            request = request.basic_auth(user, Some(pass));
        }

        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let body = response.text().await.unwrap_or_default();
        Err(TransportError::Status {
            status: status.as_u16(),
            body,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    /// Retries after the first attempt.
    pub max_retries: u32,
    pub base: Duration,
}

impl RetryPolicy {
    pub fn from_config(config: &Config) -> Self {
        RetryPolicy {
            max_retries: config.max_retries,
            base: Duration::try_from_secs_f64(config.retry_base_secs)
                .unwrap_or(Duration::from_secs_f64(DEFAULT_RETRY_BASE_SECS)),
        }
    }

    /// Wait before attempt `attempt`: nothing for the first, then `base * 2^(attempt - 1)`.
    pub fn backoff(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            return Duration::ZERO;
        }
        let exponent = i32::try_from(attempt - 1).unwrap_or(i32::MAX);
        Duration::try_from_secs_f64(self.base.as_secs_f64() * 2f64.powi(exponent))
            .unwrap_or(Duration::MAX)
    }
}

/// Sends `body` until a 2xx or until retries run out.
///
/// Returns the number of attempts used. On failure the error carries the last cause.
pub async fn send_with_retry(
    transport: &dyn Transport,
    body: &[u8],
    policy: &RetryPolicy,
) -> Result<u32, DeliveryError> {
    let mut attempt = 0;
    loop {
        match transport.send(body.to_vec()).await {
            Ok(()) => {
                debug!("Batch sent on attempt {}", attempt + 1);
                return Ok(attempt + 1);
            }
            Err(err) => {
                warn!(
                    attempt = attempt + 1,
                    status = err.status(),
                    "Batch send attempt failed: {err}"
                );
                if attempt >= policy.max_retries {
                    return Err(DeliveryError::Exhausted {
                        attempts: attempt + 1,
                        cause: err,
                    });
                }
            }
        }
        attempt += 1;
        tokio::time::sleep(policy.backoff(attempt)).await;
    }
}

#[derive(Clone)]
pub struct Deliverer {
    transport: Arc<dyn Transport>,
    policy: RetryPolicy,
    max_batch_size: usize,
    max_concurrent: usize,
}

impl Deliverer {
    pub fn new(transport: Arc<dyn Transport>, config: &Config) -> Self {
        Deliverer {
            transport,
            policy: RetryPolicy::from_config(config),
            max_batch_size: config.max_batch_size,
            max_concurrent: config.max_concurrent,
        }
    }

    /// Deliverer posting to the configured endpoint over HTTP.
    pub fn http(config: &Config) -> Result<Self, TransportError> {
        Ok(Deliverer::new(Arc::new(HttpTransport::new(config)?), config))
    }

    /// Sends every group in batches and returns the number of records delivered.
    ///
    /// Groups are scheduled in key order. Batch ids count from 1 within a group.
    pub async fn deliver(
        &self,
        groups: &HashMap<String, ResourceGroup>,
    ) -> Result<usize, DeliveryError> {
        let semaphore = Arc::new(Semaphore::new(self.max_concurrent.max(1)));
        // one slot, used as a flag: only the first failure is kept
        let (error_tx, mut error_rx) = mpsc::channel::<DeliveryError>(1);
        let total_sent = Arc::new(Mutex::new(0usize));
        let mut sends = JoinSet::new();
        let mut first_error = None;

        let mut keys: Vec<&String> = groups.keys().collect();
        keys.sort();

        'groups: for resource_key in keys {
            let group = &groups[resource_key];
            info!(
                resource_key = resource_key.as_str(),
                "Delivering {} records",
                group.records.len()
            );

            for (index, batch) in batches(&group.records, self.max_batch_size).enumerate() {
                if let Ok(err) = error_rx.try_recv() {
                    first_error = Some(err);
                    break 'groups;
                }

                let batch_id = index + 1;
                let batch_size = batch.len();
                let body = serde_json::to_vec(&build_payload(&group.resource_attributes, batch))?;

                let transport = Arc::clone(&self.transport);
                let semaphore = Arc::clone(&semaphore);
                let error_tx = error_tx.clone();
                let total_sent = Arc::clone(&total_sent);
                let policy = self.policy;
                let resource_key = resource_key.clone();
                sends.spawn(async move {
                    let Ok(_permit) = semaphore.acquire_owned().await else {
                        return;
                    };
                    debug!(
                        resource_key = resource_key.as_str(),
                        batch_id, batch_size, "Sending batch"
                    );
                    match send_with_retry(transport.as_ref(), &body, &policy).await {
                        Ok(_) => {
                            *total_sent.lock().await += batch_size;
                        }
                        Err(err) => {
                            error!(
                                resource_key = resource_key.as_str(),
                                batch_id, "Failed to send batch: {err}"
                            );
                            let _ = error_tx.try_send(DeliveryError::Batch {
                                batch_id,
                                resource_key,
                                source: Box::new(err),
                            });
                        }
                    }
                });
            }
        }
        drop(error_tx);

        while let Some(result) = sends.join_next().await {
            if let Err(err) = result {
                if first_error.is_none() {
                    first_error = Some(DeliveryError::Task(err.to_string()));
                }
            }
        }
        if first_error.is_none() {
            first_error = error_rx.try_recv().ok();
        }
        if let Some(err) = first_error {
            return Err(err);
        }

        let total_sent = *total_sent.lock().await;
        info!(
            "Successfully sent {total_sent} records across {} resource groups",
            groups.len()
        );
        Ok(total_sent)
    }
}
