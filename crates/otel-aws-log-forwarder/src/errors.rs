// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use aws_log_parser::ParseFileError;

/// Failure to retrieve an object body.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("failed to get s3://{bucket}/{key}: {message}")]
    S3 {
        bucket: String,
        key: String,
        message: String,
    },

    #[error("failed to open {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Failure while turning an object into entries. Fatal for that object.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error(transparent)]
    Source(#[from] SourceError),

    #[error("failed to read object stream: {0}")]
    Read(#[source] std::io::Error),

    #[error("line exceeds the maximum length of {max} bytes")]
    LineTooLong { max: usize },

    #[error("failed to parse object: {0}")]
    File(#[from] ParseFileError),

    #[error("parse worker failed: {0}")]
    Worker(String),
}

/// Failure of a single HTTP attempt.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },
}

impl TransportError {
    /// HTTP status of the response, if one was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            TransportError::Request(err) => err.status().map(|status| status.as_u16()),
            TransportError::Status { status, .. } => Some(*status),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    #[error("failed to marshal payload: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("failed after {attempts} attempts: {cause}")]
    Exhausted {
        attempts: u32,
        #[source]
        cause: TransportError,
    },

    #[error("failed to send batch {batch_id} of resource {resource_key:?}: {source}")]
    Batch {
        batch_id: usize,
        resource_key: String,
        #[source]
        source: Box<DeliveryError>,
    },

    #[error("delivery task failed: {0}")]
    Task(String),
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {name}: {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: &'static str,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum TriggerError {
    #[error("failed to parse trigger event: {0}")]
    Json(#[from] serde_json::Error),

    #[error("trigger event carries no S3 objects")]
    NoObjects,
}

/// Top level failure of an invocation.
#[derive(Debug, thiserror::Error)]
pub enum ForwarderError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Trigger(#[from] TriggerError),

    #[error("failed to process s3://{bucket}/{key}: {source}")]
    Ingest {
        bucket: String,
        key: String,
        #[source]
        source: IngestError,
    },

    #[error("failed to deliver s3://{bucket}/{key}: {source}")]
    Delivery {
        bucket: String,
        key: String,
        #[source]
        source: DeliveryError,
    },
}
