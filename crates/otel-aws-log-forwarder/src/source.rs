// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use std::path::PathBuf;

use async_trait::async_trait;
use aws_sdk_s3::error::DisplayErrorContext;
use tokio::io::AsyncRead;
use tracing::debug;

use crate::errors::SourceError;

/// Raw, still compressed, object body.
pub type ObjectReader = Box<dyn AsyncRead + Send + Unpin>;

/// Where object bodies come from.
#[async_trait]
pub trait ObjectSource: Send + Sync {
    async fn open(&self, bucket: &str, key: &str) -> Result<ObjectReader, SourceError>;
}

#[derive(Debug, Clone)]
pub struct S3ObjectSource {
    client: aws_sdk_s3::Client,
}

impl S3ObjectSource {
    pub fn new(client: aws_sdk_s3::Client) -> Self {
        S3ObjectSource { client }
    }

    /// Builds a client from the default AWS credential and region chain.
    pub async fn from_env() -> Self {
        let config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        S3ObjectSource::new(aws_sdk_s3::Client::new(&config))
    }
}

#[async_trait]
impl ObjectSource for S3ObjectSource {
    async fn open(&self, bucket: &str, key: &str) -> Result<ObjectReader, SourceError> {
        debug!("Getting s3://{bucket}/{key}");
        let output = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|err| SourceError::S3 {
                bucket: bucket.to_string(),
                key: key.to_string(),
                message: DisplayErrorContext(&err).to_string(),
            })?;
        Ok(Box::new(Box::pin(output.body.into_async_read())))
    }
}

/// Reads objects from `<root>/<bucket>/<key>`, for replaying downloaded logs.
#[derive(Debug, Clone)]
pub struct FileSystemSource {
    root: PathBuf,
}

impl FileSystemSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        FileSystemSource { root: root.into() }
    }

    pub fn path(&self, bucket: &str, key: &str) -> PathBuf {
        self.root.join(bucket).join(key)
    }
}

#[async_trait]
impl ObjectSource for FileSystemSource {
    async fn open(&self, bucket: &str, key: &str) -> Result<ObjectReader, SourceError> {
        let path = self.path(bucket, key);
        debug!("Opening {}", path.display());
        let file = tokio::fs::File::open(&path)
            .await
            .map_err(|source| SourceError::Io {
                path: path.display().to_string(),
                source,
            })?;
        Ok(Box::new(file))
    }
}
