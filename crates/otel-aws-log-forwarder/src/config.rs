// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::errors::ConfigError;

pub const DEFAULT_OTLP_ENDPOINT: &str = "http://localhost:4318/v1/logs";
pub const DEFAULT_MAX_BATCH_SIZE: usize = 500;
pub const DEFAULT_MAX_RETRIES: u32 = 3;
pub const DEFAULT_RETRY_BASE_SECS: f64 = 1.0;
pub const DEFAULT_MAX_CONCURRENT: usize = 10;
pub const DEFAULT_MAX_LINE_LENGTH: usize = 1024 * 1024;
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub otlp_endpoint: String,
    pub basic_auth_username: Option<String>,
    pub basic_auth_password: Option<String>,
    /// Records per OTLP batch, also the capacity of the parse queues.
    pub max_batch_size: usize,
    /// Retries after the first attempt.
    pub max_retries: u32,
    pub retry_base_secs: f64,
    /// Parse workers and concurrent delivery permits.
    pub max_concurrent: usize,
    pub max_line_length: usize,
    /// Read objects from `<dir>/<bucket>/<key>` instead of S3.
    pub log_source_dir: Option<PathBuf>,
    pub request_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            otlp_endpoint: DEFAULT_OTLP_ENDPOINT.to_string(),
            basic_auth_username: None,
            basic_auth_password: None,
            max_batch_size: DEFAULT_MAX_BATCH_SIZE,
            max_retries: DEFAULT_MAX_RETRIES,
            retry_base_secs: DEFAULT_RETRY_BASE_SECS,
            max_concurrent: DEFAULT_MAX_CONCURRENT,
            max_line_length: DEFAULT_MAX_LINE_LENGTH,
            log_source_dir: None,
            request_timeout: REQUEST_TIMEOUT,
        }
    }
}

fn non_empty(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.is_empty())
}

impl Config {
    pub fn from_env() -> Result<Config, ConfigError> {
        let otlp_endpoint = non_empty("OTLP_ENDPOINT")
            .or_else(|| non_empty("SIGNOZ_OTLP_ENDPOINT"))
            .unwrap_or_else(|| DEFAULT_OTLP_ENDPOINT.to_string());

        let max_batch_size = non_empty("MAX_BATCH_SIZE")
            .and_then(|val| val.parse::<usize>().ok())
            .unwrap_or(DEFAULT_MAX_BATCH_SIZE);
        let max_retries = non_empty("MAX_RETRIES")
            .and_then(|val| val.parse::<u32>().ok())
            .unwrap_or(DEFAULT_MAX_RETRIES);
        let retry_base_secs = non_empty("RETRY_BASE_SECS")
            .and_then(|val| val.parse::<f64>().ok())
            .unwrap_or(DEFAULT_RETRY_BASE_SECS);
        let max_concurrent = non_empty("MAX_CONCURRENT")
            .and_then(|val| val.parse::<usize>().ok())
            .unwrap_or(DEFAULT_MAX_CONCURRENT);
        let max_line_length = non_empty("MAX_LINE_LENGTH")
            .and_then(|val| val.parse::<usize>().ok())
            .unwrap_or(DEFAULT_MAX_LINE_LENGTH);

        let config = Config {
            otlp_endpoint,
            basic_auth_username: non_empty("BASIC_AUTH_USERNAME"),
            basic_auth_password: non_empty("BASIC_AUTH_PASSWORD"),
            max_batch_size,
            max_retries,
            retry_base_secs,
            max_concurrent,
            max_line_length,
            log_source_dir: non_empty("LOG_SOURCE_DIR").map(PathBuf::from),
            request_timeout: REQUEST_TIMEOUT,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_batch_size == 0 {
            return Err(ConfigError::Invalid {
                name: "MAX_BATCH_SIZE",
                value: self.max_batch_size.to_string(),
                reason: "must be greater than zero",
            });
        }
        if self.max_concurrent == 0 {
            return Err(ConfigError::Invalid {
                name: "MAX_CONCURRENT",
                value: self.max_concurrent.to_string(),
                reason: "must be greater than zero",
            });
        }
        if self.max_line_length == 0 {
            return Err(ConfigError::Invalid {
                name: "MAX_LINE_LENGTH",
                value: self.max_line_length.to_string(),
                reason: "must be greater than zero",
            });
        }
        if !self.retry_base_secs.is_finite() || self.retry_base_secs < 0.0 {
            return Err(ConfigError::Invalid {
                name: "RETRY_BASE_SECS",
                value: self.retry_base_secs.to_string(),
                reason: "must be a finite, non-negative number of seconds",
            });
        }
        Ok(())
    }

    /// Basic credentials, only when both halves are configured.
    pub fn basic_auth(&self) -> Option<(&str, &str)> {
        match (&self.basic_auth_username, &self.basic_auth_password) {
            (Some(user), Some(pass)) => Some((user.as_str(), pass.as_str())),
            _ => None,
        }
    }
}
