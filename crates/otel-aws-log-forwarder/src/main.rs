// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

#![cfg_attr(not(test), deny(clippy::panic))]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::todo))]
#![cfg_attr(not(test), deny(clippy::unimplemented))]

use std::env;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use tokio::io::AsyncReadExt;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

use otel_aws_log_forwarder::config::Config;
use otel_aws_log_forwarder::forwarder::Forwarder;
use otel_aws_log_forwarder::source::{FileSystemSource, ObjectSource, S3ObjectSource};
use otel_aws_log_forwarder::trigger::extract_objects;

/// Reads the trigger event from the file named by the first argument, else stdin.
async fn read_event() -> anyhow::Result<String> {
    match env::args().nth(1) {
        Some(path) => tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("failed to read event from {path}")),
        None => {
            let mut event = String::new();
            tokio::io::stdin()
                .read_to_string(&mut event)
                .await
                .context("failed to read event from stdin")?;
            Ok(event)
        }
    }
}

async fn run() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    let event = read_event().await?;
    let objects = extract_objects(&event)?;

    let source: Arc<dyn ObjectSource> = match &config.log_source_dir {
        Some(dir) => {
            debug!("Reading objects from {}", dir.display());
            Arc::new(FileSystemSource::new(dir))
        }
        None => Arc::new(S3ObjectSource::from_env().await),
    };
    let forwarder =
        Forwarder::with_http(&config, source).context("failed to build the HTTP client")?;

    let outcomes = forwarder.handle(&objects).await?;
    let delivered: usize = outcomes.iter().map(|outcome| outcome.delivered).sum();
    let skipped: usize = outcomes.iter().map(|outcome| outcome.skipped).sum();
    info!(
        "Forwarded {delivered} records from {} objects ({skipped} malformed records skipped)",
        outcomes.len()
    );
    Ok(())
}

#[tokio::main]
pub async fn main() -> ExitCode {
    let log_level = env::var("LOG_LEVEL")
        .map(|val| val.to_lowercase())
        .unwrap_or("info".to_string());

    let env_filter = format!(
        "h2=off,hyper=off,hyper_util=off,rustls=off,aws_config=warn,aws_smithy_runtime=warn,{}",
        log_level
    );

    #[allow(clippy::expect_used)]
    let subscriber = tracing_subscriber::fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_new(env_filter).expect("could not parse log level in configuration"),
        )
        .with_level(true)
        .with_thread_names(false)
        .with_thread_ids(false)
        .with_line_number(false)
        .with_file(false)
        .with_target(true)
        .without_time()
        .finish();

    #[allow(clippy::expect_used)]
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    debug!("Logging subsystem enabled");

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("Invocation failed: {err:#}");
            ExitCode::FAILURE
        }
    }
}
