// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Concurrent line ingestion.
//!
//! ```text
//!   reader ──> producer ──[lines, cap = queue_capacity]──> N workers
//!                                                            │
//!   collector <──[entries, cap = queue_capacity]─────────────┘
//! ```
//!
//! One producer splits the stream into lines and feeds a bounded queue, suspending
//! while it is full. Workers race to take lines, parse them and publish entries to a
//! second bounded queue. A supervisor closes that queue once every worker is done and
//! the collector drains it.
//!
//! **Entries come out in no particular order.** Callers must not rely on file order.
//!
//! A read or decompression failure, or a line longer than the bound, aborts the whole
//! object. A line that fails to parse is only counted. Bytes that are not valid UTF-8
//! are replaced with U+FFFD before parsing.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use aws_log_parser::ParseLine;
use futures::StreamExt;
use tokio::io::AsyncRead;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinSet;
use tokio_util::codec::{AnyDelimiterCodec, AnyDelimiterCodecError, FramedRead};
use tracing::{debug, warn};

use crate::config::Config;
use crate::errors::IngestError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngestOptions {
    pub workers: usize,
    pub queue_capacity: usize,
    pub max_line_length: usize,
}

impl From<&Config> for IngestOptions {
    fn from(config: &Config) -> Self {
        IngestOptions {
            workers: config.max_concurrent,
            queue_capacity: config.max_batch_size,
            max_line_length: config.max_line_length,
        }
    }
}

impl Default for IngestOptions {
    fn default() -> Self {
        IngestOptions::from(&Config::default())
    }
}

#[derive(Debug)]
pub struct IngestOutcome<T> {
    /// Parsed entries, unordered.
    pub entries: Vec<T>,
    /// Lines that failed to parse.
    pub malformed: usize,
    /// Lines read from the stream, including blank and comment lines.
    pub lines: usize,
}

/// Splits a raw frame into a line, dropping a trailing carriage return.
fn frame_to_line(frame: &[u8]) -> String {
    let frame = frame.strip_suffix(b"\r").unwrap_or(frame);
    String::from_utf8_lossy(frame).into_owned()
}

pub async fn ingest<T, R>(
    reader: R,
    options: &IngestOptions,
) -> Result<IngestOutcome<T>, IngestError>
where
    T: ParseLine + Send + 'static,
    R: AsyncRead + Send + Unpin,
{
    let capacity = options.queue_capacity.max(1);
    let (line_tx, line_rx) = mpsc::channel::<String>(capacity);
    let (entry_tx, mut entry_rx) = mpsc::channel::<T>(capacity);
    let line_rx = Arc::new(Mutex::new(line_rx));
    let malformed = Arc::new(AtomicUsize::new(0));

    let mut workers = JoinSet::new();
    for _ in 0..options.workers.max(1) {
        let line_rx = Arc::clone(&line_rx);
        let entry_tx = entry_tx.clone();
        let malformed = Arc::clone(&malformed);
        workers.spawn(async move {
            loop {
                let line = line_rx.lock().await.recv().await;
                let Some(line) = line else {
                    break;
                };
                match T::parse_line(&line) {
                    Ok(Some(entry)) => {
                        if entry_tx.send(entry).await.is_err() {
                            break;
                        }
                    }
                    Ok(None) => {}
                    Err(err) => {
                        debug!("Dropping malformed {} line: {err}", T::FORMAT);
                        malformed.fetch_add(1, Ordering::Relaxed);
                    }
                }
            }
        });
    }

    let supervisor = tokio::spawn(async move {
        let mut failure = None;
        while let Some(result) = workers.join_next().await {
            if let Err(err) = result {
                failure = Some(err.to_string());
            }
        }
        // every worker is done, close the result queue
        drop(entry_tx);
        failure
    });

    let collector = tokio::spawn(async move {
        let mut entries = Vec::new();
        while let Some(entry) = entry_rx.recv().await {
            entries.push(entry);
        }
        entries
    });

    let mut frames = FramedRead::new(
        reader,
        AnyDelimiterCodec::new_with_max_length(
            b"\n".to_vec(),
            Vec::new(),
            options.max_line_length,
        ),
    );
    let mut lines = 0;
    let mut read_error = None;
    while let Some(frame) = frames.next().await {
        match frame {
            Ok(frame) => {
                lines += 1;
                if line_tx.send(frame_to_line(&frame)).await.is_err() {
                    break;
                }
            }
            Err(AnyDelimiterCodecError::MaxChunkLengthExceeded) => {
                read_error = Some(IngestError::LineTooLong {
                    max: options.max_line_length,
                });
                break;
            }
            Err(AnyDelimiterCodecError::Io(err)) => {
                read_error = Some(IngestError::Read(err));
                break;
            }
        }
    }
    drop(line_tx);

    let worker_failure = supervisor
        .await
        .map_err(|err| IngestError::Worker(err.to_string()))?;
    let entries = collector
        .await
        .map_err(|err| IngestError::Worker(err.to_string()))?;

    if let Some(err) = read_error {
        return Err(err);
    }
    if let Some(failure) = worker_failure {
        return Err(IngestError::Worker(failure));
    }

    let malformed = malformed.load(Ordering::Relaxed);
    if malformed > 0 {
        warn!("Skipped {malformed} malformed {} lines out of {lines}", T::FORMAT);
    }
    Ok(IngestOutcome {
        entries,
        malformed,
        lines,
    })
}
