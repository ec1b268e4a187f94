// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Forwards AWS access logs stored in S3 to an OTLP/HTTP logs endpoint.
//!
//! An object announced by a [`trigger`] event is claimed by a
//! [`processor::LogProcessor`], streamed and parsed by the [`ingest`] worker pool,
//! wrapped in [`adapter::LogAdapter`]s, grouped per producing resource by [`group`]
//! and posted in bounded batches by [`flusher::Deliverer`].

#![cfg_attr(not(test), deny(clippy::panic))]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::todo))]
#![cfg_attr(not(test), deny(clippy::unimplemented))]

pub mod adapter;
pub mod config;
pub mod errors;
pub mod flusher;
pub mod forwarder;
pub mod group;
pub mod ingest;
pub mod otel;
pub mod processor;
pub mod source;
pub mod trigger;
