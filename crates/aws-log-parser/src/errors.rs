// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use crate::LogFormat;

/// Structural failure while parsing a single raw record.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("invalid number of fields: got {got}, expected {expected}")]
    FieldCount { got: usize, expected: usize },

    #[error("failed to parse {format} log line")]
    NoMatch { format: LogFormat },

    #[error("failed to parse {format} record: {source}")]
    Json {
        format: LogFormat,
        #[source]
        source: serde_json::Error,
    },
}

/// Failure of the file-level driver.
#[derive(Debug, thiserror::Error)]
pub enum ParseFileError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed record at line {line}: {source}")]
    Record {
        line: usize,
        #[source]
        source: ParseError,
    },
}
