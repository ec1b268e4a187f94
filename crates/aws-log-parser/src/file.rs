// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Whole-file parsing with transparent gzip decompression.

use std::path::Path;

use async_compression::tokio::bufread::GzipDecoder;
use tokio::io::{AsyncRead, AsyncReadExt, BufReader};
use tracing::{debug, warn};

use crate::errors::ParseFileError;
use crate::{OnMalformed, ParseLine};

/// Suffix that marks a gzip compressed object.
pub const GZIP_SUFFIX: &str = ".gz";

/// Returns true when the key or path names a gzip compressed object.
pub fn is_gzip(name: &str) -> bool {
    name.ends_with(GZIP_SUFFIX)
}

/// Wraps `reader` in a gzip decoder when `name` ends in `.gz`.
///
/// AWS concatenates gzip members when it rolls log objects, so every member is
/// decoded rather than stopping after the first.
pub fn maybe_decompress<R>(name: &str, reader: R) -> Box<dyn AsyncRead + Send + Unpin>
where
    R: AsyncRead + Send + Unpin + 'static,
{
    if is_gzip(name) {
        let mut decoder = GzipDecoder::new(BufReader::new(reader));
        decoder.multiple_members(true);
        Box::new(decoder)
    } else {
        Box::new(reader)
    }
}

/// Per-file parse result.
#[derive(Debug)]
pub struct ParsedFile<T> {
    pub entries: Vec<T>,
    /// Records dropped as malformed. Always zero for formats that abort instead.
    pub malformed: usize,
}

impl<T> Default for ParsedFile<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            malformed: 0,
        }
    }
}

/// Parses already decompressed content, honouring the format's malformed-record policy.
pub fn parse_records<T: ParseLine>(content: &str) -> Result<ParsedFile<T>, ParseFileError> {
    let mut parsed = ParsedFile::default();
    for (index, line) in content.lines().enumerate() {
        match T::parse_line(line) {
            Ok(Some(entry)) => parsed.entries.push(entry),
            Ok(None) => {}
            Err(source) => match T::ON_MALFORMED {
                OnMalformed::Skip => {
                    debug!(
                        "Skipping malformed {} record at line {}: {source}",
                        T::FORMAT,
                        index + 1
                    );
                    parsed.malformed += 1;
                }
                OnMalformed::Abort => {
                    return Err(ParseFileError::Record {
                        line: index + 1,
                        source,
                    })
                }
            },
        }
    }
    if parsed.malformed > 0 {
        warn!(
            "Skipped {} malformed {} records",
            parsed.malformed,
            T::FORMAT
        );
    }
    Ok(parsed)
}

/// Reads a whole (possibly compressed) stream and parses it.
///
/// Invalid UTF-8 is replaced with U+FFFD, so it only affects the records it appears in.
pub async fn parse_reader<T, R>(name: &str, reader: R) -> Result<ParsedFile<T>, ParseFileError>
where
    T: ParseLine,
    R: AsyncRead + Send + Unpin + 'static,
{
    let mut content = Vec::new();
    maybe_decompress(name, reader)
        .read_to_end(&mut content)
        .await
        .map_err(|source| ParseFileError::Io {
            path: name.to_string(),
            source,
        })?;
    parse_records(&String::from_utf8_lossy(&content))
}

/// Opens and parses a log file from disk.
///
/// # Examples
///
/// ```no_run
/// use aws_log_parser::{file::parse_file, CloudFrontLogEntry};
///
/// # async fn run() -> Result<(), aws_log_parser::ParseFileError> {
/// let parsed = parse_file::<CloudFrontLogEntry>("E2K2LNL5N3WR51.2024-01-01-00.abcd.gz").await?;
/// println!("{} entries", parsed.entries.len());
/// # Ok(())
/// # }
/// ```
pub async fn parse_file<T: ParseLine>(
    path: impl AsRef<Path>,
) -> Result<ParsedFile<T>, ParseFileError> {
    let path = path.as_ref();
    let name = path.to_string_lossy().into_owned();
    let file = tokio::fs::File::open(path)
        .await
        .map_err(|source| ParseFileError::Io {
            path: name.clone(),
            source,
        })?;
    parse_reader(&name, file).await
}
