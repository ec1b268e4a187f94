// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Parsers for AWS access logs delivered to S3.
//!
//! Four vendor grammars are supported:
//!
//! - CloudFront standard logs (tab separated, 33 fixed columns)
//! - Application Load Balancer access logs (space delimited, quoted fields)
//! - Network Load Balancer TLS access logs (space delimited)
//! - WAF logs (one JSON document per line)
//!
//! Every parser shares one contract: blank and `#` comment records yield `Ok(None)`,
//! structurally malformed records yield an error, and absent numeric columns are
//! coerced to zero (see [`util`]).

#![cfg_attr(not(test), deny(clippy::panic))]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::todo))]
#![cfg_attr(not(test), deny(clippy::unimplemented))]

pub mod alb;
pub mod cloudfront;
pub mod errors;
pub mod file;
pub mod nlb;
pub mod util;
pub mod waf;

pub use alb::AlbLogEntry;
pub use cloudfront::CloudFrontLogEntry;
pub use errors::{ParseError, ParseFileError};
pub use nlb::NlbLogEntry;
pub use waf::WafLogEntry;

use std::fmt;

/// The log grammars understood by this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogFormat {
    CloudFront,
    Alb,
    Nlb,
    Waf,
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::CloudFront => "CloudFront",
            Self::Alb => "ALB",
            Self::Nlb => "NLB",
            Self::Waf => "WAF",
        };
        f.write_str(name)
    }
}

/// What the file-level driver does with a structurally malformed record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnMalformed {
    /// Drop the record and keep going.
    Skip,
    /// Fail the whole file.
    Abort,
}

/// A typed entry parsed from one raw record.
pub trait ParseLine: Sized {
    const FORMAT: LogFormat;
    const ON_MALFORMED: OnMalformed;

    /// Parses one raw record.
    ///
    /// Returns `Ok(None)` for blank and comment records.
    fn parse_line(line: &str) -> Result<Option<Self>, ParseError>;
}

/// One parsed record of any supported format.
#[derive(Debug, Clone, PartialEq)]
pub enum LogEntry {
    CloudFront(CloudFrontLogEntry),
    Alb(AlbLogEntry),
    Nlb(NlbLogEntry),
    Waf(WafLogEntry),
}

impl LogEntry {
    pub fn format(&self) -> LogFormat {
        match self {
            Self::CloudFront(_) => LogFormat::CloudFront,
            Self::Alb(_) => LogFormat::Alb,
            Self::Nlb(_) => LogFormat::Nlb,
            Self::Waf(_) => LogFormat::Waf,
        }
    }
}

impl From<CloudFrontLogEntry> for LogEntry {
    fn from(entry: CloudFrontLogEntry) -> Self {
        Self::CloudFront(entry)
    }
}

impl From<AlbLogEntry> for LogEntry {
    fn from(entry: AlbLogEntry) -> Self {
        Self::Alb(entry)
    }
}

impl From<NlbLogEntry> for LogEntry {
    fn from(entry: NlbLogEntry) -> Self {
        Self::Nlb(entry)
    }
}

impl From<WafLogEntry> for LogEntry {
    fn from(entry: WafLogEntry) -> Self {
        Self::Waf(entry)
    }
}

/// Parses one record of the given format into a [`LogEntry`].
pub fn parse_line(format: LogFormat, line: &str) -> Result<Option<LogEntry>, ParseError> {
    match format {
        LogFormat::CloudFront => Ok(CloudFrontLogEntry::parse_line(line)?.map(LogEntry::from)),
        LogFormat::Alb => Ok(AlbLogEntry::parse_line(line)?.map(LogEntry::from)),
        LogFormat::Nlb => Ok(NlbLogEntry::parse_line(line)?.map(LogEntry::from)),
        LogFormat::Waf => Ok(WafLogEntry::parse_line(line)?.map(LogEntry::from)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_and_comment_lines_are_skipped_for_every_format() {
        for format in [
            LogFormat::CloudFront,
            LogFormat::Alb,
            LogFormat::Nlb,
            LogFormat::Waf,
        ] {
            for line in ["", "   ", "#Version: 1.0", "  # indented comment"] {
                let parsed = parse_line(format, line);
                assert!(
                    matches!(parsed, Ok(None)),
                    "{format} should skip {line:?}, got {parsed:?}"
                );
            }
        }
    }

    #[test]
    fn test_garbage_is_a_structural_error_for_every_format() {
        for format in [
            LogFormat::CloudFront,
            LogFormat::Alb,
            LogFormat::Nlb,
            LogFormat::Waf,
        ] {
            assert!(parse_line(format, "invalid log line").is_err(), "{format}");
        }
    }

    #[test]
    fn test_entry_reports_its_format() {
        let line = "tls 2.0 2023-10-01T00:00:00.000000Z net/my-nlb/1 listener/net/my-nlb/1/2 1.2.3.4:1 5.6.7.8:2 0.1 0.2 1 2 - - - - - - - - - -";
        let entry = parse_line(LogFormat::Nlb, line)
            .expect("parse")
            .expect("entry");
        assert_eq!(entry.format(), LogFormat::Nlb);
    }
}
