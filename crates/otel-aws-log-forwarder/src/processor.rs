// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Format dispatch by object location.
//!
//! AWS writes each log type under a recognisable bucket/key layout. The registry
//! tries each processor's predicate in a fixed order and the first match owns the
//! object. An object nobody claims is unsupported, which is not an error.

use std::sync::{Arc, OnceLock};

use aws_log_parser::{
    file::parse_reader, AlbLogEntry, CloudFrontLogEntry, LogEntry, NlbLogEntry, ParseLine,
    WafLogEntry,
};
use regex::Regex;
use tracing::debug;

use crate::adapter::{KeyContext, LogAdapter};
use crate::errors::IngestError;
use crate::ingest::{ingest, IngestOptions};
use crate::source::ObjectSource;

const AWS_LOGS_KEY_PATTERN: &str = r"AWSLogs/(\d+)/[^/]+/([^/]+)/";

/// `<DISTRIBUTION>.<YYYY-MM-DD-HH>.<unique id>[.gz]`
const CLOUDFRONT_OBJECT_PATTERN: &str =
    r"(?:^|/)([A-Z0-9]+)\.\d{4}-\d{2}-\d{2}-\d{2}\.[A-Za-z0-9]+(?:\.gz)?$";

#[allow(clippy::expect_used)]
fn aws_logs_key_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(AWS_LOGS_KEY_PATTERN).expect("key pattern is valid"))
}

#[allow(clippy::expect_used)]
fn cloudfront_object_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(CLOUDFRONT_OBJECT_PATTERN).expect("CloudFront object pattern is valid")
    })
}

/// Extracts `(account id, region)` from `.../AWSLogs/<account>/<service>/<region>/...`.
///
/// Returns empty strings when the key does not follow that layout.
pub fn parse_region_account_from_key(key: &str) -> (String, String) {
    match aws_logs_key_pattern().captures(key) {
        Some(captures) => (
            captures[1].to_string(),
            captures[2].to_string(),
        ),
        None => (String::new(), String::new()),
    }
}

/// Extracts the distribution id from a CloudFront standard log object name.
pub fn parse_distribution_id_from_key(key: &str) -> Option<String> {
    cloudfront_object_pattern()
        .captures(key)
        .map(|captures| captures[1].to_string())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogProcessor {
    Waf,
    Alb,
    Nlb,
    CloudFront,
}

/// Adapters produced from one object.
#[derive(Debug, Default)]
pub struct Processed {
    pub adapters: Vec<LogAdapter>,
    /// Records dropped as malformed.
    pub malformed: usize,
}

impl Processed {
    fn new<T>(entries: Vec<T>, malformed: usize, context: &Arc<KeyContext>) -> Self
    where
        T: Into<LogEntry>,
    {
        Processed {
            adapters: entries
                .into_iter()
                .map(|entry| LogAdapter::new(entry, Arc::clone(context)))
                .collect(),
            malformed,
        }
    }
}

impl LogProcessor {
    pub fn name(&self) -> &'static str {
        match self {
            LogProcessor::Waf => "WAF",
            LogProcessor::Alb => "ALB",
            LogProcessor::Nlb => "NLB",
            LogProcessor::CloudFront => "CloudFront",
        }
    }

    pub fn matches(&self, bucket: &str, key: &str) -> bool {
        match self {
            LogProcessor::Waf => {
                bucket.starts_with("aws-waf-logs-")
                    && key.contains("/WAFLogs/")
                    && key.contains("_waflogs_")
            }
            LogProcessor::Alb => key.contains("/elasticloadbalancing/") && key.contains("_app."),
            LogProcessor::Nlb => key.contains("/elasticloadbalancing/") && key.contains("_net."),
            LogProcessor::CloudFront => cloudfront_object_pattern().is_match(key),
        }
    }

    /// Reads, decompresses and parses one object into adapters.
    ///
    /// Line formats go through the streaming ingestor and drop malformed lines.
    /// WAF objects are parsed whole and fail on the first malformed record.
    pub async fn process(
        &self,
        source: &dyn ObjectSource,
        bucket: &str,
        key: &str,
        options: &IngestOptions,
    ) -> Result<Processed, IngestError> {
        let context = Arc::new(KeyContext::from_key(key));
        debug!(
            "Processing {bucket}/{key} as {} (account {:?}, region {:?})",
            self.name(),
            context.account_id,
            context.region
        );

        let reader = source.open(bucket, key).await?;
        match self {
            LogProcessor::Waf => {
                let parsed = parse_reader::<WafLogEntry, _>(key, reader).await?;
                Ok(Processed::new(parsed.entries, parsed.malformed, &context))
            }
            LogProcessor::Alb => stream::<AlbLogEntry>(reader, key, options, &context).await,
            LogProcessor::Nlb => stream::<NlbLogEntry>(reader, key, options, &context).await,
            LogProcessor::CloudFront => {
                stream::<CloudFrontLogEntry>(reader, key, options, &context).await
            }
        }
    }
}

async fn stream<T>(
    reader: Box<dyn tokio::io::AsyncRead + Send + Unpin>,
    key: &str,
    options: &IngestOptions,
    context: &Arc<KeyContext>,
) -> Result<Processed, IngestError>
where
    T: ParseLine + Into<LogEntry> + Send + 'static,
{
    let reader = aws_log_parser::file::maybe_decompress(key, reader);
    let outcome = ingest::<T, _>(reader, options).await?;
    Ok(Processed::new(outcome.entries, outcome.malformed, context))
}

/// Ordered list of processors; the first whose predicate matches wins.
#[derive(Debug, Clone)]
pub struct ProcessorRegistry {
    processors: Vec<LogProcessor>,
}

impl Default for ProcessorRegistry {
    fn default() -> Self {
        ProcessorRegistry {
            processors: vec![
                LogProcessor::Waf,
                LogProcessor::Alb,
                LogProcessor::Nlb,
                LogProcessor::CloudFront,
            ],
        }
    }
}

impl ProcessorRegistry {
    pub fn new(processors: Vec<LogProcessor>) -> Self {
        ProcessorRegistry { processors }
    }

    pub fn select(&self, bucket: &str, key: &str) -> Option<LogProcessor> {
        self.processors
            .iter()
            .copied()
            .find(|processor| processor.matches(bucket, key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALB_KEY: &str = "AWSLogs/123456789012/elasticloadbalancing/us-east-1/2023/01/01/123456789012_elasticloadbalancing_us-east-1_app.my-lb.50dc6c495c0c9188_20230101T0000Z_1.2.3.4_5678.log.gz";
    const NLB_KEY: &str = "AWSLogs/123456789012/elasticloadbalancing/eu-west-1/2023/01/01/123456789012_elasticloadbalancing_eu-west-1_net.my-nlb.1234567890abcdef_20230101T0000Z_1a2b3c4d.log.gz";
    const WAF_KEY: &str = "KEY-NAME-PREFIX/AWSLogs/123456789012/WAFLogs/us-east-1/TEST-WEBACL/2023/01/01/00/00/123456789012_waflogs_us-east-1_TEST-WEBACL_20230101T0000Z_hash.log.gz";
    const CLOUDFRONT_KEY: &str = "cdn-logs/E2K2LNL5N3WR51.2023-01-01-00.a1b2c3d4.gz";

    #[test]
    fn test_parse_region_account_from_key() {
        assert_eq!(
            parse_region_account_from_key("AWSLogs/123456789012/elasticloadbalancing/us-east-1/2023/"),
            ("123456789012".to_string(), "us-east-1".to_string())
        );
        assert_eq!(
            parse_region_account_from_key(WAF_KEY),
            ("123456789012".to_string(), "us-east-1".to_string())
        );
        assert_eq!(
            parse_region_account_from_key("logs/2023/01/01/file.log"),
            (String::new(), String::new())
        );
        assert_eq!(
            parse_region_account_from_key("AWSLogs/not-digits/elasticloadbalancing/us-east-1/"),
            (String::new(), String::new())
        );
    }

    #[test]
    fn test_parse_distribution_id_from_key() {
        assert_eq!(
            parse_distribution_id_from_key(CLOUDFRONT_KEY).as_deref(),
            Some("E2K2LNL5N3WR51")
        );
        assert_eq!(
            parse_distribution_id_from_key("EMLARXS9EXAMPLE.2019-11-14-20.RT4KCN4SGK9.gz").as_deref(),
            Some("EMLARXS9EXAMPLE")
        );
        assert_eq!(parse_distribution_id_from_key(ALB_KEY), None);
    }

    #[test]
    fn test_waf_predicate() {
        let waf = LogProcessor::Waf;
        assert!(waf.matches("aws-waf-logs-test", WAF_KEY));
        assert!(waf.matches(
            "aws-waf-logs-custom",
            "some/prefix/WAFLogs/us-east-1/my-acl/123_waflogs_file.log"
        ));
        assert!(!waf.matches("my-bucket", WAF_KEY));
        assert!(!waf.matches("aws-waf-logs-prod", ALB_KEY));
    }

    #[test]
    fn test_select_first_match_wins() {
        let registry = ProcessorRegistry::default();
        assert_eq!(
            registry.select("aws-waf-logs-test", WAF_KEY),
            Some(LogProcessor::Waf)
        );
        assert_eq!(registry.select("my-bucket", ALB_KEY), Some(LogProcessor::Alb));
        assert_eq!(registry.select("my-bucket", NLB_KEY), Some(LogProcessor::Nlb));
        assert_eq!(
            registry.select("my-bucket", CLOUDFRONT_KEY),
            Some(LogProcessor::CloudFront)
        );
        assert_eq!(registry.select("my-bucket", "random/object.txt"), None);
    }

    #[test]
    fn test_registration_order_decides_ties() {
        // Both load balancer predicates match; whichever is registered first wins.
        let key = "x/elasticloadbalancing/y/_app._net.log";
        let registry = ProcessorRegistry::new(vec![LogProcessor::Nlb, LogProcessor::Alb]);
        assert_eq!(registry.select("b", key), Some(LogProcessor::Nlb));
        assert_eq!(ProcessorRegistry::default().select("b", key), Some(LogProcessor::Alb));
    }

    #[test]
    fn test_names() {
        assert_eq!(LogProcessor::Waf.name(), "WAF");
        assert_eq!(LogProcessor::Alb.name(), "ALB");
        assert_eq!(LogProcessor::Nlb.name(), "NLB");
        assert_eq!(LogProcessor::CloudFront.name(), "CloudFront");
    }
}
