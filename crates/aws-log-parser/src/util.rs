// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Numeric coercions shared by the log-line parsers.
//!
//! AWS access logs mark unreported values with `-` (or leave the column empty).
//! Every numeric column is coerced through these helpers, which map the absent
//! sentinel to zero. Zero therefore cannot be told apart from "not reported".

/// Returns true when the column holds the absent sentinel (`-` or empty).
#[inline]
pub fn is_absent(value: &str) -> bool {
    value.is_empty() || value == "-"
}

/// Parses a 64-bit integer column.
///
/// The absent sentinel and unparseable text both yield zero.
///
/// # Examples
///
/// ```
/// use aws_log_parser::util::parse_int;
///
/// assert_eq!(parse_int("392"), 392);
/// assert_eq!(parse_int("-"), 0);
/// assert_eq!(parse_int(""), 0);
/// ```
pub fn parse_int(value: &str) -> i64 {
    if is_absent(value) {
        return 0;
    }
    value.parse().unwrap_or_default()
}

/// Parses a 32-bit integer column (ports, status codes, counters).
pub fn parse_small_int(value: &str) -> i32 {
    if is_absent(value) {
        return 0;
    }
    value.parse().unwrap_or_default()
}

/// Parses a floating point column (durations in seconds or milliseconds).
///
/// # Examples
///
/// ```
/// use aws_log_parser::util::parse_float;
///
/// assert_eq!(parse_float("0.001"), 0.001);
/// assert_eq!(parse_float("-1"), -1.0);
/// assert_eq!(parse_float("-"), 0.0);
/// ```
pub fn parse_float(value: &str) -> f64 {
    if is_absent(value) {
        return 0.0;
    }
    value.parse().unwrap_or_default()
}

/// Returns true for records the parsers skip silently: blank lines and `#` comments.
#[inline]
pub fn is_skippable(line: &str) -> bool {
    line.is_empty() || line.starts_with('#')
}
