//! Structural schema detection.
//!
//! Detection never looks at file names: a blob is an error summary when its
//! first non-empty line reads `<count> "<text>"` or `<count> {<json>}`,
//! otherwise it is parsed as CSV and the header decides. Any header that
//! matches no known shape is treated as a load-balancer summary.

use std::sync::OnceLock;

use analyzer_core::models::RecordSchema;
use regex::Regex;

use crate::tabular::parse_table;

/// Columns whose joint presence marks a slow-request export.
pub const SLOW_QUERY_COLUMNS: [&str; 3] = ["time", "processing_time", "request_url"];

/// Columns whose joint presence marks a performance-metrics export.
pub const PERFORMANCE_COLUMNS: [&str; 2] = ["base_url", "min_rt"];

fn quoted_line_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"^\s*[0-9]+\s+".*"$"#).expect("regex is valid"))
}

fn json_line_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\s*[0-9]+\s+\{.*\}$").expect("regex is valid"))
}

/// First line of `text` after leading blank lines, trimmed.
pub fn first_non_empty_line(text: &str) -> Option<&str> {
    text.lines().map(str::trim).find(|l| !l.is_empty())
}

/// `true` when the first non-empty line has the error-summary shape.
pub fn sniff_error_summary(text: &str) -> bool {
    match first_non_empty_line(text) {
        Some(line) => quoted_line_pattern().is_match(line) || json_line_pattern().is_match(line),
        None => false,
    }
}

/// Pick a tabular schema from a parsed header row. First match wins.
pub fn classify_header<S: AsRef<str>>(headers: &[S]) -> RecordSchema {
    let has = |column: &str| headers.iter().any(|h| h.as_ref() == column);

    if SLOW_QUERY_COLUMNS.iter().all(|&c| has(c)) {
        RecordSchema::SlowQuery
    } else if PERFORMANCE_COLUMNS.iter().all(|&c| has(c)) {
        RecordSchema::PerformanceMetrics
    } else {
        RecordSchema::LoadBalancerSummary
    }
}

/// Classify a raw text blob.
pub fn classify(text: &str) -> RecordSchema {
    if sniff_error_summary(text) {
        return RecordSchema::ErrorSummary;
    }
    classify_header(&parse_table(text).headers)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
