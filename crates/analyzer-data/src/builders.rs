//! Typed record builders, one per schema.
//!
//! Every builder is a filter-then-map over its input: rows with a missing
//! required string or a numeric field that is not a finite number are
//! dropped, never defaulted. The drop count is returned alongside the
//! records so callers can log it; nothing else is reported.

use std::sync::OnceLock;

use analyzer_core::models::{
    ErrorSummaryEntry, LoadBalancerSummaryEntry, PerformanceMetricsEntry, SlowQueryEntry,
};
use regex::Regex;

use crate::tabular::Row;

/// Records that validated plus the number of inputs that did not.
#[derive(Debug, Clone, PartialEq)]
pub struct BuildOutcome<T> {
    pub records: Vec<T>,
    pub dropped: usize,
}

impl<T> Default for BuildOutcome<T> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            dropped: 0,
        }
    }
}

// ── Field coercion ────────────────────────────────────────────────────────────

/// Parse a finite floating-point value. Empty input is not a number.
pub fn parse_number(raw: Option<&str>) -> Option<f64> {
    let value: f64 = raw?.trim().parse().ok()?;
    value.is_finite().then_some(value)
}

fn player_id_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"/([0-9]+)(?:/[^/]+)?$").expect("regex is valid"))
}

/// Extract the trailing numeric path segment of a request URL.
///
/// The digits may be followed by one more path segment, so both
/// `/players/42` and `/players/42/profile` yield `"42"`. Returns an empty
/// string when there is no such segment.
pub fn extract_player_id(url: &str) -> String {
    player_id_pattern()
        .captures(url)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_default()
}

fn collect_valid<T>(rows: &[Row], build: impl Fn(&Row) -> Option<T>) -> BuildOutcome<T> {
    let records: Vec<T> = rows.iter().filter_map(build).collect();
    let dropped = rows.len() - records.len();
    BuildOutcome { records, dropped }
}

// ── Tabular builders ──────────────────────────────────────────────────────────

/// Build load-balancer summary records.
///
/// Requires `normalized_url`, `elb_status_code`, `request_verb`,
/// `processing_time_bucket` and numeric `count`, `total_requests`,
/// `percentage`.
pub fn build_load_balancer(rows: &[Row]) -> BuildOutcome<LoadBalancerSummaryEntry> {
    collect_valid(rows, |row| {
        Some(LoadBalancerSummaryEntry {
            normalized_url: row.non_empty("normalized_url")?.to_string(),
            status_code: row.non_empty("elb_status_code")?.to_string(),
            verb: row.non_empty("request_verb")?.to_string(),
            time_bucket: row.non_empty("processing_time_bucket")?.to_string(),
            count: parse_number(row.get("count"))?,
            total_requests: parse_number(row.get("total_requests"))?,
            percentage: parse_number(row.get("percentage"))?,
        })
    })
}

/// Build performance-metrics records.
///
/// Requires `base_url` and every numeric column. `request_verb` may be empty.
pub fn build_performance(rows: &[Row]) -> BuildOutcome<PerformanceMetricsEntry> {
    collect_valid(rows, |row| {
        let num = |column: &str| parse_number(row.get(column));
        Some(PerformanceMetricsEntry {
            base_url: row.non_empty("base_url")?.to_string(),
            verb: row.get("request_verb").unwrap_or_default().to_string(),
            min_rt: num("min_rt")?,
            max_rt: num("max_rt")?,
            avg_rt: num("avg_rt")?,
            p25: num("P25")?,
            p50: num("P50")?,
            p60: num("P60")?,
            p75: num("P75")?,
            p90: num("P90")?,
            p95: num("P95")?,
            total: num("total")?,
            requests: num("requests")?,
        })
    })
}

/// Build slow-request records.
///
/// Requires `time`, `request_url`, `elb_status_code` and numeric
/// `processing_time`. A URL without a numeric tail keeps the row with an
/// empty player id.
pub fn build_slow_queries(rows: &[Row]) -> BuildOutcome<SlowQueryEntry> {
    collect_valid(rows, |row| {
        let request_url = row.non_empty("request_url")?;
        Some(SlowQueryEntry {
            timestamp: row.non_empty("time")?.to_string(),
            processing_time_seconds: parse_number(row.get("processing_time"))?,
            request_url: request_url.to_string(),
            player_id: extract_player_id(request_url),
            status_code: row.non_empty("elb_status_code")?.to_string(),
        })
    })
}

// ── Error summary (line oriented) ─────────────────────────────────────────────

fn error_line_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"^\s*([0-9]+)\s+(?:"([^"]+)"|(\{.*\})|(.+))$"#).expect("regex is valid")
    })
}

/// Parse one `<count> <message>` line.
///
/// The message is the quoted text without its quotes, a `{...}` literal kept
/// verbatim, or the remaining plain text. Quoted and plain messages are
/// trimmed.
pub fn parse_error_line(line: &str) -> Option<ErrorSummaryEntry> {
    let caps = error_line_pattern().captures(line)?;
    let count = caps.get(1)?.as_str().parse::<u64>().ok()?;

    let message = if let Some(json) = caps.get(3) {
        json.as_str().to_string()
    } else {
        caps.get(2)
            .or_else(|| caps.get(4))?
            .as_str()
            .trim()
            .to_string()
    };

    Some(ErrorSummaryEntry { count, message })
}

/// Build error-summary records from raw text, one record per line.
///
/// Blank lines are ignored; any other line that does not match is dropped.
pub fn build_error_summary(text: &str) -> BuildOutcome<ErrorSummaryEntry> {
    let mut outcome = BuildOutcome::default();
    for line in text.trim().lines().filter(|l| !l.trim().is_empty()) {
        match parse_error_line(line) {
            Some(entry) => outcome.records.push(entry),
            None => outcome.dropped += 1,
        }
    }
    outcome
}

// ── Tests ─────────────────────────────────────────────────────────────────────
