//! Derived views over loaded datasets.
//!
//! Every function here is pure: it borrows records and returns freshly
//! computed values. Nothing is cached and nothing is written back to the
//! store.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use analyzer_core::constants::{
    MIN_GRAPH_REQUESTS, SLOW_BUCKET_THRESHOLD_SECS, SLOW_LABEL_SUFFIX, UNKNOWN_KEY,
};
use analyzer_core::error::AnalyzerError;
use analyzer_core::formatting::endpoint_path;
use analyzer_core::models::{LoadBalancerSummaryEntry, PerformanceMetricsEntry, SlowQueryEntry};
use analyzer_core::severity::SeverityTier;
use serde::Serialize;

use crate::table::locale_cmp;

fn key_or_unknown(value: &str) -> &str {
    if value.is_empty() {
        UNKNOWN_KEY
    } else {
        value
    }
}

// ── Distributions ─────────────────────────────────────────────────────────────

/// One slice of a pie-style distribution.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistributionSlice {
    pub name: String,
    pub value: f64,
}

fn distribution<'a, I, F>(entries: I, key: F) -> Vec<DistributionSlice>
where
    I: IntoIterator<Item = &'a LoadBalancerSummaryEntry>,
    F: Fn(&LoadBalancerSummaryEntry) -> &str,
{
    let mut totals: BTreeMap<String, f64> = BTreeMap::new();
    for entry in entries {
        *totals
            .entry(key_or_unknown(key(entry)).to_string())
            .or_default() += entry.count;
    }
    totals
        .into_iter()
        .map(|(name, value)| DistributionSlice { name, value })
        .collect()
}

/// Sum of `count` per status code, ordered by code.
pub fn status_distribution<'a>(
    entries: impl IntoIterator<Item = &'a LoadBalancerSummaryEntry>,
) -> Vec<DistributionSlice> {
    distribution(entries, |e| e.status_code.as_str())
}

/// Sum of `count` per HTTP verb, ordered by verb.
pub fn verb_distribution<'a>(
    entries: impl IntoIterator<Item = &'a LoadBalancerSummaryEntry>,
) -> Vec<DistributionSlice> {
    distribution(entries, |e| e.verb.as_str())
}

// ── Time buckets ──────────────────────────────────────────────────────────────

/// Lower bound in seconds of a bucket label such as `"0.3-1"` or `"30+"`.
///
/// Reads the leading number before the first `-`. Returns `None` for
/// `"unknown"` and for labels that do not start with a number.
pub fn bucket_lower_bound(bucket: &str) -> Option<f64> {
    let head = bucket.split('-').next().unwrap_or_default().trim();
    let end = head
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(head.len());
    head[..end].parse::<f64>().ok().filter(|v| v.is_finite())
}

/// `true` when the bucket starts at or beyond the slow threshold.
pub fn is_slow_bucket(bucket: &str) -> bool {
    bucket_lower_bound(bucket).is_some_and(|lb| lb >= SLOW_BUCKET_THRESHOLD_SECS)
}

/// Display order of two bucket labels: numeric lower bound ascending, then
/// labels without a readable bound, then `"unknown"`.
pub fn compare_buckets(a: &str, b: &str) -> Ordering {
    fn rank(bucket: &str) -> (u8, f64) {
        if bucket == UNKNOWN_KEY {
            (2, 0.0)
        } else {
            match bucket_lower_bound(bucket) {
                Some(lb) => (0, lb),
                None => (1, 0.0),
            }
        }
    }
    let (ra, la) = rank(a);
    let (rb, lb) = rank(b);
    ra.cmp(&rb)
        .then_with(|| la.total_cmp(&lb))
        .then_with(|| a.cmp(b))
}

/// Request counts for one time bucket, split by status code.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeBucketRow {
    pub bucket: String,
    pub counts: BTreeMap<String, f64>,
    pub total: f64,
}

/// Histogram of `count` grouped by time bucket and status code.
pub fn time_bucket_histogram<'a>(
    entries: impl IntoIterator<Item = &'a LoadBalancerSummaryEntry>,
) -> Vec<TimeBucketRow> {
    let mut buckets: BTreeMap<String, BTreeMap<String, f64>> = BTreeMap::new();
    for entry in entries {
        *buckets
            .entry(key_or_unknown(&entry.time_bucket).to_string())
            .or_default()
            .entry(key_or_unknown(&entry.status_code).to_string())
            .or_default() += entry.count;
    }

    let mut rows: Vec<TimeBucketRow> = buckets
        .into_iter()
        .map(|(bucket, counts)| TimeBucketRow {
            total: counts.values().sum(),
            bucket,
            counts,
        })
        .collect();
    rows.sort_by(|a, b| compare_buckets(&a.bucket, &b.bucket));
    rows
}

/// Distinct status codes, sorted. One histogram series per code.
pub fn unique_status_codes<'a>(
    entries: impl IntoIterator<Item = &'a LoadBalancerSummaryEntry>,
) -> Vec<String> {
    entries
        .into_iter()
        .map(|e| e.status_code.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

// ── Endpoints ─────────────────────────────────────────────────────────────────

/// A `(normalized_url, verb)` pair seen in the load-balancer summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EndpointSummary {
    pub url: String,
    pub verb: String,
    /// Any of the endpoint's buckets starts at or beyond the slow threshold.
    pub has_slow_requests: bool,
}

impl EndpointSummary {
    /// `"{verb} {url}"`, suffixed with `" (Slow)"` for slow endpoints.
    pub fn label(&self) -> String {
        let suffix = if self.has_slow_requests {
            SLOW_LABEL_SUFFIX
        } else {
            ""
        };
        format!("{} {}{}", self.verb, self.url, suffix)
    }
}

/// Every distinct endpoint with its slow flag, ordered by label.
pub fn endpoint_summaries(entries: &[LoadBalancerSummaryEntry]) -> Vec<EndpointSummary> {
    let mut slow: BTreeMap<(&str, &str), bool> = BTreeMap::new();
    for entry in entries {
        let flag = slow
            .entry((entry.normalized_url.as_str(), entry.verb.as_str()))
            .or_default();
        *flag |= is_slow_bucket(&entry.time_bucket);
    }

    let mut endpoints: Vec<EndpointSummary> = slow
        .into_iter()
        .map(|((url, verb), has_slow_requests)| EndpointSummary {
            url: url.to_string(),
            verb: verb.to_string(),
            has_slow_requests,
        })
        .collect();
    endpoints.sort_by(|a, b| locale_cmp(&a.label(), &b.label()));
    endpoints
}

/// Restrict the summary to one `(url, verb)` endpoint, or keep every row
/// when no endpoint is selected.
pub fn filter_by_endpoint<'a>(
    entries: &'a [LoadBalancerSummaryEntry],
    endpoint: Option<(&str, &str)>,
) -> Vec<&'a LoadBalancerSummaryEntry> {
    entries
        .iter()
        .filter(|e| match endpoint {
            Some((url, verb)) => e.normalized_url == url && e.verb == verb,
            None => true,
        })
        .collect()
}

// ── Performance ───────────────────────────────────────────────────────────────

/// One point of a percentile curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CurvePoint {
    pub name: &'static str,
    pub position: u8,
    pub value: f64,
}

/// The seven-point percentile curve of an endpoint. P100 is `max_rt`.
pub fn percentile_curve(entry: &PerformanceMetricsEntry) -> [CurvePoint; 7] {
    let point = |name, position, value| CurvePoint {
        name,
        position,
        value,
    };
    [
        point("P25", 25, entry.p25),
        point("P50", 50, entry.p50),
        point("P60", 60, entry.p60),
        point("P75", 75, entry.p75),
        point("P90", 90, entry.p90),
        point("P95", 95, entry.p95),
        point("P100", 100, entry.max_rt),
    ]
}

/// Latency measure plotted on the scatter chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum Metric {
    #[serde(rename = "avg_rt")]
    AvgRt,
    P25,
    P50,
    P60,
    P75,
    P90,
    P95,
    #[default]
    P100,
}

impl Metric {
    pub const ALL: [Metric; 8] = [
        Metric::AvgRt,
        Metric::P25,
        Metric::P50,
        Metric::P60,
        Metric::P75,
        Metric::P90,
        Metric::P95,
        Metric::P100,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Metric::AvgRt => "avg_rt",
            Metric::P25 => "P25",
            Metric::P50 => "P50",
            Metric::P60 => "P60",
            Metric::P75 => "P75",
            Metric::P90 => "P90",
            Metric::P95 => "P95",
            Metric::P100 => "P100",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Metric::AvgRt => "Average Response Time",
            Metric::P25 => "25th Percentile",
            Metric::P50 => "50th Percentile",
            Metric::P60 => "60th Percentile",
            Metric::P75 => "75th Percentile",
            Metric::P90 => "90th Percentile",
            Metric::P95 => "95th Percentile",
            Metric::P100 => "100th Percentile (Max)",
        }
    }

    /// Value of the metric for `entry`, in milliseconds.
    pub fn value(self, entry: &PerformanceMetricsEntry) -> f64 {
        match self {
            Metric::AvgRt => entry.avg_rt,
            Metric::P25 => entry.p25,
            Metric::P50 => entry.p50,
            Metric::P60 => entry.p60,
            Metric::P75 => entry.p75,
            Metric::P90 => entry.p90,
            Metric::P95 => entry.p95,
            Metric::P100 => entry.max_rt,
        }
    }
}

impl FromStr for Metric {
    type Err = AnalyzerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|m| m.key().eq_ignore_ascii_case(s))
            .ok_or_else(|| AnalyzerError::Config(format!("unknown metric '{s}'")))
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// One endpoint on the metric-vs-volume scatter chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterPoint {
    /// URL path with scheme and host removed.
    pub name: String,
    pub verb: String,
    pub metric: f64,
    pub p95: f64,
    pub requests: f64,
    pub tier: SeverityTier,
}

/// Scatter points for `metric`, one per entry, in input order.
pub fn scatter_points<'a>(
    entries: impl IntoIterator<Item = &'a PerformanceMetricsEntry>,
    metric: Metric,
) -> Vec<ScatterPoint> {
    entries
        .into_iter()
        .map(|e| ScatterPoint {
            name: endpoint_path(&e.base_url),
            verb: e.verb.clone(),
            metric: metric.value(e),
            p95: e.p95,
            requests: e.requests,
            tier: SeverityTier::from_p95(e.p95),
        })
        .collect()
}

/// Entries that get a percentile graph: all of them with `show_all`,
/// otherwise only those with at least [`MIN_GRAPH_REQUESTS`] requests.
pub fn graph_entries<'a>(
    entries: impl IntoIterator<Item = &'a PerformanceMetricsEntry>,
    show_all: bool,
) -> Vec<&'a PerformanceMetricsEntry> {
    entries
        .into_iter()
        .filter(|e| show_all || e.requests >= MIN_GRAPH_REQUESTS)
        .collect()
}

/// Distinct non-empty HTTP methods, sorted.
pub fn unique_methods(entries: &[PerformanceMetricsEntry]) -> Vec<String> {
    entries
        .iter()
        .filter(|e| !e.verb.is_empty())
        .map(|e| e.verb.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

// ── Slow queries ──────────────────────────────────────────────────────────────

/// Coarse class of an HTTP status code, by its first digit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusClass {
    Success,
    Redirect,
    ClientError,
    ServerError,
}

impl StatusClass {
    /// `2xx`, `3xx` and `4xx` map to their class; anything else is a
    /// server error.
    pub fn from_code(code: &str) -> Self {
        match code.chars().next() {
            Some('2') => StatusClass::Success,
            Some('3') => StatusClass::Redirect,
            Some('4') => StatusClass::ClientError,
            _ => StatusClass::ServerError,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            StatusClass::Success => "success",
            StatusClass::Redirect => "redirect",
            StatusClass::ClientError => "client error",
            StatusClass::ServerError => "server error",
        }
    }
}

/// `true` for requests that took longer than the slow threshold.
pub fn is_slow_request(entry: &SlowQueryEntry) -> bool {
    entry.processing_time_seconds > SLOW_BUCKET_THRESHOLD_SECS
}

// ── Tests ─────────────────────────────────────────────────────────────────────
