use serde::{Deserialize, Serialize};
use std::fmt;

/// The four record shapes the analyzer recognises.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RecordSchema {
    /// Per-endpoint, per-status, per-time-bucket request counts.
    #[serde(rename = "loadbalancer")]
    LoadBalancerSummary,
    /// Per-endpoint latency statistics (min / max / avg and percentiles).
    #[serde(rename = "performance")]
    PerformanceMetrics,
    /// Individual slow requests with their processing time.
    #[serde(rename = "slowqueries")]
    SlowQuery,
    /// Error messages with their occurrence count.
    #[serde(rename = "errorsummary")]
    ErrorSummary,
}

impl RecordSchema {
    /// All schemas in display order.
    pub const ALL: [RecordSchema; 4] = [
        RecordSchema::LoadBalancerSummary,
        RecordSchema::PerformanceMetrics,
        RecordSchema::SlowQuery,
        RecordSchema::ErrorSummary,
    ];

    /// Stable short key used on the command line and in JSON output.
    pub fn key(self) -> &'static str {
        match self {
            RecordSchema::LoadBalancerSummary => "loadbalancer",
            RecordSchema::PerformanceMetrics => "performance",
            RecordSchema::SlowQuery => "slowqueries",
            RecordSchema::ErrorSummary => "errorsummary",
        }
    }

    /// Inverse of [`RecordSchema::key`].
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.key() == key)
    }

    /// Human-readable label for loaded-file listings.
    pub fn label(self) -> &'static str {
        match self {
            RecordSchema::LoadBalancerSummary => "Load Balancer Data",
            RecordSchema::PerformanceMetrics => "Performance Data",
            RecordSchema::SlowQuery => "Slow Requests Data",
            RecordSchema::ErrorSummary => "Error Summary Data",
        }
    }

    /// Position of the schema inside [`RecordSchema::ALL`].
    pub fn index(self) -> usize {
        match self {
            RecordSchema::LoadBalancerSummary => 0,
            RecordSchema::PerformanceMetrics => 1,
            RecordSchema::SlowQuery => 2,
            RecordSchema::ErrorSummary => 3,
        }
    }
}

impl fmt::Display for RecordSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// One row of a load-balancer summary export.
///
/// `count <= total_requests` is not enforced and `percentage` is carried as
/// given; it is never recomputed. Counts are any finite number, fractional
/// or negative values included, exactly as exported.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadBalancerSummaryEntry {
    pub normalized_url: String,
    pub status_code: String,
    pub verb: String,
    /// Processing-time range label, e.g. `"0.3-1"`, `"30+"` or `"unknown"`.
    pub time_bucket: String,
    pub count: f64,
    pub total_requests: f64,
    pub percentage: f64,
}

/// Latency statistics for one endpoint, all times in milliseconds.
///
/// The percentile columns are expected to be monotonic but nothing here
/// relies on it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceMetricsEntry {
    pub base_url: String,
    pub verb: String,
    pub min_rt: f64,
    pub max_rt: f64,
    pub avg_rt: f64,
    pub p25: f64,
    pub p50: f64,
    pub p60: f64,
    pub p75: f64,
    pub p90: f64,
    pub p95: f64,
    pub total: f64,
    pub requests: f64,
}

/// A single slow request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlowQueryEntry {
    /// ISO-8601 timestamp exactly as it appeared in the export.
    pub timestamp: String,
    pub processing_time_seconds: f64,
    pub request_url: String,
    /// Trailing numeric path segment of the URL, or empty when there is none.
    pub player_id: String,
    pub status_code: String,
}

/// An error message and how many times it occurred.
///
/// `message` may be plain text, a JSON object literal, or a quoted JSON string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorSummaryEntry {
    pub count: u64,
    pub message: String,
}

/// A typed collection of records for exactly one schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "schema", content = "records")]
pub enum Dataset {
    #[serde(rename = "loadbalancer")]
    LoadBalancerSummary(Vec<LoadBalancerSummaryEntry>),
    #[serde(rename = "performance")]
    PerformanceMetrics(Vec<PerformanceMetricsEntry>),
    #[serde(rename = "slowqueries")]
    SlowQuery(Vec<SlowQueryEntry>),
    #[serde(rename = "errorsummary")]
    ErrorSummary(Vec<ErrorSummaryEntry>),
}

impl Dataset {
    /// Schema implied by the variant.
    pub fn schema(&self) -> RecordSchema {
        match self {
            Dataset::LoadBalancerSummary(_) => RecordSchema::LoadBalancerSummary,
            Dataset::PerformanceMetrics(_) => RecordSchema::PerformanceMetrics,
            Dataset::SlowQuery(_) => RecordSchema::SlowQuery,
            Dataset::ErrorSummary(_) => RecordSchema::ErrorSummary,
        }
    }

    /// Number of records held.
    pub fn len(&self) -> usize {
        match self {
            Dataset::LoadBalancerSummary(v) => v.len(),
            Dataset::PerformanceMetrics(v) => v.len(),
            Dataset::SlowQuery(v) => v.len(),
            Dataset::ErrorSummary(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn as_load_balancer(&self) -> Option<&[LoadBalancerSummaryEntry]> {
        match self {
            Dataset::LoadBalancerSummary(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_performance(&self) -> Option<&[PerformanceMetricsEntry]> {
        match self {
            Dataset::PerformanceMetrics(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_slow_queries(&self) -> Option<&[SlowQueryEntry]> {
        match self {
            Dataset::SlowQuery(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_error_summary(&self) -> Option<&[ErrorSummaryEntry]> {
        match self {
            Dataset::ErrorSummary(v) => Some(v),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── RecordSchema ──────────────────────────────────────────────────────────

    #[test]
    fn test_schema_key_round_trip() {
        for schema in RecordSchema::ALL {
            assert_eq!(RecordSchema::from_key(schema.key()), Some(schema));
        }
        assert_eq!(RecordSchema::from_key("csv"), None);
    }

    #[test]
    fn test_schema_index_matches_all_order() {
        for (i, schema) in RecordSchema::ALL.into_iter().enumerate() {
            assert_eq!(schema.index(), i);
        }
    }

    #[test]
    fn test_schema_serializes_as_key() {
        let json = serde_json::to_string(&RecordSchema::SlowQuery).unwrap();
        assert_eq!(json, "\"slowqueries\"");
    }

    #[test]
    fn test_schema_labels() {
        assert_eq!(RecordSchema::LoadBalancerSummary.label(), "Load Balancer Data");
        assert_eq!(RecordSchema::ErrorSummary.label(), "Error Summary Data");
    }

    // ── Dataset ───────────────────────────────────────────────────────────────

    #[test]
    fn test_dataset_schema_and_len() {
        let ds = Dataset::ErrorSummary(vec![ErrorSummaryEntry {
            count: 3,
            message: "timeout".to_string(),
        }]);
        assert_eq!(ds.schema(), RecordSchema::ErrorSummary);
        assert_eq!(ds.len(), 1);
        assert!(!ds.is_empty());
        assert!(ds.as_error_summary().is_some());
        assert!(ds.as_load_balancer().is_none());
    }

    #[test]
    fn test_empty_dataset() {
        let ds = Dataset::SlowQuery(Vec::new());
        assert!(ds.is_empty());
        assert_eq!(ds.as_slow_queries().map(|s| s.len()), Some(0));
    }

    #[test]
    fn test_dataset_json_is_tagged_by_schema_key() {
        let ds = Dataset::ErrorSummary(vec![ErrorSummaryEntry {
            count: 1,
            message: "x".to_string(),
        }]);
        let value = serde_json::to_value(&ds).unwrap();
        assert_eq!(value["schema"], "errorsummary");
        assert_eq!(value["records"][0]["count"], 1);
    }
}
