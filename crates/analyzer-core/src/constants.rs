//! Fixed parameters of the analyzer. None of these are configurable.

/// Rows per page in the slow-request and error-summary tables.
pub const PAGE_SIZE: usize = 20;

/// A time bucket whose lower bound is at least this many seconds marks its
/// endpoint as slow.
pub const SLOW_BUCKET_THRESHOLD_SECS: f64 = 10.0;

/// Endpoints below this request volume are hidden from percentile graphs
/// unless every endpoint is requested.
pub const MIN_GRAPH_REQUESTS: f64 = 100.0;

/// Key used for missing distribution keys and the catch-all time bucket.
pub const UNKNOWN_KEY: &str = "unknown";

/// Suffix appended to the label of an endpoint flagged as slow.
pub const SLOW_LABEL_SUFFIX: &str = " (Slow)";
