//! Sniff → parse → classify → build, as one synchronous step.

use analyzer_core::models::{Dataset, RecordSchema};
use serde::Serialize;
use tracing::debug;

use crate::builders::{
    build_error_summary, build_load_balancer, build_performance, build_slow_queries,
};
use crate::classifier::{classify_header, sniff_error_summary};
use crate::store::DatasetStore;
use crate::tabular::parse_table;

/// A typed dataset plus the number of rows that failed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedContent {
    pub dataset: Dataset,
    pub dropped: usize,
}

impl ParsedContent {
    pub fn schema(&self) -> RecordSchema {
        self.dataset.schema()
    }
}

/// Turn an unlabeled text blob into a typed dataset.
///
/// Never fails. Malformed rows are counted in `dropped`; an empty or
/// unrecognisable blob becomes an empty load-balancer dataset.
pub fn parse_content(text: &str) -> ParsedContent {
    if sniff_error_summary(text) {
        let outcome = build_error_summary(text);
        return ParsedContent {
            dataset: Dataset::ErrorSummary(outcome.records),
            dropped: outcome.dropped,
        };
    }

    let table = parse_table(text);
    let schema = classify_header(&table.headers);
    debug!("Classified {} columns as {}", table.headers.len(), schema);

    let (dataset, dropped) = match schema {
        RecordSchema::SlowQuery => {
            let o = build_slow_queries(&table.rows);
            (Dataset::SlowQuery(o.records), o.dropped)
        }
        RecordSchema::PerformanceMetrics => {
            let o = build_performance(&table.rows);
            (Dataset::PerformanceMetrics(o.records), o.dropped)
        }
        RecordSchema::LoadBalancerSummary | RecordSchema::ErrorSummary => {
            let o = build_load_balancer(&table.rows);
            (Dataset::LoadBalancerSummary(o.records), o.dropped)
        }
    };

    ParsedContent { dataset, dropped }
}

/// Outcome of loading one named blob into the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoadSummary {
    pub name: String,
    pub schema: RecordSchema,
    pub records: usize,
    pub dropped: usize,
    /// Store write sequence number of this load.
    pub generation: u64,
}

/// Parse `text` and load the result into `store` under `name`, replacing
/// whatever was loaded for that schema before.
pub fn process_content(store: &DatasetStore, text: &str, name: &str) -> LoadSummary {
    let parsed = parse_content(text);
    let schema = parsed.schema();
    let records = parsed.dataset.len();
    if parsed.dropped > 0 {
        debug!("Dropped {} invalid rows from {}", parsed.dropped, name);
    }
    let generation = store.load(parsed.dataset, name);
    LoadSummary {
        name: name.to_string(),
        schema,
        records,
        dropped: parsed.dropped,
        generation,
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_summary_blob() {
        let parsed = parse_content("42 \"disk full\"\n7 {\"code\":500}\nnoise\n");
        assert_eq!(parsed.schema(), RecordSchema::ErrorSummary);
        let records = parsed.dataset.as_error_summary().unwrap();
        assert_eq!(records[0].count, 42);
        assert_eq!(records[0].message, "disk full");
        assert_eq!(records[1].message, "{\"code\":500}");
        assert_eq!(parsed.dropped, 1);
    }

    #[test]
    fn test_slow_query_blob() {
        let text = "time,processing_time,request_url,elb_status_code\n\
                    2024-01-01T00:00:00Z,12.5,/api/players/998877/profile,200\n\
                    2024-01-01T00:00:01Z,abc,/api/health,200\n";
        let parsed = parse_content(text);
        assert_eq!(parsed.schema(), RecordSchema::SlowQuery);
        let records = parsed.dataset.as_slow_queries().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].player_id, "998877");
        assert_eq!(parsed.dropped, 1);
    }

    #[test]
    fn test_performance_blob() {
        let text = "base_url,request_verb,min_rt,max_rt,avg_rt,P25,P50,P60,P75,P90,P95,total,requests\n\
                    https://h/api/a,GET,1,900,50,10,20,30,40,60,80,5000,100\n";
        let parsed = parse_content(text);
        assert_eq!(parsed.schema(), RecordSchema::PerformanceMetrics);
        assert_eq!(parsed.dataset.len(), 1);
        assert_eq!(parsed.dropped, 0);
    }

    #[test]
    fn test_unknown_header_becomes_empty_load_balancer() {
        let parsed = parse_content("foo,bar\n1,2\n");
        assert_eq!(parsed.schema(), RecordSchema::LoadBalancerSummary);
        assert!(parsed.dataset.is_empty());
        assert_eq!(parsed.dropped, 1);
    }

    #[test]
    fn test_empty_blob() {
        let parsed = parse_content("");
        assert_eq!(parsed.schema(), RecordSchema::LoadBalancerSummary);
        assert!(parsed.dataset.is_empty());
        assert_eq!(parsed.dropped, 0);
    }

    #[test]
    fn test_process_content_loads_store() {
        let store = DatasetStore::new();
        let summary = process_content(&store, "3 \"boom\"\n", "errors.txt");
        assert_eq!(summary.schema, RecordSchema::ErrorSummary);
        assert_eq!((summary.records, summary.dropped), (1, 0));
        assert_eq!(summary.generation, 1);
        assert_eq!(
            store.filename(RecordSchema::ErrorSummary).as_deref(),
            Some("errors.txt")
        );
    }
}
