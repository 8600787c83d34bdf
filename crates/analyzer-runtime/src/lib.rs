//! Runtime layer for the load-balancer log analyzer.
//!
//! Runs file ingestion on tokio, one task per input file, feeding the
//! shared dataset store.

pub mod ingest;

pub use analyzer_core as core;
pub use analyzer_data as data;
