//! Parsing and aggregation engine for load-balancer log exports.
//!
//! Classifies unlabeled text blobs into one of four record schemas, builds
//! validated typed records, keeps at most one dataset per schema, and
//! computes the derived views (distributions, histograms, percentile curves,
//! sorted and paginated tables) that a report renders.

pub mod aggregator;
pub mod builders;
pub mod classifier;
pub mod json_message;
pub mod pipeline;
pub mod reader;
pub mod store;
pub mod table;
pub mod tabular;

pub use analyzer_core as core;
