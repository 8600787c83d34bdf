//! Core types for the load-balancer log analyzer.
//!
//! Holds the record model shared by every other crate, the fixed constants
//! and severity tiers used by the aggregation engine, the error type for the
//! I/O edge, and command-line settings.

pub mod constants;
pub mod error;
pub mod formatting;
pub mod models;
pub mod settings;
pub mod severity;
pub mod time_utils;
