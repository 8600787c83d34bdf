//! Comma-delimited text → header + rows.
//!
//! The first non-empty line is the header. Every header name and every value
//! is trimmed. Quoted fields may contain commas and newlines.

use std::collections::HashMap;

use csv::{ReaderBuilder, Trim};
use tracing::debug;

/// One data row keyed by header name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    fields: HashMap<String, String>,
}

impl Row {
    /// Raw (trimmed) value of `column`, or `None` when the row is too short
    /// to reach it or the header has no such column.
    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields.get(column).map(String::as_str)
    }

    /// Value of `column` only when present and non-empty.
    pub fn non_empty(&self, column: &str) -> Option<&str> {
        self.get(column).filter(|v| !v.is_empty())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Row {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Parsed table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    /// Trimmed header names in column order; empty when no header was found.
    pub headers: Vec<String>,
    pub rows: Vec<Row>,
}

impl Table {
    /// `true` when the header contains every column in `columns`.
    pub fn has_columns(&self, columns: &[&str]) -> bool {
        columns
            .iter()
            .all(|c| self.headers.iter().any(|h| h == c))
    }
}

/// Parse `text` as comma-delimited data with a header line.
///
/// Never fails: an empty or blank header yields a table with no headers and
/// no rows, blank lines are skipped, and rows the reader cannot decode are
/// dropped with a debug log. The header is the first line that is not all
/// whitespace.
pub fn parse_table(text: &str) -> Table {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let text = text.trim_start();

    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = match reader.headers() {
        Ok(record) => record.iter().map(str::to_string).collect(),
        Err(e) => {
            debug!("Failed to read header line: {}", e);
            return Table::default();
        }
    };

    if headers.iter().all(String::is_empty) {
        return Table::default();
    }

    let mut rows = Vec::new();
    let mut skipped = 0usize;

    for (index, result) in reader.records().enumerate() {
        let record = match result {
            Ok(r) => r,
            Err(e) => {
                debug!("Skipping undecodable row {}: {}", index + 1, e);
                skipped += 1;
                continue;
            }
        };

        if record.iter().all(str::is_empty) {
            continue;
        }

        let row: Row = headers
            .iter()
            .zip(record.iter())
            .map(|(h, v)| (h.clone(), v.to_string()))
            .collect();
        rows.push(row);
    }

    debug!(
        "Parsed table: {} columns, {} rows, {} skipped",
        headers.len(),
        rows.len(),
        skipped
    );

    Table { headers, rows }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
