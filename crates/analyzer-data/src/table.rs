//! Sortable, searchable, paginated table views.
//!
//! Sorting is generic over a field selector and a direction. Text fields use
//! a locale-style comparison, numeric fields a signed difference, and a
//! descending sort reverses the comparator. The sort is stable, so rows that
//! compare equal keep their input order in both directions.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use analyzer_core::constants::PAGE_SIZE;
use analyzer_core::error::AnalyzerError;
use analyzer_core::models::{ErrorSummaryEntry, PerformanceMetricsEntry, SlowQueryEntry};
use serde::Serialize;

// ── Comparison primitives ─────────────────────────────────────────────────────

/// Case-insensitive comparison with lowercase-first as the tie-break.
pub fn locale_cmp(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| b.cmp(a))
}

/// The sortable value of one cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue<'a> {
    Text(&'a str),
    Number(f64),
}

impl FieldValue<'_> {
    /// Ascending order of two cells. NaN and mixed kinds compare equal.
    pub fn compare(&self, other: &Self) -> Ordering {
        match (self, other) {
            (FieldValue::Text(a), FieldValue::Text(b)) => locale_cmp(a, b),
            (FieldValue::Number(a), FieldValue::Number(b)) => {
                let diff = a - b;
                if diff < 0.0 {
                    Ordering::Less
                } else if diff > 0.0 {
                    Ordering::Greater
                } else {
                    Ordering::Equal
                }
            }
            _ => Ordering::Equal,
        }
    }
}

/// A column of `T` that rows can be ordered by.
pub trait SortField<T>: Copy {
    fn value<'a>(&self, row: &'a T) -> FieldValue<'a>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    pub fn toggled(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }
}

impl FromStr for SortDirection {
    type Err = AnalyzerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asc" => Ok(SortDirection::Asc),
            "desc" => Ok(SortDirection::Desc),
            other => Err(AnalyzerError::Config(format!(
                "unknown sort direction '{other}' (expected asc or desc)"
            ))),
        }
    }
}

/// Stable in-place sort of `rows` by `field`.
pub fn sort_rows<T, F: SortField<T>>(rows: &mut [&T], field: F, direction: SortDirection) {
    rows.sort_by(|a, b| {
        let ordering = field.value(*a).compare(&field.value(*b));
        match direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    });
}

fn contains_ignore_case(haystack: &str, needle_lower: &str) -> bool {
    haystack.to_lowercase().contains(needle_lower)
}

// ── Performance metrics ───────────────────────────────────────────────────────

/// Sortable columns of the endpoint performance table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PerformanceField {
    #[serde(rename = "base_url")]
    BaseUrl,
    #[serde(rename = "request_verb")]
    RequestVerb,
    #[serde(rename = "avg_rt")]
    AvgRt,
    P50,
    P95,
    /// Maximum response time.
    P100,
    #[serde(rename = "requests")]
    Requests,
}

impl PerformanceField {
    pub const ALL: [PerformanceField; 7] = [
        PerformanceField::BaseUrl,
        PerformanceField::RequestVerb,
        PerformanceField::AvgRt,
        PerformanceField::P50,
        PerformanceField::P95,
        PerformanceField::P100,
        PerformanceField::Requests,
    ];

    pub fn key(self) -> &'static str {
        match self {
            PerformanceField::BaseUrl => "base_url",
            PerformanceField::RequestVerb => "request_verb",
            PerformanceField::AvgRt => "avg_rt",
            PerformanceField::P50 => "P50",
            PerformanceField::P95 => "P95",
            PerformanceField::P100 => "P100",
            PerformanceField::Requests => "requests",
        }
    }
}

impl FromStr for PerformanceField {
    type Err = AnalyzerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|f| f.key().eq_ignore_ascii_case(s))
            .ok_or_else(|| AnalyzerError::Config(format!("unknown performance sort field '{s}'")))
    }
}

impl fmt::Display for PerformanceField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl SortField<PerformanceMetricsEntry> for PerformanceField {
    fn value<'a>(&self, row: &'a PerformanceMetricsEntry) -> FieldValue<'a> {
        match self {
            PerformanceField::BaseUrl => FieldValue::Text(&row.base_url),
            PerformanceField::RequestVerb => FieldValue::Text(&row.verb),
            PerformanceField::AvgRt => FieldValue::Number(row.avg_rt),
            PerformanceField::P50 => FieldValue::Number(row.p50),
            PerformanceField::P95 => FieldValue::Number(row.p95),
            PerformanceField::P100 => FieldValue::Number(row.max_rt),
            PerformanceField::Requests => FieldValue::Number(row.requests),
        }
    }
}

/// Current sort of the performance table. Starts at P95 descending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PerformanceSort {
    pub field: PerformanceField,
    pub direction: SortDirection,
}

impl Default for PerformanceSort {
    fn default() -> Self {
        Self {
            field: PerformanceField::P95,
            direction: SortDirection::Desc,
        }
    }
}

impl PerformanceSort {
    /// Header-click behaviour: the active field flips direction, any other
    /// field becomes active in descending order.
    pub fn select(self, field: PerformanceField) -> Self {
        if field == self.field {
            Self {
                field,
                direction: self.direction.toggled(),
            }
        } else {
            Self {
                field,
                direction: SortDirection::Desc,
            }
        }
    }
}

/// Endpoint substring plus optional exact HTTP method.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PerformanceFilter {
    pub endpoint: String,
    pub method: Option<String>,
}

impl PerformanceFilter {
    pub fn matches(&self, entry: &PerformanceMetricsEntry) -> bool {
        let needle = self.endpoint.to_lowercase();
        let endpoint_match = contains_ignore_case(&entry.base_url, &needle);
        let method_match = match self.method.as_deref() {
            None | Some("") => true,
            Some(m) => entry.verb == m,
        };
        endpoint_match && method_match
    }
}

/// Filter then sort the performance table.
pub fn performance_view<'a>(
    entries: &'a [PerformanceMetricsEntry],
    filter: &PerformanceFilter,
    sort: PerformanceSort,
) -> Vec<&'a PerformanceMetricsEntry> {
    let mut rows: Vec<&PerformanceMetricsEntry> =
        entries.iter().filter(|e| filter.matches(e)).collect();
    sort_rows(&mut rows, sort.field, sort.direction);
    rows
}

// ── Slow queries ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SlowQueryField {
    Time,
    ProcessingTime,
    RequestUrl,
    PlayerId,
    StatusCode,
}

impl FromStr for SlowQueryField {
    type Err = AnalyzerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "time" => Ok(SlowQueryField::Time),
            "processing_time" => Ok(SlowQueryField::ProcessingTime),
            "request_url" => Ok(SlowQueryField::RequestUrl),
            "player_id" | "pid" => Ok(SlowQueryField::PlayerId),
            "elb_status_code" | "status_code" => Ok(SlowQueryField::StatusCode),
            _ => Err(AnalyzerError::Config(format!("unknown slow-query sort field '{s}'"))),
        }
    }
}

impl SortField<SlowQueryEntry> for SlowQueryField {
    fn value<'a>(&self, row: &'a SlowQueryEntry) -> FieldValue<'a> {
        match self {
            SlowQueryField::Time => FieldValue::Text(&row.timestamp),
            SlowQueryField::ProcessingTime => FieldValue::Number(row.processing_time_seconds),
            SlowQueryField::RequestUrl => FieldValue::Text(&row.request_url),
            SlowQueryField::PlayerId => FieldValue::Text(&row.player_id),
            SlowQueryField::StatusCode => FieldValue::Text(&row.status_code),
        }
    }
}

/// Case-insensitive match on URL and player id, plain match on status code.
pub fn search_slow_queries<'a>(
    entries: &'a [SlowQueryEntry],
    term: &str,
) -> Vec<&'a SlowQueryEntry> {
    let needle = term.to_lowercase();
    entries
        .iter()
        .filter(|e| {
            contains_ignore_case(&e.request_url, &needle)
                || contains_ignore_case(&e.player_id, &needle)
                || e.status_code.contains(term)
        })
        .collect()
}

// ── Error summary ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorField {
    Count,
    Message,
}

impl FromStr for ErrorField {
    type Err = AnalyzerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "count" => Ok(ErrorField::Count),
            "message" => Ok(ErrorField::Message),
            _ => Err(AnalyzerError::Config(format!("unknown error sort field '{s}'"))),
        }
    }
}

impl SortField<ErrorSummaryEntry> for ErrorField {
    fn value<'a>(&self, row: &'a ErrorSummaryEntry) -> FieldValue<'a> {
        match self {
            ErrorField::Count => FieldValue::Number(row.count as f64),
            ErrorField::Message => FieldValue::Text(&row.message),
        }
    }
}

/// Case-insensitive match on the message, plain match on the decimal count.
pub fn search_errors<'a>(
    entries: &'a [ErrorSummaryEntry],
    term: &str,
) -> Vec<&'a ErrorSummaryEntry> {
    let needle = term.to_lowercase();
    entries
        .iter()
        .filter(|e| contains_ignore_case(&e.message, &needle) || e.count.to_string().contains(term))
        .collect()
}

// ── Pagination ────────────────────────────────────────────────────────────────

/// One page of a filtered table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// 1-based page actually shown after clamping.
    pub page: usize,
    pub total_pages: usize,
    pub total_items: usize,
}

impl<T> Page<T> {
    /// 1-based index of the first row shown, or 0 when the page is empty.
    pub fn first_index(&self) -> usize {
        if self.items.is_empty() {
            0
        } else {
            (self.page - 1) * PAGE_SIZE + 1
        }
    }

    /// 1-based index of the last row shown.
    pub fn last_index(&self) -> usize {
        if self.items.is_empty() {
            0
        } else {
            self.first_index() + self.items.len() - 1
        }
    }

    /// `"Showing X to Y of N results"`.
    pub fn summary(&self) -> String {
        format!(
            "Showing {} to {} of {} results",
            self.first_index(),
            self.last_index(),
            self.total_items
        )
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }
}

/// Slice `rows` into [`PAGE_SIZE`]-row pages and return page `page`.
///
/// `page` is clamped into `1..=total_pages`; an empty input yields page 1 of 0.
pub fn paginate<T: Clone>(rows: &[T], page: usize) -> Page<T> {
    let total_items = rows.len();
    let total_pages = total_items.div_ceil(PAGE_SIZE);
    let page = page.clamp(1, total_pages.max(1));
    let start = ((page - 1) * PAGE_SIZE).min(total_items);
    let end = (start + PAGE_SIZE).min(total_items);

    Page {
        items: rows[start..end].to_vec(),
        page,
        total_pages,
        total_items,
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
