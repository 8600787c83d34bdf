//! Report assembly and rendering.
//!
//! Builds one [`Report`] from a store snapshot and the ingest outcome, then
//! renders it as plain text or pretty JSON. Only schemas that were loaded
//! and that the selected view covers produce a section.

use std::fmt::Write as _;
use std::str::FromStr;

use analyzer_core::constants::{MIN_GRAPH_REQUESTS, SLOW_BUCKET_THRESHOLD_SECS};
use analyzer_core::error::AnalyzerError;
use analyzer_core::formatting::{
    endpoint_path, format_amount, format_count, format_number, format_seconds, percentage,
};
use analyzer_core::models::{
    ErrorSummaryEntry, LoadBalancerSummaryEntry, PerformanceMetricsEntry, RecordSchema,
    SlowQueryEntry,
};
use analyzer_core::settings::Settings;
use analyzer_core::severity::SeverityTier;
use analyzer_core::time_utils::TimezoneHandler;
use analyzer_data::aggregator::{
    endpoint_summaries, filter_by_endpoint, graph_entries, is_slow_request, percentile_curve,
    scatter_points, status_distribution, time_bucket_histogram, unique_methods,
    unique_status_codes, verb_distribution, CurvePoint, DistributionSlice, Metric, ScatterPoint,
    StatusClass, TimeBucketRow,
};
use analyzer_data::json_message::{detect_json_message, pretty_print};
use analyzer_data::store::StoreSnapshot;
use analyzer_data::table::{
    paginate, performance_view, search_errors, search_slow_queries, PerformanceField,
    PerformanceFilter, PerformanceSort, SortDirection,
};
use analyzer_runtime::ingest::IngestReport;
use serde::Serialize;
use serde_json::Value;

// ── Options ───────────────────────────────────────────────────────────────────

/// Which sections a report contains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum View {
    Summary,
    Stats,
    Slow,
    Errors,
    All,
}

impl View {
    pub fn includes(self, schema: RecordSchema) -> bool {
        match self {
            View::All => true,
            View::Summary => schema == RecordSchema::LoadBalancerSummary,
            View::Stats => schema == RecordSchema::PerformanceMetrics,
            View::Slow => schema == RecordSchema::SlowQuery,
            View::Errors => schema == RecordSchema::ErrorSummary,
        }
    }
}

impl FromStr for View {
    type Err = AnalyzerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "summary" => Ok(View::Summary),
            "stats" => Ok(View::Stats),
            "slow" => Ok(View::Slow),
            "errors" => Ok(View::Errors),
            "all" => Ok(View::All),
            other => Err(AnalyzerError::Config(format!("unknown view '{other}'"))),
        }
    }
}

/// Validated presentation choices derived from [`Settings`].
#[derive(Debug, Clone)]
pub struct ReportOptions {
    pub view: View,
    /// Selected `(url, verb)` for the load-balancer summary.
    pub endpoint: Option<(String, String)>,
    pub performance_filter: PerformanceFilter,
    pub performance_sort: PerformanceSort,
    pub metric: Metric,
    pub show_all: bool,
    pub search: String,
    pub page: usize,
    pub timezone: TimezoneHandler,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            view: View::All,
            endpoint: None,
            performance_filter: PerformanceFilter::default(),
            performance_sort: PerformanceSort::default(),
            metric: Metric::default(),
            show_all: false,
            search: String::new(),
            page: 1,
            timezone: TimezoneHandler::new("UTC"),
        }
    }
}

impl ReportOptions {
    pub fn from_settings(settings: &Settings) -> Result<Self, AnalyzerError> {
        let endpoint = match settings.endpoint.as_deref() {
            None => None,
            Some(raw) => Some(settings.endpoint_key().ok_or_else(|| {
                AnalyzerError::Config(format!("--endpoint must be \"VERB URL\", got '{raw}'"))
            })?),
        };

        Ok(Self {
            view: settings.view.parse()?,
            endpoint,
            performance_filter: PerformanceFilter {
                endpoint: settings.url_filter.clone(),
                method: settings.method.clone(),
            },
            performance_sort: PerformanceSort {
                field: PerformanceField::from_str(&settings.sort)?,
                direction: SortDirection::from_str(&settings.direction)?,
            },
            metric: settings.metric.parse()?,
            show_all: settings.show_all,
            search: settings.search.clone(),
            page: settings.page as usize,
            timezone: TimezoneHandler::new(&settings.timezone),
        })
    }
}

// ── Report model ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct LoadedFile {
    pub schema: RecordSchema,
    pub label: &'static str,
    pub filename: String,
    pub records: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct EndpointOption {
    pub label: String,
    pub url: String,
    pub verb: String,
    pub slow: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct SummarySection {
    /// Label of the selected endpoint, or `None` for all endpoints.
    pub endpoint: Option<String>,
    pub endpoints: Vec<EndpointOption>,
    pub total_count: f64,
    pub status_distribution: Vec<DistributionSlice>,
    pub verb_distribution: Vec<DistributionSlice>,
    pub status_codes: Vec<String>,
    pub time_buckets: Vec<TimeBucketRow>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PerformanceRow {
    #[serde(flatten)]
    pub entry: PerformanceMetricsEntry,
    pub tier: SeverityTier,
}

#[derive(Debug, Clone, Serialize)]
pub struct PercentileCurve {
    pub verb: String,
    pub path: String,
    pub requests: f64,
    pub tier: SeverityTier,
    pub color: &'static str,
    pub points: Vec<CurvePoint>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PerformanceSection {
    pub sort: PerformanceSort,
    pub metric: Metric,
    pub metric_label: &'static str,
    pub methods: Vec<String>,
    pub rows: Vec<PerformanceRow>,
    pub scatter: Vec<ScatterPoint>,
    pub curves: Vec<PercentileCurve>,
    /// Endpoints left out of `curves` for low request volume.
    pub hidden_curves: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct SlowQueryRow {
    /// Timestamp rendered in the report timezone.
    pub time: String,
    pub timestamp: String,
    pub processing_time_seconds: f64,
    pub request_url: String,
    pub player_id: String,
    pub status_code: String,
    pub status_class: StatusClass,
    pub slow: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorRow {
    pub count: u64,
    pub message: String,
    /// Parsed message when it is a JSON document.
    pub json: Option<Value>,
    #[serde(skip)]
    pub pretty: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TableSection<T> {
    pub search: String,
    pub page: usize,
    pub total_pages: usize,
    pub total_items: usize,
    pub showing: String,
    pub rows: Vec<T>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub ingest: IngestReport,
    pub files: Vec<LoadedFile>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<SummarySection>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub performance: Option<PerformanceSection>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slow_queries: Option<TableSection<SlowQueryRow>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<TableSection<ErrorRow>>,
}

// ── Building ──────────────────────────────────────────────────────────────────

pub fn build_report(
    snapshot: &StoreSnapshot,
    ingest: &IngestReport,
    opts: &ReportOptions,
) -> Report {
    let files = snapshot
        .schemas()
        .into_iter()
        .filter_map(|schema| {
            snapshot.slot(schema).map(|slot| LoadedFile {
                schema,
                label: schema.label(),
                filename: slot.filename.clone(),
                records: slot.dataset.len(),
            })
        })
        .collect();

    let wants = |schema| opts.view.includes(schema);

    Report {
        ingest: ingest.clone(),
        files,
        summary: snapshot
            .load_balancer()
            .filter(|_| wants(RecordSchema::LoadBalancerSummary))
            .map(|entries| summary_section(entries, opts)),
        performance: snapshot
            .performance()
            .filter(|_| wants(RecordSchema::PerformanceMetrics))
            .map(|entries| performance_section(entries, opts)),
        slow_queries: snapshot
            .slow_queries()
            .filter(|_| wants(RecordSchema::SlowQuery))
            .map(|entries| slow_query_section(entries, opts)),
        errors: snapshot
            .error_summary()
            .filter(|_| wants(RecordSchema::ErrorSummary))
            .map(|entries| error_section(entries, opts)),
    }
}

fn summary_section(
    entries: &[LoadBalancerSummaryEntry],
    opts: &ReportOptions,
) -> SummarySection {
    let endpoints = endpoint_summaries(entries);
    let selected = opts
        .endpoint
        .as_ref()
        .map(|(url, verb)| (url.as_str(), verb.as_str()));
    let filtered = filter_by_endpoint(entries, selected);

    let endpoint = selected.map(|(url, verb)| {
        endpoints
            .iter()
            .find(|e| e.url == url && e.verb == verb)
            .map(|e| e.label())
            .unwrap_or_else(|| format!("{verb} {url}"))
    });

    SummarySection {
        endpoint,
        endpoints: endpoints
            .iter()
            .map(|e| EndpointOption {
                label: e.label(),
                url: e.url.clone(),
                verb: e.verb.clone(),
                slow: e.has_slow_requests,
            })
            .collect(),
        total_count: filtered.iter().map(|e| e.count).sum(),
        status_distribution: status_distribution(filtered.iter().copied()),
        verb_distribution: verb_distribution(filtered.iter().copied()),
        status_codes: unique_status_codes(filtered.iter().copied()),
        time_buckets: time_bucket_histogram(filtered.iter().copied()),
    }
}

fn performance_section(
    entries: &[PerformanceMetricsEntry],
    opts: &ReportOptions,
) -> PerformanceSection {
    let rows = performance_view(entries, &opts.performance_filter, opts.performance_sort);
    let graphed = graph_entries(rows.iter().copied(), opts.show_all);

    let curves: Vec<PercentileCurve> = graphed
        .iter()
        .map(|e| {
            let tier = SeverityTier::from_p95(e.p95);
            PercentileCurve {
                verb: e.verb.clone(),
                path: endpoint_path(&e.base_url),
                requests: e.requests,
                tier,
                color: tier.color(),
                points: percentile_curve(e).to_vec(),
            }
        })
        .collect();

    PerformanceSection {
        sort: opts.performance_sort,
        metric: opts.metric,
        metric_label: opts.metric.label(),
        methods: unique_methods(entries),
        scatter: scatter_points(rows.iter().copied(), opts.metric),
        hidden_curves: rows.len() - curves.len(),
        curves,
        rows: rows
            .iter()
            .map(|e| PerformanceRow {
                entry: (*e).clone(),
                tier: SeverityTier::from_p95(e.p95),
            })
            .collect(),
    }
}

fn slow_query_section(
    entries: &[SlowQueryEntry],
    opts: &ReportOptions,
) -> TableSection<SlowQueryRow> {
    let matches = search_slow_queries(entries, &opts.search);
    let page = paginate(&matches, opts.page);

    TableSection {
        search: opts.search.clone(),
        page: page.page,
        total_pages: page.total_pages,
        total_items: page.total_items,
        showing: page.summary(),
        rows: page
            .items
            .iter()
            .map(|e| SlowQueryRow {
                time: opts.timezone.display(&e.timestamp),
                timestamp: e.timestamp.clone(),
                processing_time_seconds: e.processing_time_seconds,
                request_url: e.request_url.clone(),
                player_id: e.player_id.clone(),
                status_code: e.status_code.clone(),
                status_class: StatusClass::from_code(&e.status_code),
                slow: is_slow_request(e),
            })
            .collect(),
    }
}

fn error_section(entries: &[ErrorSummaryEntry], opts: &ReportOptions) -> TableSection<ErrorRow> {
    let matches = search_errors(entries, &opts.search);
    let page = paginate(&matches, opts.page);

    TableSection {
        search: opts.search.clone(),
        page: page.page,
        total_pages: page.total_pages,
        total_items: page.total_items,
        showing: page.summary(),
        rows: page
            .items
            .iter()
            .map(|e| ErrorRow {
                count: e.count,
                message: e.message.clone(),
                json: detect_json_message(&e.message),
                pretty: pretty_print(&e.message),
            })
            .collect(),
    }
}

// ── Rendering ─────────────────────────────────────────────────────────────────

/// Pretty JSON rendering of the whole report.
pub fn render_json(report: &Report) -> Result<String, AnalyzerError> {
    Ok(serde_json::to_string_pretty(report)?)
}

fn heading(out: &mut String, title: &str) {
    let _ = writeln!(out, "\n== {title} ==");
}

/// Plain-text rendering for terminals.
pub fn render_text(report: &Report) -> String {
    let mut out = String::new();

    heading(&mut out, "Loaded Files");
    if report.files.is_empty() {
        out.push_str("No datasets loaded\n");
    }
    for file in &report.files {
        let _ = writeln!(
            out,
            "{:<22} {} ({} records)",
            file.label,
            file.filename,
            format_count(file.records as u64)
        );
    }
    let dropped = report.ingest.total_dropped();
    if dropped > 0 {
        let _ = writeln!(out, "Skipped {} invalid rows", format_count(dropped as u64));
    }
    for failure in &report.ingest.failed {
        let _ = writeln!(out, "Failed: {} ({})", failure.path.display(), failure.error);
    }

    if let Some(summary) = &report.summary {
        render_summary(&mut out, summary);
    }
    if let Some(perf) = &report.performance {
        render_performance(&mut out, perf);
    }
    if let Some(slow) = &report.slow_queries {
        render_slow_queries(&mut out, slow);
    }
    if let Some(errors) = &report.errors {
        render_errors(&mut out, errors);
    }

    out
}

fn render_distribution(out: &mut String, title: &str, slices: &[DistributionSlice], total: f64) {
    let _ = writeln!(out, "{title}:");
    for slice in slices {
        let share = percentage(slice.value, total, 1);
        let _ = writeln!(
            out,
            "  {:<10} {:>12}  ({}%)",
            slice.name,
            format_amount(slice.value),
            format_number(share, 1)
        );
    }
}

fn render_summary(out: &mut String, summary: &SummarySection) {
    heading(out, "Load Balancer Summary");
    let _ = writeln!(
        out,
        "Endpoint: {}",
        summary.endpoint.as_deref().unwrap_or("All Endpoints")
    );
    let _ = writeln!(out, "Requests: {}", format_amount(summary.total_count));

    let slow: Vec<&str> = summary
        .endpoints
        .iter()
        .filter(|e| e.slow)
        .map(|e| e.label.as_str())
        .collect();
    let _ = writeln!(
        out,
        "Endpoints: {} ({} with requests over {} seconds)",
        summary.endpoints.len(),
        slow.len(),
        SLOW_BUCKET_THRESHOLD_SECS
    );
    for label in slow {
        let _ = writeln!(out, "  {label}");
    }

    render_distribution(out, "Status codes", &summary.status_distribution, summary.total_count);
    render_distribution(out, "Methods", &summary.verb_distribution, summary.total_count);

    let _ = writeln!(out, "Processing time (seconds):");
    let mut header = format!("  {:<10}", "bucket");
    for code in &summary.status_codes {
        let _ = write!(header, " {code:>8}");
    }
    let _ = writeln!(out, "{header} {:>10}", "total");
    for row in &summary.time_buckets {
        let mut line = format!("  {:<10}", row.bucket);
        for code in &summary.status_codes {
            let count = row.counts.get(code).copied().unwrap_or(0.0);
            let _ = write!(line, " {:>8}", format_amount(count));
        }
        let _ = writeln!(out, "{line} {:>10}", format_amount(row.total));
    }
}

fn tier_name(tier: SeverityTier) -> &'static str {
    match tier {
        SeverityTier::Fast => "fast",
        SeverityTier::Moderate => "moderate",
        SeverityTier::Slow => "slow",
        SeverityTier::VerySlow => "very slow",
        SeverityTier::Critical => "critical",
    }
}

fn render_performance(out: &mut String, perf: &PerformanceSection) {
    heading(out, "Endpoint Performance");
    let direction = match perf.sort.direction {
        SortDirection::Asc => "asc",
        SortDirection::Desc => "desc",
    };
    let _ = writeln!(out, "Sorted by {} {}", perf.sort.field, direction);
    let _ = writeln!(out, "Methods: {}", perf.methods.join(", "));
    let _ = writeln!(
        out,
        "  {:<7} {:<40} {:>10} {:>10} {:>10} {:>10} {:>10}  tier",
        "method", "endpoint", "avg", "p50", "p95", "p100", "requests"
    );
    for row in &perf.rows {
        let e = &row.entry;
        let _ = writeln!(
            out,
            "  {:<7} {:<40} {:>10} {:>10} {:>10} {:>10} {:>10}  {}",
            e.verb,
            endpoint_path(&e.base_url),
            format_number(e.avg_rt, 0),
            format_number(e.p50, 0),
            format_number(e.p95, 0),
            format_number(e.max_rt, 0),
            format_amount(e.requests),
            tier_name(row.tier)
        );
    }

    let _ = writeln!(out, "{} vs requests:", perf.metric_label);
    for point in &perf.scatter {
        let _ = writeln!(
            out,
            "  {} {}: {} ms over {} requests",
            point.verb,
            point.name,
            format_number(point.metric, 0),
            format_amount(point.requests)
        );
    }

    let _ = writeln!(out, "Percentile curves (ms):");
    for curve in &perf.curves {
        let points: Vec<String> = curve
            .points
            .iter()
            .map(|p| format!("{}={}", p.name, format_number(p.value, 0)))
            .collect();
        let _ = writeln!(
            out,
            "  {} {} [{}] {}",
            curve.verb,
            curve.path,
            tier_name(curve.tier),
            points.join(" ")
        );
    }
    if perf.hidden_curves > 0 {
        let _ = writeln!(
            out,
            "  ({} endpoints with fewer than {} requests hidden; use --show-all)",
            perf.hidden_curves,
            MIN_GRAPH_REQUESTS
        );
    }
}

fn render_page_footer<T>(out: &mut String, table: &TableSection<T>) {
    if table.total_pages > 1 {
        let _ = writeln!(
            out,
            "{} (page {} of {})",
            table.showing, table.page, table.total_pages
        );
    }
}

fn render_slow_queries(out: &mut String, table: &TableSection<SlowQueryRow>) {
    heading(out, "Slow Requests");
    if !table.search.is_empty() {
        let _ = writeln!(out, "Search: {}", table.search);
    }
    for row in &table.rows {
        let marker = if row.slow { "*" } else { " " };
        let _ = writeln!(
            out,
            "{marker} {:<19} {:>10}s  {:<6} {:<13} {:<10} {}",
            row.time,
            format_seconds(row.processing_time_seconds),
            row.status_code,
            row.status_class.label(),
            row.player_id,
            row.request_url
        );
    }
    render_page_footer(out, table);
}

fn render_errors(out: &mut String, table: &TableSection<ErrorRow>) {
    heading(out, "Error Summary");
    if !table.search.is_empty() {
        let _ = writeln!(out, "Search: {}", table.search);
    }
    for row in &table.rows {
        match &row.pretty {
            Some(pretty) => {
                let _ = writeln!(out, "{:>8}  (JSON)", format_count(row.count));
                for line in pretty.lines() {
                    let _ = writeln!(out, "          {line}");
                }
            }
            None => {
                let _ = writeln!(out, "{:>8}  {}", format_count(row.count), row.message);
            }
        }
    }
    render_page_footer(out, table);
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use analyzer_data::pipeline::process_content;
    use analyzer_data::store::DatasetStore;

    const LB_CSV: &str = "normalized_url,elb_status_code,request_verb,processing_time_bucket,count,total_requests,percentage\n\
                          /api/a,200,GET,0-1,80,100,80\n\
                          /api/a,500,GET,10-30,20,100,20\n\
                          /api/b,200,POST,0.3-1,5,5,100\n";

    const PERF_CSV: &str = "base_url,request_verb,min_rt,max_rt,avg_rt,P25,P50,P60,P75,P90,P95,total,requests\n\
                            https://h.example.com/api/a,GET,1,900,50,10,20,30,40,60,250,5000,150\n\
                            https://h.example.com/api/b,POST,1,20000,900,100,200,300,400,600,12000,5000,20\n";

    const SLOW_CSV: &str = "time,processing_time,request_url,elb_status_code\n\
                            2024-03-01T12:00:00Z,12.5,/api/players/42,200\n\
                            2024-03-01T12:00:01Z,9.5,/api/health,503\n";

    const ERRORS_TXT: &str = "42 \"disk full\"\n7 {\"code\":500}\n";

    fn loaded_store() -> DatasetStore {
        let store = DatasetStore::new();
        process_content(&store, LB_CSV, "lb.csv");
        process_content(&store, PERF_CSV, "perf.csv");
        process_content(&store, SLOW_CSV, "slow.csv");
        process_content(&store, ERRORS_TXT, "errors.txt");
        store
    }

    fn report_with(opts: &ReportOptions) -> Report {
        let store = loaded_store();
        build_report(&store.snapshot(), &IngestReport::default(), opts)
    }

    #[test]
    fn test_options_from_settings() {
        let settings = Settings::load_from_args([
            "lb-analyzer",
            "--view",
            "stats",
            "--sort",
            "requests",
            "--direction",
            "asc",
            "--metric",
            "avg_rt",
            "--endpoint",
            "GET /api/a",
            "--timezone",
            "UTC",
            "a.csv",
        ]);
        let opts = ReportOptions::from_settings(&settings).unwrap();
        assert_eq!(opts.view, View::Stats);
        assert_eq!(opts.performance_sort.field, PerformanceField::Requests);
        assert_eq!(opts.performance_sort.direction, SortDirection::Asc);
        assert_eq!(opts.metric, Metric::AvgRt);
        assert_eq!(opts.endpoint, Some(("/api/a".to_string(), "GET".to_string())));
    }

    #[test]
    fn test_options_reject_malformed_endpoint() {
        let settings = Settings::load_from_args(["lb-analyzer", "--endpoint", "GET", "a.csv"]);
        assert!(ReportOptions::from_settings(&settings).is_err());
    }

    #[test]
    fn test_view_selects_sections() {
        let opts = ReportOptions {
            view: View::Slow,
            ..ReportOptions::default()
        };
        let report = report_with(&opts);
        assert!(report.summary.is_none());
        assert!(report.performance.is_none());
        assert!(report.errors.is_none());
        assert!(report.slow_queries.is_some());
        assert_eq!(report.files.len(), 4);
    }

    #[test]
    fn test_summary_section() {
        let report = report_with(&ReportOptions::default());
        let summary = report.summary.unwrap();
        assert_eq!(summary.total_count, 105.0);
        assert_eq!(summary.endpoints[0].label, "GET /api/a (Slow)");
        assert_eq!(summary.endpoints[1].label, "POST /api/b");
        assert_eq!(summary.status_codes, vec!["200", "500"]);
        let buckets: Vec<&str> = summary.time_buckets.iter().map(|r| r.bucket.as_str()).collect();
        assert_eq!(buckets, vec!["0-1", "0.3-1", "10-30"]);
    }

    #[test]
    fn test_summary_section_for_one_endpoint() {
        let opts = ReportOptions {
            endpoint: Some(("/api/a".to_string(), "GET".to_string())),
            ..ReportOptions::default()
        };
        let summary = report_with(&opts).summary.unwrap();
        assert_eq!(summary.endpoint.as_deref(), Some("GET /api/a (Slow)"));
        assert_eq!(summary.total_count, 100.0);
        assert_eq!(summary.verb_distribution.len(), 1);
    }

    #[test]
    fn test_performance_section_defaults() {
        let perf = report_with(&ReportOptions::default()).performance.unwrap();
        assert_eq!(perf.rows[0].entry.verb, "POST");
        assert_eq!(perf.rows[0].tier, SeverityTier::Critical);
        assert_eq!(perf.curves.len(), 1);
        assert_eq!(perf.hidden_curves, 1);
        assert_eq!(perf.curves[0].path, "api/a");
        assert_eq!(perf.scatter[0].metric, 20000.0);
        assert_eq!(perf.methods, vec!["GET", "POST"]);
    }

    #[test]
    fn test_performance_show_all_and_filter() {
        let opts = ReportOptions {
            show_all: true,
            performance_filter: PerformanceFilter {
                endpoint: String::new(),
                method: Some("GET".to_string()),
            },
            ..ReportOptions::default()
        };
        let perf = report_with(&opts).performance.unwrap();
        assert_eq!(perf.rows.len(), 1);
        assert_eq!(perf.curves.len(), 1);
        assert_eq!(perf.hidden_curves, 0);
    }

    #[test]
    fn test_slow_query_section() {
        let slow = report_with(&ReportOptions::default()).slow_queries.unwrap();
        assert_eq!(slow.total_items, 2);
        assert_eq!(slow.rows[0].time, "2024-03-01 12:00:00");
        assert!(slow.rows[0].slow);
        assert!(!slow.rows[1].slow);
        assert_eq!(slow.rows[1].status_class, StatusClass::ServerError);
        assert_eq!(slow.showing, "Showing 1 to 2 of 2 results");
    }

    #[test]
    fn test_error_section_search_and_json() {
        let errors = report_with(&ReportOptions::default()).errors.unwrap();
        assert_eq!(errors.rows.len(), 2);
        assert!(errors.rows[0].json.is_none());
        assert_eq!(errors.rows[1].json, Some(serde_json::json!({"code": 500})));
        assert_eq!(
            errors.rows[1].pretty.as_deref(),
            Some("{\n  \"code\": 500\n}")
        );

        let opts = ReportOptions {
            search: "DISK".to_string(),
            ..ReportOptions::default()
        };
        let filtered = report_with(&opts).errors.unwrap();
        assert_eq!(filtered.total_items, 1);
    }

    #[test]
    fn test_render_text_contains_sections() {
        let text = render_text(&report_with(&ReportOptions::default()));
        assert!(text.contains("== Loaded Files =="));
        assert!(text.contains("Load Balancer Data"));
        assert!(text.contains("== Load Balancer Summary =="));
        assert!(text.contains("GET /api/a (Slow)"));
        assert!(text.contains("(1 with requests over 10 seconds)"));
        assert!(text.contains("1 endpoints with fewer than 100 requests hidden"));
        assert!(text.contains("== Endpoint Performance =="));
        assert!(text.contains("== Slow Requests =="));
        assert!(text.contains("12.500"));
        assert!(text.contains("== Error Summary =="));
        assert!(text.contains("\"code\": 500"));
    }

    #[test]
    fn test_render_json_round_trips() {
        let json = render_json(&report_with(&ReportOptions::default())).unwrap();
        let value: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["files"][0]["schema"], "loadbalancer");
        assert_eq!(value["performance"]["sort"]["field"], "P95");
        assert_eq!(value["performance"]["sort"]["direction"], "desc");
        assert_eq!(value["performance"]["rows"][0]["base_url"], "https://h.example.com/api/b");
        assert_eq!(value["slow_queries"]["rows"][0]["status_class"], "success");
        assert!(value["errors"]["rows"][1].get("pretty").is_none());
    }
}
