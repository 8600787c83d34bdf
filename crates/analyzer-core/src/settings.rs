use clap::Parser;
use std::path::PathBuf;

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Classify and summarise load-balancer log exports
#[derive(Parser, Debug, Clone)]
#[command(
    name = "lb-analyzer",
    about = "Classify and summarise load-balancer log exports",
    version
)]
pub struct Settings {
    /// CSV / TXT exports, ZIP bundles of them, or directories to scan
    #[arg(required = true, num_args = 1..)]
    pub inputs: Vec<PathBuf>,

    /// Which dataset view to print
    #[arg(
        long,
        default_value = "all",
        value_parser = ["summary", "stats", "slow", "errors", "all"]
    )]
    pub view: String,

    /// Restrict the summary view to one endpoint, written as "VERB URL"
    #[arg(long)]
    pub endpoint: Option<String>,

    /// Case-insensitive substring filter on performance endpoint URLs
    #[arg(long, default_value = "")]
    pub url_filter: String,

    /// Exact HTTP method filter for the performance view
    #[arg(long)]
    pub method: Option<String>,

    /// Search term for the slow-request and error tables
    #[arg(long, default_value = "")]
    pub search: String,

    /// Page of the slow-request and error tables (1-based)
    #[arg(long, default_value = "1", value_parser = clap::value_parser!(u32).range(1..))]
    pub page: u32,

    /// Sort field for the performance table
    #[arg(
        long,
        default_value = "P95",
        value_parser = ["base_url", "request_verb", "avg_rt", "P50", "P95", "P100", "requests"]
    )]
    pub sort: String,

    /// Sort direction for the performance table
    #[arg(long, default_value = "desc", value_parser = ["asc", "desc"])]
    pub direction: String,

    /// Metric plotted against request volume in the performance view
    #[arg(
        long,
        default_value = "P100",
        value_parser = ["avg_rt", "P25", "P50", "P60", "P75", "P90", "P95", "P100"]
    )]
    pub metric: String,

    /// Include endpoints below the request-volume cut-off in percentile curves
    #[arg(long)]
    pub show_all: bool,

    /// Output format
    #[arg(long, default_value = "text", value_parser = ["text", "json"])]
    pub format: String,

    /// Timezone for slow-request timestamps (auto-detected if not specified)
    #[arg(long, default_value = "auto")]
    pub timezone: String,

    /// Logging level
    #[arg(long, default_value = "INFO", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR"])]
    pub log_level: String,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,
}

impl Settings {
    /// Parse process arguments and resolve sentinel values.
    pub fn load() -> Self {
        Self::resolve(Settings::parse())
    }

    /// Same as [`Settings::load`] with an explicit argument list.
    pub fn load_from_args<I, T>(args: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        Self::resolve(Settings::parse_from(args))
    }

    /// Resolve `"auto"` timezone and apply the `--debug` flag.
    fn resolve(mut settings: Settings) -> Settings {
        if settings.timezone == "auto" {
            settings.timezone = crate::time_utils::get_system_timezone();
        }
        if settings.debug {
            settings.log_level = "DEBUG".to_string();
        }
        settings
    }

    /// Split `--endpoint "VERB URL"` into `(url, verb)`.
    ///
    /// Returns `None` when the flag is absent or has no whitespace separator.
    pub fn endpoint_key(&self) -> Option<(String, String)> {
        let raw = self.endpoint.as_deref()?.trim();
        let (verb, url) = raw.split_once(char::is_whitespace)?;
        let url = url.trim();
        if verb.is_empty() || url.is_empty() {
            return None;
        }
        Some((url.to_string(), verb.to_string()))
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
