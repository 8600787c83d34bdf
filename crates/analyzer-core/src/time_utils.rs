use chrono::{DateTime, TimeZone, Utc};
use chrono_tz::Tz;
use tracing::warn;

/// Display format for slow-request timestamps.
pub const DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// ── System timezone detection ─────────────────────────────────────────────────

/// Detect the IANA timezone name of the running system.
///
/// Falls back to `"UTC"` if detection fails.
pub fn get_system_timezone() -> String {
    iana_time_zone::get_timezone().unwrap_or_else(|_| "UTC".to_string())
}

// ── TimezoneHandler ───────────────────────────────────────────────────────────

/// Parses export timestamps and renders them in a chosen timezone.
#[derive(Debug, Clone, Copy)]
pub struct TimezoneHandler {
    tz: Tz,
}

impl TimezoneHandler {
    /// Create a handler for `tz_name`.
    ///
    /// `"auto"` resolves to the system timezone. Unrecognised names fall back
    /// to UTC with a warning.
    pub fn new(tz_name: &str) -> Self {
        let resolved = if tz_name == "auto" {
            get_system_timezone()
        } else {
            tz_name.to_string()
        };
        let tz = resolved.parse::<Tz>().unwrap_or_else(|_| {
            warn!(
                "TimezoneHandler: unrecognised timezone \"{}\", falling back to UTC",
                resolved
            );
            Tz::UTC
        });
        Self { tz }
    }

    /// Validate that `tz_name` is `"auto"` or a recognised IANA identifier.
    pub fn validate_timezone(tz_name: &str) -> bool {
        tz_name == "auto" || tz_name.parse::<Tz>().is_ok()
    }

    pub fn tz(&self) -> Tz {
        self.tz
    }

    /// Parse an ISO 8601 / RFC 3339 timestamp into UTC.
    ///
    /// Timestamps without an offset are read as wall-clock time in the
    /// handler's timezone. Returns `None` for empty or unrecognised input.
    pub fn parse_timestamp(&self, s: &str) -> Option<DateTime<Utc>> {
        let s = s.trim();
        if s.is_empty() {
            return None;
        }

        let normalised = match s.strip_suffix('Z') {
            Some(stripped) => format!("{}+00:00", stripped),
            None => s.to_string(),
        };
        if let Ok(dt) = DateTime::parse_from_rfc3339(&normalised) {
            return Some(dt.with_timezone(&Utc));
        }

        const FMTS: &[&str] = &[
            "%Y-%m-%dT%H:%M:%S%.f",
            "%Y-%m-%dT%H:%M:%S",
            "%Y-%m-%d %H:%M:%S%.f",
            "%Y-%m-%d %H:%M:%S",
        ];
        for fmt in FMTS {
            if let Ok(naive) = chrono::NaiveDateTime::parse_from_str(s, fmt) {
                if let chrono::LocalResult::Single(dt) = self.tz.from_local_datetime(&naive) {
                    return Some(dt.with_timezone(&Utc));
                }
            }
        }

        None
    }

    /// Render `raw` in the handler's timezone using [`DISPLAY_FORMAT`].
    ///
    /// Unparseable input is returned unchanged.
    pub fn display(&self, raw: &str) -> String {
        match self.parse_timestamp(raw) {
            Some(dt) => dt.with_timezone(&self.tz).format(DISPLAY_FORMAT).to_string(),
            None => raw.to_string(),
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_zulu_timestamp() {
        let handler = TimezoneHandler::new("UTC");
        let dt = handler.parse_timestamp("2024-03-01T12:30:00Z").unwrap();
        assert_eq!(dt.to_rfc3339(), "2024-03-01T12:30:00+00:00");
    }

    #[test]
    fn test_parse_offset_timestamp() {
        let handler = TimezoneHandler::new("UTC");
        let dt = handler.parse_timestamp("2024-03-01T12:30:00+02:00").unwrap();
        assert_eq!(dt.to_rfc3339(), "2024-03-01T10:30:00+00:00");
    }

    #[test]
    fn test_parse_naive_uses_handler_timezone() {
        let handler = TimezoneHandler::new("Europe/Berlin");
        // Berlin is UTC+1 in winter.
        let dt = handler.parse_timestamp("2024-01-15 10:00:00").unwrap();
        assert_eq!(dt.to_rfc3339(), "2024-01-15T09:00:00+00:00");
    }

    #[test]
    fn test_parse_garbage_returns_none() {
        let handler = TimezoneHandler::new("UTC");
        assert!(handler.parse_timestamp("yesterday").is_none());
        assert!(handler.parse_timestamp("").is_none());
    }

    #[test]
    fn test_display_converts_timezone() {
        let handler = TimezoneHandler::new("America/New_York");
        assert_eq!(handler.display("2024-07-04T16:00:00Z"), "2024-07-04 12:00:00");
    }

    #[test]
    fn test_display_passes_through_unparseable() {
        let handler = TimezoneHandler::new("UTC");
        assert_eq!(handler.display("not a time"), "not a time");
    }

    #[test]
    fn test_invalid_timezone_falls_back_to_utc() {
        let handler = TimezoneHandler::new("Mars/Olympus");
        assert_eq!(handler.tz(), Tz::UTC);
    }

    #[test]
    fn test_validate_timezone() {
        assert!(TimezoneHandler::validate_timezone("auto"));
        assert!(TimezoneHandler::validate_timezone("Asia/Tokyo"));
        assert!(!TimezoneHandler::validate_timezone("Nowhere/Special"));
    }
}
