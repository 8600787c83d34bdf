/// Format a floating-point number with thousands separators and a fixed number
/// of decimal places.
///
/// # Examples
///
/// ```
/// use analyzer_core::formatting::format_number;
///
/// assert_eq!(format_number(1234.5,  1), "1,234.5");
/// assert_eq!(format_number(1234567.0, 0), "1,234,567");
/// assert_eq!(format_number(0.0, 2), "0.00");
/// assert_eq!(format_number(-9876.5, 1), "-9,876.5");
/// ```
pub fn format_number(value: f64, decimals: u32) -> String {
    // Sign is handled separately so grouping works on the absolute value.
    let negative = value < 0.0;
    let abs_value = value.abs();

    // Half-ULP nudge so exact decimal midpoints round up.
    let factor = 10_f64.powi(decimals as i32);
    let epsilon = f64::EPSILON * abs_value * factor;
    let rounded = ((abs_value * factor) + epsilon).round() / factor;

    let integer_part = rounded.trunc() as u64;
    let frac_part = rounded - rounded.trunc();

    let grouped = group_thousands(&integer_part.to_string());

    let result = if decimals == 0 {
        grouped
    } else {
        // "0.50" -> ".50"
        let frac_str = format!("{:.prec$}", frac_part, prec = decimals as usize);
        format!("{}{}", grouped, &frac_str[1..])
    };

    if negative && result.chars().any(|c| c.is_ascii_digit() && c != '0') {
        format!("-{}", result)
    } else {
        result
    }
}

/// Format an integer count with thousands separators.
///
/// ```
/// use analyzer_core::formatting::format_count;
///
/// assert_eq!(format_count(1_204_330), "1,204,330");
/// ```
pub fn format_count(value: u64) -> String {
    group_thousands(&value.to_string())
}

/// Format a summed request count.
///
/// Whole values print without decimals; anything else keeps two.
///
/// ```
/// use analyzer_core::formatting::format_amount;
///
/// assert_eq!(format_amount(1_500.0), "1,500");
/// assert_eq!(format_amount(4.5), "4.50");
/// ```
pub fn format_amount(value: f64) -> String {
    if value.fract() == 0.0 {
        format_number(value, 0)
    } else {
        format_number(value, 2)
    }
}

/// Format a processing time in seconds with millisecond precision.
///
/// ```
/// use analyzer_core::formatting::format_seconds;
///
/// assert_eq!(format_seconds(12.5), "12.500");
/// ```
pub fn format_seconds(seconds: f64) -> String {
    format!("{:.3}", seconds)
}

/// Calculate `(part / whole) * 100`, rounded to `decimal_places`.
///
/// Returns `0.0` if `whole` is zero to avoid division by zero.
///
/// ```
/// use analyzer_core::formatting::percentage;
///
/// assert!((percentage(50.0, 200.0, 1) - 25.0).abs() < 1e-9);
/// assert_eq!(percentage(0.0, 0.0, 2), 0.0);
/// ```
pub fn percentage(part: f64, whole: f64, decimal_places: u32) -> f64 {
    if whole == 0.0 {
        return 0.0;
    }
    let raw = (part / whole) * 100.0;
    let factor = 10_f64.powi(decimal_places as i32);
    (raw * factor).round() / factor
}

/// Strip scheme and host from an absolute URL, keeping the path without its
/// leading slash.
///
/// Splits on `/` and drops the first three pieces, so
/// `https://api.example.com/v1/users` becomes `v1/users`. A relative URL with
/// fewer than three slashes yields an empty string.
///
/// ```
/// use analyzer_core::formatting::endpoint_path;
///
/// assert_eq!(endpoint_path("https://api.example.com/v1/users"), "v1/users");
/// ```
pub fn endpoint_path(url: &str) -> String {
    url.split('/').skip(3).collect::<Vec<_>>().join("/")
}

// ── Internal helpers ──────────────────────────────────────────────────────────

/// Insert commas every three digits from the right of an integer string.
fn group_thousands(s: &str) -> String {
    if s.len() <= 3 {
        return s.to_string();
    }
    let chars: Vec<char> = s.chars().collect();
    let mut result = String::with_capacity(s.len() + s.len() / 3);
    let remainder = chars.len() % 3;
    for (i, &c) in chars.iter().enumerate() {
        if i != 0 && (i % 3 == remainder) {
            result.push(',');
        }
        result.push(c);
    }
    result
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    // ── format_number ────────────────────────────────────────────────────────

    #[test]
    fn test_format_number_zero() {
        assert_eq!(format_number(0.0, 0), "0");
        assert_eq!(format_number(0.0, 2), "0.00");
    }

    #[test]
    fn test_format_number_with_thousands() {
        assert_eq!(format_number(1_234.5, 1), "1,234.5");
    }

    #[test]
    fn test_format_number_negative() {
        assert_eq!(format_number(-9_876.5, 1), "-9,876.5");
    }

    #[test]
    fn test_format_number_negative_rounding_to_zero_has_no_sign() {
        assert_eq!(format_number(-0.2, 0), "0");
    }

    #[test]
    fn test_format_number_rounds_up() {
        assert_eq!(format_number(1.005, 2), "1.01");
    }

    // ── format_count ─────────────────────────────────────────────────────────

    #[test]
    fn test_format_count() {
        assert_eq!(format_count(0), "0");
        assert_eq!(format_count(999), "999");
        assert_eq!(format_count(1_000), "1,000");
    }

    // ── format_amount ────────────────────────────────────────────────────────

    #[test]
    fn test_format_amount_whole_and_fractional() {
        assert_eq!(format_amount(0.0), "0");
        assert_eq!(format_amount(1_234_567.0), "1,234,567");
        assert_eq!(format_amount(-1.0), "-1");
        assert_eq!(format_amount(2.25), "2.25");
    }

    // ── format_seconds ───────────────────────────────────────────────────────

    #[test]
    fn test_format_seconds_three_decimals() {
        assert_eq!(format_seconds(0.1), "0.100");
        assert_eq!(format_seconds(31.23456), "31.235");
    }

    // ── percentage ───────────────────────────────────────────────────────────

    #[test]
    fn test_percentage_rounding() {
        assert!((percentage(1.0, 3.0, 1) - 33.3).abs() < 1e-9);
    }

    // ── endpoint_path ────────────────────────────────────────────────────────

    #[test]
    fn test_endpoint_path_absolute_url() {
        assert_eq!(
            endpoint_path("https://game.example.com/api/players/{id}"),
            "api/players/{id}"
        );
    }

    #[test]
    fn test_endpoint_path_host_only() {
        assert_eq!(endpoint_path("https://game.example.com"), "");
        assert_eq!(endpoint_path("https://game.example.com/"), "");
    }

    #[test]
    fn test_endpoint_path_relative_url() {
        assert_eq!(endpoint_path("/api/health"), "");
        assert_eq!(endpoint_path("/api/v1/health"), "health");
    }
}
