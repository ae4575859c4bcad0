// Utility helpers for parsing, label cleanup and basic statistics.
//
// This module centralizes all the "dirty" CSV/number handling so the
// pipeline can assume normalized labels and non-negative amounts.
use num_format::{Locale, ToFormattedString};

/// Label used for a missing or blank category / country.
pub const UNKNOWN: &str = "Unknown";

/// Parse a string-like value into `f64` while being forgiving about
/// formatting issues that are common in procurement exports.
///
/// - Accepts `Option<&str>` so callers can pass through optional fields.
/// - Trims whitespace.
/// - Rejects values that contain alphabetic characters.
/// - Strips thousands separators and currency signs before parsing.
/// - Returns `None` for anything that cannot be safely parsed.
pub fn parse_f64_safe(s: Option<&str>) -> Option<f64> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    if s.chars().any(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    let s: String = s.chars().filter(|c| !matches!(c, ',' | '$' | ' ')).collect();
    s.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Clamp an optional amount into the non-negative range. Missing, negative
/// and non-finite values all collapse to 0.
pub fn non_negative(v: Option<f64>) -> f64 {
    match v {
        Some(v) if v.is_finite() && v > 0.0 => v,
        _ => 0.0,
    }
}

/// Trimmed label, or `"Unknown"` when absent or blank.
pub fn clean_label(s: Option<&str>) -> &str {
    match s.map(str::trim) {
        Some(t) if !t.is_empty() => t,
        _ => UNKNOWN,
    }
}

/// True when the optional string has something left after trimming.
pub fn is_present(s: Option<&str>) -> bool {
    s.map(|v| !v.trim().is_empty()).unwrap_or(false)
}

/// `part / whole` as a percentage; 0 when `whole` is 0.
pub fn percent_of(part: f64, whole: f64) -> f64 {
    if whole <= 0.0 {
        return 0.0;
    }
    (part / whole) * 100.0
}

/// Integer percentage rounded to nearest, halves rounding up.
pub fn round_percent(count: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    (percent_of(count as f64, total as f64)).round() as u32
}

pub fn to_millions(v: f64) -> f64 {
    v / 1_000_000.0
}

pub fn format_number(n: f64, decimals: usize) -> String {
    // Format a floating-point value with:
    // - a fixed number of decimal places, and
    // - locale-aware thousands separators (e.g., `1,234,567.89`).
    let neg = n.is_sign_negative() && n != 0.0;
    let abs_n = n.abs();
    let s = format!("{:.*}", decimals, abs_n);
    let mut parts = s.split('.');
    let int_part = parts.next().unwrap_or("0");
    let frac_part = parts.next();
    // Beyond u128 the digits are kept as printed, without separators.
    let mut res = match int_part.parse::<u128>() {
        Ok(v) => v.to_formatted_string(&Locale::en),
        Err(_) => int_part.to_string(),
    };
    if let Some(frac) = frac_part {
        if decimals > 0 {
            res.push('.');
            res.push_str(frac);
        }
    }
    if neg {
        format!("-{}", res)
    } else {
        res
    }
}

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    // Counts in console messages (e.g., `1,204 vendors loaded`).
    n.to_formatted_string(&Locale::en)
}

// Display adapters for `#[tabled(display_with = ...)]`.

pub fn display_money(v: &f64) -> String {
    format_number(*v, 2)
}

pub fn display_decimal(v: &f64) -> String {
    format_number(*v, 1)
}

pub fn display_percent(v: &f64) -> String {
    format!("{}%", format_number(*v, 1))
}

pub fn display_optional_score(v: &Option<f64>) -> String {
    match v {
        Some(s) => format!("{:.2}", s),
        None => "n/a".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_f64_safe() {
        assert_eq!(parse_f64_safe(Some(" 1,250,000 ")), Some(1_250_000.0));
        assert_eq!(parse_f64_safe(Some("$4,000.50")), Some(4000.5));
        assert_eq!(parse_f64_safe(Some("n/a")), None);
        assert_eq!(parse_f64_safe(Some("   ")), None);
        assert_eq!(parse_f64_safe(None), None);
    }

    #[test]
    fn test_non_negative() {
        assert_eq!(non_negative(Some(12.5)), 12.5);
        assert_eq!(non_negative(Some(-3.0)), 0.0);
        assert_eq!(non_negative(Some(f64::NAN)), 0.0);
        assert_eq!(non_negative(None), 0.0);
    }

    #[test]
    fn test_clean_label() {
        assert_eq!(clean_label(Some("  Switchgear ")), "Switchgear");
        assert_eq!(clean_label(Some("   ")), UNKNOWN);
        assert_eq!(clean_label(None), UNKNOWN);
    }

    #[test]
    fn test_round_percent() {
        assert_eq!(round_percent(1, 2), 50);
        assert_eq!(round_percent(2, 3), 67);
        assert_eq!(round_percent(1, 8), 13);
        assert_eq!(round_percent(0, 0), 0);
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(1234567.891, 2), "1,234,567.89");
        assert_eq!(format_number(-2500.0, 0), "-2,500");
        assert_eq!(format_number(0.0, 1), "0.0");
    }

    #[test]
    fn test_format_number_large_values() {
        assert_eq!(format_number(1e19, 2), "10,000,000,000,000,000,000.00");
        assert_eq!(format_number(-1e19, 0), "-10,000,000,000,000,000,000");
        let huge = format_number(1e40, 0);
        assert!(huge.starts_with("1000000000000000"));
        assert_eq!(huge.len(), 41);
    }
}
