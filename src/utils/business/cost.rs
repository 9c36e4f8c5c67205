//! Monetary parsing and formatting helpers
//!
//! All monetary arithmetic in the estimator is plain `f64`; rounding happens
//! only here, at display time.

use once_cell::sync::Lazy;
use regex::Regex;

/// Everything that is not part of a decimal number
static NUMERIC_NOISE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^0-9.\-]+").expect("Invalid numeric noise regex"));

/// Format a value with exactly two decimal places (`100` -> `"100.00"`)
pub fn to_fixed2(value: f64) -> String {
    format!("{:.2}", value)
}

/// Format a value as US currency with thousands separators (`1234.5` -> `"$1,234.50"`)
pub fn format_usd(value: f64) -> String {
    let fixed = format!("{:.2}", value.abs());
    let (whole, cents) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if value < 0.0 && fixed != "0.00" { "-" } else { "" };
    format!("{}${}.{}", sign, grouped, cents)
}

/// Parse a loosely formatted monetary cell (`"$1,234.50 USD"` -> `1234.5`).
///
/// Returns `None` when nothing numeric remains after stripping.
pub fn parse_money(raw: &str) -> Option<f64> {
    let cleaned = NUMERIC_NOISE.replace_all(raw, "");
    // Longest leading numeric prefix wins
    let mut end = 0;
    let mut seen_dot = false;
    for (i, ch) in cleaned.char_indices() {
        match ch {
            '-' if i == 0 => end = i + 1,
            '0'..='9' => end = i + 1,
            '.' if !seen_dot => {
                seen_dot = true;
                end = i + 1;
            }
            _ => break,
        }
    }
    cleaned[..end].parse::<f64>().ok()
}

/// Parse the leading integer of a string the way a lenient form field would
/// (`" 42 users"` -> `42`, `"-3"` -> `-3`, `"abc"` -> `None`).
pub fn parse_leading_int(raw: &str) -> Option<i64> {
    let trimmed = raw.trim_start();
    let mut end = 0;
    for (i, ch) in trimmed.char_indices() {
        match ch {
            '+' | '-' if i == 0 => end = i + 1,
            '0'..='9' => end = i + 1,
            _ => break,
        }
    }
    trimmed[..end].parse::<i64>().ok()
}

/// Keep only ASCII digits and parse them (`"1,200 beds"` -> `1200`)
pub fn parse_digits(raw: &str) -> Option<u32> {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    digits.parse().ok()
}
