//! Display formatting for amounts, percentages and dates (ko-KR conventions)

use anyhow::{Result, anyhow};
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;

const WON: &str = "₩";
const INFINITY: &str = "∞";
const NAN: &str = "NaN";

/// Inserts `,` between every group of three digits. Expects ASCII digits only.
fn group_digits(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

/// Renders `value` with exactly `dp` decimals, ties rounded away from zero.
/// Values too large for `Decimal` fall back to plain float formatting.
fn fixed_away(value: Option<Decimal>, fallback: f64, dp: usize) -> String {
    match value {
        Some(d) => {
            let rounded =
                d.round_dp_with_strategy(dp as u32, RoundingStrategy::MidpointAwayFromZero);
            format!("{rounded:.dp$}")
        }
        None => format!("{fallback:.dp$}"),
    }
}

/// Rounds the exact binary value of `abs`, so `1.005` (stored just below the
/// tie) gives `1.00` while `1.125` gives `1.13`.
fn fixed_exact(abs: f64, dp: usize) -> String {
    fixed_away(Decimal::from_f64_retain(abs), abs, dp)
}

/// Rounds the shortest decimal that round-trips to `abs`, as locale number
/// formatting does: `1.0005` gives `1.001`.
fn fixed_shortest(abs: f64, dp: usize) -> String {
    fixed_away(Decimal::from_str(&abs.to_string()).ok(), abs, dp)
}

fn non_finite(value: f64) -> Option<(&'static str, &'static str)> {
    if value.is_nan() {
        Some(("", NAN))
    } else if value.is_infinite() {
        Some((if value < 0.0 { "-" } else { "" }, INFINITY))
    } else {
        None
    }
}

/// Formats an amount in Korean won: `₩1,234,567`. Won has no minor unit, so
/// the value is rounded half away from zero to an integer.
pub fn format_currency(value: f64) -> String {
    if let Some((sign, text)) = non_finite(value) {
        return format!("{sign}{WON}{text}");
    }
    let rounded = value.abs().round();
    let sign = if value < 0.0 && rounded > 0.0 { "-" } else { "" };
    format!("{sign}{WON}{}", group_digits(&format!("{rounded:.0}")))
}

/// Formats a number with thousands separators and at most three fraction
/// digits, trailing zeros dropped: `1,234.568`.
pub fn format_thousands(value: f64) -> String {
    if let Some((sign, text)) = non_finite(value) {
        return format!("{sign}{text}");
    }
    let fixed = fixed_shortest(value.abs(), 3);
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), ""));
    let frac_part = frac_part.trim_end_matches('0');
    // A negative value that rounds to zero prints as "0", not "-0".
    let is_zero = int_part.bytes().all(|b| b == b'0') && frac_part.is_empty();
    let sign = if value < 0.0 && !is_zero { "-" } else { "" };

    let mut out = format!("{sign}{}", group_digits(int_part));
    if !frac_part.is_empty() {
        out.push('.');
        out.push_str(frac_part);
    }
    out
}

/// Formats a percentage with two decimals and an explicit sign: `+3.20%`,
/// `-1.05%`. Zero, including `-0.0`, counts as non-negative.
pub fn format_signed_percent(value: f64) -> String {
    if value.is_nan() {
        return format!("{NAN}%");
    }
    if value.is_infinite() {
        return format!("{}{INFINITY}%", if value < 0.0 { "-" } else { "+" });
    }
    // -0.0 compares equal to 0.0 but would print as "-0.00".
    let value = if value == 0.0 { 0.0 } else { value };
    let sign = if value >= 0.0 { "+" } else { "-" };
    format!("{sign}{}%", fixed_exact(value.abs(), 2))
}

/// Formats a calendar date as `YYYY.MM.DD`. For zoned timestamps this is the
/// date in the timestamp's own offset.
pub fn format_date<D: Datelike>(date: &D) -> String {
    format!("{}.{:02}.{:02}", date.year(), date.month(), date.day())
}

/// Parses a date string and formats it as `YYYY.MM.DD`.
///
/// Accepts `2024-03-05`, RFC 3339 timestamps (`2024-03-05T09:00:00+09:00`),
/// offset-less ISO timestamps and already formatted `2024.03.05`.
pub fn format_date_str(input: &str) -> Result<String> {
    let input = input.trim();

    if let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        return Ok(format_date(&date));
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(input) {
        return Ok(format_date(&ts));
    }
    if let Ok(ts) = NaiveDateTime::parse_from_str(input, "%Y-%m-%dT%H:%M:%S%.f") {
        return Ok(format_date(&ts));
    }
    if let Ok(date) = NaiveDate::parse_from_str(input, "%Y.%m.%d") {
        return Ok(format_date(&date));
    }

    Err(anyhow!("Unrecognized date: {}", input))
}
