//! Field parsers for raw legacy export cells
//!
//! Every parser is a pure function over a raw string cell. The legacy export
//! uses `-` as a universal "no value" marker, so blank, whitespace-only and
//! `-` cells are treated as absent everywhere.

use chrono::NaiveDate;
use regex::Regex;
use std::sync::LazyLock;

use crate::models::member::Sex;

/// Email grammar used by the legacy backend: one `@`, dot-separated local
/// part without leading/trailing/consecutive dots, domain with a TLD of at
/// least two letters. Format check only, no DNS lookup.
static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9_%+-]+(\.[A-Za-z0-9_%+-]+)*@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$")
        .expect("email grammar regex is valid")
});

/// Trim a raw cell and map the absent sentinels (`""`, whitespace, `-`) to `None`
pub fn non_blank(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    if trimmed.is_empty() || trimmed == "-" {
        None
    } else {
        Some(trimmed)
    }
}

/// Parse an integer cell, ignoring grouping characters
///
/// Strips everything except digits and minus signs before parsing, so
/// `"1.234"` becomes `1234`. A minus sign anywhere but the front makes the
/// remainder unparseable and yields `None`.
pub fn parse_integer(value: &str) -> Option<i64> {
    let raw = non_blank(value)?;
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '-')
        .collect();
    cleaned.parse().ok()
}

/// Parse a date cell into a canonical date
///
/// Accepts `DD/MM/YYYY` first, then `YYYY-MM-DD`. Nothing else: values like
/// `03/04/2020` are deliberately read day-first, matching the legacy export
/// locale.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let raw = non_blank(value)?;
    NaiveDate::parse_from_str(raw, "%d/%m/%Y")
        .or_else(|_| NaiveDate::parse_from_str(raw, "%Y-%m-%d"))
        .ok()
}

/// Parse a boolean cell as a tri-state
///
/// `"0"`/`"false"` and `"1"`/`"true"` (case-insensitive) are definite;
/// everything else is `None`, never a default.
pub fn parse_boolean(value: &str) -> Option<bool> {
    let raw = non_blank(value)?.to_lowercase();
    match raw.as_str() {
        "1" | "true" => Some(true),
        "0" | "false" => Some(false),
        _ => None,
    }
}

/// Map a salutation cell to a sex
pub fn parse_sex(value: &str) -> Option<Sex> {
    let raw = non_blank(value)?.to_lowercase();
    match raw.as_str() {
        "herr" | "mr" | "mr." | "m" => Some(Sex::M),
        "frau" | "mrs" | "mrs." | "ms" | "ms." | "f" => Some(Sex::F),
        _ => None,
    }
}

/// Clean a string cell, optionally truncating to `max_chars` characters
pub fn clean_string(value: &str, max_chars: Option<usize>) -> Option<String> {
    let raw = non_blank(value)?;
    match max_chars {
        Some(max) => Some(raw.chars().take(max).collect()),
        None => Some(raw.to_string()),
    }
}

/// Check an email address against the canonical grammar
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}
