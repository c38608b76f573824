// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared helpers for date/time formatting and parsing.

use chrono::{DateTime, NaiveDateTime, Utc};

/// Display format for timestamps in the admin changelist.
pub const ADMIN_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Form input format; keeps any sub-second part so an unchanged form saves
/// the same instant.
pub const ADMIN_INPUT_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

const ACCEPTED_NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
];

/// Format a UTC timestamp for the admin forms and changelist.
pub fn format_admin_datetime(date: DateTime<Utc>) -> String {
    date.format(ADMIN_DATETIME_FORMAT).to_string()
}

/// Format a UTC timestamp as the value of an admin form field.
pub fn format_admin_input(date: DateTime<Utc>) -> String {
    date.format(ADMIN_INPUT_FORMAT).to_string()
}

/// Parse an admin-entered timestamp.
///
/// Naive values are taken as UTC; RFC 3339 values are converted to UTC.
pub fn parse_admin_datetime(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    ACCEPTED_NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}
