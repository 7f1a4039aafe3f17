//! Per-value type classification.
//!
//! Precedence is fixed: date/time, then floating-point numeric, then boolean,
//! then string. Numeric literals such as `1` and `0` therefore classify as
//! [`ColumnType::Float`]; only `true`/`false` classify as boolean.

use crate::core::ColumnType;
use crate::core::text::is_bool_literal;
use chrono::{DateTime, NaiveDate, NaiveDateTime};

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%d.%m.%Y %H:%M:%S",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d.%m.%Y"];

/// Classifies one raw field. Empty (or whitespace-only) values yield `None`
/// and take no part in inference.
pub fn classify_value(raw: &str) -> Option<ColumnType> {
    let value = raw.trim();
    if value.is_empty() {
        return None;
    }

    let data_type = if parse_datetime(value).is_some() {
        ColumnType::DateTime
    } else if parse_float(value).is_some() {
        ColumnType::Float
    } else if is_bool_literal(value) {
        ColumnType::Boolean
    } else {
        ColumnType::String
    };

    Some(data_type)
}

/// Parses the date/time literal forms recognized during classification.
/// Date-only values resolve to midnight.
pub fn parse_datetime(raw: &str) -> Option<NaiveDateTime> {
    let value = raw.trim();

    // Every accepted form starts with a digit and has a separator.
    if !value.starts_with(|c: char| c.is_ascii_digit())
        || !value.contains(['-', '/', '.'])
    {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.naive_local());
    }

    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, format) {
            return Some(dt);
        }
    }

    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(value, format).ok())
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}

/// Parses a finite floating-point literal.
pub fn parse_float(raw: &str) -> Option<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|f| f.is_finite())
}
