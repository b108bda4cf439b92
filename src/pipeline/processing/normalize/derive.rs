use chrono::{Datelike, NaiveDate, NaiveDateTime};

use crate::constants::{EXPLICIT_TRACK, RELEASE_DATE, RELEASE_YEAR, TRACK_TYPE};
use crate::domain::{Table, TrackType, Value};

const DATE_FORMATS: [&str; 7] = [
    "%m/%d/%y",
    "%m/%d/%Y",
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%d-%b-%Y",
    "%B %d, %Y",
    "%b %d, %Y",
];

const DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%m/%d/%Y %H:%M"];

/// Year of a release date, or `None` when the value is not a recognizable date
pub fn parse_release_year(value: &Value) -> Option<i32> {
    let raw = match value {
        Value::Text(s) => s.trim(),
        // A bare year that was already coerced
        Value::Number(n) if n.fract() == 0.0 && (1000.0..=9999.0).contains(n) => {
            return Some(*n as i32)
        }
        _ => return None,
    };

    if raw.len() == 4 && raw.chars().all(|c| c.is_ascii_digit()) {
        return raw.parse().ok();
    }

    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
                .map(|dt| dt.date())
        })
        .map(|date| date.year())
}

/// Add or refresh `Release Year` from `Release Date`. No-op when the date column is absent.
pub fn derive_release_year(table: &mut Table) -> bool {
    let Some(dates) = table.column(RELEASE_DATE) else {
        return false;
    };
    let years: Vec<Value> = dates
        .map(|v| {
            parse_release_year(v)
                .map(|y| Value::Number(y as f64))
                .unwrap_or(Value::Missing)
        })
        .collect();
    table.set_column(RELEASE_YEAR, years);
    true
}

/// Add or refresh `Track Type` from `Explicit Track`. No-op when the flag column is absent.
pub fn derive_track_type(table: &mut Table) -> bool {
    let Some(flags) = table.column(EXPLICIT_TRACK) else {
        return false;
    };
    let types: Vec<Value> = flags
        .map(|v| Value::Text(TrackType::from_flag(v).as_str().to_string()))
        .collect();
    table.set_column(TRACK_TYPE, types);
    true
}
