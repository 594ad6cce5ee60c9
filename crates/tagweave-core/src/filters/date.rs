//! Date/time formatting with PHP-style format letters
//!
//! | Letter | Output                         |
//! |--------|--------------------------------|
//! | d j    | day, padded / unpadded         |
//! | D l    | Mon / Monday                   |
//! | N w    | ISO weekday 1-7 / 0 (Sun)-6    |
//! | z S    | day of year (0-based) / st nd rd th |
//! | m n    | month, padded / unpadded       |
//! | F M    | January / Jan                  |
//! | t      | days in month                  |
//! | Y y    | 2026 / 26                      |
//! | a A    | am / AM                        |
//! | g G h H| 12h / 24h hours, unpadded / padded |
//! | i s    | minutes / seconds              |
//! | U c r  | unix timestamp / ISO 8601 / RFC 2822 |
//!
//! A backslash emits the next character literally.

use super::{FilterCall, Table, insert};
use crate::value::Value;
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Timelike};

pub(super) fn register(table: &mut Table) {
    insert(table, "date", date_filter);
}

fn date_filter(value: Value, call: &FilterCall<'_>) -> Value {
    let Some(datetime) = parse_datetime(&value) else {
        return value;
    };
    let format = call.arg_or(0, &call.config.date_format);
    Value::Str(format_php_date(&datetime, format))
}

/// Read a date from a timestamp or one of the common textual layouts
fn parse_datetime(value: &Value) -> Option<NaiveDateTime> {
    match value {
        Value::Int(ts) => from_timestamp(*ts),
        Value::Str(s) => parse_date_text(s.trim()),
        _ => None,
    }
}

fn from_timestamp(ts: i64) -> Option<NaiveDateTime> {
    DateTime::from_timestamp(ts, 0).map(|dt| dt.naive_utc())
}

fn parse_date_text(text: &str) -> Option<NaiveDateTime> {
    if text.is_empty() {
        return None;
    }
    if text.chars().all(|c| c.is_ascii_digit()) {
        // Date pickers store Ymd; anything else numeric is a timestamp
        if text.len() == 8 {
            if let Ok(date) = NaiveDate::parse_from_str(text, "%Y%m%d") {
                return date.and_hms_opt(0, 0, 0);
            }
        }
        return text.parse().ok().and_then(from_timestamp);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.naive_local());
    }
    for layout in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, layout) {
            return Some(dt);
        }
    }
    for layout in ["%Y-%m-%d", "%d/%m/%Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(text, layout) {
            return date.and_hms_opt(0, 0, 0);
        }
    }
    None
}

/// Render `dt` using PHP `date()` format letters
pub fn format_php_date(dt: &NaiveDateTime, format: &str) -> String {
    let mut out = String::with_capacity(format.len() * 2);
    let mut chars = format.chars();

    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                if let Some(literal) = chars.next() {
                    out.push(literal);
                }
            }
            'd' => out.push_str(&format!("{:02}", dt.day())),
            'j' => out.push_str(&dt.day().to_string()),
            'D' => out.push_str(&dt.format("%a").to_string()),
            'l' => out.push_str(&dt.format("%A").to_string()),
            'N' => out.push_str(&dt.weekday().number_from_monday().to_string()),
            'w' => out.push_str(&dt.weekday().num_days_from_sunday().to_string()),
            'z' => out.push_str(&dt.ordinal0().to_string()),
            'S' => out.push_str(ordinal_suffix(dt.day())),
            'm' => out.push_str(&format!("{:02}", dt.month())),
            'n' => out.push_str(&dt.month().to_string()),
            'F' => out.push_str(&dt.format("%B").to_string()),
            'M' => out.push_str(&dt.format("%b").to_string()),
            't' => out.push_str(&days_in_month(dt.year(), dt.month()).to_string()),
            'Y' => out.push_str(&dt.year().to_string()),
            'y' => out.push_str(&format!("{:02}", dt.year().rem_euclid(100))),
            'a' => out.push_str(if dt.hour() < 12 { "am" } else { "pm" }),
            'A' => out.push_str(if dt.hour() < 12 { "AM" } else { "PM" }),
            'g' => out.push_str(&hour12(dt.hour()).to_string()),
            'G' => out.push_str(&dt.hour().to_string()),
            'h' => out.push_str(&format!("{:02}", hour12(dt.hour()))),
            'H' => out.push_str(&format!("{:02}", dt.hour())),
            'i' => out.push_str(&format!("{:02}", dt.minute())),
            's' => out.push_str(&format!("{:02}", dt.second())),
            'U' => out.push_str(&dt.and_utc().timestamp().to_string()),
            'c' => out.push_str(&dt.format("%Y-%m-%dT%H:%M:%S+00:00").to_string()),
            'r' => out.push_str(&dt.format("%a, %d %b %Y %H:%M:%S +0000").to_string()),
            other => out.push(other),
        }
    }

    out
}

fn hour12(hour: u32) -> u32 {
    match hour % 12 {
        0 => 12,
        h => h,
    }
}

fn ordinal_suffix(day: u32) -> &'static str {
    match (day % 10, day % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    }
}

fn days_in_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|first| first.pred_opt())
        .map(|last| last.day())
        .unwrap_or(31)
}
