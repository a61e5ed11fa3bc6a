use chrono::{Duration, NaiveDate, TimeZone, Utc};

/// Calendar days are stored as ISO `yyyy-MM-dd` strings throughout.
pub const DAY_FORMAT: &str = "%Y-%m-%d";

pub fn today_string() -> String {
    Utc::now().format(DAY_FORMAT).to_string()
}

pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

pub fn parse_day(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value, DAY_FORMAT).ok()
}

/// True when `current` is exactly one calendar day after `last`. An empty or
/// unparseable `last` never counts as consecutive.
pub fn is_consecutive_day(last: &str, current: &str) -> bool {
    if last.is_empty() {
        return false;
    }

    match (parse_day(last), parse_day(current)) {
        (Some(last), Some(current)) => current.signed_duration_since(last).num_days() == 1,
        _ => false,
    }
}

/// The `yyyy-MM` prefix of a day string.
pub fn month_key(date: &str) -> &str {
    if date.len() >= 7 {
        &date[..7]
    } else {
        date
    }
}

pub fn day_offset(date: &str, days: i64) -> Option<String> {
    parse_day(date).map(|day| (day + Duration::days(days)).format(DAY_FORMAT).to_string())
}

/// `HH:mm` wall-clock rendering of an epoch-millisecond instant; zero (never
/// completed) renders as "unknown".
pub fn format_time_of_day(millis: i64) -> String {
    if millis <= 0 {
        return "unknown".to_string();
    }

    match Utc.timestamp_millis_opt(millis).single() {
        Some(instant) => instant.format("%H:%M").to_string(),
        None => "unknown".to_string(),
    }
}
