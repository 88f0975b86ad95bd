use chrono::{Datelike, Duration, Local, NaiveDate};

const DATE_KEY_FORMAT: &str = "%Y-%m-%d";

/// Today's local calendar date as a `YYYY-MM-DD` key.
pub fn today_key() -> String {
    format_date_key(Local::now().date_naive())
}

pub fn format_date_key(date: NaiveDate) -> String {
    date.format(DATE_KEY_FORMAT).to_string()
}

/// Parses a `YYYY-MM-DD` key. Malformed keys yield `None`.
pub fn parse_date_key(key: &str) -> Option<NaiveDate> {
    let key = key.trim();
    if key.len() != 10 {
        return None;
    }
    NaiveDate::parse_from_str(key, DATE_KEY_FORMAT).ok()
}

/// Whole calendar days from `start_key` to `end_key`, negative when `end_key`
/// comes first. `None` if either key does not parse.
///
/// Works on calendar dates rather than instants, so a daylight-saving shift
/// between the two days cannot produce a fractional day.
pub fn day_difference(start_key: &str, end_key: &str) -> Option<i64> {
    let start = parse_date_key(start_key)?;
    let end = parse_date_key(end_key)?;
    Some(days_between(start, end))
}

pub fn days_between(start: NaiveDate, end: NaiveDate) -> i64 {
    (end - start).num_days()
}

/// Monday of the week containing `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}
