//! Wall-clock helpers for the `HH:MM` and `YYYY-MM-DD` strings stored in records.

use chrono::{Local, NaiveDate, NaiveDateTime, NaiveTime};

use crate::error::ValidationError;

pub const TIME_FORMAT: &str = "%H:%M";
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Current local wall-clock time.
pub fn now_local() -> NaiveDateTime {
    Local::now().naive_local()
}

pub fn today_local() -> NaiveDate {
    now_local().date()
}

pub fn parse_time(field: &'static str, value: &str) -> Result<NaiveTime, ValidationError> {
    NaiveTime::parse_from_str(value.trim(), TIME_FORMAT).map_err(|_| ValidationError::InvalidTime {
        field,
        value: value.to_string(),
    })
}

pub fn parse_date(field: &'static str, value: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).map_err(|_| ValidationError::InvalidDate {
        field,
        value: value.to_string(),
    })
}

/// Canonical `HH:MM` form, zero-padded.
pub fn normalize_time(field: &'static str, value: &str) -> Result<String, ValidationError> {
    Ok(parse_time(field, value)?.format(TIME_FORMAT).to_string())
}

pub fn normalize_date(field: &'static str, value: &str) -> Result<String, ValidationError> {
    Ok(parse_date(field, value)?.format(DATE_FORMAT).to_string())
}

/// `now` truncated to minute resolution, as `HH:MM`.
pub fn minute_of(now: NaiveDateTime) -> String {
    now.format(TIME_FORMAT).to_string()
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}
