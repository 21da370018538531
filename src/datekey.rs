// src/datekey.rs
//! Calendar-day and month keys.
//!
//! Every date key in the journal is derived here, from the *local* calendar
//! day. Date-times in any other zone are shifted into `Local` before the day
//! is taken, so an entry logged at 00:30 local time is never filed under the
//! previous (UTC) day.

use chrono::{DateTime, Local, NaiveDate, TimeZone};

use crate::error::{DateKeyError, DateKeyResult};

pub const DATE_KEY_FORMAT: &str = "%Y-%m-%d";
pub const MONTH_KEY_FORMAT: &str = "%Y-%m";
pub const DATE_KEY_LEN: usize = 10;
pub const MONTH_KEY_LEN: usize = 7;

/// Formats a calendar day as a zero-padded `YYYY-MM-DD` key.
pub fn local_date_key(date: NaiveDate) -> String {
    date.format(DATE_KEY_FORMAT).to_string()
}

pub fn month_key(date: NaiveDate) -> String {
    date.format(MONTH_KEY_FORMAT).to_string()
}

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

pub fn today_key() -> String {
    local_date_key(today())
}

pub fn current_month_key() -> String {
    month_key(today())
}

/// The `YYYY-MM` prefix of a date key, or `None` if the key is too short to have one.
pub fn month_key_of(date_key: &str) -> Option<&str> {
    date_key.get(..MONTH_KEY_LEN)
}

/// Parses a stored key, which must be in the zero-padded `YYYY-MM-DD` form.
pub fn parse_date_key(key: &str) -> DateKeyResult<NaiveDate> {
    let key = key.trim();
    if key.len() != DATE_KEY_LEN {
        return Err(DateKeyError::InvalidDate(key.to_string()));
    }
    NaiveDate::parse_from_str(key, DATE_KEY_FORMAT)
        .map_err(|_| DateKeyError::InvalidDate(key.to_string()))
}

/// Parses a day typed by a person. Unpadded parts such as `2024-3-1` are accepted.
pub fn parse_day(input: &str) -> DateKeyResult<NaiveDate> {
    let input = input.trim();
    NaiveDate::parse_from_str(input, DATE_KEY_FORMAT)
        .map_err(|_| DateKeyError::InvalidDate(input.to_string()))
}

/// Parses a `YYYY-MM` key into the first day of that month.
pub fn parse_month_key(key: &str) -> DateKeyResult<NaiveDate> {
    let key = key.trim();
    if key.len() != MONTH_KEY_LEN {
        return Err(DateKeyError::InvalidMonth(key.to_string()));
    }
    NaiveDate::parse_from_str(&format!("{}-01", key), DATE_KEY_FORMAT)
        .map_err(|_| DateKeyError::InvalidMonth(key.to_string()))
}

/// The calendar month before `month_key`, rolling over the year boundary.
pub fn previous_month_key(key: &str) -> DateKeyResult<String> {
    let first_day = parse_month_key(key)?;
    // The day before the 1st always lands in the previous month.
    first_day
        .pred_opt()
        .map(month_key)
        .ok_or_else(|| DateKeyError::InvalidMonth(key.to_string()))
}

/// Anything a date-based store operation accepts: a ready key or a calendar value.
pub trait IntoDateKey {
    fn into_date_key(self) -> String;
}

/// Valid days are re-formatted to the padded key; anything else passes through trimmed.
impl IntoDateKey for &str {
    fn into_date_key(self) -> String {
        match parse_day(self) {
            Ok(date) => local_date_key(date),
            Err(_) => self.trim().to_string(),
        }
    }
}

impl IntoDateKey for String {
    fn into_date_key(self) -> String {
        self.as_str().into_date_key()
    }
}

impl IntoDateKey for &String {
    fn into_date_key(self) -> String {
        self.as_str().into_date_key()
    }
}

impl IntoDateKey for NaiveDate {
    fn into_date_key(self) -> String {
        local_date_key(self)
    }
}

impl<Tz: TimeZone> IntoDateKey for DateTime<Tz> {
    fn into_date_key(self) -> String {
        local_date_key(self.with_timezone(&Local).date_naive())
    }
}
