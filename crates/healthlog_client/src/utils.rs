//! Day-key normalization shared by every date-bearing record.
//!
//! A day-key is a zero-padded `YYYY-MM-DD` string. Keys compare correctly both
//! for equality and lexicographically, so range checks are plain string
//! comparisons.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone};

/// Format used for every day-key.
pub const DAY_KEY_FORMAT: &str = "%Y-%m-%d";

/// Anything that can be reduced to a day-key.
///
/// Strings are cut at the first `T` with no timezone conversion, so both
/// `2025-11-11` and `2025-11-11T08:00:00Z` map to `2025-11-11`. Calendar and
/// date/time values are formatted from their own year/month/day fields.
pub trait ToDayKey {
    fn to_day_key(&self) -> String;
}

impl ToDayKey for str {
    fn to_day_key(&self) -> String {
        self.split_once('T')
            .map_or(self, |(date, _)| date)
            .to_string()
    }
}

impl ToDayKey for String {
    fn to_day_key(&self) -> String {
        self.as_str().to_day_key()
    }
}

impl ToDayKey for NaiveDate {
    fn to_day_key(&self) -> String {
        self.format(DAY_KEY_FORMAT).to_string()
    }
}

impl ToDayKey for NaiveDateTime {
    fn to_day_key(&self) -> String {
        self.date().to_day_key()
    }
}

impl<Tz: TimeZone> ToDayKey for DateTime<Tz> {
    fn to_day_key(&self) -> String {
        self.date_naive().to_day_key()
    }
}

/// Loosely typed JSON: only strings carry a date, anything else is an empty key.
impl ToDayKey for serde_json::Value {
    fn to_day_key(&self) -> String {
        match self {
            serde_json::Value::String(s) => s.to_day_key(),
            _ => String::new(),
        }
    }
}

impl<T: ToDayKey + ?Sized> ToDayKey for &T {
    fn to_day_key(&self) -> String {
        (**self).to_day_key()
    }
}

/// Normalize a date-bearing value into its day-key.
pub fn day_key<T: ToDayKey + ?Sized>(value: &T) -> String {
    value.to_day_key()
}

/// Parse a day-key back into a calendar date.
pub fn parse_day_key(key: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(&day_key(key), DAY_KEY_FORMAT).ok()
}
