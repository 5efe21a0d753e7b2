// ABOUTME: Calendar-day arithmetic over YYYY-MM-DD keys
// ABOUTME: Strict parsing, inclusive day differences, day ranges with weekend flags

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::validation::ValidationError;

const DATE_KEY_FORMAT: &str = "%Y-%m-%d";

/// A calendar day in UTC, written as `YYYY-MM-DD` on the wire and in storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DateKey(NaiveDate);

impl DateKey {
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(Self)
    }

    pub fn date(&self) -> NaiveDate {
        self.0
    }
}

impl fmt::Display for DateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(DATE_KEY_FORMAT))
    }
}

impl FromStr for DateKey {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_date_key(s)
    }
}

impl From<NaiveDate> for DateKey {
    fn from(date: NaiveDate) -> Self {
        Self(date)
    }
}

impl Serialize for DateKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for DateKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse_date_key(&raw).map_err(serde::de::Error::custom)
    }
}

/// One column of a board: a day key and whether it falls on a weekend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayCell {
    pub date: DateKey,
    pub is_weekend: bool,
}

/// Parse a strict `YYYY-MM-DD` key. Parts must round-trip, so `2026-02-30`
/// and `2026-2-1` are both rejected.
pub fn parse_date_key(input: &str) -> Result<DateKey, ValidationError> {
    let bytes = input.as_bytes();
    let well_formed = bytes.len() == 10
        && bytes[4] == b'-'
        && bytes[7] == b'-'
        && bytes
            .iter()
            .enumerate()
            .all(|(i, b)| i == 4 || i == 7 || b.is_ascii_digit());

    if !well_formed {
        return Err(ValidationError::InvalidDate(input.to_string()));
    }

    let date = NaiveDate::parse_from_str(input, DATE_KEY_FORMAT)
        .map_err(|_| ValidationError::InvalidDate(input.to_string()))?;

    // chrono is lenient about padding; insist the canonical form comes back out
    if date.format(DATE_KEY_FORMAT).to_string() != input {
        return Err(ValidationError::InvalidDate(input.to_string()));
    }

    Ok(DateKey(date))
}

/// Parse a loosely typed JSON value as a date key. Anything but a string fails.
pub fn parse_date_value(value: &Value) -> Result<DateKey, ValidationError> {
    match value {
        Value::String(s) => parse_date_key(s),
        other => Err(ValidationError::InvalidDate(other.to_string())),
    }
}

pub fn to_date_key(date: NaiveDate) -> String {
    DateKey(date).to_string()
}

pub fn add_days(key: DateKey, days: i64) -> Result<DateKey, ValidationError> {
    Duration::try_days(days)
        .and_then(|delta| key.0.checked_add_signed(delta))
        .map(DateKey)
        .ok_or_else(|| ValidationError::DateOutOfCalendar {
            date: key.to_string(),
            days,
        })
}

/// Number of calendar days in `[start, end]`. Only meaningful when `end >= start`.
pub fn diff_days_inclusive(start: DateKey, end: DateKey) -> i64 {
    (end.0 - start.0).num_days() + 1
}

pub fn is_weekend(key: DateKey) -> bool {
    matches!(key.0.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Every day in `[start, end]`, ascending. Empty when `end < start`.
pub fn build_day_range(start: DateKey, end: DateKey) -> Vec<DayCell> {
    start
        .0
        .iter_days()
        .take_while(|day| *day <= end.0)
        .map(|day| {
            let date = DateKey(day);
            DayCell {
                date,
                is_weekend: is_weekend(date),
            }
        })
        .collect()
}
