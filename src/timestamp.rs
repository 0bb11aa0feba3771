//! Points in time for transaction dates and record timestamps.

use std::fmt::Display;

use rusqlite::{
    ToSql,
    types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef},
};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use time::{
    Date, OffsetDateTime, PrimitiveDateTime, Time, UtcOffset,
    format_description::{BorrowedFormatItem, well_known::Rfc3339},
    macros::format_description,
};

/// A date time without a timezone, e.g. "2024-01-31T13:45:00" or "2024-01-31T13:45:00.250".
const LOCAL_DATE_TIME_FORMAT: &[BorrowedFormatItem] =
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second][optional [.[subsecond]]]");

/// A calendar date, e.g. "2024-01-31".
const DATE_FORMAT: &[BorrowedFormatItem] = format_description!("[year]-[month]-[day]");

/// A UTC point in time with millisecond precision.
///
/// Anything finer than a millisecond is dropped on construction so that a
/// timestamp read back from the database equals the one that was written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(OffsetDateTime);

impl Timestamp {
    /// The current time.
    pub fn now() -> Self {
        Self::from_date_time(OffsetDateTime::now_utc())
    }

    /// Parse a date or date time string.
    ///
    /// Accepts RFC 3339 date times, date times without an offset (taken as
    /// UTC) and plain dates (taken as midnight UTC). Returns `None` for
    /// anything else, including impossible dates like "2024-02-30".
    pub fn parse(text: &str) -> Option<Self> {
        if let Ok(date_time) = OffsetDateTime::parse(text, &Rfc3339) {
            return Some(Self::from_date_time(date_time));
        }

        if let Ok(date_time) = PrimitiveDateTime::parse(text, LOCAL_DATE_TIME_FORMAT) {
            return Some(Self::from_date_time(date_time.assume_utc()));
        }

        Date::parse(text, DATE_FORMAT)
            .ok()
            .map(|date| Self::from_date_time(date.with_time(Time::MIDNIGHT).assume_utc()))
    }

    /// Milliseconds since the Unix epoch.
    pub fn unix_millis(&self) -> i64 {
        (self.0.unix_timestamp_nanos() / 1_000_000) as i64
    }

    /// Create a timestamp from milliseconds since the Unix epoch.
    ///
    /// Returns `None` if `millis` is outside the range supported by [OffsetDateTime].
    pub fn from_unix_millis(millis: i64) -> Option<Self> {
        OffsetDateTime::from_unix_timestamp_nanos(i128::from(millis) * 1_000_000)
            .ok()
            .map(Self)
    }

    /// The underlying date time in UTC.
    #[cfg(test)]
    pub fn date_time(&self) -> OffsetDateTime {
        self.0
    }

    fn from_date_time(date_time: OffsetDateTime) -> Self {
        let date_time = date_time.to_offset(UtcOffset::UTC);
        let millis = date_time.unix_timestamp_nanos().div_euclid(1_000_000);

        // Truncating can only move the time towards the epoch, so it stays in range.
        Self(OffsetDateTime::from_unix_timestamp_nanos(millis * 1_000_000).unwrap_or(date_time))
    }
}

impl Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.0.format(&Rfc3339) {
            Ok(text) => f.write_str(&text),
            Err(_) => write!(f, "{}", self.0),
        }
    }
}

impl Serialize for Timestamp {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let text = self
            .0
            .format(&Rfc3339)
            .map_err(serde::ser::Error::custom)?;

        serializer.serialize_str(&text)
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;

        Timestamp::parse(&text)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid date \"{text}\"")))
    }
}

impl ToSql for Timestamp {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.unix_millis()))
    }
}

impl FromSql for Timestamp {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let millis = value.as_i64()?;

        Timestamp::from_unix_millis(millis).ok_or(FromSqlError::OutOfRange(millis))
    }
}
