use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

pub(crate) type Result<T, E = Error> = std::result::Result<T, E>;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const DATE_FORMAT: &str = "%Y-%m-%d";

/// An instant in time at one-second precision, always UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "DateTime<Utc>", into = "DateTime<Utc>")]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// The sentinel value used where no real timestamp applies: year 1, January 1st, midnight.
    pub fn invalid() -> Self {
        Self::new(1, 1, 1, 0, 0, 0)
    }

    /// Construct a UTC instant from its calendar components.
    pub fn new(year: i32, month: u32, day: u32, hour: u32, minute: u32, second: u32) -> Self {
        let date = NaiveDate::from_ymd_opt(year, month, day).expect("valid calendar date");
        let time = NaiveTime::from_hms_opt(hour, minute, second).expect("valid time of day");
        Self(Utc.from_utc_datetime(&NaiveDateTime::new(date, time)))
    }

    /// The current instant, truncated to whole seconds.
    pub fn now() -> Self {
        let now = Utc::now();
        Self::new(
            now.year(),
            now.month(),
            now.day(),
            now.hour_(),
            now.minute_(),
            now.second_(),
        )
    }

    /// Parse the canonical `YYYY-MM-DD HH:MM:SS` form.
    pub fn parse(value: &str) -> Result<Self> {
        NaiveDateTime::parse_from_str(value, TIMESTAMP_FORMAT)
            .map(|naive| Self(Utc.from_utc_datetime(&naive)))
            .map_err(|_| Error::Malformed(value.to_owned()))
    }

    /// The time-of-day part, formatted as `HH:MM:SS`.
    pub fn clock(&self) -> String {
        self.0.format("%H:%M:%S").to_string()
    }

    /// The calendar date this instant falls on.
    pub fn date(&self) -> Date {
        Date(self.0.date_naive())
    }

    /// Add a duration expressed in whole seconds.
    pub fn plus_seconds(&self, seconds: i64) -> Self {
        Self(self.0 + chrono::Duration::seconds(seconds))
    }

    /// Duration until another (later) timestamp.
    pub fn duration_until(&self, other: Timestamp) -> chrono::Duration {
        other.0 - self.0
    }

    /// Seconds since the Unix epoch, for the token API's wire format.
    pub fn unix_timestamp(&self) -> i64 {
        self.0.timestamp()
    }

    pub(crate) fn inner(&self) -> DateTime<Utc> {
        self.0
    }
}

// small helpers so `now()` doesn't collide with chrono's own Timelike import noise
trait TimeParts {
    fn hour_(&self) -> u32;
    fn minute_(&self) -> u32;
    fn second_(&self) -> u32;
}

impl TimeParts for DateTime<Utc> {
    fn hour_(&self) -> u32 {
        use chrono::Timelike;
        self.hour()
    }
    fn minute_(&self) -> u32 {
        use chrono::Timelike;
        self.minute()
    }
    fn second_(&self) -> u32 {
        use chrono::Timelike;
        self.second()
    }
}

impl Display for Timestamp {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(TIMESTAMP_FORMAT))
    }
}

impl TryFrom<DateTime<Utc>> for Timestamp {
    type Error = std::convert::Infallible;

    fn try_from(value: DateTime<Utc>) -> std::result::Result<Self, Self::Error> {
        Ok(Self(value))
    }
}

impl From<Timestamp> for DateTime<Utc> {
    fn from(value: Timestamp) -> Self {
        value.0
    }
}

/// A calendar date (year, month, day), with no time-of-day component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Date(NaiveDate);

impl Date {
    pub fn new(year: i32, month: u32, day: u32) -> Self {
        Self(NaiveDate::from_ymd_opt(year, month, day).expect("valid calendar date"))
    }

    pub fn invalid() -> Self {
        Self::new(1, 1, 1)
    }

    pub fn year(&self) -> i32 {
        self.0.year()
    }

    pub fn month(&self) -> u32 {
        self.0.month()
    }

    pub fn day(&self) -> u32 {
        self.0.day()
    }

    /// Parse the `YYYY/MM/DD` form used by the analyzer CLI.
    ///
    /// The service itself never parses dates from user input; this format matches the
    /// newer of the two incompatible formats the source carried.
    pub fn parse(value: &str) -> Result<Self> {
        NaiveDate::parse_from_str(value, "%Y/%m/%d")
            .map(Self)
            .map_err(|_| Error::Malformed(value.to_owned()))
    }

    /// Midnight (00:00:00) on this date.
    pub fn midnight(&self) -> Timestamp {
        Timestamp::new(self.year(), self.month(), self.day(), 0, 0, 0)
    }

    /// One second before the next day (23:59:59) on this date.
    pub fn end_of_day(&self) -> Timestamp {
        Timestamp::new(self.year(), self.month(), self.day(), 23, 59, 59)
    }

    /// The filename (without directory) a journal for this date is stored under.
    pub fn journal_filename(&self) -> String {
        format!("{self}.journal")
    }
}

impl Display for Date {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(DATE_FORMAT))
    }
}

/// Errors that can occur parsing timestamps or dates.
#[derive(Debug)]
pub enum Error {
    /// The input did not match the expected canonical form.
    Malformed(String),
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Malformed(value) => write!(f, "malformed timestamp or date: {value:?}"),
        }
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamp_round_trips_through_string() {
        let ts = Timestamp::new(2021, 10, 15, 13, 40, 11);
        let rendered = ts.to_string();
        assert_eq!(rendered, "2021-10-15 13:40:11");
        assert_eq!(Timestamp::parse(&rendered).unwrap(), ts);
    }

    #[test]
    fn date_round_trips_through_parse_and_canonical_string() {
        let date = Date::new(2021, 10, 15);
        assert_eq!(date.to_string(), "2021-10-15");
        assert_eq!(Date::parse("2021/10/15").unwrap(), date);
    }

    #[test]
    fn invalid_timestamp_is_year_one() {
        let invalid = Timestamp::invalid();
        assert_eq!(invalid.to_string(), "0001-01-01 00:00:00");
    }

    #[test]
    fn parse_timestamp_rejects_malformed_input() {
        assert!(Timestamp::parse("not a timestamp").is_err());
    }

    #[test]
    fn parse_date_rejects_wrong_separator() {
        assert!(Date::parse("15.10.2021").is_err());
    }

    #[test]
    fn journal_filename_matches_date() {
        let date = Date::new(2021, 10, 15);
        assert_eq!(date.journal_filename(), "2021-10-15.journal");
    }

    #[test]
    fn unix_timestamp_matches_known_epoch_offset() {
        let ts = Timestamp::new(1970, 1, 1, 0, 0, 42);
        assert_eq!(ts.unix_timestamp(), 42);
    }
}
