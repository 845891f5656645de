//! Core types for station readings and derived statistics.

use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use time::{Date, Month};

use crate::error::{ParseError, ParseResult};

/// Number of decimals kept for coordinates and reading values on write.
pub const VALUE_PRECISION: usize = 5;

/// A weather-sensing site reported by the API.
///
/// Coordinates are kept as fixed-precision decimal strings so that a value
/// read back from the store compares equal to the one written.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Station {
    /// Stable external identifier (e.g. `S109`).
    pub id: String,
    /// Display name.
    pub name: String,
    /// Latitude with [`VALUE_PRECISION`] decimals.
    pub latitude: String,
    /// Longitude with [`VALUE_PRECISION`] decimals.
    pub longitude: String,
}

impl Station {
    /// Build a station from floating-point coordinates, fixing their precision.
    ///
    /// ```
    /// use sgtemp_types::Station;
    ///
    /// let station = Station::from_coordinates("S109", "Ang Mo Kio Avenue 5", 1.3764, 103.8492);
    /// assert_eq!(station.latitude, "1.37640");
    /// assert_eq!(station.longitude, "103.84920");
    /// ```
    #[must_use]
    pub fn from_coordinates(id: &str, name: &str, latitude: f64, longitude: f64) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            latitude: format!("{:.*}", VALUE_PRECISION, latitude),
            longitude: format!("{:.*}", VALUE_PRECISION, longitude),
        }
    }
}

/// Minute-resolution timestamp of a reading, in the source's reporting zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(into = "String", try_from = "String")
)]
pub struct ReadingTimestamp {
    /// Calendar date.
    pub date: Date,
    /// Hour of day (0-23).
    pub hour: u8,
    /// Minute of hour (0-59).
    pub minute: u8,
}

/// Zero-padded string components of a [`ReadingTimestamp`].
///
/// These are the values persisted in the store; equality filtering and
/// lexical ordering over them match chronological ordering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimestampParts {
    pub year: String,
    pub month: String,
    pub day: String,
    pub hour: String,
    pub minute: String,
}

impl ReadingTimestamp {
    /// Create a timestamp, checking hour and minute bounds.
    pub fn new(date: Date, hour: u8, minute: u8) -> ParseResult<Self> {
        if hour > 23 || minute > 59 {
            return Err(ParseError::InvalidData(format!(
                "time {:02}:{:02} is out of range",
                hour, minute
            )));
        }
        Ok(Self { date, hour, minute })
    }

    /// Timestamp for the top of the given hour.
    pub fn on_the_hour(date: Date, hour: u8) -> ParseResult<Self> {
        Self::new(date, hour, 0)
    }

    /// Parse an ISO-8601 style timestamp as returned by the API.
    ///
    /// Only the first 16 characters (`YYYY-MM-DDTHH:MM`) are significant;
    /// seconds and the zone designator are ignored because every reading is
    /// reported in the source's own zone.
    ///
    /// ```
    /// use sgtemp_types::ReadingTimestamp;
    ///
    /// let ts = ReadingTimestamp::parse("2020-06-10T10:00:00+08:00").unwrap();
    /// assert_eq!(ts.hour, 10);
    /// assert_eq!(ts.to_string(), "2020-06-10 10:00");
    /// ```
    pub fn parse(input: &str) -> ParseResult<Self> {
        let invalid = |reason: &str| ParseError::InvalidTimestamp {
            input: input.to_string(),
            reason: reason.to_string(),
        };

        let head = input.get(0..16).ok_or_else(|| invalid("too short"))?;
        let bytes = head.as_bytes();
        if bytes[4] != b'-' || bytes[7] != b'-' || bytes[13] != b':' {
            return Err(invalid("expected YYYY-MM-DDTHH:MM"));
        }
        if bytes[10] != b'T' && bytes[10] != b' ' {
            return Err(invalid("expected 'T' or ' ' between date and time"));
        }

        Self::from_parts(
            &head[0..4],
            &head[5..7],
            &head[8..10],
            &head[11..13],
            &head[14..16],
        )
        .map_err(|e| invalid(&e.to_string()))
    }

    /// Rebuild a timestamp from its stored string components.
    pub fn from_parts(
        year: &str,
        month: &str,
        day: &str,
        hour: &str,
        minute: &str,
    ) -> ParseResult<Self> {
        let number = |label: &str, value: &str| -> ParseResult<u32> {
            if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
                return Err(ParseError::InvalidData(format!(
                    "{} '{}' is not numeric",
                    label, value
                )));
            }
            value
                .parse::<u32>()
                .map_err(|e| ParseError::InvalidData(format!("{} '{}': {}", label, value, e)))
        };

        let year = number("year", year)? as i32;
        let month = u8::try_from(number("month", month)?)
            .ok()
            .and_then(|m| Month::try_from(m).ok())
            .ok_or_else(|| ParseError::InvalidData(format!("month '{}' out of range", month)))?;
        let day = u8::try_from(number("day", day)?)
            .map_err(|_| ParseError::InvalidData(format!("day '{}' out of range", day)))?;
        let date = Date::from_calendar_date(year, month, day)
            .map_err(|e| ParseError::InvalidData(e.to_string()))?;

        let hour = u8::try_from(number("hour", hour)?)
            .map_err(|_| ParseError::InvalidData(format!("hour '{}' out of range", hour)))?;
        let minute = u8::try_from(number("minute", minute)?)
            .map_err(|_| ParseError::InvalidData(format!("minute '{}' out of range", minute)))?;

        Self::new(date, hour, minute)
    }

    /// Zero-padded components for storage.
    #[must_use]
    pub fn parts(&self) -> TimestampParts {
        TimestampParts {
            year: format!("{:04}", self.date.year()),
            month: format!("{:02}", self.date.month() as u8),
            day: format!("{:02}", self.date.day()),
            hour: format!("{:02}", self.hour),
            minute: format!("{:02}", self.minute),
        }
    }
}

impl fmt::Display for ReadingTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {:02}:{:02}",
            format_date(self.date),
            self.hour,
            self.minute
        )
    }
}

impl From<ReadingTimestamp> for String {
    fn from(value: ReadingTimestamp) -> Self {
        value.to_string()
    }
}

impl TryFrom<String> for ReadingTimestamp {
    type Error = ParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

/// Format a date as `YYYY-MM-DD`.
#[must_use]
pub fn format_date(date: Date) -> String {
    format!(
        "{:04}-{:02}-{:02}",
        date.year(),
        date.month() as u8,
        date.day()
    )
}

/// A temperature observation for one station at one timestamp.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Reading {
    /// Station identifier.
    pub station_id: String,
    /// When the observation was taken.
    pub timestamp: ReadingTimestamp,
    /// Temperature in degrees Celsius.
    pub value: f64,
}

/// A reading joined with its station name, as produced by ordered scans.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct OrderedReading {
    pub station_id: String,
    pub station_name: String,
    pub timestamp: ReadingTimestamp,
    pub value: f64,
}

/// Where an extreme value was observed.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ExtremumOccurrence {
    pub timestamp: ReadingTimestamp,
    pub station_name: String,
}

impl fmt::Display for ExtremumOccurrence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.timestamp, self.station_name)
    }
}

/// An extreme value together with every place it occurred.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Extremum {
    pub value: f64,
    pub occurrences: Vec<ExtremumOccurrence>,
}

/// Descriptive statistics over a set of readings.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct StatisticsResult {
    /// Number of readings included.
    pub count: u64,
    /// Arithmetic mean.
    pub mean: f64,
    /// Median value.
    pub median: f64,
    /// Smallest value and its occurrences.
    pub minimum: Extremum,
    /// Largest value and its occurrences.
    pub maximum: Extremum,
}
