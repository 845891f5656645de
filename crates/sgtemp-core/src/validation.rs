//! Date and time input validation.
//!
//! Every validator trims surrounding whitespace (including line endings) and
//! substitutes the current date or time in the source zone when the input is
//! empty. Calendar checks follow the proleptic Gregorian rules.

use time::macros::{date, offset};
use time::{Date, Month, OffsetDateTime, PrimitiveDateTime, Time, UtcOffset};

use sgtemp_types::format_date;

use crate::error::{Error, Result};

/// First day the source has data for.
pub const EARLIEST_AVAILABLE: Date = date!(2016 - 12 - 14);

/// Zone the source reports readings in.
pub const SOURCE_OFFSET: UtcOffset = offset!(+8);

const MIN_YEAR: i32 = 1970;

/// Source of "now" in the source's reporting zone.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Clock {
    /// Wall-clock time.
    #[default]
    System,
    /// A fixed instant, for tests and reproducible runs.
    Fixed(PrimitiveDateTime),
}

impl Clock {
    /// Current local date and time in the source zone.
    pub fn now(&self) -> PrimitiveDateTime {
        match self {
            Clock::System => {
                let now = OffsetDateTime::now_utc().to_offset(SOURCE_OFFSET);
                PrimitiveDateTime::new(now.date(), now.time())
            }
            Clock::Fixed(at) => *at,
        }
    }

    /// Current date in the source zone.
    pub fn today(&self) -> Date {
        self.now().date()
    }
}

/// Gregorian calendar check.
///
/// Valid when `year` is in 1..=32767, `month` in 1..=12, and `day` between 1
/// and the month's length (February has 29 days in leap years).
pub fn checkdate(month: u32, day: u32, year: i32) -> bool {
    if !(1..=32767).contains(&year) || !(1..=12).contains(&month) || day < 1 {
        return false;
    }

    let leap = (year % 4 == 0 && year % 100 != 0) || year % 400 == 0;
    let days_in_month = match month {
        2 if leap => 29,
        2 => 28,
        4 | 6 | 9 | 11 => 30,
        _ => 31,
    };

    day <= days_in_month
}

/// Split `input` on `-` or `:` into numeric fields of the given widths.
fn numeric_fields(input: &str, sep: char, widths: &[usize]) -> Option<Vec<u32>> {
    let fields: Vec<&str> = input.split(sep).collect();
    if fields.len() != widths.len() {
        return None;
    }

    fields
        .iter()
        .zip(widths)
        .map(|(field, &width)| {
            if field.len() == width && field.bytes().all(|b| b.is_ascii_digit()) {
                field.parse().ok()
            } else {
                None
            }
        })
        .collect()
}

/// Validate a `YYYY-MM-DD` date.
///
/// Empty input yields `today`.
///
/// # Example
///
/// ```
/// use sgtemp_core::validation::validate_date;
/// use time::macros::date;
///
/// let today = date!(2021 - 06 - 01);
/// assert_eq!(validate_date(" 2020-02-29\r\n", today).unwrap(), date!(2020 - 02 - 29));
/// assert_eq!(validate_date("", today).unwrap(), today);
/// assert!(validate_date("2016-12-13", today).is_err());
/// ```
pub fn validate_date(input: &str, today: Date) -> Result<Date> {
    let input = input.trim();
    if input.is_empty() {
        return Ok(today);
    }

    let fields = numeric_fields(input, '-', &[4, 2, 2]).ok_or_else(|| Error::InvalidFormat {
        input: input.to_string(),
        expected: "YYYY-MM-DD",
    })?;
    let (year, month, day) = (fields[0] as i32, fields[1], fields[2]);

    if year < MIN_YEAR {
        return Err(Error::InvalidYear(year));
    }
    if !checkdate(month, day, year) {
        return Err(Error::InvalidCalendarDate(input.to_string()));
    }

    let date = Month::try_from(month as u8)
        .ok()
        .and_then(|m| Date::from_calendar_date(year, m, day as u8).ok())
        .ok_or_else(|| Error::InvalidCalendarDate(input.to_string()))?;

    if date < EARLIEST_AVAILABLE {
        return Err(Error::BeforeEarliestAvailable {
            requested: format_date(date),
            earliest: format_date(EARLIEST_AVAILABLE),
        });
    }

    Ok(date)
}

/// Validate an `HH:MM` time, returning `(hour, minute)`.
///
/// Empty input yields the hour and minute of `now`.
pub fn validate_time(input: &str, now: Time) -> Result<(u8, u8)> {
    let input = input.trim();
    if input.is_empty() {
        return Ok((now.hour(), now.minute()));
    }

    let fields = numeric_fields(input, ':', &[2, 2]).ok_or_else(|| Error::InvalidFormat {
        input: input.to_string(),
        expected: "HH:MM",
    })?;
    let (hour, minute) = (fields[0], fields[1]);

    if hour > 23 || minute > 59 {
        return Err(Error::InvalidTime(input.to_string()));
    }

    Ok((hour as u8, minute as u8))
}

/// Validate a `YYYY-MM` month, returning `(year, month)`.
///
/// Empty input yields the month containing `today`. Months before the one
/// holding [`EARLIEST_AVAILABLE`] are rejected.
pub fn validate_year_month(input: &str, today: Date) -> Result<(i32, Month)> {
    let input = input.trim();
    if input.is_empty() {
        return Ok((today.year(), today.month()));
    }

    let invalid = || Error::InvalidFormat {
        input: input.to_string(),
        expected: "YYYY-MM",
    };

    let fields = numeric_fields(input, '-', &[4, 2]).ok_or_else(invalid)?;
    let year = fields[0] as i32;
    let month = u8::try_from(fields[1])
        .ok()
        .and_then(|m| Month::try_from(m).ok())
        .ok_or_else(invalid)?;

    if year < MIN_YEAR {
        return Err(Error::InvalidYear(year));
    }

    let requested = (year, month as u8);
    let earliest = (EARLIEST_AVAILABLE.year(), EARLIEST_AVAILABLE.month() as u8);
    if requested < earliest {
        return Err(Error::BeforeEarliestAvailable {
            requested: input.to_string(),
            earliest: format_date(EARLIEST_AVAILABLE),
        });
    }

    Ok((year, month))
}

/// Whether `date` at `hour:minute` is strictly earlier than `now`.
pub fn is_before_now(date: Date, hour: u8, minute: u8, now: PrimitiveDateTime) -> bool {
    match Time::from_hms(hour, minute, 0) {
        Ok(time) => PrimitiveDateTime::new(date, time) < now,
        Err(_) => false,
    }
}

/// Whether `date` is strictly earlier than `today`.
pub fn is_at_most_yesterday(date: Date, today: Date) -> bool {
    date < today
}
