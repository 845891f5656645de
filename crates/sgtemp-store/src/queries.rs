//! Typed reading filters and scan orderings.
//!
//! A [`ReadingFilter`] is a conjunction of [`Predicate`]s over the stored
//! reading columns. Column names never come from callers; they are fixed by
//! [`Column`], and every value is bound as a statement parameter.
//!
//! # Example
//!
//! ```
//! use sgtemp_store::{ReadingFilter, ReadingOrder, Store};
//! use time::macros::date;
//!
//! let store = Store::open_in_memory()?;
//!
//! // Every top-of-the-hour reading for one station on one day
//! let filter = ReadingFilter::new()
//!     .date(date!(2021 - 03 - 01))
//!     .hourly()
//!     .station("S50");
//!
//! let readings = store.query_readings(&filter, ReadingOrder::ValueAscending)?;
//! assert!(readings.is_empty());
//! # Ok::<(), sgtemp_store::Error>(())
//! ```

use time::{Date, Month};

use sgtemp_types::ReadingTimestamp;

/// A filterable column of the readings table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    StationId,
    Year,
    Month,
    Day,
    Hour,
    Minute,
}

impl Column {
    /// Qualified SQL column name.
    pub(crate) fn sql(self) -> &'static str {
        match self {
            Column::StationId => "r.station_id",
            Column::Year => "r.yr",
            Column::Month => "r.mo",
            Column::Day => "r.dt",
            Column::Hour => "r.hr",
            Column::Minute => "r.mi",
        }
    }
}

/// A single condition on a column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    /// Column equals the value.
    Eq(Column, String),
    /// Column is one of the values. An empty list matches nothing.
    In(Column, Vec<String>),
}

/// Conjunction of predicates used to select readings.
///
/// An empty filter selects every reading.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ReadingFilter {
    predicates: Vec<Predicate>,
}

impl ReadingFilter {
    /// Create an empty filter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Require `column = value`.
    pub fn eq(mut self, column: Column, value: impl Into<String>) -> Self {
        self.predicates.push(Predicate::Eq(column, value.into()));
        self
    }

    /// Require `column IN (values)`.
    pub fn is_in<I, S>(mut self, column: Column, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.predicates.push(Predicate::In(
            column,
            values.into_iter().map(Into::into).collect(),
        ));
        self
    }

    /// Restrict to one station.
    pub fn station(self, station_id: &str) -> Self {
        self.eq(Column::StationId, station_id)
    }

    /// Restrict to one station when given; leave the filter unchanged otherwise.
    pub fn station_opt(self, station_id: Option<&str>) -> Self {
        match station_id {
            Some(id) => self.station(id),
            None => self,
        }
    }

    /// Restrict to a calendar month.
    pub fn year_month(self, year: i32, month: Month) -> Self {
        self.eq(Column::Year, format!("{:04}", year))
            .eq(Column::Month, format!("{:02}", month as u8))
    }

    /// Restrict to a calendar day.
    pub fn date(self, date: Date) -> Self {
        self.year_month(date.year(), date.month())
            .eq(Column::Day, format!("{:02}", date.day()))
    }

    /// Restrict to the 24 top-of-the-hour slots (hours 00-23, minute 00).
    pub fn hourly(self) -> Self {
        self.is_in(Column::Hour, (0..24).map(|h| format!("{:02}", h)))
            .eq(Column::Minute, "00")
    }

    /// Restrict to one exact timestamp.
    pub fn at(self, timestamp: &ReadingTimestamp) -> Self {
        let parts = timestamp.parts();
        self.eq(Column::Year, parts.year)
            .eq(Column::Month, parts.month)
            .eq(Column::Day, parts.day)
            .eq(Column::Hour, parts.hour)
            .eq(Column::Minute, parts.minute)
    }

    /// The predicates in this filter.
    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    /// Whether the filter selects every reading.
    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    /// Build the WHERE clause and its bound parameters.
    pub(crate) fn build_where(&self) -> (String, Vec<Box<dyn rusqlite::ToSql>>) {
        let mut conditions = Vec::new();
        let mut params: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        for predicate in &self.predicates {
            match predicate {
                Predicate::Eq(column, value) => {
                    conditions.push(format!("{} = ?", column.sql()));
                    params.push(Box::new(value.clone()));
                }
                Predicate::In(_, values) if values.is_empty() => {
                    conditions.push("1 = 0".to_string());
                }
                Predicate::In(column, values) => {
                    let placeholders = vec!["?"; values.len()].join(", ");
                    conditions.push(format!("{} IN ({})", column.sql(), placeholders));
                    for value in values {
                        params.push(Box::new(value.clone()));
                    }
                }
            }
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        (where_clause, params)
    }
}

/// Ordering of a reading scan.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum ReadingOrder {
    /// Value ascending, then station name, then timestamp.
    ///
    /// Required by the statistics pass: extrema ties group together and the
    /// median positions line up with the scan index.
    #[default]
    ValueAscending,
    /// Station name, then timestamp.
    StationThenTime,
}

impl ReadingOrder {
    pub(crate) fn sql(self) -> &'static str {
        match self {
            ReadingOrder::ValueAscending => {
                "r.value, s.station_name, r.yr, r.mo, r.dt, r.hr, r.mi"
            }
            ReadingOrder::StationThenTime => "s.station_name, r.yr, r.mo, r.dt, r.hr, r.mi",
        }
    }
}
