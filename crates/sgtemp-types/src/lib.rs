//! Platform-agnostic types for Singapore weather-station temperature data.
//!
//! This crate provides the shared vocabulary used by the store
//! (`sgtemp-store`), the statistics engine (`sgtemp-core`) and the console
//! (`sgtemp-cli`).
//!
//! # Features
//!
//! - Station and reading records
//! - Minute-resolution timestamps with zero-padded storage components
//! - Derived statistics (extrema with tied occurrences, mean, median)
//!
//! # Example
//!
//! ```
//! use sgtemp_types::{ReadingTimestamp, Station};
//!
//! let station = Station::from_coordinates("S50", "Clementi Road", 1.3337, 103.7768);
//! let ts = ReadingTimestamp::parse("2021-03-01T14:00:00+08:00").unwrap();
//! assert_eq!(ts.parts().hour, "14");
//! # let _ = station;
//! ```

pub mod error;
pub mod types;

pub use error::{ParseError, ParseResult};
pub use types::{
    Extremum, ExtremumOccurrence, OrderedReading, Reading, ReadingTimestamp, Station,
    StatisticsResult, TimestampParts, VALUE_PRECISION, format_date,
};
