//! Error types for sgtemp-core.
//!
//! [`Error`] covers everything a window request can fail with. Validation
//! failures are terminal for the request and never touch the store.
//! [`FetchError`] describes a single call to the weather source.
//!
//! # Recovery
//!
//! | Error Type | Strategy |
//! |------------|----------|
//! | [`Error::InvalidFormat`], [`Error::InvalidCalendarDate`], [`Error::InvalidYear`], [`Error::InvalidTime`] | Ask for new input |
//! | [`Error::BeforeEarliestAvailable`], [`Error::FutureTimestampRejected`] | Ask for a date inside the available range |
//! | [`Error::EmptyResultSet`] | Nothing to report; widen the window or drop the station filter |
//! | [`Error::PartialBackfillFailure`] | Statistics are still usable; show the failed hours as warnings |
//! | [`Error::InconsistentScan`] | The store changed mid-request; run it again |
//! | [`Error::TransportFailure`] | Check connectivity and retry later |
//! | [`Error::Store`] | Check the database path and permissions |

use serde::{Deserialize, Serialize};
use time::Date;

/// Errors returned by a single request to the weather source.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    /// The source has no readings for the requested time.
    #[error("No data available for {0}")]
    NoData(String),

    /// The request could not be sent or the body could not be read.
    #[error("Request to {url} failed: {message}")]
    Transport { url: String, message: String },

    /// The source answered with a non-success status.
    #[error("API returned status {status} for {url}")]
    Status { url: String, status: u16 },

    /// The body was not the expected JSON document.
    #[error("Malformed API response: {0}")]
    Decode(String),

    /// The configured base URL is unusable.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

/// One hour of a backfill sweep the source could not serve.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HourFailure {
    pub hour: u8,
    pub message: String,
}

/// Errors that can occur in the statistics and backfill engine.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// Input does not have the expected shape.
    #[error("Invalid format '{input}': expected {expected}")]
    InvalidFormat {
        input: String,
        expected: &'static str,
    },

    /// Input has the right shape but names a date that does not exist.
    #[error("Invalid calendar date: {0}")]
    InvalidCalendarDate(String),

    /// Year before 1970.
    #[error("Invalid year {0}: must be 1970 or later")]
    InvalidYear(i32),

    /// Hour or minute out of range.
    #[error("Invalid time {0}: hour must be 00-23 and minute 00-59")]
    InvalidTime(String),

    /// Requested date precedes the first day the source has data for.
    #[error("{requested} is before the earliest available data ({earliest})")]
    BeforeEarliestAvailable { requested: String, earliest: String },

    /// Requested date or time is not strictly before the allowed limit.
    #[error("{requested} is not before {limit}")]
    FutureTimestampRejected { requested: String, limit: String },

    /// No stored readings match the window.
    #[error("No readings match the requested window")]
    EmptyResultSet,

    /// The ordered scan returned a different number of readings than the
    /// count query, so the median positions are unreliable.
    #[error("Expected {expected} reading(s) but the scan returned {scanned}")]
    InconsistentScan { expected: u64, scanned: u64 },

    /// Some hours of a backfill sweep could not be retrieved.
    #[error("Backfill for {date} incomplete: {} hour(s) failed", failures.len())]
    PartialBackfillFailure {
        date: Date,
        failures: Vec<HourFailure>,
    },

    /// A request to the weather source failed.
    #[error("Weather API request failed: {0}")]
    TransportFailure(#[from] FetchError),

    /// The local store failed.
    #[error("Store error: {0}")]
    Store(#[from] sgtemp_store::Error),
}

/// Result type alias using the engine's [`Error`] type.
pub type Result<T> = std::result::Result<T, Error>;
