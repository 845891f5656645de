//! Statistics and backfill engine for Singapore air-temperature readings.
//!
//! This crate turns raw date/time input into descriptive statistics over
//! locally stored weather-station readings, retrieving missing hours from the
//! data.gov.sg air-temperature API on demand.
//!
//! # Features
//!
//! - **Validation**: calendar checks, earliest-available and "before now" bounds
//! - **Backfill**: per-day completeness checks with full hourly re-sweeps
//! - **Statistics**: single ordered pass producing min/max with every tie, mean and median
//! - **Windows**: one day, one month, or all stored history, optionally per station
//! - **Testing**: [`MockWeatherSource`] for offline runs
//!
//! # Quick Start
//!
//! ```no_run
//! use sgtemp_core::{WeatherClient, WindowSelector};
//! use sgtemp_store::Store;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = Store::open_default()?;
//!     let client = WeatherClient::new(sgtemp_core::client::DEFAULT_BASE_URL)?;
//!     let selector = WindowSelector::new(&client, &store);
//!
//!     let day = selector.daily_statistics("2021-03-01", None).await?;
//!     println!("mean {:.2}, median {:.2}", day.statistics.mean, day.statistics.median);
//!     for occurrence in &day.statistics.maximum.occurrences {
//!         println!("max {} at {}", day.statistics.maximum.value, occurrence);
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! # Sequencing
//!
//! Requests to the source are awaited one at a time. The store is a single
//! SQLite connection borrowed for the duration of a request.

pub mod api;
pub mod backfill;
#[cfg(feature = "http-client")]
pub mod client;
pub mod error;
pub mod mock;
pub mod statistics;
pub mod traits;
pub mod validation;
pub mod windows;

pub use api::FetchResponse;
pub use backfill::{BackfillReport, BackfillState, Backfiller, IngestSummary, SweepProgress};
#[cfg(feature = "http-client")]
pub use client::WeatherClient;
pub use error::{Error, FetchError, HourFailure, Result};
pub use mock::MockWeatherSource;
pub use statistics::{StatisticsAccumulator, compute_statistics};
pub use traits::WeatherSource;
pub use validation::{Clock, EARLIEST_AVAILABLE};
pub use windows::{PointFetch, Window, WindowSelector, WindowStatistics};

// Re-export sgtemp-types for convenience
pub use sgtemp_types;
