//! Local persistence for weather-station temperature readings.
//!
//! This crate provides SQLite-based storage for station metadata and
//! temperature readings, so that statistics can be computed without
//! re-fetching data that was already retrieved.
//!
//! # Features
//!
//! - Insert-if-absent writes for stations and readings
//! - Typed reading filters (station, day, month, hourly slots, exact time)
//! - Counts per filter and per station
//! - Ordered, lazily visited scans for single-pass statistics
//!
//! # Example
//!
//! ```no_run
//! use sgtemp_store::{ReadingFilter, ReadingOrder, Store};
//!
//! let store = Store::open_default()?;
//!
//! let filter = ReadingFilter::new().station("S50");
//! let total = store.count_readings(&filter)?;
//! store.scan_readings_ordered(&filter, ReadingOrder::ValueAscending, |reading| {
//!     println!("{} {}", reading.timestamp, reading.value);
//! })?;
//! # let _ = total;
//! # Ok::<(), sgtemp_store::Error>(())
//! ```

mod error;
mod models;
mod queries;
mod schema;
mod store;

pub use error::{Error, Result};
pub use models::StationCount;
pub use queries::{Column, Predicate, ReadingFilter, ReadingOrder};
pub use store::Store;

/// Default database path following platform conventions.
///
/// - Linux: `~/.local/share/sgtemp/readings.db`
/// - macOS: `~/Library/Application Support/sgtemp/readings.db`
/// - Windows: `C:\Users\<user>\AppData\Local\sgtemp\readings.db`
pub fn default_db_path() -> std::path::PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| std::path::PathBuf::from("."))
        .join("sgtemp")
        .join("readings.db")
}
