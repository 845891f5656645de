//! Scripted weather source for testing.
//!
//! [`MockWeatherSource`] implements [`WeatherSource`] from an in-memory
//! script of stations and readings, so the engine can be exercised without
//! network access.
//!
//! Like the real endpoint, a request is answered with the readings of the
//! latest scripted slot at or before the requested time, and every response
//! lists all scripted stations.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;
use time::Date;
use tokio::sync::RwLock;

use sgtemp_types::{Reading, ReadingTimestamp, Station};

use crate::api::FetchResponse;
use crate::error::FetchError;
use crate::traits::WeatherSource;

/// A scripted weather source.
///
/// # Example
///
/// ```
/// use sgtemp_core::{MockWeatherSource, WeatherSource};
/// use sgtemp_types::Station;
/// use time::macros::date;
///
/// #[tokio::main]
/// async fn main() {
///     let source = MockWeatherSource::new()
///         .with_station(Station::from_coordinates("S50", "Clementi Road", 1.3337, 103.7768))
///         .with_full_day(date!(2021 - 03 - 01), "S50", 25.0);
///
///     let response = source.fetch(date!(2021 - 03 - 01), 13, 0).await.unwrap();
///     assert_eq!(response.readings.len(), 1);
///     assert_eq!(source.call_count(), 1);
/// }
/// ```
#[derive(Debug, Default)]
pub struct MockWeatherSource {
    stations: Vec<Station>,
    slots: BTreeMap<ReadingTimestamp, Vec<Reading>>,
    failures: HashMap<ReadingTimestamp, FetchError>,
    calls: AtomicU32,
    requests: RwLock<Vec<ReadingTimestamp>>,
}

impl MockWeatherSource {
    /// Create an empty source that answers every request with no data.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a station to the response metadata.
    pub fn with_station(mut self, station: Station) -> Self {
        self.stations.push(station);
        self
    }

    /// Script a single reading.
    pub fn with_reading(mut self, station_id: &str, timestamp: ReadingTimestamp, value: f64) -> Self {
        self.slots.entry(timestamp).or_default().push(Reading {
            station_id: station_id.to_string(),
            timestamp,
            value,
        });
        self
    }

    /// Script 24 top-of-the-hour readings for a station, `base + hour / 10`.
    pub fn with_full_day(mut self, date: Date, station_id: &str, base: f64) -> Self {
        for hour in 0..24u8 {
            if let Ok(timestamp) = ReadingTimestamp::on_the_hour(date, hour) {
                self = self.with_reading(station_id, timestamp, base + f64::from(hour) / 10.0);
            }
        }
        self
    }

    /// Make requests for an exact slot fail with `error`.
    pub fn with_failure(mut self, timestamp: ReadingTimestamp, error: FetchError) -> Self {
        self.failures.insert(timestamp, error);
        self
    }

    /// Make the listed hours of `date` fail as unreachable.
    pub fn with_failing_hours(mut self, date: Date, hours: &[u8]) -> Self {
        for &hour in hours {
            if let Ok(timestamp) = ReadingTimestamp::on_the_hour(date, hour) {
                self.failures.insert(
                    timestamp,
                    FetchError::Transport {
                        url: "mock://air-temperature".to_string(),
                        message: "simulated outage".to_string(),
                    },
                );
            }
        }
        self
    }

    /// Number of fetches made so far.
    pub fn call_count(&self) -> u32 {
        self.calls.load(Ordering::Relaxed)
    }

    /// Every requested slot, in request order.
    pub async fn requests(&self) -> Vec<ReadingTimestamp> {
        self.requests.read().await.clone()
    }

    /// Reset the call counter and request log.
    pub async fn reset_calls(&self) {
        self.calls.store(0, Ordering::Relaxed);
        self.requests.write().await.clear();
    }
}

#[async_trait]
impl WeatherSource for MockWeatherSource {
    async fn fetch(
        &self,
        date: Date,
        hour: u8,
        minute: u8,
    ) -> Result<FetchResponse, FetchError> {
        self.calls.fetch_add(1, Ordering::Relaxed);

        let requested = ReadingTimestamp::new(date, hour, minute)
            .map_err(|e| FetchError::Decode(e.to_string()))?;
        self.requests.write().await.push(requested);

        if let Some(error) = self.failures.get(&requested) {
            return Err(error.clone());
        }

        let (timestamp, readings) = self
            .slots
            .range(..=requested)
            .next_back()
            .ok_or_else(|| FetchError::NoData(requested.to_string()))?;

        Ok(FetchResponse {
            timestamp: *timestamp,
            stations: self.stations.clone(),
            readings: readings.clone(),
        })
    }
}
