//! Trait abstractions for the weather source.
//!
//! This module provides the [`WeatherSource`] trait that abstracts over the
//! real HTTP client and the scripted mock used in tests.

use async_trait::async_trait;
use time::Date;

use crate::api::FetchResponse;
use crate::error::FetchError;

/// Something that can answer "what were the readings at this time?".
///
/// # Example
///
/// ```ignore
/// use sgtemp_core::WeatherSource;
/// use time::macros::date;
///
/// async fn noon_readings<S: WeatherSource>(source: &S) {
///     if let Ok(response) = source.fetch(date!(2021 - 03 - 01), 12, 0).await {
///         println!("{} readings at {}", response.readings.len(), response.timestamp);
///     }
/// }
/// ```
#[async_trait]
pub trait WeatherSource: Send + Sync {
    /// Fetch the readings for `date` at `hour:minute` in the source zone.
    async fn fetch(&self, date: Date, hour: u8, minute: u8)
    -> Result<FetchResponse, FetchError>;
}
