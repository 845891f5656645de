//! Air-temperature API payloads.
//!
//! The source answers every request with a JSON document listing all known
//! stations and the readings for the slot nearest to the requested time. Only
//! the first item is meaningful; its timestamp is the slot the source actually
//! served, which may differ from the one requested.

use serde::Deserialize;

use sgtemp_types::{Reading, ReadingTimestamp, Station};

use crate::error::FetchError;

/// Bodies at or below this size carry no readings.
pub const NO_DATA_BODY_LIMIT: usize = 110;

#[derive(Debug, Default, Deserialize)]
struct ApiResponse {
    #[serde(default)]
    metadata: ApiMetadata,
    #[serde(default)]
    items: Vec<ApiItem>,
}

#[derive(Debug, Default, Deserialize)]
struct ApiMetadata {
    #[serde(default)]
    stations: Vec<ApiStation>,
}

#[derive(Debug, Deserialize)]
struct ApiStation {
    device_id: String,
    name: String,
    location: ApiLocation,
}

#[derive(Debug, Deserialize)]
struct ApiLocation {
    latitude: f64,
    longitude: f64,
}

#[derive(Debug, Deserialize)]
struct ApiItem {
    timestamp: String,
    #[serde(default)]
    readings: Vec<ApiReading>,
}

#[derive(Debug, Deserialize)]
struct ApiReading {
    station_id: String,
    value: f64,
}

/// A decoded answer from the weather source.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchResponse {
    /// Slot the readings belong to.
    pub timestamp: ReadingTimestamp,
    /// Every station listed in the response metadata.
    pub stations: Vec<Station>,
    /// Readings at [`FetchResponse::timestamp`].
    pub readings: Vec<Reading>,
}

impl FetchResponse {
    /// Decode a response body.
    ///
    /// `requested` is only used to label a [`FetchError::NoData`].
    pub fn from_body(body: &[u8], requested: &str) -> Result<Self, FetchError> {
        if body.len() <= NO_DATA_BODY_LIMIT {
            return Err(FetchError::NoData(requested.to_string()));
        }

        let response: ApiResponse =
            serde_json::from_slice(body).map_err(|e| FetchError::Decode(e.to_string()))?;

        let item = response
            .items
            .into_iter()
            .next()
            .ok_or_else(|| FetchError::NoData(requested.to_string()))?;

        let timestamp = ReadingTimestamp::parse(&item.timestamp)
            .map_err(|e| FetchError::Decode(e.to_string()))?;

        let stations = response
            .metadata
            .stations
            .into_iter()
            .map(|s| {
                Station::from_coordinates(
                    &s.device_id,
                    &s.name,
                    s.location.latitude,
                    s.location.longitude,
                )
            })
            .collect();

        let readings = item
            .readings
            .into_iter()
            .map(|r| Reading {
                station_id: r.station_id,
                timestamp,
                value: r.value,
            })
            .collect();

        Ok(Self {
            timestamp,
            stations,
            readings,
        })
    }
}
