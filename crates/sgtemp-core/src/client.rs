//! HTTP client for the data.gov.sg air-temperature endpoint.
//!
//! # Example
//!
//! ```no_run
//! use sgtemp_core::{WeatherClient, WeatherSource};
//! use time::macros::date;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = WeatherClient::new(sgtemp_core::client::DEFAULT_BASE_URL)?;
//! let response = client.fetch(date!(2021 - 03 - 01), 14, 0).await?;
//! println!("{} readings at {}", response.readings.len(), response.timestamp);
//! # Ok(())
//! # }
//! ```

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use time::Date;
use tracing::debug;

use sgtemp_types::format_date;

use crate::api::FetchResponse;
use crate::error::FetchError;
use crate::traits::WeatherSource;

/// Public API base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.data.gov.sg/v1";

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

const ENDPOINT: &str = "environment/air-temperature";

/// `reqwest`-backed [`WeatherSource`].
#[derive(Debug, Clone)]
pub struct WeatherClient {
    client: Client,
    base_url: String,
}

impl WeatherClient {
    /// Create a client with the default timeout.
    ///
    /// # Arguments
    ///
    /// * `base_url` - API root, e.g. `https://api.data.gov.sg/v1`
    pub fn new(base_url: &str) -> Result<Self, FetchError> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    /// Create a client with a custom request timeout.
    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::Transport {
                url: base_url.to_string(),
                message: e.to_string(),
            })?;

        Self::with_client(base_url, client)
    }

    /// Create a client with a custom reqwest Client.
    pub fn with_client(base_url: &str, client: Client) -> Result<Self, FetchError> {
        let base_url = base_url.trim_end_matches('/').to_string();

        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(FetchError::InvalidUrl(format!(
                "URL must start with http:// or https://, got: {}",
                base_url
            )));
        }

        Ok(Self { client, base_url })
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Full request URL for a slot.
    pub fn request_url(&self, date: Date, hour: u8, minute: u8) -> Result<Url, FetchError> {
        let day = format_date(date);
        let date_time = format!("{}T{:02}:{:02}:00", day, hour, minute);

        Url::parse_with_params(
            &format!("{}/{}", self.base_url, ENDPOINT),
            &[("date_time", date_time.as_str()), ("date", day.as_str())],
        )
        .map_err(|e| FetchError::InvalidUrl(e.to_string()))
    }
}

#[async_trait]
impl WeatherSource for WeatherClient {
    async fn fetch(
        &self,
        date: Date,
        hour: u8,
        minute: u8,
    ) -> Result<FetchResponse, FetchError> {
        let url = self.request_url(date, hour, minute)?;
        debug!("GET {}", url);

        let transport = |e: reqwest::Error| FetchError::Transport {
            url: url.to_string(),
            message: e.to_string(),
        };

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await.map_err(transport)?;
        debug!("Received {} bytes", body.len());

        let requested = format!("{} {:02}:{:02}", format_date(date), hour, minute);
        FetchResponse::from_body(&body, &requested)
    }
}
