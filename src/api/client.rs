use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::api::raw::{RawSensor, RawSensorData, RawStation};
use crate::error::{IngestError, Result};

const DEFAULT_BASE_URL: &str = "https://api.gios.gov.pl/pjp-api/rest";

/// Client for the public GIOŚ air-quality REST API.
///
/// Reads require no authentication. The client holds no state between calls
/// beyond the reused connection pool; there are no retries — a failed call
/// aborts the run.
pub struct GiosClient {
    http: Client,
    base_url: String,
}

impl GiosClient {
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Point the client at a different host. Tests use this to run against a
    /// local fixture server.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Fetch the full station list.
    pub async fn find_all_stations(&self) -> Result<Vec<RawStation>> {
        let url = format!("{}/station/findAll", self.base_url);
        self.get_json(&url).await
    }

    /// Fetch the sensors installed at one station.
    pub async fn station_sensors(&self, station_id: u32) -> Result<Vec<RawSensor>> {
        let url = format!("{}/station/sensors/{}", self.base_url, station_id);
        self.get_json(&url).await
    }

    /// Fetch the recent reading window for one sensor.
    pub async fn sensor_data(&self, sensor_id: u32) -> Result<RawSensorData> {
        let url = format!("{}/data/getData/{}", self.base_url, sensor_id);
        self.get_json(&url).await
    }

    /// GET a URL and decode the JSON body, keeping network, HTTP-status and
    /// JSON-shape failures distinguishable.
    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|source| IngestError::Fetch {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(IngestError::HttpStatus {
                url: url.to_string(),
                status,
            });
        }

        let body = response
            .text()
            .await
            .map_err(|source| IngestError::Fetch {
                url: url.to_string(),
                source,
            })?;

        debug!(url, status = %status, bytes = body.len(), "fetched");

        serde_json::from_str(&body).map_err(|source| IngestError::Parse {
            url: url.to_string(),
            source,
        })
    }
}

impl Default for GiosClient {
    fn default() -> Self {
        Self::new()
    }
}
