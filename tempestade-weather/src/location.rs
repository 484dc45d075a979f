//! IP geolocation.

use crate::config::WeatherConfig;
use crate::error::{WeatherError, WeatherResult};
use crate::types::LocationInfo;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

const SERVICE: &str = "location";

#[derive(Deserialize)]
struct IpApiResponse {
    city: Option<String>,
    region: Option<String>,
    country_name: Option<String>,
    latitude: Option<f64>,
    longitude: Option<f64>,
}

/// Client for an ipapi.co-compatible geolocation endpoint.
pub struct LocationClient {
    client: Client,
    url: String,
}

impl LocationClient {
    pub fn new(config: &WeatherConfig) -> WeatherResult<Self> {
        Ok(Self {
            client: crate::http_client(config)?,
            url: config.location_url.clone(),
        })
    }

    /// Resolves the caller's approximate location.
    pub async fn locate(&self) -> WeatherResult<LocationInfo> {
        debug!("resolving location via {}", self.url);
        let resp = self.client.get(&self.url).send().await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(WeatherError::Api {
                service: SERVICE,
                status: status.as_u16(),
                body: crate::truncate_body(&body),
            });
        }

        let data: IpApiResponse = resp
            .json()
            .await
            .map_err(|e| WeatherError::invalid(SERVICE, e.to_string()))?;

        let (Some(latitude), Some(longitude)) = (data.latitude, data.longitude) else {
            return Err(WeatherError::invalid(SERVICE, "missing latitude/longitude"));
        };

        Ok(LocationInfo {
            city: data.city,
            region: data.region,
            country: data.country_name,
            latitude,
            longitude,
        })
    }
}
