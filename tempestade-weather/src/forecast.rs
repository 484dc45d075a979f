//! Hourly forecast from an Open-Meteo-compatible endpoint.

use crate::config::WeatherConfig;
use crate::error::{WeatherError, WeatherResult};
use crate::types::HourlyPoint;
use chrono::{NaiveDateTime, TimeZone, Utc};
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

const SERVICE: &str = "forecast";

// "time" must not be requested explicitly; the API always returns it.
const HOURLY_FIELDS: &str = "precipitation,weather_code,wind_gusts_10m";

#[derive(Deserialize)]
struct OpenMeteoResponse {
    hourly: Option<OpenMeteoHourly>,
}

#[derive(Deserialize)]
struct OpenMeteoHourly {
    time: Option<Vec<String>>,
    #[serde(default)]
    precipitation: Vec<Option<f64>>,
    #[serde(default)]
    weather_code: Vec<Option<u32>>,
    #[serde(default)]
    wind_gusts_10m: Vec<Option<f64>>,
}

/// Client for the hourly forecast endpoint.
pub struct ForecastClient {
    client: Client,
    url: String,
}

impl ForecastClient {
    pub fn new(config: &WeatherConfig) -> WeatherResult<Self> {
        Ok(Self {
            client: crate::http_client(config)?,
            url: config.forecast_url.clone(),
        })
    }

    /// Fetches today's hourly series (UTC) for the given coordinates.
    pub async fn hourly(&self, latitude: f64, longitude: f64) -> WeatherResult<Vec<HourlyPoint>> {
        debug!("fetching hourly forecast for {latitude:.2},{longitude:.2}");
        let resp = self
            .client
            .get(&self.url)
            .query(&[
                ("latitude", latitude.to_string()),
                ("longitude", longitude.to_string()),
                ("hourly", HOURLY_FIELDS.to_string()),
                ("forecast_days", "1".to_string()),
                ("timezone", "UTC".to_string()),
            ])
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(WeatherError::Api {
                service: SERVICE,
                status: status.as_u16(),
                body: crate::truncate_body(&body),
            });
        }

        let data: OpenMeteoResponse = resp
            .json()
            .await
            .map_err(|e| WeatherError::invalid(SERVICE, e.to_string()))?;

        parse_hourly(data)
    }
}

fn parse_hourly(data: OpenMeteoResponse) -> WeatherResult<Vec<HourlyPoint>> {
    let Some(hourly) = data.hourly else {
        return Err(WeatherError::invalid(SERVICE, "missing hourly block"));
    };
    let Some(times) = hourly.time else {
        return Err(WeatherError::invalid(SERVICE, "missing hourly time series"));
    };

    times
        .iter()
        .enumerate()
        .map(|(i, raw)| -> WeatherResult<HourlyPoint> {
            let time = parse_time(raw)?;
            let precipitation = hourly.precipitation.get(i).copied().flatten();
            Ok(HourlyPoint {
                time,
                precipitation_probability: precipitation.map(precipitation_to_probability),
                weather_code: hourly.weather_code.get(i).copied().flatten(),
                wind_gusts: hourly.wind_gusts_10m.get(i).copied().flatten(),
            })
        })
        .collect()
}

/// Open-Meteo reports UTC timestamps without an offset ("2025-01-01T13:00").
fn parse_time(raw: &str) -> WeatherResult<chrono::DateTime<Utc>> {
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M")
        .map(|naive| Utc.from_utc_datetime(&naive))
        .map_err(|e| WeatherError::invalid(SERVICE, format!("bad timestamp {raw:?}: {e}")))
}

/// Rough mm → percent mapping: 10 mm or more counts as certain rain.
fn precipitation_to_probability(mm: f64) -> f64 {
    (mm * 10.0).min(100.0)
}
