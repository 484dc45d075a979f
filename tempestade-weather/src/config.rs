//! Endpoint configuration.

use serde::{Deserialize, Serialize};

/// Endpoints and timeouts for the weather collaborators.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherConfig {
    /// IP geolocation endpoint.
    pub location_url: String,

    /// Hourly forecast endpoint.
    pub forecast_url: String,

    /// Chat-completion endpoint used for advice.
    pub advice_url: String,

    /// Model requested from the advice endpoint.
    pub advice_model: String,

    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            location_url: "https://ipapi.co/json".to_string(),
            forecast_url: "https://api.open-meteo.com/v1/forecast".to_string(),
            advice_url: "https://openrouter.ai/api/v1/chat/completions".to_string(),
            advice_model: "openai/gpt-4o-mini".to_string(),
            request_timeout_secs: 30,
        }
    }
}

impl WeatherConfig {
    /// Points every endpoint at `base_url` (a mock server in tests).
    pub fn with_base_url(base_url: &str) -> Self {
        let base = base_url.trim_end_matches('/');
        Self {
            location_url: format!("{base}/json"),
            forecast_url: format!("{base}/v1/forecast"),
            advice_url: format!("{base}/api/v1/chat/completions"),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = WeatherConfig::default();
        assert_eq!(config.location_url, "https://ipapi.co/json");
        assert_eq!(config.forecast_url, "https://api.open-meteo.com/v1/forecast");
        assert_eq!(config.advice_model, "openai/gpt-4o-mini");
        assert_eq!(config.request_timeout_secs, 30);
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config: WeatherConfig =
            serde_json::from_str(r#"{"request_timeout_secs": 5}"#).unwrap();
        assert_eq!(config.request_timeout_secs, 5);
        assert_eq!(config.location_url, WeatherConfig::default().location_url);
    }

    #[test]
    fn base_url_override() {
        let config = WeatherConfig::with_base_url("http://127.0.0.1:9000/");
        assert_eq!(config.location_url, "http://127.0.0.1:9000/json");
        assert_eq!(config.advice_url, "http://127.0.0.1:9000/api/v1/chat/completions");
    }
}
