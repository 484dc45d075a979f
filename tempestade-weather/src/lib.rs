//! Weather data plumbing for Tempestade.
//!
//! - [`LocationClient`]: approximate location from the caller's IP
//! - [`ForecastClient`]: hourly precipitation, weather code and wind gusts
//! - [`storm_risk`]: threshold heuristic over the next few hours
//! - [`AdviceClient`]: plain-language advice from a chat-completion endpoint
//!
//! None of these clients store credentials. The advice client receives the
//! API key per call and sends it only as a bearer token.

pub mod advice;
pub mod config;
pub mod error;
pub mod forecast;
pub mod location;
pub mod risk;
pub mod types;

pub use advice::{AdviceClient, AdviceRequest};
pub use config::WeatherConfig;
pub use error::{WeatherError, WeatherResult};
pub use forecast::ForecastClient;
pub use location::LocationClient;
pub use risk::{storm_risk, DEFAULT_HOURS_AHEAD};
pub use types::*;

/// Builds the shared HTTP client with the configured timeout.
pub(crate) fn http_client(config: &WeatherConfig) -> WeatherResult<reqwest::Client> {
    let client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(config.request_timeout_secs))
        .user_agent(concat!("tempestade/", env!("CARGO_PKG_VERSION")))
        .build()?;
    Ok(client)
}

/// Shortens an upstream error body for inclusion in an error message.
pub(crate) fn truncate_body(body: &str) -> String {
    const MAX_CHARS: usize = 200;
    body.chars().take(MAX_CHARS).collect()
}
