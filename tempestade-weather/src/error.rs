//! Weather client error types.

use thiserror::Error;

/// Result type for weather operations.
pub type WeatherResult<T> = Result<T, WeatherError>;

/// Errors from the upstream weather, location and advice services.
///
/// No variant ever carries request headers, so the advice API key cannot end
/// up in an error message.
#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{service} returned {status}: {body}")]
    Api {
        service: &'static str,
        status: u16,
        body: String,
    },

    #[error("invalid {service} response: {reason}")]
    InvalidResponse {
        service: &'static str,
        reason: String,
    },
}

impl WeatherError {
    pub(crate) fn invalid(service: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidResponse {
            service,
            reason: reason.into(),
        }
    }
}
