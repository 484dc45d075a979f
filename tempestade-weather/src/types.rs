//! Weather data types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Approximate location resolved from the caller's IP address.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LocationInfo {
    pub city: Option<String>,
    pub region: Option<String>,
    pub country: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
}

impl LocationInfo {
    /// "City Region Country" with missing parts skipped, or "unknown".
    pub fn label(&self) -> String {
        let parts: Vec<&str> = [&self.city, &self.region, &self.country]
            .into_iter()
            .filter_map(|p| p.as_deref())
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .collect();
        if parts.is_empty() {
            "unknown".to_string()
        } else {
            parts.join(" ")
        }
    }
}

/// One hour of forecast data.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HourlyPoint {
    pub time: DateTime<Utc>,
    /// Rain likelihood in percent, estimated from precipitation millimetres.
    pub precipitation_probability: Option<f64>,
    /// WMO weather interpretation code.
    pub weather_code: Option<u32>,
    /// Wind gusts at 10 m.
    pub wind_gusts: Option<f64>,
}

/// Coarse storm risk.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Moderate,
    High,
}

impl RiskLevel {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Moderate => "moderate",
            RiskLevel::High => "high",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of the storm-risk heuristic.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StormRiskSummary {
    pub level: RiskLevel,
    pub reason: String,
    /// The forecast hours the level was computed from.
    pub next_hours: Vec<HourlyPoint>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn location(city: Option<&str>, region: Option<&str>, country: Option<&str>) -> LocationInfo {
        LocationInfo {
            city: city.map(String::from),
            region: region.map(String::from),
            country: country.map(String::from),
            latitude: 0.0,
            longitude: 0.0,
        }
    }

    #[test]
    fn label_joins_known_parts() {
        let loc = location(Some("Campinas"), Some("São Paulo"), Some("Brazil"));
        assert_eq!(loc.label(), "Campinas São Paulo Brazil");
    }

    #[test]
    fn label_skips_missing_parts() {
        assert_eq!(location(None, Some("Bahia"), Some("")).label(), "Bahia");
    }

    #[test]
    fn label_unknown_when_empty() {
        assert_eq!(location(None, None, None).label(), "unknown");
    }
}
