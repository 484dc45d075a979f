//! Storm-risk threshold heuristic.

use crate::types::{HourlyPoint, RiskLevel, StormRiskSummary};
use chrono::{DateTime, Duration, Utc};

/// Default look-ahead window in hours.
pub const DEFAULT_HOURS_AHEAD: u32 = 6;

/// WMO codes for thunderstorms (plain, with slight hail, with heavy hail).
const THUNDERSTORM_CODES: [u32; 3] = [95, 96, 99];

const HIGH_PRECIPITATION: f64 = 70.0;
const HIGH_GUSTS: f64 = 15.0;
const MODERATE_PRECIPITATION: f64 = 40.0;
const MODERATE_GUSTS: f64 = 10.0;

/// Classifies the hours in `[now, now + hours_ahead]`.
///
/// High: any thunderstorm code, or precipitation ≥ 70 % together with gusts ≥ 15.
/// Moderate: precipitation ≥ 40 % or gusts ≥ 10. Otherwise low.
/// An empty window is low with a "not enough data" reason.
pub fn storm_risk(points: &[HourlyPoint], now: DateTime<Utc>, hours_ahead: u32) -> StormRiskSummary {
    let limit = now + Duration::hours(i64::from(hours_ahead));
    let upcoming: Vec<HourlyPoint> = points
        .iter()
        .filter(|p| p.time >= now && p.time <= limit)
        .cloned()
        .collect();

    if upcoming.is_empty() {
        return StormRiskSummary {
            level: RiskLevel::Low,
            reason: "Not enough data for the coming hours.".to_string(),
            next_hours: Vec::new(),
        };
    }

    let max_precipitation = upcoming
        .iter()
        .filter_map(|p| p.precipitation_probability)
        .fold(0.0_f64, f64::max);
    let max_gusts = upcoming
        .iter()
        .filter_map(|p| p.wind_gusts)
        .fold(0.0_f64, f64::max);
    let thunderstorm = upcoming
        .iter()
        .filter_map(|p| p.weather_code)
        .any(|code| THUNDERSTORM_CODES.contains(&code));

    let (level, reason) = if thunderstorm
        || (max_precipitation >= HIGH_PRECIPITATION && max_gusts >= HIGH_GUSTS)
    {
        (
            RiskLevel::High,
            "High probability of severe storms in the coming hours.",
        )
    } else if max_precipitation >= MODERATE_PRECIPITATION || max_gusts >= MODERATE_GUSTS {
        (
            RiskLevel::Moderate,
            "Moderate chance of heavy rain and wind gusts.",
        )
    } else {
        (RiskLevel::Low, "Stable conditions in the coming hours.")
    };

    StormRiskSummary {
        level,
        reason: reason.to_string(),
        next_hours: upcoming,
    }
}
