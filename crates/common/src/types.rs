//! Domain types shared across the service.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ── Health Bands ──────────────────────────────────────────────────────

/// The six fixed AQI health bands. Purely a function of AQI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum HealthLevel {
    #[serde(rename = "Good")]
    Good,
    #[serde(rename = "Moderate")]
    Moderate,
    #[serde(rename = "Unhealthy for Sensitive Groups")]
    UnhealthySensitive,
    #[serde(rename = "Unhealthy")]
    Unhealthy,
    #[serde(rename = "Very Unhealthy")]
    VeryUnhealthy,
    #[serde(rename = "Hazardous")]
    Hazardous,
}

impl HealthLevel {
    /// Classify an AQI value into its health band.
    pub fn from_aqi(aqi: i64) -> Self {
        match aqi {
            i64::MIN..=50 => Self::Good,
            51..=100 => Self::Moderate,
            101..=150 => Self::UnhealthySensitive,
            151..=200 => Self::Unhealthy,
            201..=300 => Self::VeryUnhealthy,
            _ => Self::Hazardous,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Good => "Good",
            Self::Moderate => "Moderate",
            Self::UnhealthySensitive => "Unhealthy for Sensitive Groups",
            Self::Unhealthy => "Unhealthy",
            Self::VeryUnhealthy => "Very Unhealthy",
            Self::Hazardous => "Hazardous",
        }
    }
}

impl std::fmt::Display for HealthLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Readings ──────────────────────────────────────────────────────────

/// AQI values are always clamped to this range.
pub const AQI_MIN: i64 = 10;
pub const AQI_MAX: i64 = 500;

/// One snapshot of pollutant and weather data for a city.
///
/// Created fresh on each generation or cache hit; never mutated in place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CityReading {
    pub city: String,
    pub country: String,
    /// Clamped to [AQI_MIN, AQI_MAX].
    pub aqi: i64,
    pub pm25: f64,
    pub pm10: f64,
    pub no2: f64,
    pub so2: f64,
    pub o3: f64,
    pub co: f64,
    pub lat: f64,
    pub lon: f64,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub humidity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pressure: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wind_speed: Option<f64>,
    pub dominant_pollutant: String,
    pub health_level: HealthLevel,
    /// Where this reading came from, e.g. "SYNTHETIC", "MEMORY_CACHE", "DB_CACHE".
    pub source: String,
}

// ── Anomaly Insights ──────────────────────────────────────────────────

/// Ordered severity scale: LOW < MEDIUM < HIGH < CRITICAL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InsightKind {
    PollutionSpike,
    UnusualPattern,
    HealthAlert,
}

/// A derived, ephemeral anomaly record. Lives only in the in-memory
/// ring buffer; never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnomalyInsight {
    pub kind: InsightKind,
    pub city: String,
    pub severity: Severity,
    /// 0-100.
    pub confidence: u8,
    pub prediction: String,
    pub detected_at: DateTime<Utc>,
}

// ── Dashboard Summary ─────────────────────────────────────────────────

/// Summary counters for the dashboard, reduced from one batch of readings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardSummary {
    /// Integer-rounded mean AQI over the batch.
    pub average_aqi: i64,
    /// Count of cities with AQI > 100.
    pub cities_with_alerts: usize,
    /// City with the lowest AQI in the batch.
    pub best_city: String,
    /// City with the highest AQI in the batch.
    pub worst_city: String,
    /// Number of distinct country values.
    pub country_diversity: usize,
    pub total_cities: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_bands_cover_range() {
        for aqi in AQI_MIN..=AQI_MAX {
            // Must classify without panicking.
            let _ = HealthLevel::from_aqi(aqi);
        }
        assert_eq!(HealthLevel::from_aqi(10), HealthLevel::Good);
        assert_eq!(HealthLevel::from_aqi(50), HealthLevel::Good);
        assert_eq!(HealthLevel::from_aqi(51), HealthLevel::Moderate);
        assert_eq!(HealthLevel::from_aqi(100), HealthLevel::Moderate);
        assert_eq!(HealthLevel::from_aqi(150), HealthLevel::UnhealthySensitive);
        assert_eq!(HealthLevel::from_aqi(200), HealthLevel::Unhealthy);
        assert_eq!(HealthLevel::from_aqi(300), HealthLevel::VeryUnhealthy);
        assert_eq!(HealthLevel::from_aqi(301), HealthLevel::Hazardous);
        assert_eq!(HealthLevel::from_aqi(500), HealthLevel::Hazardous);
    }

    #[test]
    fn test_health_bands_monotone() {
        let mut prev = HealthLevel::from_aqi(AQI_MIN);
        for aqi in AQI_MIN..=AQI_MAX {
            let band = HealthLevel::from_aqi(aqi);
            assert!(band >= prev, "band regressed at aqi={}", aqi);
            prev = band;
        }
        assert_ne!(HealthLevel::from_aqi(200), HealthLevel::Good);
    }

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Low < Severity::Medium);
        assert!(Severity::Medium < Severity::High);
        assert!(Severity::High < Severity::Critical);
    }

    #[test]
    fn test_insight_kind_serializes_screaming() {
        let json = serde_json::to_string(&InsightKind::PollutionSpike).unwrap();
        assert_eq!(json, "\"POLLUTION_SPIKE\"");
        let json = serde_json::to_string(&InsightKind::HealthAlert).unwrap();
        assert_eq!(json, "\"HEALTH_ALERT\"");
    }
}
