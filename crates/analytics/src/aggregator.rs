//! Dashboard aggregation: reduce one batch of readings to summary counters.

use common::{CityReading, DashboardSummary, Error, Result};
use std::collections::HashSet;

/// Threshold above which a city counts as "on alert".
pub const ALERT_AQI: i64 = 100;

/// Summarize a batch. An empty batch is a signaled condition, never a
/// division by zero.
pub fn summarize(readings: &[CityReading]) -> Result<DashboardSummary> {
    if readings.is_empty() {
        return Err(Error::InsufficientData);
    }

    let total: i64 = readings.iter().map(|r| r.aqi).sum();
    let average_aqi = (total as f64 / readings.len() as f64).round() as i64;

    let cities_with_alerts = readings.iter().filter(|r| r.aqi > ALERT_AQI).count();

    // min/max return the first minimal and last maximal on ties; readings
    // is non-empty here so both unwraps are safe.
    let best_city = readings
        .iter()
        .min_by_key(|r| r.aqi)
        .map(|r| r.city.clone())
        .unwrap_or_default();
    let worst_city = readings
        .iter()
        .max_by_key(|r| r.aqi)
        .map(|r| r.city.clone())
        .unwrap_or_default();

    let countries: HashSet<&str> = readings.iter().map(|r| r.country.as_str()).collect();

    Ok(DashboardSummary {
        average_aqi,
        cities_with_alerts,
        best_city,
        worst_city,
        country_diversity: countries.len(),
        total_cities: readings.len(),
    })
}
