//! Synthetic air-quality reading provider.
//!
//! Derives a plausible current reading for a city from its registry
//! baseline, a time-of-day multiplier (rush hour vs. off-peak), and
//! random jitter. Unknown cities fall back to a default baseline —
//! this provider never errors.

pub mod registry;

use chrono::{DateTime, Timelike, Utc};
use common::{CityReading, HealthLevel, AQI_MAX, AQI_MIN};
use rand::Rng;
use tracing::debug;

use registry::CityProfile;

/// Source tag attached to freshly generated readings.
pub const SOURCE_SYNTHETIC: &str = "SYNTHETIC";

/// Stateless reading generator over the static city registry.
#[derive(Debug, Clone, Default)]
pub struct SyntheticFeed;

impl SyntheticFeed {
    pub fn new() -> Self {
        Self
    }

    /// Generate a reading for a city as of now.
    pub fn reading_for(&self, city: &str) -> CityReading {
        self.reading_at(city, Utc::now())
    }

    /// Generate a reading for a city at a given instant.
    ///
    /// Not deterministic: two calls in the same minute may differ.
    pub fn reading_at(&self, city: &str, now: DateTime<Utc>) -> CityReading {
        let (label, profile) = match registry::find(city) {
            Some(p) => (p.name.to_string(), p),
            None => {
                debug!("Unknown city '{}', using default baseline", city);
                (city.trim().to_string(), registry::default_profile())
            }
        };

        let mut rng = rand::thread_rng();

        // Rush-hour windows scale particulates up; off-peak scales both ways.
        let local_hour = local_hour(now, profile.lon);
        let rush = matches!(local_hour, 7..=9 | 17..=19);
        let particle_factor = if rush {
            rng.gen_range(1.2..=1.5)
        } else {
            rng.gen_range(0.8..=1.2)
        };

        let aqi = ((profile.baseline_aqi as f64) * particle_factor).round() as i64;
        let aqi = aqi.clamp(AQI_MIN, AQI_MAX);

        let pm25 = profile.pm25 * particle_factor * rng.gen_range(0.95..=1.05);
        let pm10 = profile.pm10 * particle_factor * rng.gen_range(0.95..=1.05);

        // Gas pollutants swing wider than particulates at any hour.
        let no2 = profile.no2 * rng.gen_range(0.7..=1.7);
        let so2 = profile.so2 * rng.gen_range(0.7..=1.7);
        let o3 = profile.o3 * rng.gen_range(0.7..=1.7);
        let co = profile.co * rng.gen_range(0.7..=1.7);

        let temperature = 28.0 - profile.lat.abs() * 0.35 + rng.gen_range(-5.0..=5.0);

        CityReading {
            city: label,
            country: profile.country.to_string(),
            aqi,
            pm25,
            pm10,
            no2,
            so2,
            o3,
            co,
            lat: profile.lat,
            lon: profile.lon,
            timestamp: now,
            temperature: Some(temperature),
            humidity: Some(rng.gen_range(35.0..=90.0)),
            pressure: Some(rng.gen_range(998.0..=1028.0)),
            wind_speed: Some(rng.gen_range(0.5..=12.0)),
            dominant_pollutant: dominant_pollutant(pm25, pm10, no2, so2, o3, co).to_string(),
            health_level: HealthLevel::from_aqi(aqi),
            source: SOURCE_SYNTHETIC.to_string(),
        }
    }
}

/// Approximate local hour from longitude (15° per hour).
fn local_hour(now: DateTime<Utc>, lon: f64) -> i64 {
    let offset = (lon / 15.0).round() as i64;
    (now.hour() as i64 + offset).rem_euclid(24)
}

/// Pick the dominant pollutant by weight-normalized level. Weights put
/// the pollutants on roughly comparable scales (CO is in mg/m³).
fn dominant_pollutant(pm25: f64, pm10: f64, no2: f64, so2: f64, o3: f64, co: f64) -> &'static str {
    let candidates = [
        ("pm25", pm25 * 2.0),
        ("pm10", pm10),
        ("no2", no2 * 1.5),
        ("so2", so2 * 2.0),
        ("o3", o3),
        ("co", co * 20.0),
    ];

    candidates
        .iter()
        .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
        .map(|(name, _)| *name)
        .unwrap_or("pm25")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_aqi_always_in_bounds() {
        let feed = SyntheticFeed::new();
        for _ in 0..200 {
            for profile in registry::profiles() {
                let reading = feed.reading_for(profile.name);
                assert!(
                    (AQI_MIN..=AQI_MAX).contains(&reading.aqi),
                    "{} produced out-of-range AQI {}",
                    profile.name,
                    reading.aqi
                );
            }
        }
    }

    #[test]
    fn test_health_level_matches_aqi() {
        let feed = SyntheticFeed::new();
        for _ in 0..50 {
            let reading = feed.reading_for("Delhi");
            assert_eq!(reading.health_level, HealthLevel::from_aqi(reading.aqi));
        }
    }

    #[test]
    fn test_unknown_city_falls_back() {
        let feed = SyntheticFeed::new();
        let reading = feed.reading_for("Atlantis");
        assert_eq!(reading.city, "Atlantis");
        assert_eq!(reading.country, "Unknown");
        assert!((AQI_MIN..=AQI_MAX).contains(&reading.aqi));
    }

    #[test]
    fn test_repeated_calls_never_panic() {
        let feed = SyntheticFeed::new();
        let a = feed.reading_for("Tokyo");
        let b = feed.reading_for("Tokyo");
        assert_eq!(a.city, b.city);
        assert!((AQI_MIN..=AQI_MAX).contains(&a.aqi));
        assert!((AQI_MIN..=AQI_MAX).contains(&b.aqi));
    }

    #[test]
    fn test_rush_hour_scales_particulates_up() {
        let feed = SyntheticFeed::new();
        // 08:00 UTC is morning rush in London (lon ≈ 0).
        let rush = Utc.with_ymd_and_hms(2026, 3, 2, 8, 0, 0).unwrap();
        let baseline = registry::find("London").unwrap().baseline_aqi as f64;
        for _ in 0..50 {
            let reading = feed.reading_at("London", rush);
            assert!(
                reading.aqi as f64 >= (baseline * 1.2).round() - 1.0,
                "rush-hour AQI {} below scaled baseline",
                reading.aqi
            );
        }
    }

    #[test]
    fn test_local_hour_wraps() {
        let ts = Utc.with_ymd_and_hms(2026, 3, 2, 23, 0, 0).unwrap();
        // Tokyo is UTC+9ish: 23 + 9 = 32 → 8.
        assert_eq!(local_hour(ts, 139.65), 8);
        assert_eq!(local_hour(ts, 0.0), 23);
        assert_eq!(local_hour(ts, -74.0), 18);
    }
}
