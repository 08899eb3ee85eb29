//! Static per-city baseline profiles.
//!
//! The monitored set is a fixed registry of world cities; baselines are
//! typical annual pollutant levels used as the anchor for synthesis.

/// Baseline pollutant levels for one city.
#[derive(Debug, Clone, Copy)]
pub struct CityProfile {
    pub name: &'static str,
    pub country: &'static str,
    pub lat: f64,
    pub lon: f64,
    pub baseline_aqi: i64,
    pub pm25: f64,
    pub pm10: f64,
    pub no2: f64,
    pub so2: f64,
    pub o3: f64,
    pub co: f64,
}

const PROFILES: &[CityProfile] = &[
    CityProfile { name: "Beijing", country: "China", lat: 39.9042, lon: 116.4074, baseline_aqi: 155, pm25: 65.0, pm10: 95.0, no2: 45.0, so2: 12.0, o3: 55.0, co: 0.9 },
    CityProfile { name: "Delhi", country: "India", lat: 28.6139, lon: 77.2090, baseline_aqi: 185, pm25: 90.0, pm10: 150.0, no2: 55.0, so2: 15.0, o3: 45.0, co: 1.2 },
    CityProfile { name: "Shanghai", country: "China", lat: 31.2304, lon: 121.4737, baseline_aqi: 120, pm25: 50.0, pm10: 75.0, no2: 48.0, so2: 10.0, o3: 60.0, co: 0.8 },
    CityProfile { name: "Mumbai", country: "India", lat: 19.0760, lon: 72.8777, baseline_aqi: 140, pm25: 60.0, pm10: 100.0, no2: 42.0, so2: 12.0, o3: 40.0, co: 1.0 },
    CityProfile { name: "Karachi", country: "Pakistan", lat: 24.8607, lon: 67.0011, baseline_aqi: 160, pm25: 75.0, pm10: 120.0, no2: 40.0, so2: 14.0, o3: 38.0, co: 1.1 },
    CityProfile { name: "Dhaka", country: "Bangladesh", lat: 23.8103, lon: 90.4125, baseline_aqi: 170, pm25: 82.0, pm10: 130.0, no2: 44.0, so2: 13.0, o3: 35.0, co: 1.0 },
    CityProfile { name: "Cairo", country: "Egypt", lat: 30.0444, lon: 31.2357, baseline_aqi: 150, pm25: 68.0, pm10: 110.0, no2: 50.0, so2: 16.0, o3: 48.0, co: 1.0 },
    CityProfile { name: "Mexico City", country: "Mexico", lat: 19.4326, lon: -99.1332, baseline_aqi: 110, pm25: 45.0, pm10: 70.0, no2: 40.0, so2: 9.0, o3: 65.0, co: 0.9 },
    CityProfile { name: "Sao Paulo", country: "Brazil", lat: -23.5505, lon: -46.6333, baseline_aqi: 85, pm25: 32.0, pm10: 48.0, no2: 38.0, so2: 7.0, o3: 42.0, co: 0.7 },
    CityProfile { name: "Jakarta", country: "Indonesia", lat: -6.2088, lon: 106.8456, baseline_aqi: 130, pm25: 55.0, pm10: 85.0, no2: 41.0, so2: 11.0, o3: 44.0, co: 0.9 },
    CityProfile { name: "Bangkok", country: "Thailand", lat: 13.7563, lon: 100.5018, baseline_aqi: 115, pm25: 48.0, pm10: 72.0, no2: 36.0, so2: 8.0, o3: 50.0, co: 0.8 },
    CityProfile { name: "Seoul", country: "South Korea", lat: 37.5665, lon: 126.9780, baseline_aqi: 95, pm25: 38.0, pm10: 58.0, no2: 42.0, so2: 6.0, o3: 52.0, co: 0.6 },
    CityProfile { name: "Tokyo", country: "Japan", lat: 35.6762, lon: 139.6503, baseline_aqi: 70, pm25: 25.0, pm10: 40.0, no2: 35.0, so2: 5.0, o3: 48.0, co: 0.5 },
    CityProfile { name: "Moscow", country: "Russia", lat: 55.7558, lon: 37.6173, baseline_aqi: 65, pm25: 22.0, pm10: 35.0, no2: 38.0, so2: 7.0, o3: 35.0, co: 0.6 },
    CityProfile { name: "London", country: "United Kingdom", lat: 51.5074, lon: -0.1278, baseline_aqi: 55, pm25: 18.0, pm10: 28.0, no2: 40.0, so2: 4.0, o3: 38.0, co: 0.4 },
    CityProfile { name: "Paris", country: "France", lat: 48.8566, lon: 2.3522, baseline_aqi: 60, pm25: 20.0, pm10: 32.0, no2: 42.0, so2: 5.0, o3: 44.0, co: 0.4 },
    CityProfile { name: "Berlin", country: "Germany", lat: 52.5200, lon: 13.4050, baseline_aqi: 50, pm25: 16.0, pm10: 26.0, no2: 32.0, so2: 4.0, o3: 40.0, co: 0.3 },
    CityProfile { name: "New York", country: "United States", lat: 40.7128, lon: -74.0060, baseline_aqi: 55, pm25: 17.0, pm10: 27.0, no2: 38.0, so2: 5.0, o3: 42.0, co: 0.4 },
    CityProfile { name: "Los Angeles", country: "United States", lat: 34.0522, lon: -118.2437, baseline_aqi: 80, pm25: 28.0, pm10: 45.0, no2: 40.0, so2: 4.0, o3: 70.0, co: 0.6 },
    CityProfile { name: "Sydney", country: "Australia", lat: -33.8688, lon: 151.2093, baseline_aqi: 35, pm25: 10.0, pm10: 18.0, no2: 22.0, so2: 3.0, o3: 32.0, co: 0.2 },
];

/// Fallback profile for cities outside the registry.
const DEFAULT_PROFILE: CityProfile = CityProfile {
    name: "Unknown",
    country: "Unknown",
    lat: 0.0,
    lon: 0.0,
    baseline_aqi: 75,
    pm25: 28.0,
    pm10: 45.0,
    no2: 30.0,
    so2: 8.0,
    o3: 40.0,
    co: 0.6,
};

/// All registered city profiles.
pub fn profiles() -> &'static [CityProfile] {
    PROFILES
}

/// Look up a city, case-insensitively, allowing a substring match
/// in either direction ("new york" matches "New York" and vice versa).
pub fn find(name: &str) -> Option<&'static CityProfile> {
    let needle = name.trim().to_lowercase();
    if needle.is_empty() {
        return None;
    }

    PROFILES
        .iter()
        .find(|p| p.name.eq_ignore_ascii_case(needle.as_str()))
        .or_else(|| {
            PROFILES.iter().find(|p| {
                let candidate = p.name.to_lowercase();
                candidate.contains(&needle) || needle.contains(&candidate)
            })
        })
}

/// The fixed default baseline used when a city is unknown.
pub fn default_profile() -> &'static CityProfile {
    &DEFAULT_PROFILE
}
