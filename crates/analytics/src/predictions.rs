//! Local prediction text generation.
//!
//! Composes template predictions from the current batch — no upstream
//! model involved, so this path works with or without an API key.

use common::{CityReading, Error, HealthLevel, Result};

use crate::aggregator;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PredictionKind {
    Health,
    Traffic,
    Energy,
    Environmental,
}

impl PredictionKind {
    /// Parse the wire value. Unknown values are a caller error (HTTP 400).
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "health" => Some(Self::Health),
            "traffic" => Some(Self::Traffic),
            "energy" => Some(Self::Energy),
            "environmental" => Some(Self::Environmental),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Health => "health",
            Self::Traffic => "traffic",
            Self::Energy => "energy",
            Self::Environmental => "environmental",
        }
    }

    fn confidence(&self) -> u8 {
        match self {
            Self::Health => 78,
            Self::Traffic => 72,
            Self::Energy => 70,
            Self::Environmental => 75,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Prediction {
    pub kind: PredictionKind,
    pub text: String,
    pub confidence: u8,
    pub timeframe: String,
}

/// Generate a prediction from the current batch.
///
/// `city` narrows the focus when it matches a reading (case-insensitive
/// substring); otherwise the batch-wide view is used. An empty batch is
/// a `NoData` error (HTTP 404 at the edge).
pub fn prediction_for(
    kind: PredictionKind,
    readings: &[CityReading],
    city: Option<&str>,
    timeframe: Option<&str>,
) -> Result<Prediction> {
    if readings.is_empty() {
        return Err(Error::NoData("no readings available".into()));
    }

    let summary = aggregator::summarize(readings)?;
    let timeframe = timeframe.unwrap_or("24h").to_string();

    let focus = city.and_then(|name| {
        let needle = name.trim().to_lowercase();
        if needle.is_empty() {
            return None;
        }
        readings.iter().find(|r| {
            let candidate = r.city.to_lowercase();
            candidate.contains(&needle) || needle.contains(&candidate)
        })
    });

    let text = match kind {
        PredictionKind::Health => match focus {
            Some(r) => format!(
                "{}: AQI {} ({}) — expect {} conditions over the next {}; {}",
                r.city,
                r.aqi,
                r.health_level,
                if r.aqi > 150 { "degraded" } else { "stable" },
                timeframe,
                health_advice(r.health_level),
            ),
            None => format!(
                "Average AQI across {} cities is {}; {} exceed the alert level. \
                 Worst air in {} — {}",
                summary.total_cities,
                summary.average_aqi,
                summary.cities_with_alerts,
                summary.worst_city,
                health_advice(HealthLevel::from_aqi(summary.average_aqi)),
            ),
        },
        PredictionKind::Traffic => format!(
            "Rush-hour emissions will lift particulate levels 20-50% in dense \
             corridors over the next {}; {} is most exposed at current AQI levels",
            timeframe, summary.worst_city,
        ),
        PredictionKind::Energy => format!(
            "Air-handling and filtration load will track AQI (batch average {}); \
             expect elevated HVAC demand in {} of {} cities over the next {}",
            summary.average_aqi, summary.cities_with_alerts, summary.total_cities, timeframe,
        ),
        PredictionKind::Environmental => format!(
            "Across {} countries, cleanest air currently in {} and heaviest in {}; \
             off-peak dispersion should ease levels 10-20% outside rush windows \
             within {}",
            summary.country_diversity, summary.best_city, summary.worst_city, timeframe,
        ),
    };

    Ok(Prediction {
        kind,
        text,
        confidence: kind.confidence(),
        timeframe,
    })
}

fn health_advice(level: HealthLevel) -> &'static str {
    match level {
        HealthLevel::Good | HealthLevel::Moderate => "normal outdoor activity is fine",
        HealthLevel::UnhealthySensitive => "sensitive groups should reduce prolonged exertion",
        HealthLevel::Unhealthy => "everyone should limit prolonged outdoor exertion",
        HealthLevel::VeryUnhealthy => "avoid outdoor exertion; consider masks outdoors",
        HealthLevel::Hazardous => "remain indoors with filtration where possible",
    }
}
