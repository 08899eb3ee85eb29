//! Statistical anomaly detection over a batch of readings.
//!
//! Two independent rules per pass, applied in input order:
//!
//! * z-score rule: flag readings whose AQI deviates more than 2σ from
//!   the batch mean (population standard deviation; a zero-σ batch
//!   flags nothing by this path);
//! * health-alert rule: any AQI above 150 always raises a HEALTH_ALERT.
//!
//! The rules are not mutually exclusive — one city can emit two
//! insights in a single pass. No state is carried between batches
//! other than the bounded ring buffer.

use chrono::Utc;
use common::{AnomalyInsight, CityReading, InsightKind, Severity};
use std::collections::VecDeque;
use tracing::debug;

/// Fixed z-score threshold for the outlier rule.
pub const Z_THRESHOLD: f64 = 2.0;

/// AQI above which the health-alert rule always fires.
pub const HEALTH_ALERT_AQI: i64 = 150;

/// Ring buffer capacity for retained insights.
pub const INSIGHT_CAPACITY: usize = 50;

/// Run one detection pass over a batch. Output order follows input order.
pub fn detect(readings: &[CityReading]) -> Vec<AnomalyInsight> {
    if readings.is_empty() {
        return Vec::new();
    }

    let n = readings.len() as f64;
    let mean = readings.iter().map(|r| r.aqi as f64).sum::<f64>() / n;
    let variance = readings
        .iter()
        .map(|r| (r.aqi as f64 - mean).powi(2))
        .sum::<f64>()
        / n;
    let std_dev = variance.sqrt();

    let now = Utc::now();
    let mut insights = Vec::new();

    for reading in readings {
        let aqi = reading.aqi;

        if std_dev > 0.0 {
            let z = (aqi as f64 - mean).abs() / std_dev;
            if z > Z_THRESHOLD {
                let kind = if (aqi as f64) > mean {
                    InsightKind::PollutionSpike
                } else {
                    InsightKind::UnusualPattern
                };
                let severity = if z > 3.0 {
                    Severity::Critical
                } else if z > 2.5 {
                    Severity::High
                } else {
                    Severity::Medium
                };
                let confidence = (z * 30.0).round().min(95.0) as u8;

                debug!("{}: z={:.2} over batch mean {:.0}", reading.city, z, mean);
                insights.push(AnomalyInsight {
                    kind,
                    city: reading.city.clone(),
                    severity,
                    confidence,
                    prediction: format!(
                        "AQI {} deviates {:.1}σ from the batch mean of {:.0}",
                        aqi, z, mean
                    ),
                    detected_at: now,
                });
            }
        }

        if aqi > HEALTH_ALERT_AQI {
            let severity = if aqi > 300 {
                Severity::Critical
            } else if aqi > 200 {
                Severity::High
            } else {
                Severity::Medium
            };

            insights.push(AnomalyInsight {
                kind: InsightKind::HealthAlert,
                city: reading.city.clone(),
                severity,
                confidence: 95,
                prediction: format!(
                    "AQI {} is {} — sensitive groups should limit outdoor exposure",
                    aqi,
                    reading.health_level.as_str()
                ),
                detected_at: now,
            });
        }
    }

    insights
}

/// Bounded ring buffer of recent insights; oldest evicted past capacity.
#[derive(Debug)]
pub struct InsightBuffer {
    entries: VecDeque<AnomalyInsight>,
    capacity: usize,
}

impl InsightBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, insight: AnomalyInsight) {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(insight);
    }

    pub fn extend(&mut self, insights: impl IntoIterator<Item = AnomalyInsight>) {
        for insight in insights {
            self.push(insight);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Oldest-first copy of the retained insights.
    pub fn snapshot(&self) -> Vec<AnomalyInsight> {
        self.entries.iter().cloned().collect()
    }
}

impl Default for InsightBuffer {
    fn default() -> Self {
        Self::new(INSIGHT_CAPACITY)
    }
}
