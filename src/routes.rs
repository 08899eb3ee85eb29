//! HTTP surface of the dashboard backend.

use std::sync::Arc;

use analytics::{aggregator, prediction_for, PredictionKind};
use axum::{
    extract::{Query, State},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use common::CityReading;
use deepseek_client::ChatMessage;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::state::AppState;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/air-quality", get(air_quality))
        .route("/api/ai-chat", post(ai_chat))
        .route("/api/ai-insights", get(ai_insights).post(ai_insights))
        .route("/api/ai-predictions", post(ai_predictions))
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({"status": "ok"}))
}

// ── GET /api/air-quality ──────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct AirQualityParams {
    limit: Option<usize>,
}

async fn air_quality(
    State(state): State<Arc<AppState>>,
    Query(params): Query<AirQualityParams>,
) -> Result<Json<Vec<CityReading>>, ApiError> {
    let snapshot = state.snapshot.read().await;
    if snapshot.is_empty() {
        return Err(ApiError::NotFound("no readings available yet".into()));
    }

    let limit = params
        .limit
        .unwrap_or(state.config.server.default_limit)
        .max(1);
    Ok(Json(snapshot.iter().take(limit).cloned().collect()))
}

// ── POST /api/ai-chat ─────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChatRequest {
    #[serde(default)]
    message: String,
    #[serde(default)]
    conversation_history: Vec<ChatMessage>,
}

async fn ai_chat(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<Value>, ApiError> {
    let message = req.message.trim();
    if message.is_empty() {
        return Err(ApiError::BadRequest("message is required".into()));
    }

    let llm = state
        .llm
        .as_ref()
        .ok_or_else(|| ApiError::Upstream("DEEPSEEK_API_KEY is not configured".into()))?;

    let snapshot = state.snapshot.read().await.clone();
    let system_prompt = format!(
        "You are an air-quality assistant for a city dashboard. \
         Answer briefly using the current data below.\n\n{}",
        build_data_context(&snapshot)
    );

    let response = llm
        .chat(&system_prompt, &req.conversation_history, message)
        .await
        .map_err(|e| ApiError::Upstream(e.to_string()))?;

    Ok(Json(json!({
        "success": true,
        "response": response,
        "metadata": {
            "model": state.config.deepseek_model,
            "cities": snapshot.len(),
            "timestamp": Utc::now(),
        }
    })))
}

// ── GET|POST /api/ai-insights ─────────────────────────────────────────

async fn ai_insights(State(state): State<Arc<AppState>>) -> Result<Json<Value>, ApiError> {
    let llm = state
        .llm
        .as_ref()
        .ok_or_else(|| ApiError::Upstream("DEEPSEEK_API_KEY is not configured".into()))?;

    // Serve the loop-refreshed lines when available; otherwise generate
    // on demand so the first request after startup still gets content.
    let mut insights = state.llm_insights.read().await.clone();
    if insights.is_empty() {
        let snapshot = state.snapshot.read().await.clone();
        if snapshot.is_empty() {
            return Err(ApiError::NotFound("no readings available yet".into()));
        }
        insights = llm
            .generate_insights(&build_data_context(&snapshot))
            .await
            .map_err(|e| ApiError::Upstream(e.to_string()))?;
        *state.llm_insights.write().await = insights.clone();
    }

    let anomalies = state.anomalies.lock().await.snapshot();
    Ok(Json(json!({
        "success": true,
        "insights": insights,
        "metadata": {
            "model": state.config.deepseek_model,
            "anomalies": anomalies,
            "anomalyCount": anomalies.len(),
            "timestamp": Utc::now(),
        }
    })))
}

// ── POST /api/ai-predictions ──────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PredictionRequest {
    #[serde(default)]
    prediction_type: String,
    city_name: Option<String>,
    timeframe: Option<String>,
}

async fn ai_predictions(
    State(state): State<Arc<AppState>>,
    Json(req): Json<PredictionRequest>,
) -> Result<Json<Value>, ApiError> {
    let kind = PredictionKind::parse(&req.prediction_type).ok_or_else(|| {
        ApiError::BadRequest(format!(
            "unknown predictionType '{}' (expected health|traffic|energy|environmental)",
            req.prediction_type
        ))
    })?;

    let snapshot = state.snapshot.read().await.clone();
    let prediction = prediction_for(
        kind,
        &snapshot,
        req.city_name.as_deref(),
        req.timeframe.as_deref(),
    )?;

    Ok(Json(json!({
        "success": true,
        "predictions": prediction.text,
        "confidence": prediction.confidence,
        "metadata": {
            "predictionType": kind.as_str(),
            "timeframe": prediction.timeframe,
            "cityName": req.city_name,
            "cities": snapshot.len(),
            "timestamp": Utc::now(),
        }
    })))
}

// ── Helpers ───────────────────────────────────────────────────────────

/// Render the current batch as a compact text context for LLM prompts.
pub fn build_data_context(readings: &[CityReading]) -> String {
    let mut lines = Vec::with_capacity(readings.len() + 1);

    match aggregator::summarize(readings) {
        Ok(summary) => lines.push(format!(
            "Batch: {} cities across {} countries, average AQI {}, {} on alert. \
             Best air: {}. Worst air: {}.",
            summary.total_cities,
            summary.country_diversity,
            summary.average_aqi,
            summary.cities_with_alerts,
            summary.best_city,
            summary.worst_city,
        )),
        Err(_) => lines.push("No readings available.".into()),
    }

    for reading in readings {
        lines.push(format!(
            "{} ({}): AQI {} [{}], dominant {}, PM2.5 {:.0}",
            reading.city,
            reading.country,
            reading.aqi,
            reading.health_level,
            reading.dominant_pollutant,
            reading.pm25,
        ));
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::HealthLevel;

    fn make_reading(city: &str, aqi: i64) -> CityReading {
        CityReading {
            city: city.into(),
            country: "Testland".into(),
            aqi,
            pm25: 10.0,
            pm10: 20.0,
            no2: 15.0,
            so2: 5.0,
            o3: 30.0,
            co: 0.5,
            lat: 0.0,
            lon: 0.0,
            timestamp: Utc::now(),
            temperature: None,
            humidity: None,
            pressure: None,
            wind_speed: None,
            dominant_pollutant: "pm25".into(),
            health_level: HealthLevel::from_aqi(aqi),
            source: "SYNTHETIC".into(),
        }
    }

    #[test]
    fn test_build_data_context_includes_summary_and_cities() {
        let batch = vec![make_reading("Delhi", 190), make_reading("Sydney", 30)];
        let context = build_data_context(&batch);
        assert!(context.contains("average AQI 110"));
        assert!(context.contains("Delhi"));
        assert!(context.contains("Sydney"));
    }

    #[test]
    fn test_build_data_context_empty() {
        assert_eq!(build_data_context(&[]), "No readings available.");
    }

    #[test]
    fn test_chat_request_accepts_camel_case() {
        let req: ChatRequest = serde_json::from_str(
            r#"{"message": "hi", "conversationHistory": [{"role": "user", "content": "x"}]}"#,
        )
        .unwrap();
        assert_eq!(req.message, "hi");
        assert_eq!(req.conversation_history.len(), 1);
    }

    #[test]
    fn test_prediction_request_defaults() {
        let req: PredictionRequest = serde_json::from_str(r#"{}"#).unwrap();
        assert!(req.prediction_type.is_empty());
        assert!(PredictionKind::parse(&req.prediction_type).is_none());
    }
}
