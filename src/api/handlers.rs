use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::AppResult;
use crate::models::Weather;
use crate::services::lunch::{CafeteriaMenuRequest, CafeteriaRecommendation, DailyRecommendations};

use super::AppState;

// Request/Response types

/// Standard `{success, data}` envelope the frontend expects.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
}

impl<T> ApiResponse<T> {
    fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct LocationParams {
    #[serde(default = "default_location")]
    pub location: String,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

fn default_location() -> String {
    "서울".to_string()
}

// Handlers

/// API index
pub async fn root() -> Json<Value> {
    Json(json!({
        "message": "AI 점심 메뉴 추천 API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "weather": "/api/weather?location={location}",
            "recommend-from-cafeteria": "/api/recommend-from-cafeteria (POST)",
            "daily-recommendations": "/api/daily-recommendations (GET)",
            "daily-recommendations-refresh": "/api/daily-recommendations-refresh (POST)"
        }
    }))
}

/// Health check endpoint
pub async fn health_check() -> Json<Value> {
    Json(json!({ "status": "healthy" }))
}

/// Current weather for a named location or explicit coordinates
pub async fn get_weather(
    State(state): State<AppState>,
    Query(params): Query<LocationParams>,
) -> Json<ApiResponse<Weather>> {
    let weather = state
        .lunch
        .current_weather(&params.location, params.lat, params.lng)
        .await;

    Json(ApiResponse::ok(weather))
}

/// Cafeteria-menu recommendation (typed text or meal-plan photo)
pub async fn recommend_from_cafeteria(
    State(state): State<AppState>,
    Json(request): Json<CafeteriaMenuRequest>,
) -> AppResult<Json<ApiResponse<CafeteriaRecommendation>>> {
    let data = state.lunch.recommend_from_cafeteria(request).await?;
    Ok(Json(ApiResponse::ok(data)))
}

/// Today's standalone menu picks
pub async fn daily_recommendations(
    State(state): State<AppState>,
    Query(params): Query<LocationParams>,
) -> AppResult<Json<ApiResponse<DailyRecommendations>>> {
    let data = state
        .lunch
        .daily_recommendations(&params.location, params.lat, params.lng)
        .await?;

    Ok(Json(ApiResponse::ok(data)))
}

/// Daily picks steered away from the cafeteria menu
pub async fn refresh_daily_recommendations(
    State(state): State<AppState>,
    Json(request): Json<CafeteriaMenuRequest>,
) -> AppResult<Json<ApiResponse<DailyRecommendations>>> {
    let data = state.lunch.refresh_daily_recommendations(&request).await?;
    Ok(Json(ApiResponse::ok(data)))
}
