use axum::{
    http::HeaderValue,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers;
use super::AppState;

/// Creates the main API router with all routes
pub fn create_router(state: AppState, allowed_origins: &[String]) -> Router {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health_check))
        // Weather
        .route("/api/weather", get(handlers::get_weather))
        // Cafeteria-menu recommendations
        .route(
            "/api/recommend-from-cafeteria",
            post(handlers::recommend_from_cafeteria),
        )
        // Daily picks
        .route(
            "/api/daily-recommendations",
            get(handlers::daily_recommendations),
        )
        .route(
            "/api/daily-recommendations-refresh",
            post(handlers::refresh_daily_recommendations),
        )
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}
