use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use lunchpick_api::{
    api::{create_router, AppState},
    config::Config,
    db,
    recommend::{InMemoryHistory, Taxonomy},
    services::{
        GeminiClient, GeminiProvider, LunchService, OcrService, RecommendationProvider,
        RuleBasedProvider, WeatherService,
    },
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;

    let redis_client = db::create_redis_client(&config.redis_url)?;
    let cache = db::Cache::new(redis_client);

    let weather = WeatherService::new(cache, config.weather_api_url.clone());

    let (ocr, primary): (Option<OcrService>, Option<Arc<dyn RecommendationProvider>>) =
        match &config.gemini_api_key {
            Some(key) => {
                tracing::info!(model = %config.gemini_model, "Gemini provider enabled");
                let client = GeminiClient::new(
                    key.clone(),
                    config.gemini_api_url.clone(),
                    config.gemini_model.clone(),
                );
                (
                    Some(OcrService::new(client.clone())),
                    Some(Arc::new(GeminiProvider::new(client))),
                )
            }
            None => {
                tracing::warn!("GEMINI_API_KEY not set; using rule-based recommendations only");
                (None, None)
            }
        };

    let lunch = LunchService::new(
        weather,
        ocr,
        primary,
        Arc::new(RuleBasedProvider::new()),
        Taxonomy::korean_v1(),
        Arc::new(InMemoryHistory::new()),
    );

    let app = create_router(AppState::new(lunch), &config.allowed_origins);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(addr = %addr, "lunchpick API listening");
    axum::serve(listener, app).await?;

    Ok(())
}
