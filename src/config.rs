use serde::Deserialize;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Redis connection URL (weather cache)
    #[serde(default = "default_redis_url")]
    pub redis_url: String,

    /// Gemini API key; when absent the service falls back to rule-based
    /// recommendations
    #[serde(default)]
    pub gemini_api_key: Option<String>,

    /// Gemini API base URL
    #[serde(default = "default_gemini_api_url")]
    pub gemini_api_url: String,

    /// Gemini model used for recommendations and menu OCR
    #[serde(default = "default_gemini_model")]
    pub gemini_model: String,

    /// Open-Meteo forecast endpoint
    #[serde(default = "default_weather_api_url")]
    pub weather_api_url: String,

    /// Origins allowed by CORS (the frontend dev servers)
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: Vec<String>,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_redis_url() -> String {
    "redis://localhost:6379".to_string()
}

fn default_gemini_api_url() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

fn default_gemini_model() -> String {
    "gemini-2.0-flash".to_string()
}

fn default_weather_api_url() -> String {
    "https://api.open-meteo.com/v1/forecast".to_string()
}

fn default_allowed_origins() -> Vec<String> {
    vec![
        "http://localhost:5173".to_string(),
        "http://127.0.0.1:5173".to_string(),
    ]
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }
}
