use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::{
    error::{AppError, AppResult},
    models::{
        AiRecommendation, DailyMenu, DailyMenus, ExclusionKey, GeoPoint, Recommendation, Weather,
    },
    recommend::{Finalizer, HistoryStore, Taxonomy},
    services::{ocr::Confidence, OcrService, RecommendationProvider, WeatherService},
};

/// Request body shared by the cafeteria-recommendation and daily-refresh
/// endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct CafeteriaMenuRequest {
    #[serde(default = "default_location")]
    pub location: String,
    #[serde(default)]
    pub cafeteria_menu: Option<String>,
    /// Base64 meal-plan photo (data-URL or bare payload)
    #[serde(default)]
    pub image_data: Option<String>,
    #[serde(default)]
    pub user_location: Option<GeoPoint>,
    /// Prefer restaurants a short walk away over the closest options
    #[serde(default = "default_prefer_external")]
    pub prefer_external: bool,
    /// Today's daily picks, excluded from this recommendation stream
    #[serde(default)]
    pub daily_menus: Option<Vec<DailyMenu>>,
}

fn default_location() -> String {
    "서울".to_string()
}

fn default_prefer_external() -> bool {
    true
}

/// Weather block echoed back to the frontend.
#[derive(Debug, Serialize)]
pub struct WeatherInfo {
    pub location: String,
    pub temperature: f64,
    pub condition: String,
    pub precipitation: String,
}

impl From<&Weather> for WeatherInfo {
    fn from(weather: &Weather) -> Self {
        Self {
            location: weather.location.clone(),
            temperature: weather.temperature,
            condition: weather.sky_condition.clone(),
            precipitation: weather.precipitation.clone(),
        }
    }
}

/// Finalized response for a cafeteria recommendation request.
#[derive(Debug, Serialize)]
pub struct CafeteriaRecommendation {
    pub recommendations: Vec<Recommendation>,
    pub brief_rationale: String,
    pub cafeteria_menu: String,
    pub weather_summary: String,
    pub weather_info: WeatherInfo,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ocr_confidence: Option<Confidence>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extracted_menu: Option<String>,
}

/// Response for the daily-menu endpoints.
#[derive(Debug, Serialize)]
pub struct DailyRecommendations {
    pub recommendations: Vec<DailyMenu>,
    pub summary: String,
    pub weather: WeatherInfo,
}

/// Orchestrates one recommendation request end to end: weather lookup, menu
/// text resolution (typed or OCR), candidate generation with fallback, and
/// the finalization core.
pub struct LunchService {
    weather: WeatherService,
    ocr: Option<OcrService>,
    primary: Option<Arc<dyn RecommendationProvider>>,
    fallback: Arc<dyn RecommendationProvider>,
    taxonomy: Taxonomy,
    history: Arc<dyn HistoryStore>,
}

impl LunchService {
    pub fn new(
        weather: WeatherService,
        ocr: Option<OcrService>,
        primary: Option<Arc<dyn RecommendationProvider>>,
        fallback: Arc<dyn RecommendationProvider>,
        taxonomy: Taxonomy,
        history: Arc<dyn HistoryStore>,
    ) -> Self {
        Self {
            weather,
            ocr,
            primary,
            fallback,
            taxonomy,
            history,
        }
    }

    /// Weather passthrough for the standalone weather endpoint.
    pub async fn current_weather(
        &self,
        location: &str,
        lat: Option<f64>,
        lng: Option<f64>,
    ) -> Weather {
        self.weather.get_weather(location, lat, lng).await
    }

    /// Cafeteria-menu recommendation flow.
    pub async fn recommend_from_cafeteria(
        &self,
        request: CafeteriaMenuRequest,
    ) -> AppResult<CafeteriaRecommendation> {
        let (lat, lng) = match request.user_location {
            Some(point) => (Some(point.latitude), Some(point.longitude)),
            None => (None, None),
        };
        let weather = self.weather.get_weather(&request.location, lat, lng).await;

        // Resolve the menu text: photo wins over typed text.
        let (menu_text, ocr_confidence, extracted_menu) = match &request.image_data {
            Some(image) => {
                let ocr = self.ocr.as_ref().ok_or_else(|| {
                    AppError::InvalidInput(
                        "이미지 처리를 사용할 수 없습니다. 메뉴를 텍스트로 입력해주세요."
                            .to_string(),
                    )
                })?;
                let extraction = ocr
                    .extract_menu_from_image(image, request.cafeteria_menu.as_deref())
                    .await?;
                extraction.validate()?;
                (
                    extraction.menu_text.clone(),
                    Some(extraction.confidence),
                    Some(extraction.menu_text),
                )
            }
            None => match request.cafeteria_menu.as_deref().map(str::trim) {
                Some(text) if !text.is_empty() => (text.to_string(), None, None),
                _ => {
                    return Err(AppError::InvalidInput(
                        "메뉴 텍스트 또는 이미지를 제공해주세요.".to_string(),
                    ))
                }
            },
        };

        // Keys the generator is asked to avoid: the previous batch plus
        // whatever the daily stream already used today.
        let daily_keys: Vec<ExclusionKey> = request
            .daily_menus
            .iter()
            .flatten()
            .map(|menu| ExclusionKey {
                restaurant_name: menu.restaurant_name.clone().unwrap_or_default(),
                menu_name: menu.menu_name.clone(),
            })
            .collect();
        let mut avoid: Vec<ExclusionKey> = self
            .history
            .current()
            .iter()
            .map(Recommendation::exclusion_key)
            .collect();
        avoid.extend(daily_keys.iter().cloned());

        let generated = self
            .generate_alternatives(
                &weather,
                &menu_text,
                request.user_location,
                request.prefer_external,
                &avoid,
            )
            .await?;

        let finalized = Finalizer::new(&self.taxonomy, self.history.as_ref()).finalize(
            &menu_text,
            generated.recommendations,
            &daily_keys,
        );

        Ok(CafeteriaRecommendation {
            recommendations: finalized,
            brief_rationale: generated.brief_rationale,
            cafeteria_menu: menu_text,
            weather_summary: format!("{}°C, {}", weather.temperature, weather.sky_condition),
            weather_info: WeatherInfo::from(&weather),
            ocr_confidence,
            extracted_menu,
        })
    }

    /// Today's standalone menu picks.
    pub async fn daily_recommendations(
        &self,
        location: &str,
        lat: Option<f64>,
        lng: Option<f64>,
    ) -> AppResult<DailyRecommendations> {
        let weather = self.weather.get_weather(location, lat, lng).await;
        let menus = self.generate_daily(&weather, location, None).await?;

        Ok(DailyRecommendations {
            recommendations: menus.recommendations,
            summary: menus.summary,
            weather: WeatherInfo::from(&weather),
        })
    }

    /// Regenerates the daily picks, steering away from the cafeteria menu.
    pub async fn refresh_daily_recommendations(
        &self,
        request: &CafeteriaMenuRequest,
    ) -> AppResult<DailyRecommendations> {
        let (lat, lng) = match request.user_location {
            Some(point) => (Some(point.latitude), Some(point.longitude)),
            None => (None, None),
        };
        let weather = self.weather.get_weather(&request.location, lat, lng).await;
        let menus = self
            .generate_daily(&weather, &request.location, request.cafeteria_menu.as_deref())
            .await?;

        Ok(DailyRecommendations {
            recommendations: menus.recommendations,
            summary: menus.summary,
            weather: WeatherInfo::from(&weather),
        })
    }

    async fn generate_alternatives(
        &self,
        weather: &Weather,
        cafeteria_menu: &str,
        location: Option<GeoPoint>,
        prefer_external: bool,
        avoid: &[ExclusionKey],
    ) -> AppResult<AiRecommendation> {
        if let Some(primary) = &self.primary {
            match primary
                .recommend_alternatives(weather, cafeteria_menu, location, prefer_external, avoid)
                .await
            {
                Ok(result) => return Ok(result),
                Err(e) => {
                    tracing::warn!(
                        error = %e,
                        provider = primary.name(),
                        "Primary provider failed, falling back"
                    );
                }
            }
        }

        self.fallback
            .recommend_alternatives(weather, cafeteria_menu, location, prefer_external, avoid)
            .await
    }

    async fn generate_daily(
        &self,
        weather: &Weather,
        location: &str,
        exclude_menu: Option<&str>,
    ) -> AppResult<DailyMenus> {
        if let Some(primary) = &self.primary {
            match primary.daily_menus(weather, location, exclude_menu).await {
                Ok(result) => return Ok(result),
                Err(e) => {
                    tracing::warn!(
                        error = %e,
                        provider = primary.name(),
                        "Primary provider failed, falling back"
                    );
                }
            }
        }

        self.fallback.daily_menus(weather, location, exclude_menu).await
    }
}
