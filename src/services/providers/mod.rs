/// Recommendation generation abstraction
///
/// Gemini-backed in production. The rule-based implementation doubles as the
/// no-API-key mode and the fallback when generation fails, so the service
/// always has something to serve.
use crate::{
    error::AppResult,
    models::{AiRecommendation, DailyMenus, ExclusionKey, GeoPoint, Weather},
};

pub mod gemini;
pub mod rule_based;

pub use gemini::GeminiProvider;
pub use rule_based::RuleBasedProvider;

/// Trait for recommendation candidate generators
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait RecommendationProvider: Send + Sync {
    /// Generates raw lunch alternatives for today's cafeteria menu.
    ///
    /// The result is a *candidate* batch: slots may be mis-assigned and
    /// entries may repeat earlier suggestions. The recommendation core owns
    /// dedup and taxonomy repair; `avoid` is only a hint to the generator.
    async fn recommend_alternatives(
        &self,
        weather: &Weather,
        cafeteria_menu: &str,
        location: Option<GeoPoint>,
        prefer_external: bool,
        avoid: &[ExclusionKey],
    ) -> AppResult<AiRecommendation>;

    /// Generates today's standalone menu picks.
    ///
    /// `exclude_menu` asks for picks semantically distant from the given
    /// cafeteria menu (the refresh endpoint).
    async fn daily_menus<'a>(
        &self,
        weather: &Weather,
        location: &str,
        exclude_menu: Option<&'a str>,
    ) -> AppResult<DailyMenus>;

    /// Provider name for logging and debugging
    fn name(&self) -> &'static str;
}
