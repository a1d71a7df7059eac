/// Rule-based recommendation provider
///
/// Serves two duties: the whole recommendation path when no Gemini key is
/// configured, and the fallback batch when generation fails mid-request.
/// Output is deliberately boring and always well-formed.
use crate::{
    error::AppResult,
    models::{
        AiRecommendation, DailyMenu, DailyMenus, ExclusionKey, GeoPoint, Recommendation, Slot,
        Weather,
    },
};

use super::RecommendationProvider;

#[derive(Debug, Default)]
pub struct RuleBasedProvider;

impl RuleBasedProvider {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait::async_trait]
impl RecommendationProvider for RuleBasedProvider {
    async fn recommend_alternatives(
        &self,
        weather: &Weather,
        _cafeteria_menu: &str,
        _location: Option<GeoPoint>,
        _prefer_external: bool,
        _avoid: &[ExclusionKey],
    ) -> AppResult<AiRecommendation> {
        let hot = weather.temperature > 25.0;

        let exception = if hot {
            rec(
                Slot::Exception,
                "냉면집",
                "fallback_003",
                7,
                "냉면",
                "시원한 육수와 신선한 재료로 더위를 식히기 좋습니다.",
                "9,000-12,000원",
                "냉면",
                &["평양냉면", "함흥냉면"],
            )
        } else {
            rec(
                Slot::Exception,
                "칼국수집",
                "fallback_003",
                7,
                "칼국수",
                "따뜻한 국물과 쫄깃한 면발로 몸을 녹이기 좋습니다.",
                "9,000-12,000원",
                "칼국수",
                &["한식", "국수"],
            )
        };

        let recommendations = vec![
            rec(
                Slot::Upgrade,
                "프리미엄 한식당",
                "fallback_001",
                10,
                "한정식",
                "구내식당보다 고급스러운 재료와 정성스러운 조리로 영양 균형이 뛰어납니다.",
                "15,000-20,000원",
                "한정식",
                &["한식", "정식"],
            ),
            rec(
                Slot::Substitute,
                "김치찌개 전문점",
                "fallback_002",
                5,
                "김치찌개",
                "구수한 맛과 풍부한 재료로 든든하며, 영양가 높은 한식입니다.",
                "8,000-10,000원",
                "김치찌개",
                &["찌개", "한식"],
            ),
            exception,
        ];

        Ok(AiRecommendation {
            recommendations,
            brief_rationale: format!(
                "현재 날씨({}°C, {})를 고려하여 영양과 맛의 균형을 맞춘 메뉴를 추천했습니다.",
                weather.temperature, weather.sky_condition
            ),
            need_more_info: false,
            missing: vec![],
        })
    }

    async fn daily_menus<'a>(
        &self,
        weather: &Weather,
        location: &str,
        _exclude_menu: Option<&'a str>,
    ) -> AppResult<DailyMenus> {
        let recommendations = if weather.temperature < 10.0 {
            vec![
                daily("김치찌개", "한식", "8,000-10,000원", &format!(
                    "추운 날씨({}°C)에 따뜻한 국물 요리로 몸을 녹이기 좋습니다.",
                    weather.temperature
                )),
                daily("우동", "일식", "7,000-9,000원",
                    "부드러운 면발과 따뜻한 국물이 추위를 녹여줍니다."),
                daily("샤브샤브", "중식", "12,000-15,000원",
                    "뜨거운 육수에 신선한 야채와 고기를 즐길 수 있습니다."),
            ]
        } else if weather.temperature < 20.0 {
            vec![
                daily("비빔밥", "한식", "8,000-10,000원",
                    "적당한 날씨에 영양 균형 잡힌 한 그릇 식사가 제격입니다."),
                daily("돈카츠", "일식", "9,000-12,000원",
                    "바삭한 튀김옷과 부드러운 고기가 점심 식사로 딱 좋습니다."),
                daily("파스타", "양식", "11,000-14,000원",
                    "풍미 있는 소스와 쫄깃한 면이 활력을 줍니다."),
            ]
        } else {
            vec![
                daily("냉면", "한식", "9,000-12,000원", &format!(
                    "더운 날씨({}°C)에 시원한 면 요리로 입맛을 돋우기 좋습니다.",
                    weather.temperature
                )),
                daily("초밥", "일식", "12,000-18,000원",
                    "신선한 생선과 깔끔한 맛이 여름철 식사로 적합합니다."),
                daily("샐러드", "양식", "10,000-13,000원",
                    "가볍고 신선한 재료로 더위에도 부담 없이 즐길 수 있습니다."),
            ]
        };

        Ok(DailyMenus {
            recommendations,
            summary: format!(
                "{} {}, {}°C - 오늘 날씨에 맞는 메뉴를 준비했습니다.",
                location, weather.sky_condition, weather.temperature
            ),
        })
    }

    fn name(&self) -> &'static str {
        "rule_based"
    }
}

#[allow(clippy::too_many_arguments)]
fn rec(
    slot: Slot,
    restaurant_name: &str,
    place_id: &str,
    minutes_away: u32,
    menu_name: &str,
    reason: &str,
    price_range: &str,
    search_query: &str,
    alt_queries: &[&str],
) -> Recommendation {
    Recommendation {
        slot,
        restaurant_name: restaurant_name.to_string(),
        menu_name: menu_name.to_string(),
        place_id: place_id.to_string(),
        minutes_away,
        reason: reason.to_string(),
        price_range: price_range.to_string(),
        search_query: search_query.to_string(),
        alt_queries: alt_queries.iter().map(|q| q.to_string()).collect(),
        category_code: "FD6".to_string(),
    }
}

fn daily(menu_name: &str, category: &str, price_range: &str, reason: &str) -> DailyMenu {
    DailyMenu {
        menu_name: menu_name.to_string(),
        category: category.to_string(),
        price_range: price_range.to_string(),
        reason: reason.to_string(),
        restaurant_name: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn weather(temperature: f64) -> Weather {
        Weather {
            location: "서울".to_string(),
            temperature,
            sky_condition: "맑음".to_string(),
            precipitation: "없음".to_string(),
            humidity: 50,
            note: None,
        }
    }

    #[tokio::test]
    async fn test_batch_always_carries_all_three_slots() {
        let provider = RuleBasedProvider::new();
        let result = provider
            .recommend_alternatives(&weather(18.0), "김치찌개", None, true, &[])
            .await
            .unwrap();

        let slots: Vec<Slot> = result.recommendations.iter().map(|r| r.slot).collect();
        assert_eq!(slots, vec![Slot::Upgrade, Slot::Substitute, Slot::Exception]);
        assert!(!result.need_more_info);
    }

    #[tokio::test]
    async fn test_exception_pick_follows_temperature() {
        let provider = RuleBasedProvider::new();

        let hot = provider
            .recommend_alternatives(&weather(28.0), "김치찌개", None, true, &[])
            .await
            .unwrap();
        let cold = provider
            .recommend_alternatives(&weather(8.0), "김치찌개", None, true, &[])
            .await
            .unwrap();

        assert_eq!(hot.recommendations[2].menu_name, "냉면");
        assert_eq!(cold.recommendations[2].menu_name, "칼국수");
    }

    #[tokio::test]
    async fn test_daily_menus_follow_temperature_bands() {
        let provider = RuleBasedProvider::new();

        let cold = provider.daily_menus(&weather(5.0), "서울", None).await.unwrap();
        let mild = provider.daily_menus(&weather(15.0), "서울", None).await.unwrap();
        let hot = provider.daily_menus(&weather(27.0), "서울", None).await.unwrap();

        assert_eq!(cold.recommendations[0].menu_name, "김치찌개");
        assert_eq!(mild.recommendations[0].menu_name, "비빔밥");
        assert_eq!(hot.recommendations[0].menu_name, "냉면");
        assert_eq!(cold.recommendations.len(), 3);
        assert!(hot.summary.contains("서울"));
    }
}
