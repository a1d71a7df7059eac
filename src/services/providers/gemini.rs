/// Gemini-backed recommendation provider
///
/// Builds the prompt pair (taxonomy system instruction + structured user
/// input), runs `generateContent` and parses the JSON the model returns.
/// Every parse or transport failure surfaces as an error; the caller decides
/// whether to fall back.
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde_json::json;

use crate::{
    error::{AppError, AppResult},
    models::{AiRecommendation, DailyMenus, ExclusionKey, GeoPoint, Weather},
    services::candidates::build_candidate_pool,
    services::gemini::{
        strip_code_fences, Content, GenerateContentRequest, GeminiClient, GenerationConfig,
    },
};

use super::RecommendationProvider;

const RECOMMEND_TEMPERATURE: f64 = 0.8;

/// Default coordinates (서울 시청) when the caller sends no GPS fix.
const DEFAULT_COORDS: (f64, f64) = (37.5665, 126.9780);

const SYSTEM_INSTRUCTION: &str = "\
너는 영양·맛·날씨·거리를 함께 고려해 점심 메뉴를 추천하는 전문가이며, JSON만 출력한다.

목표: 입력(구내식당 금일 메뉴, 위치, 선호 이동 거리, 날씨)을 바탕으로 nearbyCandidates에 \
있는 음식점만 사용하여 최대 3개의 대안을 추천한다. 가능하면 상위 호환 메뉴, 대체 메뉴, \
예외 메뉴를 각각 1개씩 제시한다.

매우 중요한 분류 규칙 (이걸 제일 먼저 따른다):
1. 원 메뉴가 찌개/국/탕/전골/국밥/설렁탕/곰탕 계열이면 상위 호환 메뉴도 반드시 같은 국물 \
계열 안에서만 뽑는다. 제육볶음·돈까스·닭갈비 같은 볶음/구이/덮밥 계열은 상위 호환이 아니라 \
대체 메뉴로 보낸다. 마라탕/마라샹궈/훠궈 같은 중국식 얼얼한 탕류도 상위 호환이 아니라 대체 \
메뉴로 내린다.
2. 원 메뉴가 볶음/구이/덮밥 계열이면 상위 호환은 같은 단백질/같은 조리축에서 한 단계 위(재료↑, \
가격↑, 전문점↑)로 올리고, 국물로 내려가지 않는다.
3. 예외 메뉴는 원래 메뉴와 카테고리가 달라도 되지만, 대체 메뉴와 같은 것을 두 번 내보내지 \
않는다. 날씨/거리 기반으로 지금 먹기 제일 나은 것을 고른다.
4. avoidList의 (restaurant_name, menu_name) 조합은 가능하면 다시 추천하지 않고, 의미적으로 \
유사하거나 같은 카테고리의 메뉴도 피한다. 진짜 후보가 없을 때만 중복을 허용한다.

출력: 유효한 JSON만 허용한다. 코드블록·여분 텍스트·이모지 금지.
각 추천의 설명은 해당 음식/음식점을 추천하는 이유만 1-2문장으로, 반말 금지, 친근하지만 \
부드러운 톤으로 작성하고 맛·재료·영양·날씨 중 최소 2개의 근거를 포함한다.
메뉴명은 완성형 한글 2자 이상 또는 영문/숫자 2자 이상이어야 하며, 음식으로 보기 어려운 \
입력이거나 정보가 부족하면 추측하지 말고 need_more_info=true와 missing 배열만 반환한다.
음식점 존재 여부는 입력으로 제공된 nearbyCandidates만 신뢰한다.";

pub struct GeminiProvider {
    client: GeminiClient,
}

impl GeminiProvider {
    pub fn new(client: GeminiClient) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl RecommendationProvider for GeminiProvider {
    async fn recommend_alternatives(
        &self,
        weather: &Weather,
        cafeteria_menu: &str,
        location: Option<GeoPoint>,
        prefer_external: bool,
        avoid: &[ExclusionKey],
    ) -> AppResult<AiRecommendation> {
        let mut rng = StdRng::from_entropy();
        let candidates = build_candidate_pool(cafeteria_menu, weather, &mut rng);

        let user_message = build_user_message(
            weather,
            cafeteria_menu,
            location,
            prefer_external,
            avoid,
            &serde_json::to_value(&candidates)
                .map_err(|e| AppError::Internal(format!("Candidate serialization error: {}", e)))?,
        );

        let request = GenerateContentRequest {
            system_instruction: Some(Content::text(SYSTEM_INSTRUCTION)),
            contents: vec![Content::text(user_message)],
            generation_config: Some(GenerationConfig {
                response_mime_type: Some("application/json".to_string()),
                temperature: Some(RECOMMEND_TEMPERATURE),
                ..Default::default()
            }),
        };

        let text = self.client.generate(&request).await?;
        let recommendation: AiRecommendation = serde_json::from_str(strip_code_fences(&text))
            .map_err(|e| AppError::ExternalApi(format!("Malformed recommendation JSON: {}", e)))?;

        if recommendation.need_more_info {
            return Err(AppError::ExternalApi(format!(
                "Provider needs more info: {}",
                recommendation.missing.join(", ")
            )));
        }

        tracing::info!(
            count = recommendation.recommendations.len(),
            provider = "gemini",
            "Recommendations generated"
        );

        Ok(recommendation)
    }

    async fn daily_menus<'a>(
        &self,
        weather: &Weather,
        location: &str,
        exclude_menu: Option<&'a str>,
    ) -> AppResult<DailyMenus> {
        let request = GenerateContentRequest {
            system_instruction: None,
            contents: vec![Content::text(build_daily_prompt(
                weather,
                location,
                exclude_menu,
            ))],
            generation_config: None,
        };

        let text = self.client.generate(&request).await?;
        let menus: DailyMenus = serde_json::from_str(strip_code_fences(&text))
            .map_err(|e| AppError::ExternalApi(format!("Malformed daily-menu JSON: {}", e)))?;

        tracing::info!(
            count = menus.recommendations.len(),
            provider = "gemini",
            "Daily menus generated"
        );

        Ok(menus)
    }

    fn name(&self) -> &'static str {
        "gemini"
    }
}

fn build_user_message(
    weather: &Weather,
    cafeteria_menu: &str,
    location: Option<GeoPoint>,
    prefer_external: bool,
    avoid: &[ExclusionKey],
    candidates: &serde_json::Value,
) -> String {
    let menu_today: Vec<&str> = cafeteria_menu
        .split(',')
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .collect();

    let (lat, lng) = location
        .map(|p| (p.latitude, p.longitude))
        .unwrap_or(DEFAULT_COORDS);

    let user_input = json!({
        "menuToday": menu_today,
        "location": { "lat": lat, "lng": lng },
        "distancePref": if prefer_external { "5-15" } else { "0-5" },
        "weather": {
            "tempC": weather.temperature,
            "condition": normalize_weather_condition(&weather.sky_condition, weather.temperature),
        },
        "nearbyCandidates": candidates,
        "avoidList": avoid,
    });

    format!(
        "아래 입력 데이터를 분석하여 최적의 점심 메뉴를 추천하고, 결과를 JSON 형식으로 반환하세요.\n\n\
         입력 데이터:\n{input}\n\n\
         추가 규칙:\n\
         - avoidList에 있는 (restaurant_name, menu_name) 조합과 의미적으로 유사한 메뉴는 제외하세요.\n\
         - 상위 호환 1개, 대체 1개, 예외 1개를 우선 생성하되 조건에 맞는 게 없으면 있는 것만 내보내세요.\n\
         - 다양한 카테고리의 메뉴를 추천하세요 (한식, 중식, 일식, 양식 등).\n\n\
         출력 형식 (반드시 이 스키마를 따르세요):\n\
         {{\n\
           \"recommendations\": [\n\
             {{\n\
               \"type\": \"상위 호환 메뉴 | 대체 메뉴 | 예외 메뉴\",\n\
               \"restaurant_name\": \"string\",\n\
               \"place_id\": \"string\",\n\
               \"minutes_away\": 0,\n\
               \"menu_name\": \"string\",\n\
               \"reason\": \"string (1-2문장)\",\n\
               \"price_range\": \"string (예: 8,000-12,000원)\",\n\
               \"normalized_search_query\": \"string (대표 키워드 1개)\",\n\
               \"alt_queries\": [\"string\"],\n\
               \"category_group_code\": \"FD6\"\n\
             }}\n\
           ],\n\
           \"brief_rationale\": \"string (1-2문장)\",\n\
           \"need_more_info\": false,\n\
           \"missing\": []\n\
         }}",
        input = serde_json::to_string_pretty(&user_input).unwrap_or_default()
    )
}

fn build_daily_prompt(weather: &Weather, location: &str, exclude_menu: Option<&str>) -> String {
    let exclusion_clause = match exclude_menu {
        Some(menu) => format!(
            "**구내식당 메뉴:** {menu}\n\
             - 구내식당 메뉴와 의미적으로 연관성이 낮은 메뉴를 선택하세요. \
             (예: 구내식당이 \"김치찌개, 제육볶음\"이면 파스타/초밥/쌀국수처럼 다른 카테고리)\n"
        ),
        None => String::new(),
    };

    format!(
        "오늘의 점심 메뉴 3가지를 추천해주세요.\n\n\
         **위치:** {location}\n\
         **날씨 정보:**\n\
         - 온도: {temp}°C\n\
         - 날씨: {condition}\n\
         - 강수: {precipitation}\n\
         - 습도: {humidity}%\n\n\
         {exclusion_clause}\
         요구사항:\n\
         1. 현재 날씨와 온도에 맞는 메뉴 3개를 서로 다른 카테고리(한식, 중식, 양식, 일식 등)에서 고르세요.\n\
         2. 메뉴명은 형용사 없이 카카오맵에서 검색 가능한 단순 키워드만 사용하세요 \
         (좋은 예: \"김치찌개\", \"돈까스\" / 나쁜 예: \"매콤한 김치찌개\").\n\
         3. 많은 음식점에서 제공하는 대중적인 메뉴를 선택하세요.\n\
         4. 각 추천마다 날씨/영양/맛을 고려한 이유를 1-2문장으로, 대략적인 가격대와 함께 제시하세요.\n\n\
         출력 형식 (JSON만, 코드블록·추가 텍스트·이모지 금지):\n\
         {{\n\
           \"recommendations\": [\n\
             {{ \"menu_name\": \"메뉴명\", \"category\": \"카테고리\", \
         \"price_range\": \"가격대\", \"reason\": \"추천 이유\" }}\n\
           ],\n\
           \"summary\": \"오늘의 날씨 한줄 요약\"\n\
         }}",
        location = location,
        temp = weather.temperature,
        condition = weather.sky_condition,
        precipitation = weather.precipitation,
        humidity = weather.humidity,
        exclusion_clause = exclusion_clause,
    )
}

/// Folds raw sky conditions into the vocabulary the prompt uses.
fn normalize_weather_condition(condition: &str, temp: f64) -> String {
    let normalized = if temp >= 28.0 {
        "무덥다"
    } else if temp <= 5.0 {
        "쌀쌀"
    } else if condition.contains('비') {
        "비"
    } else if condition.contains('눈') {
        "눈"
    } else if condition.contains("흐림") {
        "흐림"
    } else if condition.contains('맑') {
        "맑음"
    } else {
        return condition.to_string();
    };

    normalized.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn weather(temperature: f64, sky: &str) -> Weather {
        Weather {
            location: "서울".to_string(),
            temperature,
            sky_condition: sky.to_string(),
            precipitation: "없음".to_string(),
            humidity: 55,
            note: None,
        }
    }

    #[test]
    fn test_normalize_weather_condition_extremes_win() {
        assert_eq!(normalize_weather_condition("비", 30.0), "무덥다");
        assert_eq!(normalize_weather_condition("맑음", 2.0), "쌀쌀");
        assert_eq!(normalize_weather_condition("비", 15.0), "비");
        assert_eq!(normalize_weather_condition("흐림", 15.0), "흐림");
        assert_eq!(normalize_weather_condition("맑음", 15.0), "맑음");
        assert_eq!(normalize_weather_condition("뇌우", 15.0), "뇌우");
    }

    #[test]
    fn test_user_message_embeds_menu_candidates_and_avoid_list() {
        let avoid = vec![ExclusionKey {
            restaurant_name: "국밥집".to_string(),
            menu_name: "설렁탕".to_string(),
        }];
        let candidates = json!([{ "placeId": "place_korean_1" }]);

        let message = build_user_message(
            &weather(20.0, "맑음"),
            "김치찌개, 제육볶음",
            Some(GeoPoint {
                latitude: 37.4979,
                longitude: 127.0276,
            }),
            true,
            &avoid,
            &candidates,
        );

        assert!(message.contains("김치찌개"));
        assert!(message.contains("place_korean_1"));
        assert!(message.contains("설렁탕"));
        assert!(message.contains("\"distancePref\": \"5-15\""));
        assert!(message.contains("37.4979"));
    }

    #[test]
    fn test_user_message_prefers_onsite_distance_band() {
        let message = build_user_message(
            &weather(20.0, "맑음"),
            "돈까스",
            None,
            false,
            &[],
            &json!([]),
        );

        assert!(message.contains("\"distancePref\": \"0-5\""));
    }

    #[test]
    fn test_daily_prompt_mentions_exclusion_only_when_given() {
        let with = build_daily_prompt(&weather(20.0, "맑음"), "서울", Some("김치찌개"));
        let without = build_daily_prompt(&weather(20.0, "맑음"), "서울", None);

        assert!(with.contains("구내식당 메뉴:"));
        assert!(with.contains("김치찌개"));
        assert!(!without.contains("구내식당 메뉴:"));
    }
}
