use std::collections::HashSet;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use chrono::{Datelike, Local};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::{
    error::{AppError, AppResult},
    services::gemini::{Content, GenerateContentRequest, GeminiClient, GenerationConfig, Part},
};

const OCR_TEMPERATURE: f64 = 0.3;
const OCR_TOP_P: f64 = 0.8;
const OCR_TOP_K: u32 = 40;
const OCR_MAX_OUTPUT_TOKENS: u32 = 1024;

const WEEKDAYS_KR: [&str; 7] = [
    "월요일", "화요일", "수요일", "목요일", "금요일", "토요일", "일요일",
];

/// Standalone side dishes, plain rice, non-main soups and desserts that a
/// meal-plan photo lists but no one orders at a restaurant. Matched whole,
/// so 김치찌개 survives the 김치 entry.
const SIDE_DISH_KEYWORDS: &[&str] = &[
    "김치", "깍두기", "단무지", "배추김치", "총각김치", "나물", "장아찌",
    "밥", "잡곡밥", "흰밥", "현미밥", "쌀밥",
    "된장국", "미역국", "콩나물국", "무국", "북어국",
    "과일", "요구르트", "음료", "우유", "주스",
    "샐러드", "샌드위치",
];

static CLEANUP_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"이미지에서.*?:",
        r"오늘.*?메뉴.*?:",
        r"점심.*?메뉴.*?:",
        r"메뉴.*?:",
        r"\*\*.*?\*\*",
        r"\d{4}[-/.]\d{1,2}[-/.]\d{1,2}",
        r"\d{1,2}월\s*\d{1,2}일",
        r"[월화수목금토일]요일",
        r"(조식|중식|석식|아침|점심|저녁)[\s:]*",
        r"[A-Z가-힣]\s*코너[\s:]*",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("valid cleanup pattern"))
    .collect()
});

static COMMA_RUN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r",\s*,+").expect("valid regex"));
static MENU_SPLIT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[,;\n|]").expect("valid regex"));
static PRICE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\d,]*\d\s*원").expect("valid regex"));
static PAREN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\([^)]*\)").expect("valid regex"));

/// How much the extraction can be trusted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    Medium,
    Low,
    /// Vision failed; the caller's typed text was used instead
    Fallback,
}

/// Result of extracting a menu from a meal-plan image.
#[derive(Debug, Clone)]
pub struct MenuExtraction {
    pub menu_text: String,
    pub menu_list: Vec<String>,
    pub confidence: Confidence,
}

impl MenuExtraction {
    /// Rejects extractions too weak to recommend from.
    pub fn validate(&self) -> AppResult<()> {
        if self.menu_list.is_empty() {
            return Err(AppError::InvalidInput(
                "이미지에서 메뉴를 찾을 수 없습니다. 텍스트로 입력해주세요.".to_string(),
            ));
        }
        if self.confidence == Confidence::Low {
            return Err(AppError::InvalidInput(
                "메뉴 인식 신뢰도가 낮습니다. 텍스트로 직접 입력하거나 더 선명한 이미지를 사용해주세요."
                    .to_string(),
            ));
        }
        Ok(())
    }
}

/// Meal-plan photo → today's lunch main menus, via Gemini Vision.
#[derive(Clone)]
pub struct OcrService {
    client: GeminiClient,
}

impl OcrService {
    pub fn new(client: GeminiClient) -> Self {
        Self { client }
    }

    /// Extracts today's lunch main menus from a base64 (data-URL or bare)
    /// image payload.
    ///
    /// When vision fails and the caller typed a menu as well, that text is
    /// used with `Fallback` confidence instead of surfacing the error.
    pub async fn extract_menu_from_image(
        &self,
        base64_image: &str,
        fallback_text: Option<&str>,
    ) -> AppResult<MenuExtraction> {
        match self.run_vision(base64_image).await {
            Ok(menu_text) => {
                let menu_list = parse_menu_text(&menu_text);
                let confidence = evaluate_confidence(&menu_list);

                tracing::info!(
                    menus = menu_list.len(),
                    confidence = ?confidence,
                    "Menu extraction completed"
                );

                Ok(MenuExtraction {
                    menu_text,
                    menu_list,
                    confidence,
                })
            }
            Err(e) => match fallback_text {
                Some(text) if !text.trim().is_empty() => {
                    tracing::warn!(error = %e, "Vision failed, using caller-typed menu text");
                    Ok(MenuExtraction {
                        menu_text: text.to_string(),
                        menu_list: parse_menu_text(text),
                        confidence: Confidence::Fallback,
                    })
                }
                _ => Err(e),
            },
        }
    }

    async fn run_vision(&self, base64_image: &str) -> AppResult<String> {
        // Strip the data-URL header if present
        let payload = base64_image
            .split(',')
            .next_back()
            .unwrap_or(base64_image);

        let bytes = BASE64
            .decode(payload)
            .map_err(|e| AppError::InvalidInput(format!("잘못된 이미지 데이터입니다: {}", e)))?;
        let mime_type = detect_mime_type(&bytes);

        let request = GenerateContentRequest {
            system_instruction: None,
            contents: vec![Content {
                parts: vec![
                    Part::text(vision_prompt()),
                    Part::inline_data(mime_type, payload),
                ],
            }],
            generation_config: Some(GenerationConfig {
                temperature: Some(OCR_TEMPERATURE),
                top_p: Some(OCR_TOP_P),
                top_k: Some(OCR_TOP_K),
                max_output_tokens: Some(OCR_MAX_OUTPUT_TOKENS),
                ..Default::default()
            }),
        };

        let text = self.client.generate(&request).await?;
        Ok(clean_extracted_text(&text))
    }
}

fn vision_prompt() -> String {
    let weekday = WEEKDAYS_KR[Local::now().weekday().num_days_from_monday() as usize];

    format!(
        "이 이미지는 구내식당 또는 학교 급식 식단표입니다.\n\
         **오늘({weekday}) 점심(중식) 메인 메뉴만** 추출해주세요.\n\n\
         지침:\n\
         1. 여러 날짜가 있으면 오늘 요일의 메뉴만 선택하세요.\n\
         2. 조식/석식 구분이 있으면 반드시 중식만 선택하고, 구분이 없으면 모든 메뉴를 포함하세요.\n\
         3. 여러 코너가 있으면 모든 코너의 메인 메뉴를 포함하세요.\n\
         4. 메인 메뉴만 추출하세요 (찌개, 탕, 국밥, 볶음, 구이, 덮밥, 면, 전골, 카레, 파스타, 돈까스 등).\n\
         5. 반찬(김치, 나물 등), 밥, 부수 국, 후식, 가격, 칼로리, 날짜, 요일 라벨은 제외하세요.\n\
         6. 쉼표(,)로 구분하여 메뉴명만 나열하고, 중복은 제거하세요.\n\n\
         출력 예시:\n김치찌개, 제육볶음\n\n\
         오늘({weekday}) 점심(중식) 메인 메뉴만 추출해주세요:"
    )
}

/// Removes labels, dates and formatting the model tends to echo around the
/// menu list.
fn clean_extracted_text(text: &str) -> String {
    let mut cleaned = text.to_string();
    for re in CLEANUP_PATTERNS.iter() {
        cleaned = re.replace_all(&cleaned, "").into_owned();
    }

    let cleaned = cleaned.replace('\n', ", ").replace("  ", " ");
    let cleaned = COMMA_RUN_RE.replace_all(&cleaned, ",").into_owned();

    cleaned
        .trim()
        .trim_matches(|c| c == ',' || c == ' ')
        .to_string()
}

/// Splits cleaned text into individual main-menu names.
fn parse_menu_text(text: &str) -> Vec<String> {
    if text.is_empty() {
        return Vec::new();
    }

    let mut seen = HashSet::new();
    let mut menus = Vec::new();

    for raw in MENU_SPLIT_RE.split(text) {
        let stripped = PRICE_RE.replace_all(raw.trim(), "");
        let stripped = PAREN_RE.replace_all(&stripped, "");
        let menu = stripped.trim();

        if menu.chars().count() < 2 || menu.chars().all(|c| c.is_ascii_digit()) {
            continue;
        }
        if SIDE_DISH_KEYWORDS.contains(&menu) {
            continue;
        }

        if seen.insert(menu.to_lowercase()) {
            menus.push(menu.to_string());
        }
    }

    menus
}

fn evaluate_confidence(menu_list: &[String]) -> Confidence {
    if menu_list.is_empty() {
        return Confidence::Low;
    }

    let count = menu_list.len();
    let avg_length =
        menu_list.iter().map(|m| m.chars().count()).sum::<usize>() as f64 / count as f64;

    if count >= 3 && avg_length >= 3.0 {
        Confidence::High
    } else if count >= 2 && avg_length >= 2.0 {
        Confidence::Medium
    } else {
        Confidence::Low
    }
}

/// Image type by magic number, jpeg when unrecognized.
fn detect_mime_type(bytes: &[u8]) -> &'static str {
    if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        "image/jpeg"
    } else if bytes.starts_with(b"\x89PNG") {
        "image/png"
    } else if bytes.starts_with(b"GIF") {
        "image/gif"
    } else if bytes.starts_with(b"RIFF") && bytes.len() >= 12 && &bytes[8..12] == b"WEBP" {
        "image/webp"
    } else {
        "image/jpeg"
    }
}
