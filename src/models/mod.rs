use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// The three recommendation slots.
///
/// Wire labels are the Korean strings the frontend and the Gemini schema
/// agreed on. A provider emitting anything unrecognized lands in `Exception`
/// rather than failing deserialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    Upgrade,
    Substitute,
    Exception,
}

impl Slot {
    /// Wire label for this slot.
    pub fn label(&self) -> &'static str {
        match self {
            Slot::Upgrade => "상위 호환 메뉴",
            Slot::Substitute => "대체 메뉴",
            Slot::Exception => "예외 메뉴",
        }
    }

    /// Classifies a wire label. Generated labels drift ("상위 호환",
    /// "상위호환 메뉴"), so matching keys on the discriminating word; anything
    /// unrecognized is an exception, never an error.
    pub fn from_label(label: &str) -> Self {
        if label.contains("상위") {
            Slot::Upgrade
        } else if label.contains("대체") {
            Slot::Substitute
        } else {
            Slot::Exception
        }
    }
}

impl Default for Slot {
    fn default() -> Self {
        Slot::Exception
    }
}

impl Serialize for Slot {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

impl<'de> Deserialize<'de> for Slot {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;
        Ok(Slot::from_label(&label))
    }
}

/// A single suggested lunch alternative.
///
/// Field names follow the JSON schema produced by the recommendation
/// providers; everything past `reason` is opaque passthrough for the
/// frontend (search queries, price hints, Kakao category codes).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    #[serde(rename = "type", default)]
    pub slot: Slot,
    #[serde(default)]
    pub restaurant_name: String,
    #[serde(default)]
    pub menu_name: String,
    #[serde(default)]
    pub place_id: String,
    #[serde(default)]
    pub minutes_away: u32,
    #[serde(default)]
    pub reason: String,
    #[serde(default)]
    pub price_range: String,
    #[serde(rename = "normalized_search_query", default)]
    pub search_query: String,
    #[serde(default)]
    pub alt_queries: Vec<String>,
    #[serde(rename = "category_group_code", default)]
    pub category_code: String,
}

impl Recommendation {
    /// Identity used for repeat suppression.
    pub fn exclusion_key(&self) -> ExclusionKey {
        ExclusionKey {
            restaurant_name: self.restaurant_name.clone(),
            menu_name: self.menu_name.clone(),
        }
    }

    /// Returns a copy of this recommendation carrying a different slot.
    ///
    /// Repair never mutates entries in place; the caller may still hold the
    /// original.
    pub fn with_slot(&self, slot: Slot) -> Self {
        Self {
            slot,
            ..self.clone()
        }
    }
}

/// The (restaurant, menu) pair used to suppress repeat suggestions.
///
/// Exact, case-sensitive string identity; semantic near-duplicates are the
/// provider prompt's problem, not this layer's.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExclusionKey {
    #[serde(default)]
    pub restaurant_name: String,
    #[serde(default)]
    pub menu_name: String,
}

/// Provider output for a cafeteria-menu recommendation request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AiRecommendation {
    #[serde(default)]
    pub recommendations: Vec<Recommendation>,
    #[serde(default)]
    pub brief_rationale: String,
    #[serde(default)]
    pub need_more_info: bool,
    #[serde(default)]
    pub missing: Vec<String>,
}

/// One of today's standalone menu picks (no restaurant binding).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyMenu {
    #[serde(default)]
    pub menu_name: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub price_range: String,
    #[serde(default)]
    pub reason: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub restaurant_name: Option<String>,
}

/// Provider output for the daily-menu endpoints.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DailyMenus {
    #[serde(default)]
    pub recommendations: Vec<DailyMenu>,
    #[serde(default)]
    pub summary: String,
}

/// Current weather snapshot used to steer recommendations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Weather {
    pub location: String,
    pub temperature: f64,
    pub sky_condition: String,
    pub precipitation: String,
    pub humidity: u8,
    /// Set when Open-Meteo was unreachable and dummy data was substituted
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub note: Option<String>,
}

/// User-supplied coordinates, preferred over the named-location table.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

/// A synthesized nearby-restaurant candidate handed to the provider.
///
/// Serialized camelCase: this object is embedded verbatim in the Gemini
/// user message, whose schema predates this service.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NearbyCandidate {
    pub place_id: String,
    pub name: String,
    pub category: String,
    pub minutes_away: u32,
    pub menu_examples: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(slot: Slot, restaurant: &str, menu: &str) -> Recommendation {
        Recommendation {
            slot,
            restaurant_name: restaurant.to_string(),
            menu_name: menu.to_string(),
            place_id: "place_1".to_string(),
            minutes_away: 5,
            reason: "test".to_string(),
            price_range: "8,000-10,000원".to_string(),
            search_query: menu.to_string(),
            alt_queries: vec![],
            category_code: "FD6".to_string(),
        }
    }

    #[test]
    fn test_slot_serializes_korean_labels() {
        assert_eq!(
            serde_json::to_string(&Slot::Upgrade).unwrap(),
            "\"상위 호환 메뉴\""
        );
        assert_eq!(
            serde_json::to_string(&Slot::Substitute).unwrap(),
            "\"대체 메뉴\""
        );
        assert_eq!(
            serde_json::to_string(&Slot::Exception).unwrap(),
            "\"예외 메뉴\""
        );
    }

    #[test]
    fn test_slot_unknown_label_becomes_exception() {
        let slot: Slot = serde_json::from_str("\"완전히 새로운 분류\"").unwrap();
        assert_eq!(slot, Slot::Exception);
    }

    #[test]
    fn test_recommendation_deserializes_provider_schema() {
        let json = r#"{
            "type": "상위 호환 메뉴",
            "restaurant_name": "김치찌개 전문점",
            "place_id": "place_korean_2",
            "minutes_away": 5,
            "menu_name": "차돌김치찌개",
            "reason": "추운 날씨에 어울리는 진한 국물입니다.",
            "price_range": "9,000-12,000원",
            "normalized_search_query": "김치찌개",
            "alt_queries": ["찌개", "한식"],
            "category_group_code": "FD6"
        }"#;

        let rec: Recommendation = serde_json::from_str(json).unwrap();
        assert_eq!(rec.slot, Slot::Upgrade);
        assert_eq!(rec.menu_name, "차돌김치찌개");
        assert_eq!(rec.search_query, "김치찌개");
        assert_eq!(rec.category_code, "FD6");
    }

    #[test]
    fn test_recommendation_missing_slot_defaults_to_exception() {
        let json = r#"{ "restaurant_name": "분식천국", "menu_name": "떡볶이" }"#;
        let rec: Recommendation = serde_json::from_str(json).unwrap();
        assert_eq!(rec.slot, Slot::Exception);
    }

    #[test]
    fn test_with_slot_leaves_original_untouched() {
        let original = sample(Slot::Upgrade, "분식천국", "라면");
        let demoted = original.with_slot(Slot::Substitute);

        assert_eq!(original.slot, Slot::Upgrade);
        assert_eq!(demoted.slot, Slot::Substitute);
        assert_eq!(demoted.menu_name, original.menu_name);
    }

    #[test]
    fn test_exclusion_key_is_exact_match() {
        let a = sample(Slot::Upgrade, "국밥집", "설렁탕").exclusion_key();
        let b = sample(Slot::Substitute, "국밥집", "설렁탕").exclusion_key();
        let c = sample(Slot::Upgrade, "국밥집", "설렁탕 ").exclusion_key();

        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_nearby_candidate_camel_case_wire_format() {
        let candidate = NearbyCandidate {
            place_id: "place_korean_1".to_string(),
            name: "프리미엄 한식당".to_string(),
            category: "한식".to_string(),
            minutes_away: 10,
            menu_examples: vec!["한정식".to_string()],
        };

        let json = serde_json::to_value(&candidate).unwrap();
        assert_eq!(json["placeId"], "place_korean_1");
        assert_eq!(json["minutesAway"], 10);
        assert_eq!(json["menuExamples"][0], "한정식");
    }
}
