use rand::seq::SliceRandom;
use rand::Rng;

use crate::models::{NearbyCandidate, Weather};

/// Synthesizes the nearby-restaurant pool handed to the recommendation
/// provider.
///
/// Stands in for a real Kakao Map lookup. The pool is conditioned on the
/// cafeteria menu and current weather, then shuffled so repeated requests
/// surface different candidates first; the caller owns the rng so tests can
/// seed it.
pub fn build_candidate_pool<R: Rng>(
    cafeteria_menu: &str,
    weather: &Weather,
    rng: &mut R,
) -> Vec<NearbyCandidate> {
    let mut candidates = vec![
        candidate("place_korean_1", "프리미엄 한식당", "한식", 10, &[
            "한정식", "불고기정식", "제육볶음", "갈비찜",
        ]),
        candidate("place_korean_2", "김치찌개 전문점", "한식", 5, &[
            "김치찌개", "순두부찌개", "된장찌개", "부대찌개",
        ]),
        candidate("place_korean_3", "국밥집", "한식", 7, &[
            "사골국밥", "설렁탕", "갈비탕", "육개장",
        ]),
        candidate("place_japanese_1", "스시로", "일식", 6, &[
            "초밥", "모둠초밥", "연어덮밥", "회",
        ]),
        candidate("place_japanese_2", "돈까스 전문점", "일식", 8, &[
            "돈까스", "치즈돈까스", "생선까스", "우동",
        ]),
        candidate("place_japanese_3", "라멘야", "일식", 9, &[
            "라멘", "돈코츠라멘", "미소라멘", "차슈라멘",
        ]),
    ];

    if cafeteria_menu.contains("파스타") || cafeteria_menu.contains("스파게티") {
        candidates.extend([
            candidate("place_italian_1", "트러플 이탈리안", "양식", 8, &[
                "트러플 파스타", "봉골레 파스타", "까르보나라", "해산물 파스타",
            ]),
            candidate("place_italian_2", "파스타 하우스", "양식", 6, &[
                "크림 파스타", "토마토 파스타", "오일 파스타", "로제 파스타",
            ]),
            candidate("place_italian_3", "이탈리안 키친", "양식", 10, &[
                "리조또", "피자", "샐러드", "파스타",
            ]),
        ]);
    } else {
        candidates.extend([
            candidate("place_western_1", "스테이크 하우스", "양식", 12, &[
                "스테이크", "함박스테이크", "파스타", "샐러드",
            ]),
            candidate("place_western_2", "샐러드 바", "양식", 5, &[
                "샐러드", "그레인볼", "포케", "샌드위치",
            ]),
        ]);
    }

    candidates.extend([
        candidate("place_chinese_1", "차이나타운", "중식", 9, &[
            "짜장면", "짬뽕", "볶음밥", "탕수육",
        ]),
        candidate("place_chinese_2", "마라탕 전문점", "중식", 7, &[
            "마라탕", "마라샹궈", "꿔바로우", "양꼬치",
        ]),
        candidate("place_snack_1", "분식천국", "분식", 3, &[
            "떡볶이", "김밥", "라면", "순대", "튀김",
        ]),
    ]);

    if weather.temperature > 25.0 {
        candidates.push(candidate("place_cold_1", "냉면 전문점", "한식", 6, &[
            "평양냉면", "비빔냉면", "물냉면", "막국수",
        ]));
    } else if weather.temperature < 10.0 {
        candidates.push(candidate("place_hot_1", "전골&찌개", "한식", 7, &[
            "부대찌개", "김치찌개", "전골", "곱창전골",
        ]));
    }

    if weather.sky_condition.contains('비')
        || weather.sky_condition.contains('눈')
        || weather.precipitation == "비"
    {
        candidates.push(candidate("place_rainy_1", "부침개 전문점", "한식", 4, &[
            "파전", "김치전", "해물파전", "막걸리",
        ]));
    }

    candidates.shuffle(rng);
    candidates
}

fn candidate(
    place_id: &str,
    name: &str,
    category: &str,
    minutes_away: u32,
    menu_examples: &[&str],
) -> NearbyCandidate {
    NearbyCandidate {
        place_id: place_id.to_string(),
        name: name.to_string(),
        category: category.to_string(),
        minutes_away,
        menu_examples: menu_examples.iter().map(|m| m.to_string()).collect(),
    }
}
