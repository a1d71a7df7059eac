/// Soup/stew/broth preparation class, `korean_v1` set.
///
/// Deliberately coarse: one keyword hit classifies the whole menu string,
/// because a missed repair is worse than an unnecessary one.
pub const KOREAN_SOUP_V1: &[&str] = &[
    "찌개", "국", "탕", "전골", "국밥", "설렁탕", "곰탕", "감자탕",
];

/// Dry preparations that must never sit in the upgrade slot of a broth menu,
/// `korean_v1` set.
pub const KOREAN_DRY_V1: &[&str] = &["볶음", "카츠", "까스", "돈까스", "제육", "덮밥", "구이"];

/// Chinese mala-style broths: technically soups, but outside the same-cuisine
/// constraint for Korean broth menus. `korean_v1` set.
pub const KOREAN_FOREIGN_SPICY_BROTH_V1: &[&str] = &["마라탕", "마라샹궈", "훠궈"];

/// Keyword sets driving menu classification and taxonomy repair.
///
/// Injected into the classifier and repair pass instead of living as module
/// globals, so tests can swap in another locale's sets without code change.
#[derive(Debug, Clone)]
pub struct Taxonomy {
    soup: Vec<String>,
    dry: Vec<String>,
    foreign_spicy_broth: Vec<String>,
}

impl Taxonomy {
    pub fn new<I, S>(soup: I, dry: I, foreign_spicy_broth: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            soup: soup.into_iter().map(Into::into).collect(),
            dry: dry.into_iter().map(Into::into).collect(),
            foreign_spicy_broth: foreign_spicy_broth.into_iter().map(Into::into).collect(),
        }
    }

    /// The default Korean taxonomy.
    pub fn korean_v1() -> Self {
        Self::new(
            KOREAN_SOUP_V1.iter().copied(),
            KOREAN_DRY_V1.iter().copied(),
            KOREAN_FOREIGN_SPICY_BROTH_V1.iter().copied(),
        )
    }

    /// Whether the menu string belongs to the soup/stew/broth class.
    ///
    /// Substring match, case-sensitive, OR-combined across keywords; a menu
    /// listing several dishes classifies as soup if any of them does.
    pub fn is_soup_class(&self, menu: &str) -> bool {
        contains_any(menu, &self.soup)
    }

    /// Whether the dish name is a dry preparation (stir-fry, cutlet, ...).
    pub fn is_dry_preparation(&self, menu_name: &str) -> bool {
        contains_any(menu_name, &self.dry)
    }

    /// Whether the dish name is a foreign spicy broth (mala family).
    pub fn is_foreign_spicy_broth(&self, menu_name: &str) -> bool {
        contains_any(menu_name, &self.foreign_spicy_broth)
    }
}

impl Default for Taxonomy {
    fn default() -> Self {
        Self::korean_v1()
    }
}

fn contains_any(text: &str, keywords: &[String]) -> bool {
    keywords.iter().any(|k| text.contains(k.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_korean_soup_menus_classify_as_soup() {
        let taxonomy = Taxonomy::korean_v1();

        assert!(taxonomy.is_soup_class("김치찌개"));
        assert!(taxonomy.is_soup_class("차돌된장찌개"));
        assert!(taxonomy.is_soup_class("설렁탕"));
        assert!(taxonomy.is_soup_class("사골국밥"));
        assert!(taxonomy.is_soup_class("곱창전골"));
    }

    #[test]
    fn test_dry_menus_do_not_classify_as_soup() {
        let taxonomy = Taxonomy::korean_v1();

        assert!(!taxonomy.is_soup_class("제육볶음"));
        assert!(!taxonomy.is_soup_class("돈까스"));
        assert!(!taxonomy.is_soup_class("연어덮밥"));
    }

    #[test]
    fn test_mixed_menu_string_classifies_on_any_hit() {
        let taxonomy = Taxonomy::korean_v1();

        // One broth dish among several is enough.
        assert!(taxonomy.is_soup_class("제육볶음, 된장국, 잡곡밥"));
    }

    #[test]
    fn test_classification_is_pure() {
        let taxonomy = Taxonomy::korean_v1();
        let menu = "부대찌개";

        assert_eq!(taxonomy.is_soup_class(menu), taxonomy.is_soup_class(menu));
    }

    #[test]
    fn test_dry_and_foreign_broth_membership() {
        let taxonomy = Taxonomy::korean_v1();

        assert!(taxonomy.is_dry_preparation("치즈돈까스"));
        assert!(taxonomy.is_dry_preparation("오징어볶음"));
        assert!(!taxonomy.is_dry_preparation("갈비탕"));

        assert!(taxonomy.is_foreign_spicy_broth("마라탕"));
        assert!(taxonomy.is_foreign_spicy_broth("마라샹궈"));
        assert!(!taxonomy.is_foreign_spicy_broth("김치찌개"));
    }

    #[test]
    fn test_custom_locale_sets_work_without_code_change() {
        let taxonomy = Taxonomy::new(
            vec!["stew", "soup", "hot-pot", "hotpot", "broth"],
            vec!["stir-fried", "cutlet", "grilled"],
            vec!["mala"],
        );

        assert!(taxonomy.is_soup_class("kimchi-stew"));
        assert!(taxonomy.is_soup_class("beef-hot-pot"));
        assert!(!taxonomy.is_soup_class("stir-fried-pork"));
        assert!(taxonomy.is_dry_preparation("pork cutlet"));
        assert!(taxonomy.is_foreign_spicy_broth("spicy mala hotpot"));
    }

    #[test]
    fn test_matching_is_case_sensitive() {
        let taxonomy = Taxonomy::new(vec!["stew"], vec!["cutlet"], vec!["mala"]);

        assert!(taxonomy.is_soup_class("kimchi stew"));
        assert!(!taxonomy.is_soup_class("Kimchi STEW"));
    }
}
