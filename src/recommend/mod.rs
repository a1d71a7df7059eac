//! Recommendation finalization core.
//!
//! Pure-data pipeline over batches the AI (or rule-based) provider already
//! produced: classify the source menu, drop repeats, repair the
//! upgrade/substitute/exception taxonomy, bound the batch at three entries
//! and remember it. No I/O happens here and nothing in this module fails;
//! sparse or malformed input degrades to smaller (or repeated) batches.

pub mod dedupe;
pub mod history;
pub mod repair;
pub mod taxonomy;

pub use dedupe::{dedupe, DedupeResult};
pub use history::{HistoryStore, InMemoryHistory};
pub use repair::repair;
pub use taxonomy::Taxonomy;

use std::collections::HashSet;

use crate::models::{ExclusionKey, Recommendation};

/// Finalized batches never exceed three entries.
pub const MAX_RECOMMENDATIONS: usize = 3;

/// Runs a raw batch through dedup, taxonomy repair and the size bound, then
/// records the result as the new history.
pub struct Finalizer<'a> {
    taxonomy: &'a Taxonomy,
    history: &'a dyn HistoryStore,
}

impl<'a> Finalizer<'a> {
    pub fn new(taxonomy: &'a Taxonomy, history: &'a dyn HistoryStore) -> Self {
        Self { taxonomy, history }
    }

    /// Finalizes a batch.
    ///
    /// `extra_exclusions` widens the exclusion set for this call only (keys
    /// already used by the daily-menu stream, for example); the keys
    /// themselves are never persisted. History is written exactly once,
    /// after the batch is fully computed.
    pub fn finalize(
        &self,
        source_menu: &str,
        raw: Vec<Recommendation>,
        extra_exclusions: &[ExclusionKey],
    ) -> Vec<Recommendation> {
        let mut excluded: HashSet<ExclusionKey> = self
            .history
            .current()
            .iter()
            .map(Recommendation::exclusion_key)
            .collect();
        excluded.extend(extra_exclusions.iter().cloned());

        let deduped = dedupe(raw, &excluded);
        if deduped.fallback {
            tracing::warn!(
                source_menu = %source_menu,
                "Every candidate collided with history; keeping the unfiltered batch"
            );
        }

        let mut finalized = repair(self.taxonomy, source_menu, deduped.entries);
        finalized.truncate(MAX_RECOMMENDATIONS);

        self.history.record(finalized.clone());
        finalized
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Slot;

    fn rec(slot: Slot, restaurant: &str, menu: &str) -> Recommendation {
        Recommendation {
            slot,
            restaurant_name: restaurant.to_string(),
            menu_name: menu.to_string(),
            place_id: String::new(),
            minutes_away: 5,
            reason: String::new(),
            price_range: String::new(),
            search_query: String::new(),
            alt_queries: vec![],
            category_code: String::new(),
        }
    }

    #[test]
    fn test_finalized_batch_is_persisted_exactly() {
        let taxonomy = Taxonomy::korean_v1();
        let history = InMemoryHistory::new();
        let finalizer = Finalizer::new(&taxonomy, &history);

        let raw = vec![
            rec(Slot::Upgrade, "전골&찌개", "김치전골"),
            rec(Slot::Substitute, "돈까스 전문점", "돈까스"),
        ];

        let finalized = finalizer.finalize("김치찌개", raw, &[]);

        assert_eq!(history.current(), finalized);
    }

    #[test]
    fn test_size_bound_holds_for_oversized_input() {
        let taxonomy = Taxonomy::korean_v1();
        let history = InMemoryHistory::new();
        let finalizer = Finalizer::new(&taxonomy, &history);

        let raw: Vec<Recommendation> = (0..10)
            .map(|i| rec(Slot::Substitute, &format!("식당 {i}"), &format!("메뉴 {i}")))
            .collect();

        let finalized = finalizer.finalize("김치찌개", raw, &[]);

        assert!(finalized.len() <= MAX_RECOMMENDATIONS);
        assert_eq!(history.current().len(), finalized.len());
    }

    #[test]
    fn test_previous_batch_is_excluded_on_the_next_call() {
        let taxonomy = Taxonomy::korean_v1();
        let history = InMemoryHistory::new();
        let finalizer = Finalizer::new(&taxonomy, &history);

        let first = finalizer.finalize(
            "김치찌개",
            vec![rec(Slot::Upgrade, "전골&찌개", "김치전골")],
            &[],
        );
        assert_eq!(first.len(), 1);

        let second = finalizer.finalize(
            "김치찌개",
            vec![
                rec(Slot::Upgrade, "전골&찌개", "김치전골"),
                rec(Slot::Substitute, "국밥집", "순대국밥"),
            ],
            &[],
        );

        assert!(second.iter().all(|r| r.menu_name != "김치전골"));
        assert_eq!(second.len(), 1);
    }

    #[test]
    fn test_extra_exclusions_apply_but_are_not_persisted() {
        let taxonomy = Taxonomy::korean_v1();
        let history = InMemoryHistory::new();
        let finalizer = Finalizer::new(&taxonomy, &history);

        let daily_key = ExclusionKey {
            restaurant_name: "라멘야".to_string(),
            menu_name: "라멘".to_string(),
        };

        let finalized = finalizer.finalize(
            "된장찌개",
            vec![
                rec(Slot::Substitute, "라멘야", "라멘"),
                rec(Slot::Substitute, "국밥집", "곰탕"),
            ],
            &[daily_key.clone()],
        );

        assert!(finalized.iter().all(|r| r.exclusion_key() != daily_key));
        // Only the surviving batch lands in history, not the virtual keys.
        assert_eq!(history.current(), finalized);
    }

    #[test]
    fn test_all_colliding_batch_still_produces_and_records_output() {
        let taxonomy = Taxonomy::korean_v1();
        let history = InMemoryHistory::new();
        let finalizer = Finalizer::new(&taxonomy, &history);

        let raw = vec![rec(Slot::Substitute, "국밥집", "곰탕")];
        finalizer.finalize("곰탕", raw.clone(), &[]);

        // Same batch again: everything collides, fallback keeps it anyway.
        let second = finalizer.finalize("곰탕", raw, &[]);

        assert_eq!(second.len(), 1);
        assert_eq!(history.current(), second);
    }

    #[test]
    fn test_repair_runs_inside_finalization() {
        let taxonomy = Taxonomy::korean_v1();
        let history = InMemoryHistory::new();
        let finalizer = Finalizer::new(&taxonomy, &history);

        let finalized = finalizer.finalize(
            "김치찌개",
            vec![
                rec(Slot::Upgrade, "프리미엄 한식당", "제육볶음"),
                rec(Slot::Substitute, "김치찌개 전문점", "부대찌개"),
            ],
            &[],
        );

        assert_eq!(finalized[0].slot, Slot::Upgrade);
        assert_eq!(finalized[0].menu_name, "부대찌개");
    }
}
