use std::sync::{Mutex, MutexGuard};

use crate::models::Recommendation;

/// Store for the most recent finalized batch.
///
/// Read by the finalizer to build the exclusion set, overwritten after every
/// finalization. Degraded fallback batches are recorded too, so even a bad
/// day is not repeated tomorrow.
pub trait HistoryStore: Send + Sync {
    /// Replaces the stored batch. Last write wins.
    fn record(&self, batch: Vec<Recommendation>);

    /// Returns the most recent finalized batch, empty if none yet.
    fn current(&self) -> Vec<Recommendation>;
}

/// Single-slot in-memory store living for the process lifetime.
///
/// All callers currently share one slot. A multi-tenant deployment would
/// swap in a store keyed by session behind the same trait.
#[derive(Debug, Default)]
pub struct InMemoryHistory {
    slot: Mutex<Vec<Recommendation>>,
}

impl InMemoryHistory {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Recommendation>> {
        // A poisoned lock still holds a valid batch.
        self.slot.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl HistoryStore for InMemoryHistory {
    fn record(&self, batch: Vec<Recommendation>) {
        *self.lock() = batch;
    }

    fn current(&self) -> Vec<Recommendation> {
        self.lock().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Slot;

    fn rec(menu: &str) -> Recommendation {
        Recommendation {
            slot: Slot::Upgrade,
            restaurant_name: "국밥집".to_string(),
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
    fn test_starts_empty() {
        let history = InMemoryHistory::new();
        assert!(history.current().is_empty());
    }

    #[test]
    fn test_record_then_current_round_trips() {
        let history = InMemoryHistory::new();
        let batch = vec![rec("설렁탕"), rec("갈비탕")];

        history.record(batch.clone());

        assert_eq!(history.current(), batch);
    }

    #[test]
    fn test_last_write_wins() {
        let history = InMemoryHistory::new();

        history.record(vec![rec("설렁탕")]);
        history.record(vec![rec("육개장")]);

        let current = history.current();
        assert_eq!(current.len(), 1);
        assert_eq!(current[0].menu_name, "육개장");
    }
}
