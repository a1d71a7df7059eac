use std::collections::HashSet;

use crate::models::{ExclusionKey, Recommendation};

/// Outcome of a dedup pass.
#[derive(Debug, Clone)]
pub struct DedupeResult {
    pub entries: Vec<Recommendation>,
    /// True when every entry collided and the unfiltered input was returned
    /// instead.
    pub fallback: bool,
}

/// Drops entries colliding with the exclusion set or with an earlier entry
/// of the same batch, preserving order.
///
/// If nothing would survive, the original batch comes back unfiltered with
/// `fallback` set: showing a possible repeat beats showing nothing.
pub fn dedupe(batch: Vec<Recommendation>, excluded: &HashSet<ExclusionKey>) -> DedupeResult {
    if batch.is_empty() {
        return DedupeResult {
            entries: batch,
            fallback: false,
        };
    }

    let mut seen = HashSet::new();
    let filtered: Vec<Recommendation> = batch
        .iter()
        .filter(|rec| {
            let key = rec.exclusion_key();
            !excluded.contains(&key) && seen.insert(key)
        })
        .cloned()
        .collect();

    if filtered.is_empty() {
        DedupeResult {
            entries: batch,
            fallback: true,
        }
    } else {
        DedupeResult {
            entries: filtered,
            fallback: false,
        }
    }
}
