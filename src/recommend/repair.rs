use crate::models::{Recommendation, Slot};

use super::taxonomy::Taxonomy;
use super::MAX_RECOMMENDATIONS;

/// Corrective reclassification for broth-based source menus.
///
/// An upgrade to a soup/stew menu must itself stay in the broth class, and
/// within the same cuisine: stir-fries, cutlets and rice bowls drop to the
/// substitute slot, as does the mala family even though those are broths.
/// When no valid upgrade survives, the first qualifying substitute (then
/// exception) is promoted in its place. An empty upgrade bucket is a valid
/// terminal state; this pass never fails.
///
/// Non-broth source menus pass through unmodified.
pub fn repair(
    taxonomy: &Taxonomy,
    source_menu: &str,
    recommendations: Vec<Recommendation>,
) -> Vec<Recommendation> {
    if !taxonomy.is_soup_class(source_menu) {
        return recommendations;
    }

    let mut substitutes = Vec::new();
    let mut others = Vec::new();
    let mut upgrades = Vec::new();
    for rec in recommendations {
        match rec.slot {
            Slot::Upgrade => upgrades.push(rec),
            Slot::Substitute => substitutes.push(rec),
            Slot::Exception => others.push(rec),
        }
    }

    let mut valid_upgrades = Vec::new();
    for rec in upgrades {
        // Dry preparation masquerading as an upgrade
        if taxonomy.is_dry_preparation(&rec.menu_name) {
            substitutes.push(rec.with_slot(Slot::Substitute));
            continue;
        }
        // Mala-family broth: wrong cuisine for the upgrade slot
        if taxonomy.is_foreign_spicy_broth(&rec.menu_name) {
            substitutes.push(rec.with_slot(Slot::Substitute));
            continue;
        }
        valid_upgrades.push(rec);
    }

    // Backfill: promote the first candidate that would itself survive the
    // checks above, substitutes before exceptions. Requiring full upgrade
    // eligibility keeps a just-demoted 마라탕 (which matches 탕) from
    // bouncing straight back into the slot it was removed from. No
    // candidate leaves the upgrade bucket empty.
    if valid_upgrades.is_empty() {
        let qualifies = |r: &Recommendation| {
            taxonomy.is_soup_class(&r.menu_name)
                && !taxonomy.is_dry_preparation(&r.menu_name)
                && !taxonomy.is_foreign_spicy_broth(&r.menu_name)
        };

        if let Some(pos) = substitutes.iter().position(|r| qualifies(r)) {
            let promoted = substitutes.remove(pos);
            valid_upgrades.push(promoted.with_slot(Slot::Upgrade));
        } else if let Some(pos) = others.iter().position(|r| qualifies(r)) {
            let promoted = others.remove(pos);
            valid_upgrades.push(promoted.with_slot(Slot::Upgrade));
        }
    }

    let mut repaired = valid_upgrades;
    repaired.append(&mut substitutes);
    repaired.append(&mut others);
    repaired.truncate(MAX_RECOMMENDATIONS);
    repaired
}
