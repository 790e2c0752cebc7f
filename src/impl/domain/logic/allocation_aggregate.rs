use crate::entities::{
    DeactivationRecord, ItemAllocation, LocationAllocation, UNASSIGNED_LOCATION,
};

/// In-memory allocation state: items assigned to locations plus the pool of
/// unassigned items.
///
/// Every move (`add_one`, `remove_one`, `move_from_pool`, `deactivate`,
/// `undo_deactivate`) conserves `pool + Σ locations` per item number. Only
/// `replace`, `clear` and `set_quantity` change totals.
#[derive(Debug, Clone, Default)]
pub struct AllocationAggregate {
    locations: Vec<LocationAllocation>,
    pool: Vec<ItemAllocation>,
    undo: Option<DeactivationRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UndoOutcome {
    pub location: String,
    /// Units held by the location when it was deactivated.
    pub requested: u64,
    /// Units actually moved back (capped by what was left in the pool).
    pub restored: u64,
}

impl AllocationAggregate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_parts(locations: Vec<LocationAllocation>, pool: Vec<ItemAllocation>) -> Self {
        Self {
            locations,
            pool,
            undo: None,
        }
    }

    // Queries.
    // ---

    pub fn locations(&self) -> &[LocationAllocation] {
        &self.locations
    }

    pub fn pool(&self) -> &[ItemAllocation] {
        &self.pool
    }

    pub fn location(&self, location: &str) -> Option<&LocationAllocation> {
        self.locations.iter().find(|l| l.is_location(location))
    }

    pub fn pending_undo(&self) -> Option<&DeactivationRecord> {
        self.undo.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty() && self.pool.is_empty()
    }

    pub fn pool_quantity(&self, item_number: &str) -> u64 {
        self.pool
            .iter()
            .filter(|p| p.is_item(item_number))
            .map(|p| p.quantity as u64)
            .sum()
    }

    /// Units of the item across all locations.
    pub fn allocated_quantity(&self, item_number: &str) -> u64 {
        self.locations
            .iter()
            .flat_map(|l| l.items.iter())
            .filter(|i| i.is_item(item_number))
            .map(|i| i.quantity as u64)
            .sum()
    }

    /// Pool plus locations. Conserved by every move operation.
    pub fn item_quantity(&self, item_number: &str) -> u64 {
        self.pool_quantity(item_number) + self.allocated_quantity(item_number)
    }

    pub fn total_allocated(&self) -> u64 {
        self.locations.iter().map(|l| l.total_quantity()).sum()
    }

    pub fn total_pooled(&self) -> u64 {
        self.pool.iter().map(|p| p.quantity as u64).sum()
    }

    // Whole-state changes.
    // ---

    /// Replaces locations and pool (import, archive load). Discards the undo
    /// record.
    pub fn replace(&mut self, locations: Vec<LocationAllocation>, pool: Vec<ItemAllocation>) {
        self.locations = locations;
        self.pool = pool;
        self.undo = None;
    }

    pub fn clear(&mut self) {
        self.replace(Vec::new(), Vec::new());
    }

    pub fn clear_flash(&mut self) {
        self.locations
            .iter_mut()
            .flat_map(|l| l.items.iter_mut())
            .chain(self.pool.iter_mut())
            .for_each(|i| i.just_updated = false);
    }

    // Moves.
    // ---

    /// Moves one unit from a location back to the pool. The location row is
    /// removed when it reaches zero.
    pub fn remove_one(&mut self, location: &str, item_number: &str) -> bool {
        let Some(loc_idx) = self.position(location) else {
            tracing::debug!(location, "remove_one: unknown location");
            return false;
        };
        let loc = &mut self.locations[loc_idx];
        let Some(item_idx) = loc
            .items
            .iter()
            .position(|i| i.is_item(item_number) && i.quantity > 0)
        else {
            tracing::debug!(location, item_number, "remove_one: nothing to remove");
            return false;
        };

        let unit = loc.items[item_idx].with_quantity(1);
        decrement(&mut loc.items, item_idx, 1);
        merge_into(&mut self.pool, unit, false);
        true
    }

    /// Moves one unit from the pool into `location`, or into the first active
    /// location when none is given (or it is unknown/inactive). An
    /// "Unassigned" location is created when no active location exists.
    pub fn add_one(&mut self, location: Option<&str>, item_number: &str) -> bool {
        let Some(pool_idx) = self.pool_position(item_number, None) else {
            tracing::debug!(item_number, "add_one: pool has no unit of item");
            return false;
        };
        let unit = self.pool[pool_idx].with_quantity(1);
        decrement(&mut self.pool, pool_idx, 1);

        let loc_idx = self.target_location(location);
        merge_into(&mut self.locations[loc_idx].items, unit, false);
        true
    }

    /// Moves up to `quantity` units of the item from the pool into the named
    /// location, creating it when missing. Returns the number of units moved.
    pub fn move_from_pool(&mut self, location: &str, item_number: &str, quantity: u32) -> u32 {
        if quantity == 0 {
            return 0;
        }
        let loc_idx = match self.position(location) {
            Some(idx) if !self.locations[idx].is_active => {
                tracing::debug!(location, "move_from_pool: location is inactive");
                return 0;
            }
            Some(idx) => idx,
            None if self.pool_quantity(item_number) == 0 => return 0,
            None => {
                self.locations
                    .push(LocationAllocation::new(location.trim(), None));
                self.locations.len() - 1
            }
        };

        let mut moved = 0;
        while moved < quantity {
            let Some(pool_idx) = self.pool_position(item_number, None) else {
                break;
            };
            let take = (quantity - moved).min(self.pool[pool_idx].quantity);
            let units = self.pool[pool_idx].with_quantity(take);
            decrement(&mut self.pool, pool_idx, take);
            merge_into(&mut self.locations[loc_idx].items, units, false);
            moved += take;
        }
        moved
    }

    /// Explicit user edit of a location row. Zero removes the row. This is the
    /// one per-item operation that does not conserve totals.
    pub fn set_quantity(&mut self, location: &str, item_number: &str, quantity: u32) -> bool {
        let Some(loc_idx) = self.position(location) else {
            return false;
        };
        let template = self.pool.iter().find(|p| p.is_item(item_number)).cloned();
        let loc = &mut self.locations[loc_idx];
        match loc.items.iter().position(|i| i.is_item(item_number)) {
            Some(idx) if quantity == 0 => {
                loc.items.remove(idx);
            }
            Some(idx) => {
                if loc.items[idx].quantity == quantity {
                    return false;
                }
                loc.items[idx].quantity = quantity;
                loc.items[idx].just_updated = true;
            }
            None if quantity == 0 => return false,
            None => {
                let mut row = template
                    .map(|t| t.with_quantity(quantity))
                    .unwrap_or_else(|| ItemAllocation::new(item_number.trim(), "", "", quantity));
                row.just_updated = true;
                loc.items.push(row);
            }
        }
        true
    }

    // Deactivation.
    // ---

    /// Moves every item of the location to the pool (merging by item number
    /// and SKU), marks it inactive and records a snapshot for undo. Replaces
    /// any earlier undo record.
    pub fn deactivate(&mut self, location: &str) -> bool {
        let Some(loc_idx) = self.position(location) else {
            return false;
        };
        let loc = &mut self.locations[loc_idx];
        if !loc.is_active {
            return false;
        }
        let items = std::mem::take(&mut loc.items);
        loc.is_active = false;
        let record = DeactivationRecord {
            location: loc.location.clone(),
            items: items.iter().map(|i| i.with_quantity(i.quantity)).collect(),
        };

        for item in items {
            merge_into(&mut self.pool, item.with_quantity(item.quantity), true);
        }
        self.undo = Some(record);
        true
    }

    /// Restores the most recent deactivation, capped by what is still in the
    /// pool. Consumes the undo record.
    pub fn undo_deactivate(&mut self) -> Option<UndoOutcome> {
        let record = self.undo.take()?;
        let Some(loc_idx) = self.position(&record.location) else {
            tracing::debug!(location = %record.location, "undo: location no longer exists");
            return None;
        };

        let mut requested: u64 = 0;
        let mut restored: u64 = 0;
        for snapshot in &record.items {
            requested += snapshot.quantity as u64;
            let mut remaining = snapshot.quantity;
            while remaining > 0 {
                let Some(pool_idx) = self
                    .pool_position(&snapshot.item_number, Some(&snapshot.sku))
                    .or_else(|| self.pool_position(&snapshot.item_number, None))
                else {
                    break;
                };
                let take = remaining.min(self.pool[pool_idx].quantity);
                decrement(&mut self.pool, pool_idx, take);
                remaining -= take;
            }
            let got = snapshot.quantity - remaining;
            if got > 0 {
                merge_into(
                    &mut self.locations[loc_idx].items,
                    snapshot.with_quantity(got),
                    true,
                );
                restored += got as u64;
            }
        }
        self.locations[loc_idx].is_active = true;

        Some(UndoOutcome {
            location: record.location,
            requested,
            restored,
        })
    }

    // Helpers.
    // ---

    fn position(&self, location: &str) -> Option<usize> {
        self.locations.iter().position(|l| l.is_location(location))
    }

    fn pool_position(&self, item_number: &str, sku: Option<&str>) -> Option<usize> {
        self.pool.iter().position(|p| {
            p.quantity > 0
                && match sku {
                    Some(sku) => p.is_item_and_sku(item_number, sku),
                    None => p.is_item(item_number),
                }
        })
    }

    fn target_location(&mut self, location: Option<&str>) -> usize {
        let named = location
            .and_then(|l| self.position(l))
            .filter(|idx| self.locations[*idx].is_active);
        if let Some(idx) = named.or_else(|| self.locations.iter().position(|l| l.is_active)) {
            return idx;
        }
        self.locations
            .push(LocationAllocation::new(UNASSIGNED_LOCATION, None));
        self.locations.len() - 1
    }
}

/// Adds `incoming` to the matching row of `list` (by item number, and SKU when
/// `match_sku`), or appends it. Row quantities saturate at `u32::MAX`.
fn merge_into(list: &mut Vec<ItemAllocation>, mut incoming: ItemAllocation, match_sku: bool) {
    let existing = list.iter_mut().find(|i| {
        if match_sku {
            i.is_item_and_sku(&incoming.item_number, &incoming.sku)
        } else {
            i.is_item(&incoming.item_number)
        }
    });
    match existing {
        Some(row) => {
            row.quantity = row.quantity.saturating_add(incoming.quantity);
            if row.description.is_empty() {
                row.description = incoming.description;
            }
            if row.sku.is_empty() {
                row.sku = incoming.sku;
            }
            row.just_updated = true;
        }
        None => {
            incoming.just_updated = true;
            list.push(incoming);
        }
    }
}

/// Subtracts from a row, removing it at zero. Caller guarantees `by <= qty`.
fn decrement(list: &mut Vec<ItemAllocation>, idx: usize, by: u32) {
    let row = &mut list[idx];
    row.quantity -= by;
    if row.quantity == 0 {
        list.remove(idx);
    } else {
        row.just_updated = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loc(code: &str, items: &[(&str, &str, u32)]) -> LocationAllocation {
        let mut l = LocationAllocation::new(code, None);
        l.items = items
            .iter()
            .map(|(n, s, q)| ItemAllocation::new(*n, format!("desc {}", n), *s, *q))
            .collect();
        l
    }

    fn sample() -> AllocationAggregate {
        AllocationAggregate::from_parts(
            vec![
                loc("S1", &[("I100", "A", 5), ("I200", "B", 1)]),
                loc("S2", &[("I100", "A", 3)]),
            ],
            vec![ItemAllocation::new("I300", "desc I300", "C", 2)],
        )
    }

    #[test]
    fn test_remove_one_at_quantity_one_removes_row_and_creates_pool_entry() {
        let mut agg = sample();
        assert!(agg.remove_one("S1", "I200"));
        assert!(agg.location("S1").unwrap().item("I200").is_none());
        let pooled = agg.pool().iter().find(|p| p.is_item("I200")).unwrap();
        assert_eq!(pooled.quantity, 1);
        assert!(pooled.just_updated);
    }

    #[test]
    fn test_remove_one_increments_existing_pool_entry_case_insensitive() {
        let mut agg = sample();
        assert!(agg.remove_one("s1", "i100"));
        assert!(agg.remove_one("S2", "I100"));
        assert_eq!(agg.pool_quantity("I100"), 2);
        assert_eq!(agg.pool().iter().filter(|p| p.is_item("I100")).count(), 1);
        assert_eq!(agg.location("S1").unwrap().item("I100").unwrap().quantity, 4);
    }

    #[test]
    fn test_remove_one_unknown_is_noop() {
        let mut agg = sample();
        assert!(!agg.remove_one("S9", "I100"));
        assert!(!agg.remove_one("S1", "I999"));
        assert_eq!(agg.total_pooled(), 2);
    }

    #[test]
    fn test_add_one_requires_pool_stock() {
        let mut agg = sample();
        assert!(!agg.add_one(Some("S1"), "I100"));
        assert!(agg.add_one(Some("S2"), "I300"));
        assert_eq!(agg.location("S2").unwrap().item("I300").unwrap().quantity, 1);
        assert_eq!(agg.pool_quantity("I300"), 1);
        assert!(agg.add_one(Some("S2"), "I300"));
        assert_eq!(agg.pool_quantity("I300"), 0);
        assert!(agg.pool().is_empty());
        assert!(!agg.add_one(Some("S2"), "I300"));
    }

    #[test]
    fn test_add_one_creates_unassigned_location_when_none_exists() {
        let mut agg = AllocationAggregate::from_parts(
            vec![],
            vec![ItemAllocation::new("I1", "", "", 1)],
        );
        assert!(agg.add_one(None, "I1"));
        let unassigned = agg.location(UNASSIGNED_LOCATION).unwrap();
        assert_eq!(unassigned.item("I1").unwrap().quantity, 1);
    }

    #[test]
    fn test_add_one_skips_inactive_target() {
        let mut agg = sample();
        agg.deactivate("S1");
        agg.undo = None;
        assert!(agg.add_one(Some("S1"), "I300"));
        assert!(agg.location("S1").unwrap().items.is_empty());
        assert_eq!(agg.location("S2").unwrap().item("I300").unwrap().quantity, 1);
    }

    #[test]
    fn test_move_from_pool_caps_at_available() {
        let mut agg = sample();
        assert_eq!(agg.move_from_pool("S3", "I300", 10), 2);
        assert_eq!(agg.location("S3").unwrap().item("I300").unwrap().quantity, 2);
        assert_eq!(agg.move_from_pool("S3", "I300", 1), 0);
        assert_eq!(agg.move_from_pool("S4", "I300", 1), 0);
        assert!(agg.location("S4").is_none());
    }

    #[test]
    fn test_moves_conserve_item_totals() {
        let mut agg = sample();
        let items = ["I100", "I200", "I300"];
        let stores = ["S1", "S2", "S3"];
        let before: Vec<u64> = items.iter().map(|i| agg.item_quantity(i)).collect();

        // Deterministic pseudo-random walk over add/remove.
        let mut seed: u64 = 0x5eed;
        for _ in 0..500 {
            seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            let item = items[(seed >> 33) as usize % items.len()];
            let store = stores[(seed >> 40) as usize % stores.len()];
            if (seed >> 50) % 2 == 0 {
                agg.add_one(Some(store), item);
            } else {
                agg.remove_one(store, item);
            }
            let after: Vec<u64> = items.iter().map(|i| agg.item_quantity(i)).collect();
            assert_eq!(before, after);
        }
    }

    #[test]
    fn test_deactivate_then_undo_restores_exactly() {
        let mut agg = sample();
        let original = agg.location("S1").unwrap().clone();

        assert!(agg.deactivate("S1"));
        let s1 = agg.location("S1").unwrap();
        assert!(!s1.is_active);
        assert!(s1.items.is_empty());
        assert_eq!(agg.pool_quantity("I100"), 5);
        assert_eq!(agg.pool_quantity("I200"), 1);

        let outcome = agg.undo_deactivate().unwrap();
        assert_eq!(outcome.requested, 6);
        assert_eq!(outcome.restored, 6);
        assert_eq!(agg.location("S1").unwrap(), &original);
        assert_eq!(agg.pool_quantity("I100"), 0);
        assert!(agg.pending_undo().is_none());
    }

    #[test]
    fn test_undo_is_capped_by_pool_consumption() {
        let mut agg = sample();
        agg.deactivate("S1");
        assert_eq!(agg.move_from_pool("S2", "I100", 4), 4);

        let outcome = agg.undo_deactivate().unwrap();
        assert_eq!(outcome.requested, 6);
        assert_eq!(outcome.restored, 2);
        let s1 = agg.location("S1").unwrap();
        assert_eq!(s1.item("I100").unwrap().quantity, 1);
        assert_eq!(s1.item("I200").unwrap().quantity, 1);
        assert_eq!(agg.pool_quantity("I100"), 0);
        assert_eq!(agg.item_quantity("I100"), 8);
    }

    #[test]
    fn test_second_deactivation_discards_previous_undo() {
        let mut agg = sample();
        agg.deactivate("S1");
        agg.deactivate("S2");
        assert_eq!(agg.undo_deactivate().unwrap().location, "S2");
        assert!(agg.undo_deactivate().is_none());
        assert!(!agg.location("S1").unwrap().is_active);
    }

    #[test]
    fn test_deactivate_merges_pool_by_item_and_sku() {
        let mut agg = AllocationAggregate::from_parts(
            vec![loc("S1", &[("I1", "X", 2)])],
            vec![
                ItemAllocation::new("I1", "", "Y", 1),
                ItemAllocation::new("I1", "", "X", 1),
            ],
        );
        agg.deactivate("S1");
        assert_eq!(agg.pool().len(), 2);
        assert_eq!(agg.pool()[1].quantity, 3);
    }

    #[test]
    fn test_deactivate_inactive_or_unknown_is_noop() {
        let mut agg = sample();
        assert!(!agg.deactivate("nope"));
        assert!(agg.deactivate("S2"));
        assert!(!agg.deactivate("S2"));
    }

    #[test]
    fn test_replace_discards_undo() {
        let mut agg = sample();
        agg.deactivate("S1");
        agg.replace(vec![loc("S1", &[])], vec![]);
        assert!(agg.undo_deactivate().is_none());
    }

    #[test]
    fn test_set_quantity_edits_and_removes() {
        let mut agg = sample();
        assert!(agg.set_quantity("S1", "I100", 9));
        assert_eq!(agg.location("S1").unwrap().item("I100").unwrap().quantity, 9);
        assert!(!agg.set_quantity("S1", "I100", 9));
        assert!(agg.set_quantity("S1", "I100", 0));
        assert!(agg.location("S1").unwrap().item("I100").is_none());
        assert!(agg.set_quantity("S1", "I300", 4));
        assert_eq!(agg.location("S1").unwrap().item("I300").unwrap().sku, "C");
    }

    #[test]
    fn test_clear_flash_resets_flags() {
        let mut agg = sample();
        agg.remove_one("S1", "I100");
        agg.clear_flash();
        assert!(agg
            .locations()
            .iter()
            .flat_map(|l| l.items.iter())
            .chain(agg.pool().iter())
            .all(|i| !i.just_updated));
    }

    #[test]
    fn test_merging_into_a_full_pool_row_saturates() {
        let mut agg = AllocationAggregate::from_parts(
            vec![loc("S1", &[("I100", "A", 3)])],
            vec![ItemAllocation::new("I100", "desc I100", "A", u32::MAX)],
        );
        assert!(agg.remove_one("S1", "I100"));
        assert_eq!(agg.pool_quantity("I100"), u32::MAX as u64);
        assert_eq!(agg.location("S1").unwrap().item("I100").unwrap().quantity, 2);
    }
}
