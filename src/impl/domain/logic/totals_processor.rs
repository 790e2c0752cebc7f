use std::{
    cmp::Ordering,
    collections::{HashMap, HashSet},
};

use crate::{
    domain::logic::allocation_aggregate::AllocationAggregate,
    entities::{
        ItemAllocation, ItemAllocationView, ItemTotalSummary, LocationQuantity, TotalsSortMode,
    },
};

/// Derived views over the aggregate. Always recomputed from scratch.
pub(crate) struct TotalsProcessor<'a> {
    aggregate: &'a AllocationAggregate,
}

impl<'a> TotalsProcessor<'a> {
    pub(crate) fn new(aggregate: &'a AllocationAggregate) -> Self {
        Self { aggregate }
    }

    pub(crate) fn item_totals(&self, sort: TotalsSortMode) -> Vec<ItemTotalSummary> {
        let mut order: Vec<String> = Vec::new();
        let mut totals: HashMap<String, ItemTotalSummary> = HashMap::new();

        for location in self.aggregate.locations() {
            // Split SKU rows of one item still count as a single location.
            let mut counted: HashSet<String> = HashSet::new();
            for item in &location.items {
                let summary = summary_for(&mut totals, &mut order, item);
                summary.allocated += item.quantity as u64;
                if counted.insert(item_key(item)) {
                    summary.location_count += 1;
                }
            }
        }
        for item in self.aggregate.pool() {
            summary_for(&mut totals, &mut order, item).pool_remaining += item.quantity as u64;
        }

        let mut result: Vec<ItemTotalSummary> = order
            .into_iter()
            .filter_map(|k| totals.remove(&k))
            .collect();
        result.sort_by(|a, b| compare(a, b, sort));
        result
    }

    pub(crate) fn item_views(&self) -> Vec<ItemAllocationView> {
        let mut views: Vec<ItemAllocationView> = Vec::new();
        for location in self.aggregate.locations() {
            for item in &location.items {
                let idx = match views
                    .iter()
                    .position(|v| v.item_number.eq_ignore_ascii_case(item.item_number.trim()))
                {
                    Some(idx) => idx,
                    None => {
                        views.push(ItemAllocationView {
                            item_number: item.item_number.trim().to_string(),
                            description: item.description.clone(),
                            sku: item.sku.clone(),
                            locations: Vec::new(),
                            total: 0,
                        });
                        views.len() - 1
                    }
                };
                let view = &mut views[idx];
                view.total += item.quantity as u64;
                match view
                    .locations
                    .iter_mut()
                    .find(|l| l.location == location.location)
                {
                    Some(existing) => existing.quantity += item.quantity,
                    None => view.locations.push(LocationQuantity {
                        location: location.location.clone(),
                        location_name: location.location_name.clone(),
                        quantity: item.quantity,
                    }),
                }
            }
        }
        views
    }
}

fn item_key(item: &ItemAllocation) -> String {
    item.item_number.trim().to_ascii_lowercase()
}

fn summary_for<'m>(
    totals: &'m mut HashMap<String, ItemTotalSummary>,
    order: &mut Vec<String>,
    item: &ItemAllocation,
) -> &'m mut ItemTotalSummary {
    let key = item_key(item);
    let summary = totals.entry(key.clone()).or_insert_with(|| {
        order.push(key);
        ItemTotalSummary {
            item_number: item.item_number.trim().to_string(),
            description: String::new(),
            sku: String::new(),
            allocated: 0,
            location_count: 0,
            pool_remaining: 0,
        }
    });
    if summary.description.is_empty() {
        summary.description = item.description.clone();
    }
    if summary.sku.is_empty() {
        summary.sku = item.sku.clone();
    }
    summary
}

fn compare(a: &ItemTotalSummary, b: &ItemTotalSummary, sort: TotalsSortMode) -> Ordering {
    let by_number = || {
        a.item_number
            .to_lowercase()
            .cmp(&b.item_number.to_lowercase())
    };
    match sort {
        TotalsSortMode::QuantityAscending => a.allocated.cmp(&b.allocated).then_with(by_number),
        TotalsSortMode::QuantityDescending => b.allocated.cmp(&a.allocated).then_with(by_number),
        TotalsSortMode::NameAscending => a
            .description
            .to_lowercase()
            .cmp(&b.description.to_lowercase())
            .then_with(by_number),
        TotalsSortMode::NameDescending => b
            .description
            .to_lowercase()
            .cmp(&a.description.to_lowercase())
            .then_with(by_number),
        TotalsSortMode::ItemNumberAscending => by_number(),
        TotalsSortMode::ItemNumberDescending => by_number().reverse(),
    }
}
