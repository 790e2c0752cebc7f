use crate::{
    domain::logic::utils::contains_ignore_case,
    entities::{ItemAllocation, ItemTotalSummary, LocationAllocation},
};

/// Case-insensitive text filter applied to the bound collections.
pub(crate) struct SearchFilter {
    needle: String,
}

impl SearchFilter {
    pub(crate) fn new(query: &str) -> Self {
        Self {
            needle: query.trim().to_lowercase(),
        }
    }

    fn item_matches(&self, item: &ItemAllocation) -> bool {
        contains_ignore_case(&item.item_number, &self.needle)
            || contains_ignore_case(&item.description, &self.needle)
            || contains_ignore_case(&item.sku, &self.needle)
    }

    fn location_matches(&self, location: &LocationAllocation) -> bool {
        contains_ignore_case(&location.location, &self.needle)
            || location
                .location_name
                .as_deref()
                .is_some_and(|n| contains_ignore_case(n, &self.needle))
    }

    /// A location matching by code/name keeps all its items; otherwise only
    /// matching items are kept and locations left empty are dropped.
    pub(crate) fn locations(&self, locations: &[LocationAllocation]) -> Vec<LocationAllocation> {
        if self.needle.is_empty() {
            return locations.to_vec();
        }
        locations
            .iter()
            .filter_map(|l| {
                if self.location_matches(l) {
                    return Some(l.clone());
                }
                let items: Vec<ItemAllocation> = l
                    .items
                    .iter()
                    .filter(|i| self.item_matches(i))
                    .cloned()
                    .collect();
                if items.is_empty() {
                    return None;
                }
                Some(LocationAllocation {
                    location: l.location.clone(),
                    location_name: l.location_name.clone(),
                    items,
                    is_active: l.is_active,
                })
            })
            .collect()
    }

    pub(crate) fn totals(&self, totals: Vec<ItemTotalSummary>) -> Vec<ItemTotalSummary> {
        totals
            .into_iter()
            .filter(|t| {
                contains_ignore_case(&t.item_number, &self.needle)
                    || contains_ignore_case(&t.description, &self.needle)
                    || contains_ignore_case(&t.sku, &self.needle)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn locations() -> Vec<LocationAllocation> {
        let mut s1 = LocationAllocation::new("101", Some("Main Street".into()));
        s1.items = vec![
            ItemAllocation::new("I100", "Blue Widget", "0001", 2),
            ItemAllocation::new("I200", "Bolt", "0002", 1),
        ];
        let mut s2 = LocationAllocation::new("102", Some("Harbor".into()));
        s2.items = vec![ItemAllocation::new("I300", "Anchor", "0003", 1)];
        vec![s1, s2]
    }

    #[test]
    fn test_empty_query_keeps_everything() {
        assert_eq!(SearchFilter::new("  ").locations(&locations()), locations());
    }

    #[test]
    fn test_location_match_keeps_all_items() {
        let filtered = SearchFilter::new("main").locations(&locations());
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].items.len(), 2);
    }

    #[test]
    fn test_item_match_keeps_only_matching_items() {
        let filtered = SearchFilter::new("WIDGET").locations(&locations());
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].items.len(), 1);
        assert_eq!(filtered[0].items[0].item_number, "I100");

        let by_sku = SearchFilter::new("0003").locations(&locations());
        assert_eq!(by_sku[0].location, "102");
    }
}
