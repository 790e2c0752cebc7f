use fractic_server_error::ServerError;

use crate::{
    domain::logic::utils::non_blank,
    entities::{
        AllocationEntry, ItemAllocation, ItemLookup, LocationAllocation, StoreLookup,
        UNKNOWN_LOCATION,
    },
    errors::QuantityOverflow,
};

/// Turns parsed entries into locations: canonicalizes item numbers through the
/// item dictionary, resolves store names, and groups by store. Duplicate
/// (store, item) pairs are summed into one row.
pub(crate) struct ImportProcessor<'a, L: ItemLookup + StoreLookup> {
    lookup: &'a L,
    fuzzy_store_threshold: f64,
}

impl<'a, L: ItemLookup + StoreLookup> ImportProcessor<'a, L> {
    pub(crate) fn new(lookup: &'a L, fuzzy_store_threshold: f64) -> Self {
        Self {
            lookup,
            fuzzy_store_threshold,
        }
    }

    /// Fails when summing duplicate rows would overflow a quantity.
    pub(crate) fn process(
        &self,
        entries: Vec<AllocationEntry>,
    ) -> Result<Vec<LocationAllocation>, ServerError> {
        entries.into_iter().map(|e| self.canonicalize(e)).try_fold(
            Vec::new(),
            |mut locations: Vec<LocationAllocation>, (store, name, item)| {
                let idx = match locations.iter().position(|l| l.is_location(&store)) {
                    Some(idx) => idx,
                    None => {
                        locations.push(LocationAllocation::new(store, name.clone()));
                        locations.len() - 1
                    }
                };
                let location = &mut locations[idx];
                if location.location_name.is_none() {
                    location.location_name = name;
                }
                let location_code = location.location.clone();
                match location.item_mut(&item.item_number) {
                    Some(existing) => {
                        existing.quantity = existing
                            .quantity
                            .checked_add(item.quantity)
                            .ok_or_else(|| {
                                QuantityOverflow::new(&item.item_number, &location_code)
                            })?;
                        if existing.description.is_empty() {
                            existing.description = item.description;
                        }
                        if existing.sku.is_empty() {
                            existing.sku = item.sku;
                        }
                    }
                    None => location.items.push(item),
                }
                Ok(locations)
            },
        )
    }

    fn canonicalize(&self, entry: AllocationEntry) -> (String, Option<String>, ItemAllocation) {
        let (store, store_name) = self.resolve_store(&entry);
        let raw_number = entry.item_number.trim();
        let item = match self.lookup.lookup_item(raw_number) {
            Some(canonical) => ItemAllocation::new(
                canonical.item_number,
                if entry.description.trim().is_empty() {
                    canonical.description
                } else {
                    entry.description.trim().to_string()
                },
                if entry.sku.trim().is_empty() {
                    canonical.sku
                } else {
                    entry.sku.trim().to_string()
                },
                entry.quantity,
            ),
            None => ItemAllocation::new(
                raw_number,
                entry.description.trim(),
                entry.sku.trim(),
                entry.quantity,
            ),
        };
        (store, store_name, item)
    }

    /// Code lookup first, then name search (with the entry's store name, or
    /// the raw id when no name was given). A name hit only supplies the code
    /// when the entry has no store id. Unresolved stores keep their own id
    /// and name.
    fn resolve_store(&self, entry: &AllocationEntry) -> (String, Option<String>) {
        let id = non_blank(entry.store_id.as_deref());
        let name = non_blank(entry.store_name.as_deref());

        if let Some(record) = id.and_then(|id| self.lookup.store_by_code(id)) {
            return (record.code, Some(record.name));
        }
        if let Some(record) = name
            .or(id)
            .and_then(|n| self.lookup.search_store_name(n, self.fuzzy_store_threshold))
        {
            let code = id.map(String::from).unwrap_or(record.code);
            return (code, Some(record.name));
        }
        match (id, name) {
            (Some(id), name) => (id.to_string(), name.map(Into::into)),
            (None, Some(name)) => (name.to_string(), Some(name.to_string())),
            (None, None) => (UNKNOWN_LOCATION.to_string(), None),
        }
    }
}
