#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemTotalSummary {
    pub item_number: String,
    pub description: String,
    pub sku: String,
    /// Sum across all locations.
    pub allocated: u64,
    /// Number of distinct locations holding at least one unit.
    pub location_count: usize,
    pub pool_remaining: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationQuantity {
    pub location: String,
    pub location_name: Option<String>,
    pub quantity: u32,
}

/// The aggregate regrouped by item instead of by location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemAllocationView {
    pub item_number: String,
    pub description: String,
    pub sku: String,
    pub locations: Vec<LocationQuantity>,
    pub total: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde_derive::Serialize, serde_derive::Deserialize)]
pub enum TotalsSortMode {
    QuantityAscending,
    #[default]
    QuantityDescending,
    NameAscending,
    NameDescending,
    ItemNumberAscending,
    ItemNumberDescending,
}

// --

impl ItemTotalSummary {
    pub fn total(&self) -> u64 {
        self.allocated + self.pool_remaining
    }
}
