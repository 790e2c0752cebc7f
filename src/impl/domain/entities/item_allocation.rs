#[derive(Debug, Clone)]
pub struct ItemAllocation {
    pub item_number: String,
    pub description: String,
    pub sku: String,
    pub quantity: u32,
    /// Transient UI hint: set whenever an operation touched this row, reset by
    /// `AllocationAggregate::clear_flash`. Never persisted or compared.
    pub just_updated: bool,
}

// --

impl ItemAllocation {
    pub fn new(
        item_number: impl Into<String>,
        description: impl Into<String>,
        sku: impl Into<String>,
        quantity: u32,
    ) -> Self {
        Self {
            item_number: item_number.into(),
            description: description.into(),
            sku: sku.into(),
            quantity,
            just_updated: false,
        }
    }

    /// Copy of this row carrying a different quantity (and no flash flag).
    pub fn with_quantity(&self, quantity: u32) -> Self {
        Self {
            item_number: self.item_number.clone(),
            description: self.description.clone(),
            sku: self.sku.clone(),
            quantity,
            just_updated: false,
        }
    }

    /// Item numbers compare trimmed and case-insensitive.
    pub fn is_item(&self, item_number: &str) -> bool {
        same_code(&self.item_number, item_number)
    }

    pub fn is_item_and_sku(&self, item_number: &str, sku: &str) -> bool {
        self.is_item(item_number) && same_code(&self.sku, sku)
    }
}

impl PartialEq for ItemAllocation {
    fn eq(&self, other: &Self) -> bool {
        self.item_number == other.item_number
            && self.description == other.description
            && self.sku == other.sku
            && self.quantity == other.quantity
    }
}

impl Eq for ItemAllocation {}

pub(crate) fn same_code(a: &str, b: &str) -> bool {
    a.trim().eq_ignore_ascii_case(b.trim())
}
