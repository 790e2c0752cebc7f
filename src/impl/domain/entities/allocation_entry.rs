/// One parsed input row, before dictionary canonicalization and grouping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllocationEntry {
    pub store_id: Option<String>,
    pub store_name: Option<String>,
    pub item_number: String,
    pub description: String,
    pub sku: String,
    pub quantity: u32,
}

impl AllocationEntry {
    pub fn new(store_id: Option<&str>, item_number: &str, quantity: u32) -> Self {
        Self {
            store_id: store_id.map(Into::into),
            store_name: None,
            item_number: item_number.into(),
            description: String::new(),
            sku: String::new(),
            quantity,
        }
    }
}
