use super::item_allocation::{same_code, ItemAllocation};

pub const UNKNOWN_LOCATION: &str = "Unknown";
pub const UNASSIGNED_LOCATION: &str = "Unassigned";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationAllocation {
    pub location: String,
    pub location_name: Option<String>,
    pub items: Vec<ItemAllocation>,
    pub is_active: bool,
}

/// Single-slot undo buffer for the latest store deactivation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeactivationRecord {
    pub location: String,
    pub items: Vec<ItemAllocation>,
}

// --

impl LocationAllocation {
    pub fn new(location: impl Into<String>, location_name: Option<String>) -> Self {
        Self {
            location: location.into(),
            location_name,
            items: Vec::new(),
            is_active: true,
        }
    }

    pub fn is_location(&self, location: &str) -> bool {
        same_code(&self.location, location)
    }

    pub fn item(&self, item_number: &str) -> Option<&ItemAllocation> {
        self.items.iter().find(|i| i.is_item(item_number))
    }

    pub fn item_mut(&mut self, item_number: &str) -> Option<&mut ItemAllocation> {
        self.items.iter_mut().find(|i| i.is_item(item_number))
    }

    pub fn total_quantity(&self) -> u64 {
        self.items.iter().map(|i| i.quantity as u64).sum()
    }

    /// Display label: "code - name" when a name is known.
    pub fn label(&self) -> String {
        match &self.location_name {
            Some(name) if !name.is_empty() => format!("{} - {}", self.location, name),
            _ => self.location.clone(),
        }
    }
}
