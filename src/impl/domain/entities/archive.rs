use std::path::PathBuf;

use chrono::NaiveDateTime;

use super::{item_allocation::ItemAllocation, location_allocation::LocationAllocation};

/// Named, timestamped snapshot of the full allocation state.
#[derive(Debug, Clone, PartialEq)]
pub struct ArchiveData {
    pub name: String,
    pub notes: String,
    pub archived_at: NaiveDateTime,
    pub locations: Vec<LocationAllocation>,
    pub pool: Vec<ItemAllocation>,
}

/// Archive file as seen in a directory listing.
#[derive(Debug, Clone, PartialEq)]
pub struct ArchiveInfo {
    pub path: PathBuf,
    pub name: String,
    pub notes: String,
    pub archived_at: NaiveDateTime,
    pub total_items: u64,
    pub location_count: usize,
}

// --

impl ArchiveData {
    /// Units held by locations (the pool is not counted, matching the
    /// `TotalItems` field of the file format).
    pub fn total_items(&self) -> u64 {
        self.locations.iter().map(|l| l.total_quantity()).sum()
    }

    pub fn location_count(&self) -> usize {
        self.locations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty() && self.pool.is_empty()
    }
}
