use std::path::Path;

use chrono::NaiveDateTime;
use serde_derive::{Deserialize, Serialize};

use crate::entities::{ArchiveData, ArchiveInfo, ItemAllocation, LocationAllocation};

/// On-disk archive shape. `IsActive` and `Pool` are optional extensions; files
/// without them still load.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct ArchiveModel {
    pub name: String,
    #[serde(default)]
    pub notes: String,
    pub archived_at: NaiveDateTime,
    #[serde(default)]
    pub total_items: u64,
    #[serde(default)]
    pub location_count: usize,
    #[serde(default)]
    pub locations: Vec<ArchiveLocationModel>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub pool: Vec<ArchiveItemModel>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct ArchiveLocationModel {
    pub location: String,
    #[serde(default)]
    pub location_name: Option<String>,
    #[serde(default)]
    pub items: Vec<ArchiveItemModel>,
    #[serde(default = "default_active", skip_serializing_if = "is_active")]
    pub is_active: bool,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct ArchiveItemModel {
    pub item_number: String,
    #[serde(default)]
    pub description: String,
    pub quantity: u32,
    #[serde(rename = "SKU", default)]
    pub sku: String,
}

fn default_active() -> bool {
    true
}

fn is_active(active: &bool) -> bool {
    *active
}

// --

impl From<&ArchiveData> for ArchiveModel {
    fn from(data: &ArchiveData) -> Self {
        Self {
            name: data.name.clone(),
            notes: data.notes.clone(),
            archived_at: data.archived_at,
            total_items: data.total_items(),
            location_count: data.location_count(),
            locations: data.locations.iter().map(Into::into).collect(),
            pool: data.pool.iter().map(Into::into).collect(),
        }
    }
}

impl From<ArchiveModel> for ArchiveData {
    fn from(model: ArchiveModel) -> Self {
        Self {
            name: model.name,
            notes: model.notes,
            archived_at: model.archived_at,
            locations: model.locations.into_iter().map(Into::into).collect(),
            pool: model.pool.into_iter().map(Into::into).collect(),
        }
    }
}

impl From<&LocationAllocation> for ArchiveLocationModel {
    fn from(location: &LocationAllocation) -> Self {
        Self {
            location: location.location.clone(),
            location_name: location.location_name.clone(),
            items: location.items.iter().map(Into::into).collect(),
            is_active: location.is_active,
        }
    }
}

impl From<ArchiveLocationModel> for LocationAllocation {
    fn from(model: ArchiveLocationModel) -> Self {
        Self {
            location: model.location,
            location_name: model.location_name,
            items: model.items.into_iter().map(Into::into).collect(),
            is_active: model.is_active,
        }
    }
}

impl From<&ItemAllocation> for ArchiveItemModel {
    fn from(item: &ItemAllocation) -> Self {
        Self {
            item_number: item.item_number.clone(),
            description: item.description.clone(),
            quantity: item.quantity,
            sku: item.sku.clone(),
        }
    }
}

impl From<ArchiveItemModel> for ItemAllocation {
    fn from(model: ArchiveItemModel) -> Self {
        ItemAllocation::new(model.item_number, model.description, model.sku, model.quantity)
    }
}

impl ArchiveModel {
    pub(crate) fn info(&self, path: &Path) -> ArchiveInfo {
        ArchiveInfo {
            path: path.to_path_buf(),
            name: self.name.clone(),
            notes: self.notes.clone(),
            archived_at: self.archived_at,
            total_items: self.total_items,
            location_count: self.location_count,
        }
    }
}
