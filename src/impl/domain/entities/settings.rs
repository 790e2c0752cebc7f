use std::path::PathBuf;

use serde_derive::{Deserialize, Serialize};

use super::item_totals::TotalsSortMode;

pub const ARCHIVE_SUBDIRECTORY: &str = "Archives";
pub const DEFAULT_MAX_IMPORT_BYTES: usize = 10 * 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ClipboardSeparator {
    #[default]
    Tab,
    Comma,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AllocationSettings {
    /// Root of the per-user data directory; archives live in its `Archives`
    /// subfolder.
    pub data_dir: PathBuf,
    /// Upper bound on pasted or file-read text accepted by the importer.
    pub max_import_bytes: usize,
    pub clipboard_separator: ClipboardSeparator,
    pub default_sort: TotalsSortMode,
    /// Minimum Jaro-Winkler similarity for fuzzy store-name matches.
    pub fuzzy_store_threshold: f64,
    pub item_dictionary: Option<PathBuf>,
    pub store_dictionary: Option<PathBuf>,
}

// --

impl Default for AllocationSettings {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            max_import_bytes: DEFAULT_MAX_IMPORT_BYTES,
            clipboard_separator: ClipboardSeparator::default(),
            default_sort: TotalsSortMode::default(),
            fuzzy_store_threshold: 0.92,
            item_dictionary: None,
            store_dictionary: None,
        }
    }
}

impl AllocationSettings {
    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            ..Self::default()
        }
    }

    pub fn archive_dir(&self) -> PathBuf {
        self.data_dir.join(ARCHIVE_SUBDIRECTORY)
    }
}

impl ClipboardSeparator {
    pub fn as_char(&self) -> char {
        match self {
            ClipboardSeparator::Tab => '\t',
            ClipboardSeparator::Comma => ',',
        }
    }
}

fn default_data_dir() -> PathBuf {
    let base = std::env::var_os("LOCALAPPDATA")
        .map(PathBuf::from)
        .or_else(|| std::env::var_os("XDG_DATA_HOME").map(PathBuf::from))
        .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".local/share")))
        .unwrap_or_else(|| PathBuf::from("."));
    base.join("SOUP").join("AllocationBuddy")
}
