use std::collections::HashMap;

use strsim::jaro_winkler;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalItem {
    pub item_number: String,
    pub description: String,
    pub sku: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreRecord {
    pub code: String,
    pub name: String,
}

/// Resolves raw item numbers or SKUs to the canonical item.
pub trait ItemLookup {
    fn lookup_item(&self, code: &str) -> Option<CanonicalItem>;
}

/// Resolves store codes and (possibly misspelled) store names.
pub trait StoreLookup {
    fn store_by_code(&self, code: &str) -> Option<StoreRecord>;

    /// Exact (case-insensitive) name match first, then the best fuzzy match
    /// scoring at least `threshold` (Jaro-Winkler, 0.0..=1.0).
    fn search_store_name(&self, name: &str, threshold: f64) -> Option<StoreRecord>;
}

#[derive(Debug, Clone, Default)]
pub struct ItemDictionary {
    by_number: HashMap<String, CanonicalItem>,
    /// SKU -> canonical item number key.
    by_sku: HashMap<String, String>,
}

#[derive(Debug, Clone, Default)]
pub struct StoreDictionary {
    by_code: HashMap<String, StoreRecord>,
}

/// Immutable lookup tables. Published as a whole by `DictionaryService`.
#[derive(Debug, Clone, Default)]
pub struct Dictionaries {
    pub items: ItemDictionary,
    pub stores: StoreDictionary,
}

// --

fn key(code: &str) -> String {
    code.trim().to_ascii_lowercase()
}

impl ItemDictionary {
    pub fn new(items: impl IntoIterator<Item = CanonicalItem>) -> Self {
        let mut dictionary = Self::default();
        for item in items {
            dictionary.insert(item);
        }
        dictionary
    }

    pub fn insert(&mut self, item: CanonicalItem) {
        let number_key = key(&item.item_number);
        if !item.sku.trim().is_empty() {
            self.by_sku.insert(key(&item.sku), number_key.clone());
        }
        self.by_number.insert(number_key, item);
    }

    pub fn len(&self) -> usize {
        self.by_number.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_number.is_empty()
    }
}

impl StoreDictionary {
    pub fn new(stores: impl IntoIterator<Item = StoreRecord>) -> Self {
        Self {
            by_code: stores.into_iter().map(|s| (key(&s.code), s)).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.by_code.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_code.is_empty()
    }
}

impl ItemLookup for ItemDictionary {
    fn lookup_item(&self, code: &str) -> Option<CanonicalItem> {
        let k = key(code);
        if k.is_empty() {
            return None;
        }
        self.by_number
            .get(&k)
            .or_else(|| self.by_sku.get(&k).and_then(|n| self.by_number.get(n)))
            .cloned()
    }
}

impl StoreLookup for StoreDictionary {
    fn store_by_code(&self, code: &str) -> Option<StoreRecord> {
        self.by_code.get(&key(code)).cloned()
    }

    fn search_store_name(&self, name: &str, threshold: f64) -> Option<StoreRecord> {
        let wanted = key(name);
        if wanted.is_empty() {
            return None;
        }
        if let Some(exact) = self.by_code.values().find(|s| key(&s.name) == wanted) {
            return Some(exact.clone());
        }
        self.by_code
            .values()
            .map(|s| (jaro_winkler(&key(&s.name), &wanted), s))
            .filter(|(score, _)| *score >= threshold)
            // Ties resolved by code so the result does not depend on map order.
            .max_by(|(a, sa), (b, sb)| a.total_cmp(b).then_with(|| sb.code.cmp(&sa.code)))
            .map(|(_, s)| s.clone())
    }
}

impl ItemLookup for Dictionaries {
    fn lookup_item(&self, code: &str) -> Option<CanonicalItem> {
        self.items.lookup_item(code)
    }
}

impl StoreLookup for Dictionaries {
    fn store_by_code(&self, code: &str) -> Option<StoreRecord> {
        self.stores.store_by_code(code)
    }

    fn search_store_name(&self, name: &str, threshold: f64) -> Option<StoreRecord> {
        self.stores.search_store_name(name, threshold)
    }
}
