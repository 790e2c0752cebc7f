use std::fs;

use fractic_server_error::ServerError;

use crate::{
    data::models::delimiter_model::DelimiterModel,
    entities::{CanonicalItem, ItemDictionary, StoreDictionary, StoreRecord},
    errors::{InvalidDictionary, ReadError},
};

/// Item (`ItemNumber,Description,SKU`) and store (`Code,Name`) dictionaries.
/// The header row is optional.
pub(crate) trait DictionaryCsvDatasource {
    fn items_from_string(&self, s: &str) -> Result<ItemDictionary, ServerError>;

    fn stores_from_string(&self, s: &str) -> Result<StoreDictionary, ServerError>;

    fn items_from_file<P>(&self, path: P) -> Result<ItemDictionary, ServerError>
    where
        P: AsRef<std::path::Path>,
    {
        self.items_from_string(&fs::read_to_string(path).map_err(|e| ReadError::with_debug(&e))?)
    }

    fn stores_from_file<P>(&self, path: P) -> Result<StoreDictionary, ServerError>
    where
        P: AsRef<std::path::Path>,
    {
        self.stores_from_string(&fs::read_to_string(path).map_err(|e| ReadError::with_debug(&e))?)
    }
}

pub(crate) struct DictionaryCsvDatasourceImpl;

impl DictionaryCsvDatasourceImpl {
    pub(crate) fn new() -> Self {
        Self
    }

    fn records(&self, s: &str, dictionary: &str) -> Result<Vec<Vec<String>>, ServerError> {
        let s = s.trim_start_matches('\u{feff}');
        let mut rows = csv::ReaderBuilder::new()
            .delimiter(DelimiterModel::sniff(s).as_byte())
            .has_headers(false)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(s.as_bytes())
            .records()
            .map(|r| {
                r.map_err(|e| InvalidDictionary::with_debug(dictionary, &e))
                    .map(|r| r.iter().map(String::from).collect::<Vec<String>>())
            })
            .collect::<Result<Vec<_>, ServerError>>()?;
        rows.retain(|r| r.first().is_some_and(|c| !c.is_empty()));
        if rows.first().is_some_and(|r| is_header(&r[0])) {
            rows.remove(0);
        }
        Ok(rows)
    }
}

impl DictionaryCsvDatasource for DictionaryCsvDatasourceImpl {
    fn items_from_string(&self, s: &str) -> Result<ItemDictionary, ServerError> {
        Ok(ItemDictionary::new(self.records(s, "item")?.into_iter().map(
            |r| CanonicalItem {
                item_number: r[0].clone(),
                description: r.get(1).cloned().unwrap_or_default(),
                sku: r.get(2).cloned().unwrap_or_default(),
            },
        )))
    }

    fn stores_from_string(&self, s: &str) -> Result<StoreDictionary, ServerError> {
        Ok(StoreDictionary::new(self.records(s, "store")?.into_iter().map(
            |r| StoreRecord {
                code: r[0].clone(),
                name: r.get(1).cloned().unwrap_or_default(),
            },
        )))
    }
}

fn is_header(first_cell: &str) -> bool {
    let normalized: String = first_cell
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_ascii_lowercase();
    matches!(
        normalized.as_str(),
        "itemnumber" | "item" | "itemno" | "code" | "storecode" | "store" | "storenumber"
            | "location"
    )
}
