use std::{
    path::PathBuf,
    sync::{Arc, Mutex, PoisonError},
};

use fractic_server_error::ServerError;
use tokio::{sync::watch, task::JoinHandle};
use tokio_util::sync::CancellationToken;

use crate::{
    data::datasources::dictionary_csv_datasource::{
        DictionaryCsvDatasource as _, DictionaryCsvDatasourceImpl,
    },
    entities::{AllocationSettings, Dictionaries, ItemDictionary, StoreDictionary},
    errors::{BackgroundTaskFailed, DictionaryLoadCancelled},
};

/// Dictionary CSV files to load. A missing path yields an empty table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DictionarySources {
    pub items: Option<PathBuf>,
    pub stores: Option<PathBuf>,
}

/// Owns the current item/store lookup tables.
///
/// Tables are replaced as a whole: readers hold an `Arc<Dictionaries>`
/// snapshot and never see a partially loaded table. Starting a reload cancels
/// the one still in flight, and a cancelled load never publishes.
pub struct DictionaryService {
    published: Arc<watch::Sender<Arc<Dictionaries>>>,
    /// Token of the newest reload. Held while swapping and while publishing.
    in_flight: Arc<Mutex<CancellationToken>>,
}

impl DictionarySources {
    pub fn from_settings(settings: &AllocationSettings) -> Self {
        Self {
            items: settings.item_dictionary.clone(),
            stores: settings.store_dictionary.clone(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_none() && self.stores.is_none()
    }
}

impl Default for DictionaryService {
    fn default() -> Self {
        Self::new()
    }
}

impl DictionaryService {
    pub fn new() -> Self {
        Self::with_dictionaries(Dictionaries::default())
    }

    pub fn with_dictionaries(dictionaries: Dictionaries) -> Self {
        let (tx, _) = watch::channel(Arc::new(dictionaries));
        Self {
            published: Arc::new(tx),
            in_flight: Arc::new(Mutex::new(CancellationToken::new())),
        }
    }

    pub fn current(&self) -> Arc<Dictionaries> {
        self.published.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<Dictionaries>> {
        self.published.subscribe()
    }

    /// Loads `sources` on a blocking worker and publishes the result. Must be
    /// called from within a tokio runtime.
    pub fn reload(&self, sources: DictionarySources) -> JoinHandle<Result<(), ServerError>> {
        let token = CancellationToken::new();
        {
            let mut newest = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
            std::mem::replace(&mut *newest, token.clone()).cancel();
        }

        let published = self.published.clone();
        let in_flight = self.in_flight.clone();
        tokio::spawn(async move {
            let loading = tokio::task::spawn_blocking(move || load(&sources));
            let dictionaries = tokio::select! {
                _ = token.cancelled() => None,
                joined = loading => Some(
                    joined.map_err(|e| BackgroundTaskFailed::with_debug("dictionary load", &e))??,
                ),
            };
            let Some(dictionaries) = dictionaries else {
                tracing::debug!("Dictionary load superseded");
                return Err(DictionaryLoadCancelled::new());
            };
            let (items, stores) = (dictionaries.items.len(), dictionaries.stores.len());
            {
                let _newest = in_flight.lock().unwrap_or_else(PoisonError::into_inner);
                if token.is_cancelled() {
                    tracing::debug!("Dictionary load superseded");
                    return Err(DictionaryLoadCancelled::new());
                }
                published.send_replace(Arc::new(dictionaries));
            }
            tracing::info!(items, stores, "Dictionaries reloaded");
            Ok(())
        })
    }
}

fn load(sources: &DictionarySources) -> Result<Dictionaries, ServerError> {
    let datasource = DictionaryCsvDatasourceImpl::new();
    Ok(Dictionaries {
        items: match &sources.items {
            Some(path) => datasource.items_from_file(path)?,
            None => ItemDictionary::default(),
        },
        stores: match &sources.stores {
            Some(path) => datasource.stores_from_file(path)?,
            None => StoreDictionary::default(),
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{ItemLookup as _, StoreLookup as _};

    fn sources(dir: &tempfile::TempDir) -> DictionarySources {
        let items = dir.path().join("items.csv");
        let stores = dir.path().join("stores.csv");
        std::fs::write(&items, "ItemNumber,Description,SKU\nI100,Widget,0001\n").unwrap();
        std::fs::write(&stores, "Code,Name\n101,Main Street\n").unwrap();
        DictionarySources {
            items: Some(items),
            stores: Some(stores),
        }
    }

    #[tokio::test]
    async fn test_reload_publishes_new_tables() {
        let dir = tempfile::tempdir().unwrap();
        let service = DictionaryService::new();
        let rx = service.subscribe();
        let before = service.current();
        assert!(before.items.is_empty());

        service.reload(sources(&dir)).await.unwrap().unwrap();

        assert!(rx.has_changed().unwrap());
        let after = service.current();
        assert_eq!(after.lookup_item("0001").unwrap().item_number, "I100");
        assert_eq!(after.store_by_code("101").unwrap().name, "Main Street");
        // Earlier snapshots are unaffected.
        assert!(before.items.is_empty());
    }

    #[tokio::test]
    async fn test_superseded_load_never_publishes() {
        let dir = tempfile::tempdir().unwrap();
        let service = DictionaryService::new();
        let first = service.reload(sources(&dir));
        let second = service.reload(DictionarySources::default());

        assert!(first.await.unwrap().is_err());
        second.await.unwrap().unwrap();
        assert!(service.current().items.is_empty());
    }

    #[tokio::test]
    async fn test_failed_load_keeps_previous_tables() {
        let dir = tempfile::tempdir().unwrap();
        let service = DictionaryService::new();
        service.reload(sources(&dir)).await.unwrap().unwrap();

        let missing = DictionarySources {
            items: Some(dir.path().join("missing.csv")),
            stores: None,
        };
        assert!(service.reload(missing).await.unwrap().is_err());
        assert_eq!(service.current().items.len(), 1);
    }

    #[tokio::test]
    async fn test_newest_of_many_reloads_wins() {
        let dir = tempfile::tempdir().unwrap();
        let service = DictionaryService::new();
        let loaded = sources(&dir);
        let handles: Vec<_> = (0..8)
            .map(|i| {
                if i % 2 == 0 {
                    service.reload(DictionarySources::default())
                } else {
                    service.reload(loaded.clone())
                }
            })
            .collect();
        let results = futures::future::join_all(handles).await;

        assert!(results.last().unwrap().as_ref().unwrap().is_ok());
        assert_eq!(service.current().items.len(), 1);
        assert_eq!(service.current().stores.len(), 1);
    }
}
