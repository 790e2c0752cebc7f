use std::{path::Path, sync::Arc};

use fractic_server_error::ServerError;

use crate::{
    data::datasources::settings_ron_datasource::{
        SettingsRonDatasource as _, SettingsRonDatasourceImpl,
    },
    domain::{
        services::dictionary_service::{DictionaryService, DictionarySources},
        usecases::session_usecase::AllocationSession,
    },
    entities::{AllocationSettings, ConfirmationHandler},
};

/// Entry point for embedding applications: reads settings, owns the
/// dictionary service and opens sessions wired to the default file-backed
/// repositories.
pub struct AllocationBuddy {
    settings: AllocationSettings,
    dictionaries: Arc<DictionaryService>,
}

impl AllocationBuddy {
    pub fn new(settings: AllocationSettings) -> Self {
        Self {
            settings,
            dictionaries: Arc::new(DictionaryService::new()),
        }
    }

    /// Reads RON settings; a missing file yields the defaults.
    pub fn from_settings_file<P>(path: P) -> Result<Self, ServerError>
    where
        P: AsRef<Path>,
    {
        Ok(Self::new(SettingsRonDatasourceImpl::new().from_file(path)?))
    }

    pub fn save_settings<P>(&self, path: P) -> Result<(), ServerError>
    where
        P: AsRef<Path>,
    {
        SettingsRonDatasourceImpl::new().to_file(&self.settings, path)
    }

    pub fn settings(&self) -> &AllocationSettings {
        &self.settings
    }

    pub fn dictionaries(&self) -> &Arc<DictionaryService> {
        &self.dictionaries
    }

    /// Reloads the dictionaries named in the settings and waits for the
    /// result. Lookups keep using the previous tables when loading fails.
    pub async fn load_dictionaries(&self) -> Result<(), ServerError> {
        let sources = DictionarySources::from_settings(&self.settings);
        if sources.is_empty() {
            return Ok(());
        }
        self.dictionaries
            .reload(sources)
            .await
            .map_err(|e| crate::errors::BackgroundTaskFailed::with_debug("dictionary load", &e))?
    }

    /// New empty session.
    pub fn open_session<C>(&self, confirmer: C) -> AllocationSession<C>
    where
        C: ConfirmationHandler,
    {
        AllocationSession::new(self.settings.clone(), self.dictionaries.clone(), confirmer)
    }

    /// New session with the most recent archive restored, as on application
    /// startup.
    pub async fn resume_session<C>(&self, confirmer: C) -> AllocationSession<C>
    where
        C: ConfirmationHandler,
    {
        let mut session = self.open_session(confirmer);
        session.restore_last_session().await;
        session
    }
}
