use std::fs;

use fractic_server_error::ServerError;
use ron::{from_str, ser::PrettyConfig};

use crate::{
    entities::AllocationSettings,
    errors::{InvalidSettings, ReadError, WriteError},
};

pub(crate) trait SettingsRonDatasource {
    fn from_string(&self, s: &str) -> Result<AllocationSettings, ServerError>;

    /// A missing file yields defaults.
    fn from_file<P>(&self, path: P) -> Result<AllocationSettings, ServerError>
    where
        P: AsRef<std::path::Path>;

    fn to_file<P>(&self, settings: &AllocationSettings, path: P) -> Result<(), ServerError>
    where
        P: AsRef<std::path::Path>;
}

pub(crate) struct SettingsRonDatasourceImpl;

impl SettingsRonDatasourceImpl {
    pub(crate) fn new() -> Self {
        Self
    }
}

impl SettingsRonDatasource for SettingsRonDatasourceImpl {
    fn from_string(&self, s: &str) -> Result<AllocationSettings, ServerError> {
        from_str(s).map_err(|e| InvalidSettings::with_debug(&e))
    }

    fn from_file<P>(&self, path: P) -> Result<AllocationSettings, ServerError>
    where
        P: AsRef<std::path::Path>,
    {
        if !path.as_ref().exists() {
            return Ok(AllocationSettings::default());
        }
        self.from_string(&fs::read_to_string(path).map_err(|e| ReadError::with_debug(&e))?)
    }

    fn to_file<P>(&self, settings: &AllocationSettings, path: P) -> Result<(), ServerError>
    where
        P: AsRef<std::path::Path>,
    {
        let display = path.as_ref().display().to_string();
        let s = ron::ser::to_string_pretty(settings, PrettyConfig::default())
            .map_err(|e| WriteError::with_debug(&display, &e))?;
        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent).map_err(|e| WriteError::with_debug(&display, &e))?;
        }
        fs::write(path, s).map_err(|e| WriteError::with_debug(&display, &e))
    }
}
