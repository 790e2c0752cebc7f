use std::{
    path::{Path, PathBuf},
    time::SystemTime,
};

use async_trait::async_trait;
use fractic_server_error::ServerError;
use regex::Regex;
use tokio::fs;

use crate::{
    data::models::archive_model::ArchiveModel,
    entities::{ArchiveData, ArchiveInfo},
    errors::{ArchiveDirectoryError, InvalidArchive, ReadError, WriteError},
};

/// Archive snapshots stored as one pretty-printed JSON file each.
#[async_trait]
pub(crate) trait ArchiveJsonDatasource: Send + Sync {
    /// Writes `data` into the archive directory, returning the new file path.
    async fn write(&self, data: &ArchiveData) -> Result<PathBuf, ServerError>;

    async fn read(&self, path: &Path) -> Result<(ArchiveData, ArchiveInfo), ServerError>;

    /// Archive files, newest modification time first.
    async fn list_files(&self) -> Result<Vec<PathBuf>, ServerError>;

    async fn delete(&self, path: &Path) -> Result<(), ServerError>;
}

pub struct ArchiveJsonDatasourceImpl {
    dir: PathBuf,
}

impl ArchiveJsonDatasourceImpl {
    pub(crate) fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    fn dir_error(&self, e: &std::io::Error) -> ServerError {
        ArchiveDirectoryError::with_debug(&self.dir.display().to_string(), e)
    }
}

#[async_trait]
impl ArchiveJsonDatasource for ArchiveJsonDatasourceImpl {
    async fn write(&self, data: &ArchiveData) -> Result<PathBuf, ServerError> {
        fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| self.dir_error(&e))?;
        let path = self.dir.join(file_name(data));
        let display = path.display().to_string();
        let json = serde_json::to_string_pretty(&ArchiveModel::from(data))
            .map_err(|e| WriteError::with_debug(&display, &e))?;
        fs::write(&path, json)
            .await
            .map_err(|e| WriteError::with_debug(&display, &e))?;
        Ok(path)
    }

    async fn read(&self, path: &Path) -> Result<(ArchiveData, ArchiveInfo), ServerError> {
        let text = fs::read_to_string(path)
            .await
            .map_err(|e| ReadError::with_debug(&e))?;
        let model: ArchiveModel = serde_json::from_str(&text)
            .map_err(|e| InvalidArchive::with_debug(&path.display().to_string(), &e))?;
        let info = model.info(path);
        Ok((model.into(), info))
    }

    async fn list_files(&self) -> Result<Vec<PathBuf>, ServerError> {
        if !fs::try_exists(&self.dir).await.unwrap_or(false) {
            return Ok(Vec::new());
        }
        let mut entries = fs::read_dir(&self.dir)
            .await
            .map_err(|e| self.dir_error(&e))?;
        let mut files: Vec<(SystemTime, PathBuf)> = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(|e| self.dir_error(&e))? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let modified = entry
                .metadata()
                .await
                .and_then(|m| m.modified())
                .unwrap_or(SystemTime::UNIX_EPOCH);
            files.push((modified, path));
        }
        // Names embed the timestamp, so they break mtime ties in creation order.
        files.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| b.1.cmp(&a.1)));
        Ok(files.into_iter().map(|(_, p)| p).collect())
    }

    async fn delete(&self, path: &Path) -> Result<(), ServerError> {
        fs::remove_file(path)
            .await
            .map_err(|e| WriteError::with_debug(&path.display().to_string(), &e))
    }
}

fn file_name(data: &ArchiveData) -> String {
    format!(
        "{}_{}.json",
        data.archived_at.format("%Y%m%d_%H%M%S_%3f"),
        safe_name(&data.name)
    )
}

/// Replaces characters that are invalid in Windows file names, and runs of
/// whitespace, with `_`.
pub(crate) fn safe_name(name: &str) -> String {
    let invalid =
        Regex::new(r#"[<>:"/\\|?*\x00-\x1f]|\s+"#).expect("hardcoded regex should be valid");
    let safe = invalid.replace_all(name.trim(), "_").into_owned();
    if safe.is_empty() {
        "Archive".to_string()
    } else {
        safe
    }
}
