use std::path::{Path, PathBuf};

use async_trait::async_trait;
use fractic_server_error::ServerError;

use crate::{
    data::datasources::archive_json_datasource::{
        ArchiveJsonDatasource, ArchiveJsonDatasourceImpl,
    },
    domain::repositories::archive_repository::ArchiveRepository,
    entities::{ArchiveData, ArchiveInfo},
};

pub struct ArchiveRepositoryImpl<
    DS = ArchiveJsonDatasourceImpl, // Default.
> where
    DS: ArchiveJsonDatasource,
{
    datasource: DS,
}

#[async_trait]
impl<DS> ArchiveRepository for ArchiveRepositoryImpl<DS>
where
    DS: ArchiveJsonDatasource + 'static,
{
    async fn save(&self, data: &ArchiveData) -> Result<PathBuf, ServerError> {
        let path = self.datasource.write(data).await?;
        tracing::info!(
            name = %data.name,
            path = %path.display(),
            locations = data.location_count(),
            units = data.total_items(),
            "Archive written"
        );
        Ok(path)
    }

    async fn load(&self, path: &Path) -> Result<ArchiveData, ServerError> {
        Ok(self.datasource.read(path).await?.0)
    }

    async fn list(&self) -> Result<Vec<ArchiveInfo>, ServerError> {
        let mut infos = Vec::new();
        for path in self.datasource.list_files().await? {
            match self.datasource.read(&path).await {
                Ok((_, info)) => infos.push(info),
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = ?e, "Skipping unreadable archive")
                }
            }
        }
        Ok(infos)
    }

    async fn most_recent(&self) -> Result<Option<ArchiveData>, ServerError> {
        match self.datasource.list_files().await?.first() {
            Some(path) => Ok(Some(self.datasource.read(path).await?.0)),
            None => Ok(None),
        }
    }

    async fn delete(&self, path: &Path) -> Result<(), ServerError> {
        self.datasource.delete(path).await?;
        tracing::info!(path = %path.display(), "Archive deleted");
        Ok(())
    }
}

impl ArchiveRepositoryImpl<ArchiveJsonDatasourceImpl> {
    pub(crate) fn new<P: AsRef<Path>>(archive_dir: P) -> Self {
        Self {
            datasource: ArchiveJsonDatasourceImpl::new(archive_dir),
        }
    }
}
