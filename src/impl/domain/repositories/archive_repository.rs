use std::path::{Path, PathBuf};

use async_trait::async_trait;
use fractic_server_error::ServerError;

use crate::entities::{ArchiveData, ArchiveInfo};

#[async_trait]
pub trait ArchiveRepository: Send + Sync + 'static {
    async fn save(&self, data: &ArchiveData) -> Result<PathBuf, ServerError>;

    async fn load(&self, path: &Path) -> Result<ArchiveData, ServerError>;

    /// Readable archives, newest modification time first.
    async fn list(&self) -> Result<Vec<ArchiveInfo>, ServerError>;

    /// The archive with the newest modification time, if any.
    async fn most_recent(&self) -> Result<Option<ArchiveData>, ServerError>;

    async fn delete(&self, path: &Path) -> Result<(), ServerError>;
}
