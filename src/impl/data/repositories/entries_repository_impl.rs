use fractic_server_error::ServerError;

use crate::{
    data::datasources::{
        entries_csv_datasource::{EntriesCsvDatasource, EntriesCsvDatasourceImpl},
        entries_xlsx_datasource::{EntriesXlsxDatasource, EntriesXlsxDatasourceImpl},
    },
    domain::repositories::entries_repository::EntriesRepository,
    entities::AllocationEntry,
    errors::UnsupportedImportFile,
};

pub struct EntriesRepositoryImpl<
    DS1 = EntriesCsvDatasourceImpl,  // Default.
    DS2 = EntriesXlsxDatasourceImpl, // Default.
> where
    DS1: EntriesCsvDatasource,
    DS2: EntriesXlsxDatasource,
{
    csv_datasource: DS1,
    xlsx_datasource: DS2,
}

impl<DS1, DS2> EntriesRepository for EntriesRepositoryImpl<DS1, DS2>
where
    DS1: EntriesCsvDatasource + Send + Sync,
    DS2: EntriesXlsxDatasource + Send + Sync,
{
    fn from_string(&self, text: &str) -> Result<Vec<AllocationEntry>, ServerError> {
        self.csv_datasource.from_string(text)
    }

    fn from_file<P>(&self, path: P) -> Result<Vec<AllocationEntry>, ServerError>
    where
        P: AsRef<std::path::Path>,
    {
        let extension = path
            .as_ref()
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        match extension.as_deref() {
            Some("csv" | "tsv" | "txt") => self.csv_datasource.from_file(path),
            Some("xlsx" | "xlsm" | "xls") => self.xlsx_datasource.from_file(path),
            _ => Err(UnsupportedImportFile::new(
                &path.as_ref().display().to_string(),
            )),
        }
    }
}

impl EntriesRepositoryImpl<EntriesCsvDatasourceImpl, EntriesXlsxDatasourceImpl> {
    pub(crate) fn new(max_import_bytes: usize) -> Self {
        Self {
            csv_datasource: EntriesCsvDatasourceImpl::new(max_import_bytes),
            xlsx_datasource: EntriesXlsxDatasourceImpl::new(max_import_bytes),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dispatch_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let tsv = dir.path().join("alloc.TSV");
        std::fs::write(&tsv, "S1\tI100\t2\n").unwrap();
        let other = dir.path().join("alloc.pdf");
        std::fs::write(&other, "S1\tI100\t2\n").unwrap();

        let repo = EntriesRepositoryImpl::new(1024);
        assert_eq!(repo.from_file(&tsv).unwrap().len(), 1);
        assert!(repo.from_file(&other).is_err());
    }
}
