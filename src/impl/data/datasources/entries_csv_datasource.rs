use std::fs;

use fractic_server_error::ServerError;

use crate::{
    data::models::{column_layout_model::ColumnLayoutModel, delimiter_model::DelimiterModel},
    entities::AllocationEntry,
    errors::{ImportTooLarge, InvalidCsv, ReadError},
};

/// Delimited text: CSV/TSV files and clipboard pastes.
pub(crate) trait EntriesCsvDatasource {
    fn from_string(&self, s: &str) -> Result<Vec<AllocationEntry>, ServerError>;

    fn from_file<P>(&self, path: P) -> Result<Vec<AllocationEntry>, ServerError>
    where
        P: AsRef<std::path::Path>;
}

pub struct EntriesCsvDatasourceImpl {
    max_bytes: usize,
}

impl EntriesCsvDatasourceImpl {
    pub(crate) fn new(max_bytes: usize) -> Self {
        Self { max_bytes }
    }
}

impl EntriesCsvDatasource for EntriesCsvDatasourceImpl {
    fn from_string(&self, s: &str) -> Result<Vec<AllocationEntry>, ServerError> {
        if s.len() > self.max_bytes {
            return Err(ImportTooLarge::new(s.len(), self.max_bytes));
        }
        let delimiter = DelimiterModel::sniff(s);
        let rows = csv::ReaderBuilder::new()
            .delimiter(delimiter.as_byte())
            .has_headers(false)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(s.as_bytes())
            .records()
            .enumerate()
            .map(|(i, r)| {
                r.map_err(|e| InvalidCsv::with_debug(&e))
                    .map(|r| (i + 1, r.iter().map(String::from).collect()))
            })
            .collect::<Result<Vec<_>, ServerError>>()?;
        ColumnLayoutModel::parse_rows(rows)
    }

    fn from_file<P>(&self, path: P) -> Result<Vec<AllocationEntry>, ServerError>
    where
        P: AsRef<std::path::Path>,
    {
        let size = fs::metadata(path.as_ref())
            .map_err(|e| ReadError::with_debug(&e))?
            .len() as usize;
        if size > self.max_bytes {
            return Err(ImportTooLarge::new(size, self.max_bytes));
        }
        let text = fs::read_to_string(path).map_err(|e| ReadError::with_debug(&e))?;
        // Excel-saved CSVs often start with a UTF-8 BOM.
        self.from_string(text.trim_start_matches('\u{feff}'))
    }
}
