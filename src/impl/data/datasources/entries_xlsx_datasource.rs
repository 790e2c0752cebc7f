use std::fs;

use calamine::{open_workbook_auto, Data, Reader as _};
use fractic_server_error::ServerError;

use crate::{
    data::models::column_layout_model::ColumnLayoutModel,
    entities::AllocationEntry,
    errors::{ImportTooLarge, InvalidWorkbook, ReadError},
};

/// Excel workbooks (first worksheet only), rejected above `max_bytes` on disk.
pub(crate) trait EntriesXlsxDatasource {
    fn from_file<P>(&self, path: P) -> Result<Vec<AllocationEntry>, ServerError>
    where
        P: AsRef<std::path::Path>;
}

pub struct EntriesXlsxDatasourceImpl {
    max_bytes: usize,
}

impl EntriesXlsxDatasourceImpl {
    pub(crate) fn new(max_bytes: usize) -> Self {
        Self { max_bytes }
    }
}

impl EntriesXlsxDatasource for EntriesXlsxDatasourceImpl {
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
        let mut workbook = open_workbook_auto(path).map_err(|e| InvalidWorkbook::with_debug(&e))?;
        let sheet = workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or_else(InvalidWorkbook::new)?;
        let range = workbook
            .worksheet_range(&sheet)
            .map_err(|e| InvalidWorkbook::with_debug(&e))?;
        let rows = range
            .rows()
            .enumerate()
            .map(|(i, cells)| (i + 1, cells.iter().map(cell_text).collect()))
            .collect();
        ColumnLayoutModel::parse_rows(rows)
    }
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        // Integral floats are how Excel stores quantities and numeric codes.
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", *f as i64),
        Data::Int(i) => i.to_string(),
        other => other.to_string(),
    }
}
