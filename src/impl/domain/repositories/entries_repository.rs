use fractic_server_error::ServerError;

use crate::entities::AllocationEntry;

pub trait EntriesRepository: Send + Sync {
    /// Parses pasted or already-read delimited text.
    fn from_string(&self, text: &str) -> Result<Vec<AllocationEntry>, ServerError>;

    /// Dispatches on the file extension (delimited text or Excel workbook).
    fn from_file<P>(&self, path: P) -> Result<Vec<AllocationEntry>, ServerError>
    where
        P: AsRef<std::path::Path>;
}
