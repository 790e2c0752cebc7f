use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileImportResult {
    pub path: PathBuf,
    pub entry_count: usize,
    pub error: Option<String>,
}

/// Per-file outcome of a multi-file import. A failed file never blocks the
/// others; state is replaced when at least one file produced entries and the
/// combined entries were accepted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportReport {
    pub files: Vec<FileImportResult>,
    pub summary: Option<ImportSummary>,
    /// Set when the combined entries of the parsed files were rejected.
    pub error: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub entries: usize,
    pub locations: usize,
    pub units: u64,
}

// --

impl ImportReport {
    pub fn succeeded(&self) -> impl Iterator<Item = &FileImportResult> {
        self.files.iter().filter(|f| f.error.is_none())
    }

    pub fn failed(&self) -> impl Iterator<Item = &FileImportResult> {
        self.files.iter().filter(|f| f.error.is_some())
    }

    pub fn is_success(&self) -> bool {
        self.summary.is_some()
    }
}
