use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use chrono::Local;
use fractic_server_error::ServerError;
use futures::future::join_all;
use tokio::task::JoinHandle;

use crate::{
    data::repositories::{
        archive_repository_impl::ArchiveRepositoryImpl,
        entries_repository_impl::EntriesRepositoryImpl,
    },
    domain::{
        logic::{
            allocation_aggregate::{AllocationAggregate, UndoOutcome},
            import_processor::ImportProcessor,
            search_filter::SearchFilter,
            totals_processor::TotalsProcessor,
        },
        repositories::{archive_repository::ArchiveRepository, entries_repository::EntriesRepository},
        services::dictionary_service::DictionaryService,
    },
    entities::{
        AllocationEntry, AllocationSettings, ArchiveData, ArchiveInfo, ConfirmPrompt,
        ConfirmationHandler, FileImportResult, ImportReport, ImportSummary, ItemAllocationView,
        ItemTotalSummary, LocationAllocation, TotalsSortMode,
    },
    errors::{NoEntriesFound, WriteError},
    presentation::{
        clipboard_fmt::ClipboardFormatter,
        csv_exporter::CsvExporter,
        status_fmt::{import_status, session_status, undo_status},
        xlsx_exporter::XlsxExporter,
    },
};

const BEFORE_IMPORT_ARCHIVE: &str = "Before-Import";
const BEFORE_CLEAR_ARCHIVE: &str = "Before-Clear";
const SESSION_SAVE_ARCHIVE: &str = "Session-Save";

/// One editing session over the allocation aggregate.
///
/// Tracks whether the state was modified since the last import, load or
/// archive, writes automatic snapshots before destructive operations, and
/// saves the session on shutdown. Every mutation takes `&mut self`; the only
/// background work is the detached auto-archive writes.
pub struct AllocationSession<
    C,
    A = ArchiveRepositoryImpl, // Default.
    E = EntriesRepositoryImpl, // Default.
> where
    C: ConfirmationHandler,
    A: ArchiveRepository,
    E: EntriesRepository,
{
    settings: AllocationSettings,
    aggregate: AllocationAggregate,
    dictionaries: Arc<DictionaryService>,
    confirmer: C,
    archive_repository: Arc<A>,
    entries_repository: E,
    modified: bool,
    /// File stem of the import that created this session, if any.
    session_name: Option<String>,
    status_message: Option<String>,
    pending_archives: Vec<JoinHandle<()>>,
}

impl<C: ConfirmationHandler> AllocationSession<C> {
    pub fn new(
        settings: AllocationSettings,
        dictionaries: Arc<DictionaryService>,
        confirmer: C,
    ) -> Self {
        let archive_repository = ArchiveRepositoryImpl::new(settings.archive_dir());
        let entries_repository = EntriesRepositoryImpl::new(settings.max_import_bytes);
        Self::with_repositories(
            settings,
            dictionaries,
            confirmer,
            archive_repository,
            entries_repository,
        )
    }
}

impl<C, A, E> AllocationSession<C, A, E>
where
    C: ConfirmationHandler,
    A: ArchiveRepository,
    E: EntriesRepository,
{
    pub fn with_repositories(
        settings: AllocationSettings,
        dictionaries: Arc<DictionaryService>,
        confirmer: C,
        archive_repository: A,
        entries_repository: E,
    ) -> Self {
        Self {
            settings,
            aggregate: AllocationAggregate::new(),
            dictionaries,
            confirmer,
            archive_repository: Arc::new(archive_repository),
            entries_repository,
            modified: false,
            session_name: None,
            status_message: None,
            pending_archives: Vec::new(),
        }
    }

    // State.
    // ---

    pub fn aggregate(&self) -> &AllocationAggregate {
        &self.aggregate
    }

    pub fn settings(&self) -> &AllocationSettings {
        &self.settings
    }

    pub fn dictionaries(&self) -> &Arc<DictionaryService> {
        &self.dictionaries
    }

    pub fn is_modified(&self) -> bool {
        self.modified
    }

    pub fn session_name(&self) -> Option<&str> {
        self.session_name.as_deref()
    }

    /// Outcome of the last import, undo or archive, for a status bar.
    pub fn status_message(&self) -> Option<&str> {
        self.status_message.as_deref()
    }

    /// Location count and unit totals.
    pub fn status(&self) -> String {
        session_status(&self.aggregate)
    }

    pub fn clear_flash(&mut self) {
        self.aggregate.clear_flash();
    }

    // Startup.
    // ---

    /// Loads the most recently modified archive. Never fails: any error is
    /// logged and leaves the state empty. Returns whether something was
    /// restored.
    pub async fn restore_last_session(&mut self) -> bool {
        match self.archive_repository.most_recent().await {
            Ok(Some(data)) => {
                tracing::info!(
                    name = %data.name,
                    locations = data.location_count(),
                    units = data.total_items(),
                    "Restored last session"
                );
                self.aggregate.replace(data.locations, data.pool);
                self.modified = false;
                true
            }
            Ok(None) => {
                tracing::debug!("No archive to restore");
                false
            }
            Err(e) => {
                tracing::warn!(error = ?e, "Could not restore last session");
                false
            }
        }
    }

    // Import.
    // ---

    /// Imports pasted or already-read delimited text, replacing the current
    /// state.
    pub async fn import_text(&mut self, text: &str) -> Result<ImportSummary, ServerError> {
        let entries = self.entries_repository.from_string(text)?;
        if entries.is_empty() {
            return Err(NoEntriesFound::new());
        }
        let summary = self.apply_import(entries)?;
        self.session_name = None;
        Ok(summary)
    }

    /// Imports several files at once. Each file is parsed on its own; entries
    /// of every file that parsed are imported together. State is untouched when
    /// no file produced entries.
    pub async fn import_files<P>(&mut self, paths: &[P]) -> ImportReport
    where
        P: AsRef<Path>,
    {
        let mut report = ImportReport::default();
        let mut entries: Vec<AllocationEntry> = Vec::new();
        let mut first_stem: Option<String> = None;

        for path in paths {
            let path = path.as_ref();
            let result = self
                .entries_repository
                .from_file(path)
                .and_then(|parsed| {
                    if parsed.is_empty() {
                        Err(NoEntriesFound::new())
                    } else {
                        Ok(parsed)
                    }
                });
            match result {
                Ok(parsed) => {
                    if first_stem.is_none() {
                        first_stem = path
                            .file_stem()
                            .and_then(|s| s.to_str())
                            .map(String::from);
                    }
                    report.files.push(FileImportResult {
                        path: path.to_path_buf(),
                        entry_count: parsed.len(),
                        error: None,
                    });
                    entries.extend(parsed);
                }
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = ?e, "Import file failed");
                    report.files.push(FileImportResult {
                        path: path.to_path_buf(),
                        entry_count: 0,
                        error: Some(e.to_string()),
                    });
                }
            }
        }

        if entries.is_empty() {
            self.status_message = Some(format!(
                "Import failed: {} file(s) could not be read.",
                report.files.len()
            ));
            return report;
        }
        match self.apply_import(entries) {
            Ok(summary) => {
                report.summary = Some(summary);
                self.session_name = first_stem;
            }
            Err(e) => {
                tracing::warn!(error = ?e, "Import failed");
                self.status_message = Some(format!("Import failed: {}", e));
                report.error = Some(e.to_string());
            }
        }
        report
    }

    /// Builds the new locations first, so a rejected import leaves state and
    /// archives untouched.
    fn apply_import(&mut self, entries: Vec<AllocationEntry>) -> Result<ImportSummary, ServerError> {
        let entry_count = entries.len();
        let dictionaries = self.dictionaries.current();
        let locations = ImportProcessor::new(&*dictionaries, self.settings.fuzzy_store_threshold)
            .process(entries)?;
        self.auto_archive(BEFORE_IMPORT_ARCHIVE);

        let summary = ImportSummary {
            entries: entry_count,
            locations: locations.len(),
            units: locations.iter().map(|l| l.total_quantity()).sum(),
        };
        self.aggregate.replace(locations, Vec::new());
        self.modified = true;

        tracing::info!(
            entries = summary.entries,
            locations = summary.locations,
            units = summary.units,
            "Imported allocations"
        );
        self.status_message = Some(import_status(&summary));
        Ok(summary)
    }

    // Moves and edits.
    // ---

    pub fn add_one(&mut self, location: Option<&str>, item_number: &str) -> bool {
        self.track(|aggregate| aggregate.add_one(location, item_number))
    }

    pub fn remove_one(&mut self, location: &str, item_number: &str) -> bool {
        self.track(|aggregate| aggregate.remove_one(location, item_number))
    }

    pub fn move_from_pool(&mut self, location: &str, item_number: &str, quantity: u32) -> u32 {
        let moved = self.aggregate.move_from_pool(location, item_number, quantity);
        if moved > 0 {
            self.modified = true;
        }
        moved
    }

    pub fn set_quantity(&mut self, location: &str, item_number: &str, quantity: u32) -> bool {
        self.track(|aggregate| aggregate.set_quantity(location, item_number, quantity))
    }

    fn track(&mut self, op: impl FnOnce(&mut AllocationAggregate) -> bool) -> bool {
        let changed = op(&mut self.aggregate);
        if changed {
            self.modified = true;
        }
        changed
    }

    // Deactivation.
    // ---

    /// Asks for confirmation, then moves the store's items back to the pool.
    /// Returns `false` when denied or when the store is unknown or already
    /// inactive.
    pub async fn deactivate_store(&mut self, location: &str) -> bool {
        let units = match self.aggregate.location(location) {
            Some(l) if l.is_active => l.total_quantity(),
            _ => return false,
        };
        let prompt = ConfirmPrompt::DeactivateStore {
            location: location.trim().to_string(),
            units,
        };
        if !self.confirmer.confirm(&prompt).await {
            tracing::debug!(location, "Deactivation declined");
            return false;
        }
        self.track(|aggregate| aggregate.deactivate(location))
    }

    pub fn undo_deactivate(&mut self) -> Option<UndoOutcome> {
        let outcome = self.aggregate.undo_deactivate()?;
        self.modified = true;
        self.status_message = Some(undo_status(&outcome));
        Some(outcome)
    }

    /// Asks for confirmation, archives the current state when modified and
    /// clears everything.
    pub async fn clear_all(&mut self) -> bool {
        if self.aggregate.is_empty() {
            return false;
        }
        let prompt = ConfirmPrompt::ClearAll {
            locations: self.aggregate.locations().len(),
            pool_units: self.aggregate.total_pooled(),
        };
        if !self.confirmer.confirm(&prompt).await {
            return false;
        }
        self.auto_archive(BEFORE_CLEAR_ARCHIVE);
        self.aggregate.clear();
        self.session_name = None;
        self.modified = false;
        true
    }

    // Totals and search.
    // ---

    pub fn item_totals(&self, sort: TotalsSortMode) -> Vec<ItemTotalSummary> {
        TotalsProcessor::new(&self.aggregate).item_totals(sort)
    }

    pub fn item_views(&self) -> Vec<ItemAllocationView> {
        TotalsProcessor::new(&self.aggregate).item_views()
    }

    pub fn filter_locations(&self, query: &str) -> Vec<LocationAllocation> {
        SearchFilter::new(query).locations(self.aggregate.locations())
    }

    pub fn filter_totals(&self, query: &str, sort: TotalsSortMode) -> Vec<ItemTotalSummary> {
        SearchFilter::new(query).totals(self.item_totals(sort))
    }

    // Archives.
    // ---

    pub async fn archive_now(&mut self, name: &str, notes: &str) -> Result<PathBuf, ServerError> {
        let data = self.snapshot(name, notes);
        let path = self.archive_repository.save(&data).await?;
        self.modified = false;
        self.status_message = Some(format!("Archived as '{}'.", data.name));
        Ok(path)
    }

    pub async fn list_archives(&self) -> Result<Vec<ArchiveInfo>, ServerError> {
        self.archive_repository.list().await
    }

    /// Replaces the current state with the archive contents.
    pub async fn load_archive(&mut self, path: &Path) -> Result<(), ServerError> {
        let data = self.archive_repository.load(path).await?;
        tracing::info!(name = %data.name, path = %path.display(), "Archive loaded");
        self.status_message = Some(format!("Loaded archive '{}'.", data.name));
        self.aggregate.replace(data.locations, data.pool);
        self.session_name = None;
        self.modified = false;
        Ok(())
    }

    pub async fn delete_archive(&self, path: &Path) -> Result<bool, ServerError> {
        let prompt = ConfirmPrompt::DeleteArchive {
            name: path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default(),
        };
        if !self.confirmer.confirm(&prompt).await {
            return Ok(false);
        }
        self.archive_repository.delete(path).await?;
        Ok(true)
    }

    /// Awaits every auto-archive write started so far.
    pub async fn flush_pending_archives(&mut self) {
        for joined in join_all(self.pending_archives.drain(..)).await {
            if let Err(e) = joined {
                tracing::warn!(error = ?e, "Auto-archive task did not complete");
            }
        }
    }

    /// Saves the session (when there is any data) and ends it. Returns the
    /// written archive path.
    pub async fn shutdown(mut self) -> Result<Option<PathBuf>, ServerError> {
        self.flush_pending_archives().await;
        if self.aggregate.is_empty() {
            return Ok(None);
        }
        let name = match &self.session_name {
            Some(stem) => format!("Session_{}", stem),
            None => SESSION_SAVE_ARCHIVE.to_string(),
        };
        let data = self.snapshot(&name, "");
        Ok(Some(self.archive_repository.save(&data).await?))
    }

    fn snapshot(&self, name: &str, notes: &str) -> ArchiveData {
        ArchiveData {
            name: name.to_string(),
            notes: notes.to_string(),
            archived_at: Local::now().naive_local(),
            locations: self.aggregate.locations().to_vec(),
            pool: self.aggregate.pool().to_vec(),
        }
    }

    /// Snapshots modified, non-empty state on a detached task. Failures are
    /// logged only.
    fn auto_archive(&mut self, name: &str) {
        if !self.modified || self.aggregate.is_empty() {
            return;
        }
        let data = self.snapshot(name, "");
        self.modified = false;
        self.pending_archives.retain(|h| !h.is_finished());

        let repository = self.archive_repository.clone();
        self.pending_archives.push(tokio::spawn(async move {
            if let Err(e) = repository.save(&data).await {
                tracing::warn!(name = %data.name, error = ?e, "Auto-archive failed");
            }
        }));
    }

    // Export.
    // ---

    pub fn export_csv(&self) -> Result<String, ServerError> {
        CsvExporter::new().export(self.aggregate.locations())
    }

    pub fn export_xlsx(&self) -> Result<Vec<u8>, ServerError> {
        XlsxExporter::new().export(self.aggregate.locations())
    }

    /// Writes an XLSX workbook for `.xlsx` paths and CSV otherwise.
    pub async fn export_to_file(&self, path: &Path) -> Result<(), ServerError> {
        let is_xlsx = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("xlsx"));
        let bytes = if is_xlsx {
            self.export_xlsx()?
        } else {
            self.export_csv()?.into_bytes()
        };
        tokio::fs::write(path, bytes)
            .await
            .map_err(|e| WriteError::with_debug(&path.display().to_string(), &e))
    }

    pub fn copy_location(&self, location: &str) -> Option<String> {
        ClipboardFormatter::new(self.settings.clipboard_separator)
            .location(self.aggregate.location(location)?)
    }

    pub fn copy_item_redistribution(&self, item_number: &str) -> Option<String> {
        ClipboardFormatter::new(self.settings.clipboard_separator)
            .item_redistribution(self.aggregate.locations(), item_number)
    }
}
