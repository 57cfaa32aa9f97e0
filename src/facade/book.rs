use crate::codec::Format;
use crate::config::BookConfig;
use crate::core::{Outcome, PolicyDraft, PolicyError, PolicyRecord, RecordId, Result};
use crate::mapper;
use crate::storage::{FileBlobStore, JsonGateway, NullGateway, PersistenceGateway};
use crate::store::{RecordStore, StoreStats};
use crate::view::{SortDirection, SortKey, ViewPage, ViewPipeline, ViewState};
use chrono::{NaiveDate, Utc};
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// Result of one import: what was read and what made it into the store.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportReport {
    pub format: Format,
    /// Data rows in the file, blank rows included
    pub rows_read: usize,
    pub imported: Vec<PolicyRecord>,
    pub skipped: usize,
}

/// Encoded export, ready to be written or sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// The policy book: one record store plus the table view over it.
///
/// This is the explicit application object. It is created once with
/// [`open`](Self::open) and handed to whatever renders it; every mutation
/// goes through it so the view is re-clamped after each change.
pub struct PolicyBook {
    config: BookConfig,
    store: RecordStore,
    view: ViewPipeline,
}

impl PolicyBook {
    /// Opens the file-backed book under `config.data_dir`.
    pub fn open(config: BookConfig) -> Outcome<Self> {
        let gateway = JsonGateway::new(
            FileBlobStore::new(&config.data_dir),
            config.storage_key.clone(),
        );
        Self::with_gateway(config, Box::new(gateway))
    }

    pub fn with_gateway(config: BookConfig, gateway: Box<dyn PersistenceGateway>) -> Outcome<Self> {
        let view = ViewPipeline::new(config.page_size);
        RecordStore::open(gateway).map(|store| Self {
            config,
            store,
            view,
        })
    }

    /// Book that persists nothing.
    pub fn in_memory() -> Self {
        Self::with_gateway(BookConfig::default(), Box::new(NullGateway)).into_value()
    }

    pub fn config(&self) -> &BookConfig {
        &self.config
    }

    // ========================================================================
    // Records
    // ========================================================================

    /// All records in insertion order, ignoring the view.
    pub fn records(&self) -> &[PolicyRecord] {
        self.store.all()
    }

    pub fn get(&self, id: &RecordId) -> Option<&PolicyRecord> {
        self.store.get(id)
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    pub fn stats(&self) -> StoreStats {
        self.store.stats()
    }

    pub fn create(&mut self, draft: PolicyDraft) -> Result<Outcome<PolicyRecord>> {
        let outcome = self.store.create(draft)?;
        self.refresh();
        Ok(outcome)
    }

    pub fn update(&mut self, id: &RecordId, draft: PolicyDraft) -> Result<Outcome<PolicyRecord>> {
        let outcome = self.store.update(id, draft)?;
        self.refresh();
        Ok(outcome)
    }

    pub fn delete(&mut self, id: &RecordId) -> Result<Outcome<PolicyRecord>> {
        let outcome = self.store.delete(id)?;
        self.refresh();
        Ok(outcome)
    }

    pub fn bulk_insert(&mut self, drafts: Vec<PolicyDraft>) -> Outcome<Vec<PolicyRecord>> {
        let outcome = self.store.bulk_insert(drafts);
        self.refresh();
        outcome
    }

    pub fn clear_all(&mut self) -> Outcome<usize> {
        let outcome = self.store.clear_all();
        self.refresh();
        outcome
    }

    fn refresh(&mut self) {
        self.view.reconcile(self.store.all());
        debug!(records = self.store.len(), page = self.view.state().page, "view refreshed");
    }

    // ========================================================================
    // View
    // ========================================================================

    pub fn view_state(&self) -> &ViewState {
        self.view.state()
    }

    /// The page currently selected, derived from the live collection.
    pub fn current_page(&self) -> ViewPage<'_> {
        self.view.page(self.store.all())
    }

    pub fn search(&mut self, term: &str) {
        self.view.set_search(term);
    }

    pub fn sort_by(&mut self, column: &str) {
        self.view.sort_by(column);
    }

    pub fn set_sort(&mut self, column: &str, direction: SortDirection) {
        self.view.set_sort(Some(SortKey::new(column, direction)));
    }

    pub fn clear_sort(&mut self) {
        self.view.set_sort(None);
    }

    pub fn go_to_page(&mut self, page: usize) -> usize {
        self.view.go_to_page(self.store.all(), page)
    }

    pub fn next_page(&mut self) -> usize {
        self.view.next_page(self.store.all())
    }

    pub fn previous_page(&mut self) -> usize {
        self.view.previous_page(self.store.all())
    }

    pub fn set_page_size(&mut self, page_size: usize) {
        self.view.set_page_size(page_size);
    }

    // ========================================================================
    // Import / export
    // ========================================================================

    /// Reads, maps and inserts one file. A codec failure imports nothing;
    /// rows that cannot be used are skipped and reported as warnings.
    pub fn import_bytes(&mut self, format: Format, bytes: &[u8]) -> Result<Outcome<ImportReport>> {
        let table = format.codec().decode(bytes)?;
        let rows_read = table.len();

        let Outcome {
            value: rows,
            mut warnings,
        } = mapper::from_table(&table);
        let inserted = self.store.insert_rows(rows);
        warnings.extend(inserted.warnings);
        self.refresh();

        let skipped = warnings
            .iter()
            .filter(|w| matches!(w, PolicyError::ImportRowSkipped { .. }))
            .count();
        info!(
            %format,
            rows_read,
            imported = inserted.value.len(),
            skipped,
            "import finished"
        );

        Ok(Outcome::with_warnings(
            ImportReport {
                format,
                rows_read,
                imported: inserted.value,
                skipped,
            },
            warnings,
        ))
    }

    pub fn import_file(&mut self, path: impl AsRef<Path>) -> Result<Outcome<ImportReport>> {
        let path = path.as_ref();
        let format = Format::from_path(path)?;
        let bytes = fs::read(path).map_err(|e| {
            PolicyError::CodecFailure(format!("cannot read '{}': {}", path.display(), e))
        })?;
        self.import_bytes(format, &bytes)
    }

    /// Encodes the whole collection, in insertion order, regardless of the
    /// current view. `date` stamps the suggested file name.
    pub fn export(&self, format: Format, date: NaiveDate) -> Result<ExportFile> {
        let table = mapper::to_table(self.store.all());
        let bytes = format.codec().encode(&table)?;
        let file_name = format.export_file_name(date);
        info!(%format, records = table.len(), %file_name, "export encoded");
        Ok(ExportFile { file_name, bytes })
    }

    /// [`export`](Self::export) stamped with today's UTC date.
    pub fn export_today(&self, format: Format) -> Result<ExportFile> {
        self.export(format, Utc::now().date_naive())
    }
}
