//! Journal facade: the app-facing composition of store, mirror, and sink.
//!
//! One instance per journal; all collaborators are injected at construction
//! so tests can run isolated instances side by side.

use std::rc::Rc;

use tracing::warn;

use crate::error::{Error, Result};
use crate::export::{ExportFormat, ExportOutcome, ExportSink};
use crate::kv::KeyValueStore;
use crate::mirror::DurableMirror;
use crate::models::{Entry, EntryId, Settings};
use crate::store::{EntryStore, Mutation};

/// How the export step of a save/update flow ended.
///
/// The entry itself is saved either way; callers surface "saved locally,
/// export skipped/failed" rather than one generic failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportStatus {
    /// No export was requested and no handle was attached
    NotRequested,
    /// The external copy is current
    Written,
    /// The user declined the picker; not a failure
    Declined,
    /// A pending export for the same entry was still running
    AlreadyInProgress,
    /// The export step failed after the entry was saved
    Failed(String),
}

/// Result of a save/update flow: the saved entry plus what happened to its
/// durable mirror and external copy.
#[derive(Debug)]
pub struct SaveReport {
    pub entry: Entry,
    /// Set when the durable mirror rejected the snapshot
    pub mirror_warning: Option<Error>,
    pub export: ExportStatus,
}

/// A journal: entries, settings, and the export sink, restored from and
/// mirrored to one key-value persistence layer.
pub struct Journal {
    store: EntryStore,
    sink: ExportSink,
    mirror: Rc<DurableMirror>,
    settings: Settings,
}

impl Journal {
    /// Restore a journal from the given persistence layer.
    pub fn open(kv: Box<dyn KeyValueStore>, sink: ExportSink) -> Result<Self> {
        let mirror = Rc::new(DurableMirror::new(kv));
        let store = EntryStore::open(Rc::clone(&mirror))?;
        let settings = mirror.load_settings()?;
        Ok(Self {
            store,
            sink,
            mirror,
            settings,
        })
    }

    /// Save a new entry, optionally exporting it right away.
    ///
    /// The entry is created and mirrored first; a declined picker or a
    /// failed export never unwinds it. A successful export attaches the
    /// destination handle for later overwrite-in-place.
    pub fn save_entry(
        &mut self,
        title: &str,
        content: &str,
        image: Option<String>,
        export: Option<ExportFormat>,
    ) -> Result<SaveReport> {
        let Mutation {
            mut entry,
            mirror_warning,
        } = self.store.create(title, content, image)?;

        let export = match export {
            None => ExportStatus::NotRequested,
            Some(format) => match self.sink.export_entry(&entry, format) {
                Ok(ExportOutcome::Written(handle)) => {
                    entry.export_handle = Some(handle.clone());
                    self.store.set_export_handle(entry.id, Some(handle))?;
                    ExportStatus::Written
                }
                Ok(ExportOutcome::Declined) => ExportStatus::Declined,
                Ok(ExportOutcome::AlreadyInProgress) => ExportStatus::AlreadyInProgress,
                // A single-entry export never reports an empty collection.
                Ok(ExportOutcome::Empty) => ExportStatus::NotRequested,
                Err(err) => {
                    warn!(error = %err, "entry saved locally, export failed");
                    ExportStatus::Failed(err.to_string())
                }
            },
        };

        Ok(SaveReport {
            entry,
            mirror_warning,
            export,
        })
    }

    /// Update an entry from the main form and refresh its external copy.
    pub fn update_entry(
        &mut self,
        id: EntryId,
        title: &str,
        content: &str,
        image: Option<String>,
    ) -> Result<SaveReport> {
        let mutation = self.store.update(id, title, content, image)?;
        Ok(self.report_with_re_export(mutation))
    }

    /// Quick-edit path: replace only the content of an entry and refresh its
    /// external copy.
    pub fn edit_content(&mut self, id: EntryId, content: &str) -> Result<SaveReport> {
        let mutation = self.store.update_content(id, content)?;
        Ok(self.report_with_re_export(mutation))
    }

    /// Delete an entry and best-effort remove its exported file.
    ///
    /// The in-memory and durable deletion always succeed independently of
    /// the external file.
    pub fn delete_entry(&mut self, id: EntryId) -> Result<Mutation> {
        let mutation = self.store.delete(id)?;
        if let Some(handle) = &mutation.entry.export_handle {
            self.sink.remove_exported(handle);
        }
        Ok(mutation)
    }

    /// Export the whole journal to one user-chosen destination.
    pub fn export_journal(&self, format: ExportFormat) -> Result<ExportOutcome> {
        self.sink.export_collection(self.store.all(), format)
    }

    #[must_use]
    pub fn entries(&self) -> &[Entry] {
        self.store.all()
    }

    #[must_use]
    pub fn find(&self, id: EntryId) -> Option<&Entry> {
        self.store.find(id)
    }

    #[must_use]
    pub const fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Replace and persist the settings unit.
    pub fn set_settings(&mut self, settings: Settings) -> Result<()> {
        self.settings = settings;
        self.mirror.save_settings(&self.settings)
    }

    /// Re-export to the attached handle if one exists; failures are
    /// warnings and the handle is retained optimistically.
    fn report_with_re_export(&self, mutation: Mutation) -> SaveReport {
        let Mutation {
            entry,
            mirror_warning,
        } = mutation;

        let export = match &entry.export_handle {
            None => ExportStatus::NotRequested,
            Some(handle) => match self.sink.re_export(handle, &entry, handle.format()) {
                Ok(()) => ExportStatus::Written,
                Err(err) => {
                    warn!(error = %err, "entry saved locally, export file not refreshed");
                    ExportStatus::Failed(err.to_string())
                }
            },
        };

        SaveReport {
            entry,
            mirror_warning,
            export,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::{DestinationPicker, DirectoryPicker, DocumentRenderer, ExportHandle};
    use crate::kv::MemoryKeyValueStore;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    struct StubRenderer;

    impl DocumentRenderer for StubRenderer {
        fn render_entry(&self, entry: &Entry) -> Result<Vec<u8>> {
            Ok(format!("DOC {} {}", entry.title, entry.content).into_bytes())
        }

        fn render_collection(&self, entries: &[Entry]) -> Result<Vec<u8>> {
            Ok(format!("DOC x{}", entries.len()).into_bytes())
        }
    }

    struct DecliningPicker;

    impl DestinationPicker for DecliningPicker {
        fn pick(&self, _name: &str, _format: ExportFormat) -> Result<Option<ExportHandle>> {
            Ok(None)
        }
    }

    fn journal_into(dir: &std::path::Path) -> Journal {
        let sink = ExportSink::new(
            Box::new(DirectoryPicker::open(dir).unwrap()),
            Box::new(StubRenderer),
        );
        Journal::open(Box::new(MemoryKeyValueStore::new()), sink).unwrap()
    }

    #[test]
    fn save_without_export_reports_not_requested() {
        let temp = TempDir::new().unwrap();
        let mut journal = journal_into(temp.path());

        let report = journal.save_entry("Day 1", "Hello", None, None).unwrap();
        assert_eq!(report.export, ExportStatus::NotRequested);
        assert_eq!(journal.entries().len(), 1);
    }

    #[test]
    fn declined_export_still_saves_the_entry() {
        let sink = ExportSink::new(Box::new(DecliningPicker), Box::new(StubRenderer));
        let mut journal = Journal::open(Box::new(MemoryKeyValueStore::new()), sink).unwrap();

        let report = journal
            .save_entry("Day 1", "Hello", None, Some(ExportFormat::Document))
            .unwrap();

        assert_eq!(report.export, ExportStatus::Declined);
        assert_eq!(journal.entries().len(), 1);
        assert!(journal.find(report.entry.id).unwrap().export_handle.is_none());
    }

    #[test]
    fn save_with_export_attaches_handle() {
        let temp = TempDir::new().unwrap();
        let mut journal = journal_into(temp.path());

        let report = journal
            .save_entry("Day 1", "Hello", None, Some(ExportFormat::Text))
            .unwrap();

        assert_eq!(report.export, ExportStatus::Written);
        let entry = journal.find(report.entry.id).unwrap();
        let handle = entry.export_handle.as_ref().unwrap();
        assert_eq!(handle.path(), temp.path().join("day_1.txt"));
        assert_eq!(
            std::fs::read_to_string(handle.path()).unwrap(),
            "Day 1\n\nHello"
        );
    }

    #[test]
    fn update_refreshes_the_exported_file_in_same_format() {
        let temp = TempDir::new().unwrap();
        let mut journal = journal_into(temp.path());

        let id = journal
            .save_entry("Day 1", "Hello", None, Some(ExportFormat::Document))
            .unwrap()
            .entry
            .id;

        let report = journal
            .update_entry(id, "Day 1", "Hello world", None)
            .unwrap();
        assert_eq!(report.export, ExportStatus::Written);

        let exported = std::fs::read(temp.path().join("day_1.pdf")).unwrap();
        assert_eq!(exported, b"DOC Day 1 Hello world");
    }

    #[test]
    fn edit_content_keeps_title_and_refreshes_export() {
        let temp = TempDir::new().unwrap();
        let mut journal = journal_into(temp.path());

        let id = journal
            .save_entry("Day 1", "Hello", None, Some(ExportFormat::Text))
            .unwrap()
            .entry
            .id;

        let report = journal.edit_content(id, "Rewritten").unwrap();
        assert_eq!(report.entry.title, "Day 1");
        assert_eq!(report.export, ExportStatus::Written);
        assert_eq!(
            std::fs::read_to_string(temp.path().join("day_1.txt")).unwrap(),
            "Day 1\n\nRewritten"
        );
    }

    #[test]
    fn failed_re_export_is_a_warning_and_keeps_the_handle() {
        let temp = TempDir::new().unwrap();
        let mut journal = journal_into(temp.path());

        let id = journal
            .save_entry("Day 1", "Hello", None, Some(ExportFormat::Text))
            .unwrap()
            .entry
            .id;

        // Simulate the destination directory disappearing externally.
        std::fs::remove_file(temp.path().join("day_1.txt")).unwrap();
        std::fs::remove_dir_all(temp.path()).ok();

        let report = journal.update_entry(id, "Day 1", "Hello world", None);
        match report {
            Ok(report) => {
                assert!(matches!(report.export, ExportStatus::Failed(_)));
                assert_eq!(report.entry.content, "Hello world");
                assert!(journal.find(id).unwrap().export_handle.is_some());
            }
            Err(err) => panic!("update must not fail on export trouble: {err}"),
        }
    }

    #[test]
    fn delete_removes_the_exported_file_best_effort() {
        let temp = TempDir::new().unwrap();
        let mut journal = journal_into(temp.path());

        let id = journal
            .save_entry("Day 1", "Hello", None, Some(ExportFormat::Text))
            .unwrap()
            .entry
            .id;
        assert!(temp.path().join("day_1.txt").exists());

        journal.delete_entry(id).unwrap();
        assert!(journal.entries().is_empty());
        assert!(!temp.path().join("day_1.txt").exists());

        // Deleting an entry whose export is already gone is still fine.
        let id = journal
            .save_entry("Day 2", "Again", None, Some(ExportFormat::Text))
            .unwrap()
            .entry
            .id;
        std::fs::remove_file(temp.path().join("day_2.txt")).unwrap();
        journal.delete_entry(id).unwrap();
        assert!(journal.entries().is_empty());
    }

    #[test]
    fn export_journal_of_empty_collection_is_empty_outcome() {
        let temp = TempDir::new().unwrap();
        let journal = journal_into(temp.path());

        let outcome = journal.export_journal(ExportFormat::Text).unwrap();
        assert_eq!(outcome, ExportOutcome::Empty);
    }

    #[test]
    fn export_journal_writes_one_destination() {
        let temp = TempDir::new().unwrap();
        let mut journal = journal_into(temp.path());
        journal.save_entry("Day 1", "Hello", None, None).unwrap();
        journal.save_entry("Day 2", "World", None, None).unwrap();

        let outcome = journal.export_journal(ExportFormat::Json).unwrap();
        let ExportOutcome::Written(handle) = outcome else {
            panic!("expected Written, got {outcome:?}");
        };
        assert_eq!(handle.path(), temp.path().join("my_journal_export.json"));

        let body = std::fs::read_to_string(handle.path()).unwrap();
        assert!(body.contains("\"title\": \"Day 1\""));
        assert!(body.contains("\"title\": \"Day 2\""));
    }

    #[test]
    fn settings_persist_across_reopen() {
        let temp = TempDir::new().unwrap();
        let kv = crate::kv::FileKeyValueStore::open(temp.path().join("data")).unwrap();

        let sink = ExportSink::new(
            Box::new(DirectoryPicker::open(temp.path().join("out")).unwrap()),
            Box::new(StubRenderer),
        );
        let mut journal = Journal::open(Box::new(kv.clone()), sink).unwrap();
        assert_eq!(journal.settings(), &Settings::default());

        journal
            .set_settings(Settings {
                current_theme: "theme-red".to_string(),
                dark_mode: true,
                background_image: None,
                journal_title: "Ship Log".to_string(),
            })
            .unwrap();

        let sink = ExportSink::new(
            Box::new(DirectoryPicker::open(temp.path().join("out")).unwrap()),
            Box::new(StubRenderer),
        );
        let reopened = Journal::open(Box::new(kv), sink).unwrap();
        assert_eq!(reopened.settings().journal_title, "Ship Log");
        assert!(reopened.settings().dark_mode);
    }
}
