//! Export sink: user-directed copies of entries outside the durable mirror.

mod picker;
mod renderer;

pub use picker::{DestinationPicker, DirectoryPicker, ExportHandle};
pub use renderer::DocumentRenderer;

use std::cell::RefCell;
use std::collections::HashSet;
use std::fmt::Write as _;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::models::{Entry, EntryId};

/// Export output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExportFormat {
    Json,
    Text,
    Document,
}

impl ExportFormat {
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Text => "txt",
            Self::Document => "pdf",
        }
    }
}

/// How an export attempt ended.
///
/// Declining the picker is a normal outcome, never an error: the entry is
/// already saved to the durable mirror and only the external copy was
/// skipped.
#[derive(Debug, PartialEq, Eq)]
pub enum ExportOutcome {
    /// Bytes written; keep the handle for overwrite-in-place
    Written(ExportHandle),
    /// The user declined the picker
    Declined,
    /// Nothing to export (empty collection); no prompt, no write
    Empty,
    /// An export for the same target is still pending
    AlreadyInProgress,
}

/// Render a single entry as pretty-printed JSON (2-space indent, no handle).
pub fn render_entry_json(entry: &Entry) -> Result<String> {
    serde_json::to_string_pretty(entry).map_err(|err| Error::Export(err.to_string()))
}

/// Render the collection as one pretty-printed JSON array.
pub fn render_collection_json(entries: &[Entry]) -> Result<String> {
    serde_json::to_string_pretty(entries).map_err(|err| Error::Export(err.to_string()))
}

/// Render a single entry as plain text.
#[must_use]
pub fn render_entry_text(entry: &Entry) -> String {
    format!("{}\n\n{}", entry.title, entry.content)
}

/// Render the collection as separated plain-text blocks.
#[must_use]
pub fn render_collection_text(entries: &[Entry]) -> String {
    let mut output = String::new();
    for entry in entries {
        let _ = write!(
            output,
            "=== {} ===\nDate: {}\n\n{}\n\n\n",
            entry.title,
            format_timestamp(entry.timestamp),
            entry.content
        );
    }
    output
}

/// Human-readable timestamp used in text and document renderings.
///
/// Fixed UTC formatting rather than locale output keeps renders
/// deterministic, which overwrite-in-place relies on.
#[must_use]
pub fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Build a destination file name from an entry title: ASCII alphanumerics
/// kept lowercased, everything else folded to `_`.
#[must_use]
pub fn suggested_file_name(title: &str, format: ExportFormat) -> String {
    let stem: String = title
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect();
    format!("{stem}.{}", format.extension())
}

/// Suggested name for a whole-journal export.
#[must_use]
pub fn suggested_collection_file_name(format: ExportFormat) -> String {
    format!("my_journal_export.{}", format.extension())
}

/// Targets guarded against overlapping picker prompts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum ExportTarget {
    Entry(EntryId),
    Collection,
}

/// Writes entry renderings to user-chosen destinations.
///
/// Picker-prompting operations are a non-reentrant critical section per
/// target: while one is pending, a second attempt against the same entry (or
/// the whole collection) observes [`ExportOutcome::AlreadyInProgress`]
/// instead of opening a second prompt.
pub struct ExportSink {
    picker: Box<dyn DestinationPicker>,
    renderer: Box<dyn DocumentRenderer>,
    in_flight: RefCell<HashSet<ExportTarget>>,
}

impl ExportSink {
    #[must_use]
    pub fn new(picker: Box<dyn DestinationPicker>, renderer: Box<dyn DocumentRenderer>) -> Self {
        Self {
            picker,
            renderer,
            in_flight: RefCell::new(HashSet::new()),
        }
    }

    /// Prompt for a destination and write one entry in the given format.
    pub fn export_entry(&self, entry: &Entry, format: ExportFormat) -> Result<ExportOutcome> {
        let Some(_guard) = self.begin(ExportTarget::Entry(entry.id)) else {
            return Ok(ExportOutcome::AlreadyInProgress);
        };

        let suggested = suggested_file_name(&entry.title, format);
        let Some(handle) = self.picker.pick(&suggested, format)? else {
            debug!(id = %entry.id, "export declined by user");
            return Ok(ExportOutcome::Declined);
        };

        let bytes = self.render_entry_bytes(entry, format)?;
        handle.write(&bytes)?;
        debug!(id = %entry.id, path = %handle.path().display(), "entry exported");
        Ok(ExportOutcome::Written(handle))
    }

    /// Overwrite a previously chosen destination with a fresh rendering.
    ///
    /// A stale handle (file moved or deleted externally) reports
    /// [`Error::Export`]; callers treat that as non-fatal and may prompt for
    /// a new destination. The handle itself is retained optimistically.
    pub fn re_export(&self, handle: &ExportHandle, entry: &Entry, format: ExportFormat) -> Result<()> {
        let bytes = self.render_entry_bytes(entry, format)?;
        handle.write(&bytes)
    }

    /// One-shot export of the whole collection to a single destination.
    ///
    /// No handle is retained for bulk exports.
    pub fn export_collection(
        &self,
        entries: &[Entry],
        format: ExportFormat,
    ) -> Result<ExportOutcome> {
        if entries.is_empty() {
            debug!("no entries to export");
            return Ok(ExportOutcome::Empty);
        }

        let Some(_guard) = self.begin(ExportTarget::Collection) else {
            return Ok(ExportOutcome::AlreadyInProgress);
        };

        let suggested = suggested_collection_file_name(format);
        let Some(handle) = self.picker.pick(&suggested, format)? else {
            debug!("collection export declined by user");
            return Ok(ExportOutcome::Declined);
        };

        let bytes = match format {
            ExportFormat::Json => render_collection_json(entries)?.into_bytes(),
            ExportFormat::Text => render_collection_text(entries).into_bytes(),
            ExportFormat::Document => self.renderer.render_collection(entries)?,
        };
        handle.write(&bytes)?;
        debug!(count = entries.len(), path = %handle.path().display(), "collection exported");
        Ok(ExportOutcome::Written(handle))
    }

    /// Best-effort removal of an exported file.
    ///
    /// Failure is logged only; it must never block the entry deletion that
    /// triggered it.
    pub fn remove_exported(&self, handle: &ExportHandle) {
        if let Err(err) = handle.remove() {
            warn!(error = %err, "could not remove exported file");
        }
    }

    fn render_entry_bytes(&self, entry: &Entry, format: ExportFormat) -> Result<Vec<u8>> {
        Ok(match format {
            ExportFormat::Json => render_entry_json(entry)?.into_bytes(),
            ExportFormat::Text => render_entry_text(entry).into_bytes(),
            ExportFormat::Document => self.renderer.render_entry(entry)?,
        })
    }

    fn begin(&self, target: ExportTarget) -> Option<InFlightGuard<'_>> {
        if !self.in_flight.borrow_mut().insert(target) {
            return None;
        }
        Some(InFlightGuard { sink: self, target })
    }
}

struct InFlightGuard<'a> {
    sink: &'a ExportSink,
    target: ExportTarget,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.sink.in_flight.borrow_mut().remove(&self.target);
    }
}
