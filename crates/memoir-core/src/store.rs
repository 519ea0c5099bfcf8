//! Entry store: the authoritative in-memory collection.

use std::rc::Rc;

use chrono::Utc;
use tracing::warn;

use crate::error::{Error, Result};
use crate::export::ExportHandle;
use crate::mirror::DurableMirror;
use crate::models::{Entry, EntryId};

/// Outcome of a successful store mutation.
///
/// The in-memory change has already happened; `mirror_warning` carries a
/// persistence failure that the caller must surface without treating the
/// mutation itself as failed.
#[derive(Debug)]
pub struct Mutation {
    /// The entry created, updated, or removed
    pub entry: Entry,
    /// Set when the durable mirror rejected the post-mutation snapshot
    pub mirror_warning: Option<Error>,
}

/// Ordered collection of journal entries with an injected durable mirror.
///
/// All access is single-threaded; lookups are linear scans, which is
/// adequate for a personal journal.
pub struct EntryStore {
    entries: Vec<Entry>,
    last_id: i64,
    mirror: Rc<DurableMirror>,
}

impl EntryStore {
    /// Restore the collection from the mirror.
    ///
    /// Corruption in the stored snapshot propagates; the store never opens
    /// over data it cannot represent faithfully.
    pub fn open(mirror: Rc<DurableMirror>) -> Result<Self> {
        let entries = mirror.load()?;
        let last_id = entries.iter().map(|e| e.id.as_i64()).max().unwrap_or(0);
        Ok(Self {
            entries,
            last_id,
            mirror,
        })
    }

    /// Allocate the next id: current time in milliseconds, bumped past the
    /// previous id so rapid creates stay pairwise distinct.
    fn next_id(&mut self) -> EntryId {
        let now_ms = Utc::now().timestamp_millis();
        self.last_id = now_ms.max(self.last_id + 1);
        EntryId::new(self.last_id)
    }

    /// Append a new entry.
    pub fn create(
        &mut self,
        title: &str,
        content: &str,
        image: Option<String>,
    ) -> Result<Mutation> {
        let title = required_text("title", title)?;
        let content = required_text("content", content)?;

        let id = self.next_id();
        let entry = Entry::new(id, title, content, image);
        self.entries.push(entry.clone());

        Ok(Mutation {
            entry,
            mirror_warning: self.persist(),
        })
    }

    /// Update title, content, and optionally the image of an entry in place.
    ///
    /// `image: None` leaves the existing image untouched; `Some` replaces it.
    /// The entry keeps its position in the collection.
    pub fn update(
        &mut self,
        id: EntryId,
        title: &str,
        content: &str,
        image: Option<String>,
    ) -> Result<Mutation> {
        let title = required_text("title", title)?;
        let content = required_text("content", content)?;

        let entry = self.find_mut(id)?;
        entry.title = title;
        entry.content = content;
        if let Some(image) = image {
            entry.image = Some(image);
        }
        entry.touch();
        let entry = entry.clone();

        Ok(Mutation {
            entry,
            mirror_warning: self.persist(),
        })
    }

    /// Quick-edit path: update only the content (and timestamp) of an entry.
    pub fn update_content(&mut self, id: EntryId, content: &str) -> Result<Mutation> {
        let content = required_text("content", content)?;

        let entry = self.find_mut(id)?;
        entry.content = content;
        entry.touch();
        let entry = entry.clone();

        Ok(Mutation {
            entry,
            mirror_warning: self.persist(),
        })
    }

    /// Remove an entry, preserving the relative order of the rest.
    ///
    /// Returns the removed entry so the caller can clean up its export
    /// handle.
    pub fn delete(&mut self, id: EntryId) -> Result<Mutation> {
        let index = self
            .entries
            .iter()
            .position(|e| e.id == id)
            .ok_or(Error::NotFound(id))?;
        let entry = self.entries.remove(index);

        Ok(Mutation {
            entry,
            mirror_warning: self.persist(),
        })
    }

    /// Look up an entry by id.
    #[must_use]
    pub fn find(&self, id: EntryId) -> Option<&Entry> {
        self.entries.iter().find(|e| e.id == id)
    }

    /// All entries in insertion order.
    #[must_use]
    pub fn all(&self) -> &[Entry] {
        &self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Attach or clear the export destination of an entry.
    ///
    /// The handle is a non-serialized side channel, so this touches neither
    /// the timestamp nor the mirror.
    pub fn set_export_handle(&mut self, id: EntryId, handle: Option<ExportHandle>) -> Result<()> {
        self.find_mut(id)?.export_handle = handle;
        Ok(())
    }

    fn find_mut(&mut self, id: EntryId) -> Result<&mut Entry> {
        self.entries
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or(Error::NotFound(id))
    }

    /// Mirror the full collection; failures are warnings, never rollbacks.
    fn persist(&self) -> Option<Error> {
        match self.mirror.save(&self.entries) {
            Ok(()) => None,
            Err(err) => {
                warn!(error = %err, "in-memory change kept, durable mirror write failed");
                Some(err)
            }
        }
    }
}

fn required_text(field: &str, value: &str) -> Result<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(Error::Validation(format!("{field} must not be empty")));
    }
    Ok(value.to_string())
}
