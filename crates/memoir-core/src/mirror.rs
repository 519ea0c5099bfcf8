//! Durable mirror of the journal state.
//!
//! Keeps a full-collection snapshot in the key-value layer so the journal
//! survives restarts. The mirror is a copy of the in-memory state, never the
//! source of truth for a running session.

use tracing::debug;

use crate::error::{Error, Result};
use crate::kv::KeyValueStore;
use crate::models::{Entry, Settings};

/// Key holding the serialized entry collection
pub const ENTRIES_KEY: &str = "journalDatabase";

/// Key holding the serialized settings unit
pub const SETTINGS_KEY: &str = "journalSettings";

/// Snapshot persistence for entries and settings.
pub struct DurableMirror {
    kv: Box<dyn KeyValueStore>,
}

impl DurableMirror {
    #[must_use]
    pub fn new(kv: Box<dyn KeyValueStore>) -> Self {
        Self { kv }
    }

    /// Replace the persisted entry collection with `entries`.
    ///
    /// The export handle on each entry is a side channel and is not written.
    pub fn save(&self, entries: &[Entry]) -> Result<()> {
        let payload = serde_json::to_string(entries)
            .map_err(|err| Error::Persistence(err.to_string()))?;
        self.kv.set(ENTRIES_KEY, &payload)?;
        debug!(count = entries.len(), "mirrored entry collection");
        Ok(())
    }

    /// Restore the persisted entry collection.
    ///
    /// An absent key is the expected first-run state and yields an empty
    /// collection. A present but unparsable value surfaces as
    /// [`Error::Corruption`]; the stored bytes are never silently discarded.
    pub fn load(&self) -> Result<Vec<Entry>> {
        match self.kv.get(ENTRIES_KEY)? {
            None => Ok(Vec::new()),
            Some(payload) => serde_json::from_str(&payload)
                .map_err(|err| Error::Corruption(format!("{ENTRIES_KEY}: {err}"))),
        }
    }

    /// Persist the settings unit.
    pub fn save_settings(&self, settings: &Settings) -> Result<()> {
        let payload = serde_json::to_string(settings)
            .map_err(|err| Error::Persistence(err.to_string()))?;
        self.kv.set(SETTINGS_KEY, &payload)
    }

    /// Restore the settings unit, defaults when never saved.
    pub fn load_settings(&self) -> Result<Settings> {
        match self.kv.get(SETTINGS_KEY)? {
            None => Ok(Settings::default()),
            Some(payload) => serde_json::from_str(&payload)
                .map_err(|err| Error::Corruption(format!("{SETTINGS_KEY}: {err}"))),
        }
    }
}
