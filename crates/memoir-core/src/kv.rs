//! Key-value persistence layer backing the durable mirror.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use crate::error::{Error, Result};

/// Trait for the persistence layer the durable mirror writes through.
///
/// A `set` must fully replace the prior value or leave it intact; partial
/// writes must never be observable on a later `get`.
pub trait KeyValueStore {
    /// Read the value under `key`, `None` if the key was never written
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Replace the value under `key`
    fn set(&self, key: &str, value: &str) -> Result<()>;
}

/// File-backed store keeping one file per key inside a directory.
///
/// Writes go to a temp file in the same directory and are renamed into
/// place, so a crash mid-write leaves the previous value readable.
#[derive(Debug, Clone)]
pub struct FileKeyValueStore {
    dir: PathBuf,
}

impl FileKeyValueStore {
    /// Open a store rooted at `dir`, creating the directory if needed.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .map_err(|err| Error::Persistence(format!("{}: {err}", dir.display())))?;
        Ok(Self { dir })
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl KeyValueStore for FileKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.key_path(key);
        match fs::read_to_string(&path) {
            Ok(value) => Ok(Some(value)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(Error::Persistence(format!("{}: {err}", path.display()))),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let path = self.key_path(key);
        let tmp_path = self.dir.join(format!("{key}.json.tmp-{}", std::process::id()));

        fs::write(&tmp_path, value)
            .map_err(|err| Error::Persistence(format!("{}: {err}", tmp_path.display())))?;

        // Windows refuses to rename over an existing file.
        if cfg!(windows) && path.exists() {
            fs::remove_file(&path)
                .map_err(|err| Error::Persistence(format!("{}: {err}", path.display())))?;
        }

        fs::rename(&tmp_path, &path)
            .map_err(|err| Error::Persistence(format!("{}: {err}", path.display())))
    }
}

/// In-memory store used by tests and first-run scenarios.
#[derive(Debug, Default)]
pub struct MemoryKeyValueStore {
    map: RefCell<HashMap<String, String>>,
}

impl MemoryKeyValueStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.map.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.map.borrow_mut().insert(key.to_string(), value.to_string());
        Ok(())
    }
}
