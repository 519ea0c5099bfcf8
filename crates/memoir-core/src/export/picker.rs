//! Export destinations: opaque handles and the picker capability.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::export::ExportFormat;

/// Opaque reference to a previously chosen export destination.
///
/// Enables overwrite-in-place without prompting again, and remembers the
/// format rendered there so the overwrite stays consistent. The handle is a
/// weak reference: the file may have been moved or deleted externally, and
/// every operation on it reports that instead of assuming validity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportHandle {
    path: PathBuf,
    format: ExportFormat,
}

impl ExportHandle {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, format: ExportFormat) -> Self {
        Self {
            path: path.into(),
            format,
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Format this destination was exported in.
    #[must_use]
    pub const fn format(&self) -> ExportFormat {
        self.format
    }

    /// Replace the destination file with `bytes` (write-then-close).
    pub fn write(&self, bytes: &[u8]) -> Result<()> {
        fs::write(&self.path, bytes)
            .map_err(|err| Error::Export(format!("{}: {err}", self.path.display())))
    }

    /// Delete the destination file.
    pub fn remove(&self) -> Result<()> {
        fs::remove_file(&self.path)
            .map_err(|err| Error::Export(format!("{}: {err}", self.path.display())))
    }
}

/// Capability for choosing an export destination.
///
/// `Ok(None)` means the user declined, a normal outcome distinct from a
/// write failure.
pub trait DestinationPicker {
    fn pick(&self, suggested_name: &str, format: ExportFormat) -> Result<Option<ExportHandle>>;
}

/// Non-interactive picker that accepts every request into a fixed directory.
///
/// This is the fallback used when no native picker capability is available:
/// the suggested name becomes the final name, the way a browser download
/// would land in the downloads folder.
#[derive(Debug, Clone)]
pub struct DirectoryPicker {
    dir: PathBuf,
}

impl DirectoryPicker {
    /// Target every export at `dir`, creating it if needed.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .map_err(|err| Error::Export(format!("{}: {err}", dir.display())))?;
        Ok(Self { dir })
    }
}

impl DestinationPicker for DirectoryPicker {
    fn pick(&self, suggested_name: &str, format: ExportFormat) -> Result<Option<ExportHandle>> {
        Ok(Some(ExportHandle::new(
            self.dir.join(suggested_name),
            format,
        )))
    }
}
