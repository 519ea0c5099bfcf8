//! Document renderer seam.

use crate::error::Result;
use crate::models::Entry;

/// External collaborator that turns entries into paginated document bytes
/// (PDF or similar).
///
/// Page layout, fonts, and image placement are the renderer's business; the
/// export sink only moves the bytes it returns. Rendering must be
/// deterministic for identical input, so overwriting an existing export with
/// unchanged content produces byte-identical files.
pub trait DocumentRenderer {
    /// Render a single entry as one document
    fn render_entry(&self, entry: &Entry) -> Result<Vec<u8>>;

    /// Render the whole collection as one document, one entry per section
    fn render_collection(&self, entries: &[Entry]) -> Result<Vec<u8>>;
}
