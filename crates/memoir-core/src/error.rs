//! Error types for memoir-core

use thiserror::Error;

use crate::models::EntryId;

/// Result type alias using memoir-core's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in memoir-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// Entry title or content rejected before any mutation
    #[error("Invalid entry: {0}")]
    Validation(String),

    /// No entry with the given id
    #[error("Entry not found: {0}")]
    NotFound(EntryId),

    /// The durable mirror rejected a write
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// The durable mirror holds data that no longer parses
    #[error("Stored journal is corrupted: {0}")]
    Corruption(String),

    /// An export write or overwrite failed
    #[error("Export error: {0}")]
    Export(String),
}
