//! memoir-core - Core library for Memoir
//!
//! This crate contains the journal domain shared by every Memoir frontend:
//! the entry store, its durable mirror in a key-value persistence layer, and
//! the export sink that writes user-chosen copies as JSON, plain text, or
//! rendered documents.

pub mod error;
pub mod export;
pub mod journal;
pub mod kv;
pub mod mirror;
pub mod models;
pub mod store;

pub use error::{Error, Result};
pub use export::{ExportFormat, ExportOutcome, ExportSink};
pub use journal::{ExportStatus, Journal, SaveReport};
pub use models::{Entry, EntryId, Settings};
pub use store::{EntryStore, Mutation};
