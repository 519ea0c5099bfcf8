//! Data models for Memoir

mod entry;
mod settings;

pub use entry::{Entry, EntryId};
pub use settings::Settings;
