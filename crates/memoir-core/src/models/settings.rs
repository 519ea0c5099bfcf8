//! Journal settings model

use serde::{Deserialize, Serialize};

/// Cosmetic settings persisted as one unit under the `journalSettings` key,
/// independent of the entry collection.
///
/// Fields missing from an older payload fall back to their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    /// Active theme id (e.g. "theme-default", "theme-green")
    pub current_theme: String,
    /// Dark mode flag
    pub dark_mode: bool,
    /// Optional background image as a data URL
    pub background_image: Option<String>,
    /// Display title shown on the journal cover
    pub journal_title: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            current_theme: "theme-default".to_string(),
            dark_mode: false,
            background_image: None,
            journal_title: "My Digital Journal".to_string(),
        }
    }
}
