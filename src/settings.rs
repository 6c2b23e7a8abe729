//! # Settings
//!
//! Window resolution and music toggle, persisted as JSON.
//!
//! Settings never affect the simulation. A missing or unreadable file is not
//! an error for the game: [`Settings::load`] falls back to defaults.

use crate::KiikkuResult;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Window size in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Default for Resolution {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub resolution: Resolution,
    pub music: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self::new()
    }
}

impl Settings {
    /// Default settings with music on.
    pub fn new() -> Self {
        Self {
            resolution: Resolution::default(),
            music: true,
        }
    }

    /// Reads settings from a JSON file.
    pub fn try_load(path: &Path) -> KiikkuResult<Self> {
        let text = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Reads settings, falling back to defaults when the file is missing or
    /// malformed.
    ///
    /// # Examples
    ///
    /// ```
    /// use kiikku::Settings;
    /// use std::path::Path;
    ///
    /// let settings = Settings::load(Path::new("/definitely/not/here.json"));
    /// assert_eq!(settings, Settings::new());
    /// ```
    pub fn load(path: &Path) -> Self {
        match Self::try_load(path) {
            Ok(settings) => settings,
            Err(e) => {
                log::warn!(
                    "Could not read settings from {}: {}; using defaults",
                    path.display(),
                    e
                );
                Self::new()
            }
        }
    }

    /// Writes settings as pretty-printed JSON.
    pub fn save(&self, path: &Path) -> KiikkuResult<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}
