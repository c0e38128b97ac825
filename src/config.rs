//! # Configuration Module
//!
//! Runtime settings for the recommender front end. Settings are read from a
//! JSON file in the platform config directory:
//!
//! - Linux: `~/.config/moodmix/config.json`
//! - macOS: `~/Library/Application Support/moodmix/config.json`
//! - Windows: `%APPDATA%\moodmix\config.json`
//!
//! A missing file means defaults. Any field may be omitted.
//!
//! ```json
//! {
//!   "retrieve_count": 10,
//!   "display_count": 5,
//!   "initial_selection": 5,
//!   "recent_count": 10,
//!   "keywords": [
//!     { "keyword": "hype", "adjustments": { "energy": 0.9, "tempo": 0.6 } }
//!   ]
//! }
//! ```

use crate::keywords::{KeywordEntry, KeywordTable};
use crate::session::{DEFAULT_DISPLAY_COUNT, DEFAULT_RETRIEVE_COUNT};
use anyhow::{Context, Result};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Returns the platform-appropriate config file path.
///
/// The directory is not created; a missing file is not an error for
/// [`RuntimeConfig::load`].
pub fn get_config_path() -> Result<PathBuf> {
    let config_dir = dirs::config_dir().ok_or_else(|| {
        anyhow::anyhow!(
            "Could not determine system config directory. Pass --config to point at a file explicitly."
        )
    })?;

    Ok(config_dir.join("moodmix").join("config.json"))
}

/// Configuration for runtime behavior
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Tracks retrieved per turn
    pub retrieve_count: usize,
    /// Retrieved tracks shown per turn
    pub display_count: usize,
    /// Size of the random starting playlist
    pub initial_selection: usize,
    /// Tracks listed by the `playlist` chat command
    pub recent_count: usize,
    /// Replaces the built-in keyword table when present
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keywords: Option<Vec<KeywordEntry>>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            retrieve_count: DEFAULT_RETRIEVE_COUNT,
            display_count: DEFAULT_DISPLAY_COUNT,
            initial_selection: 5,
            recent_count: 10,
            keywords: None,
        }
    }
}

impl RuntimeConfig {
    /// Loads the config from `path`, or from [`get_config_path`] when `None`.
    ///
    /// An explicit path must exist; the default one may be missing.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => {
                let path = get_config_path()?;
                if path.exists() {
                    Self::from_file(&path)
                } else {
                    debug!("No config at {}, using defaults", path.display());
                    Ok(Self::default())
                }
            }
        }
    }

    /// Parses a JSON config file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Self = serde_json::from_str(&text)
            .with_context(|| format!("Invalid config file {}", path.display()))?;
        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Keyword table from the config, or the built-in one
    #[must_use]
    pub fn keyword_table(&self) -> KeywordTable {
        self.keywords
            .as_deref()
            .map_or_else(KeywordTable::default, KeywordTable::from_entries)
    }
}
