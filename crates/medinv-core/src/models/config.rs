//! Configuration structures for label scanning and the inventory.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::medication::DEFAULT_WARN_WITHIN_DAYS;

/// Main configuration for medinv.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MedinvConfig {
    /// Label extraction configuration.
    pub extraction: ExtractionConfig,

    /// Inventory storage configuration.
    pub inventory: InventoryConfig,
}

/// Label extraction configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Trimmed lines shorter than this are ignored.
    pub min_line_length: usize,

    /// Longest line accepted as a product name.
    pub max_name_length: usize,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            min_line_length: 2,
            max_name_length: 90,
        }
    }
}

/// Inventory storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InventoryConfig {
    /// SQLite database file.
    pub database: PathBuf,

    /// Medications expiring within this many days are flagged.
    pub warn_within_days: i64,
}

impl Default for InventoryConfig {
    fn default() -> Self {
        Self {
            database: PathBuf::from("medinv.sqlite"),
            warn_within_days: DEFAULT_WARN_WITHIN_DAYS,
        }
    }
}

impl MedinvConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;
        std::fs::write(path, content)
    }
}
