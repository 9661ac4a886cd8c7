//! Configuration management
//!
//! Settings live in `settings.json` inside the data directory:
//! ```json
//! {
//!   "app": { ... },
//!   "currencies": [ { "id": 1, "code": "USD", "name": "US Dollar" } ],
//!   "discounts": [ { "id": 7, "name": "Bulk buy" } ]
//! }
//! ```
//! Fields this crate does not manage are preserved when saving.

use std::collections::HashMap;
use std::path::Path;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::domain::{Currency, Discount};

/// Name of the settings file inside the data directory
pub const SETTINGS_FILE: &str = "settings.json";

/// Raw settings.json structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SettingsFile {
    #[serde(default)]
    app: AppSettings,
    #[serde(default)]
    currencies: Vec<Currency>,
    #[serde(default)]
    discounts: Vec<Discount>,
    #[serde(flatten)]
    other: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AppSettings {
    #[serde(flatten)]
    other: HashMap<String, serde_json::Value>,
}

/// Item-count configuration (simplified view of settings)
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub currencies: Vec<Currency>,
    pub discounts: Vec<Discount>,
    // Keep the raw settings for preservation when saving
    _raw_settings: SettingsFile,
}

impl Config {
    /// Load config from the data directory
    ///
    /// A missing settings file yields the default config; a malformed one
    /// is an error.
    pub fn load(data_dir: &Path) -> Result<Self> {
        let settings_path = data_dir.join(SETTINGS_FILE);

        let raw: SettingsFile = if settings_path.exists() {
            let content = std::fs::read_to_string(&settings_path)?;
            serde_json::from_str(&content)?
        } else {
            SettingsFile::default()
        };

        Ok(Self {
            currencies: raw.currencies.clone(),
            discounts: raw.discounts.clone(),
            _raw_settings: raw,
        })
    }

    /// Save config to the data directory
    /// Preserves other settings that this crate doesn't manage
    pub fn save(&self, data_dir: &Path) -> Result<()> {
        let settings_path = data_dir.join(SETTINGS_FILE);

        let mut settings = if settings_path.exists() {
            let content = std::fs::read_to_string(&settings_path)?;
            serde_json::from_str::<SettingsFile>(&content).unwrap_or_default()
        } else {
            self._raw_settings.clone()
        };

        settings.currencies = self.currencies.clone();
        settings.discounts = self.discounts.clone();

        let content = serde_json::to_string_pretty(&settings)?;
        std::fs::write(&settings_path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempdir().unwrap();
        let config = Config::load(dir.path()).unwrap();
        assert!(config.currencies.is_empty());
        assert!(config.discounts.is_empty());
    }

    #[test]
    fn test_load_catalog_and_preserve_unknown_fields() {
        let dir = tempdir().unwrap();
        std::fs::write(
            dir.path().join(SETTINGS_FILE),
            r#"{
                "app": { "theme": "dark" },
                "currencies": [{ "id": 1, "code": "USD", "name": "US Dollar" }],
                "discounts": [{ "id": 7, "name": "Bulk buy" }],
                "plugins": { "keep": true }
            }"#,
        )
        .unwrap();

        let mut config = Config::load(dir.path()).unwrap();
        assert_eq!(config.currencies[0].code, "USD");
        assert_eq!(config.discounts[0].id, 7);

        config.discounts.push(Discount {
            id: 8,
            name: "Second".to_string(),
        });
        config.save(dir.path()).unwrap();

        let content = std::fs::read_to_string(dir.path().join(SETTINGS_FILE)).unwrap();
        let value: serde_json::Value = serde_json::from_str(&content).unwrap();
        assert_eq!(value["plugins"]["keep"], true);
        assert_eq!(value["app"]["theme"], "dark");
        assert_eq!(value["discounts"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join(SETTINGS_FILE), "{ not json").unwrap();
        assert!(Config::load(dir.path()).is_err());
    }
}
