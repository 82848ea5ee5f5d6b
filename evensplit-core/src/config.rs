//! Configuration management
//!
//! Settings live in `settings.json` inside the data directory:
//! ```json
//! {
//!   "app": { "databaseFile": "evensplit.duckdb", "currencySymbol": "$" }
//! }
//! ```
//! Keys this crate does not know about are kept when the file is saved.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Settings file name inside the data directory
pub const SETTINGS_FILENAME: &str = "settings.json";

/// Database file used when none is configured
pub const DEFAULT_DATABASE_FILE: &str = "evensplit.duckdb";

/// Currency symbol used for display when none is configured
pub const DEFAULT_CURRENCY_SYMBOL: &str = "$";

/// Environment variable overriding the database file name
pub const DATABASE_ENV_VAR: &str = "EVENSPLIT_DATABASE";

/// Raw settings.json structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SettingsFile {
    #[serde(default)]
    app: AppSettings,
    #[serde(flatten)]
    other: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AppSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    database_file: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    currency_symbol: Option<String>,
    #[serde(flatten)]
    other: HashMap<String, serde_json::Value>,
}

/// EvenSplit configuration (resolved view of settings)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    pub database_file: String,
    pub currency_symbol: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_file: DEFAULT_DATABASE_FILE.to_string(),
            currency_symbol: DEFAULT_CURRENCY_SYMBOL.to_string(),
        }
    }
}

fn read_settings(settings_path: &Path) -> Result<SettingsFile> {
    if !settings_path.exists() {
        return Ok(SettingsFile::default());
    }
    let content = std::fs::read_to_string(settings_path)
        .with_context(|| format!("Failed to read {}", settings_path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Invalid settings file {}", settings_path.display()))
}

impl Config {
    /// Load config from the data directory
    ///
    /// The database file can be overridden with `EVENSPLIT_DATABASE`
    /// (useful for tests and scripts).
    pub fn load(data_dir: &Path) -> Result<Self> {
        let raw = read_settings(&data_dir.join(SETTINGS_FILENAME))?;
        let defaults = Self::default();

        let database_file = match std::env::var(DATABASE_ENV_VAR) {
            Ok(file) if !file.trim().is_empty() => file,
            _ => raw.app.database_file.unwrap_or(defaults.database_file),
        };

        Ok(Self {
            database_file,
            currency_symbol: raw.app.currency_symbol.unwrap_or(defaults.currency_symbol),
        })
    }

    /// Save config to the data directory, preserving settings we don't manage
    pub fn save(&self, data_dir: &Path) -> Result<()> {
        let settings_path = data_dir.join(SETTINGS_FILENAME);
        let mut settings = read_settings(&settings_path)?;

        settings.app.database_file = Some(self.database_file.clone());
        settings.app.currency_symbol = Some(self.currency_symbol.clone());

        let content = serde_json::to_string_pretty(&settings)?;
        std::fs::write(&settings_path, content)
            .with_context(|| format!("Failed to write {}", settings_path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults_without_settings_file() {
        let dir = tempdir().unwrap();
        let config = Config::load(dir.path()).unwrap();

        assert_eq!(config.currency_symbol, "$");
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempdir().unwrap();
        let config = Config {
            database_file: "trip.duckdb".to_string(),
            currency_symbol: "€".to_string(),
        };
        config.save(dir.path()).unwrap();

        let loaded = Config::load(dir.path()).unwrap();
        assert_eq!(loaded.currency_symbol, "€");
    }

    #[test]
    fn test_save_preserves_unknown_keys() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(SETTINGS_FILENAME);
        std::fs::write(
            &path,
            r#"{"app": {"theme": "dark", "currencySymbol": "£"}, "plugins": {"x": 1}}"#,
        )
        .unwrap();

        let mut config = Config::load(dir.path()).unwrap();
        assert_eq!(config.currency_symbol, "£");
        config.currency_symbol = "CHF".to_string();
        config.save(dir.path()).unwrap();

        let saved: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(saved["app"]["theme"], "dark");
        assert_eq!(saved["app"]["currencySymbol"], "CHF");
        assert_eq!(saved["plugins"]["x"], 1);
    }

    #[test]
    fn test_malformed_settings_is_an_error() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join(SETTINGS_FILENAME), "{ not json").unwrap();

        assert!(Config::load(dir.path()).is_err());
    }
}
