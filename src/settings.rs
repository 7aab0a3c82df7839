use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::aliases::DEFAULT_SIMILARITY_THRESHOLD;
use crate::error::{LedgerError, Result};
use crate::models::Denomination;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub data_dir: String,
    #[serde(default = "default_denomination")]
    pub default_denomination: Denomination,
    #[serde(default = "default_similarity_threshold")]
    pub similarity_threshold: f64,
    /// Allowed imbalance, in hundredths of the display unit.
    #[serde(default = "default_balance_tolerance")]
    pub balance_tolerance: i64,
}

fn default_denomination() -> Denomination {
    Denomination::Cents
}

fn default_similarity_threshold() -> f64 {
    DEFAULT_SIMILARITY_THRESHOLD
}

fn default_balance_tolerance() -> i64 {
    1
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir().to_string_lossy().to_string(),
            default_denomination: default_denomination(),
            similarity_threshold: default_similarity_threshold(),
            balance_tolerance: default_balance_tolerance(),
        }
    }
}

fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("homegame")
}

fn settings_path() -> PathBuf {
    config_dir().join("settings.json")
}

fn default_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("Documents")
        .join("homegame")
}

pub fn load_settings() -> Settings {
    let path = settings_path();
    if path.exists() {
        let content = std::fs::read_to_string(&path).unwrap_or_default();
        serde_json::from_str(&content).unwrap_or_else(|e| {
            log::warn!("ignoring unreadable settings at {}: {e}", path.display());
            Settings::default()
        })
    } else {
        Settings::default()
    }
}

pub fn save_settings(settings: &Settings) -> Result<()> {
    let dir = config_dir();
    std::fs::create_dir_all(&dir)?;
    let json = serde_json::to_string_pretty(settings)
        .map_err(|e| LedgerError::Settings(e.to_string()))?;
    std::fs::write(settings_path(), format!("{json}\n"))?;
    Ok(())
}

pub fn get_data_dir() -> PathBuf {
    PathBuf::from(&load_settings().data_dir)
}

pub fn db_path() -> PathBuf {
    get_data_dir().join("homegame.db")
}

pub fn shellexpand_path(path: &str) -> String {
    if path.starts_with('~') {
        if let Some(home) = dirs::home_dir() {
            return path.replacen('~', &home.to_string_lossy(), 1);
        }
    }
    std::fs::canonicalize(path)
        .unwrap_or_else(|_| PathBuf::from(path))
        .to_string_lossy()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let settings = Settings {
            data_dir: "/tmp/test".to_string(),
            default_denomination: Denomination::Dollars,
            similarity_threshold: 0.8,
            balance_tolerance: 5,
        };
        let json = serde_json::to_string_pretty(&settings).unwrap();
        std::fs::write(&path, &json).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        let loaded: Settings = serde_json::from_str(&content).unwrap();
        assert_eq!(loaded.data_dir, "/tmp/test");
        assert_eq!(loaded.default_denomination, Denomination::Dollars);
        assert_eq!(loaded.similarity_threshold, 0.8);
        assert_eq!(loaded.balance_tolerance, 5);
    }

    #[test]
    fn test_defaults() {
        let s = Settings::default();
        assert_eq!(s.default_denomination, Denomination::Cents);
        assert_eq!(s.similarity_threshold, 0.70);
        assert_eq!(s.balance_tolerance, 1);
        assert!(!s.data_dir.is_empty());
    }

    #[test]
    fn test_load_merges_with_defaults() {
        let json = r#"{"data_dir": "/tmp/test", "default_denomination": "dollars"}"#;
        let s: Settings = serde_json::from_str(json).unwrap();
        assert_eq!(s.default_denomination, Denomination::Dollars);
        assert_eq!(s.similarity_threshold, 0.70);
        assert_eq!(s.balance_tolerance, 1);
    }
}
