use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{LedgerError, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Lines read from the head of a CSV for delimiter and header sniffing.
    #[serde(default = "default_sample_lines")]
    pub sample_lines: usize,
    /// How far into the sample the header row may sit.
    #[serde(default = "default_header_scan_lines")]
    pub header_scan_lines: usize,
    /// Rows shown in the raw preview when nothing renders.
    #[serde(default = "default_preview_rows")]
    pub preview_rows: usize,
    #[serde(default = "default_max_chars")]
    pub max_chars: usize,
    /// Extra header aliases (lower-cased raw header -> column name),
    /// applied after the built-in alias map.
    #[serde(default)]
    pub header_aliases: BTreeMap<String, String>,
}

fn default_sample_lines() -> usize {
    200
}

fn default_header_scan_lines() -> usize {
    50
}

fn default_preview_rows() -> usize {
    10
}

fn default_max_chars() -> usize {
    35_000
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            sample_lines: default_sample_lines(),
            header_scan_lines: default_header_scan_lines(),
            preview_rows: default_preview_rows(),
            max_chars: default_max_chars(),
            header_aliases: BTreeMap::new(),
        }
    }
}

fn config_dir() -> PathBuf {
    dirs::config_dir()
        .or_else(|| dirs::home_dir().map(|h| h.join(".config")))
        .unwrap_or_else(|| PathBuf::from("."))
        .join("ledgerline")
}

pub fn settings_path() -> PathBuf {
    config_dir().join("settings.json")
}

pub fn load_settings() -> Settings {
    let path = settings_path();
    if path.exists() {
        let content = std::fs::read_to_string(&path).unwrap_or_default();
        serde_json::from_str(&content).unwrap_or_default()
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

pub fn settings_file_exists() -> bool {
    settings_path().exists()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let mut settings = Settings {
            max_chars: 1000,
            ..Settings::default()
        };
        settings
            .header_aliases
            .insert("fecha valor".into(), "date".into());
        let json = serde_json::to_string_pretty(&settings).unwrap();
        std::fs::write(&path, &json).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        let loaded: Settings = serde_json::from_str(&content).unwrap();
        assert_eq!(loaded.max_chars, 1000);
        assert_eq!(loaded.header_aliases["fecha valor"], "date");
    }

    #[test]
    fn test_defaults() {
        let s = Settings::default();
        assert_eq!(s.sample_lines, 200);
        assert_eq!(s.header_scan_lines, 50);
        assert_eq!(s.preview_rows, 10);
        assert_eq!(s.max_chars, 35_000);
        assert!(s.header_aliases.is_empty());
    }

    #[test]
    fn test_load_merges_with_defaults() {
        let json = r#"{"preview_rows": 3}"#;
        let s: Settings = serde_json::from_str(json).unwrap();
        assert_eq!(s.preview_rows, 3);
        assert_eq!(s.sample_lines, 200);
    }

    #[test]
    fn test_settings_path_is_json_file() {
        let path = settings_path();
        assert!(path.ends_with("ledgerline/settings.json"));
    }
}
