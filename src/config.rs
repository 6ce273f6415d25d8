//! Application Configuration Module
//! Optional `dashboard.json` overriding the data source and UI defaults.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::warn;

/// Config file looked up in the working directory at startup.
pub const CONFIG_FILE: &str = "dashboard.json";

fn default_source_path() -> PathBuf {
    PathBuf::from("yearly_deaths_by_clinic.csv")
}

fn default_clinic_preselect() -> usize {
    3
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AppConfig {
    /// CSV file loaded at startup.
    #[serde(default = "default_source_path")]
    pub source_path: PathBuf,
    /// How many clinics (alphabetical) start selected in the clinic filter.
    /// Zero starts with none selected, which means no clinic restriction.
    #[serde(default = "default_clinic_preselect")]
    pub clinic_preselect: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            source_path: default_source_path(),
            clinic_preselect: default_clinic_preselect(),
        }
    }
}

impl AppConfig {
    /// Read `dashboard.json` from the working directory; a missing file is
    /// normal and a malformed one is logged and ignored.
    pub fn load_or_default() -> Self {
        Self::load_from(Path::new(CONFIG_FILE))
    }

    fn load_from(path: &Path) -> Self {
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(_) => return Self::default(),
        };

        match serde_json::from_str(&raw) {
            Ok(config) => config,
            Err(err) => {
                warn!(path = %path.display(), %err, "malformed config, using defaults");
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(
            config.source_path,
            PathBuf::from("yearly_deaths_by_clinic.csv")
        );
        assert_eq!(config.clinic_preselect, 3);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config: AppConfig = serde_json::from_str(r#"{"clinic_preselect": 5}"#).unwrap();
        assert_eq!(config.clinic_preselect, 5);
        assert_eq!(
            config.source_path,
            PathBuf::from("yearly_deaths_by_clinic.csv")
        );
    }

    #[test]
    fn test_full_json_round_trip() {
        let config = AppConfig {
            source_path: PathBuf::from("data/other.csv"),
            clinic_preselect: 0,
        };
        let raw = serde_json::to_string(&config).unwrap();
        let back: AppConfig = serde_json::from_str(&raw).unwrap();
        assert_eq!(back, config);
    }
}
