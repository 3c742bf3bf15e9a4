//! Application configuration.
//!
//! Loaded once at startup from `config.json` next to the executable into an
//! immutable struct that is passed down by reference. No component reads the
//! process environment. Missing configuration is fatal for capture modes:
//! without an API key and regions there is nothing to track.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

use crate::capture::CaptureRect;

fn default_true() -> bool {
    true
}

fn default_desired_minutes() -> String {
    "1,15,30".to_string()
}

/// One capture region.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RegionConfig {
    /// Region index, also the name of its output directory under `res/`.
    pub index: u32,
    /// Display name used in logs.
    #[serde(default)]
    pub name: String,
    /// Capture rectangle as `"x,y,width,height"` in screen coordinates.
    pub region: String,
    /// Discord webhook for this region's report; empty = no delivery.
    #[serde(default)]
    pub webhook_url: String,
    /// Disabled regions are skipped entirely.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// When false the region is archival: captured and delivered, never
    /// OCR'd or tracked (the full-screen region-0 role).
    #[serde(default = "default_true")]
    pub ocr: bool,
}

impl RegionConfig {
    pub fn display_name(&self) -> String {
        if self.name.is_empty() {
            format!("Region {}", self.index)
        } else {
            self.name.clone()
        }
    }
}

/// Complete tracker configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AppConfig {
    /// Gemini API key; required whenever an enabled region has OCR on.
    #[serde(default)]
    pub gemini_api_key: String,
    /// Comma-separated minutes of each hour at which the loop fires.
    #[serde(default = "default_desired_minutes")]
    pub desired_minutes: String,
    #[serde(default)]
    pub regions: Vec<RegionConfig>,
    /// External navigation helper run before each capture; empty = none.
    #[serde(default)]
    pub navigator_script: String,
}

impl AppConfig {
    /// Loads and validates the configuration. A missing file is a startup
    /// error: the capture modes cannot run on defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            bail!(
                "Configuration not found: {}. Create it next to the executable.",
                path.display()
            );
        }
        let contents = std::fs::read_to_string(path)
            .context(format!("Failed to read {}", path.display()))?;
        let config: AppConfig = serde_json::from_str(&contents)
            .context(format!("Failed to parse {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.regions.is_empty() {
            bail!("Configuration has no regions");
        }

        let mut seen = HashSet::new();
        for region in &self.regions {
            if !seen.insert(region.index) {
                bail!("Duplicate region index: {}", region.index);
            }
            CaptureRect::parse(&region.region)
                .context(format!("Invalid region {} rectangle", region.index))?;
        }

        let needs_ocr = self.regions.iter().any(|r| r.enabled && r.ocr);
        if needs_ocr && self.gemini_api_key.is_empty() {
            bail!("gemini_api_key is required while OCR-enabled regions exist");
        }

        crate::scheduler::parse_desired_minutes(&self.desired_minutes)
            .context("Invalid desired_minutes")?;

        Ok(())
    }

    /// Enabled regions in configuration order.
    pub fn enabled_regions(&self) -> impl Iterator<Item = &RegionConfig> {
        self.regions.iter().filter(|r| r.enabled)
    }

    /// Indices of all configured regions, for directory setup.
    pub fn region_indices(&self) -> Vec<u32> {
        self.regions.iter().map(|r| r.index).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_config(contents: &str) -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, contents).unwrap();
        (dir, path)
    }

    #[test]
    fn test_load_minimal_config() {
        let (_dir, path) = write_config(
            r#"{
                "gemini_api_key": "key",
                "regions": [
                    {"index": 1, "region": "191,0,535,722", "webhook_url": "https://example.test/hook"}
                ]
            }"#,
        );
        let config = AppConfig::load(&path).unwrap();
        assert_eq!(config.desired_minutes, "1,15,30");
        assert_eq!(config.regions.len(), 1);
        assert!(config.regions[0].enabled);
        assert!(config.regions[0].ocr);
    }

    #[test]
    fn test_missing_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(AppConfig::load(&dir.path().join("config.json")).is_err());
    }

    #[test]
    fn test_missing_api_key_with_ocr_region_is_error() {
        let (_dir, path) = write_config(
            r#"{"regions": [{"index": 1, "region": "0,0,100,100"}]}"#,
        );
        assert!(AppConfig::load(&path).is_err());
    }

    #[test]
    fn test_archival_only_regions_need_no_api_key() {
        let (_dir, path) = write_config(
            r#"{"regions": [{"index": 0, "region": "0,0,100,100", "ocr": false}]}"#,
        );
        assert!(AppConfig::load(&path).is_ok());
    }

    #[test]
    fn test_invalid_rectangle_is_error() {
        let (_dir, path) = write_config(
            r#"{
                "gemini_api_key": "key",
                "regions": [{"index": 1, "region": "not-a-rect"}]
            }"#,
        );
        assert!(AppConfig::load(&path).is_err());
    }

    #[test]
    fn test_duplicate_region_index_is_error() {
        let (_dir, path) = write_config(
            r#"{
                "gemini_api_key": "key",
                "regions": [
                    {"index": 1, "region": "0,0,10,10"},
                    {"index": 1, "region": "0,0,20,20"}
                ]
            }"#,
        );
        assert!(AppConfig::load(&path).is_err());
    }

    #[test]
    fn test_disabled_regions_excluded_from_enabled_iter() {
        let (_dir, path) = write_config(
            r#"{
                "gemini_api_key": "key",
                "regions": [
                    {"index": 1, "region": "0,0,10,10"},
                    {"index": 2, "region": "0,0,10,10", "enabled": false}
                ]
            }"#,
        );
        let config = AppConfig::load(&path).unwrap();
        let enabled: Vec<u32> = config.enabled_regions().map(|r| r.index).collect();
        assert_eq!(enabled, vec![1]);
        assert_eq!(config.region_indices(), vec![1, 2]);
    }

    #[test]
    fn test_invalid_desired_minutes_is_error() {
        let (_dir, path) = write_config(
            r#"{
                "gemini_api_key": "key",
                "desired_minutes": "5,nope",
                "regions": [{"index": 1, "region": "0,0,10,10"}]
            }"#,
        );
        assert!(AppConfig::load(&path).is_err());
    }

    #[test]
    fn test_display_name_falls_back_to_index() {
        let region = RegionConfig {
            index: 3,
            name: String::new(),
            region: "0,0,1,1".into(),
            webhook_url: String::new(),
            enabled: true,
            ocr: true,
        };
        assert_eq!(region.display_name(), "Region 3");
    }
}
