//! Player-name normalization.
//!
//! OCR regularly misreads stylized player names the same way every run. The
//! name map is a user-maintained raw→corrected substitution table applied
//! before snapshots are stored, so history stays keyed by the corrected name.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Exact-match substitution table loaded from `name-mapping.json`.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct NameMap {
    #[serde(default)]
    name_replaces: HashMap<String, String>,
}

impl NameMap {
    /// Loads the map from `path`. A missing file is fine (empty map); a
    /// malformed file is a configuration error.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)
            .context(format!("Failed to read {}", path.display()))?;
        serde_json::from_str(&contents)
            .context(format!("Failed to parse {}", path.display()))
    }

    #[cfg(test)]
    pub fn from_pairs(pairs: &[(&str, &str)]) -> Self {
        Self {
            name_replaces: pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    /// Returns the corrected name for `raw`, or `raw` unchanged when no
    /// mapping exists. Exact match only, no fuzzy matching.
    pub fn normalize<'a>(&'a self, raw: &'a str) -> &'a str {
        self.name_replaces
            .get(raw)
            .map(String::as_str)
            .unwrap_or(raw)
    }

    pub fn len(&self) -> usize {
        self.name_replaces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.name_replaces.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mapped_name_is_replaced() {
        let map = NameMap::from_pairs(&[("A1ice", "Alice")]);
        assert_eq!(map.normalize("A1ice"), "Alice");
    }

    #[test]
    fn test_unmapped_name_passes_through() {
        let map = NameMap::from_pairs(&[("A1ice", "Alice")]);
        assert_eq!(map.normalize("Bob"), "Bob");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let map = NameMap::from_pairs(&[("A1ice", "Alice"), ("B0b", "Bob")]);
        for raw in ["A1ice", "Alice", "B0b", "unknown"] {
            let once = map.normalize(raw);
            assert_eq!(map.normalize(once), once);
        }
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let map = NameMap::load(&dir.path().join("name-mapping.json")).unwrap();
        assert!(map.is_empty());
    }

    #[test]
    fn test_load_parses_name_replaces_key() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("name-mapping.json");
        std::fs::write(&path, r#"{"name_replaces": {"old word": "new word"}}"#).unwrap();

        let map = NameMap::load(&path).unwrap();
        assert_eq!(map.len(), 1);
        assert_eq!(map.normalize("old word"), "new word");
    }

    #[test]
    fn test_load_malformed_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("name-mapping.json");
        std::fs::write(&path, "{broken").unwrap();
        assert!(NameMap::load(&path).is_err());
    }
}
