//! Persistent per-region snapshot store.
//!
//! Holds every hourly ranking snapshot for one capture region, keyed by
//! bucket key, and mirrors the whole map to `datas.json` after each ingest.
//! Ingesting a bucket that already exists replaces that bucket's entries.
//! History is never pruned.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::history::bucket::BucketKey;

/// One ranking row as extracted by OCR and persisted to disk.
///
/// All fields stay strings: `rank` is reassigned sequentially on ingest,
/// `pt` keeps the comma-grouped form the leaderboard displays.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankingEntry {
    pub rank: String,
    pub name: String,
    pub pt: String,
}

/// All persisted snapshots for one region.
pub struct SnapshotStore {
    path: PathBuf,
    map: BTreeMap<String, Vec<RankingEntry>>,
}

impl SnapshotStore {
    /// Loads the store from `path`.
    ///
    /// A missing file is normal (no history yet) and loads as empty. A
    /// malformed file also loads as empty, with a warning: losing a corrupt
    /// history beats refusing to track.
    pub fn load(path: &Path) -> Self {
        let map = match std::fs::read_to_string(path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(map) => map,
                Err(e) => {
                    crate::log(&format!(
                        "Warning: history file {} is malformed ({}), starting empty",
                        path.display(),
                        e
                    ));
                    BTreeMap::new()
                }
            },
            Err(_) => BTreeMap::new(),
        };
        Self {
            path: path.to_path_buf(),
            map,
        }
    }

    /// An empty store that will persist to `path`. Test convenience.
    #[cfg(test)]
    pub fn empty(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            map: BTreeMap::new(),
        }
    }

    /// Replaces the entry list for `key` and rewrites the whole store to
    /// disk. The in-memory map keeps the new entries even if the write
    /// fails; the previous on-disk copy stays intact until a write succeeds.
    pub fn ingest(&mut self, key: &BucketKey, entries: Vec<RankingEntry>) -> Result<()> {
        self.map.insert(key.as_str().to_string(), entries);
        self.persist()
    }

    /// Returns the entries stored for `key`. Absence is common (early
    /// history, gaps in capture) and yields an empty slice, not an error.
    pub fn lookup(&self, key: &BucketKey) -> &[RankingEntry] {
        self.map.get(key.as_str()).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Iterates all snapshots in ascending bucket order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Vec<RankingEntry>)> {
        self.map.iter()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Writes the full map to a temp file in the destination directory and
    /// renames it over `datas.json`, so an interrupted write can never leave
    /// a truncated history behind.
    fn persist(&self) -> Result<()> {
        let dir = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        std::fs::create_dir_all(dir)
            .context(format!("Failed to create history directory: {}", dir.display()))?;

        let json = serde_json::to_string_pretty(&self.map)
            .context("Failed to serialize ranking history")?;

        let mut tmp = tempfile::NamedTempFile::new_in(dir)
            .context("Failed to create temp file for history write")?;
        tmp.write_all(json.as_bytes())
            .context("Failed to write ranking history")?;
        tmp.persist(&self.path)
            .context(format!("Failed to replace {}", self.path.display()))?;
        Ok(())
    }
}
