//! Point-delta computation over lookback windows.
//!
//! Given the snapshot just ingested and a set of lookback windows, finds the
//! snapshot stored at `current − N hours` and computes each player's point
//! gain or loss. Missing history never errors: a player (or a whole bucket)
//! with no past data reports a delta of zero, indistinguishable from a true
//! zero change. Downstream formatting relies on that conflation; keep it.

use std::collections::BTreeMap;

use crate::history::bucket::BucketKey;
use crate::history::store::{RankingEntry, SnapshotStore};

/// The point change of one player over one lookback window.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeltaResult {
    pub name: String,
    pub current_points: i64,
    /// Points at the past bucket, or `None` when the player (or the whole
    /// bucket) has no history at that offset.
    pub prior_points: Option<i64>,
    pub delta: i64,
    pub window_hours: u32,
}

impl DeltaResult {
    /// Window label as shown in reports, e.g. `"24h"`.
    pub fn window_label(&self) -> String {
        format!("{}h", self.window_hours)
    }
}

/// Reduces an OCR point string to digits and commas, the form snapshots are
/// stored in. Anything that reduces to nothing becomes `"0"`.
pub fn clean_point_text(raw: &str) -> String {
    let cleaned: String = raw.chars().filter(|c| c.is_ascii_digit() || *c == ',').collect();
    if cleaned.is_empty() {
        "0".to_string()
    } else {
        cleaned
    }
}

/// Parses a stored point string to an integer. Commas are thousands
/// separators and are dropped wherever they appear (`"1,2,3"` → 123).
/// Anything non-numeric parses as zero, never an error.
pub fn parse_points(s: &str) -> i64 {
    let digits: String = s.chars().filter(|c| c.is_ascii_digit()).collect();
    digits.parse().unwrap_or(0)
}

/// Computes per-player deltas for every requested lookback window.
///
/// Entries are matched by normalized name against the past bucket's list;
/// the first match in rank order wins, so duplicate names resolve to the
/// better-ranked player. The returned lists parallel `current_entries`.
pub fn compute_deltas(
    store: &SnapshotStore,
    current_key: &BucketKey,
    current_entries: &[RankingEntry],
    lookback_hours: &[u32],
) -> BTreeMap<u32, Vec<DeltaResult>> {
    let mut results = BTreeMap::new();

    for &hours in lookback_hours {
        let past_key = current_key.minus_hours(hours as i64);
        let past_entries = past_key
            .as_ref()
            .map(|k| store.lookup(k))
            .unwrap_or(&[]);

        let mut deltas = Vec::with_capacity(current_entries.len());
        for entry in current_entries {
            let current_points = parse_points(&entry.pt);
            let prior_points = past_entries
                .iter()
                .find(|past| past.name == entry.name)
                .map(|past| parse_points(&past.pt));
            let delta = match prior_points {
                Some(prior) => current_points - prior,
                None => 0,
            };
            deltas.push(DeltaResult {
                name: entry.name.clone(),
                current_points,
                prior_points,
                delta,
                window_hours: hours,
            });
        }
        results.insert(hours, deltas);
    }

    results
}
