//! Human-readable report formatting.
//!
//! Produces the fixed-width per-player blocks sent to the console and the
//! Discord webhook. Deltas render as sign-prefixed, comma-grouped integers
//! (`+1,234`, `-567`) with a bare `0` for no change — which, by design, is
//! also what "no history at that offset" looks like.

use std::collections::BTreeMap;

use crate::history::{DeltaResult, RankingEntry};

/// Lookback windows shown in console and webhook reports.
pub const CONSOLE_WINDOWS: [u32; 4] = [1, 6, 12, 24];

/// Groups the digits of a non-negative number with commas.
pub fn add_commas(n: i64) -> String {
    debug_assert!(n >= 0);
    let digits = n.to_string();
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Formats a point delta: `+1,234`, `-567`, or `0`.
pub fn format_point_diff(diff: i64) -> String {
    if diff == 0 {
        "0".to_string()
    } else if diff > 0 {
        format!("+{}", add_commas(diff))
    } else {
        format!("-{}", add_commas(-diff))
    }
}

/// Formats one player's block: rank, name, points, then the four window
/// deltas right-aligned in two indented lines.
pub fn format_entry_block(rank: usize, name: &str, points: &str, diffs: [i64; 4]) -> String {
    format!(
        "{}. {:<20} {:>12}\n   1h:{:>12} 6h:{:>12}\n  12h:{:>12} 24h:{:>12}",
        rank,
        name,
        points,
        format_point_diff(diffs[0]),
        format_point_diff(diffs[1]),
        format_point_diff(diffs[2]),
        format_point_diff(diffs[3]),
    )
}

/// Builds the full report: one block per entry, in rank order.
///
/// `deltas` is the output of `compute_deltas` for `CONSOLE_WINDOWS`; the
/// per-window lists parallel `entries` by index.
pub fn format_report(
    entries: &[RankingEntry],
    deltas: &BTreeMap<u32, Vec<DeltaResult>>,
) -> Vec<String> {
    entries
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            let mut diffs = [0i64; 4];
            for (slot, window) in CONSOLE_WINDOWS.iter().enumerate() {
                diffs[slot] = deltas
                    .get(window)
                    .and_then(|list| list.get(i))
                    .map(|d| d.delta)
                    .unwrap_or(0);
            }
            format_entry_block(i + 1, &entry.name, &entry.pt, diffs)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_commas() {
        assert_eq!(add_commas(0), "0");
        assert_eq!(add_commas(999), "999");
        assert_eq!(add_commas(1000), "1,000");
        assert_eq!(add_commas(567), "567");
        assert_eq!(add_commas(1234567), "1,234,567");
    }

    #[test]
    fn test_format_point_diff() {
        assert_eq!(format_point_diff(1234), "+1,234");
        assert_eq!(format_point_diff(-567), "-567");
        assert_eq!(format_point_diff(-1234567), "-1,234,567");
        assert_eq!(format_point_diff(0), "0");
    }

    #[test]
    fn test_entry_block_layout() {
        let block = format_entry_block(1, "Alice", "1,200", [200, 0, 0, -50]);
        let lines: Vec<&str> = block.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("1. Alice"));
        assert!(lines[1].contains("1h:"));
        assert!(lines[1].contains("+200"));
        assert!(lines[2].contains("24h:"));
        assert!(lines[2].contains("-50"));
    }

    #[test]
    fn test_format_report_one_block_per_entry() {
        use crate::history::{compute_deltas, BucketKey, RankingEntry, SnapshotStore};
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::empty(&dir.path().join("datas.json"));

        let entries = vec![
            RankingEntry {
                rank: "1".into(),
                name: "Alice".into(),
                pt: "1,200".into(),
            },
            RankingEntry {
                rank: "2".into(),
                name: "Bob".into(),
                pt: "900".into(),
            },
        ];
        let deltas = compute_deltas(
            &store,
            &BucketKey::new("2024010111"),
            &entries,
            &CONSOLE_WINDOWS,
        );

        let report = format_report(&entries, &deltas);
        assert_eq!(report.len(), 2);
        assert!(report[0].starts_with("1. Alice"));
        assert!(report[1].starts_with("2. Bob"));
    }
}
