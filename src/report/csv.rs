//! CSV export of the full ranking history.
//!
//! Rewrites one region's `datas.csv` from its complete stored history after
//! every ingest. Each row is one player at one hour bucket, with delta
//! columns for every configured lookback window computed against whatever
//! history exists at that row's bucket. Zero and no-history both render as
//! the `-` placeholder.

use anyhow::{Context, Result};
use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::history::{compute_deltas, BucketKey, SnapshotStore};
use crate::report::console::format_point_diff;

/// Lookback windows exported to CSV: 3-hour steps through the first day,
/// then 12-hour steps out to 7.5 days.
pub const CSV_WINDOWS: [u32; 22] = [
    1, 3, 6, 9, 12, 15, 18, 21, 24, 36, 48, 60, 72, 84, 96, 108, 120, 132, 144, 156, 168, 180,
];

/// Column label for one lookback window: `"6h"`, `"36h(1.5d)"`, `"48h(2d)"`.
fn window_label(hours: u32) -> String {
    if hours < 36 {
        format!("{}h", hours)
    } else if hours % 24 == 0 {
        format!("{}h({}d)", hours, hours / 24)
    } else {
        format!("{}h({:.1}d)", hours, f64::from(hours) / 24.0)
    }
}

/// The fixed header: date-hour, rank, name, points, then one column per
/// lookback window.
pub fn header_fields() -> Vec<String> {
    let mut fields = vec![
        "年月日時".to_string(),
        "順位".to_string(),
        "名前".to_string(),
        "ポイント".to_string(),
    ];
    fields.extend(CSV_WINDOWS.iter().map(|&h| window_label(h)));
    fields
}

/// Quotes a field if it contains a comma, quote, or newline. Point values
/// are comma-grouped strings, so this fires on nearly every row.
fn escape_field(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

fn write_row(file: &mut File, fields: &[String]) -> Result<()> {
    let line: Vec<String> = fields.iter().map(|f| escape_field(f)).collect();
    writeln!(file, "{}", line.join(",")).context("Failed to write CSV row")?;
    Ok(())
}

/// Builds the delta cells for one entry at one bucket.
fn delta_cells(
    entry_index: usize,
    deltas: &std::collections::BTreeMap<u32, Vec<crate::history::DeltaResult>>,
) -> Vec<String> {
    CSV_WINDOWS
        .iter()
        .map(|window| {
            let delta = deltas
                .get(window)
                .and_then(|list| list.get(entry_index))
                .map(|d| d.delta)
                .unwrap_or(0);
            if delta == 0 {
                "-".to_string()
            } else {
                format_point_diff(delta)
            }
        })
        .collect()
}

/// Rewrites the CSV export for one region from its full history.
pub fn export(store: &SnapshotStore, path: &Path) -> Result<()> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)
            .context(format!("Failed to create CSV directory: {}", dir.display()))?;
    }
    let mut file = File::create(path)
        .context(format!("Failed to create CSV file: {}", path.display()))?;

    write_row(&mut file, &header_fields())?;

    for (bucket, entries) in store.iter() {
        let key = BucketKey::new(bucket.clone());
        let deltas = compute_deltas(store, &key, entries, &CSV_WINDOWS);

        for (i, entry) in entries.iter().enumerate() {
            let mut fields = vec![
                bucket.clone(),
                entry.rank.clone(),
                entry.name.clone(),
                entry.pt.clone(),
            ];
            fields.extend(delta_cells(i, &deltas));
            write_row(&mut file, &fields)?;
        }
    }

    Ok(())
}
