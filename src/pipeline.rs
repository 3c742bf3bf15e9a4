//! Per-run orchestration.
//!
//! One run walks every enabled region in order: navigate, capture, OCR,
//! normalize, ingest into the region's history, compute deltas, publish.
//! A region's failure is logged and the next region proceeds; nothing in a
//! run retries.

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use std::path::Path;

use crate::capture::{capture_region_to_png, CaptureRect};
use crate::config::{AppConfig, RegionConfig};
use crate::history::{
    clean_point_text, compute_deltas, BucketKey, NameMap, RankingEntry, SnapshotStore,
};
use crate::navigator::UiNavigator;
use crate::ocr::{GeminiClient, RankingResponse};
use crate::paths;
use crate::report::console::{format_report, CONSOLE_WINDOWS};
use crate::report::csv;
use crate::webhook::send_discord_webhook;

/// Runs the full pipeline once over every enabled region.
///
/// Only client construction can fail here; per-region errors are logged and
/// isolated so one broken region never starves the others.
pub fn run_all_regions(
    config: &AppConfig,
    names: &NameMap,
    navigator: &dyn UiNavigator,
) -> Result<()> {
    let now = Local::now();
    crate::log(&format!("Worker run at {}", now.format("%Y-%m-%d %H:%M:%S")));

    let ocr_client = if config.enabled_regions().any(|r| r.ocr) {
        Some(GeminiClient::new(&config.gemini_api_key)?)
    } else {
        None
    };

    for region in config.enabled_regions() {
        if crate::scheduler::stop_requested() {
            crate::log("Stop requested, abandoning remaining regions");
            break;
        }
        if let Err(e) = process_region(region, ocr_client.as_ref(), names, navigator, now) {
            crate::log(&format!(
                "Error in {}: {:#}",
                region.display_name(),
                e
            ));
        }
    }

    Ok(())
}

/// Processes one region: capture always happens; OCR, history, and report
/// only for tracking regions; the webhook fires whenever one is configured,
/// with whatever report text this run produced.
fn process_region(
    region: &RegionConfig,
    ocr_client: Option<&GeminiClient>,
    names: &NameMap,
    navigator: &dyn UiNavigator,
    now: DateTime<Local>,
) -> Result<()> {
    let rect = CaptureRect::parse(&region.region)?;

    navigator.navigate_to_ranking_screen()?;

    let file_name = format!("{}.png", now.format("%Y%m%d%H%M"));
    let image_path = paths::get_screenshot_dir(region.index).join(file_name);
    crate::log(&format!(
        "Capturing {} -> {}",
        region.display_name(),
        image_path.display()
    ));
    capture_region_to_png(&rect, &image_path)?;

    let bucket = BucketKey::from_local(now);
    let mut report_lines = Vec::new();

    if region.ocr {
        if let Some(client) = ocr_client {
            match update_history(region, client, names, &bucket, &image_path) {
                Ok(lines) => report_lines = lines,
                // The snapshot for this hour is simply missing; deltas
                // against it will read as zero until the next capture.
                Err(e) => crate::log(&format!(
                    "OCR update skipped for {}: {:#}",
                    region.display_name(),
                    e
                )),
            }
        }
    }

    if !region.webhook_url.is_empty() {
        if let Err(e) = send_discord_webhook(
            &region.webhook_url,
            bucket.as_str(),
            &report_lines.join("\n"),
            Some(&image_path),
        ) {
            crate::log(&format!(
                "Discord webhook failed for {}: {:#}",
                region.display_name(),
                e
            ));
        }
    }

    if !report_lines.is_empty() {
        println!("{}", report_lines.join("\n"));
    }

    Ok(())
}

/// OCRs the screenshot, merges the snapshot into the region's history, and
/// returns the formatted report lines.
fn update_history(
    region: &RegionConfig,
    client: &GeminiClient,
    names: &NameMap,
    bucket: &BucketKey,
    image_path: &Path,
) -> Result<Vec<String>> {
    let png_bytes = std::fs::read(image_path)
        .context(format!("Failed to read {}", image_path.display()))?;
    let response = client.extract_ranking(&png_bytes)?;
    let entries = normalized_entries(&response, names);

    let mut store = SnapshotStore::load(&paths::history_path(region.index));
    if let Err(e) = store.ingest(bucket, entries.clone()) {
        // In-memory state is current; the previous durable copy is intact.
        crate::log(&format!(
            "Failed to persist history for {}: {:#}",
            region.display_name(),
            e
        ));
    }

    let deltas = compute_deltas(&store, bucket, &entries, &CONSOLE_WINDOWS);
    let lines = format_report(&entries, &deltas);

    if let Err(e) = csv::export(&store, &paths::csv_path(region.index)) {
        crate::log(&format!(
            "CSV export failed for {}: {:#}",
            region.display_name(),
            e
        ));
    }

    Ok(lines)
}

/// Converts the OCR response into storable entries: names normalized, point
/// text cleaned, ranks renumbered 1..n in arrival order.
pub fn normalized_entries(response: &RankingResponse, names: &NameMap) -> Vec<RankingEntry> {
    response
        .ranking
        .iter()
        .enumerate()
        .map(|(i, raw)| RankingEntry {
            rank: (i + 1).to_string(),
            name: names.normalize(&raw.name).to_string(),
            pt: clean_point_text(&raw.pt),
        })
        .collect()
}

/// Rebuilds the CSV export for every region directory found on disk.
/// Used by export mode; needs no configuration or network.
pub fn export_all_csv() -> Result<()> {
    let indices = paths::discover_region_indices();
    if indices.is_empty() {
        crate::log("No region history found under res/");
        return Ok(());
    }
    for index in indices {
        let store = SnapshotStore::load(&paths::history_path(index));
        if store.is_empty() {
            crate::log(&format!("Region {}: no history, skipping", index));
            continue;
        }
        let csv_path = paths::csv_path(index);
        csv::export(&store, &csv_path)
            .context(format!("CSV export failed for region {}", index))?;
        crate::log(&format!(
            "Region {}: exported {} buckets to {}",
            index,
            store.len(),
            csv_path.display()
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ocr::client::parse_ranking_text;

    #[test]
    fn test_normalized_entries_renumber_and_clean() {
        let response = parse_ranking_text(
            r#"{"ranking": [
                {"rank": "3", "name": "A1ice", "pt": "1,000pt"},
                {"rank": "9", "name": "Bob", "pt": ""}
            ]}"#,
        )
        .unwrap();
        let names = NameMap::from_pairs(&[("A1ice", "Alice")]);

        let entries = normalized_entries(&response, &names);

        assert_eq!(entries.len(), 2);
        // Ranks come from arrival order, not the OCR's rank strings
        assert_eq!(entries[0].rank, "1");
        assert_eq!(entries[1].rank, "2");
        assert_eq!(entries[0].name, "Alice");
        assert_eq!(entries[0].pt, "1,000");
        assert_eq!(entries[1].pt, "0");
    }

    #[test]
    fn test_normalized_entries_empty_response() {
        let response = parse_ranking_text(r#"{"ranking": []}"#).unwrap();
        let names = NameMap::default();
        assert!(normalized_entries(&response, &names).is_empty());
    }
}
