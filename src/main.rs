//! Ranking Tracker
//!
//! Periodically captures configured leaderboard screen regions, extracts the
//! ranking table with AI OCR, merges each snapshot into an hour-bucketed
//! per-region history, and publishes point deltas over rolling lookback
//! windows to the console, CSV exports, and Discord webhooks.

mod capture;
mod config;
mod history;
mod navigator;
mod nosleep;
mod ocr;
mod paths;
mod pipeline;
mod report;
mod scheduler;
mod webhook;

use anyhow::{bail, Result};
use chrono::Local;
use std::fs::OpenOptions;
use std::io::Write;

use config::AppConfig;
use history::NameMap;

/// Logs a message to both console and log file with timestamp.
pub fn log(msg: &str) {
    let timestamp = Local::now().format("%H:%M:%S%.3f");
    let line = format!("[{}] {}\n", timestamp, msg);
    print!("{}", line);
    let log_path = paths::get_logs_dir().join("ranking_tracker.log");
    if let Ok(mut file) = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
    {
        let _ = file.write_all(line.as_bytes());
    }
}

fn install_panic_hook() {
    std::panic::set_hook(Box::new(|panic_info| {
        let msg = if let Some(s) = panic_info.payload().downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = panic_info.payload().downcast_ref::<String>() {
            s.clone()
        } else {
            "Unknown panic".to_string()
        };
        let location = if let Some(loc) = panic_info.location() {
            format!(" at {}:{}:{}", loc.file(), loc.line(), loc.column())
        } else {
            String::new()
        };
        let log_msg = format!("[PANIC]{} {}\n", location, msg);
        eprintln!("{}", log_msg);
        let log_path = paths::get_logs_dir().join("ranking_tracker.log");
        if let Ok(mut file) = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)
        {
            let _ = file.write_all(log_msg.as_bytes());
        }
    }));
}

fn main() -> Result<()> {
    install_panic_hook();

    let mode = std::env::args().nth(1).unwrap_or_else(|| "once".to_string());
    match mode.as_str() {
        "once" => run_once(),
        "loop" => run_loop(),
        "export" => run_export(),
        other => {
            eprintln!("Usage: ranking-tracker [once|loop|export]");
            bail!("Unknown mode: {}", other);
        }
    }
}

/// Loads configuration and the name map, and prepares the output tree.
fn load_startup() -> Result<(AppConfig, NameMap)> {
    let config = AppConfig::load(&paths::config_path())?;
    let names = NameMap::load(&paths::name_mapping_path())?;
    if !names.is_empty() {
        log(&format!("Loaded {} name mappings", names.len()));
    }
    paths::ensure_directories(&config.region_indices())?;
    Ok((config, names))
}

/// A single pipeline run over all enabled regions.
fn run_once() -> Result<()> {
    let (config, names) = load_startup()?;
    let navigator = navigator::from_script_setting(&config.navigator_script);
    pipeline::run_all_regions(&config, &names, navigator.as_ref())
}

/// The unattended scheduled loop.
fn run_loop() -> Result<()> {
    let (config, names) = load_startup()?;
    let minutes = scheduler::parse_desired_minutes(&config.desired_minutes)?;
    let navigator = navigator::from_script_setting(&config.navigator_script);

    scheduler::reset_stop_flag();
    let _keep_awake = nosleep::KeepAwake::start(true);

    scheduler::run_loop(&config, &names, navigator.as_ref(), &minutes);
    Ok(())
}

/// Rebuilds every region's CSV from stored history. No capture, no network.
fn run_export() -> Result<()> {
    pipeline::export_all_csv()
}
