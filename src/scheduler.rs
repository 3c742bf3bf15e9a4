//! Wall-clock scheduling for loop mode.
//!
//! Runs fire at fixed minutes of each hour (e.g. `1,15,30`). The loop
//! computes the earliest upcoming trigger, sleeps toward it in short slices
//! so a stop request is honored promptly, then runs the pipeline once. A run
//! always executes to completion; the stop flag is consulted between waits
//! and between regions, never mid-computation.

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Duration as ChronoDuration, Local, Timelike};
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use crate::config::AppConfig;
use crate::history::NameMap;
use crate::navigator::UiNavigator;

/// Global stop flag, set by whatever owns the process lifetime.
static STOP_REQUESTED: AtomicBool = AtomicBool::new(false);

pub fn request_stop() {
    STOP_REQUESTED.store(true, Ordering::SeqCst);
}

pub fn stop_requested() -> bool {
    STOP_REQUESTED.load(Ordering::SeqCst)
}

pub fn reset_stop_flag() {
    STOP_REQUESTED.store(false, Ordering::SeqCst);
}

/// Parses the configured run minutes: comma-separated values in 0..=59.
/// Empty items are skipped; an empty result is an error.
pub fn parse_desired_minutes(input: &str) -> Result<Vec<u32>> {
    let mut minutes = Vec::new();
    for part in input.split(',') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        let minute: u32 = part
            .parse()
            .context(format!("Invalid minute value: {}", part))?;
        if minute > 59 {
            bail!("Minute out of range (0-59): {}", minute);
        }
        minutes.push(minute);
    }
    if minutes.is_empty() {
        bail!("No run minutes configured");
    }
    Ok(minutes)
}

/// The earliest trigger strictly after `now`: each configured minute within
/// the current hour, rolled into the next hour once it has passed.
pub fn next_run_time(now: DateTime<Local>, minutes: &[u32]) -> DateTime<Local> {
    let hour_start = now
        .with_minute(0)
        .and_then(|t| t.with_second(0))
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(now);

    minutes
        .iter()
        .map(|&m| {
            let mut candidate = hour_start + ChronoDuration::minutes(m as i64);
            if candidate <= now {
                candidate = candidate + ChronoDuration::hours(1);
            }
            candidate
        })
        .min()
        .unwrap_or(now + ChronoDuration::hours(1))
}

/// Sleeps until `deadline`, waking every second to check the stop flag.
/// Returns false if a stop was requested before the deadline.
fn sleep_until(deadline: DateTime<Local>) -> bool {
    loop {
        if stop_requested() {
            return false;
        }
        let remaining = deadline - Local::now();
        if remaining <= ChronoDuration::zero() {
            return true;
        }
        let slice = remaining
            .to_std()
            .unwrap_or(Duration::from_secs(1))
            .min(Duration::from_secs(1));
        thread::sleep(slice);
    }
}

/// Runs the scheduled loop until a stop is requested. Pipeline failures are
/// logged and the loop keeps going; the next trigger is unaffected.
pub fn run_loop(
    config: &AppConfig,
    names: &NameMap,
    navigator: &dyn UiNavigator,
    minutes: &[u32],
) {
    crate::log(&format!("Scheduled loop started (minutes: {:?})", minutes));

    loop {
        let now = Local::now();
        let next = next_run_time(now, minutes);
        let wait = next - now;
        crate::log(&format!(
            "Next run at {}, waiting {:.1} seconds",
            next.format("%Y-%m-%d %H:%M:%S"),
            wait.num_milliseconds() as f64 / 1000.0
        ));

        if !sleep_until(next) {
            crate::log("Stop requested, leaving scheduled loop");
            return;
        }

        if let Err(e) = crate::pipeline::run_all_regions(config, names, navigator) {
            crate::log(&format!("Worker error: {}", e));
        }

        if stop_requested() {
            crate::log("Stop requested, leaving scheduled loop");
            return;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn local(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(y, mo, d, h, mi, s).unwrap()
    }

    #[test]
    fn test_parse_desired_minutes() {
        assert_eq!(parse_desired_minutes("1,15,30").unwrap(), vec![1, 15, 30]);
        assert_eq!(parse_desired_minutes(" 5 , 45 ").unwrap(), vec![5, 45]);
        assert_eq!(parse_desired_minutes("0").unwrap(), vec![0]);
    }

    #[test]
    fn test_parse_desired_minutes_rejects_bad_input() {
        assert!(parse_desired_minutes("60").is_err());
        assert!(parse_desired_minutes("abc").is_err());
        assert!(parse_desired_minutes("").is_err());
        assert!(parse_desired_minutes(",,").is_err());
        assert!(parse_desired_minutes("-5").is_err());
    }

    #[test]
    fn test_next_run_picks_earliest_upcoming_minute() {
        let now = local(2024, 1, 1, 10, 10, 0);
        let next = next_run_time(now, &[1, 15, 30]);
        assert_eq!(next, local(2024, 1, 1, 10, 15, 0));
    }

    #[test]
    fn test_next_run_rolls_into_next_hour() {
        let now = local(2024, 1, 1, 10, 45, 0);
        let next = next_run_time(now, &[1, 15, 30]);
        assert_eq!(next, local(2024, 1, 1, 11, 1, 0));
    }

    #[test]
    fn test_next_run_skips_exact_current_instant() {
        // A trigger exactly at `now` belongs to the next hour.
        let now = local(2024, 1, 1, 10, 15, 0);
        let next = next_run_time(now, &[15]);
        assert_eq!(next, local(2024, 1, 1, 11, 15, 0));
    }

    #[test]
    fn test_stop_flag_round_trip() {
        reset_stop_flag();
        assert!(!stop_requested());
        request_stop();
        assert!(stop_requested());
        reset_stop_flag();
        assert!(!stop_requested());
    }
}
