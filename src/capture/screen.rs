//! Screen-region capture.
//!
//! Captures a fixed rectangle in global screen coordinates by grabbing the
//! monitor that contains it and cropping. The capture is rebuilt into our
//! own image buffer so the rest of the pipeline only sees `image` types.

use anyhow::{anyhow, bail, Context, Result};
use image::RgbaImage;
use std::path::Path;

/// A capture rectangle in global screen coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CaptureRect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl CaptureRect {
    /// Parses the `"x,y,width,height"` form used in configuration.
    pub fn parse(input: &str) -> Result<Self> {
        let parts: Vec<&str> = input.split(',').map(str::trim).collect();
        if parts.len() != 4 {
            bail!("Expected x,y,width,height but got: {}", input);
        }
        let x: i32 = parts[0].parse().context("Invalid region x")?;
        let y: i32 = parts[1].parse().context("Invalid region y")?;
        let width: u32 = parts[2].parse().context("Invalid region width")?;
        let height: u32 = parts[3].parse().context("Invalid region height")?;
        if width == 0 || height == 0 {
            bail!("Region width and height must be positive: {}", input);
        }
        Ok(Self {
            x,
            y,
            width,
            height,
        })
    }
}

/// Captures the monitor containing the rectangle's origin and crops to it.
pub fn capture_region(rect: &CaptureRect) -> Result<RgbaImage> {
    let monitors = xcap::Monitor::all().context("Failed to enumerate monitors")?;
    if monitors.is_empty() {
        bail!("No monitors available for capture");
    }

    let monitor = monitors
        .into_iter()
        .find(|m| monitor_contains(m, rect.x, rect.y))
        .ok_or_else(|| anyhow!("No monitor contains point ({}, {})", rect.x, rect.y))?;

    let mon_x = monitor.x().context("Failed to read monitor position")?;
    let mon_y = monitor.y().context("Failed to read monitor position")?;

    let shot = monitor.capture_image().context("Monitor capture failed")?;

    // Rebuild as our own buffer; xcap re-exports image but pinning the
    // conversion to raw bytes keeps the two versions independent.
    let (width, height) = (shot.width(), shot.height());
    let full = RgbaImage::from_raw(width, height, shot.into_raw())
        .ok_or_else(|| anyhow!("Captured frame had unexpected buffer size"))?;

    let rel_x = (rect.x - mon_x).max(0) as u32;
    let rel_y = (rect.y - mon_y).max(0) as u32;
    if rel_x >= width || rel_y >= height {
        bail!("Region origin lies outside the captured frame");
    }
    let crop_w = rect.width.min(width - rel_x);
    let crop_h = rect.height.min(height - rel_y);

    Ok(image::imageops::crop_imm(&full, rel_x, rel_y, crop_w, crop_h).to_image())
}

fn monitor_contains(monitor: &xcap::Monitor, x: i32, y: i32) -> bool {
    let (Ok(mx), Ok(my), Ok(mw), Ok(mh)) = (
        monitor.x(),
        monitor.y(),
        monitor.width(),
        monitor.height(),
    ) else {
        return false;
    };
    x >= mx && x < mx + mw as i32 && y >= my && y < my + mh as i32
}

/// Captures a region and writes it as PNG, creating parent directories.
pub fn capture_region_to_png(rect: &CaptureRect, output_path: &Path) -> Result<()> {
    if let Some(dir) = output_path.parent() {
        std::fs::create_dir_all(dir)
            .context(format!("Failed to create {}", dir.display()))?;
    }
    let img = capture_region(rect)?;
    img.save(output_path)
        .context(format!("Failed to save screenshot: {}", output_path.display()))?;
    Ok(())
}
