//! Screen capture of configured leaderboard regions.

pub mod screen;

pub use screen::{capture_region, capture_region_to_png, CaptureRect};
