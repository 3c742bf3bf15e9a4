//! Report rendering.
//!
//! Turns delta results into the two output shapes the tracker publishes:
//! fixed-width console/webhook text and the full-history CSV export.

pub mod console;
pub mod csv;

pub use console::{format_point_diff, format_report, CONSOLE_WINDOWS};
pub use csv::CSV_WINDOWS;
