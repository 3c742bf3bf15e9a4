//! UI navigation seam.
//!
//! Some leaderboards are only reachable after in-game navigation. The
//! tracker treats that as a swappable capability invoked before each
//! region's capture: the default does nothing (the screen is assumed to
//! already show the ranking), and the script variant shells out to an
//! external helper (e.g. an image-matching automation script). A failed
//! navigation abandons the region for that run.

use anyhow::{bail, Context, Result};
use std::path::PathBuf;
use std::process::Command;

pub trait UiNavigator {
    fn navigate_to_ranking_screen(&self) -> Result<()>;
}

/// Assumes the ranking screen is already visible.
pub struct NoopNavigator;

impl UiNavigator for NoopNavigator {
    fn navigate_to_ranking_screen(&self) -> Result<()> {
        Ok(())
    }
}

/// Runs an external helper script and treats a non-zero exit as failure.
pub struct ScriptNavigator {
    script: PathBuf,
}

impl ScriptNavigator {
    pub fn new(script: impl Into<PathBuf>) -> Self {
        Self {
            script: script.into(),
        }
    }
}

impl UiNavigator for ScriptNavigator {
    fn navigate_to_ranking_screen(&self) -> Result<()> {
        let output = Command::new("python")
            .arg(&self.script)
            .output()
            .context(format!(
                "Failed to run navigation script: {}",
                self.script.display()
            ))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            bail!(
                "Navigation script exited with {}: {}",
                output.status,
                stderr.trim()
            );
        }
        Ok(())
    }
}

/// Picks the navigator for the current configuration.
pub fn from_script_setting(navigator_script: &str) -> Box<dyn UiNavigator> {
    if navigator_script.is_empty() {
        Box::new(NoopNavigator)
    } else {
        Box::new(ScriptNavigator::new(navigator_script))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_noop_navigator_succeeds() {
        assert!(NoopNavigator.navigate_to_ranking_screen().is_ok());
    }

    #[test]
    fn test_empty_setting_selects_noop() {
        // A no-op navigator must never fail, whatever the environment.
        assert!(from_script_setting("").navigate_to_ranking_screen().is_ok());
    }
}
