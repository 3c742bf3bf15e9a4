//! Discord webhook delivery.
//!
//! Posts one multipart message per region per run: the bucket key as the
//! username, the formatted report as the content, and the screenshot
//! attached. Delivery failures are the caller's to log; they never stop a
//! run.

use anyhow::{anyhow, Context, Result};
use reqwest::blocking::multipart;
use std::path::Path;
use std::time::Duration;

pub fn send_discord_webhook(
    webhook_url: &str,
    username: &str,
    content: &str,
    image_path: Option<&Path>,
) -> Result<()> {
    let client = reqwest::blocking::Client::builder()
        .timeout(Duration::from_secs(60))
        .build()
        .context("Failed to build HTTP client")?;

    let mut form = multipart::Form::new()
        .text("username", username.to_string())
        .text("content", content.to_string());

    if let Some(path) = image_path {
        form = form
            .file("file", path)
            .context(format!("Failed to attach {}", path.display()))?;
    }

    let response = client
        .post(webhook_url)
        .multipart(form)
        .send()
        .context("Webhook request failed")?;

    if !response.status().is_success() {
        return Err(anyhow!(
            "Discord webhook failed with status: {}",
            response.status()
        ));
    }

    Ok(())
}
