//! Gemini vision client: screenshot bytes in, ranking rows out.
//!
//! The model is asked for JSON only, but responses routinely arrive wrapped
//! in prose or a markdown fence, so the first `{...}` object is cut out of
//! the response text before parsing. Any failure here (HTTP, missing JSON,
//! parse) is transient: the caller skips the region's update for this run.

use anyhow::{anyhow, Context, Result};
use base64::{engine::general_purpose, Engine as _};
use regex::Regex;
use serde::Deserialize;
use std::time::Duration;

const MODEL: &str = "gemini-1.5-flash";
const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

const EXTRACTION_PROMPT: &str = "Extract ranking data from 1st to 11th place and output as JSON \
in the following format. Output must be JSON only:\n\
{\"ranking\": [{\"rank\": \"1\", \"name\": \"player_name\", \"pt\": \"points\"}, ...]}";

/// One ranking row as the model reports it, all fields optional noise.
#[derive(Clone, Debug, Deserialize)]
pub struct RawRankingEntry {
    #[serde(default)]
    pub rank: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub pt: String,
}

/// The structured extraction result.
#[derive(Clone, Debug, Deserialize)]
pub struct RankingResponse {
    #[serde(default)]
    pub ranking: Vec<RawRankingEntry>,
}

pub struct GeminiClient {
    http: reqwest::blocking::Client,
    api_key: String,
}

impl GeminiClient {
    pub fn new(api_key: &str) -> Result<Self> {
        let http = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            http,
            api_key: api_key.to_string(),
        })
    }

    /// Sends the PNG to the model and parses the ranking table out of the
    /// response text.
    pub fn extract_ranking(&self, png_bytes: &[u8]) -> Result<RankingResponse> {
        let url = format!(
            "{}/{}:generateContent?key={}",
            API_BASE, MODEL, self.api_key
        );

        let body = serde_json::json!({
            "contents": [{
                "parts": [
                    {
                        "inline_data": {
                            "mime_type": "image/png",
                            "data": general_purpose::STANDARD.encode(png_bytes),
                        }
                    },
                    { "text": EXTRACTION_PROMPT },
                ]
            }]
        });

        let response = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .context("OCR request failed")?;

        if !response.status().is_success() {
            return Err(anyhow!("OCR request failed: HTTP {}", response.status()));
        }

        let payload: serde_json::Value = response.json().context("OCR response was not JSON")?;
        let text = response_text(&payload)?;
        parse_ranking_text(&text)
    }
}

/// Concatenates the text parts of the first candidate.
fn response_text(payload: &serde_json::Value) -> Result<String> {
    let parts = payload["candidates"][0]["content"]["parts"]
        .as_array()
        .ok_or_else(|| anyhow!("No candidates in OCR response"))?;

    let text: String = parts
        .iter()
        .filter_map(|part| part["text"].as_str())
        .collect();

    if text.is_empty() {
        return Err(anyhow!("OCR response contained no text"));
    }
    Ok(text)
}

/// Extracts the first `{...}` object from the response text and parses it.
pub fn parse_ranking_text(text: &str) -> Result<RankingResponse> {
    let re = Regex::new(r"\{[\s\S]+\}")?;
    let json = re
        .find(text)
        .ok_or_else(|| anyhow!("JSON object not found in OCR response"))?;
    serde_json::from_str(json.as_str()).context("Failed to parse ranking JSON")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_json() {
        let resp = parse_ranking_text(
            r#"{"ranking": [{"rank": "1", "name": "Alice", "pt": "1,000"}]}"#,
        )
        .unwrap();
        assert_eq!(resp.ranking.len(), 1);
        assert_eq!(resp.ranking[0].name, "Alice");
        assert_eq!(resp.ranking[0].pt, "1,000");
    }

    #[test]
    fn test_parse_json_inside_markdown_fence() {
        let text = "Here is the data:\n```json\n{\"ranking\": [{\"rank\": \"1\", \"name\": \"Alice\", \"pt\": \"500\"}]}\n```\n";
        let resp = parse_ranking_text(text).unwrap();
        assert_eq!(resp.ranking.len(), 1);
    }

    #[test]
    fn test_parse_missing_fields_default_empty() {
        let resp = parse_ranking_text(r#"{"ranking": [{"name": "Alice"}]}"#).unwrap();
        assert_eq!(resp.ranking[0].pt, "");
        assert_eq!(resp.ranking[0].rank, "");
    }

    #[test]
    fn test_no_json_object_is_error() {
        assert!(parse_ranking_text("sorry, I cannot read this image").is_err());
    }

    #[test]
    fn test_response_text_concatenates_parts() {
        let payload = serde_json::json!({
            "candidates": [{
                "content": {
                    "parts": [
                        {"text": "{\"ranking\": "},
                        {"text": "[]}"},
                    ]
                }
            }]
        });
        assert_eq!(response_text(&payload).unwrap(), "{\"ranking\": []}");
    }

    #[test]
    fn test_response_without_candidates_is_error() {
        let payload = serde_json::json!({"error": {"message": "quota"}});
        assert!(response_text(&payload).is_err());
    }
}
