//! AI OCR: extracts structured ranking rows from captured screenshots.

pub mod client;

pub use client::{GeminiClient, RankingResponse, RawRankingEntry};
