//! Trending records from the video platform.
//!
//! The HTTP endpoints themselves live behind [`TrendingSource`]. This module
//! owns the record type, the payload decoding and the block shown on the
//! board.

use crate::search::encode_component;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::PathBuf;
use thiserror::Error;

/// Search page used to build a link for an upstream keyword.
pub const PLATFORM_SEARCH_URL: &str = "https://search.bilibili.com/all?keyword=";

/// Ranks below this are flagged as hot.
pub const HOT_RANKS: usize = 3;

/// Errors from fetching or decoding trending data.
#[derive(Debug, Error)]
pub enum TrendingError {
    #[error("Request failed: {0}")]
    Transport(String),
    #[error("Service rejected the request: {0}")]
    Rejected(String),
    #[error("Malformed payload: {0}")]
    Malformed(String),
    #[error("IO error: {0}")]
    Io(String),
}

pub type TrendingResult<T> = Result<T, TrendingError>;

/// One trending entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendingItem {
    pub show_name: String,
    #[serde(default)]
    pub keyword: String,
    pub link: String,
}

impl TrendingItem {
    /// Build an item whose link searches the platform for `keyword`.
    pub fn from_keyword(keyword: impl Into<String>, show_name: impl Into<String>) -> Self {
        let keyword = keyword.into();
        Self {
            show_name: show_name.into(),
            link: format!("{PLATFORM_SEARCH_URL}{}", encode_component(&keyword)),
            keyword,
        }
    }
}

/// Whether a rank (0-based) is flagged as hot.
pub fn is_hot(rank: usize) -> bool {
    rank < HOT_RANKS
}

/// Content of a trending widget.
#[derive(Debug, Clone, PartialEq)]
pub struct TrendingBlock {
    pub items: Vec<TrendingItem>,
    pub updated_at: DateTime<Local>,
}

impl TrendingBlock {
    pub fn new(items: Vec<TrendingItem>) -> Self {
        Self {
            items,
            updated_at: Local::now(),
        }
    }

    pub fn title(&self) -> String {
        format!("Trending ({} items)", self.items.len())
    }

    /// Local wall-clock time of the last fetch.
    pub fn updated_label(&self) -> String {
        format!("Updated: {}", self.updated_at.format("%H:%M:%S"))
    }

    /// Items with their 0-based rank and hot flag.
    pub fn ranked(&self) -> impl Iterator<Item = (usize, &TrendingItem, bool)> {
        self.items
            .iter()
            .enumerate()
            .map(|(rank, item)| (rank, item, is_hot(rank)))
    }
}

/// Read and refresh endpoints for trending data.
pub trait TrendingSource {
    /// Current list, as served by the read endpoint.
    fn fetch(&self) -> TrendingResult<Vec<TrendingItem>>;

    /// Ask the service to re-crawl, then return the new list.
    fn refresh(&self) -> TrendingResult<Vec<TrendingItem>>;
}

#[derive(Deserialize)]
struct Envelope {
    success: bool,
    #[serde(default)]
    data: Option<Vec<TrendingItem>>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Deserialize)]
struct UpstreamEntry {
    keyword: String,
    #[serde(default)]
    show_name: String,
}

/// Decode any of the payload shapes trending data arrives in.
///
/// Accepted: the service envelope `{success, data, message}`, a bare array of
/// items (the service's cache file), or the platform's own listing under
/// `data.trending.list`.
pub fn decode_payload(body: &str) -> TrendingResult<Vec<TrendingItem>> {
    let value: Value =
        serde_json::from_str(body).map_err(|e| TrendingError::Malformed(e.to_string()))?;

    if value.is_array() {
        return serde_json::from_value(value).map_err(|e| TrendingError::Malformed(e.to_string()));
    }

    if value.get("success").is_some() {
        let envelope: Envelope =
            serde_json::from_value(value).map_err(|e| TrendingError::Malformed(e.to_string()))?;
        if !envelope.success {
            return Err(TrendingError::Rejected(
                envelope.message.unwrap_or_else(|| "unknown error".to_string()),
            ));
        }
        return envelope
            .data
            .ok_or_else(|| TrendingError::Malformed("envelope has no data".to_string()));
    }

    if let Some(list) = value.pointer("/data/trending/list") {
        let entries: Vec<UpstreamEntry> = serde_json::from_value(list.clone())
            .map_err(|e| TrendingError::Malformed(e.to_string()))?;
        return Ok(entries
            .into_iter()
            .map(|entry| {
                let show_name = if entry.show_name.is_empty() {
                    entry.keyword.clone()
                } else {
                    entry.show_name
                };
                TrendingItem::from_keyword(entry.keyword, show_name)
            })
            .collect());
    }

    Err(TrendingError::Malformed("unrecognized trending payload".to_string()))
}

/// Source backed by a cached payload on disk.
#[derive(Debug, Clone)]
pub struct CacheFileSource {
    path: PathBuf,
}

impl CacheFileSource {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    fn read(&self) -> TrendingResult<Vec<TrendingItem>> {
        let body = fs::read_to_string(&self.path).map_err(|e| {
            TrendingError::Io(format!("Failed to read {}: {}", self.path.display(), e))
        })?;
        decode_payload(&body)
    }
}

impl TrendingSource for CacheFileSource {
    fn fetch(&self) -> TrendingResult<Vec<TrendingItem>> {
        self.read()
    }

    fn refresh(&self) -> TrendingResult<Vec<TrendingItem>> {
        log::debug!("Re-reading trending cache {}", self.path.display());
        self.read()
    }
}
