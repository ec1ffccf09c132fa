// src/extract/wanvideo.rs

//! Wan Video extractor: API records with unstable field naming.
//!
//! The backend has shipped several field-name variants over time, so every
//! field resolves through an ordered fallback list.

use serde_json::Value;

use crate::extract::{ExtractionFailure, WorkExtractor};
use crate::models::{RawUnit, SiteConfig, WorkRecord};
use crate::sources::{PageSpec, Pagination};

const VIDEO_KEYS: &[&str] = &["video_url", "videoUrl", "url", "video", "media_url"];
const COVER_KEYS: &[&str] = &["cover_url", "coverUrl", "cover", "thumbnail", "poster"];
const PROMPT_KEYS: &[&str] = &["prompt", "description", "text", "caption"];
const SOURCE_KEYS: &[&str] = &["source_image_url", "sourceImageUrl", "source", "input_image"];

/// Extractor for Wan Video API records.
pub struct WanVideoExtractor {
    category: String,
}

impl WanVideoExtractor {
    pub fn new(category: impl Into<String>) -> Self {
        Self {
            category: category.into(),
        }
    }
}

impl WorkExtractor for WanVideoExtractor {
    fn extract(&self, unit: &RawUnit) -> Result<WorkRecord, ExtractionFailure> {
        let RawUnit::Api(item) = unit else {
            return Err(ExtractionFailure::UnreadableStructure);
        };

        let media_ref =
            first_string(item, VIDEO_KEYS).ok_or(ExtractionFailure::NoPrimaryMedia)?;

        Ok(WorkRecord::new(
            media_ref,
            first_string(item, PROMPT_KEYS),
            first_string(item, SOURCE_KEYS),
            first_string(item, COVER_KEYS),
            self.category.clone(),
        ))
    }
}

/// Pagination spec for the explore feed.
pub fn page_spec(site: &SiteConfig) -> PageSpec {
    PageSpec {
        endpoint: site.url.clone(),
        pagination: Pagination::PageNumber {
            page_param: "page".to_string(),
            size_param: "limit".to_string(),
            page_count_path: vec!["data".to_string(), "page_count".to_string()],
        },
        page_size: 50,
        extra_query: vec![("category".to_string(), "all".to_string())],
        headers: vec![
            ("Accept".to_string(), "application/json".to_string()),
            ("Referer".to_string(), "https://create.wan.video/".to_string()),
        ],
        items_path: vec!["data".to_string(), "videos".to_string()],
    }
}

/// First non-empty string value among the given keys.
fn first_string(item: &Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| item.get(*key))
        .filter_map(Value::as_str)
        .find(|s| !s.is_empty())
        .map(|s| s.to_string())
}
