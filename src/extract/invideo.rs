// src/extract/invideo.rs

//! InVideo extractor: clips recovered from the embedded document stream.

use crate::extract::{ExtractionFailure, WorkExtractor};
use crate::models::{RawUnit, WorkRecord};

/// Category label to URL section slug.
const SECTION_SLUGS: &[(&str, &str)] = &[
    ("Million Dollar Ads", "million-dollar-ads"),
    ("UGC & Avatars", "ugc-and-avatars"),
];

/// Extractor for InVideo embedded-stream clips.
pub struct InvideoExtractor;

impl WorkExtractor for InvideoExtractor {
    fn extract(&self, unit: &RawUnit) -> Result<WorkRecord, ExtractionFailure> {
        let RawUnit::Embedded(clip) = unit else {
            return Err(ExtractionFailure::UnreadableStructure);
        };
        if clip.preview_url.is_empty() {
            return Err(ExtractionFailure::NoPrimaryMedia);
        }

        // The stream carries neither input images nor separate covers.
        Ok(WorkRecord::new(
            clip.preview_url.clone(),
            clip.prompt.clone(),
            None,
            None,
            clip.category.clone(),
        ))
    }
}

/// The URL section slug for a category label, if it is a known one.
pub fn section_slug(category: &str) -> Option<&'static str> {
    SECTION_SLUGS
        .iter()
        .find(|(label, _)| *label == category)
        .map(|(_, slug)| *slug)
}

/// Document URL for one category section.
pub fn section_url(base: &str, slug: &str) -> String {
    format!("{}/?section={}", base.trim_end_matches('/'), slug)
}

/// Browser-like headers for the document fetch.
pub fn doc_headers() -> Vec<(String, String)> {
    vec![
        (
            "accept".to_string(),
            "text/html,application/xhtml+xml".to_string(),
        ),
        ("accept-language".to_string(), "en-US".to_string()),
    ]
}
