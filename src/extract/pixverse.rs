// src/extract/pixverse.rs

//! Pixverse extractor: offset-paginated creative-platform API.

use serde_json::Value;

use crate::extract::{ExtractionFailure, WorkExtractor};
use crate::models::{RawUnit, SiteConfig, WorkRecord};
use crate::sources::{PageSpec, Pagination};

/// Category label to `secondary_category` id, as served by the platform.
const CATEGORY_IDS: &[(&str, u64)] = &[
    ("Winter Vibe", 113),
    ("Ad Magic", 114),
    ("Cinematic Narrative", 115),
    ("Stylistic Art", 116),
    ("Animal Theatre", 117),
    ("Effects Rendering", 118),
    ("Emotional Close-up", 119),
];

/// Extractor for Pixverse API records.
pub struct PixverseExtractor {
    category: String,
}

impl PixverseExtractor {
    pub fn new(category: impl Into<String>) -> Self {
        Self {
            category: category.into(),
        }
    }
}

impl WorkExtractor for PixverseExtractor {
    fn extract(&self, unit: &RawUnit) -> Result<WorkRecord, ExtractionFailure> {
        let RawUnit::Api(item) = unit else {
            return Err(ExtractionFailure::UnreadableStructure);
        };

        let media_ref = item
            .get("url")
            .and_then(Value::as_str)
            .filter(|u| !u.is_empty())
            .ok_or(ExtractionFailure::NoPrimaryMedia)?
            .to_string();

        // `create_mode` declares the generation shape; the source image is
        // the evidence, so kind still derives from whether one resolves.
        let create_mode = item
            .get("create_mode")
            .and_then(Value::as_str)
            .unwrap_or_default();
        let source_image = if matches!(create_mode, "image_text" | "image") {
            ["customer_img_url", "img_url", "first_frame"]
                .iter()
                .filter_map(|key| item.get(*key))
                .filter_map(Value::as_str)
                .find(|s| !s.is_empty())
                .map(|s| s.to_string())
        } else {
            None
        };

        let cover = item
            .get("first_frame")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(|s| s.to_string());
        let prompt = item
            .get("prompt")
            .and_then(Value::as_str)
            .map(|s| s.to_string());

        Ok(WorkRecord::new(
            media_ref,
            prompt,
            source_image,
            cover,
            self.category.clone(),
        ))
    }
}

/// The platform id for a category label, if it is a known one.
pub fn category_id(category: &str) -> Option<u64> {
    CATEGORY_IDS
        .iter()
        .find(|(label, _)| *label == category)
        .map(|(_, id)| *id)
}

/// Pagination spec for one category's relation list.
pub fn page_spec(site: &SiteConfig, category_id: u64) -> PageSpec {
    PageSpec {
        endpoint: site.url.clone(),
        pagination: Pagination::Offset {
            offset_param: "offset".to_string(),
            limit_param: "limit".to_string(),
            total_items_path: vec!["Resp".to_string(), "total".to_string()],
        },
        page_size: 50,
        extra_query: vec![
            ("primary_category".to_string(), "1".to_string()),
            ("secondary_category".to_string(), category_id.to_string()),
            ("platform".to_string(), "web".to_string()),
            ("app_offset".to_string(), "0".to_string()),
        ],
        headers: vec![
            (
                "accept".to_string(),
                "application/json, text/plain, */*".to_string(),
            ),
            ("origin".to_string(), "https://app.pixverse.ai".to_string()),
            ("referer".to_string(), "https://app.pixverse.ai/".to_string()),
            ("x-platform".to_string(), "Web".to_string()),
        ],
        items_path: vec!["Resp".to_string(), "data".to_string()],
    }
}
