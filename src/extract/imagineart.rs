// src/extract/imagineart.rs

//! Imagine Art extractor: Strapi-style feed where asset paths are
//! relative to a separate media host.

use serde_json::Value;

use crate::extract::{ExtractionFailure, WorkExtractor};
use crate::models::{RawUnit, SiteConfig, WorkRecord};
use crate::sources::{PageSpec, Pagination};

/// Host the feed's relative asset paths resolve against.
pub const ASSET_BASE_URL: &str = "https://imagine.animagic.art/imagine-dashboard";

/// Extractor for Imagine Art feed records.
pub struct ImagineArtExtractor {
    asset_base: String,
    default_category: String,
}

impl ImagineArtExtractor {
    pub fn new(default_category: impl Into<String>) -> Self {
        Self {
            asset_base: ASSET_BASE_URL.to_string(),
            default_category: default_category.into(),
        }
    }

    #[cfg(test)]
    fn with_asset_base(mut self, base: impl Into<String>) -> Self {
        self.asset_base = base.into();
        self
    }

    fn absolute(&self, path: &str) -> String {
        if path.starts_with("http") {
            path.to_string()
        } else {
            format!("{}{}", self.asset_base, path)
        }
    }
}

impl WorkExtractor for ImagineArtExtractor {
    fn extract(&self, unit: &RawUnit) -> Result<WorkRecord, ExtractionFailure> {
        let RawUnit::Api(item) = unit else {
            return Err(ExtractionFailure::UnreadableStructure);
        };
        let attrs = item
            .get("attributes")
            .ok_or(ExtractionFailure::UnreadableStructure)?;

        let video_path = ["videoHd", "video"]
            .iter()
            .filter_map(|key| attrs.get(*key))
            .filter_map(Value::as_str)
            .find(|p| !p.is_empty())
            .ok_or(ExtractionFailure::NoPrimaryMedia)?;
        let media_ref = self.absolute(video_path);

        let category = attrs
            .pointer("/category/data/attributes/label")
            .and_then(Value::as_str)
            .filter(|c| !c.is_empty())
            .map(|c| c.to_string())
            .unwrap_or_else(|| self.default_category.clone());

        let source_image = attrs
            .pointer("/settings/generated_from_image")
            .and_then(Value::as_str)
            .filter(|p| !p.is_empty())
            .map(|p| self.absolute(p));

        let cover = attrs
            .get("image")
            .and_then(Value::as_str)
            .filter(|p| !p.is_empty())
            .map(|p| self.absolute(p));

        let prompt = attrs
            .get("prompt")
            .and_then(Value::as_str)
            .map(|s| s.to_string());

        Ok(WorkRecord::new(
            media_ref,
            prompt,
            source_image,
            cover,
            category,
        ))
    }
}

/// Pagination spec for the video feed.
pub fn page_spec(site: &SiteConfig) -> PageSpec {
    PageSpec {
        endpoint: site.url.clone(),
        pagination: Pagination::PageNumber {
            page_param: "pagination[page]".to_string(),
            size_param: "pagination[pageSize]".to_string(),
            page_count_path: vec![
                "meta".to_string(),
                "pagination".to_string(),
                "pageCount".to_string(),
            ],
        },
        page_size: 50,
        extra_query: vec![(
            "populate[category][fields][0]".to_string(),
            "*".to_string(),
        )],
        headers: vec![
            (
                "accept".to_string(),
                "application/json, text/plain, */*".to_string(),
            ),
            ("origin".to_string(), "https://www.imagine.art".to_string()),
            ("referer".to_string(), "https://www.imagine.art/".to_string()),
        ],
        items_path: vec!["data".to_string()],
    }
}
