// src/extract/higgsfield.rs

//! Higgsfield extractor: DOM detail views captured from the gallery.

use crate::extract::{ExtractionFailure, FieldHeuristics, WorkExtractor};
use crate::models::{RawUnit, WorkRecord};

/// Extractor for Higgsfield detail-view snapshots.
pub struct HiggsfieldExtractor {
    heuristics: FieldHeuristics,
    category: String,
}

impl HiggsfieldExtractor {
    pub fn new(heuristics: FieldHeuristics, category: impl Into<String>) -> Self {
        Self {
            heuristics,
            category: category.into(),
        }
    }
}

impl WorkExtractor for HiggsfieldExtractor {
    fn extract(&self, unit: &RawUnit) -> Result<WorkRecord, ExtractionFailure> {
        let RawUnit::Dom(view) = unit else {
            return Err(ExtractionFailure::UnreadableStructure);
        };

        let media_ref = self
            .heuristics
            .find_primary_video(view)
            .ok_or(ExtractionFailure::NoPrimaryMedia)?;

        let prompt = self.heuristics.find_prompt(view);
        let source_image = self.heuristics.find_source_image(view);
        let cover = self.heuristics.find_cover(view);

        Ok(WorkRecord::new(
            media_ref,
            prompt,
            source_image,
            cover,
            self.category.clone(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DomView, ExtractionConfig, ImageNode, TextBlock, VideoNode, WorkKind};

    fn extractor() -> HiggsfieldExtractor {
        HiggsfieldExtractor::new(
            FieldHeuristics::new(&ExtractionConfig::default()),
            "Higgsfield",
        )
    }

    fn detail_view() -> DomView {
        DomView {
            page_url: "https://higgsfield.ai/work/1".to_string(),
            text_blocks: vec![TextBlock {
                text: "a robot arm painting a watercolor landscape".to_string(),
                container_class: "prompt-text".to_string(),
            }],
            images: vec![ImageNode {
                src: "https://cdn.higgsfield.ai/seed.jpg".to_string(),
                width: 720,
                height: 720,
                context: "input".to_string(),
            }],
            videos: vec![VideoNode {
                src: Some("https://cdn.higgsfield.ai/out.mp4".to_string()),
                poster: Some("https://cdn.higgsfield.ai/poster.jpg".to_string()),
            }],
            input_values: Vec::new(),
        }
    }

    #[test]
    fn extracts_full_record_from_detail_view() {
        let record = extractor().extract(&RawUnit::Dom(detail_view())).unwrap();
        assert_eq!(record.media_ref, "https://cdn.higgsfield.ai/out.mp4");
        assert_eq!(record.kind, WorkKind::ImageToMedia);
        assert_eq!(
            record.prompt.as_deref(),
            Some("a robot arm painting a watercolor landscape")
        );
        assert_eq!(
            record.cover_ref.as_deref(),
            Some("https://cdn.higgsfield.ai/poster.jpg")
        );
        assert_eq!(record.category, "Higgsfield");
    }

    #[test]
    fn missing_video_is_hard_failure() {
        let mut view = detail_view();
        view.videos.clear();
        assert_eq!(
            extractor().extract(&RawUnit::Dom(view)),
            Err(ExtractionFailure::NoPrimaryMedia)
        );
    }

    #[test]
    fn missing_source_image_degrades_to_text_to_media() {
        let mut view = detail_view();
        view.images.clear();
        let record = extractor().extract(&RawUnit::Dom(view)).unwrap();
        assert_eq!(record.kind, WorkKind::TextToMedia);
        assert!(record.source_image_ref.is_none());
    }

    #[test]
    fn wrong_unit_shape_is_unreadable() {
        let unit = RawUnit::Api(serde_json::json!({}));
        assert_eq!(
            extractor().extract(&unit),
            Err(ExtractionFailure::UnreadableStructure)
        );
    }
}
