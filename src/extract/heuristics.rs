// src/extract/heuristics.rs

//! Shared field-detection helpers for DOM-backed extractors.
//!
//! Showcase sites rarely label their fields; these helpers implement the
//! layered fallback policies the extractor variants compose: prompt text
//! from explicit inputs down to bounded generic text scanning, and
//! source-image selection by context keyword, denylist, and pixel area.

use crate::models::{DomView, ExtractionConfig, ImageNode};

/// UI boilerplate phrases that disqualify a generic text node as a prompt.
const PROMPT_BOILERPLATE: &[&str] = &[
    "sign in",
    "sign up",
    "log in",
    "click here",
    "button",
    "cookie",
    "privacy policy",
    "terms of service",
    "subscribe",
];

/// URL fragments marking an image as a UI element rather than content.
const UI_IMAGE_DENYLIST: &[&str] = &[
    "profile", "avatar", "logo", "icon", "favicon", "price", "pricing", "banner", "nav", "menu",
    "badge", "coin", "credit",
];

/// Context labels marking an image as the generation input.
const SOURCE_CONTEXT_KEYWORDS: &[&str] = &["input", "reference", "source", "original"];

/// Class-name fragments marking a container as prompt-bearing.
const PROMPT_CONTAINER_HINTS: &[&str] = &["prompt", "caption", "description"];

/// Field-detection policy, injected into each DOM extractor variant.
#[derive(Debug, Clone)]
pub struct FieldHeuristics {
    min_image_edge: u32,
    prompt_min_chars: usize,
    prompt_max_chars: usize,
}

impl FieldHeuristics {
    pub fn new(config: &ExtractionConfig) -> Self {
        Self {
            min_image_edge: config.min_image_edge,
            prompt_min_chars: config.prompt_min_chars,
            prompt_max_chars: config.prompt_max_chars,
        }
    }

    /// Locate prompt text with a layered fallback:
    /// explicit input values, then labeled containers, then a bounded
    /// generic text scan with a boilerplate denylist.
    pub fn find_prompt(&self, view: &DomView) -> Option<String> {
        for value in &view.input_values {
            let text = value.trim();
            if text.len() > self.prompt_min_chars {
                return Some(text.to_string());
            }
        }

        for block in &view.text_blocks {
            let class = block.container_class.to_lowercase();
            if PROMPT_CONTAINER_HINTS.iter().any(|h| class.contains(h)) {
                let text = block.text.trim();
                if text.len() > self.prompt_min_chars && text.len() < self.prompt_max_chars {
                    return Some(text.to_string());
                }
            }
        }

        for block in &view.text_blocks {
            let text = block.text.trim();
            if text.len() <= 2 * self.prompt_min_chars || text.len() >= self.prompt_max_chars {
                continue;
            }
            let lower = text.to_lowercase();
            if PROMPT_BOILERPLATE.iter().any(|b| lower.contains(b)) {
                continue;
            }
            return Some(text.to_string());
        }

        None
    }

    /// Locate the input image of an image-to-media generation.
    ///
    /// Candidates must carry a source-context label, survive the
    /// UI-element denylist, and meet the minimum edge length; the largest
    /// area wins, first encountered breaking ties.
    pub fn find_source_image(&self, view: &DomView) -> Option<String> {
        let mut best: Option<&ImageNode> = None;
        for image in &view.images {
            let context = image.context.to_lowercase();
            if !SOURCE_CONTEXT_KEYWORDS.iter().any(|k| context.contains(k)) {
                continue;
            }
            if is_ui_image(&image.src) {
                continue;
            }
            if image.width < self.min_image_edge || image.height < self.min_image_edge {
                continue;
            }
            if best.is_none_or(|b| image.area() > b.area()) {
                best = Some(image);
            }
        }
        best.map(|image| image.src.clone())
    }

    /// Locate the primary video URL: a playable http(s) source, never an
    /// in-memory blob.
    pub fn find_primary_video(&self, view: &DomView) -> Option<String> {
        view.videos
            .iter()
            .filter_map(|video| video.src.as_deref())
            .find(|src| src.starts_with("http") && !src.contains("blob:"))
            .map(|src| src.to_string())
    }

    /// Locate a cover: a video poster first, then the largest non-UI
    /// content image.
    pub fn find_cover(&self, view: &DomView) -> Option<String> {
        if let Some(poster) = view
            .videos
            .iter()
            .filter_map(|video| video.poster.as_deref())
            .find(|p| !p.is_empty())
        {
            return Some(poster.to_string());
        }

        let mut best: Option<&ImageNode> = None;
        for image in &view.images {
            if is_ui_image(&image.src) {
                continue;
            }
            // Covers just need to look like content, not pass the
            // source-image threshold.
            if image.width < 200 || image.height < 200 {
                continue;
            }
            if best.is_none_or(|b| image.area() > b.area()) {
                best = Some(image);
            }
        }
        best.map(|image| image.src.clone())
    }
}

/// Whether a URL looks like a UI element rather than harvested content.
pub fn is_ui_image(src: &str) -> bool {
    let lower = src.to_lowercase();
    UI_IMAGE_DENYLIST.iter().any(|d| lower.contains(d))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{TextBlock, VideoNode};

    fn heuristics() -> FieldHeuristics {
        FieldHeuristics::new(&ExtractionConfig::default())
    }

    fn image(src: &str, width: u32, height: u32, context: &str) -> ImageNode {
        ImageNode {
            src: src.to_string(),
            width,
            height,
            context: context.to_string(),
        }
    }

    #[test]
    fn prompt_prefers_input_values() {
        let view = DomView {
            input_values: vec!["a castle floating above the clouds".to_string()],
            text_blocks: vec![TextBlock {
                text: "some other descriptive text on the page".to_string(),
                container_class: "prompt-display".to_string(),
            }],
            ..DomView::default()
        };
        assert_eq!(
            heuristics().find_prompt(&view).as_deref(),
            Some("a castle floating above the clouds")
        );
    }

    #[test]
    fn prompt_falls_back_to_labeled_container() {
        let view = DomView {
            text_blocks: vec![
                TextBlock {
                    text: "Explore".to_string(),
                    container_class: "nav-item".to_string(),
                },
                TextBlock {
                    text: "an origami fox running through snow".to_string(),
                    container_class: "work-caption".to_string(),
                },
            ],
            ..DomView::default()
        };
        assert_eq!(
            heuristics().find_prompt(&view).as_deref(),
            Some("an origami fox running through snow")
        );
    }

    #[test]
    fn generic_scan_rejects_boilerplate() {
        let view = DomView {
            text_blocks: vec![
                TextBlock {
                    text: "Sign in to like this creation and more".to_string(),
                    container_class: String::new(),
                },
                TextBlock {
                    text: "a slow pan across a neon-lit alley in the rain".to_string(),
                    container_class: String::new(),
                },
            ],
            ..DomView::default()
        };
        assert_eq!(
            heuristics().find_prompt(&view).as_deref(),
            Some("a slow pan across a neon-lit alley in the rain")
        );
    }

    #[test]
    fn no_acceptable_text_yields_none() {
        let view = DomView {
            text_blocks: vec![TextBlock {
                text: "OK".to_string(),
                container_class: String::new(),
            }],
            ..DomView::default()
        };
        assert_eq!(heuristics().find_prompt(&view), None);
    }

    #[test]
    fn source_image_requires_context_and_size() {
        let view = DomView {
            images: vec![
                // No source context.
                image("https://cdn.example.com/big.jpg", 900, 900, "gallery"),
                // Too small.
                image("https://cdn.example.com/small.jpg", 120, 120, "input"),
                // Denylisted.
                image("https://cdn.example.com/user-avatar.jpg", 800, 800, "input"),
                image("https://cdn.example.com/seed.jpg", 640, 480, "input image"),
            ],
            ..DomView::default()
        };
        assert_eq!(
            heuristics().find_source_image(&view).as_deref(),
            Some("https://cdn.example.com/seed.jpg")
        );
    }

    #[test]
    fn source_image_picks_largest_first_on_tie() {
        let view = DomView {
            images: vec![
                image("https://cdn.example.com/a.jpg", 640, 640, "reference"),
                image("https://cdn.example.com/b.jpg", 800, 800, "reference"),
                image("https://cdn.example.com/c.jpg", 800, 800, "reference"),
            ],
            ..DomView::default()
        };
        assert_eq!(
            heuristics().find_source_image(&view).as_deref(),
            Some("https://cdn.example.com/b.jpg")
        );
    }

    #[test]
    fn primary_video_skips_blob_sources() {
        let view = DomView {
            videos: vec![
                VideoNode {
                    src: Some("blob:https://example.com/123".to_string()),
                    poster: None,
                },
                VideoNode {
                    src: Some("https://cdn.example.com/v.mp4".to_string()),
                    poster: None,
                },
            ],
            ..DomView::default()
        };
        assert_eq!(
            heuristics().find_primary_video(&view).as_deref(),
            Some("https://cdn.example.com/v.mp4")
        );
    }

    #[test]
    fn cover_prefers_poster_then_largest_image() {
        let with_poster = DomView {
            videos: vec![VideoNode {
                src: None,
                poster: Some("https://cdn.example.com/poster.jpg".to_string()),
            }],
            images: vec![image("https://cdn.example.com/big.jpg", 1000, 1000, "")],
            ..DomView::default()
        };
        assert_eq!(
            heuristics().find_cover(&with_poster).as_deref(),
            Some("https://cdn.example.com/poster.jpg")
        );

        let without_poster = DomView {
            images: vec![
                image("https://cdn.example.com/logo.png", 512, 512, ""),
                image("https://cdn.example.com/frame.jpg", 640, 360, ""),
            ],
            ..DomView::default()
        };
        assert_eq!(
            heuristics().find_cover(&without_poster).as_deref(),
            Some("https://cdn.example.com/frame.jpg")
        );
    }
}
