//! Raw source units as captured before extraction.

use serde_json::Value;

/// One unit of raw source data, as yielded by a source iterator.
#[derive(Debug, Clone)]
pub enum RawUnit {
    /// Browser-free snapshot of a rendered detail view
    Dom(DomView),
    /// One record from a JSON API page
    Api(Value),
    /// One clip parsed out of an embedded document data stream
    Embedded(EmbeddedClip),
}

/// Snapshot of a detail view captured through a page session.
///
/// Everything extraction heuristics need, detached from live element
/// handles so the page can move on underneath.
#[derive(Debug, Clone, Default)]
pub struct DomView {
    /// URL of the page the view was captured from
    pub page_url: String,
    /// Visible text blocks with their container class hints
    pub text_blocks: Vec<TextBlock>,
    /// Image elements with rendered dimensions and context labels
    pub images: Vec<ImageNode>,
    /// Video elements
    pub videos: Vec<VideoNode>,
    /// Values of textarea/text-input elements
    pub input_values: Vec<String>,
}

/// A visible text node plus the class attribute of its container.
#[derive(Debug, Clone, Default)]
pub struct TextBlock {
    pub text: String,
    pub container_class: String,
}

/// An image element as rendered.
#[derive(Debug, Clone, Default)]
pub struct ImageNode {
    pub src: String,
    pub width: u32,
    pub height: u32,
    /// Nearby label/class text, e.g. "input", "reference"
    pub context: String,
}

impl ImageNode {
    /// Rendered pixel area.
    pub fn area(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }
}

/// A video element as rendered.
#[derive(Debug, Clone, Default)]
pub struct VideoNode {
    /// Source URL, possibly from a nested `<source>` element
    pub src: Option<String>,
    /// Poster attribute
    pub poster: Option<String>,
}

/// One clip recovered from a server-rendered data stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbeddedClip {
    /// Stable identifier recovered from the asset URL
    pub uuid: String,
    /// Primary media URL
    pub preview_url: String,
    /// Prompt text with any slot references already resolved
    pub prompt: Option<String>,
    /// Category section the clip was published under
    pub category: String,
}
