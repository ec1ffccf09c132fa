//! Normalized work record and durable output row structures.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Placeholder token for an absent artifact location.
pub const NO_LOCATION: &str = "none available";

/// Placeholder token for an absent prompt.
pub const NO_PROMPT: &str = "no prompt available";

/// Longest prompt carried into an output row.
pub const PROMPT_MAX_LEN: usize = 500;

/// How a sample was generated, derived from the evidence in the record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkKind {
    /// Generated from prompt text alone
    TextToMedia,
    /// Generated from an input image
    ImageToMedia,
}

/// One normalized creative sample, produced from one raw source item.
///
/// Constructed by an extractor, consumed by the processor within the same
/// unit of work. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkRecord {
    /// Short opaque identifier, unique within a run
    pub id: String,
    /// Derived generation kind
    pub kind: WorkKind,
    /// Prompt text, absent rather than empty
    pub prompt: Option<String>,
    /// Reference to the primary output asset
    pub media_ref: String,
    /// Optional thumbnail/poster reference
    pub cover_ref: Option<String>,
    /// Optional input image reference
    pub source_image_ref: Option<String>,
    /// Grouping label supplied by the source
    pub category: String,
}

impl WorkRecord {
    /// Build a record from extracted fields.
    ///
    /// `kind` is always derived from the presence of a source image; a
    /// record claiming image-to-media without one is demoted here. Empty
    /// strings count as absent.
    pub fn new(
        media_ref: String,
        prompt: Option<String>,
        source_image_ref: Option<String>,
        cover_ref: Option<String>,
        category: impl Into<String>,
    ) -> Self {
        let prompt = prompt.filter(|p| !p.trim().is_empty());
        let source_image_ref = source_image_ref.filter(|s| !s.trim().is_empty());
        let cover_ref = cover_ref.filter(|c| !c.trim().is_empty());

        let kind = if source_image_ref.is_some() {
            WorkKind::ImageToMedia
        } else {
            WorkKind::TextToMedia
        };

        Self {
            id: derive_work_id(&media_ref),
            kind,
            prompt,
            media_ref,
            cover_ref,
            source_image_ref,
            category: category.into(),
        }
    }
}

/// Derive a short stable identifier from the primary media reference.
pub fn derive_work_id(media_ref: &str) -> String {
    let digest = Sha256::digest(media_ref.as_bytes());
    hex::encode(&digest[..6])
}

/// One persisted row: exactly four ordered fields.
///
/// Only ever constructed after the primary media artifact has been
/// relocated; rows are append-only immutable history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputRow {
    pub work_location: String,
    pub source_image_location: Option<String>,
    pub prompt: Option<String>,
    pub cover_location: Option<String>,
}

impl OutputRow {
    /// Build a row, sanitizing the prompt on the way in.
    pub fn new(
        work_location: String,
        source_image_location: Option<String>,
        prompt: Option<String>,
        cover_location: Option<String>,
    ) -> Self {
        let prompt = prompt
            .map(|p| sanitize_prompt(&p))
            .filter(|p| !p.is_empty());
        Self {
            work_location,
            source_image_location,
            prompt,
            cover_location,
        }
    }

    /// The four rendered fields, placeholder tokens for absent values.
    pub fn fields(&self) -> [String; 4] {
        [
            self.work_location.clone(),
            self.source_image_location
                .clone()
                .unwrap_or_else(|| NO_LOCATION.to_string()),
            self.prompt.clone().unwrap_or_else(|| NO_PROMPT.to_string()),
            self.cover_location
                .clone()
                .unwrap_or_else(|| NO_LOCATION.to_string()),
        ]
    }

    /// Serialize as one tab-separated log line.
    ///
    /// Prompts are sanitized to contain no tabs or newlines, so splitting
    /// the line on tabs always yields exactly four fields.
    pub fn to_line(&self) -> String {
        self.fields().join("\t")
    }

    /// Parse a log line back into its four fields.
    pub fn parse_line(line: &str) -> Option<[String; 4]> {
        let parts: Vec<&str> = line.split('\t').collect();
        if parts.len() != 4 {
            return None;
        }
        Some([
            parts[0].to_string(),
            parts[1].to_string(),
            parts[2].to_string(),
            parts[3].to_string(),
        ])
    }
}

/// Collapse all whitespace runs (including newlines and tabs) to single
/// spaces and cap the length.
pub fn sanitize_prompt(raw: &str) -> String {
    let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed.chars().take(PROMPT_MAX_LEN).collect()
}
