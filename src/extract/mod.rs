// src/extract/mod.rs

//! Work extractors: one variant per site behind a single capability trait.
//!
//! Each variant turns one raw unit into a normalized `WorkRecord` or a
//! typed extraction failure. Variants share the injected field-detection
//! helpers in `heuristics` rather than inheriting from each other, and
//! hold no mutable state.

pub mod heuristics;
pub mod higgsfield;
pub mod imagineart;
pub mod invideo;
pub mod pixverse;
pub mod wanvideo;

use thiserror::Error;

pub use heuristics::FieldHeuristics;
pub use higgsfield::HiggsfieldExtractor;
pub use imagineart::ImagineArtExtractor;
pub use invideo::InvideoExtractor;
pub use pixverse::PixverseExtractor;
pub use wanvideo::WanVideoExtractor;

use crate::models::{RawUnit, WorkRecord};

/// Why a raw unit could not be normalized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ExtractionFailure {
    /// No resolvable primary media reference
    #[error("no primary media reference")]
    NoPrimaryMedia,

    /// The unit's structure was not recognizable to this extractor
    #[error("unreadable structure")]
    UnreadableStructure,
}

/// Per-site normalization of raw units into work records.
///
/// Extraction is pure: a missing primary media reference is a hard
/// failure, every other field degrades to absence.
pub trait WorkExtractor: Send + Sync {
    fn extract(&self, unit: &RawUnit) -> Result<WorkRecord, ExtractionFailure>;
}
