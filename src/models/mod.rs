// src/models/mod.rs

//! Domain models for the crawler application.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod config;
mod raw;
mod work;

// Re-export all public types
pub use config::{
    Config, CrawlerConfig, ExtractionConfig, OutputConfig, SiteConfig, SourceKind, StorageConfig,
};
pub use raw::{DomView, EmbeddedClip, ImageNode, RawUnit, TextBlock, VideoNode};
pub use work::{
    derive_work_id, sanitize_prompt, OutputRow, WorkKind, WorkRecord, NO_LOCATION, NO_PROMPT,
    PROMPT_MAX_LEN,
};
