//! Application configuration structures.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// HTTP and fetching behavior settings
    #[serde(default)]
    pub crawler: CrawlerConfig,

    /// Field extraction heuristics
    #[serde(default)]
    pub extraction: ExtractionConfig,

    /// Object storage settings
    #[serde(default)]
    pub storage: StorageConfig,

    /// Output locations
    #[serde(default)]
    pub output: OutputConfig,

    /// Site definitions
    #[serde(default = "defaults::default_sites")]
    pub sites: Vec<SiteConfig>,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            tracing::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.crawler.user_agents.is_empty() {
            return Err(AppError::validation("crawler.user_agents is empty"));
        }
        if self.crawler.max_retries == 0 {
            return Err(AppError::validation("crawler.max_retries must be > 0"));
        }
        if self.crawler.read_timeout_secs == 0 {
            return Err(AppError::validation("crawler.read_timeout_secs must be > 0"));
        }
        if self.crawler.delay_min_ms > self.crawler.delay_max_ms {
            return Err(AppError::validation(
                "crawler.delay_min_ms must not exceed crawler.delay_max_ms",
            ));
        }
        if !(self.crawler.min_declared_ratio > 0.0 && self.crawler.min_declared_ratio <= 1.0) {
            return Err(AppError::validation(
                "crawler.min_declared_ratio must be in (0, 1]",
            ));
        }
        if self.extraction.prompt_min_chars >= self.extraction.prompt_max_chars {
            return Err(AppError::validation(
                "extraction.prompt_min_chars must be below prompt_max_chars",
            ));
        }
        if self.sites.is_empty() {
            return Err(AppError::validation("No sites defined"));
        }
        for site in &self.sites {
            if site.name.trim().is_empty() {
                return Err(AppError::validation("Site with empty name"));
            }
            if site.target_count == 0 {
                return Err(AppError::validation(format!(
                    "Site {} has target_count 0",
                    site.name
                )));
            }
        }
        Ok(())
    }

    /// Look up a site by (case-insensitive) name.
    pub fn find_site(&self, name: &str) -> Option<&SiteConfig> {
        self.sites
            .iter()
            .find(|s| s.name.eq_ignore_ascii_case(name))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            crawler: CrawlerConfig::default(),
            extraction: ExtractionConfig::default(),
            storage: StorageConfig::default(),
            output: OutputConfig::default(),
            sites: defaults::default_sites(),
        }
    }
}

/// HTTP client and fetching behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlerConfig {
    /// User-Agent rotation pool for media requests
    #[serde(default = "defaults::user_agents")]
    pub user_agents: Vec<String>,

    /// Connect-phase timeout in seconds
    #[serde(default = "defaults::connect_timeout")]
    pub connect_timeout_secs: u64,

    /// Read-phase timeout in seconds
    #[serde(default = "defaults::read_timeout")]
    pub read_timeout_secs: u64,

    /// Total fetch attempts per artifact
    #[serde(default = "defaults::max_retries")]
    pub max_retries: usize,

    /// Minimum politeness delay between units in milliseconds
    #[serde(default = "defaults::delay_min")]
    pub delay_min_ms: u64,

    /// Maximum politeness delay between units in milliseconds
    #[serde(default = "defaults::delay_max")]
    pub delay_max_ms: u64,

    /// Smallest byte count accepted as a real asset
    #[serde(default = "defaults::min_content_bytes")]
    pub min_content_bytes: u64,

    /// Fraction of a declared content-length below which a transfer
    /// counts as truncated
    #[serde(default = "defaults::min_declared_ratio")]
    pub min_declared_ratio: f64,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            user_agents: defaults::user_agents(),
            connect_timeout_secs: defaults::connect_timeout(),
            read_timeout_secs: defaults::read_timeout(),
            max_retries: defaults::max_retries(),
            delay_min_ms: defaults::delay_min(),
            delay_max_ms: defaults::delay_max(),
            min_content_bytes: defaults::min_content_bytes(),
            min_declared_ratio: defaults::min_declared_ratio(),
        }
    }
}

/// Field extraction heuristics settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionConfig {
    /// Minimum edge length in pixels for a source-image candidate
    #[serde(default = "defaults::min_image_edge")]
    pub min_image_edge: u32,

    /// Shortest text accepted as a prompt candidate
    #[serde(default = "defaults::prompt_min_chars")]
    pub prompt_min_chars: usize,

    /// Longest text accepted as a prompt candidate
    #[serde(default = "defaults::prompt_max_chars")]
    pub prompt_max_chars: usize,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            min_image_edge: defaults::min_image_edge(),
            prompt_min_chars: defaults::prompt_min_chars(),
            prompt_max_chars: defaults::prompt_max_chars(),
        }
    }
}

/// Object storage settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Bucket name
    #[serde(default = "defaults::bucket")]
    pub bucket: String,

    /// Bucket region
    #[serde(default = "defaults::region")]
    pub region: String,

    /// Fixed key root under which all artifacts live
    #[serde(default = "defaults::key_root")]
    pub key_root: String,

    /// Public address prefix concatenated with the storage key
    #[serde(default = "defaults::public_prefix")]
    pub public_prefix: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            bucket: defaults::bucket(),
            region: defaults::region(),
            key_root: defaults::key_root(),
            public_prefix: defaults::public_prefix(),
        }
    }
}

/// Output locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Directory for fetched media and durable logs
    #[serde(default = "defaults::output_dir")]
    pub dir: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: defaults::output_dir(),
        }
    }
}

/// Acquisition strategy for a site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// DOM card listing driven through an attached page session
    Listing,
    /// Paginated JSON API
    PagedApi,
    /// Server-rendered document with an embedded data stream
    EmbeddedStream,
}

/// Configuration for a single showcase site.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Display name, also used as the sink source name
    pub name: String,

    /// Acquisition strategy
    pub kind: SourceKind,

    /// Listing page or API endpoint
    pub url: String,

    /// Units to harvest (per category when categories are set)
    pub target_count: usize,

    /// Content categories to walk, empty for a single unlabeled pass
    #[serde(default)]
    pub categories: Vec<String>,
}

mod defaults {
    use super::{SiteConfig, SourceKind};

    // Crawler defaults
    pub fn user_agents() -> Vec<String> {
        vec![
            "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36".into(),
            "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36".into(),
            "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:121.0) Gecko/20100101 Firefox/121.0".into(),
        ]
    }
    pub fn connect_timeout() -> u64 {
        15
    }
    pub fn read_timeout() -> u64 {
        60
    }
    pub fn max_retries() -> usize {
        3
    }
    pub fn delay_min() -> u64 {
        2000
    }
    pub fn delay_max() -> u64 {
        5000
    }
    pub fn min_content_bytes() -> u64 {
        1024
    }
    pub fn min_declared_ratio() -> f64 {
        0.9
    }

    // Extraction defaults
    pub fn min_image_edge() -> u32 {
        400
    }
    pub fn prompt_min_chars() -> usize {
        10
    }
    pub fn prompt_max_chars() -> usize {
        800
    }

    // Storage defaults
    pub fn bucket() -> String {
        "showcase-media".into()
    }
    pub fn region() -> String {
        "ap-southeast-1".into()
    }
    pub fn key_root() -> String {
        "video-materials".into()
    }
    pub fn public_prefix() -> String {
        "https://showcase-media.s3.ap-southeast-1.amazonaws.com/".into()
    }

    // Output defaults
    pub fn output_dir() -> String {
        "./downloads".into()
    }

    // Site defaults
    pub fn default_sites() -> Vec<SiteConfig> {
        vec![
            SiteConfig {
                name: "Wan Video".to_string(),
                kind: SourceKind::PagedApi,
                url: "https://api.wan.video/api/v1/explore/videos".to_string(),
                target_count: 50,
                categories: Vec::new(),
            },
            SiteConfig {
                name: "Higgsfield".to_string(),
                kind: SourceKind::Listing,
                url: "https://higgsfield.ai/".to_string(),
                target_count: 50,
                categories: vec![
                    "Kling 2.5 Turbo".to_string(),
                    "Camera Controls".to_string(),
                    "Viral".to_string(),
                    "Commercial".to_string(),
                    "UGC".to_string(),
                    "Sora 2 Community".to_string(),
                    "Wan 2.5 Community".to_string(),
                ],
            },
            SiteConfig {
                name: "Imagine Art".to_string(),
                kind: SourceKind::PagedApi,
                url: "https://imagine-blog.vyro.ai/api/video-feeds".to_string(),
                target_count: 50,
                categories: Vec::new(),
            },
            SiteConfig {
                name: "InVideo".to_string(),
                kind: SourceKind::EmbeddedStream,
                url: "https://invideo.io/ideas".to_string(),
                target_count: 50,
                categories: vec![
                    "Million Dollar Ads".to_string(),
                    "UGC & Avatars".to_string(),
                ],
            },
            SiteConfig {
                name: "Pixverse".to_string(),
                kind: SourceKind::PagedApi,
                url: "https://app-api.pixverse.ai/creative_platform/content/relation/list"
                    .to_string(),
                target_count: 20,
                categories: vec![
                    "Winter Vibe".to_string(),
                    "Ad Magic".to_string(),
                    "Cinematic Narrative".to_string(),
                    "Stylistic Art".to_string(),
                    "Animal Theatre".to_string(),
                    "Effects Rendering".to_string(),
                    "Emotional Close-up".to_string(),
                ],
            },
        ]
    }
}
