// src/fetch.rs

//! Media retrieval with retry/backoff and content validation.
//!
//! Showcase CDNs gate assets behind referer checks and happily serve an
//! HTML login page with a 200 status, so every download is validated after
//! the fact: content type, minimum size, and declared-length completeness.
//! Validation rejects are retry-eligible, the same as transport failures.

use std::path::{Path, PathBuf};
use std::time::Duration;

use futures::StreamExt;
use rand::Rng;
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

use crate::models::CrawlerConfig;
use crate::utils::{file_extension, origin_of};

/// URL fragments that mark a reference as site furniture, not an asset.
const NON_ASSET_DENYLIST: &[&str] = &[
    "profile-image",
    "avatar",
    "user-avatar",
    "user_avatar",
    "favicon",
    "logo",
    "icon",
    "thumbnail_placeholder",
    "/users/",
    "/user/",
    "/profile/",
    "/creator/",
];

/// Backoff cap for the exponential path.
const MAX_BACKOFF: Duration = Duration::from_secs(30);

/// Fixed backoff for timeout-class failures.
const TIMEOUT_BACKOFF: Duration = Duration::from_secs(3);

/// Why a fetch attempt (or the whole fetch) failed.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Rejected before any network I/O
    #[error("not a fetchable asset: {0}")]
    NotAnAsset(&'static str),

    /// Connect or read phase timed out
    #[error("request timed out")]
    Timeout,

    /// Transport-level failure
    #[error("network error: {0}")]
    Network(String),

    /// Non-success HTTP status
    #[error("HTTP status {0}")]
    Status(u16),

    /// Server returned an HTML document instead of an asset
    #[error("response is an HTML document")]
    HtmlBody,

    /// Fewer bytes arrived than the declared content length
    #[error("transfer truncated: {written} of {declared} bytes")]
    Truncated { written: u64, declared: u64 },

    /// Body too small to be a real asset
    #[error("body too small: {0} bytes")]
    TooSmall(u64),

    /// Local write failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl FetchError {
    /// Pre-filter rejects are final; everything else gets the retry budget.
    fn is_retry_eligible(&self) -> bool {
        !matches!(self, FetchError::NotAnAsset(_))
    }

    /// Timeout-class failures back off a fixed short interval; everything
    /// else doubles from one second, capped, with a little jitter.
    fn backoff(&self, attempt: usize) -> Duration {
        match self {
            FetchError::Timeout | FetchError::Network(_) => TIMEOUT_BACKOFF,
            _ => {
                let shift = attempt.saturating_sub(1).min(5) as u32;
                let base = Duration::from_secs(1 << shift).min(MAX_BACKOFF);
                let jitter_ms: u64 = rand::rng().random_range(0..=250);
                base + Duration::from_millis(jitter_ms)
            }
        }
    }
}

/// Downloads one remote media resource to local storage.
pub struct MediaFetcher {
    client: reqwest::Client,
    config: CrawlerConfig,
}

impl MediaFetcher {
    pub fn new(config: &CrawlerConfig) -> crate::error::Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .timeout(Duration::from_secs(config.read_timeout_secs))
            .build()?;
        Ok(Self {
            client,
            config: config.clone(),
        })
    }

    /// Fetch `url` into `dest_dir` as `base_name` plus an inferred
    /// extension, retrying within the configured budget. Returns the local
    /// path with the file fully flushed.
    pub async fn fetch(
        &self,
        url: &str,
        dest_dir: &Path,
        base_name: &str,
        referer: Option<&str>,
    ) -> Result<PathBuf, FetchError> {
        if url.starts_with("blob:") || url.starts_with("data:") {
            return Err(FetchError::NotAnAsset("opaque URL scheme"));
        }
        let lower = url.to_lowercase();
        if NON_ASSET_DENYLIST.iter().any(|p| lower.contains(p)) {
            return Err(FetchError::NotAnAsset("matches non-asset denylist"));
        }

        let dest = dest_dir.join(format!("{base_name}{}", file_extension(url)));

        let mut attempt = 0usize;
        loop {
            attempt += 1;
            match self.attempt(url, &dest, referer).await {
                Ok(written) => {
                    debug!(%url, attempt, written, "fetched media");
                    return Ok(dest);
                }
                Err(error) => {
                    if !error.is_retry_eligible() || attempt >= self.config.max_retries {
                        return Err(error);
                    }
                    let delay = error.backoff(attempt);
                    warn!(%url, attempt, ?delay, %error, "fetch attempt failed, backing off");
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }

    /// One download attempt: request, stream to disk, validate.
    async fn attempt(
        &self,
        url: &str,
        dest: &Path,
        referer: Option<&str>,
    ) -> Result<u64, FetchError> {
        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let mut request = self.client.get(url);
        for (name, value) in self.spoofed_headers(url, referer) {
            request = request.header(name, value);
        }

        let response = request.send().await.map_err(map_transport_error)?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_lowercase();
        if content_type.contains("text/html") {
            return Err(FetchError::HtmlBody);
        }

        let declared = response.content_length().unwrap_or(0);

        let mut file = tokio::fs::File::create(dest).await?;
        let mut written: u64 = 0;
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_transport_error)?;
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        file.flush().await?;
        drop(file);

        if written < self.config.min_content_bytes {
            let _ = tokio::fs::remove_file(dest).await;
            return Err(FetchError::TooSmall(written));
        }
        if declared > 0 && (written as f64) < (declared as f64) * self.config.min_declared_ratio {
            let _ = tokio::fs::remove_file(dest).await;
            return Err(FetchError::Truncated { written, declared });
        }

        Ok(written)
    }

    /// Browser-like header set: rotated user agent, referer from the hint
    /// or the asset's own origin.
    fn spoofed_headers(&self, url: &str, referer: Option<&str>) -> Vec<(&'static str, String)> {
        let pool = &self.config.user_agents;
        let user_agent = if pool.is_empty() {
            "Mozilla/5.0 (compatible; showcase-crawler/0.1)".to_string()
        } else {
            pool[rand::rng().random_range(0..pool.len())].clone()
        };

        let referer = referer
            .map(|r| r.to_string())
            .or_else(|| origin_of(url))
            .unwrap_or_default();

        let fetch_dest = match file_extension(url).as_str() {
            ".mp4" | ".mov" | ".avi" | ".webm" => "video",
            _ => "image",
        };

        vec![
            ("User-Agent", user_agent),
            ("Referer", referer),
            ("Accept", "*/*".to_string()),
            ("Accept-Language", "en-US,en;q=0.9".to_string()),
            ("Sec-Fetch-Dest", fetch_dest.to_string()),
            ("Sec-Fetch-Mode", "no-cors".to_string()),
        ]
    }
}

fn map_transport_error(error: reqwest::Error) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout
    } else {
        FetchError::Network(error.to_string())
    }
}
