//! Utility functions and helpers.

pub mod http;

use url::Url;

/// Resolve a potentially relative URL against a base URL.
pub fn resolve_url(base: &Url, href: &str) -> String {
    base.join(href)
        .map(|u| u.to_string())
        .unwrap_or_else(|_| href.to_string())
}

/// Resolve a URL string against a base URL string.
pub fn resolve(base_url: &str, href: &str) -> Option<String> {
    Url::parse(base_url)
        .ok()
        .map(|base| resolve_url(&base, href))
}

/// Extract the origin (`scheme://host[:port]/`) from a URL string.
pub fn origin_of(url_str: &str) -> Option<String> {
    let url = Url::parse(url_str).ok()?;
    let host = url.host_str()?;
    match url.port() {
        Some(port) => Some(format!("{}://{}:{}/", url.scheme(), host, port)),
        None => Some(format!("{}://{}/", url.scheme(), host)),
    }
}

/// Infer a file extension (with leading dot) for a media URL.
///
/// Falls back to a `format=` query parameter, then to `.mp4` since the
/// bulk of harvested assets are videos.
pub fn file_extension(url_str: &str) -> String {
    if let Ok(url) = Url::parse(url_str) {
        let path = url.path();
        if let Some(idx) = path.rfind('.') {
            let ext = &path[idx..];
            if ext.len() > 1 && ext.len() <= 6 && !ext.contains('/') {
                return ext.to_ascii_lowercase();
            }
        }
        for (key, value) in url.query_pairs() {
            if key == "format" && !value.is_empty() {
                return format!(".{}", value.to_ascii_lowercase());
            }
        }
    }
    ".mp4".to_string()
}

/// Normalize a source or category name into a file/key-safe slug.
pub fn slugify(name: &str) -> String {
    name.to_lowercase().replace([' ', '.'], "_")
}
