// src/sources/paged.rs

//! Paginated-API source.
//!
//! Requests pages with an explicit size and follows server-declared
//! pagination exactly: an offset walk bounded by a declared total item
//! count, or a page-number walk bounded by a declared page count. Item
//! identifiers feed the dedup ledger so overlapping pages never re-emit
//! a unit.

use std::collections::HashSet;

use async_trait::async_trait;
use serde_json::Value;
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use crate::error::{AppError, Result};
use crate::models::RawUnit;
use crate::sources::{Batch, SourceIterator};
use crate::utils::http::HttpSource;

/// Server-declared pagination scheme.
#[derive(Debug, Clone)]
pub enum Pagination {
    /// `?offset=N&limit=M` with a declared total item count
    Offset {
        offset_param: String,
        limit_param: String,
        total_items_path: Vec<String>,
    },
    /// `?page=N&size=M` with a declared page count, pages starting at 1
    PageNumber {
        page_param: String,
        size_param: String,
        page_count_path: Vec<String>,
    },
}

/// Everything needed to walk one paginated endpoint.
#[derive(Debug, Clone)]
pub struct PageSpec {
    /// Endpoint URL without pagination parameters
    pub endpoint: String,
    /// Pagination scheme
    pub pagination: Pagination,
    /// Requested page size
    pub page_size: usize,
    /// Fixed query parameters appended to every request
    pub extra_query: Vec<(String, String)>,
    /// Request headers (referer, platform tokens, ...)
    pub headers: Vec<(String, String)>,
    /// Path to the items array within the response body
    pub items_path: Vec<String>,
}

/// Paginated JSON API iterator.
pub struct PagedApiSource<'a> {
    http: &'a dyn HttpSource,
    spec: PageSpec,
    target: usize,
    emitted: usize,
    /// Next offset (Offset) or next page number (PageNumber)
    cursor: usize,
    done: bool,
    seen: HashSet<String>,
}

impl<'a> PagedApiSource<'a> {
    pub fn new(http: &'a dyn HttpSource, spec: PageSpec, target: usize) -> Self {
        let cursor = match spec.pagination {
            Pagination::Offset { .. } => 0,
            Pagination::PageNumber { .. } => 1,
        };
        Self {
            http,
            spec,
            target,
            emitted: 0,
            cursor,
            done: false,
            seen: HashSet::new(),
        }
    }

    fn page_url(&self) -> Result<String> {
        let mut url = url::Url::parse(&self.spec.endpoint)?;
        {
            let mut query = url.query_pairs_mut();
            for (key, value) in &self.spec.extra_query {
                query.append_pair(key, value);
            }
            match &self.spec.pagination {
                Pagination::Offset {
                    offset_param,
                    limit_param,
                    ..
                } => {
                    query.append_pair(offset_param, &self.cursor.to_string());
                    query.append_pair(limit_param, &self.spec.page_size.to_string());
                }
                Pagination::PageNumber {
                    page_param,
                    size_param,
                    ..
                } => {
                    query.append_pair(page_param, &self.cursor.to_string());
                    query.append_pair(size_param, &self.spec.page_size.to_string());
                }
            }
        }
        Ok(url.to_string())
    }

    /// Advance the cursor per the server's declared bounds.
    fn advance(&mut self, body: &Value, item_count: usize) {
        if item_count == 0 {
            self.done = true;
            return;
        }
        match &self.spec.pagination {
            Pagination::Offset {
                total_items_path, ..
            } => {
                let next = self.cursor + self.spec.page_size;
                match value_at(body, total_items_path).and_then(Value::as_u64) {
                    Some(total) if (next as u64) < total => self.cursor = next,
                    Some(_) => self.done = true,
                    // No declared total: keep walking until an empty page.
                    None => self.cursor = next,
                }
            }
            Pagination::PageNumber {
                page_count_path, ..
            } => {
                let next = self.cursor + 1;
                match value_at(body, page_count_path).and_then(Value::as_u64) {
                    Some(pages) if (next as u64) <= pages => self.cursor = next,
                    Some(_) => self.done = true,
                    None => self.cursor = next,
                }
            }
        }
    }
}

#[async_trait]
impl SourceIterator for PagedApiSource<'_> {
    async fn next_batch(&mut self) -> Result<Batch> {
        if self.done || self.emitted >= self.target {
            return Ok(Batch::exhausted());
        }

        let url = self.page_url()?;
        debug!(%url, "fetching page");
        let body = self.http.get_json(&url, &self.spec.headers).await?;

        let items = value_at(&body, &self.spec.items_path)
            .and_then(Value::as_array)
            .ok_or_else(|| {
                AppError::source(
                    &self.spec.endpoint,
                    format!("no items array at /{}", self.spec.items_path.join("/")),
                )
            })?;

        let mut units = Vec::new();
        for item in items {
            if self.emitted >= self.target {
                break;
            }
            let id = item_identity(item);
            if !self.seen.insert(id) {
                warn!("duplicate item in page, skipping");
                continue;
            }
            units.push(RawUnit::Api(item.clone()));
            self.emitted += 1;
        }

        self.advance(&body, items.len());
        if self.emitted >= self.target {
            self.done = true;
        }

        Ok(Batch {
            units,
            exhausted: self.done,
        })
    }
}

/// Walk a JSON value along a key path.
fn value_at<'v>(value: &'v Value, path: &[String]) -> Option<&'v Value> {
    let mut current = value;
    for key in path {
        current = current.get(key)?;
    }
    Some(current)
}

/// Stable identity for an API item: a known id field, else a content digest.
fn item_identity(item: &Value) -> String {
    for key in ["video_id", "id", "uuid"] {
        match item.get(key) {
            Some(Value::String(s)) if !s.is_empty() => return s.clone(),
            Some(Value::Number(n)) => return n.to_string(),
            _ => {}
        }
    }
    let digest = Sha256::digest(item.to_string().as_bytes());
    hex::encode(&digest[..6])
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use serde_json::json;

    /// Scripted HTTP source returning queued JSON bodies in order.
    struct FakeHttp {
        responses: Mutex<Vec<Value>>,
        requested: Mutex<Vec<String>>,
    }

    impl FakeHttp {
        fn new(responses: Vec<Value>) -> Self {
            Self {
                responses: Mutex::new(responses),
                requested: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl HttpSource for FakeHttp {
        async fn get_text(&self, _url: &str, _headers: &[(String, String)]) -> Result<String> {
            unimplemented!("paged sources use get_json")
        }

        async fn get_json(&self, url: &str, _headers: &[(String, String)]) -> Result<Value> {
            self.requested.lock().unwrap().push(url.to_string());
            let mut responses = self.responses.lock().unwrap();
            if responses.is_empty() {
                return Err(AppError::source(url, "no scripted response"));
            }
            Ok(responses.remove(0))
        }
    }

    fn offset_spec() -> PageSpec {
        PageSpec {
            endpoint: "https://api.example.com/list".to_string(),
            pagination: Pagination::Offset {
                offset_param: "offset".to_string(),
                limit_param: "limit".to_string(),
                total_items_path: vec!["total".to_string()],
            },
            page_size: 2,
            extra_query: Vec::new(),
            headers: Vec::new(),
            items_path: vec!["data".to_string()],
        }
    }

    #[tokio::test]
    async fn offset_walk_follows_declared_total() {
        let http = FakeHttp::new(vec![
            json!({"total": 3, "data": [{"id": 1}, {"id": 2}]}),
            json!({"total": 3, "data": [{"id": 3}]}),
        ]);
        let mut source = PagedApiSource::new(&http, offset_spec(), 10);

        let first = source.next_batch().await.unwrap();
        assert_eq!(first.units.len(), 2);
        assert!(!first.exhausted);

        let second = source.next_batch().await.unwrap();
        assert_eq!(second.units.len(), 1);
        assert!(second.exhausted);

        let urls = http.requested.lock().unwrap().clone();
        assert!(urls[0].contains("offset=0") && urls[0].contains("limit=2"));
        assert!(urls[1].contains("offset=2"));
    }

    #[tokio::test]
    async fn overlapping_pages_never_duplicate() {
        let http = FakeHttp::new(vec![
            json!({"total": 4, "data": [{"id": 1}, {"id": 2}]}),
            json!({"total": 4, "data": [{"id": 2}, {"id": 3}]}),
        ]);
        let mut source = PagedApiSource::new(&http, offset_spec(), 10);

        let mut total = 0;
        loop {
            let batch = source.next_batch().await.unwrap();
            total += batch.units.len();
            if batch.exhausted {
                break;
            }
        }
        assert_eq!(total, 3);
    }

    #[tokio::test]
    async fn target_caps_and_terminates() {
        let http = FakeHttp::new(vec![json!({
            "total": 100,
            "data": [{"id": 1}, {"id": 2}, {"id": 3}]
        })]);
        let mut source = PagedApiSource::new(&http, offset_spec(), 2);

        let batch = source.next_batch().await.unwrap();
        assert_eq!(batch.units.len(), 2);
        assert!(batch.exhausted);
    }

    #[tokio::test]
    async fn page_number_walk_stops_at_page_count() {
        let spec = PageSpec {
            endpoint: "https://api.example.com/feed".to_string(),
            pagination: Pagination::PageNumber {
                page_param: "pagination[page]".to_string(),
                size_param: "pagination[pageSize]".to_string(),
                page_count_path: vec![
                    "meta".to_string(),
                    "pagination".to_string(),
                    "pageCount".to_string(),
                ],
            },
            page_size: 2,
            extra_query: Vec::new(),
            headers: Vec::new(),
            items_path: vec!["data".to_string()],
        };
        let http = FakeHttp::new(vec![
            json!({"meta": {"pagination": {"pageCount": 2}}, "data": [{"id": "a"}, {"id": "b"}]}),
            json!({"meta": {"pagination": {"pageCount": 2}}, "data": [{"id": "c"}]}),
        ]);
        let mut source = PagedApiSource::new(&http, spec, 10);

        let first = source.next_batch().await.unwrap();
        assert_eq!(first.units.len(), 2);
        assert!(!first.exhausted);

        let second = source.next_batch().await.unwrap();
        assert_eq!(second.units.len(), 1);
        assert!(second.exhausted);

        let urls = http.requested.lock().unwrap().clone();
        assert!(urls[0].contains("page%5D=1") || urls[0].contains("page]=1"));
    }

    #[test]
    fn identity_prefers_known_keys() {
        assert_eq!(item_identity(&json!({"video_id": "v9"})), "v9");
        assert_eq!(item_identity(&json!({"id": 42})), "42");
        let a = item_identity(&json!({"x": 1}));
        let b = item_identity(&json!({"x": 1}));
        assert_eq!(a, b);
    }
}
