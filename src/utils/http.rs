// src/utils/http.rs

//! HTTP client utilities and the `HttpSource` capability.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;
use crate::models::CrawlerConfig;

/// Plain HTTP access as consumed by paginated-API and embedded-stream
/// sources. Kept behind a trait so tests can script responses.
#[async_trait]
pub trait HttpSource: Send + Sync {
    /// GET a URL and return the response body as text.
    async fn get_text(&self, url: &str, headers: &[(String, String)]) -> Result<String>;

    /// GET a URL and parse the response body as JSON.
    async fn get_json(&self, url: &str, headers: &[(String, String)]) -> Result<Value>;
}

/// Create a configured asynchronous HTTP client.
pub fn create_async_client(config: &CrawlerConfig) -> Result<reqwest::Client> {
    let user_agent = config
        .user_agents
        .first()
        .map(String::as_str)
        .unwrap_or("Mozilla/5.0 (compatible; showcase-crawler/0.1)");
    let client = reqwest::Client::builder()
        .user_agent(user_agent)
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .timeout(Duration::from_secs(config.read_timeout_secs))
        .build()?;
    Ok(client)
}

/// `HttpSource` backed by a shared reqwest client.
#[derive(Clone)]
pub struct ReqwestHttpSource {
    client: reqwest::Client,
}

impl ReqwestHttpSource {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    pub fn from_config(config: &CrawlerConfig) -> Result<Self> {
        Ok(Self::new(create_async_client(config)?))
    }

    fn request(&self, url: &str, headers: &[(String, String)]) -> reqwest::RequestBuilder {
        let mut req = self.client.get(url);
        for (name, value) in headers {
            req = req.header(name, value);
        }
        req
    }
}

#[async_trait]
impl HttpSource for ReqwestHttpSource {
    async fn get_text(&self, url: &str, headers: &[(String, String)]) -> Result<String> {
        let response = self.request(url, headers).send().await?.error_for_status()?;
        Ok(response.text().await?)
    }

    async fn get_json(&self, url: &str, headers: &[(String, String)]) -> Result<Value> {
        let text = self.get_text(url, headers).await?;
        Ok(serde_json::from_str(&text)?)
    }
}
