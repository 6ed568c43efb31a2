//! HTTP transport for sitemap documents.
//!
//! [`SitemapFetcher`] is the seam the resolver and robots resolver depend on;
//! [`HttpFetcher`] is the `reqwest` implementation used by the binary.

use super::gzip;
use crate::config::SearcherConfig;
use crate::error::{Result, SitemapError};
use async_trait::async_trait;
use tracing::debug;

/// Fetch raw document bytes for a URL.
///
/// Implementations must gunzip payloads whose final path segment contains
/// `.gz` and report a bad payload as [`SitemapError::Decompress`].
#[async_trait]
pub trait SitemapFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>>;
}

#[async_trait]
impl<T: SitemapFetcher + ?Sized> SitemapFetcher for std::sync::Arc<T> {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        (**self).fetch(url).await
    }
}

/// `reqwest`-backed fetcher with configured timeouts and user agent.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Build a fetcher from the connect/read timeouts and user agent in `config`.
    pub fn new(config: &SearcherConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout())
            .timeout(config.request_timeout())
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| SitemapError::Client(e.to_string()))?;
        Ok(Self { client })
    }

    /// Wrap an existing client.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SitemapFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        let fetch_err = |reason: String| SitemapError::Fetch {
            url: url.to_string(),
            reason,
        };

        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| fetch_err(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(fetch_err(format!("HTTP {status}")));
        }

        let body = resp.bytes().await.map_err(|e| fetch_err(e.to_string()))?;
        debug!(url, bytes = body.len(), "fetched document");

        if gzip::is_gzip_url(url) {
            return gzip::decompress(url, &body);
        }
        Ok(body.to_vec())
    }
}
