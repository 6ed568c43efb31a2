//! In-memory collaborators for tests and offline use.

use crate::acquisition::{gzip, SitemapFetcher};
use crate::cartography::RobotsResolver;
use crate::error::{Result, SitemapError};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use url::Url;

/// Serves documents from a map and records every requested URL.
///
/// Unknown URLs fail with a 404-style [`SitemapError::Fetch`]. Payloads for
/// `.gz` URLs are gunzipped like the HTTP fetcher does.
#[derive(Debug, Default)]
pub struct MockFetcher {
    documents: HashMap<String, Vec<u8>>,
    requests: Mutex<Vec<String>>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `body` at `url`.
    pub fn with_document(mut self, url: impl Into<String>, body: impl Into<Vec<u8>>) -> Self {
        self.documents.insert(url.into(), body.into());
        self
    }

    /// Every URL requested so far, in request order.
    pub fn requests(&self) -> Vec<String> {
        self.requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }

    /// How many times `url` was requested.
    pub fn request_count(&self, url: &str) -> usize {
        self.requests().iter().filter(|r| r.as_str() == url).count()
    }
}

#[async_trait]
impl SitemapFetcher for MockFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(url.to_string());
        }

        let body = self
            .documents
            .get(url)
            .cloned()
            .ok_or_else(|| SitemapError::Fetch {
                url: url.to_string(),
                reason: "HTTP 404 Not Found".to_string(),
            })?;

        if gzip::is_gzip_url(url) {
            return gzip::decompress(url, &body);
        }
        Ok(body)
    }
}

/// Returns a fixed set of robots-advertised sitemaps for every base URL.
#[derive(Debug, Clone, Default)]
pub struct MockRobots {
    sitemaps: HashSet<String>,
}

impl MockRobots {
    /// A site whose robots.txt advertises nothing.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn advertising<I, S>(sitemaps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            sitemaps: sitemaps.into_iter().map(Into::into).collect(),
        }
    }
}

#[async_trait]
impl RobotsResolver for MockRobots {
    async fn sitemaps_from(&self, _base: &Url) -> HashSet<String> {
        self.sitemaps.clone()
    }
}

/// Build a `<urlset>` document from `(loc, [(hreflang, href)])` entries.
pub fn urlset(entries: &[(&str, &[(&str, &str)])]) -> String {
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9"
        xmlns:xhtml="http://www.w3.org/1999/xhtml">"#,
    );
    for (loc, alternates) in entries {
        xml.push_str("<url><loc>");
        xml.push_str(loc);
        xml.push_str("</loc>");
        for (lang, href) in alternates.iter() {
            xml.push_str(&format!(
                r#"<xhtml:link rel="alternate" hreflang="{lang}" href="{href}"/>"#
            ));
        }
        xml.push_str("</url>");
    }
    xml.push_str("</urlset>");
    xml
}

/// Build a `<sitemapindex>` document referencing `locs`.
pub fn sitemap_index(locs: &[&str]) -> String {
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<sitemapindex xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">"#,
    );
    for loc in locs {
        xml.push_str(&format!("<sitemap><loc>{loc}</loc></sitemap>"));
    }
    xml.push_str("</sitemapindex>");
    xml
}
