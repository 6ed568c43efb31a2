//! Extract `Sitemap:` directives from robots.txt files.

use crate::acquisition::SitemapFetcher;
use async_trait::async_trait;
use std::collections::HashSet;
use tracing::{debug, warn};
use url::Url;

/// Conventional robots file name, joined against the base URL.
pub const ROBOTS_TXT: &str = "robots.txt";

/// Source of robots-advertised sitemap URLs for a site.
#[async_trait]
pub trait RobotsResolver: Send + Sync {
    /// Sitemap URLs advertised for `base`. Empty when none are advertised
    /// or robots.txt cannot be read.
    async fn sitemaps_from(&self, base: &Url) -> HashSet<String>;
}

/// Parse every `Sitemap:` directive in a robots.txt body.
///
/// Sitemap directives are global: they count regardless of which user-agent
/// group they appear in. Other directives are ignored.
pub fn parse_sitemap_directives(txt: &str) -> Vec<String> {
    let mut sitemaps = Vec::new();

    for line in txt.lines() {
        let line = line.split('#').next().unwrap_or("").trim();
        if line.is_empty() {
            continue;
        }

        if let Some((key, value)) = line.split_once(':') {
            let value = value.trim();
            if key.trim().eq_ignore_ascii_case("sitemap") && !value.is_empty() {
                sitemaps.push(value.to_string());
            }
        }
    }

    sitemaps
}

/// Reads `robots.txt` through any [`SitemapFetcher`].
#[derive(Debug, Clone)]
pub struct RobotsTxtResolver<F> {
    fetcher: F,
}

impl<F: SitemapFetcher> RobotsTxtResolver<F> {
    pub fn new(fetcher: F) -> Self {
        Self { fetcher }
    }
}

#[async_trait]
impl<F: SitemapFetcher> RobotsResolver for RobotsTxtResolver<F> {
    async fn sitemaps_from(&self, base: &Url) -> HashSet<String> {
        let robots_url = match base.join(ROBOTS_TXT) {
            Ok(u) => u,
            Err(e) => {
                warn!(base = %base, error = %e, "cannot build robots.txt URL");
                return HashSet::new();
            }
        };

        let body = match self.fetcher.fetch(robots_url.as_str()).await {
            Ok(body) => body,
            Err(e) => {
                debug!(url = %robots_url, error = %e, "robots.txt unavailable");
                return HashSet::new();
            }
        };

        let Ok(txt) = String::from_utf8(body) else {
            warn!(url = %robots_url, "robots.txt is not valid UTF-8");
            return HashSet::new();
        };

        let sitemaps: HashSet<String> = parse_sitemap_directives(&txt).into_iter().collect();
        debug!(url = %robots_url, count = sitemaps.len(), "robots.txt sitemap directives");
        sitemaps
    }
}
