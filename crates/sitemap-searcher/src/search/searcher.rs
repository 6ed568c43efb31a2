//! The search orchestrator: seeds, resolution, then keyword matching.
//!
//! A [`SitemapSearcher`] keeps no per-search state, so one instance can serve
//! concurrent searches behind a shared reference.

use super::cache::ResolvedSetCache;
use super::matcher::{match_keywords, KeywordResult};
use super::seeds::SeedSet;
use crate::acquisition::{HttpFetcher, SitemapFetcher};
use crate::cartography::{RobotsResolver, RobotsTxtResolver, SitemapResolver};
use crate::config::SearcherConfig;
use crate::error::{Result, SitemapError};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};
use url::Url;

/// Searcher wired to the HTTP fetcher and robots.txt resolver.
pub type HttpSitemapSearcher = SitemapSearcher<HttpFetcher, RobotsTxtResolver<HttpFetcher>>;

/// Seeds plus everything resolved from them.
#[derive(Debug, Clone, Serialize)]
pub struct SiteResolution {
    pub base_url: String,
    pub seeds: SeedSet,
    #[serde(skip)]
    pub urls: Arc<HashSet<String>>,
    pub leaf_sitemaps: BTreeSet<String>,
    pub failures: Vec<SitemapError>,
    pub timed_out: bool,
    pub from_cache: bool,
}

/// Full outcome of one search.
#[derive(Debug, Clone, Serialize)]
pub struct SearchReport {
    pub base_url: String,
    pub seeds: BTreeSet<String>,
    pub seeds_from_robots: bool,
    pub resolved_urls: usize,
    pub leaf_sitemaps: usize,
    pub results: KeywordResult,
    pub failures: Vec<SitemapError>,
    pub from_cache: bool,
    pub elapsed_ms: u64,
    pub completed_at: DateTime<Utc>,
}

/// Resolves a site's sitemaps and measures keyword coverage of its URLs.
pub struct SitemapSearcher<F, R> {
    config: SearcherConfig,
    fetcher: F,
    robots: R,
    cache: ResolvedSetCache,
}

impl HttpSitemapSearcher {
    /// Build the HTTP-backed searcher described by `config`.
    pub fn from_config(config: SearcherConfig) -> Result<Self> {
        let fetcher = HttpFetcher::new(&config)?;
        let robots = RobotsTxtResolver::new(fetcher.clone());
        Ok(Self::with_collaborators(config, fetcher, robots))
    }
}

impl<F: SitemapFetcher, R: RobotsResolver> SitemapSearcher<F, R> {
    pub fn with_collaborators(config: SearcherConfig, fetcher: F, robots: R) -> Self {
        Self {
            config,
            fetcher,
            robots,
            cache: ResolvedSetCache::new(),
        }
    }

    pub fn config(&self) -> &SearcherConfig {
        &self.config
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Seed sitemaps for `base_url`.
    pub async fn seeds(&self, base_url: &str) -> Result<SeedSet> {
        let base = parse_base(base_url)?;
        self.seeds_for(&base).await
    }

    async fn seeds_for(&self, base: &Url) -> Result<SeedSet> {
        let advertised = self.robots.sitemaps_from(base).await;
        let seeds = SeedSet::build(base, advertised)?;
        debug!(
            base = %base,
            count = seeds.len(),
            from_robots = seeds.from_robots,
            "seed sitemaps"
        );
        Ok(seeds)
    }

    /// Seeds and the resolved canonical URL set, without matching.
    ///
    /// Served from the cache when caching is enabled and the base URL was
    /// resolved before.
    pub async fn resolve_site(&self, base_url: &str) -> Result<SiteResolution> {
        let base = parse_base(base_url)?;
        let key = base.as_str();

        if self.config.cache_enabled {
            if let Some(hit) = self.cache.get(key) {
                debug!(base = key, cached_at = %hit.cached_at, "resolved set served from cache");
                return Ok(SiteResolution {
                    base_url: key.to_string(),
                    seeds: SeedSet {
                        urls: hit.seeds,
                        from_robots: hit.seeds_from_robots,
                    },
                    urls: hit.urls,
                    leaf_sitemaps: BTreeSet::new(),
                    failures: Vec::new(),
                    timed_out: false,
                    from_cache: true,
                });
            }
        }

        let seeds = self.seeds_for(&base).await?;
        let ctx = SitemapResolver::new(&self.fetcher, &self.config)
            .resolve(seeds.urls.iter().cloned())
            .await;

        let urls = Arc::new(ctx.urls);
        if self.config.cache_enabled && !ctx.timed_out {
            self.cache
                .insert(key, seeds.urls.clone(), seeds.from_robots, urls.clone());
        }

        Ok(SiteResolution {
            base_url: key.to_string(),
            seeds,
            urls,
            leaf_sitemaps: ctx.leaf_sitemaps,
            failures: ctx.failures,
            timed_out: ctx.timed_out,
            from_cache: false,
        })
    }

    /// Keyword coverage using the configured case folding.
    pub async fn search<S: AsRef<str>>(
        &self,
        base_url: &str,
        keywords: &[S],
    ) -> Result<KeywordResult> {
        self.search_with_case(base_url, keywords, self.config.case_insensitive)
            .await
    }

    /// Keyword coverage with explicit case folding.
    ///
    /// Fails only when `base_url` is not a valid URL. Fetch, gzip, and parse
    /// failures reduce the resolved set instead.
    pub async fn search_with_case<S: AsRef<str>>(
        &self,
        base_url: &str,
        keywords: &[S],
        case_insensitive: bool,
    ) -> Result<KeywordResult> {
        Ok(self
            .search_report(base_url, keywords, case_insensitive)
            .await?
            .results)
    }

    /// Keyword coverage plus seeds, counts, and recovered failures.
    pub async fn search_report<S: AsRef<str>>(
        &self,
        base_url: &str,
        keywords: &[S],
        case_insensitive: bool,
    ) -> Result<SearchReport> {
        let started = Instant::now();
        info!(base = base_url, keywords = keywords.len(), "search started");

        let site = self.resolve_site(base_url).await?;
        let results = match_keywords(&site.urls, keywords, case_insensitive);

        let report = SearchReport {
            base_url: site.base_url,
            seeds: site.seeds.urls,
            seeds_from_robots: site.seeds.from_robots,
            resolved_urls: site.urls.len(),
            leaf_sitemaps: site.leaf_sitemaps.len(),
            results,
            failures: site.failures,
            from_cache: site.from_cache,
            elapsed_ms: started.elapsed().as_millis() as u64,
            completed_at: Utc::now(),
        };

        info!(
            base = %report.base_url,
            resolved_urls = report.resolved_urls,
            failures = report.failures.len(),
            from_cache = report.from_cache,
            elapsed_ms = report.elapsed_ms,
            "search completed"
        );
        Ok(report)
    }

    /// Forget the cached resolution for `base_url`.
    pub fn invalidate(&self, base_url: &str) -> bool {
        match Url::parse(base_url) {
            Ok(base) => self.cache.invalidate(base.as_str()),
            Err(_) => false,
        }
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
    }
}

fn parse_base(base_url: &str) -> Result<Url> {
    Url::parse(base_url).map_err(|e| SitemapError::InvalidUrl {
        url: base_url.to_string(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{sitemap_index, urlset, MockFetcher, MockRobots};

    fn searcher(
        fetcher: MockFetcher,
        robots: MockRobots,
    ) -> SitemapSearcher<MockFetcher, MockRobots> {
        SitemapSearcher::with_collaborators(SearcherConfig::default(), fetcher, robots)
    }

    #[tokio::test]
    async fn test_gmail_half() {
        let fetcher = MockFetcher::new().with_document(
            "https://ex.com/sitemap.xml",
            urlset(&[
                ("https://ex.com/en/gmail/help", &[]),
                ("https://ex.com/en/docs", &[]),
            ]),
        );
        let s = searcher(fetcher, MockRobots::empty());

        let result = s.search("https://ex.com", &["gmail"]).await.unwrap();
        assert_eq!(result, KeywordResult::from([("gmail".to_string(), 0.5)]));
    }

    #[tokio::test]
    async fn test_default_seeds_are_fetched() {
        let s = searcher(MockFetcher::new(), MockRobots::empty());
        s.search("https://ex.com", &["x"]).await.unwrap();

        let mut requested = s.fetcher().requests();
        requested.sort();
        assert_eq!(
            requested,
            vec!["https://ex.com/sitemap.xml", "https://ex.com/sitemap_index.xml"]
        );
    }

    #[tokio::test]
    async fn test_robots_seeds_suppress_defaults() {
        let fetcher = MockFetcher::new().with_document(
            "https://ex.com/custom.xml",
            urlset(&[("https://ex.com/a", &[])]),
        );
        let s = searcher(fetcher, MockRobots::advertising(["https://ex.com/custom.xml"]));

        let report = s.search_report("https://ex.com", &["a"], true).await.unwrap();
        assert!(report.seeds_from_robots);
        assert_eq!(report.seeds, BTreeSet::from(["https://ex.com/custom.xml".to_string()]));
        assert_eq!(s.fetcher().requests(), vec!["https://ex.com/custom.xml"]);
    }

    #[tokio::test]
    async fn test_failed_leaf_yields_zeros() {
        let fetcher = MockFetcher::new().with_document(
            "https://ex.com/sitemap_index.xml",
            sitemap_index(&["https://ex.com/gone.xml"]),
        );
        let s = searcher(fetcher, MockRobots::empty());

        let report = s
            .search_report("https://ex.com", &["gmail", "Docs"], true)
            .await
            .unwrap();
        assert_eq!(
            report.results,
            KeywordResult::from([("docs".to_string(), 0.0), ("gmail".to_string(), 0.0)])
        );
        assert_eq!(report.resolved_urls, 0);
        assert!(report
            .failures
            .iter()
            .any(|f| f.url() == Some("https://ex.com/gone.xml")));
    }

    #[tokio::test]
    async fn test_hreflang_preference_applies() {
        let fetcher = MockFetcher::new().with_document(
            "https://ex.com/sitemap.xml",
            urlset(&[(
                "https://ex.com/page",
                &[
                    ("x-default", "https://ex.com/intl/page"),
                    ("de", "https://ex.com/de/seite"),
                ],
            )]),
        );
        let config = SearcherConfig::default().with_hreflang(["de"]);
        let s = SitemapSearcher::with_collaborators(config, fetcher, MockRobots::empty());

        let site = s.resolve_site("https://ex.com").await.unwrap();
        assert_eq!(*site.urls, HashSet::from(["https://ex.com/de/seite".to_string()]));
    }

    #[tokio::test]
    async fn test_invalid_base_url() {
        let s = searcher(MockFetcher::new(), MockRobots::empty());
        let err = s.search("not a url", &["x"]).await.unwrap_err();
        assert!(matches!(err, SitemapError::InvalidUrl { .. }));
    }

    #[tokio::test]
    async fn test_cache_memoizes_until_invalidated() {
        let fetcher = MockFetcher::new().with_document(
            "https://ex.com/sitemap.xml",
            urlset(&[("https://ex.com/a", &[])]),
        );
        let config = SearcherConfig::default().with_cache(true);
        let s = SitemapSearcher::with_collaborators(config, fetcher, MockRobots::empty());

        let first = s.search_report("https://ex.com", &["a"], true).await.unwrap();
        let second = s.search_report("https://ex.com/", &["a"], true).await.unwrap();
        assert!(!first.from_cache);
        assert!(second.from_cache);
        assert_eq!(first.results, second.results);
        assert_eq!(s.fetcher().request_count("https://ex.com/sitemap.xml"), 1);

        assert!(s.invalidate("https://ex.com"));
        let third = s.search_report("https://ex.com", &["a"], true).await.unwrap();
        assert!(!third.from_cache);
        assert_eq!(s.fetcher().request_count("https://ex.com/sitemap.xml"), 2);
    }

    #[tokio::test]
    async fn test_cache_disabled_by_default() {
        let s = searcher(MockFetcher::new(), MockRobots::empty());
        s.search("https://ex.com", &["a"]).await.unwrap();
        s.search("https://ex.com", &["a"]).await.unwrap();
        assert_eq!(s.fetcher().request_count("https://ex.com/sitemap.xml"), 2);
    }

    #[tokio::test]
    async fn test_shared_searcher_concurrent_searches() {
        let fetcher = MockFetcher::new()
            .with_document("https://a.com/sitemap.xml", urlset(&[("https://a.com/shop/x", &[])]))
            .with_document("https://b.com/sitemap.xml", urlset(&[("https://b.com/blog/y", &[])]));
        let s = Arc::new(searcher(fetcher, MockRobots::empty()));

        let (a, b) = tokio::join!(
            s.search("https://a.com", &["shop"]),
            s.search("https://b.com", &["shop"])
        );
        assert_eq!(a.unwrap()["shop"], 1.0);
        assert_eq!(b.unwrap()["shop"], 0.0);
    }
}
