//! Recursive expansion of seed sitemaps into canonical page URLs.
//!
//! The sitemap graph may contain cycles, so every URL is fetched at most once
//! per resolution. Failures at one URL are recorded on the context and never
//! abort sibling or parent branches.

use super::classifier::{classify, DocumentKind};
use super::sitemap::{extract_canonical_urls, parse_sitemap_index};
use crate::acquisition::SitemapFetcher;
use crate::config::SearcherConfig;
use crate::error::SitemapError;
use futures::stream::{self, StreamExt};
use serde::Serialize;
use std::collections::{BTreeSet, HashSet};
use tokio::time::Instant;
use tracing::{debug, warn};

/// Per-call resolution state. Owned by one resolution, never by the searcher.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ResolutionContext {
    /// Canonical page URLs from every leaf sitemap reached.
    pub urls: HashSet<String>,
    /// Leaf sitemaps that fetched and parsed.
    pub leaf_sitemaps: BTreeSet<String>,
    /// Index sitemaps that fetched and parsed.
    pub index_sitemaps: BTreeSet<String>,
    /// Recovered failures, in the order they occurred.
    pub failures: Vec<SitemapError>,
    /// The resolution deadline cut the traversal short.
    pub timed_out: bool,
    #[serde(skip)]
    visited: HashSet<String>,
}

impl ResolutionContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `url` has already been taken off the frontier.
    pub fn is_visited(&self, url: &str) -> bool {
        self.visited.contains(url)
    }

    fn record_failure(&mut self, error: SitemapError) {
        warn!(url = error.url().unwrap_or("-"), error = %error, "sitemap branch skipped");
        self.failures.push(error);
    }
}

enum DocumentOutcome {
    Index(Vec<String>),
    Leaf(HashSet<String>),
    Failed(SitemapError),
}

/// Walks the sitemap reference graph using a [`SitemapFetcher`].
pub struct SitemapResolver<'a, F: ?Sized> {
    fetcher: &'a F,
    config: &'a SearcherConfig,
}

impl<'a, F: SitemapFetcher + ?Sized> SitemapResolver<'a, F> {
    pub fn new(fetcher: &'a F, config: &'a SearcherConfig) -> Self {
        Self { fetcher, config }
    }

    /// Resolve `seeds` into a fresh context.
    pub async fn resolve<I, S>(&self, seeds: I) -> ResolutionContext
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut ctx = ResolutionContext::new();
        self.resolve_into(seeds, &mut ctx).await;
        ctx
    }

    /// Resolve `seeds`, accumulating into `ctx`. URLs already visited in
    /// `ctx` are not fetched again.
    ///
    /// The frontier is a LIFO stack drained `max_concurrent_fetches` documents
    /// at a time; with a width of 1 this is a depth-first pre-order walk.
    pub async fn resolve_into<I, S>(&self, seeds: I, ctx: &mut ResolutionContext)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let started = Instant::now();
        let deadline = self.config.resolution_timeout().map(|t| started + t);
        let width = self.config.max_concurrent_fetches.max(1);

        let mut seeds: Vec<String> = seeds.into_iter().map(Into::into).collect();
        seeds.sort();
        seeds.dedup();
        let mut stack: Vec<(String, usize)> = seeds.into_iter().rev().map(|u| (u, 0)).collect();

        while !stack.is_empty() {
            if deadline.is_some_and(|d| Instant::now() >= d) {
                self.record_deadline(started, ctx);
                break;
            }

            let mut batch = Vec::with_capacity(width);
            while batch.len() < width {
                let Some((url, depth)) = stack.pop() else {
                    break;
                };
                if !ctx.visited.insert(url.clone()) {
                    debug!(url = %url, "already visited");
                    continue;
                }
                if depth > self.config.max_depth {
                    ctx.record_failure(SitemapError::DepthLimit { url, depth });
                    continue;
                }
                batch.push((url, depth));
            }
            if batch.is_empty() {
                continue;
            }

            // Outcomes are applied as they complete, so a deadline keeps every
            // document that finished before it.
            let mut fetches = stream::iter(batch)
                .map(|(url, depth)| async move {
                    let outcome = self.resolve_document(&url).await;
                    (url, depth, outcome)
                })
                .buffer_unordered(width);

            loop {
                let next = match deadline {
                    Some(d) => match tokio::time::timeout_at(d, fetches.next()).await {
                        Ok(next) => next,
                        Err(_) => {
                            self.record_deadline(started, ctx);
                            return;
                        }
                    },
                    None => fetches.next().await,
                };
                let Some((url, depth, outcome)) = next else {
                    break;
                };
                apply_outcome(ctx, &mut stack, url, depth, outcome);
            }
        }
    }

    /// Fetch, classify, and parse a single sitemap document.
    async fn resolve_document(&self, url: &str) -> DocumentOutcome {
        let data = match self.fetcher.fetch(url).await {
            Ok(data) => data,
            Err(e) => return DocumentOutcome::Failed(e),
        };

        let parsed = match classify(&data) {
            DocumentKind::Index => parse_sitemap_index(url, &data).map(DocumentOutcome::Index),
            DocumentKind::Leaf => {
                extract_canonical_urls(url, &data, &self.config.hreflang).map(DocumentOutcome::Leaf)
            }
        };
        parsed.unwrap_or_else(DocumentOutcome::Failed)
    }

    fn record_deadline(&self, started: Instant, ctx: &mut ResolutionContext) {
        ctx.timed_out = true;
        ctx.record_failure(SitemapError::DeadlineExceeded {
            elapsed_ms: started.elapsed().as_millis() as u64,
        });
    }
}

fn apply_outcome(
    ctx: &mut ResolutionContext,
    stack: &mut Vec<(String, usize)>,
    url: String,
    depth: usize,
    outcome: DocumentOutcome,
) {
    match outcome {
        DocumentOutcome::Index(children) => {
            debug!(url = %url, depth, children = children.len(), "sitemap index");
            for child in children.into_iter().rev() {
                if !ctx.visited.contains(&child) {
                    stack.push((child, depth + 1));
                }
            }
            ctx.index_sitemaps.insert(url);
        }
        DocumentOutcome::Leaf(urls) => {
            debug!(url = %url, depth, pages = urls.len(), "leaf sitemap");
            ctx.urls.extend(urls);
            ctx.leaf_sitemaps.insert(url);
        }
        DocumentOutcome::Failed(error) => ctx.record_failure(error),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{sitemap_index, urlset, MockFetcher};
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;

    fn gzip(data: &[u8]) -> Vec<u8> {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(data).unwrap();
        encoder.finish().unwrap()
    }

    #[tokio::test]
    async fn test_index_expands_to_leaves() {
        let fetcher = MockFetcher::new()
            .with_document(
                "https://ex.com/sitemap_index.xml",
                sitemap_index(&["https://ex.com/a.xml", "https://ex.com/b.xml.gz"]),
            )
            .with_document(
                "https://ex.com/a.xml",
                urlset(&[("https://ex.com/one", &[]), ("https://ex.com/two", &[])]),
            )
            .with_document(
                "https://ex.com/b.xml.gz",
                gzip(urlset(&[("https://ex.com/three", &[])]).as_bytes()),
            );
        let config = SearcherConfig::default();

        let ctx = SitemapResolver::new(&fetcher, &config)
            .resolve(["https://ex.com/sitemap_index.xml"])
            .await;

        assert_eq!(ctx.urls.len(), 3);
        assert!(ctx.urls.contains("https://ex.com/three"));
        assert!(ctx.failures.is_empty());
        assert_eq!(
            ctx.leaf_sitemaps,
            BTreeSet::from([
                "https://ex.com/a.xml".to_string(),
                "https://ex.com/b.xml.gz".to_string()
            ])
        );
        assert!(ctx.index_sitemaps.contains("https://ex.com/sitemap_index.xml"));
    }

    #[tokio::test]
    async fn test_depth_first_order() {
        let fetcher = MockFetcher::new()
            .with_document(
                "https://ex.com/root.xml",
                sitemap_index(&["https://ex.com/i1.xml", "https://ex.com/l2.xml"]),
            )
            .with_document("https://ex.com/i1.xml", sitemap_index(&["https://ex.com/l1.xml"]))
            .with_document("https://ex.com/l1.xml", urlset(&[("https://ex.com/p1", &[])]))
            .with_document("https://ex.com/l2.xml", urlset(&[("https://ex.com/p2", &[])]));
        let config = SearcherConfig::default();

        SitemapResolver::new(&fetcher, &config)
            .resolve(["https://ex.com/root.xml"])
            .await;

        assert_eq!(
            fetcher.requests(),
            vec![
                "https://ex.com/root.xml",
                "https://ex.com/i1.xml",
                "https://ex.com/l1.xml",
                "https://ex.com/l2.xml",
            ]
        );
    }

    #[tokio::test]
    async fn test_cycle_terminates() {
        let fetcher = MockFetcher::new()
            .with_document("https://ex.com/a.xml", sitemap_index(&["https://ex.com/b.xml"]))
            .with_document(
                "https://ex.com/b.xml",
                sitemap_index(&["https://ex.com/a.xml", "https://ex.com/leaf.xml"]),
            )
            .with_document("https://ex.com/leaf.xml", urlset(&[("https://ex.com/page", &[])]));
        let config = SearcherConfig::default();

        let ctx = SitemapResolver::new(&fetcher, &config)
            .resolve(["https://ex.com/a.xml"])
            .await;

        assert_eq!(ctx.urls, HashSet::from(["https://ex.com/page".to_string()]));
        assert_eq!(fetcher.request_count("https://ex.com/a.xml"), 1);
        assert_eq!(fetcher.request_count("https://ex.com/b.xml"), 1);
    }

    #[tokio::test]
    async fn test_failures_skip_branch_only() {
        let fetcher = MockFetcher::new()
            .with_document(
                "https://ex.com/index.xml",
                sitemap_index(&[
                    "https://ex.com/missing.xml",
                    "https://ex.com/broken.xml",
                    "https://ex.com/fake.xml.gz",
                    "https://ex.com/good.xml",
                ]),
            )
            .with_document("https://ex.com/broken.xml", "<urlset><url><loc>https://ex.com/x</url>")
            .with_document("https://ex.com/fake.xml.gz", urlset(&[("https://ex.com/y", &[])]))
            .with_document("https://ex.com/good.xml", urlset(&[("https://ex.com/ok", &[])]));
        let config = SearcherConfig::default();

        let ctx = SitemapResolver::new(&fetcher, &config)
            .resolve(["https://ex.com/index.xml"])
            .await;

        assert_eq!(ctx.urls, HashSet::from(["https://ex.com/ok".to_string()]));
        let kinds: Vec<_> = ctx.failures.iter().map(|f| (f.kind(), f.url())).collect();
        assert_eq!(
            kinds,
            vec![
                ("fetch", Some("https://ex.com/missing.xml")),
                ("parse", Some("https://ex.com/broken.xml")),
                ("decompress", Some("https://ex.com/fake.xml.gz")),
            ]
        );
    }

    #[tokio::test]
    async fn test_depth_limit() {
        let fetcher = MockFetcher::new()
            .with_document("https://ex.com/a.xml", sitemap_index(&["https://ex.com/b.xml"]))
            .with_document("https://ex.com/b.xml", sitemap_index(&["https://ex.com/c.xml"]))
            .with_document("https://ex.com/c.xml", urlset(&[("https://ex.com/deep", &[])]));
        let config = SearcherConfig::default().with_max_depth(1);

        let ctx = SitemapResolver::new(&fetcher, &config)
            .resolve(["https://ex.com/a.xml"])
            .await;

        assert!(ctx.urls.is_empty());
        assert_eq!(
            ctx.failures,
            vec![SitemapError::DepthLimit {
                url: "https://ex.com/c.xml".into(),
                depth: 2
            }]
        );
        assert_eq!(fetcher.request_count("https://ex.com/c.xml"), 0);
    }

    #[tokio::test]
    async fn test_concurrent_fanout_same_union() {
        let leaves: Vec<String> = (0..8).map(|i| format!("https://ex.com/leaf-{i}.xml")).collect();
        let leaf_refs: Vec<&str> = leaves.iter().map(String::as_str).collect();
        let mut fetcher = MockFetcher::new()
            .with_document("https://ex.com/index.xml", sitemap_index(&leaf_refs));
        for (i, leaf) in leaves.iter().enumerate() {
            let page = format!("https://ex.com/page-{i}");
            fetcher = fetcher.with_document(leaf.clone(), urlset(&[(page.as_str(), &[])]));
        }

        let sequential = SearcherConfig::default();
        let parallel = SearcherConfig::default().with_max_concurrent_fetches(4);

        let a = SitemapResolver::new(&fetcher, &sequential)
            .resolve(["https://ex.com/index.xml"])
            .await;
        let b = SitemapResolver::new(&fetcher, &parallel)
            .resolve(["https://ex.com/index.xml"])
            .await;

        assert_eq!(a.urls.len(), 8);
        assert_eq!(a.urls, b.urls);
    }

    #[tokio::test]
    async fn test_resolve_into_reuses_visited() {
        let fetcher = MockFetcher::new()
            .with_document("https://ex.com/a.xml", urlset(&[("https://ex.com/p", &[])]));
        let config = SearcherConfig::default();
        let resolver = SitemapResolver::new(&fetcher, &config);

        let mut ctx = ResolutionContext::new();
        resolver.resolve_into(["https://ex.com/a.xml"], &mut ctx).await;
        resolver.resolve_into(["https://ex.com/a.xml"], &mut ctx).await;

        assert!(ctx.is_visited("https://ex.com/a.xml"));
        assert_eq!(fetcher.request_count("https://ex.com/a.xml"), 1);
    }

    #[tokio::test]
    async fn test_zero_deadline_records_timeout() {
        let fetcher = MockFetcher::new()
            .with_document("https://ex.com/a.xml", urlset(&[("https://ex.com/p", &[])]));
        let config = SearcherConfig::default().with_resolution_timeout_ms(Some(0));

        let ctx = SitemapResolver::new(&fetcher, &config)
            .resolve(["https://ex.com/a.xml"])
            .await;

        assert!(ctx.timed_out);
        assert!(ctx.urls.is_empty());
        assert!(matches!(
            ctx.failures.as_slice(),
            [SitemapError::DeadlineExceeded { .. }]
        ));
    }

    /// Delays one URL far past any deadline used in these tests.
    struct StallingFetcher {
        inner: MockFetcher,
        stalled: &'static str,
    }

    #[async_trait::async_trait]
    impl SitemapFetcher for StallingFetcher {
        async fn fetch(&self, url: &str) -> crate::error::Result<Vec<u8>> {
            if url == self.stalled {
                tokio::time::sleep(std::time::Duration::from_secs(10)).await;
            }
            self.inner.fetch(url).await
        }
    }

    #[tokio::test]
    async fn test_deadline_keeps_finished_siblings() {
        let fetcher = StallingFetcher {
            inner: MockFetcher::new()
                .with_document(
                    "https://ex.com/index.xml",
                    sitemap_index(&["https://ex.com/slow.xml", "https://ex.com/fast.xml"]),
                )
                .with_document(
                    "https://ex.com/fast.xml",
                    urlset(&[("https://ex.com/fast-page", &[])]),
                )
                .with_document(
                    "https://ex.com/slow.xml",
                    urlset(&[("https://ex.com/slow-page", &[])]),
                ),
            stalled: "https://ex.com/slow.xml",
        };
        let config = SearcherConfig::default()
            .with_max_concurrent_fetches(2)
            .with_resolution_timeout_ms(Some(300));

        let ctx = SitemapResolver::new(&fetcher, &config)
            .resolve(["https://ex.com/index.xml"])
            .await;

        assert!(ctx.timed_out);
        assert_eq!(ctx.urls, HashSet::from(["https://ex.com/fast-page".to_string()]));
        assert!(ctx.leaf_sitemaps.contains("https://ex.com/fast.xml"));
        assert!(ctx.index_sitemaps.contains("https://ex.com/index.xml"));
        assert!(matches!(
            ctx.failures.as_slice(),
            [SitemapError::DeadlineExceeded { .. }]
        ));
    }
}
