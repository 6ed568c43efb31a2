//! Sitemap Searcher: discover every canonical page URL a website publishes
//! through its XML sitemaps, then report what fraction of those URLs mention
//! each of a list of keywords.
//!
//! ```rust,ignore
//! use sitemap_searcher::{HttpSitemapSearcher, SearcherConfig};
//!
//! let searcher = HttpSitemapSearcher::from_config(SearcherConfig::from_env())?;
//! let results = searcher.search("https://www.example.com", &["blog", "docs"]).await?;
//! for (keyword, fraction) in &results {
//!     println!("{keyword}: {:.1}%", fraction * 100.0);
//! }
//! ```
//!
//! # Modules
//!
//! - [`acquisition`] - HTTP fetching and gzip decoding
//! - [`cartography`] - robots.txt, document classification, sitemap parsing, resolution
//! - [`search`] - keyword matching, caching, and the search orchestrator
//! - [`testing`] - in-memory fetcher and robots resolver

pub mod acquisition;
pub mod cartography;
pub mod cli;
pub mod config;
pub mod error;
pub mod search;
pub mod testing;

pub use acquisition::{HttpFetcher, SitemapFetcher};
pub use cartography::{
    classify, DocumentKind, HreflangAlternate, PageEntry, ResolutionContext, RobotsResolver,
    RobotsTxtResolver, SitemapResolver,
};
pub use config::SearcherConfig;
pub use error::{Result, SitemapError};
pub use search::{
    match_keywords, normalize_path, HttpSitemapSearcher, KeywordResult, NormalizedPath,
    SearchReport, SeedSet, SiteResolution, SitemapSearcher,
};
