//! Keyword search over a site's resolved sitemap URLs.

pub mod cache;
pub mod matcher;
pub mod searcher;
pub mod seeds;

pub use cache::{CachedResolution, ResolvedSetCache};
pub use matcher::{match_keywords, normalize_path, KeywordResult, NormalizedPath, PathSource};
pub use searcher::{HttpSitemapSearcher, SearchReport, SiteResolution, SitemapSearcher};
pub use seeds::{SeedSet, SITEMAP_INDEX_XML, SITEMAP_XML};
