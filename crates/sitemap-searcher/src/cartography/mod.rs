//! Cartography: robots directives, document classification, sitemap parsing,
//! and recursive resolution of the sitemap graph.

pub mod classifier;
pub mod resolver;
pub mod robots;
pub mod sitemap;

pub use classifier::{classify, DocumentKind};
pub use resolver::{ResolutionContext, SitemapResolver};
pub use robots::{parse_sitemap_directives, RobotsResolver, RobotsTxtResolver};
pub use sitemap::{
    extract_canonical_urls, parse_page_entries, parse_sitemap_index, HreflangAlternate, PageEntry,
};
