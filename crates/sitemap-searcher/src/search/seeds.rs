//! Seed sitemaps for a resolution.

use crate::error::{Result, SitemapError};
use serde::Serialize;
use std::collections::{BTreeSet, HashSet};
use url::Url;

pub const SITEMAP_XML: &str = "sitemap.xml";
pub const SITEMAP_INDEX_XML: &str = "sitemap_index.xml";

/// Sitemap URLs a resolution starts from. Never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SeedSet {
    pub urls: BTreeSet<String>,
    /// `true` when the URLs came from robots.txt rather than the defaults.
    pub from_robots: bool,
}

impl SeedSet {
    /// Use the robots-advertised sitemaps, or the two conventional
    /// locations joined against `base` when none are advertised.
    pub fn build(base: &Url, advertised: HashSet<String>) -> Result<Self> {
        if !advertised.is_empty() {
            return Ok(Self {
                urls: advertised.into_iter().collect(),
                from_robots: true,
            });
        }
        Ok(Self {
            urls: Self::defaults(base)?,
            from_robots: false,
        })
    }

    /// `<base>/sitemap.xml` and `<base>/sitemap_index.xml`.
    pub fn defaults(base: &Url) -> Result<BTreeSet<String>> {
        [SITEMAP_XML, SITEMAP_INDEX_XML]
            .iter()
            .map(|name| {
                base.join(name)
                    .map(String::from)
                    .map_err(|e| SitemapError::InvalidUrl {
                        url: base.to_string(),
                        reason: e.to_string(),
                    })
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }
}
