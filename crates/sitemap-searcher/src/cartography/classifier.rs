//! Decide whether a sitemap document is an index or a leaf URL set.

use serde::{Deserialize, Serialize};

/// Opening tag probed for in the raw bytes.
const SITEMAP_INDEX_TAG: &[u8] = b"<sitemapindex";

/// Shape of a fetched sitemap document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    /// `<sitemapindex>`: references other sitemaps.
    Index,
    /// `<urlset>` or anything else: page entries.
    Leaf,
}

/// Classify decompressed document bytes.
///
/// This is a raw substring probe, not schema validation. A document that
/// mentions `<sitemapindex` inside a comment or CDATA section is classified
/// as an index, and a prefixed root such as `<sm:sitemapindex` is not.
pub fn classify(data: &[u8]) -> DocumentKind {
    if data
        .windows(SITEMAP_INDEX_TAG.len())
        .any(|w| w == SITEMAP_INDEX_TAG)
    {
        DocumentKind::Index
    } else {
        DocumentKind::Leaf
    }
}
