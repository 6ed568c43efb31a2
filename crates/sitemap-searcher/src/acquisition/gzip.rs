//! Gzip handling for `.gz` sitemap URLs.

use crate::error::{Result, SitemapError};
use flate2::read::MultiGzDecoder;
use std::io::Read;

/// Whether the URL's final path segment marks a gzip payload.
///
/// Only the text after the last `/` is inspected, so a `.gz` directory
/// earlier in the path does not count.
pub fn is_gzip_url(url: &str) -> bool {
    url.rsplit('/').next().is_some_and(|last| last.contains(".gz"))
}

/// Gunzip a payload fetched from `url`.
pub fn decompress(url: &str, data: &[u8]) -> Result<Vec<u8>> {
    let mut decoder = MultiGzDecoder::new(data);
    let mut out = Vec::new();
    decoder
        .read_to_end(&mut out)
        .map_err(|e| SitemapError::Decompress {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
    Ok(out)
}
