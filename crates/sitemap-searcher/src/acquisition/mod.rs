//! Acquisition: fetching raw sitemap and robots documents over HTTP.

pub mod gzip;
pub mod http_client;

pub use gzip::{decompress, is_gzip_url};
pub use http_client::{HttpFetcher, SitemapFetcher};
