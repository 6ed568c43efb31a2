//! Typed errors for sitemap resolution.
//!
//! Every variant carries owned context so failures can be collected into a
//! [`crate::search::SearchReport`] and compared in tests. Only
//! [`SitemapError::InvalidUrl`] ever escapes a search; the rest are recovered
//! at the URL that produced them.

use serde::ser::{Serialize, SerializeStruct, Serializer};
use thiserror::Error;

/// Errors produced while fetching, decoding, or parsing sitemap documents.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SitemapError {
    /// Transport failure or non-success HTTP status.
    #[error("failed to fetch {url}: {reason}")]
    Fetch { url: String, reason: String },

    /// URL implied a gzip payload that did not decode.
    #[error("invalid gzip payload at {url}: {reason}")]
    Decompress { url: String, reason: String },

    /// Document is not well-formed XML.
    #[error("failed to parse sitemap {url}: {reason}")]
    Parse { url: String, reason: String },

    /// URL could not be parsed or joined.
    #[error("invalid URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    /// Sitemap reference nested deeper than the configured cap.
    #[error("sitemap {url} skipped at depth {depth}")]
    DepthLimit { url: String, depth: usize },

    /// Overall resolution deadline elapsed before the frontier drained.
    #[error("resolution deadline exceeded after {elapsed_ms}ms")]
    DeadlineExceeded { elapsed_ms: u64 },

    /// HTTP client could not be constructed.
    #[error("HTTP client error: {0}")]
    Client(String),
}

impl SitemapError {
    /// The URL this failure is attributed to, if any.
    pub fn url(&self) -> Option<&str> {
        match self {
            Self::Fetch { url, .. }
            | Self::Decompress { url, .. }
            | Self::Parse { url, .. }
            | Self::InvalidUrl { url, .. }
            | Self::DepthLimit { url, .. } => Some(url),
            Self::DeadlineExceeded { .. } | Self::Client(_) => None,
        }
    }

    /// Short machine-readable kind, used in JSON output.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Fetch { .. } => "fetch",
            Self::Decompress { .. } => "decompress",
            Self::Parse { .. } => "parse",
            Self::InvalidUrl { .. } => "invalid_url",
            Self::DepthLimit { .. } => "depth_limit",
            Self::DeadlineExceeded { .. } => "deadline_exceeded",
            Self::Client(_) => "client",
        }
    }
}

impl Serialize for SitemapError {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("SitemapError", 3)?;
        state.serialize_field("kind", self.kind())?;
        state.serialize_field("url", &self.url())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

/// Result alias for sitemap operations.
pub type Result<T> = std::result::Result<T, SitemapError>;
