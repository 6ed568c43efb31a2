//! Searcher configuration with `SITEMAP_SEARCHER_*` environment overrides.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::warn;

/// Prefix shared by every environment override.
pub const ENV_PREFIX: &str = "SITEMAP_SEARCHER_";

/// Tunables for sitemap resolution and matching.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearcherConfig {
    /// Ordered href-language preference. Empty means only `<loc>` or x-default.
    pub hreflang: Vec<String>,
    /// Default case folding for [`crate::SitemapSearcher::search`].
    pub case_insensitive: bool,
    /// Memoize resolved URL sets per base URL.
    pub cache_enabled: bool,
    pub connect_timeout_ms: u64,
    pub request_timeout_ms: u64,
    /// Overall resolution deadline. `None` runs until the frontier drains.
    pub resolution_timeout_ms: Option<u64>,
    /// Maximum index nesting below a seed sitemap.
    pub max_depth: usize,
    /// Documents fetched at once. 1 keeps resolution strictly depth-first.
    pub max_concurrent_fetches: usize,
    pub user_agent: String,
}

impl Default for SearcherConfig {
    fn default() -> Self {
        Self {
            hreflang: vec!["en-us".to_string(), "en".to_string()],
            case_insensitive: true,
            cache_enabled: false,
            connect_timeout_ms: 10_000,
            request_timeout_ms: 30_000,
            resolution_timeout_ms: None,
            max_depth: 16,
            max_concurrent_fetches: 1,
            user_agent: format!("sitemap-searcher/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl SearcherConfig {
    /// Defaults overlaid with `SITEMAP_SEARCHER_*` environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_overrides(|key| std::env::var(format!("{ENV_PREFIX}{key}")).ok());
        config
    }

    /// Apply overrides from a key lookup (keys without the prefix).
    ///
    /// Malformed values are logged and ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(langs) = lookup("HREFLANG") {
            self.hreflang = parse_hreflang_list(&langs);
        }
        if let Some(v) = lookup("CASE_SENSITIVE") {
            match parse_flag(&v) {
                Some(flag) => self.case_insensitive = !flag,
                None => warn!(key = "CASE_SENSITIVE", value = %v, "ignoring malformed flag"),
            }
        }
        if let Some(v) = lookup("CACHE") {
            match parse_flag(&v) {
                Some(flag) => self.cache_enabled = flag,
                None => warn!(key = "CACHE", value = %v, "ignoring malformed flag"),
            }
        }
        override_number(&lookup, "CONNECT_TIMEOUT_MS", &mut self.connect_timeout_ms);
        override_number(&lookup, "REQUEST_TIMEOUT_MS", &mut self.request_timeout_ms);
        override_number(&lookup, "MAX_DEPTH", &mut self.max_depth);
        override_number(&lookup, "CONCURRENCY", &mut self.max_concurrent_fetches);
        if let Some(v) = lookup("DEADLINE_MS") {
            match v.trim().parse::<u64>() {
                Ok(0) => self.resolution_timeout_ms = None,
                Ok(ms) => self.resolution_timeout_ms = Some(ms),
                Err(_) => warn!(key = "DEADLINE_MS", value = %v, "ignoring malformed number"),
            }
        }
        if let Some(v) = lookup("USER_AGENT") {
            if !v.trim().is_empty() {
                self.user_agent = v.trim().to_string();
            }
        }
    }

    /// Replace the href-language preference list.
    pub fn with_hreflang<I, S>(mut self, langs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.hreflang = langs.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_case_insensitive(mut self, case_insensitive: bool) -> Self {
        self.case_insensitive = case_insensitive;
        self
    }

    pub fn with_cache(mut self, enabled: bool) -> Self {
        self.cache_enabled = enabled;
        self
    }

    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    /// Set the fetch fan-out. Values below 1 are clamped to 1.
    pub fn with_max_concurrent_fetches(mut self, n: usize) -> Self {
        self.max_concurrent_fetches = n.max(1);
        self
    }

    pub fn with_resolution_timeout_ms(mut self, ms: Option<u64>) -> Self {
        self.resolution_timeout_ms = ms;
        self
    }

    pub fn with_request_timeout_ms(mut self, ms: u64) -> Self {
        self.request_timeout_ms = ms;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn resolution_timeout(&self) -> Option<Duration> {
        self.resolution_timeout_ms.map(Duration::from_millis)
    }
}

/// Split a comma-separated tag list, dropping blanks.
pub fn parse_hreflang_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn override_number<F, T>(lookup: &F, key: &str, slot: &mut T)
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    if let Some(v) = lookup(key) {
        match v.trim().parse::<T>() {
            Ok(n) => *slot = n,
            Err(_) => warn!(key, value = %v, "ignoring malformed number"),
        }
    }
}
