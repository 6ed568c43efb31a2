//! CLI subcommand implementations for the `sitemap-searcher` binary.

pub mod output;
pub mod search_cmd;
pub mod seeds_cmd;
pub mod urls_cmd;

use crate::config::{parse_hreflang_list, SearcherConfig};
use clap::Args;

/// Resolution flags shared by every subcommand. Unset flags keep the
/// environment/default configuration.
#[derive(Debug, Clone, Default, Args)]
pub struct ResolveArgs {
    /// Comma-separated hreflang preference, most preferred first.
    #[arg(long, value_name = "TAGS", conflicts_with = "no_hreflang")]
    pub hreflang: Option<String>,

    /// Ignore hreflang alternates except x-default.
    #[arg(long)]
    pub no_hreflang: bool,

    /// Maximum sitemap index nesting below a seed.
    #[arg(long, value_name = "N")]
    pub max_depth: Option<usize>,

    /// Sitemaps fetched at once.
    #[arg(long, value_name = "N")]
    pub concurrency: Option<usize>,

    /// Per-document request timeout in milliseconds.
    #[arg(long, value_name = "MS")]
    pub request_timeout_ms: Option<u64>,

    /// Overall resolution deadline in milliseconds.
    #[arg(long, value_name = "MS")]
    pub timeout_ms: Option<u64>,
}

impl ResolveArgs {
    /// Layer these flags over `config`.
    pub fn apply(&self, mut config: SearcherConfig) -> SearcherConfig {
        if let Some(ref tags) = self.hreflang {
            config.hreflang = parse_hreflang_list(tags);
        }
        if self.no_hreflang {
            config.hreflang.clear();
        }
        if let Some(depth) = self.max_depth {
            config = config.with_max_depth(depth);
        }
        if let Some(n) = self.concurrency {
            config = config.with_max_concurrent_fetches(n);
        }
        if let Some(ms) = self.request_timeout_ms {
            config = config.with_request_timeout_ms(ms);
        }
        if let Some(ms) = self.timeout_ms {
            config = config.with_resolution_timeout_ms(Some(ms));
        }
        config
    }
}
