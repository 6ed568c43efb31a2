//! `sitemap-searcher seeds <base_url>`: show where resolution would start.

use crate::cli::output::{self, Styled};
use crate::config::SearcherConfig;
use crate::search::HttpSitemapSearcher;
use anyhow::{Context, Result};

/// Run the seeds command.
pub async fn run(base_url: &str, config: SearcherConfig) -> Result<()> {
    let s = Styled::new();
    let searcher = HttpSitemapSearcher::from_config(config).context("failed to build HTTP client")?;
    let seeds = searcher
        .seeds(base_url)
        .await
        .with_context(|| format!("cannot read seeds for {base_url}"))?;

    if output::is_json() {
        output::print_json(&seeds);
        return Ok(());
    }

    for url in &seeds.urls {
        println!("{url}");
    }

    if output::is_verbose() {
        let source = if seeds.from_robots {
            "robots.txt"
        } else {
            "default locations"
        };
        eprintln!("  {}", s.dim(&format!("from {source}")));
    }

    Ok(())
}
